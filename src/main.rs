use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::time::Duration;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod utils;

use config::Config;
use db::init_db;

use crate::attendance::presence::PresenceRules;
use crate::attendance::sites::load_sites;
use crate::docs::ApiDoc;
use crate::utils::summary_cache::{self, SummaryCache};
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "GeoAttend"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    // Office sites are static configuration, loaded once and shared
    // read-only across workers.
    let sites = load_sites(config.office_sites_path.as_deref())
        .expect("Failed to load office site list");
    info!(site_count = sites.len(), "Office sites loaded");

    let rules = PresenceRules {
        grace_minutes: config.grace_minutes,
        half_day_threshold_minutes: config.half_day_threshold_minutes,
    };

    let summary_cache = SummaryCache::new(
        config.summary_cache_capacity,
        Duration::from_secs(config.summary_cache_ttl_secs),
    );

    let pool_for_warmup = pool.clone();
    let cache_for_warmup = summary_cache.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    actix_web::rt::spawn(async move {
        // Pre-compute current-month summaries in batches of 100
        if let Err(e) =
            summary_cache::warmup_summary_cache(&pool_for_warmup, &cache_for_warmup, rules, 100)
                .await
        {
            eprintln!("Failed to warmup summary cache: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(sites.clone()))
            .app_data(Data::new(rules))
            .app_data(Data::new(summary_cache.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
