use std::env;
use dotenvy::dotenv;
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Optional JSON file with the registered office sites.
    /// When unset the built-in site list is used.
    pub office_sites_path: Option<String>,

    // Presence rules (minutes)
    pub grace_minutes: i64,
    pub half_day_threshold_minutes: i64,

    // Monthly summary cache
    pub summary_cache_capacity: u64,
    pub summary_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            office_sites_path: env::var("OFFICE_SITES_PATH").ok(),

            grace_minutes: env::var("GRACE_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap(),
            half_day_threshold_minutes: env::var("HALF_DAY_THRESHOLD_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),

            summary_cache_capacity: env::var("SUMMARY_CACHE_CAPACITY")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap(),
            summary_cache_ttl_secs: env::var("SUMMARY_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string()) // default 5 min
                .parse()
                .unwrap(),
        }
    }
}
