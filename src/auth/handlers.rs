use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{role::Role, schedule::WeeklySchedule, user::User},
    models::{LoginReqDto, RegisterReq, TokenType},
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

// auth end points

/// true  => username AVAILABLE
/// false => username TAKEN
async fn is_username_available(username: &str, pool: &MySqlPool) -> bool {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)",
    )
    .bind(username.to_lowercase())
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// Registration handler. Creates the employee profile and the login
/// account in one transaction; the account stays inactive until an admin
/// approves it, so a half-created registration can never log in.
pub async fn register(user: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let username = user.username.trim().to_lowercase();
    let password = &user.password;

    if username.is_empty() || password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Username and password must not be empty"
        }));
    }

    if !is_username_available(&username, pool.get_ref()).await {
        return HttpResponse::Conflict().json(json!({
            "error": "Username already taken"
        }));
    }

    let hashed = match hash_password(password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    };

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            error!(error = %e, "Failed to open registration transaction");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    };

    let employee_insert = sqlx::query(
        r#"
        INSERT INTO employees
            (employee_code, first_name, last_name, email, phone, date_of_joining, status)
        VALUES (?, ?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(&user.employee_code)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.phone)
    .bind(user.date_of_joining)
    .execute(&mut *tx)
    .await;

    let employee_id = match employee_insert {
        Ok(res) => res.last_insert_id(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::Conflict().json(json!({
                        "error": "Employee code or email already registered"
                    }));
                }
            }
            error!(error = %e, "Failed to create employee profile");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    };

    let user_insert = sqlx::query(
        r#"
        INSERT INTO users (username, password, role_id, employee_id, is_active)
        VALUES (?, ?, ?, ?, 0)
        "#,
    )
    .bind(&username)
    .bind(&hashed)
    .bind(Role::Employee as u8)
    .bind(employee_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = user_insert {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return HttpResponse::Conflict().json(json!({
                    "error": "Username already exists"
                }));
            }
        }
        error!(error = %e, "Failed to create user account");
        return HttpResponse::InternalServerError().json(json!({
            "error": "Failed to register user"
        }));
    }

    if let Err(e) = tx.commit().await {
        error!(error = %e, "Failed to commit registration");
        return HttpResponse::InternalServerError().json(json!({
            "error": "Failed to register user"
        }));
    }

    info!(username = %username, employee_id, "Registration submitted");

    HttpResponse::Created().json(json!({
        "message": "Registration submitted, awaiting admin approval"
    }))
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.username.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return HttpResponse::BadRequest().body("Username or password required");
    }

    debug!("Fetching user from database");

    // 2️⃣ Fetch user
    let db_user = match sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role_id, employee_id, is_active
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(user.username.to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    // 4️⃣ Registration must be approved first
    if !db_user.is_active {
        info!("Login refused: account awaiting approval");
        return HttpResponse::Forbidden().json(json!({
            "message": "Account pending admin approval"
        }));
    }

    // 5️⃣ Generate token pair
    let access_token = generate_access_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.username.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    // 6️⃣ Store refresh token
    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 7️⃣ Update last_login_at (non-fatal)
    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
        .bind(db_user.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // find refresh token in DB
    let record = match sqlx::query_as::<_, (u64, u64, bool)>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to look up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let (record_id, record_user_id) = match record {
        Some((id, user_id, revoked)) if !revoked => (id, user_id),
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // revoke old refresh token
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // issue new refresh token
    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record_user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // new access token
    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // revoke refresh token (idempotent; success even if it didn't exist)
    let _ = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = 1
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    HttpResponse::NoContent().finish()
}

#[derive(Serialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct PendingUserResponse {
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "arun.kumar")]
    pub username: String,
    #[schema(example = 1000, nullable = true)]
    pub employee_id: Option<u64>,
    #[schema(example = "Arun", nullable = true)]
    pub first_name: Option<String>,
    #[schema(example = "Kumar", nullable = true)]
    pub last_name: Option<String>,
    #[schema(example = "arun.kumar@company.com", nullable = true)]
    pub email: Option<String>,
    #[schema(example = "2026-01-01", value_type = String, format = "date", nullable = true)]
    pub date_of_joining: Option<NaiveDate>,
}

/// Registrations awaiting approval
#[utoipa::path(
    get,
    path = "/api/v1/users/pending",
    responses(
        (status = 200, description = "Registrations awaiting approval", body = [PendingUserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn pending_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let pending = sqlx::query_as::<_, PendingUserResponse>(
        r#"
        SELECT
            u.id AS user_id,
            u.username,
            u.employee_id,
            e.first_name,
            e.last_name,
            e.email,
            e.date_of_joining
        FROM users u
        LEFT JOIN employees e ON e.id = u.employee_id
        WHERE u.is_active = 0
        ORDER BY u.id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch pending registrations");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(pending))
}

/// Approve a pending registration
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/approve",
    params(
        ("user_id" = u64, Path, description = "ID of the user account to approve")
    ),
    responses(
        (status = 200, description = "Registration approved", body = Object, example = json!({
            "message": "Registration approved"
        })),
        (status = 400, description = "User not found or already approved"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn approve_user(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let user_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, user_id, "Failed to open approval transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let result = sqlx::query(
        r#"
        UPDATE users
        SET is_active = 1
        WHERE id = ?
        AND is_active = 0
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Approval failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "User not found or already approved"
        })));
    }

    let employee_id = sqlx::query_scalar::<_, Option<u64>>(
        "SELECT employee_id FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        error!(error = %e, user_id, "Failed to fetch approved user");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Activate the employee profile and seed the default weekly schedule
    // so presence aggregation has working hours from day one.
    if let Some(employee_id) = employee_id {
        sqlx::query("UPDATE employees SET status = 'active' WHERE id = ?")
            .bind(employee_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, "Failed to activate employee");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

        for entry in WeeklySchedule::default_template().entries {
            sqlx::query(
                r#"
                INSERT IGNORE INTO weekly_schedules
                    (employee_id, weekday, start_time, end_time, is_leave_day)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(employee_id)
            .bind(entry.weekday)
            .bind(entry.start_time)
            .bind(entry.end_time)
            .bind(entry.is_leave_day)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, "Failed to seed default schedule");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
        }
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, user_id, "Failed to commit approval");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    info!(user_id, "Registration approved");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Registration approved"
    })))
}
