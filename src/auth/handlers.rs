//! Authentication handlers

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::{error, info, warn};

use super::extractors::AuthedUser;
use super::models::{Claims, LoginRequest, RegisterRequest, User};
use super::password;
use crate::common::{generate_user_id, safe_email_log, ApiError, SharedState, Validator};

/// POST /api/auth/register
/// Creates a user account and returns a fresh token plus the user summary.
pub async fn register(
    Extension(state_lock): Extension<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let validation = payload.validate(&payload);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    if existing.is_some() {
        warn!(
            email = %safe_email_log(&email),
            "Registration rejected: email already in use"
        );
        return Err(ApiError::Conflict("Email já cadastrado".to_string()));
    }

    let password_hash = password::hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "Password hashing failed during registration");
        ApiError::InternalServer("password hashing failed".to_string())
    })?;

    let id = generate_user_id();

    sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .execute(&state.db)
        .await
        .map_err(|e| {
            // The unique index backstops the existence check above
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Email já cadastrado".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let token = sign_token(&user.id, &state.jwt_secret, state.token_ttl_hours)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "New user account registered"
    );

    let resp = serde_json::json!({
        "success": true,
        "token": token,
        "user": user.summary(),
    });

    Ok((StatusCode::CREATED, Json(resp)))
}

/// POST /api/auth/login
/// Verifies credentials and returns a fresh token plus the user summary.
/// Unknown email and wrong password produce the identical 401 message.
pub async fn login(
    Extension(state_lock): Extension<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::ValidationError(
            "Preencha email e senha".to_string(),
        ));
    }

    let email = payload.email.trim().to_lowercase();

    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await
        .map_err(ApiError::DatabaseError)?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!(email = %safe_email_log(&email), "Login failed: unknown email");
            return Err(ApiError::Unauthorized("Credenciais inválidas".to_string()));
        }
    };

    if !password::verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "Login failed: password mismatch");
        return Err(ApiError::Unauthorized("Credenciais inválidas".to_string()));
    }

    let token = sign_token(&user.id, &state.jwt_secret, state.token_ttl_hours)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User login successful"
    );

    let resp = serde_json::json!({
        "success": true,
        "token": token,
        "user": user.summary(),
    });

    Ok(Json(resp))
}

/// GET /api/auth/me
/// Returns the current authenticated user's summary.
pub async fn me_handler(authed: AuthedUser) -> Result<Json<serde_json::Value>, ApiError> {
    let resp = serde_json::json!({
        "success": true,
        "user": {
            "id": authed.id,
            "name": authed.name,
            "email": authed.email,
        },
    });
    Ok(Json(resp))
}

// ---- Helper Functions ----

/// Mint an HS256 token for the given user id with the configured expiry window
pub fn sign_token(user_id: &str, secret: &str, ttl_hours: i64) -> Result<String, ApiError> {
    let exp = (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error");
        ApiError::InternalServer("jwt error".to_string())
    })
}
