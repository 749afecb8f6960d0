// src/handlers/auth.rs

use axum::{
    Extension, Json, extract::State, http::StatusCode, response::IntoResponse,
    response::Response,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{RefreshRequest, RegisterRequest, TokenPairResponse, TokenRequest},
    repo::users,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH, sign_jwt, verify_jwt},
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with no body: the created resource payload is
/// deliberately suppressed.
pub async fn register(
    State(pool): State<PgPool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    users::create_user(&pool, &payload.email, &payload.username, &hashed_password)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                AppError::Conflict(format!("Email '{}' already registered", payload.email))
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })?;

    Ok(StatusCode::CREATED)
}

/// Authenticates by email and password and returns an access/refresh
/// token pair. Soft-disabled accounts cannot log in.
pub async fn obtain_token(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<TokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = users::find_active_by_email(&pool, &payload.email)
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::AuthError(
            "No active account found with the given credentials".to_string(),
        ))?;

    let is_valid = verify_password(&payload.password, &user.password)?;

    if !is_valid {
        return Err(AppError::AuthError(
            "No active account found with the given credentials".to_string(),
        ));
    }

    let access = sign_jwt(
        user.id,
        TOKEN_TYPE_ACCESS,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;
    let refresh = sign_jwt(
        user.id,
        TOKEN_TYPE_REFRESH,
        &config.jwt_secret,
        config.refresh_expiration,
    )?;

    Ok(Json(TokenPairResponse { access, refresh }))
}

/// Exchanges a valid, non-blacklisted refresh token for a new access
/// token.
pub async fn refresh_token(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = verify_jwt(&payload.refresh, &config.jwt_secret)
        .map_err(|_| AppError::AuthError("Token is invalid or expired".to_string()))?;

    if claims.token_type != TOKEN_TYPE_REFRESH {
        return Err(AppError::AuthError(
            "Token is invalid or expired".to_string(),
        ));
    }

    if users::is_blacklisted(&pool, &claims.jti).await? {
        return Err(AppError::AuthError("Token is blacklisted".to_string()));
    }

    let access = sign_jwt(
        claims.user_id()?,
        TOKEN_TYPE_ACCESS,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({ "access": access })))
}

/// Logs out by blacklisting the supplied refresh token.
///
/// Error bodies intentionally distinguish a missing key from an invalid
/// token; anything unexpected is reported generically.
pub async fn logout(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(_claims): Extension<Claims>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(refresh_token) = body.get("refresh_token").and_then(|v| v.as_str()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "'refresh_token' not provided." })),
        )
            .into_response();
    };

    let claims = match verify_jwt(refresh_token, &config.jwt_secret) {
        Ok(claims) if claims.token_type == TOKEN_TYPE_REFRESH => claims,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": "Invalid refresh token." })),
            )
                .into_response();
        }
    };

    match users::blacklist_token(&pool, &claims.jti, claims.expires_at()).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!("Failed to blacklist token: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "An error occurred during logout." })),
            )
                .into_response()
        }
    }
}
