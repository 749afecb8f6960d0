// src/repo/users.rs

use sqlx::PgPool;

use crate::models::user::User;

pub async fn create_user(
    pool: &PgPool,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, password)
        VALUES ($1, $2, $3)
        RETURNING id, email, username, password, is_staff, is_superuser, is_active, created_at
        "#,
    )
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

/// Login lookup: soft-disabled accounts are invisible here.
pub async fn find_active_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, username, password, is_staff, is_superuser, is_active, created_at
        FROM users
        WHERE email = $1 AND is_active = TRUE
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Blacklist a refresh token by jti until it would have expired anyway.
pub async fn blacklist_token(
    pool: &PgPool,
    jti: &str,
    expires_at: chrono::DateTime<chrono::Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO token_blacklist (jti, expires_at)
        VALUES ($1, $2)
        ON CONFLICT (jti) DO NOTHING
        "#,
    )
    .bind(jti)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn is_blacklisted(pool: &PgPool, jti: &str) -> Result<bool, sqlx::Error> {
    let row = sqlx::query_scalar::<_, i32>("SELECT 1 FROM token_blacklist WHERE jti = $1")
        .bind(jti)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}
