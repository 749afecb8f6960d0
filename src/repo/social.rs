// src/repo/social.rs
//
// Toggle semantics against the many-to-many join tables, plus comment
// creation. Toggles are read-modify-write inside a transaction;
// concurrent identical toggles resolve as last-write-wins, with the
// pair primary key catching a doubled insert.

use sqlx::PgPool;

use crate::models::comment::CommentResponse;

/// Error type for follow mutations. Invariant violations are raised
/// here and translated to client-facing errors by the handler layer.
#[derive(Debug)]
pub enum FollowError {
    /// No profile with the given id.
    ProfileNotFound,
    /// A user may not follow their own profile.
    SelfFollow,
    Db(sqlx::Error),
}

impl From<sqlx::Error> for FollowError {
    fn from(err: sqlx::Error) -> Self {
        FollowError::Db(err)
    }
}

/// Toggle the (user, post) like pair. Returns the new liked state.
pub async fn toggle_like(pool: &PgPool, post_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM post_likes WHERE user_id = $1 AND post_id = $2",
    )
    .bind(user_id)
    .bind(post_id)
    .fetch_optional(&mut *tx)
    .await?;

    let is_liked = existing.is_some();

    if is_liked {
        sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("INSERT INTO post_likes (user_id, post_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(!is_liked)
}

/// Toggle `user_id` in the profile's `followed_by` set. Returns the new
/// followed state. Rejects when the user owns the profile.
pub async fn toggle_follow(
    pool: &PgPool,
    profile_id: i64,
    user_id: i64,
) -> Result<bool, FollowError> {
    let mut tx = pool.begin().await?;

    let owner_id =
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM user_profiles WHERE id = $1")
            .bind(profile_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(FollowError::ProfileNotFound)?;

    if owner_id == user_id {
        return Err(FollowError::SelfFollow);
    }

    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT 1 FROM profile_followers WHERE profile_id = $1 AND user_id = $2",
    )
    .bind(profile_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let is_following = existing.is_some();

    if is_following {
        sqlx::query("DELETE FROM profile_followers WHERE profile_id = $1 AND user_id = $2")
            .bind(profile_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    } else {
        sqlx::query("INSERT INTO profile_followers (profile_id, user_id) VALUES ($1, $2)")
            .bind(profile_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(!is_following)
}

/// Create a comment against a post. No uniqueness constraint: a user
/// may comment on the same post any number of times.
pub async fn add_comment(
    pool: &PgPool,
    post_id: i64,
    user_id: i64,
    comment_contents: &str,
) -> Result<CommentResponse, sqlx::Error> {
    sqlx::query_as::<_, CommentResponse>(
        r#"
        WITH inserted AS (
            INSERT INTO comments (post_id, user_id, comment_contents)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id, comment_contents, created_at
        )
        SELECT i.id, i.post_id, i.user_id, u.username, i.comment_contents, i.created_at
        FROM inserted i
        JOIN users u ON u.id = i.user_id
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(comment_contents)
    .fetch_one(pool)
    .await
}
