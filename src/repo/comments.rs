// src/repo/comments.rs
//
// Own-comment access: every query is scoped to the owner, so another
// user's comment simply does not resolve (reported as 404 upstream).

use sqlx::PgPool;

use crate::models::comment::Comment;

pub async fn list_own(pool: &PgPool, user_id: i64) -> Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, user_id, comment_contents, created_at
        FROM comments
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_own(
    pool: &PgPool,
    user_id: i64,
    comment_id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, user_id, comment_contents, created_at
        FROM comments
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(comment_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn update_own(
    pool: &PgPool,
    user_id: i64,
    comment_id: i64,
    comment_contents: &str,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET comment_contents = $1
        WHERE id = $2 AND user_id = $3
        RETURNING id, post_id, user_id, comment_contents, created_at
        "#,
    )
    .bind(comment_contents)
    .bind(comment_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_own(
    pool: &PgPool,
    user_id: i64,
    comment_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
        .bind(comment_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
