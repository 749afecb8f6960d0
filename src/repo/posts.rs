// src/repo/posts.rs
//
// Post mutations. Create/update run in one transaction so a failure
// after inserting the post but before attaching hashtags rolls back
// completely.

use sqlx::{PgPool, Postgres, Transaction};

use crate::models::{
    hashtag::Hashtag,
    post::{Post, PostWithHashtags},
};

/// Create a post and attach its hashtag set atomically.
pub async fn create_post(
    pool: &PgPool,
    user_id: i64,
    text_content: &str,
    hashtag_names: &[String],
) -> Result<PostWithHashtags, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, text_content)
        VALUES ($1, $2)
        RETURNING id, user_id, text_content, image, created_at
        "#,
    )
    .bind(user_id)
    .bind(text_content)
    .fetch_one(&mut *tx)
    .await?;

    let hashtags = set_hashtags(&mut tx, post.id, hashtag_names).await?;

    tx.commit().await?;

    Ok(PostWithHashtags {
        id: post.id,
        user_id: post.user_id,
        text_content: post.text_content,
        image: post.image,
        created_at: post.created_at,
        hashtags,
    })
}

/// Update an owned post's text and replace its hashtag set wholesale.
/// Returns `None` when the post does not exist or is not owned by
/// `user_id` (the caller reports 404 either way).
pub async fn update_post(
    pool: &PgPool,
    user_id: i64,
    post_id: i64,
    text_content: &str,
    hashtag_names: &[String],
) -> Result<Option<PostWithHashtags>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET text_content = $1
        WHERE id = $2 AND user_id = $3
        RETURNING id, user_id, text_content, image, created_at
        "#,
    )
    .bind(text_content)
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(post) = post else {
        tx.rollback().await?;
        return Ok(None);
    };

    let hashtags = set_hashtags(&mut tx, post.id, hashtag_names).await?;

    tx.commit().await?;

    Ok(Some(PostWithHashtags {
        id: post.id,
        user_id: post.user_id,
        text_content: post.text_content,
        image: post.image,
        created_at: post.created_at,
        hashtags,
    }))
}

/// Delete an owned post. Returns whether a row was removed.
pub async fn delete_post(pool: &PgPool, user_id: i64, post_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record the stored image reference on an owned post.
pub async fn set_post_image(
    pool: &PgPool,
    user_id: i64,
    post_id: i64,
    image: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE posts SET image = $1 WHERE id = $2 AND user_id = $3")
        .bind(image)
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Replace the post's hashtag set with the resolved names.
///
/// Each name is resolved via an atomic get-or-create; the unique index
/// on `hashtags.name` makes this race-safe under concurrent creation,
/// and the pair PK on `post_hashtags` deduplicates repeated names in
/// the input.
async fn set_hashtags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    names: &[String],
) -> Result<Vec<Hashtag>, sqlx::Error> {
    sqlx::query("DELETE FROM post_hashtags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    let mut hashtags: Vec<Hashtag> = Vec::with_capacity(names.len());

    for name in names {
        // DO UPDATE instead of DO NOTHING so RETURNING always yields
        // the row, whether it existed or was just inserted.
        let hashtag = sqlx::query_as::<_, Hashtag>(
            r#"
            INSERT INTO hashtags (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO post_hashtags (post_id, hashtag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(hashtag.id)
        .execute(&mut **tx)
        .await?;

        if !hashtags.iter().any(|h| h.id == hashtag.id) {
            hashtags.push(hashtag);
        }
    }

    Ok(hashtags)
}
