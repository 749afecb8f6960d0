// src/repo/feed.rs
//
// Feed query composition: which posts a requester sees, with derived
// counts for the list shape and expanded payloads for the detail shape.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::models::post::{Post, PostCommentEntry, PostDetail, PostListItem};

/// Correlated subqueries keep the counts exact regardless of how many
/// join rows a post has (no aggregate inflation).
const LIST_COLUMNS: &str = r#"
    p.id, p.user_id, p.text_content, p.image, p.created_at,
    (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS likes_amount,
    (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_amount
"#;

const HASHTAG_FILTER: &str = r#"
    ($2::TEXT IS NULL OR EXISTS (
        SELECT 1 FROM post_hashtags ph
        JOIN hashtags h ON h.id = ph.hashtag_id
        WHERE ph.post_id = p.id AND h.name ILIKE '%' || $2 || '%'
    ))
"#;

/// All-posts feed.
///
/// Authenticated requesters see posts from owners whose profile lists
/// them as a follower, excluding their own posts. Anonymous requesters
/// fall back to an unrestricted feed.
pub async fn all_posts(
    pool: &PgPool,
    requester: Option<i64>,
    hashtag: Option<&str>,
) -> Result<Vec<PostListItem>, sqlx::Error> {
    let posts = match requester {
        Some(user_id) => {
            let sql = format!(
                r#"
                SELECT {LIST_COLUMNS}
                FROM posts p
                JOIN user_profiles up ON up.user_id = p.user_id
                JOIN profile_followers pf ON pf.profile_id = up.id AND pf.user_id = $1
                WHERE p.user_id <> $1
                  AND {HASHTAG_FILTER}
                ORDER BY p.created_at DESC
                "#
            );
            sqlx::query_as::<_, PostListItem>(&sql)
                .bind(user_id)
                .bind(hashtag)
                .fetch_all(pool)
                .await?
        }
        None => {
            // Anonymous feed keeps the same parameter positions so the
            // shared filter fragment applies unchanged.
            let sql = format!(
                r#"
                SELECT {LIST_COLUMNS}
                FROM posts p
                WHERE $1::BIGINT IS NULL
                  AND {HASHTAG_FILTER}
                ORDER BY p.created_at DESC
                "#
            );
            sqlx::query_as::<_, PostListItem>(&sql)
                .bind(None::<i64>)
                .bind(hashtag)
                .fetch_all(pool)
                .await?
        }
    };

    attach_hashtags(pool, posts).await
}

/// My-posts feed: the requester's own posts, counts attached, no
/// visibility filtering.
pub async fn my_posts(
    pool: &PgPool,
    user_id: i64,
    hashtag: Option<&str>,
) -> Result<Vec<PostListItem>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LIST_COLUMNS}
        FROM posts p
        WHERE p.user_id = $1
          AND {HASHTAG_FILTER}
        ORDER BY p.created_at DESC
        "#
    );
    let posts = sqlx::query_as::<_, PostListItem>(&sql)
        .bind(user_id)
        .bind(hashtag)
        .fetch_all(pool)
        .await?;

    attach_hashtags(pool, posts).await
}

/// Posts the requester currently likes.
pub async fn liked_posts(pool: &PgPool, user_id: i64) -> Result<Vec<PostListItem>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LIST_COLUMNS}
        FROM posts p
        JOIN post_likes pl ON pl.post_id = p.id AND pl.user_id = $1
        ORDER BY p.created_at DESC
        "#
    );
    let posts = sqlx::query_as::<_, PostListItem>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    attach_hashtags(pool, posts).await
}

/// Resolve a post through the same visibility restriction as the
/// all-posts feed, so detail lookups 404 outside the requester's feed.
pub async fn visible_post(
    pool: &PgPool,
    requester: Option<i64>,
    post_id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    match requester {
        Some(user_id) => {
            sqlx::query_as::<_, Post>(
                r#"
                SELECT p.id, p.user_id, p.text_content, p.image, p.created_at
                FROM posts p
                JOIN user_profiles up ON up.user_id = p.user_id
                JOIN profile_followers pf ON pf.profile_id = up.id AND pf.user_id = $1
                WHERE p.id = $2 AND p.user_id <> $1
                "#,
            )
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Post>(
                "SELECT id, user_id, text_content, image, created_at FROM posts WHERE id = $1",
            )
            .bind(post_id)
            .fetch_optional(pool)
            .await
        }
    }
}

/// Resolve a post owned by the requester (my-posts scope).
pub async fn owned_post(
    pool: &PgPool,
    user_id: i64,
    post_id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, text_content, image, created_at
        FROM posts
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Expand a resolved post into the detail shape: hashtag names, comments
/// as (username, timestamp, text), likes as bare usernames.
pub async fn post_detail(pool: &PgPool, post: Post) -> Result<PostDetail, sqlx::Error> {
    let hashtags = sqlx::query_scalar::<_, String>(
        r#"
        SELECT h.name
        FROM post_hashtags ph
        JOIN hashtags h ON h.id = ph.hashtag_id
        WHERE ph.post_id = $1
        ORDER BY h.name
        "#,
    )
    .bind(post.id)
    .fetch_all(pool)
    .await?;

    let comments = sqlx::query_as::<_, PostCommentEntry>(
        r#"
        SELECT u.username, c.created_at, c.comment_contents
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post.id)
    .fetch_all(pool)
    .await?;

    let likes = sqlx::query_scalar::<_, String>(
        r#"
        SELECT u.username
        FROM post_likes pl
        JOIN users u ON u.id = pl.user_id
        WHERE pl.post_id = $1
        ORDER BY pl.created_at ASC
        "#,
    )
    .bind(post.id)
    .fetch_all(pool)
    .await?;

    Ok(PostDetail {
        id: post.id,
        user_id: post.user_id,
        text_content: post.text_content,
        image: post.image,
        created_at: post.created_at,
        hashtags,
        comments,
        likes,
    })
}

/// Batch-prefetch hashtag names for a page of posts with a single query.
async fn attach_hashtags(
    pool: &PgPool,
    mut posts: Vec<PostListItem>,
) -> Result<Vec<PostListItem>, sqlx::Error> {
    if posts.is_empty() {
        return Ok(posts);
    }

    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();

    let rows = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT ph.post_id, h.name
        FROM post_hashtags ph
        JOIN hashtags h ON h.id = ph.hashtag_id
        WHERE ph.post_id = ANY($1)
        ORDER BY h.name
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_post: HashMap<i64, Vec<String>> = HashMap::new();
    for (post_id, name) in rows {
        by_post.entry(post_id).or_default().push(name);
    }

    for post in &mut posts {
        if let Some(tags) = by_post.remove(&post.id) {
            post.hashtags = tags;
        }
    }

    Ok(posts)
}
