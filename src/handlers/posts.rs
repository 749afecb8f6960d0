// src/handlers/posts.rs
//
// The all-posts feed and its detail-scoped actions. Visibility is
// decided by the feed composer: actions resolve the post through the
// same restriction, so a post outside the requester's feed is a 404.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{comment::CreateCommentRequest, post::PostListParams},
    repo::{feed, social},
    utils::{html::clean_html, jwt::Claims},
};

/// List the requester's feed.
///
/// Authenticated: posts from followed owners, own posts excluded.
/// Anonymous: unrestricted feed of all posts.
/// Supports ?hashtags= case-insensitive substring filtering.
pub async fn list_posts(
    State(pool): State<PgPool>,
    claims: Option<Extension<Claims>>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let requester = claims.map(|Extension(c)| c.user_id()).transpose()?;

    let posts = feed::all_posts(&pool, requester, params.hashtags.as_deref()).await?;

    Ok(Json(posts))
}

/// Get a single feed post in the detail shape.
pub async fn get_post(
    State(pool): State<PgPool>,
    claims: Option<Extension<Claims>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let requester = claims.map(|Extension(c)| c.user_id()).transpose()?;

    let post = feed::visible_post(&pool, requester, id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let detail = feed::post_detail(&pool, post).await?;

    Ok(Json(detail))
}

/// Toggle Like on a post. Returns 200 with no body.
pub async fn like_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    feed::visible_post(&pool, Some(user_id), post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    social::toggle_like(&pool, post_id, user_id)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                // Concurrent request handled gracefully
                AppError::Conflict("Already liked".to_string())
            } else {
                AppError::from(e)
            }
        })?;

    Ok(StatusCode::OK)
}

/// Post a comment to the specified post.
pub async fn comment_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = claims.user_id()?;

    feed::visible_post(&pool, Some(user_id), post_id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let contents = clean_html(&payload.comment_contents);

    let comment = social::add_comment(&pool, post_id, user_id, &contents).await?;

    Ok(Json(comment))
}

/// List all posts the requester currently likes.
pub async fn liked_posts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let posts = feed::liked_posts(&pool, claims.user_id()?).await?;

    Ok(Json(posts))
}
