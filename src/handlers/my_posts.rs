// src/handlers/my_posts.rs
//
// CRUD over the requester's own posts. Every lookup is owner-scoped, so
// another user's post id answers 404 rather than 403.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::post::{CreatePostRequest, PostListParams},
    repo::{feed, posts},
    utils::{html::clean_html, jwt::Claims, storage},
};

fn hashtag_names(payload: &CreatePostRequest) -> Vec<String> {
    payload
        .hashtags
        .iter()
        .map(|h| h.name.trim().to_string())
        .collect()
}

/// List the requester's posts with counts attached.
pub async fn list_my_posts(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let posts = feed::my_posts(&pool, claims.user_id()?, params.hashtags.as_deref()).await?;

    Ok(Json(posts))
}

/// Create a post together with its hashtag set, atomically.
pub async fn create_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let text = clean_html(&payload.text_content);
    let names = hashtag_names(&payload);

    let post = posts::create_post(&pool, claims.user_id()?, &text, &names)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Get one of the requester's posts in the detail shape.
pub async fn get_my_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let post = feed::owned_post(&pool, claims.user_id()?, id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let detail = feed::post_detail(&pool, post).await?;

    Ok(Json(detail))
}

/// Update the post's text and replace its hashtag set wholesale.
/// An empty hashtag list clears all associations.
pub async fn update_my_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let text = clean_html(&payload.text_content);
    let names = hashtag_names(&payload);

    let post = posts::update_post(&pool, claims.user_id()?, id, &text, &names)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

pub async fn delete_my_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = posts::delete_post(&pool, claims.user_id()?, id).await?;

    if !deleted {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Upload an image for one of the requester's posts.
///
/// Accepts a multipart form with an 'image' field; the blob is stored
/// under the media root and the reference persisted on the post.
pub async fn upload_image(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    feed::owned_post(&pool, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let image =
            storage::store_post_image(&config.media_root, id, user_id, &content_type, data)
                .await?;

        posts::set_post_image(&pool, user_id, id, &image).await?;

        return Ok(Json(json!({ "id": id, "image": image })));
    }

    Err(AppError::BadRequest("No 'image' field provided".to_string()))
}
