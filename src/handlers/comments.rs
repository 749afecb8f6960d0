// src/handlers/comments.rs
//
// The requester's own comments. Owner scoping happens in the repo
// queries; a comment belonging to someone else resolves to 404.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::comment::CreateCommentRequest,
    repo::comments,
    utils::{html::clean_html, jwt::Claims},
};

pub async fn list_comments(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let comments = comments::list_own(&pool, claims.user_id()?).await?;

    Ok(Json(comments))
}

pub async fn get_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comment = comments::get_own(&pool, claims.user_id()?, id)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    Ok(Json(comment))
}

pub async fn update_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let contents = clean_html(&payload.comment_contents);

    let comment = comments::update_own(&pool, claims.user_id()?, id, &contents)
        .await?
        .ok_or(AppError::NotFound("Comment not found".to_string()))?;

    Ok(Json(comment))
}

pub async fn delete_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = comments::delete_own(&pool, claims.user_id()?, id).await?;

    if !deleted {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
