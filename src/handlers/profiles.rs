// src/handlers/profiles.rs
//
// Profile browsing, the follow toggle and own-profile CRUD. Repo-level
// invariant violations (self-follow, duplicate profile) are translated
// to client-facing validation errors here.

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
    models::profile::{ProfileListParams, UpsertProfileRequest},
    repo::{
        profiles,
        profiles::ProfileError,
        social,
        social::FollowError,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// List all profiles except the requester's own, with follower counts.
/// Supports ?username= case-insensitive substring filtering.
pub async fn list_profiles(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ProfileListParams>,
) -> Result<impl IntoResponse, AppError> {
    let profiles =
        profiles::list_profiles(&pool, claims.user_id()?, params.username.as_deref()).await?;

    Ok(Json(profiles))
}

/// Get another user's profile in the detail shape.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let profile = profiles::profile_detail(&pool, claims.user_id()?, id)
        .await?
        .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Toggle following the specified profile. Returns 200 with no body.
pub async fn follow_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    social::toggle_follow(&pool, id, claims.user_id()?)
        .await
        .map_err(|e| match e {
            FollowError::ProfileNotFound => AppError::NotFound("Profile not found".to_string()),
            FollowError::SelfFollow => {
                AppError::BadRequest("You cannot follow your own profile.".to_string())
            }
            FollowError::Db(e) => AppError::from(e),
        })?;

    Ok(StatusCode::OK)
}

/// Profiles the requester is following.
pub async fn following(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let profiles = profiles::following(&pool, claims.user_id()?).await?;

    Ok(Json(profiles))
}

/// Get the requester's own profile.
pub async fn get_my_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let profile = profiles::my_profile(&pool, claims.user_id()?)
        .await?
        .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Create the requester's profile. At most one profile per user.
pub async fn create_my_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let bio = clean_html(&payload.bio);

    let profile =
        profiles::create_profile(&pool, claims.user_id()?, &bio, payload.picture.as_deref())
            .await
            .map_err(|e| match e {
                ProfileError::AlreadyExists => {
                    AppError::BadRequest("A profile already exists for this user.".to_string())
                }
                ProfileError::Db(e) => {
                    tracing::error!("Failed to create profile: {:?}", e);
                    AppError::from(e)
                }
            })?;

    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn update_my_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let bio = clean_html(&payload.bio);

    let profile =
        profiles::update_my_profile(&pool, claims.user_id()?, &bio, payload.picture.as_deref())
            .await?
            .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

pub async fn delete_my_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = profiles::delete_my_profile(&pool, claims.user_id()?).await?;

    if !deleted {
        return Err(AppError::NotFound("Profile not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Users who follow the requester's profile.
pub async fn my_followers(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let followers = profiles::my_followers(&pool, claims.user_id()?)
        .await?
        .ok_or(AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(followers))
}
