use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'user_profiles' table in the database.
/// At most one profile per user, created explicitly after registration.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: i64,
    pub bio: String,
    pub picture: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// List shape: profile row with owner username and follower count.
#[derive(Debug, Serialize, FromRow)]
pub struct ProfileListItem {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub bio: String,
    pub picture: Option<String>,
    pub followers_amount: i64,
}

/// Detail shape: follower usernames expanded instead of a count.
#[derive(Debug, Serialize, FromRow)]
pub struct ProfileDetail {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub bio: String,
    pub picture: Option<String>,

    #[sqlx(skip)]
    pub followed_by: Vec<String>,
}

/// DTO for creating or updating the requester's own profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertProfileRequest {
    #[validate(length(max = 1000, message = "Bio must be at most 1000 characters"))]
    #[serde(default)]
    pub bio: String,

    #[validate(length(max = 500))]
    pub picture: Option<String>,
}

/// Query parameters for listing profiles.
#[derive(Debug, Deserialize)]
pub struct ProfileListParams {
    /// Case-insensitive substring filter on the owner's username.
    pub username: Option<String>,
}
