use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'hashtags' table in the database.
/// Names are unique; rows are created lazily on first use in a post.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: i64,
    pub name: String,
}

/// Nested hashtag object accepted when creating/updating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct HashtagName {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Hashtag name must be between 1 and 100 characters"
    ))]
    pub name: String,
}
