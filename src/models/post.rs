use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::hashtag::{Hashtag, HashtagName};

/// Represents the 'posts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub text_content: String,

    /// Reference to an uploaded image under the media root, if any.
    pub image: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// List shape: lightweight row with aggregate counts and bare hashtag names.
/// Counts come from correlated subqueries; hashtags are batch-prefetched.
#[derive(Debug, Serialize, FromRow)]
pub struct PostListItem {
    pub id: i64,
    pub user_id: i64,
    pub text_content: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub likes_amount: i64,
    pub comments_amount: i64,

    #[sqlx(skip)]
    pub hashtags: Vec<String>,
}

/// Detail shape: expanded comments and liking usernames instead of counts.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub id: i64,
    pub user_id: i64,
    pub text_content: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub hashtags: Vec<String>,
    pub comments: Vec<PostCommentEntry>,
    pub likes: Vec<String>,
}

/// Comment entry inside the post detail shape.
#[derive(Debug, Serialize, FromRow)]
pub struct PostCommentEntry {
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub comment_contents: String,
}

/// Create/update echo shape: the entity with full hashtag objects.
#[derive(Debug, Serialize)]
pub struct PostWithHashtags {
    pub id: i64,
    pub user_id: i64,
    pub text_content: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub hashtags: Vec<Hashtag>,
}

/// DTO for creating or updating a post together with its hashtag set.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "Post content must be between 1 and 10000 chars"
    ))]
    pub text_content: String,

    /// Replaces the post's hashtag set wholesale; empty list clears it.
    #[serde(default)]
    #[validate(nested)]
    pub hashtags: Vec<HashtagName>,
}

/// Query parameters for listing posts.
#[derive(Debug, Deserialize)]
pub struct PostListParams {
    /// Case-insensitive substring filter on hashtag names.
    pub hashtags: Option<String>,
}
