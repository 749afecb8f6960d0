// src/utils/storage.rs

use std::path::Path;

use axum::body::Bytes;
use uuid::Uuid;

use crate::error::AppError;

/// Store an uploaded post image under the media root.
///
/// The file is keyed by post id, owner id and a generated unique suffix
/// so repeated uploads never collide. Returns the reference served back
/// by the static media route.
pub async fn store_post_image(
    media_root: &str,
    post_id: i64,
    owner_id: i64,
    content_type: &str,
    data: Bytes,
) -> Result<String, AppError> {
    let ext = ext_from_mime(content_type).ok_or_else(|| {
        AppError::BadRequest(format!("Unsupported image type '{}'", content_type))
    })?;

    let filename = format!("post_{}_{}_{}.{}", post_id, owner_id, Uuid::new_v4(), ext);
    let dir = Path::new(media_root).join("posts");

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tokio::fs::write(dir.join(&filename), &data)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(format!("/media/posts/{}", filename))
}

fn ext_from_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
