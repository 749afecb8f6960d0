// src/handlers/mod.rs

pub mod auth;
pub mod comments;
pub mod my_posts;
pub mod posts;
pub mod profiles;
