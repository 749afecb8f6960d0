// src/models/mod.rs

pub mod comment;
pub mod hashtag;
pub mod post;
pub mod profile;
pub mod user;
