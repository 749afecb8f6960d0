// src/repo/mod.rs
//
// Data-access layer over the relational store. Handlers stay thin and
// translate repo-level errors into client-facing responses.

pub mod comments;
pub mod feed;
pub mod posts;
pub mod profiles;
pub mod social;
pub mod users;
