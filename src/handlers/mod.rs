//! API Handlers

pub mod posts;
pub mod users;
