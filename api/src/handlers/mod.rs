pub mod auth;
pub mod tag;
