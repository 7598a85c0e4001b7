pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod rest;
pub mod token;

use sqlx::sqlite::SqlitePool;

use crate::{
    config::Settings,
    db::{AuthRepository, TagRepository},
    models::tag::Tag,
    token::{TokenError, TokenService},
};

#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub tags: TagRepository,
    pub auth: AuthRepository,
    pub page_size: u32,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: &Settings) -> Result<Self, TokenError> {
        let prefix = &settings.database.table_prefix;
        Ok(Self {
            tokens: TokenService::new(&settings.app.jwt_secret)?,
            tags: TagRepository::new(pool.clone(), prefix, Tag::HOOKS),
            auth: AuthRepository::new(pool, prefix),
            page_size: settings.app.page_size,
        })
    }
}
