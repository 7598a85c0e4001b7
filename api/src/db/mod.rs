pub mod auth;
pub mod tag;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseSettings;

pub use auth::AuthRepository;
pub use tag::TagRepository;

pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.url)
        .await?;
    tracing::info!(max_connections = settings.max_connections, "database pool ready");
    Ok(pool)
}
