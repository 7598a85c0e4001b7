use sqlx::sqlite::SqlitePool;

use crate::models::auth::Auth;

#[derive(Clone)]
pub struct AuthRepository {
    pool: SqlitePool,
    table: String,
}

impl AuthRepository {
    pub fn new(pool: SqlitePool, table_prefix: &str) -> Self {
        Self {
            pool,
            table: format!("{table_prefix}auth"),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Auth>, sqlx::Error> {
        sqlx::query_as::<_, Auth>(&format!(
            "SELECT id, username, password AS password_hash FROM {} WHERE username = ?",
            self.table
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }
}
