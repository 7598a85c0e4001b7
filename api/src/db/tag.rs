use sqlx::{
    sqlite::{Sqlite, SqlitePool},
    QueryBuilder,
};

use crate::models::{
    tag::{Tag, TagFilter},
    PersistHooks,
};

const COLUMNS: &str = "id, name, state, created_by, modified_by, created_on, modified_on";

#[derive(Clone)]
pub struct TagRepository {
    pool: SqlitePool,
    table: String,
    hooks: PersistHooks<Tag>,
}

impl TagRepository {
    pub fn new(pool: SqlitePool, table_prefix: &str, hooks: PersistHooks<Tag>) -> Self {
        Self {
            pool,
            table: format!("{table_prefix}tag"),
            hooks,
        }
    }

    pub async fn exists_by_name(&self, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE name = ?)",
            self.table
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = ?",
            self.table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Inserts `tag` after running the create hook and returns the stored row.
    /// Name uniqueness is the caller's check via [`Self::exists_by_name`].
    pub async fn create(&self, mut tag: Tag) -> Result<Tag, sqlx::Error> {
        (self.hooks.before_create)(&mut tag, chrono::Utc::now().timestamp());

        let result = sqlx::query(&format!(
            "INSERT INTO {} (name, state, created_by, modified_by, created_on, modified_on) \
             VALUES (?, ?, ?, ?, ?, ?)",
            self.table
        ))
        .bind(&tag.name)
        .bind(tag.state)
        .bind(&tag.created_by)
        .bind(&tag.modified_by)
        .bind(tag.created_on)
        .bind(tag.modified_on)
        .execute(&self.pool)
        .await?;

        tag.id = result.last_insert_rowid();
        tracing::debug!(id = tag.id, name = %tag.name, "tag created");
        Ok(tag)
    }

    /// Writes every mutable column of `tag` back after running the update hook.
    pub async fn edit(&self, mut tag: Tag) -> Result<Tag, sqlx::Error> {
        (self.hooks.before_update)(&mut tag, chrono::Utc::now().timestamp());

        sqlx::query(&format!(
            "UPDATE {} SET name = ?, state = ?, modified_by = ?, modified_on = ? WHERE id = ?",
            self.table
        ))
        .bind(&tag.name)
        .bind(tag.state)
        .bind(&tag.modified_by)
        .bind(tag.modified_on)
        .bind(tag.id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = tag.id, "tag updated");
        Ok(tag)
    }

    pub async fn list(
        &self,
        filter: &TagFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM {}", self.table));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        qb.build_query_as::<Tag>().fetch_all(&self.pool).await
    }

    pub async fn count(&self, filter: &TagFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {}", self.table));
        push_filter(&mut qb, filter);

        qb.build_query_scalar::<i64>().fetch_one(&self.pool).await
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TagFilter) {
    let mut sep = " WHERE ";
    if let Some(name) = &filter.name {
        qb.push(sep).push("name = ").push_bind(name.clone());
        sep = " AND ";
    }
    if let Some(state) = filter.state {
        qb.push(sep).push("state = ").push_bind(state);
    }
}
