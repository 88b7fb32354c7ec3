use sqlx::{Pool, Sqlite};

mod operations;
mod records;
mod reminders;

/// SQLite-backed local store for the operation queue, entity documents and reminders.
#[derive(Clone)]
pub struct SqliteOfflineStore {
    pool: Pool<Sqlite>,
}

impl SqliteOfflineStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
