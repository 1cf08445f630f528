use crate::db::models::{NewPlay, PlayRecord};
use crate::db::schema::{CONF_KEYS, SQLITE_INIT};
use crate::error::VaultError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

pub type SqlitePool = Pool<Sqlite>;

/// Rows returned per page by `get_page`.
pub const PAGE_SIZE: i64 = 30;

/// Storage service owning the SQLite pool. All mutations (credential writes
/// and play inserts) serialize on `write_lock`; reads go straight to the
/// pool under SQLite's own isolation.
#[derive(Clone)]
pub struct TrackStorage {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl TrackStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open (creating if missing) the database at `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, VaultError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL, then verify that
    /// every conf key exists. `conf_set` is update-only, so a missing row
    /// here is a bootstrap bug worth failing on, not a latent surprise.
    pub async fn init_schema(&self) -> Result<(), VaultError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }

        for key in CONF_KEYS {
            sqlx::query("SELECT key FROM conf WHERE key = ?")
                .bind(key)
                .fetch_one(&self.pool)
                .await?;
        }
        Ok(())
    }

    /// Read a conf value. Absent or unset keys read as the empty string,
    /// never as an error.
    pub async fn conf_get(&self, key: &str) -> Result<String, VaultError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM conf WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value.unwrap_or_default())
    }

    /// Overwrite a conf value. The row is provisioned at bootstrap, so this
    /// is strictly an UPDATE; touching zero rows means the invariant broke.
    pub async fn conf_set(&self, key: &str, value: &str) -> Result<(), VaultError> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query("UPDATE conf SET value = ? WHERE key = ?")
            .bind(value)
            .bind(key)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(VaultError::Storage(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    /// Insert a play record and return its id. A conflicting `played_at`
    /// (lost race with a concurrent dedup check) is absorbed: the existing
    /// row's id is returned instead of an error.
    pub async fn insert_track(&self, new: &NewPlay) -> Result<i64, VaultError> {
        let _guard = self.write_lock.lock().await;
        let result = sqlx::query(
            r#"
            INSERT INTO music (artist, album, name, uri, add_time, played_at)
            VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, ?)
            ON CONFLICT(played_at) DO NOTHING
            "#,
        )
        .bind(&new.artist)
        .bind(&new.album)
        .bind(&new.name)
        .bind(&new.uri)
        .bind(&new.played_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let rec: (i64,) = sqlx::query_as("SELECT id FROM music WHERE played_at = ?")
                .bind(&new.played_at)
                .fetch_one(&self.pool)
                .await?;
            return Ok(rec.0);
        }
        Ok(result.last_insert_rowid())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<PlayRecord, VaultError> {
        let record = sqlx::query_as::<_, PlayRecord>(
            r#"SELECT id, artist, album, name, uri, add_time, played_at
               FROM music WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        record.ok_or(VaultError::NotFound)
    }

    /// Keyset page over play records: page 0 is the latest `PAGE_SIZE` ids,
    /// page N the window before that, newest first. The window is computed
    /// from the live MAX(id), so pages shift under concurrent inserts.
    pub async fn get_page(&self, page: i64) -> Result<Vec<PlayRecord>, VaultError> {
        let max_id: Option<i64> = sqlx::query_scalar("SELECT MAX(id) FROM music")
            .fetch_one(&self.pool)
            .await?;
        let max_id = max_id.unwrap_or(0);

        let min_page_id = max_id - PAGE_SIZE * (page + 1);
        let max_page_id = min_page_id + PAGE_SIZE;

        let rows = sqlx::query_as::<_, PlayRecord>(
            r#"SELECT id, artist, album, name, uri, add_time, played_at
               FROM music
               WHERE id > ? AND id <= ?
               ORDER BY id DESC"#,
        )
        .bind(min_page_id)
        .bind(max_page_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Dedup probe for the sync engine: is this natural key already stored?
    pub async fn played_at_exists(&self, played_at: &str) -> Result<bool, VaultError> {
        let row: Option<i64> = sqlx::query_scalar("SELECT id FROM music WHERE played_at = ?")
            .bind(played_at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
