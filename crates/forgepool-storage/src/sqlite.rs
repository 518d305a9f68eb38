//! SQLite implementation of the cache-locality store

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use forgepool_core::{CacheDao, CacheError, PoolConfig};
use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, instrument};

/// Timeout for the SQLite busy handler. When another connection holds the
/// write lock, SQLite retries for this long before returning SQLITE_BUSY.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The one persisted table. `created` is written on every mark but never
/// consulted by placement; it exists for observability and for
/// [`SqliteCacheDao::prune_older_than`].
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cached (
    pool       TEXT NOT NULL,
    cache_hint TEXT NOT NULL,
    worker     TEXT NOT NULL,
    created    TEXT NOT NULL,
    PRIMARY KEY (pool, cache_hint, worker)
);
"#;

/// Cache-locality store over a SQLite database.
///
/// The connection is serialized behind a mutex; callers are the scheduler's
/// suspension-free critical sections, so every call is a short
/// insert-or-replace or an indexed select.
pub struct SqliteCacheDao {
    conn: Mutex<Connection>,
}

impl SqliteCacheDao {
    /// Open or create the cache database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let conn = Connection::open(path.as_ref()).map_err(store_err)?;
        Self::init(conn)
    }

    /// Open the cache database at the path configured for the pool.
    pub fn open_from_config(config: &PoolConfig) -> Result<Self, CacheError> {
        Self::open(&config.cache_db_path)
    }

    /// Open an in-memory database. Useful in tests; loses all locality on
    /// drop, like running without persistence.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, CacheError> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(store_err)?;
        // WAL keeps concurrent readers (admin tooling, backups) cheap.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )
        .map_err(store_err)?;
        conn.execute_batch(SCHEMA).map_err(store_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Delete rows last marked before `cutoff`. Returns the number removed.
    ///
    /// Maintenance hook only: placement never ages entries by itself.
    pub fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CacheError> {
        let removed = self
            .conn
            .lock()
            .execute(
                "DELETE FROM cached WHERE created < ?1",
                [cutoff.to_rfc3339()],
            )
            .map_err(store_err)?;
        if removed > 0 {
            debug!(removed, "pruned cache-locality rows");
        }
        Ok(removed)
    }

    /// Total number of `(pool, hint, worker)` rows.
    pub fn row_count(&self) -> Result<usize, CacheError> {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM cached", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(store_err)
    }
}

impl CacheDao for SqliteCacheDao {
    fn mark_cached(&self, pool: &str, hint: &str, worker: &str) -> Result<(), CacheError> {
        self.conn
            .lock()
            .execute(
                "INSERT OR REPLACE INTO cached (pool, cache_hint, worker, created)
                 VALUES (?1, ?2, ?3, ?4)",
                (pool, hint, worker, Utc::now().to_rfc3339()),
            )
            .map_err(store_err)?;
        Ok(())
    }

    fn query_cache(&self, pool: &str, hint: &str) -> Result<Vec<String>, CacheError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT worker FROM cached
                 WHERE pool = ?1 AND cache_hint = ?2
                 ORDER BY worker ASC",
            )
            .map_err(store_err)?;
        let workers = stmt
            .query_map((pool, hint), |row| row.get(0))
            .map_err(store_err)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(store_err)?;
        Ok(workers)
    }
}

fn store_err(err: rusqlite::Error) -> CacheError {
    CacheError::Store(err.to_string())
}
