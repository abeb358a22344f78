/*!
 * Database connection management.
 *
 * One SQLite connection per process, shared behind `Arc<Mutex<_>>`. Every
 * connection is prepared the same way before use: foreign keys on (scene,
 * analysis and plan rows cascade with their project), WAL journaling for
 * on-disk files, then schema creation or migration. Async callers go through
 * `spawn_blocking` so SQLite never blocks the runtime.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::schema;
use crate::app_config::StorageConfig;

/// Database file name inside the data directory
const DEFAULT_DB_FILENAME: &str = "scriptcut.db";

/// Application directory under the platform data directory
const DEFAULT_DB_DIRNAME: &str = "scriptcut";

/// Path reported for in-memory databases
const IN_MEMORY_PATH: &str = ":memory:";

/// Shared handle on the project database
#[derive(Clone)]
pub struct DatabaseConnection {
    // @field: Database file, or ":memory:"
    db_path: PathBuf,

    // @field: The prepared connection
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the database named by `storage.database_path`, or the default one
    pub fn from_storage(storage: &StorageConfig) -> Result<Self> {
        match &storage.database_path {
            Some(path) => Self::new(path),
            None => Self::new_default(),
        }
    }

    /// Open the database in the platform data directory
    pub fn new_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Open (or create) the database file at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening project database at {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Self::prepare(conn, db_path)
    }

    /// In-memory database, used by tests
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory project database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        Self::prepare(conn, PathBuf::from(IN_MEMORY_PATH))
    }

    // Per-connection settings, then schema
    fn prepare(conn: Connection, db_path: PathBuf) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .context("Failed to enable foreign keys")?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/scriptcut/scriptcut.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether this is an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_PATH
    }

    fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
        connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))
    }

    /// Run `f` with the connection on the current thread
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = Self::lock(&self.connection)?;
        f(&conn)
    }

    /// Run `f` with the connection on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = Self::lock(&connection)?;
            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Run `f` inside a transaction on the blocking pool; commits only if `f` succeeds
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = Self::lock(&connection)?;
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Row counts and file size
    pub fn stats(&self) -> Result<DatabaseStats> {
        let file_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0)
        };

        self.execute(|conn| {
            let count = |table: &str| -> Result<i64> {
                let sql = format!("SELECT COUNT(*) FROM {}", table);
                Ok(conn.query_row(&sql, [], |row| row.get(0))?)
            };

            Ok(DatabaseStats {
                project_count: count("projects")?,
                scene_count: count("scenes")?,
                analysis_count: count("analysis_results")?,
                action_plan_count: count("action_plans")?,
                file_size_bytes,
            })
        })
    }
}

/// What the project database holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    pub project_count: i64,
    pub scene_count: i64,
    pub analysis_count: i64,
    pub action_plan_count: i64,
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Projects: {}, Scenes: {}, Analyses: {}, Plans: {}, Size: {} KB",
            self.project_count,
            self.scene_count,
            self.analysis_count,
            self.action_plan_count,
            self.file_size_bytes / 1024
        )
    }
}
