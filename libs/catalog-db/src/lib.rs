//! Database plumbing for the catalog: connecting a SeaORM handle over an
//! sqlx pool, classifying store failures, and small query helpers shared by
//! repositories.
//!
//! ```rust,no_run
//! # async fn demo() -> catalog_db::Result<()> {
//! use catalog_db::{connect, ConnectOpts};
//!
//! let db = connect("sqlite::memory:", &ConnectOpts::default()).await?;
//! # drop(db);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod query;

pub use error::{StoreError, StoreErrorKind};

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxPostgresConnector, SqlxSqliteConnector};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

/// Failures while establishing a connection.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: u32,
    pub acquire_timeout: Duration,
    /// SQLite only; ignored for in-memory databases.
    pub busy_timeout: Duration,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: 10,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Detect the engine from the DSN scheme.
pub fn detect(dsn: &str) -> Result<DbEngine> {
    let s = dsn.trim_start();
    if s.starts_with("postgres://") || s.starts_with("postgresql://") {
        Ok(DbEngine::Postgres)
    } else if s.starts_with("sqlite:") {
        Ok(DbEngine::Sqlite)
    } else {
        Err(DbError::UnknownDsn(redact_credentials(dsn)))
    }
}

pub fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Open a pooled connection and wrap it into a SeaORM handle.
pub async fn connect(dsn: &str, opts: &ConnectOpts) -> Result<DatabaseConnection> {
    let engine = detect(dsn)?;
    tracing::debug!(dsn = %redact_credentials(dsn), ?engine, "connecting to database");
    match engine {
        DbEngine::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(opts.max_conns)
                .acquire_timeout(opts.acquire_timeout)
                .connect(dsn)
                .await?;
            Ok(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
        }
        DbEngine::Sqlite => {
            let in_memory = is_sqlite_memory(dsn);
            if !in_memory {
                prepare_sqlite_path(dsn)?;
            }

            let mut options = SqliteConnectOptions::from_str(dsn)?
                .create_if_missing(true)
                .foreign_keys(true);

            let mut pool = SqlitePoolOptions::new().acquire_timeout(opts.acquire_timeout);
            if in_memory {
                // Every connection to :memory: opens a separate database, so the
                // pool must hold exactly one connection for its whole lifetime.
                pool = pool
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None);
            } else {
                options = options
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .busy_timeout(opts.busy_timeout);
                pool = pool.max_connections(opts.max_conns);
            }

            let pool = pool.connect_with(options).await?;
            Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
        }
    }
}

/// Rewrite a relative SQLite file DSN so that it points under `base_dir`.
/// Other DSNs are returned unchanged.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> String {
    if is_sqlite_memory(dsn) {
        return dsn.to_string();
    }
    let Some(rest) = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
    else {
        return dsn.to_string();
    };

    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path.is_empty() || Path::new(path).is_absolute() {
        return dsn.to_string();
    }

    let absolute = base_dir.join(path).to_string_lossy().replace('\\', "/");
    match query {
        Some(q) => format!("sqlite://{absolute}?{q}"),
        None => format!("sqlite://{absolute}"),
    }
}

fn prepare_sqlite_path(dsn: &str) -> Result<()> {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    let path = rest.split('?').next().unwrap_or(rest);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Mask the password component of a URL-shaped DSN for logging.
pub fn redact_credentials(dsn: &str) -> String {
    match url::Url::parse(dsn) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => dsn.to_string(),
    }
}
