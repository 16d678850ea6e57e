use std::path::Path;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Opens the operational database in read-only mode.
///
/// Called exactly once at startup; a missing or corrupt database file
/// is not a transient condition, so there is no retry and the caller
/// treats any error here as fatal. Processing is fully sequential, so
/// a single connection is enough.
pub async fn open_read_only(path: &Path) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .with_context(|| format!("opening database {} read-only", path.display()))?;

    Ok(pool)
}
