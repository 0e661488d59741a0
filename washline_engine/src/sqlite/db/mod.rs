//! # SQLite database methods
//!
//! The low-level database interactions, one submodule per collection.
//!
//! Everything here is a plain async function taking a `&mut SqliteConnection`, so the same code runs
//! against a pooled connection or inside a transaction; [`crate::SqliteStore`] decides which. The
//! submodules never commit or roll back themselves.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod copies;
pub mod directory;
pub mod notifications;
pub mod orders;

mod rows;

const SQLITE_DB_URL: &str = "sqlite://data/washline.db";

pub fn db_url() -> String {
    let result = env::var("WASHLINE_DATABASE_URL").unwrap_or_else(|_| {
        info!("WASHLINE_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    // WAL, so reads (resolver lookups, notification fetches) keep going while a copy write
    // transaction is open.
    let options = SqliteConnectOptions::from_str(url)?.journal_mode(SqliteJournalMode::Wal);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
