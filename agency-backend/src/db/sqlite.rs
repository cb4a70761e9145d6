use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use std::path::Path;

use crate::error::AppResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Applied to every pooled connection
const CONNECTION_PRAGMAS: &str =
    "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;";

pub struct Database {
    pool: DbPool,
}

impl Database {
    pub fn new(database_url: &str, pool_size: u32) -> AppResult<Self> {
        if database_url == ":memory:" {
            return Self::open_in_memory();
        }

        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!("Could not create database directory {:?}: {}", parent, e);
                }
            }
        }

        let manager = SqliteConnectionManager::file(database_url)
            .with_init(|c| c.execute_batch(CONNECTION_PRAGMAS));
        let pool = Pool::builder().max_size(pool_size).build(manager)?;

        let db = Self { pool };
        db.init()?;
        Ok(db)
    }

    /// Every in-memory connection is its own database, so the pool is pinned to one.
    pub fn open_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|c| c.execute_batch(CONNECTION_PRAGMAS));
        let pool = Pool::builder().max_size(1).build(manager)?;

        let db = Self { pool };
        db.init()?;
        Ok(db)
    }

    /// Check out a pooled connection. Callers must drop it before calling
    /// another `Database` method.
    pub(crate) fn conn(&self) -> AppResult<DbConn> {
        Ok(self.pool.get()?)
    }

    fn init(&self) -> AppResult<()> {
        let conn = self.conn()?;

        // Leads table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS leads (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                company TEXT NOT NULL,
                phone TEXT NOT NULL,
                business_type TEXT,
                company_size TEXT,
                annual_revenue TEXT,
                client_value TEXT,
                marketing_needs TEXT,
                timeline TEXT,
                budget TEXT,
                source TEXT,
                message TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads(created_at DESC)",
            [],
        )?;

        // Lead timeline milestones
        conn.execute(
            "CREATE TABLE IF NOT EXISTS lead_milestones (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                lead_id TEXT NOT NULL,
                milestone_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                position INTEGER NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                completed_at TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (lead_id) REFERENCES leads(id),
                UNIQUE(lead_id, milestone_id)
            )",
            [],
        )?;

        // Chatbot conversation log (append-only)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                visitor_id TEXT NOT NULL,
                message TEXT NOT NULL,
                is_bot INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_conversations_visitor ON conversations(visitor_id, created_at, id)",
            [],
        )?;

        // Marketing settings (single row, id pinned to 1)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS marketing_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                ga_enabled INTEGER NOT NULL DEFAULT 0,
                ga_measurement_id TEXT,
                fb_capi_enabled INTEGER NOT NULL DEFAULT 0,
                fb_pixel_id TEXT,
                fb_access_token TEXT,
                ga_settings TEXT NOT NULL DEFAULT '{}',
                fb_settings TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

/// Current time at the precision the database stores
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed precision keeps lexical order equal to chronological order
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}
