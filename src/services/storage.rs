use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::models::{NewStakingRecord, StakingRecord};

pub type Db = Arc<Mutex<Connection>>;

const COLUMNS: &str = "id, id_protocol, address_token, address_staking, name_token, name_project, \
                       chain, apy, tvl, stablecoin, categories, logo, created_at, updated_at";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("encoding categories: {0}")]
    Encode(#[from] serde_json::Error),
}

/// SQLite-backed staking records, one row per token address.
#[derive(Clone)]
pub struct StakingStore {
    db: Db,
}

impl StakingStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating db directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("opening sqlite at {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;

        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrate(&conn).context("migrating staking schema")?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new token row, or overwrite `apy`, `tvl` and `updated_at`
    /// of the existing one. A single statement, so concurrent refreshes of
    /// different tokens never interleave.
    pub async fn upsert(&self, rec: &NewStakingRecord) -> Result<StakingRecord, StoreError> {
        let categories = serde_json::to_string(&rec.categories)?;
        let sql = format!(
            "INSERT INTO staking (id_protocol, address_token, address_staking, name_token, name_project,
                                  chain, apy, tvl, stablecoin, categories, logo, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
             ON CONFLICT(address_token) DO UPDATE SET
                 tvl = excluded.tvl,
                 apy = excluded.apy,
                 updated_at = excluded.updated_at
             RETURNING {COLUMNS}"
        );

        let db = self.db.lock().await;
        let record = db.query_row(
            &sql,
            params![
                rec.id_protocol,
                rec.address_token,
                rec.address_staking,
                rec.name_token,
                rec.name_project,
                rec.chain,
                rec.apy,
                rec.tvl,
                rec.stablecoin,
                categories,
                rec.logo,
                rec.updated_at,
            ],
            row_to_record,
        )?;

        tracing::debug!(
            "💾 Upserted {} (apy={}, tvl={})",
            record.id_protocol,
            record.apy,
            record.tvl
        );
        Ok(record)
    }

    pub async fn find_all(&self) -> Result<Vec<StakingRecord>, StoreError> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!("SELECT {COLUMNS} FROM staking ORDER BY id"))?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub async fn find_by_protocol(&self, id_protocol: &str) -> Result<Vec<StakingRecord>, StoreError> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {COLUMNS} FROM staking WHERE id_protocol = ?1 ORDER BY id"
        ))?;
        let records = stmt
            .query_map([id_protocol], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub async fn find_by_token_address(&self, address: &str) -> Result<Option<StakingRecord>, StoreError> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!("SELECT {COLUMNS} FROM staking WHERE address_token = ?1"),
                [address],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        let db = self.db.lock().await;
        let n: i64 = db.query_row("SELECT COUNT(*) FROM staking", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS staking (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            id_protocol      TEXT NOT NULL,
            address_token    TEXT NOT NULL UNIQUE,
            address_staking  TEXT NOT NULL,
            name_token       TEXT NOT NULL,
            name_project     TEXT NOT NULL,
            chain            TEXT NOT NULL,
            apy              INTEGER NOT NULL,
            tvl              REAL NOT NULL,
            stablecoin       INTEGER NOT NULL,
            categories       TEXT NOT NULL,
            logo             TEXT NOT NULL DEFAULT '',
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_staking_id_protocol ON staking (id_protocol);
        ",
    )
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<StakingRecord> {
    let categories: String = row.get(10)?;
    let categories = serde_json::from_str(&categories)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?;

    Ok(StakingRecord {
        id: row.get(0)?,
        id_protocol: row.get(1)?,
        address_token: row.get(2)?,
        address_staking: row.get(3)?,
        name_token: row.get(4)?,
        name_project: row.get(5)?,
        chain: row.get(6)?,
        apy: row.get(7)?,
        tvl: row.get(8)?,
        stablecoin: row.get(9)?,
        categories,
        logo: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}
