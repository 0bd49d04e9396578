//! Tamper-evident audit log.
//!
//! Every orchestration event is appended to a SQLite-backed, hash-chained
//! log: each entry's SHA-256 hash covers its own fields plus the previous
//! entry's hash, so altering or removing any historical row breaks every
//! hash after it. The append path is serialized — two concurrent `log`
//! calls can never chain off the same tail.

use anyhow::{Context as _, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;

use crate::config::MEMORY_AUDIT_PATH;

/// Sentinel `previous_hash` for the first entry: one all-zero digest.
pub const GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// One stored row of the chain.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AuditRow {
    #[allow(dead_code)]
    id: i64,
    timestamp: String,
    action: String,
    details: String,
    previous_hash: String,
    hash: String,
}

/// Caller-facing view of one entry, newest-first from [`AuditLog::get_entries`].
///
/// `previous_hash` is internal linkage — an external verifier re-derives it
/// from the prior entry.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntryView {
    pub timestamp: String,
    pub action: String,
    pub details: serde_json::Value,
    pub hash: String,
}

/// Append-only, hash-chained audit log over a SQLite store.
pub struct AuditLog {
    pool: SqlitePool,
    /// Serializes read-tail + insert so the chain never forks.
    append_lock: Mutex<()>,
}

impl AuditLog {
    /// Open (and create if needed) the audit store at `location`.
    ///
    /// `location` is a filesystem path, or [`MEMORY_AUDIT_PATH`] / the empty
    /// string for an ephemeral in-memory store. The in-memory pool is pinned
    /// to a single connection — each SQLite `:memory:` connection is its own
    /// database.
    pub async fn open(location: &str) -> Result<Self> {
        let pool = if location.is_empty() || location == MEMORY_AUDIT_PATH {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await
                .context("failed to open in-memory audit store")?
        } else {
            let path = Path::new(location);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.with_context(|| {
                        format!("failed to create audit store directory {}", parent.display())
                    })?;
                }
            }
            let opts =
                SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", path.display()))?
                    .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                    .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                    .create_if_missing(true);
            SqlitePool::connect_with(opts)
                .await
                .with_context(|| format!("failed to open audit store {location}"))?
        };

        // Explicit schema, created at open. The audit store has no
        // migrations: the persisted layout is the contract.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS audit_log (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 timestamp TEXT NOT NULL,
                 action TEXT NOT NULL,
                 details TEXT NOT NULL,
                 previous_hash TEXT NOT NULL,
                 hash TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .context("failed to create audit_log table")?;

        Ok(Self {
            pool,
            append_lock: Mutex::new(()),
        })
    }

    /// Append one entry to the chain.
    ///
    /// The tail read and the insert run inside one transaction under the
    /// append lock, so concurrent callers observe strictly increasing tails.
    pub async fn log(&self, action: &str, details: &serde_json::Value) -> Result<()> {
        let _guard = self.append_lock.lock().await;

        let details_json = canonical_json(details);
        let timestamp = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;
        let tail: Option<(String,)> =
            sqlx::query_as("SELECT hash FROM audit_log ORDER BY id DESC LIMIT 1")
                .fetch_optional(&mut *tx)
                .await?;
        let previous_hash = tail.map(|(h,)| h).unwrap_or_else(|| GENESIS_HASH.to_string());

        let hash = entry_hash(&timestamp, action, &details_json, &previous_hash);

        sqlx::query(
            "INSERT INTO audit_log (timestamp, action, details, previous_hash, hash)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&timestamp)
        .bind(action)
        .bind(&details_json)
        .bind(&previous_hash)
        .bind(&hash)
        .execute(&mut *tx)
        .await?;
        tx.commit().await.context("failed to commit audit entry")?;

        tracing::debug!(action, hash = %hash, "audit entry appended");
        Ok(())
    }

    /// The most recent `limit` entries, most-recent-first. Unsigned by
    /// design: SQLite reads a negative LIMIT as "unlimited", which would
    /// break the at-most-`limit` contract.
    pub async fn get_entries(&self, limit: u32) -> Result<Vec<AuditEntryView>> {
        let rows: Vec<AuditRow> =
            sqlx::query_as("SELECT * FROM audit_log ORDER BY id DESC LIMIT ?")
                .bind(i64::from(limit))
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter()
            .map(|row| {
                let details = serde_json::from_str(&row.details).with_context(|| {
                    format!("corrupt details payload in audit entry {}", row.hash)
                })?;
                Ok(AuditEntryView {
                    timestamp: row.timestamp,
                    action: row.action,
                    details,
                    hash: row.hash,
                })
            })
            .collect()
    }

    /// Recompute every hash from the sentinel forward and compare against
    /// the stored chain. Returns `false` on any mismatch — a mismatch means
    /// an entry was altered or removed after the fact.
    pub async fn verify_chain(&self) -> Result<bool> {
        let rows: Vec<AuditRow> = sqlx::query_as("SELECT * FROM audit_log ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut previous = GENESIS_HASH.to_string();
        for row in rows {
            if row.previous_hash != previous {
                return Ok(false);
            }
            let expected = entry_hash(&row.timestamp, &row.action, &row.details, &previous);
            if row.hash != expected {
                return Ok(false);
            }
            previous = row.hash;
        }
        Ok(true)
    }
}

/// SHA-256 over `timestamp ∥ action ∥ details ∥ previous_hash`, lowercase hex.
fn entry_hash(timestamp: &str, action: &str, details_json: &str, previous_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.as_bytes());
    hasher.update(action.as_bytes());
    hasher.update(details_json.as_bytes());
    hasher.update(previous_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Serialize `value` with object keys in sorted order at every nesting
/// level, so the same logical payload always hashes identically.
pub fn canonical_json(value: &serde_json::Value) -> String {
    serde_json::to_string(&canonicalize(value)).unwrap_or_else(|_| "null".to_string())
}

fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| k.as_str());
            let mut out = serde_json::Map::new();
            for (k, v) in entries {
                out.insert(k.clone(), canonicalize(v));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
