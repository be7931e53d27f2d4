//! DuckDB sink: long format, one row per (comment, attribute) pair.

use std::path::Path;

use duckdb::{Connection, params};
use revrate_core::RatingRow;
use tracing::info;

use crate::StoreError;

/// DuckDB-backed score table.
///
/// Each appended [`RatingRow`] gets a sequence-assigned `id` and a
/// store-assigned `scored_at` timestamp. Opening an existing database keeps
/// its rows;
/// `overwrite` removes the database file first so the run starts empty.
pub struct DuckSink {
    conn: Connection,
    table: String,
}

impl DuckSink {
    /// Open or create a persistent database at `path` with the score table.
    pub fn open(path: &Path, table: &str, overwrite: bool) -> Result<Self, StoreError> {
        if overwrite && path.exists() {
            std::fs::remove_file(path)?;
            info!(path = %path.display(), "removed existing database");
        }
        let conn = Connection::open(path)?;
        Self::init(conn, table)
    }

    /// Open an in-memory sink (dry runs and tests).
    pub fn open_in_memory(table: &str) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, table)
    }

    fn init(conn: Connection, table: &str) -> Result<Self, StoreError> {
        conn.execute_batch(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {table}_id_seq;
             CREATE TABLE IF NOT EXISTS {table} (
               id        BIGINT DEFAULT nextval('{table}_id_seq'),
               title     TEXT,
               body      TEXT,
               property  TEXT,
               score     INTEGER,
               reason    TEXT,
               raw_resp  TEXT,
               scored_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
             )"
        ))?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Append a single row.
    pub fn append(&self, row: &RatingRow) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare(&self.insert_sql())?;
        stmt.execute(params![
            row.title,
            row.body,
            row.property,
            row.score,
            row.reason,
            row.raw_resp
        ])?;
        Ok(())
    }

    /// Append a finite batch inside one transaction.
    pub fn append_batch(&mut self, rows: &[RatingRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let sql = self.insert_sql();
        let count = rows.len();
        let table = self.table.clone();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                stmt.execute(params![
                    row.title,
                    row.body,
                    row.property,
                    row.score,
                    row.reason,
                    row.raw_resp
                ])?;
            }
        }
        tx.commit()?;
        info!(count, table = %table, "appended rating rows");
        Ok(())
    }

    /// Number of rows in the score table.
    pub fn count(&self) -> Result<usize, StoreError> {
        let sql = format!("SELECT count(*) FROM {}", self.table);
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// `(title, score, reason)` for every row of one property, in id order.
    pub fn scores_for(
        &self,
        property: &str,
    ) -> Result<Vec<(String, Option<i32>, String)>, StoreError> {
        let sql = format!(
            "SELECT title, score, reason FROM {} WHERE property = ? ORDER BY id",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([property], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (title, body, property, score, reason, raw_resp)
             VALUES (?, ?, ?, ?, ?, ?)",
            self.table
        )
    }
}
