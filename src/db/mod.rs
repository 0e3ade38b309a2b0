pub mod queries;
pub mod table;

use crate::db::table::{Table, TableName};
use crate::records::DayRecord;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub struct RecordStore {
    conn: Connection,
    quota_bytes: usize,
}

impl RecordStore {
    pub fn open(path: &Path, quota_bytes: usize) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create records directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open records DB: {}", path.display()))?;

        Self::with_connection(conn, quota_bytes)
    }

    pub fn open_in_memory(quota_bytes: usize) -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory records DB")?;
        Self::with_connection(conn, quota_bytes)
    }

    fn with_connection(conn: Connection, quota_bytes: usize) -> Result<Self> {
        let store = Self { conn, quota_bytes };
        store.init_schema()?;
        Ok(store)
    }

    pub fn init_schema(&self) -> Result<()> {
        queries::record_schema_statements()
            .iter()
            .try_for_each(|statement| {
                self.conn
                    .execute(statement, [])
                    .context("Failed to initialize records schema")
                    .map(|_| ())
            })
    }

    /// Reads a whole table. Unreadable or corrupt data yields an empty table.
    pub fn load<R: DayRecord>(&self) -> Table<R> {
        let name = R::TABLE;
        let payload = match self.read_payload(name) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Table::default(),
            Err(error) => {
                warn!(error = %error, table = %name, "failed to read table. starting empty");
                return Table::default();
            }
        };

        serde_json::from_str(&payload).unwrap_or_else(|error| {
            warn!(error = %error, table = %name, "stored table is malformed. starting empty");
            Table::default()
        })
    }

    pub fn save<R: DayRecord>(&self, table: &Table<R>) -> Result<()> {
        let name = R::TABLE;
        let payload = serde_json::to_string(table)
            .with_context(|| format!("Failed to serialize table: {name}"))?;

        let other_bytes = self.stored_bytes_except(name)?;
        let total_bytes = other_bytes.saturating_add(payload.len());
        if total_bytes > self.quota_bytes {
            bail!(
                "Saving {name} needs {total_bytes} bytes, exceeding the storage quota of {} bytes",
                self.quota_bytes
            );
        }

        self.conn
            .execute(
                queries::UPSERT_TABLE_PAYLOAD,
                params![name.storage_name(), payload, Utc::now().timestamp()],
            )
            .with_context(|| format!("Failed to write table: {name}"))?;

        debug!(table = %name, days = table.len(), bytes = payload.len(), "table saved");
        Ok(())
    }

    pub fn stored_bytes(&self) -> Result<usize> {
        let bytes: i64 = self
            .conn
            .query_row(queries::SUM_PAYLOAD_BYTES, [], |row| row.get(0))
            .context("Failed to measure stored tables")?;

        Ok(usize::try_from(bytes).unwrap_or_default())
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    fn stored_bytes_except(&self, name: TableName) -> Result<usize> {
        let bytes: i64 = self
            .conn
            .query_row(
                queries::SUM_OTHER_PAYLOAD_BYTES,
                params![name.storage_name()],
                |row| row.get(0),
            )
            .context("Failed to measure stored tables")?;

        Ok(usize::try_from(bytes).unwrap_or_default())
    }

    fn read_payload(&self, name: TableName) -> Result<Option<String>> {
        self.conn
            .query_row(
                queries::SELECT_TABLE_PAYLOAD,
                params![name.storage_name()],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read table: {name}"))
    }

    #[cfg(test)]
    fn write_raw_payload(&self, name: TableName, payload: &str) -> Result<()> {
        self.conn
            .execute(
                queries::UPSERT_TABLE_PAYLOAD,
                params![name.storage_name(), payload, 0_i64],
            )
            .map(|_| ())
            .context("Failed to write raw payload")
    }
}
