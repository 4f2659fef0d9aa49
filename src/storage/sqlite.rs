//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::model::Entry;
use crate::state::{SyncPhase, SyncRun};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::SyncReport;
use rusqlite::{Connection, Row, ToSql, Transaction};
use std::path::Path;

/// Exact match on all eight columns, coordinates included
///
/// `IS` compares like `=` but also lets a NULL field match a stored NULL.
const FIND_MATCH_SQL: &str = "SELECT 1 FROM entries
     WHERE title IS ?1 AND partida IS ?2 AND titular IS ?3 AND fecha_visita IS ?4
       AND latitud IS ?5 AND longitud IS ?6 AND numero_acta IS ?7
       AND monto_notificado IS ?8
     LIMIT 1";

const COUNT_MATCH_SQL: &str = "SELECT COUNT(*) FROM entries
     WHERE title IS ?1 AND partida IS ?2 AND titular IS ?3 AND fecha_visita IS ?4
       AND latitud IS ?5 AND longitud IS ?6 AND numero_acta IS ?7
       AND monto_notificado IS ?8";

const INSERT_SQL: &str = "INSERT INTO entries
     (title, partida, titular, fecha_visita, latitud, longitud, numero_acta, monto_notificado)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SELECT_ALL_SQL: &str = "SELECT title, partida, titular, fecha_visita, latitud, longitud,
            numero_acta, monto_notificado
     FROM entries ORDER BY rowid";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file at `path`
    ///
    /// The schema is not touched here; call `ensure_schema` before use.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        tracing::info!("Opened database {}", path.display());
        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Closes the underlying connection, reporting any close error
    pub fn close(self) -> StorageResult<()> {
        self.conn
            .close()
            .map_err(|(_conn, e)| StorageError::Close(e))
    }

    /// Direct access to the connection for test fixtures
    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Storage for SqliteStorage {
    fn ensure_schema(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn).map_err(StorageError::Schema)
    }

    fn sync_entries(&mut self, entries: &[Entry]) -> StorageResult<SyncReport> {
        let mut run = SyncRun::new(entries.len());

        initialize_schema(&self.conn).map_err(StorageError::Schema)?;
        run.advance(SyncPhase::SchemaEnsured)?;

        let tx = self.conn.transaction()?;
        run.advance(SyncPhase::TransactionOpen)?;

        let outcome = apply_batch(&tx, entries, &mut run);
        tracing::debug!("Lookup and insert statements finalized");

        if let Err(e) = outcome {
            tracing::warn!("Rolling back {} pending inserts", run.inserted());
            if let Err(rollback_err) = tx.rollback() {
                tracing::error!("Rollback failed: {}", rollback_err);
            }
            run.advance(SyncPhase::RolledBack)?;
            return Err(e);
        }

        if let Err(e) = tx.commit() {
            // rusqlite rolls back an uncommitted transaction when it is dropped
            run.advance(SyncPhase::RolledBack)?;
            return Err(e.into());
        }
        run.advance(SyncPhase::Committed)?;

        tracing::info!(
            "Transaction committed: {} inserted, {} already present",
            run.inserted(),
            run.skipped()
        );

        run.finish()
    }

    fn count_entries(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_matching(&self, entry: &Entry) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row(COUNT_MATCH_SQL, &entry_params(entry), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn list_entries(&self) -> StorageResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(SELECT_ALL_SQL)?;

        let entries = stmt
            .query_map([], entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

/// Runs the per-entry lookup/insert loop inside `tx`
///
/// Both statements are prepared once and dropped when this returns, whether
/// the loop finished or stopped at the first error.
fn apply_batch(tx: &Transaction<'_>, entries: &[Entry], run: &mut SyncRun) -> StorageResult<()> {
    let mut find_match = tx.prepare(FIND_MATCH_SQL)?;
    let mut insert = tx.prepare(INSERT_SQL)?;

    for entry in entries {
        run.advance(SyncPhase::Lookup)?;
        let values = entry_params(entry);

        if find_match.exists(&values)? {
            tracing::info!("Entry {} already exists, ignoring it", entry.label());
            run.advance(SyncPhase::Skipped)?;
        } else {
            insert.execute(&values)?;
            tracing::debug!("Inserted entry {}", entry.label());
            run.advance(SyncPhase::Inserted)?;
        }
    }

    Ok(())
}

/// Binds the eight entry fields in column order
fn entry_params(entry: &Entry) -> [&dyn ToSql; 8] {
    [
        &entry.title,
        &entry.partida,
        &entry.titular,
        &entry.fecha_visita,
        &entry.latitud,
        &entry.longitud,
        &entry.numero_acta,
        &entry.monto_notificado,
    ]
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        title: row.get(0)?,
        partida: row.get(1)?,
        titular: row.get(2)?,
        fecha_visita: row.get(3)?,
        latitud: row.get(4)?,
        longitud: row.get(5)?,
        numero_acta: row.get(6)?,
        monto_notificado: row.get(7)?,
    })
}
