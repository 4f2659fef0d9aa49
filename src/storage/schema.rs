//! Database schema definition
//!
//! The `entries` table deliberately has no key, constraint or index:
//! duplicate detection happens in the synchronizer, not in SQLite.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    title TEXT,
    partida INTEGER,
    titular TEXT,
    fecha_visita TEXT,
    latitud REAL,
    longitud REAL,
    numero_acta INTEGER,
    monto_notificado TEXT
);
"#;

/// Creates the entries table if it does not exist yet
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Table created or already present
/// * `Err(rusqlite::Error)` - Failed to create the table
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
