use log::info;
use rusqlite::Connection;

use crate::error::SqliteMaintError;

/// Highest value SQLite can hold in the `user_version` header field.
pub const MAX_VERSION: u32 = i32::MAX as u32;

/// Reads the schema version persisted in the database's `user_version` header field.
pub fn read_version(conn: &Connection) -> Result<u32, SqliteMaintError> {
    let user_version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(SqliteMaintError::VersionRead)?;

    let version = u32::try_from(user_version)
        .map_err(|_| SqliteMaintError::InvalidVersion(user_version))?;
    info!("Loaded version: {}", version);

    Ok(version)
}

/// Builds the statement that stores `version` in `user_version`.
///
/// Pragmas don't accept bound parameters, so the value is range checked and written
/// into the statement text.
pub fn set_version_sql(version: u32) -> Result<String, SqliteMaintError> {
    if version > MAX_VERSION {
        return Err(SqliteMaintError::InvalidVersion(i64::from(version)));
    }
    Ok(format!("PRAGMA user_version = {}", version))
}
