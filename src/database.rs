use std::path::Path;

use log::{error, info};
use rusqlite::Connection;

use crate::error::SqliteMaintError;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database file, creating it if it doesn't exist yet.
    ///
    /// Open failures surface as `VersionRead`: the run can't learn the current version
    /// without a connection.
    pub fn open(db_path: &Path) -> Result<Self, SqliteMaintError> {
        let conn = Connection::open(db_path).map_err(SqliteMaintError::VersionRead)?;
        info!("Database opened at: {}", db_path.display());

        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction for the step that upgrades to
    /// `version`.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`. A failed commit is
    /// followed by a rollback attempt and reported as `Commit`. Rollback failures are
    /// logged and never replace the error that caused them.
    pub fn immediate_transaction<T, F>(
        conn: &Connection,
        version: u32,
        f: F,
    ) -> Result<T, SqliteMaintError>
    where
        F: FnOnce(&Connection) -> Result<T, SqliteMaintError>,
    {
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|source| SqliteMaintError::Begin { version, source })?;

        let value = match f(conn) {
            Ok(value) => value,
            Err(err) => {
                Self::rollback(conn, version);
                return Err(err);
            }
        };

        if let Err(source) = conn.execute_batch("COMMIT") {
            Self::rollback(conn, version);
            return Err(SqliteMaintError::Commit { version, source });
        }

        Ok(value)
    }

    fn rollback(conn: &Connection, version: u32) {
        // SQLite ends the transaction itself on some errors
        if conn.is_autocommit() {
            return;
        }
        if let Err(e) = conn.execute_batch("ROLLBACK") {
            error!(
                "Failed to roll back transaction for version {}. Error: {}",
                version, e
            );
        }
    }
}
