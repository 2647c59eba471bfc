use std::path::{Path, PathBuf};

use log::{info, Level};
use logging_timer::stimer;
use rusqlite::Connection;

use crate::backup::backup_database;
use crate::database::Database;
use crate::error::{SqliteMaintError, UpgradeError};
use crate::script::locate_script;
use crate::step::apply_step;
use crate::version::{read_version, MAX_VERSION};

/// Upgrades the database at `db_path` with the scripts in `scripts_dir`.
///
/// When `backup` is set and the database file exists, it is copied to
/// `copy-of-<file name>` before a connection is opened. Returns the version the
/// database is at when the run ends.
pub fn upgrade(db_path: &Path, scripts_dir: &Path, backup: bool) -> Result<u32, UpgradeError> {
    info!(
        "DB file: {}, SQL files directory: {}",
        db_path.display(),
        scripts_dir.display()
    );
    let _tmr = stimer!(Level::Info; "UPGRADE", "{}", db_path.display());

    if backup {
        backup_database(db_path).map_err(UpgradeError::before_version_read)?;
    }

    let db = Database::open(db_path).map_err(UpgradeError::before_version_read)?;
    Migrator::new(scripts_dir).migrate(db.conn())
}

/// Drives one upgrade run against an open connection.
pub struct Migrator {
    scripts_dir: PathBuf,
}

impl Migrator {
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
        }
    }

    /// Applies every contiguous script after the current version, one transaction per
    /// script, stopping at the first missing file.
    ///
    /// On failure the error carries the last committed version.
    pub fn migrate(&self, conn: &Connection) -> Result<u32, UpgradeError> {
        let mut version = read_version(conn).map_err(UpgradeError::before_version_read)?;
        let start_version = version;

        while version < MAX_VERSION {
            let next = version + 1;
            let script = match locate_script(&self.scripts_dir, next) {
                Ok(Some(script)) => script,
                Ok(None) => break,
                Err(e) => return Err(UpgradeError::at_version(version, e)),
            };

            apply_step(conn, &script).map_err(|e| UpgradeError::at_version(version, e))?;
            version = next;
        }

        if version == start_version {
            info!("Database is up to date at version {}", version);
        } else {
            info!(
                "Upgraded database from version {} to {}",
                start_version, version
            );
        }
        Ok(version)
    }

    /// Versions a run would apply, in order, without changing the database.
    pub fn pending(&self, conn: &Connection) -> Result<Vec<u32>, SqliteMaintError> {
        let current = read_version(conn)?;

        let mut pending = Vec::new();
        let mut version = current;
        while version < MAX_VERSION {
            let next = version + 1;
            if locate_script(&self.scripts_dir, next)?.is_none() {
                break;
            }
            pending.push(next);
            version = next;
        }
        Ok(pending)
    }
}
