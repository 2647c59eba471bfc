use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::SqliteMaintError;

/// One upgrade script, read from `<dir>/<NNNN>.sql`.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationScript {
    pub version: u32,
    pub path: PathBuf,
    pub sql: String,
}

/// Canonical location of the script that upgrades a database to `version`.
pub fn script_path(scripts_dir: &Path, version: u32) -> PathBuf {
    scripts_dir.join(format!("{:04}.sql", version))
}

/// Looks for the script for `version`.
///
/// `Ok(None)` means there is no such file, which is how a run finds the latest version.
/// A file that exists but can't be read is an error.
pub fn locate_script(
    scripts_dir: &Path,
    version: u32,
) -> Result<Option<MigrationScript>, SqliteMaintError> {
    let path = script_path(scripts_dir, version);
    debug!("Checking if version file {} exists.", path.display());

    let exists = path
        .try_exists()
        .map_err(|source| SqliteMaintError::ScriptRead {
            path: path.clone(),
            source,
        })?;
    if !exists {
        return Ok(None);
    }

    match fs::read_to_string(&path) {
        Ok(sql) => Ok(Some(MigrationScript { version, path, sql })),
        Err(source) => Err(SqliteMaintError::ScriptRead { path, source }),
    }
}
