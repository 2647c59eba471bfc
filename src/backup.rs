use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::SqliteMaintError;

/// Prefix added to the database file name to form the backup file name.
pub const BACKUP_PREFIX: &str = "copy-of-";

/// Path of the backup copy: `copy-of-<file name>` next to the database file.
pub fn backup_path(db_path: &Path) -> Result<PathBuf, SqliteMaintError> {
    let file_name = db_path.file_name().ok_or_else(|| SqliteMaintError::BackupRead {
        path: db_path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;

    let mut backup_name = OsString::from(BACKUP_PREFIX);
    backup_name.push(file_name);
    Ok(db_path.with_file_name(backup_name))
}

/// Copies the database file byte for byte to [`backup_path`].
///
/// Returns `Ok(None)` when the database file doesn't exist yet, since there's nothing to
/// back up. The copy is flushed to disk before this returns.
pub fn backup_database(db_path: &Path) -> Result<Option<PathBuf>, SqliteMaintError> {
    let backup_file = backup_path(db_path)?;

    let data = match fs::read(db_path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                "Backup requested but {} does not exist yet - skipping backup",
                db_path.display()
            );
            return Ok(None);
        }
        Err(source) => {
            return Err(SqliteMaintError::BackupRead {
                path: db_path.to_path_buf(),
                source,
            })
        }
    };

    write_synced(&backup_file, &data).map_err(|source| SqliteMaintError::BackupWrite {
        path: backup_file.clone(),
        source,
    })?;

    info!(
        "Backed up {} ({} bytes) to {}",
        db_path.display(),
        data.len(),
        backup_file.display()
    );
    Ok(Some(backup_file))
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
