use rusqlite::Error as RusqliteError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqliteMaintError {
    #[error("Failed to read database version: {0}")]
    VersionRead(#[source] RusqliteError),

    #[error("Invalid database version {0}: expected a value between 0 and {max}", max = i32::MAX)]
    InvalidVersion(i64),

    #[error("Failed to read {} file content. Error: {source}", .path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to execute {} file content. Error: {source}", .path.display())]
    Execution {
        path: PathBuf,
        #[source]
        source: RusqliteError,
    },

    #[error(
        "Failed to update DB version to {version} after {} file was executed. Error: {source}",
        .path.display()
    )]
    VersionWrite {
        version: u32,
        path: PathBuf,
        #[source]
        source: RusqliteError,
    },

    #[error("Failed to begin transaction for version {version}. Error: {source}")]
    Begin {
        version: u32,
        #[source]
        source: RusqliteError,
    },

    #[error("Failed to commit transaction for version {version}. Error: {source}")]
    Commit {
        version: u32,
        #[source]
        source: RusqliteError,
    },

    #[error("DB backup failed to read DB file {}. Error: {source}", .path.display())]
    BackupRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("DB backup failed to write backup file {}. Error: {source}", .path.display())]
    BackupWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Logging error: {0}")]
    LoggingError(#[from] flexi_logger::FlexiLoggerError),

    #[error("Error: {0}")]
    Error(String),
}

/// Failure of a whole upgrade run.
///
/// `version` is the last version that is durably committed in the database, so the
/// caller knows where a later run will resume. It is `None` when the run failed before
/// the version could be read (backup, open or version read failures).
#[derive(Error, Debug)]
#[error("{error}")]
pub struct UpgradeError {
    pub version: Option<u32>,
    #[source]
    pub error: SqliteMaintError,
}

impl UpgradeError {
    /// Failure before the database version was known.
    pub fn before_version_read(error: SqliteMaintError) -> Self {
        Self {
            version: None,
            error,
        }
    }

    /// Failure with the database durably at `version`.
    pub fn at_version(version: u32, error: SqliteMaintError) -> Self {
        Self {
            version: Some(version),
            error,
        }
    }
}
