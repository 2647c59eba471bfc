use directories::ProjectDirs;
use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
};

use crate::config::LoggingConfig;
use crate::error::SqliteMaintError;

const LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;
const LOG_FILES_KEPT: usize = 5;

/// Starts file logging under `<data dir>/logs`, with warnings and errors echoed to stderr.
pub fn setup_logging(
    logging: &LoggingConfig,
    project_dirs: &ProjectDirs,
) -> Result<LoggerHandle, SqliteMaintError> {
    let log_dir = project_dirs.data_local_dir().join("logs");

    let handle = Logger::try_with_str(log_spec(logging))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename("sqlitemaint"),
        )
        .rotate(
            Criterion::Size(LOG_FILE_SIZE),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(LOG_FILES_KEPT),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    Ok(handle)
}

/// Dependencies log at `warn`; this crate at the configured level.
fn log_spec(logging: &LoggingConfig) -> String {
    format!("warn, sqlitemaint={}", logging.sqlitemaint)
}
