use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{error, info};

use crate::config::Config;
use crate::database::Database;
use crate::error::SqliteMaintError;
use crate::migrator::{upgrade, Migrator};
use crate::version::read_version;

#[derive(Parser)]
#[command(
    name = "sqlitemaint",
    version,
    about = "sqlitemaint: apply numbered SQL upgrade scripts to a SQLite database"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply every pending upgrade script to the database
    Upgrade {
        /// Database file (created if it does not exist)
        #[arg(long = "db", short = 'd')]
        db: PathBuf,

        /// Directory holding the 0001.sql, 0002.sql, ... upgrade scripts
        #[arg(long = "scripts", short = 's')]
        scripts: PathBuf,

        /// Copy the database to copy-of-<file name> before upgrading
        #[arg(long = "backup", short = 'b', default_value_t = false)]
        backup: bool,
    },

    /// Show the database version and the scripts an upgrade would apply
    Status {
        /// Database file
        #[arg(long = "db", short = 'd')]
        db: PathBuf,

        /// Directory holding the upgrade scripts
        #[arg(long = "scripts", short = 's')]
        scripts: PathBuf,
    },
}

impl Cli {
    pub fn handle_command_line(config: &Config) -> Result<(), SqliteMaintError> {
        let args = Cli::parse();
        Self::run(args.command, config)
    }

    fn run(command: Command, config: &Config) -> Result<(), SqliteMaintError> {
        match command {
            Command::Upgrade {
                db,
                scripts,
                backup,
            } => {
                let backup = backup || config.migration.backup;
                match upgrade(&db, &scripts, backup) {
                    Ok(version) => {
                        println!("Database {} is at version {}", db.display(), version);
                        Ok(())
                    }
                    Err(err) => {
                        match err.version {
                            Some(version) => {
                                error!("Upgrade stopped at version {}: {}", version, err.error);
                                eprintln!(
                                    "Upgrade stopped. Database {} remains at version {}",
                                    db.display(),
                                    version
                                );
                            }
                            None => error!("Upgrade failed: {}", err.error),
                        }
                        Err(err.error)
                    }
                }
            }
            Command::Status { db, scripts } => {
                if !db.exists() {
                    return Err(SqliteMaintError::Error(format!(
                        "Database file {} does not exist",
                        db.display()
                    )));
                }
                let database = Database::open(&db)?;
                let version = read_version(database.conn())?;
                let pending = Migrator::new(&scripts).pending(database.conn())?;
                info!(
                    "Status of {}: version {}, {} pending",
                    db.display(),
                    version,
                    pending.len()
                );

                println!("Database {} is at version {}", db.display(), version);
                if pending.is_empty() {
                    println!("No pending upgrade scripts in {}", scripts.display());
                } else {
                    let versions: Vec<String> =
                        pending.iter().map(|v| format!("{:04}", v)).collect();
                    println!("Pending upgrade scripts: {}", versions.join(", "));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoggingConfig, MigrationConfig};
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(backup: bool) -> Config {
        Config {
            logging: LoggingConfig {
                sqlitemaint: "info".to_string(),
            },
            migration: MigrationConfig { backup },
        }
    }

    #[test]
    fn test_cli_parsing_upgrade() {
        let cli = Cli::try_parse_from([
            "sqlitemaint",
            "upgrade",
            "--db",
            "app.db",
            "--scripts",
            "sql",
            "--backup",
        ])
        .unwrap();

        match cli.command {
            Command::Upgrade {
                db,
                scripts,
                backup,
            } => {
                assert_eq!(db, PathBuf::from("app.db"));
                assert_eq!(scripts, PathBuf::from("sql"));
                assert!(backup);
            }
            _ => panic!("expected upgrade command"),
        }
    }

    #[test]
    fn test_cli_parsing_backup_defaults_off() {
        let cli =
            Cli::try_parse_from(["sqlitemaint", "upgrade", "-d", "app.db", "-s", "sql"]).unwrap();
        assert!(matches!(cli.command, Command::Upgrade { backup: false, .. }));
    }

    #[test]
    fn test_cli_parsing_requires_paths() {
        assert!(Cli::try_parse_from(["sqlitemaint", "upgrade", "--db", "app.db"]).is_err());
        assert!(Cli::try_parse_from(["sqlitemaint", "status", "--scripts", "sql"]).is_err());
        assert!(Cli::try_parse_from(["sqlitemaint"]).is_err());
        assert!(Cli::try_parse_from(["sqlitemaint", "downgrade"]).is_err());
    }

    #[test]
    fn test_configured_backup_applies_without_flag() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("app.db");
        let scripts = dir.path().join("sql");
        fs::create_dir(&scripts).unwrap();
        fs::write(scripts.join("0001.sql"), "CREATE TABLE t(id INTEGER);").unwrap();
        fs::write(&db, b"").unwrap();

        let command = Command::Upgrade {
            db: db.clone(),
            scripts,
            backup: false,
        };
        Cli::run(command, &test_config(true)).unwrap();

        assert_eq!(fs::read(dir.path().join("copy-of-app.db")).unwrap(), b"");
    }

    #[test]
    fn test_upgrade_failure_is_returned() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("sql");
        fs::create_dir(&scripts).unwrap();
        fs::write(scripts.join("0001.sql"), "NOT SQL;").unwrap();

        let command = Command::Upgrade {
            db: dir.path().join("app.db"),
            scripts,
            backup: false,
        };
        let err = Cli::run(command, &test_config(false)).unwrap_err();
        assert!(matches!(err, SqliteMaintError::Execution { .. }));
    }

    #[test]
    fn test_status_requires_existing_database() {
        let dir = TempDir::new().unwrap();
        let command = Command::Status {
            db: dir.path().join("missing.db"),
            scripts: dir.path().to_path_buf(),
        };
        assert!(matches!(
            Cli::run(command, &test_config(false)),
            Err(SqliteMaintError::Error(_))
        ));
        assert!(!dir.path().join("missing.db").exists());
    }
}
