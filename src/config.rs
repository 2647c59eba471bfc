use std::fs;
use std::path::Path;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub sqlitemaint: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const SQLITEMAINT_LEVEL: &str = "info";

    fn default() -> Self {
        LoggingConfig {
            sqlitemaint: Self::SQLITEMAINT_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.sqlitemaint.clone();
        self.sqlitemaint = self.sqlitemaint.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.sqlitemaint.as_str()) {
            eprintln!(
                "Config error: sqlitemaint log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::SQLITEMAINT_LEVEL
            );
            self.sqlitemaint = Self::SQLITEMAINT_LEVEL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MigrationConfig {
    /// Back up the database before every upgrade, even without `--backup`
    pub backup: bool,
}

impl MigrationConfig {
    fn default() -> Self {
        MigrationConfig { backup: false }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub migration: MigrationConfig,
}

impl Config {
    const ENV_PREFIX: &str = "SQLITEMAINT_";

    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            migration: MigrationConfig::default(),
        }
    }

    /// Loads the configuration from a TOML file located in the app's data directory.
    /// If the file is missing or fails to parse, defaults are used.
    /// Additionally, writes the default config to disk if no file exists.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        let config_path = project_dirs.data_local_dir().join("config.toml");

        if !config_path.exists() {
            Self::write_default(&config_path);
        }

        Self::load_from(&config_path)
    }

    /// Defaults, then the TOML file at `config_path` (if it exists), then `SQLITEMAINT_`
    /// environment variables. Nested keys use `__`, e.g. `SQLITEMAINT_MIGRATION__BACKUP`.
    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Config::default();

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn write_default(config_path: &Path) {
        if let Some(parent) = config_path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!(
                    "Failed to create configuration directory {}: {}",
                    parent.display(),
                    e
                );
            }
        }
        match toml::to_string_pretty(&Config::default()) {
            Ok(toml_string) => {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            }
            Err(_) => eprintln!("Failed to serialize default config."),
        }
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from(Path::new("config.toml"));
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [logging]
                sqlitemaint = "debug"

                [migration]
                backup = true
                "#,
            )?;

            let config = Config::load_from(Path::new("config.toml"));
            assert_eq!(config.logging.sqlitemaint, "debug");
            assert!(config.migration.backup);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [migration]
                backup = false
                "#,
            )?;
            jail.set_env("SQLITEMAINT_MIGRATION__BACKUP", "true");
            jail.set_env("SQLITEMAINT_LOGGING__SQLITEMAINT", "trace");

            let config = Config::load_from(Path::new("config.toml"));
            assert!(config.migration.backup);
            assert_eq!(config.logging.sqlitemaint, "trace");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_log_level_falls_back_to_default() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [logging]
                sqlitemaint = "  LOUD "
                "#,
            )?;

            let config = Config::load_from(Path::new("config.toml"));
            assert_eq!(config.logging.sqlitemaint, "info");
            Ok(())
        });
    }

    #[test]
    fn test_log_level_is_normalized() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[logging]\nsqlitemaint = \" Warn \"\n")?;

            let config = Config::load_from(Path::new("config.toml"));
            assert_eq!(config.logging.sqlitemaint, "warn");
            Ok(())
        });
    }

    #[test]
    fn test_unparseable_file_uses_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[migration]\nbackup = \"sometimes\"\n")?;

            let config = Config::load_from(Path::new("config.toml"));
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_default_config_is_written_as_toml() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            Config::write_default(&path);

            let written = fs::read_to_string(&path).unwrap();
            let parsed: Config = toml::from_str(&written).unwrap();
            assert_eq!(parsed, Config::default());
            Ok(())
        });
    }
}
