//! Applies numbered SQL upgrade scripts (`0001.sql`, `0002.sql`, ...) to a SQLite
//! database, tracking progress in the database's `user_version`.

pub mod backup;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod migrator;
pub mod script;
pub mod step;
pub mod version;

pub use error::{SqliteMaintError, UpgradeError};
pub use migrator::{upgrade, Migrator};
