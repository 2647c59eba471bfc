use log::info;
use rusqlite::hooks::{AuthAction, AuthContext, Authorization};
use rusqlite::Connection;

use crate::database::Database;
use crate::error::SqliteMaintError;
use crate::script::MigrationScript;
use crate::version::set_version_sql;

/// Applies `script` and sets `user_version` to `script.version` in one transaction.
///
/// Either both the script's effects and the new version are committed, or neither is.
pub fn apply_step(conn: &Connection, script: &MigrationScript) -> Result<(), SqliteMaintError> {
    let version = script.version;
    let set_version = set_version_sql(version)?;

    info!("Processing {} file...", script.path.display());

    Database::immediate_transaction(conn, version, |c| {
        {
            let _guard = TransactionControlGuard::install(c);
            c.execute_batch(&script.sql)
                .map_err(|source| SqliteMaintError::Execution {
                    path: script.path.clone(),
                    source,
                })?;
        }

        c.execute_batch(&set_version)
            .map_err(|source| SqliteMaintError::VersionWrite {
                version,
                path: script.path.clone(),
                source,
            })
    })?;

    info!("Updated to version {}.", version);
    Ok(())
}

/// Refuses `BEGIN`, `COMMIT`, `END` and `ROLLBACK` for as long as it lives.
///
/// Scripts run inside the step's transaction; ending it early would let the script's
/// statements and the version bump commit separately. A refused statement fails to
/// prepare, so the script reports `Execution` and the whole step rolls back.
struct TransactionControlGuard<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionControlGuard<'a> {
    fn install(conn: &'a Connection) -> Self {
        conn.authorizer(Some(deny_transaction_control));
        Self { conn }
    }
}

impl Drop for TransactionControlGuard<'_> {
    fn drop(&mut self) {
        self.conn
            .authorizer(None::<fn(AuthContext<'_>) -> Authorization>);
    }
}

fn deny_transaction_control(ctx: AuthContext<'_>) -> Authorization {
    match ctx.action {
        AuthAction::Transaction { .. } => Authorization::Deny,
        _ => Authorization::Allow,
    }
}
