//! Creates the application's database schema.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, transaction::create_transaction_table};

/// Acquire the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub(crate) fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// Create the all of the database tables for the application.
///
/// Foreign key enforcement is switched on for `connection` so that deleting
/// a user also deletes their transactions. Running this function on an
/// already initialized database is a no-op.
///
/// # Errors
/// This function may return a [Error::SqlError] if an SQL error occurred.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
