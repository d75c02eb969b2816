//! Defines the endpoint for fetching a single transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{Transaction, TransactionState, core::get_transaction},
};

/// A route handler for getting one of the current user's transactions.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to
/// another user.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(user_id, transaction_id, &connection).map(Json)
}
