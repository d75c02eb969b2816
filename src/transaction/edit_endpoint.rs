//! Defines the endpoint for updating an existing transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{
        Transaction, TransactionForm, TransactionState,
        core::{get_transaction, update_transaction},
    },
};

/// A route handler for updating one of the current user's transactions.
///
/// Fields missing from the body keep their current value. Responds with the
/// updated transaction.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if the transaction does not
/// exist or belongs to another user, or [Error::InvalidInput] if a field is
/// invalid, e.g. a zero amount.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let mut transaction = match get_transaction(user_id, transaction_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
        Err(error) => return Err(error),
    };

    form.apply_to(&mut transaction)?;
    update_transaction(&transaction, &connection)?;

    Ok(Json(transaction))
}
