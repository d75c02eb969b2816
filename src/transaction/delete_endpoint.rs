//! Defines the endpoints for deleting one transaction or a whole category of transactions.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{
        TransactionState,
        core::{delete_transaction, delete_transactions_by_category},
    },
};

/// The response to a bulk delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedCount {
    /// A human readable confirmation.
    pub message: String,
    /// The number of transactions that were deleted.
    pub count: usize,
}

/// A route handler for deleting one of the current user's transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not
/// exist or belongs to another user.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(user_id, transaction_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction removed" })))
}

/// A route handler for deleting all of the current user's transactions whose
/// category is exactly `category`.
///
/// Deleting an unused category is not an error, the count is just zero.
pub async fn delete_category_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(category): Path<String>,
) -> Result<Json<DeletedCount>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let count = delete_transactions_by_category(user_id, &category, &connection)?;

    tracing::info!("user {user_id} deleted {count} transactions in category {category:?}");

    Ok(Json(DeletedCount {
        message: format!("Deleted {count} transactions"),
        count,
    }))
}
