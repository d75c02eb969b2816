//! Defines the endpoint for listing a user's transactions with a summary.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::UserID,
    db::lock_connection,
    transaction::{
        FilterParams, SummaryStats, Transaction, TransactionFilter, TransactionState,
        core::get_transactions, filter_and_sort, summarize,
    },
};

/// The selected transactions and the statistics computed over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    /// The selected transactions, in the requested order.
    pub transactions: Vec<Transaction>,
    /// Statistics over `transactions`.
    pub summary: SummaryStats,
}

/// A route handler for listing the current user's transactions.
///
/// The query string selects and orders the transactions, see [FilterParams].
/// The summary only covers the selected transactions.
///
/// # Errors
/// Returns [Error::InvalidInput] for a malformed custom date range, or an
/// internal error if the database could not be read.
pub async fn get_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<FilterParams>,
) -> Result<Json<TransactionList>, Error> {
    let filter = TransactionFilter::from_params(params)?;
    let today = state.local_today()?;

    let records = {
        let connection = lock_connection(&state.db_connection)?;
        get_transactions(user_id, &connection)?
    };

    let transactions = filter_and_sort(records, user_id, &filter, today);
    let summary = summarize(&transactions, today);

    Ok(Json(TransactionList {
        transactions,
        summary,
    }))
}
