//! Defines the endpoints that only look at a user's expenses.

use axum::{Extension, Json, extract::State};

use crate::{
    Error,
    auth::UserID,
    db::lock_connection,
    transaction::{
        SummaryStats, Transaction, TransactionKind, TransactionState,
        core::get_transactions_by_kind, summarize,
    },
};

/// A route handler for listing the current user's expenses, newest first.
pub async fn get_expenses_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transactions_by_kind(user_id, TransactionKind::Expense, &connection).map(Json)
}

/// A route handler for summarizing all of the current user's expenses.
pub async fn get_expenses_summary_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<SummaryStats>, Error> {
    let today = state.local_today()?;

    let expenses = {
        let connection = lock_connection(&state.db_connection)?;
        get_transactions_by_kind(user_id, TransactionKind::Expense, &connection)?
    };

    Ok(Json(summarize(&expenses, today)))
}
