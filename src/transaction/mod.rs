//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The query builder that filters and sorts a user's transactions
//! - The summary aggregator that computes totals over a set of transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod expenses_endpoint;
mod filter;
mod form;
mod get_endpoint;
mod icon;
mod list_endpoint;
mod summary;

pub use core::{
    Transaction, TransactionBuilder, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, delete_transactions_by_category,
    get_transaction, get_transactions, get_transactions_by_kind, map_transaction_row,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::{DeletedCount, delete_category_endpoint, delete_transaction_endpoint};
pub use edit_endpoint::edit_transaction_endpoint;
pub use expenses_endpoint::{get_expenses_endpoint, get_expenses_summary_endpoint};
pub use filter::{DateRange, FilterParams, SortBy, SortOrder, TransactionFilter, filter_and_sort};
pub use form::{TransactionForm, TransactionState};
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::{TransactionList, get_transactions_endpoint};
pub use summary::{CategoryBreakdown, CategorySummary, SummaryStats, summarize};

#[cfg(test)]
pub use core::count_transactions;
