//! FinTrack is a REST API for tracking personal income and expenses.
//!
//! This library provides the JSON API: user registration and log-in with
//! bearer tokens, profile management, and transaction CRUD. Listing
//! transactions runs the caller's records through [filter_and_sort] and
//! [summarize], which are pure functions and can be used on their own.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod profile;
mod routing;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    AuthResponse, Claims, PasswordHash, Preferences, Profile, TokenKeys, UserID, ValidatedPassword,
};
pub use database_id::{DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_BODY_SIZE, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    CategoryBreakdown, CategorySummary, DateRange, FilterParams, SortBy, SortOrder, SummaryStats,
    Transaction, TransactionFilter, TransactionKind, TransactionList, filter_and_sort, summarize,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request contained a value that could not be used, e.g. a malformed
    /// date in a custom date range or a zero amount.
    ///
    /// The string is a description of the problem that is safe to show to the
    /// client.
    #[error("{0}")]
    InvalidInput(String),

    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The password given to confirm a sensitive action was wrong.
    #[error("password is incorrect")]
    IncorrectPassword,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// Another user has already registered the email address.
    #[error("email already in use")]
    DuplicateEmail,

    /// The bearer token is missing, malformed, expired, or belongs to a user
    /// that no longer exists.
    #[error("token is invalid or expired")]
    Unauthorized,

    /// The token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are reported as not found so that
    /// clients cannot probe for their existence.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                Some(ref desc),
            ) if desc.ends_with("user.email") => Error::DuplicateEmail,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_)
            | Error::IncorrectPassword
            | Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::DuplicateEmail => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound | Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                StatusCode::NOT_FOUND
            }
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side errors are not intended to be shown to the client.
        let message = if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
            "Server error".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::Error;

    async fn get_message(error: Error) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");
        let json: serde_json::Value =
            serde_json::from_slice(&body).expect("Response body is not JSON");

        (status, json["message"].as_str().unwrap_or_default().to_owned())
    }

    #[tokio::test]
    async fn invalid_input_is_bad_request_with_description() {
        let (status, message) = get_message(Error::InvalidInput("bad date".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "bad date");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, message) =
            get_message(Error::HashingError("the salt is wet".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Server error");
    }

    #[tokio::test]
    async fn missing_transactions_are_not_found() {
        let (status, _) = get_message(Error::DeleteMissingTransaction).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
