//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

use std::fmt::Display;

/// The root route which greets API clients.
pub const ROOT: &str = "/";

/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";

/// The route to read, update and delete the current user's profile.
pub const PROFILE: &str = "/api/profile";
/// The route to change the current user's password.
pub const PROFILE_PASSWORD: &str = "/api/profile/password";
/// The route to change the current user's display preferences.
pub const PROFILE_PREFERENCES: &str = "/api/profile/preferences";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to list the current user's expenses.
pub const EXPENSES: &str = "/api/transactions/expenses";
/// The route to summarize the current user's expenses.
pub const EXPENSES_SUMMARY: &str = "/api/transactions/expenses/summary";
/// The route to delete all of the current user's transactions in a category.
pub const TRANSACTIONS_BY_CATEGORY: &str = "/api/transactions/category/{category}";

/// Replace the parameter in `endpoint_path` with `param`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter. `param` is inserted as is, so the caller must
/// percent-encode it if needed.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, param: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| param_start + offset + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        param,
        &endpoint_path[param_end..]
    )
}
