//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    auth::{auth_guard, log_in, register_user},
    endpoints,
    profile::{
        delete_account_endpoint, get_profile, update_password_endpoint,
        update_preferences_endpoint, update_profile_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_category_endpoint, delete_transaction_endpoint,
        edit_transaction_endpoint, get_expenses_endpoint, get_expenses_summary_endpoint,
        get_transaction_endpoint, get_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_welcome))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(log_in));

    let protected_routes = Router::new()
        .route(
            endpoints::PROFILE,
            get(get_profile)
                .put(update_profile_endpoint)
                .delete(delete_account_endpoint),
        )
        .route(endpoints::PROFILE_PASSWORD, put(update_password_endpoint))
        .route(
            endpoints::PROFILE_PREFERENCES,
            put(update_preferences_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(endpoints::EXPENSES, get(get_expenses_endpoint))
        .route(
            endpoints::EXPENSES_SUMMARY,
            get(get_expenses_summary_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(edit_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_BY_CATEGORY,
            delete(delete_category_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Greet API clients at the root path.
async fn get_welcome() -> Response {
    Json(json!({ "message": "Welcome to FinTrack API" })).into_response()
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
        .into_response()
}
