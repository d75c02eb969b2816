//! Defines the endpoint for creating a new transaction.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    Error,
    auth::UserID,
    db::lock_connection,
    transaction::{Transaction, TransactionForm, TransactionState, core::create_transaction},
};

/// A route handler for creating a new transaction, responds with the stored transaction.
///
/// # Errors
/// Returns [Error::InvalidInput] if the body is missing a required field, has
/// a zero amount or a malformed date.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    Json(form): Json<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let builder = form.into_builder(state.local_today()?)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(user_id, builder, &connection)?;

    tracing::debug!("user {user_id} created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use time::OffsetDateTime;

    use crate::{
        endpoints,
        test_utils::{get_test_server, get_test_state, get_token, insert_test_user, json_body},
        transaction::{Transaction, TransactionKind, count_transactions, get_transaction},
    };

    #[tokio::test]
    async fn create_transaction_succeeds() {
        let state = get_test_state();
        let user = insert_test_user(&state);
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(get_token(&state, user.id))
            .json(&json!({
                "type": "expense",
                "category": "Food & Dining",
                "amount": -100,
                "description": "Groceries",
                "date": "2025-01-15",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = json_body(&response);
        assert_eq!(body["type"], "expense");
        assert_eq!(body["amount"], -100.0);
        assert_eq!(body["date"], "2025-01-15");
        assert_eq!(body["icon"], "🍽️");

        let created: Transaction = response.json();
        let stored = get_transaction(user.id, created.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(stored, created);
        assert_eq!(stored.amount, 100.0);
        assert_eq!(stored.kind, TransactionKind::Expense);
    }

    #[tokio::test]
    async fn create_transaction_defaults_to_today() {
        let state = get_test_state();
        let user = insert_test_user(&state);
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(get_token(&state, user.id))
            .json(&json!({
                "type": "income",
                "category": "Salary",
                "amount": 5000,
                "description": "March pay",
                "icon": "🤑",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: Transaction = response.json();
        assert_eq!(created.date, OffsetDateTime::now_utc().date());
        assert_eq!(created.icon, "🤑");
        assert_eq!(created.signed_amount(), 5000.0);
    }

    #[tokio::test]
    async fn create_transaction_fails_on_zero_amount() {
        let state = get_test_state();
        let user = insert_test_user(&state);
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(get_token(&state, user.id))
            .json(&json!({
                "type": "expense",
                "category": "Food",
                "amount": 0,
                "description": "Nothing",
            }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(json_body(&response)["message"], "Amount cannot be zero");
        assert_eq!(
            count_transactions(&state.db_connection.lock().unwrap()).unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn create_transaction_fails_on_missing_fields() {
        let state = get_test_state();
        let user = insert_test_user(&state);
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(get_token(&state, user.id))
            .json(&json!({ "type": "expense", "amount": 10 }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(
            json_body(&response)["message"],
            "Please provide all required fields"
        );
    }

    #[tokio::test]
    async fn create_transaction_requires_authentication() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": "expense",
                "category": "Food",
                "amount": 10,
                "description": "Lunch",
            }))
            .await
            .assert_status_unauthorized();
    }
}
