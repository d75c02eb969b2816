//! Handles log-in requests and defines the response shared with registration.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{
        TokenKeys,
        token::encode_token,
        user::{Profile, get_user_by_email},
    },
    db::lock_connection,
};

/// The state needed to perform a login.
#[derive(Clone)]
pub struct LoginState {
    /// The keys used to sign the issued token.
    pub token_keys: TokenKeys,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by a client to log in.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,
    /// Password entered during log-in.
    pub password: String,
}

/// The body returned after a successful log-in or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The bearer token to send with protected requests.
    pub token: String,
    /// The profile of the authenticated user.
    pub user: Profile,
}

/// Handler for log-in requests via the POST method.
///
/// On success the response contains a bearer token and the user's profile.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The email does not belong to a registered user.
/// - The password is not correct.
/// - An internal error occurred when verifying the password or signing the token.
pub async fn log_in(
    State(state): State<LoginState>,
    Json(user_data): Json<LogInData>,
) -> Result<Json<AuthResponse>, Error> {
    let email = user_data.email.trim().to_lowercase();

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(&user_data.password)? {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(user.id, &state.token_keys)?;

    Ok(Json(AuthResponse {
        token,
        user: Profile::from(&user),
    }))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        auth::{AuthResponse, decode_token},
        endpoints,
        test_utils::{TEST_PASSWORD, get_test_server, get_test_state, insert_test_user, json_body},
    };

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let state = get_test_state();
        let user = insert_test_user(&state);
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "Test@Example.com", "password": TEST_PASSWORD }))
            .await;

        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert_eq!(body.user.id, user.id);
        assert_eq!(body.user.email, user.email);
        let claims = decode_token(&body.token, &state.token_keys).unwrap();
        assert_eq!(claims.user_id, user.id);
    }

    #[tokio::test]
    async fn log_in_response_does_not_contain_password_hash() {
        let state = get_test_state();
        insert_test_user(&state);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "test@example.com", "password": TEST_PASSWORD }))
            .await;

        let body = json_body(&response);
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let state = get_test_state();
        insert_test_user(&state);
        let server = get_test_server(state);

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "test@example.com", "password": "wrongpassword" }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_fields() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "test@example.com" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
