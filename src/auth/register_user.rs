//! Handles requests to register a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{
        AuthResponse, PasswordHash, TokenKeys,
        token::encode_token,
        user::{NewUser, Profile, create_user, parse_email},
    },
    db::lock_connection,
};

/// The state needed to register a user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The keys used to sign the issued token.
    pub token_keys: TokenKeys,
    /// The bcrypt cost for hashing the new password.
    pub password_hash_cost: u32,
    /// The database connection for storing the new user.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data submitted by a client to register.
#[derive(Clone, Deserialize)]
pub struct RegisterData {
    /// The user's display name.
    pub name: String,
    /// The email address the user will log in with.
    pub email: String,
    /// The password in plain text, checked for strength before hashing.
    pub password: String,
}

/// Handler for registering a new user via the POST method.
///
/// On success the user is logged in straight away: the `201 Created`
/// response carries a bearer token and the new profile.
///
/// # Errors
///
/// This function will return an error if:
/// - the name is empty,
/// - the email is invalid or already registered,
/// - the password is too weak,
/// - or an internal error occurred.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Json(user_data): Json<RegisterData>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let name = user_data.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Name is required".to_owned()));
    }

    let email = parse_email(&user_data.email)?;

    let password_hash = PasswordHash::from_raw_password(
        &user_data.password,
        &[name, email.as_str()],
        state.password_hash_cost,
    )?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        create_user(
            NewUser {
                name: name.to_owned(),
                email,
                password_hash,
            },
            &connection,
        )?
    };

    tracing::info!("registered user {}", user.id);

    let token = encode_token(user.id, &state.token_keys)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: Profile::from(&user),
        }),
    ))
}

#[cfg(test)]
mod register_user_tests {
    use serde_json::json;

    use crate::{
        auth::{AuthResponse, get_user_by_email},
        endpoints,
        test_utils::{TEST_PASSWORD, get_test_server, get_test_state, insert_test_user, json_body},
    };

    #[tokio::test]
    async fn create_user_succeeds() {
        let state = get_test_state();
        let server = get_test_server(state.clone());

        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Wanjiru",
                "email": " Wanjiru@Example.com ",
                "password": TEST_PASSWORD,
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: AuthResponse = response.json();
        assert!(!body.token.is_empty());
        assert_eq!(body.user.name, "Wanjiru");
        assert_eq!(body.user.email, "wanjiru@example.com");
        assert_eq!(body.user.preferences.currency, "KSH");
        assert!(body.user.preferences.email_notifications);
        assert!(!body.user.preferences.dark_mode);

        let stored = get_user_by_email("wanjiru@example.com", &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(stored.id, body.user.id);
        assert!(stored.password_hash.verify(TEST_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn create_user_fails_with_existing_email() {
        let state = get_test_state();
        insert_test_user(&state);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Someone Else",
                "email": "test@example.com",
                "password": TEST_PASSWORD,
            }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(json_body(&response)["message"], "email already in use");
    }

    #[tokio::test]
    async fn create_user_fails_when_password_is_weak() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Wanjiru",
                "email": "wanjiru@example.com",
                "password": "password",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_email() {
        let server = get_test_server(get_test_state());

        server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "Wanjiru",
                "email": "wanjiru at example dot com",
                "password": TEST_PASSWORD,
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_user_fails_with_empty_name() {
        let server = get_test_server(get_test_state());

        let response = server
            .post(endpoints::REGISTER)
            .json(&json!({
                "name": "   ",
                "email": "wanjiru@example.com",
                "password": TEST_PASSWORD,
            }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(json_body(&response)["message"], "Name is required");
    }
}
