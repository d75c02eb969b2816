//! Authentication middleware that checks bearer tokens on protected routes.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{
        TokenKeys,
        token::decode_token,
        user::{UserID, user_exists},
    },
    db::lock_connection,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The keys used to verify bearer tokens.
    pub token_keys: TokenKeys,
    /// The database connection, used to check that the token's user still exists.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn authenticate(state: &AuthState, request: &Request) -> Result<UserID, Error> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(Error::Unauthorized)?;

    let claims = decode_token(bearer.token(), &state.token_keys)?;

    let connection = lock_connection(&state.db_connection)?;

    if user_exists(claims.user_id, &connection)? {
        Ok(claims.user_id)
    } else {
        tracing::debug!("token for deleted user {} was rejected", claims.user_id);
        Err(Error::Unauthorized)
    }
}

/// Middleware function that checks for a valid bearer token in the `Authorization` header.
/// The user ID is placed into request and then the request executed normally if the token is valid, otherwise a 401 JSON error is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    match authenticate(&state, &request) {
        Ok(user_id) => {
            let (mut parts, body) = request.into_parts();
            parts.extensions.insert(user_id);
            next.run(Request::from_parts(parts, body)).await
        }
        Err(error) => error.into_response(),
    }
}
