//! Route handlers for viewing and managing the current user's profile.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, PreferencesUpdate, Profile, ProfileUpdate, UserID, delete_user,
        get_user_by_id, update_password_hash, update_preferences, update_profile,
    },
    db::lock_connection,
};

/// The state needed by the profile endpoints.
#[derive(Debug, Clone)]
pub struct ProfileState {
    /// The bcrypt cost for hashing a changed password.
    pub password_hash_cost: u32,
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body for changing the current user's password.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    /// The user's password, to confirm the change.
    pub current_password: String,
    /// The password to replace it with.
    pub new_password: String,
}

/// The body for deleting the current user's account.
#[derive(Clone, Deserialize)]
pub struct AccountDeletion {
    /// The user's password, to confirm the deletion.
    pub password: String,
}

/// A route handler for getting the current user's profile.
pub async fn get_profile(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Profile>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(Profile::from(&user)))
}

/// A route handler for changing the current user's name, email or phone number.
///
/// # Errors
/// Returns [Error::InvalidEmail] or [Error::DuplicateEmail] if the new email
/// cannot be used.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = update_profile(user_id, update, &connection)?;

    Ok(Json(Profile::from(&user)))
}

/// A route handler for changing the current user's display preferences.
pub async fn update_preferences_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(update): Json<PreferencesUpdate>,
) -> Result<Json<Profile>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = update_preferences(user_id, update, &connection)?;

    Ok(Json(Profile::from(&user)))
}

/// A route handler for changing the current user's password.
///
/// # Errors
///
/// This function will return an error if:
/// - either password is empty,
/// - the current password is wrong,
/// - the new password is too weak,
/// - or an internal error occurred while hashing or saving the password.
pub async fn update_password_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(change): Json<PasswordChange>,
) -> Result<Json<Value>, Error> {
    if change.current_password.is_empty() || change.new_password.is_empty() {
        return Err(Error::InvalidInput(
            "Please provide current and new password".to_owned(),
        ));
    }

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        get_user_by_id(user_id, &connection)?
    };

    if !user.password_hash.verify(&change.current_password)? {
        return Err(Error::IncorrectPassword);
    }

    let password_hash = PasswordHash::from_raw_password(
        &change.new_password,
        &[user.name.as_str(), user.email.as_str()],
        state.password_hash_cost,
    )?;

    let connection = lock_connection(&state.db_connection)?;
    update_password_hash(user_id, &password_hash, &connection)?;

    tracing::info!("user {user_id} changed their password");

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// A route handler for deleting the current user's account and all of their transactions.
///
/// # Errors
/// Returns [Error::IncorrectPassword] if the confirmation password is wrong.
pub async fn delete_account_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Json(deletion): Json<AccountDeletion>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_id(user_id, &connection)?;

    if !user.password_hash.verify(&deletion.password)? {
        return Err(Error::IncorrectPassword);
    }

    delete_user(user_id, &connection)?;

    tracing::info!("user {user_id} deleted their account");

    Ok(Json(json!({ "message": "Account deleted successfully" })))
}
