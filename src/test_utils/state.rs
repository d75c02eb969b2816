use rusqlite::Connection;

use crate::{
    AppState, PasswordHash,
    auth::{NewUser, User, create_user},
};

/// A password strong enough to pass the strength check.
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// The lowest cost bcrypt accepts, to keep tests fast.
const TEST_HASH_COST: u32 = 4;

pub(crate) fn get_test_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");
    let mut state = AppState::with_default_token_duration(connection, "42", "Etc/UTC")
        .expect("Could not create app state.");
    state.password_hash_cost = TEST_HASH_COST;

    state
}

#[track_caller]
pub(crate) fn insert_test_user(state: &AppState) -> User {
    insert_test_user_with_email(state, "test@example.com")
}

#[track_caller]
pub(crate) fn insert_test_user_with_email(state: &AppState, email: &str) -> User {
    let password_hash = PasswordHash::from_raw_password(TEST_PASSWORD, &[], TEST_HASH_COST)
        .expect("Could not hash test password.");

    create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: email.to_owned(),
            password_hash,
        },
        &state.db_connection.lock().unwrap(),
    )
    .expect("Could not create test user.")
}
