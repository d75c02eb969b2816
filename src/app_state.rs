//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{
    Error, PasswordHash,
    auth::{DEFAULT_TOKEN_DURATION, TokenKeys},
    db::initialize,
    timezone::get_local_offset,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The keys and lifetime used for issuing and checking bearer tokens.
    pub token_keys: TokenKeys,

    /// The local timezone as a canonical timezone name, e.g. "Africa/Nairobi".
    ///
    /// Used to decide what "today" means for new transactions and summaries.
    pub local_timezone: String,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Africa/Nairobi".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the timezone is not recognised.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        local_timezone: &str,
        token_duration: Duration,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            token_keys: TokenKeys::from_secret(jwt_secret, token_duration),
            local_timezone: local_timezone.to_owned(),
            password_hash_cost: PasswordHash::DEFAULT_COST,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }

    /// Create a new [AppState] with the default token duration.
    ///
    /// # Errors
    /// See [AppState::new].
    pub fn with_default_token_duration(
        db_connection: Connection,
        jwt_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        Self::new(
            db_connection,
            jwt_secret,
            local_timezone,
            DEFAULT_TOKEN_DURATION,
        )
    }
}
