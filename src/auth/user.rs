//! Code for creating the user table and reading and updating users in the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// The currency shown to users who have not picked one.
pub const DEFAULT_CURRENCY: &str = "KSH";

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Display settings chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Whether the client should use its dark theme.
    pub dark_mode: bool,
    /// Whether the user wants to receive emails.
    pub email_notifications: bool,
    /// The currency code amounts are displayed in, e.g. "KSH".
    pub currency: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            email_notifications: true,
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` is unique.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// An optional contact phone number.
    pub phone: Option<String>,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's display settings.
    pub preferences: Preferences,
    /// When the user registered.
    pub created_at: OffsetDateTime,
    /// When the user's details were last changed.
    pub updated_at: OffsetDateTime,
}

/// The public view of a [User], which never includes the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// The user's ID.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The email address the user logs in with.
    pub email: String,
    /// An optional contact phone number.
    pub phone: Option<String>,
    /// The user's display settings.
    pub preferences: Preferences,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the user's details were last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            preferences: user.preferences.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The data needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
}

/// Changes to a user's profile. `None` keeps the current value.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Changes to a user's preferences. `None` keeps the current value.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub email_notifications: Option<bool>,
    pub currency: Option<String>,
}

/// Check that `raw_email` is a valid email address and normalise it.
///
/// Surrounding whitespace is removed and the address is lowercased so that
/// log-ins are not case sensitive.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if the address is not valid.
pub fn parse_email(raw_email: &str) -> Result<String, Error> {
    let email = raw_email.trim().to_lowercase();

    if EmailAddress::is_valid(&email) {
        Ok(email)
    } else {
        Err(Error::InvalidEmail(raw_email.to_owned()))
    }
}

/// Treat empty or whitespace-only strings as missing.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                phone TEXT,
                password TEXT NOT NULL,
                dark_mode INTEGER NOT NULL DEFAULT 0,
                email_notifications INTEGER NOT NULL DEFAULT 1,
                currency TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

const SELECT_USER_COLUMNS: &str = "SELECT id, name, email, phone, password, dark_mode, \
    email_notifications, currency, created_at, updated_at FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(4)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        preferences: Preferences {
            dark_mode: row.get(5)?,
            email_notifications: row.get(6)?,
            currency: row.get(7)?,
        },
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateEmail] if the email is already registered, or
/// [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let now = OffsetDateTime::now_utc();
    let preferences = Preferences::default();

    connection.execute(
        "INSERT INTO user (name, email, password, dark_mode, email_notifications, currency, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            &new_user.name,
            &new_user.email,
            new_user.password_hash.as_ref(),
            preferences.dark_mode,
            preferences.email_notifications,
            &preferences.currency,
            now,
            now,
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        phone: None,
        password_hash: new_user.password_hash,
        preferences,
        created_at: now,
        updated_at: now,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER_COLUMNS} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the email address, or
/// [Error::SqlError] if some other SQL related error occurred.
pub fn get_user_by_email(email: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("{SELECT_USER_COLUMNS} WHERE email = :email"))?
        .query_row(&[(":email", &email)], map_user_row)
        .map_err(|error| error.into())
}

/// Check whether `user_id` belongs to a registered user.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn user_exists(user_id: UserID, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM user WHERE id = ?1)",
            (user_id.as_i64(),),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Overwrite the name, email and phone of a user.
///
/// Fields that are `None` or blank in `update` keep their current value.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidEmail] if the new email is not a valid address,
/// - [Error::DuplicateEmail] if another user has the new email,
/// - [Error::NotFound] if `user_id` does not refer to a user,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn update_profile(
    user_id: UserID,
    update: ProfileUpdate,
    connection: &Connection,
) -> Result<User, Error> {
    let mut user = get_user_by_id(user_id, connection)?;

    if let Some(name) = non_empty(update.name) {
        user.name = name;
    }

    if let Some(email) = non_empty(update.email) {
        user.email = parse_email(&email)?;
    }

    if let Some(phone) = non_empty(update.phone) {
        user.phone = Some(phone);
    }

    user.updated_at = OffsetDateTime::now_utc();

    connection.execute(
        "UPDATE user SET name = ?1, email = ?2, phone = ?3, updated_at = ?4 WHERE id = ?5",
        (
            &user.name,
            &user.email,
            &user.phone,
            user.updated_at,
            user.id.as_i64(),
        ),
    )?;

    Ok(user)
}

/// Overwrite a user's display preferences.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not refer to a user, or
/// [Error::SqlError] if some other SQL related error occurred.
pub fn update_preferences(
    user_id: UserID,
    update: PreferencesUpdate,
    connection: &Connection,
) -> Result<User, Error> {
    let mut user = get_user_by_id(user_id, connection)?;

    if let Some(dark_mode) = update.dark_mode {
        user.preferences.dark_mode = dark_mode;
    }

    if let Some(email_notifications) = update.email_notifications {
        user.preferences.email_notifications = email_notifications;
    }

    if let Some(currency) = non_empty(update.currency) {
        user.preferences.currency = currency.to_uppercase();
    }

    user.updated_at = OffsetDateTime::now_utc();

    connection.execute(
        "UPDATE user SET dark_mode = ?1, email_notifications = ?2, currency = ?3, updated_at = ?4
         WHERE id = ?5",
        (
            user.preferences.dark_mode,
            user.preferences.email_notifications,
            &user.preferences.currency,
            user.updated_at,
            user.id.as_i64(),
        ),
    )?;

    Ok(user)
}

/// Replace a user's password hash.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not refer to a user, or
/// [Error::SqlError] if some other SQL related error occurred.
pub fn update_password_hash(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1, updated_at = ?2 WHERE id = ?3",
        (
            password_hash.as_ref(),
            OffsetDateTime::now_utc(),
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete a user and, through the foreign key cascade, all of their transactions.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not refer to a user, or
/// [Error::SqlError] if some other SQL related error occurred.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM user WHERE id = ?1", (user_id.as_i64(),))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
