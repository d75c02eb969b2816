//! User accounts, passwords and bearer-token authentication.

mod log_in;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use log_in::{AuthResponse, log_in};
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user;
pub use token::{Claims, DEFAULT_TOKEN_DURATION, TokenKeys, decode_token, encode_token};
pub use user::{
    NewUser, Preferences, PreferencesUpdate, Profile, ProfileUpdate, User, UserID, create_user,
    create_user_table, delete_user, get_user_by_email, get_user_by_id, update_password_hash,
    update_preferences, update_profile,
};
