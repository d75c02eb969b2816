//! Issues and checks the signed bearer tokens that authenticate API requests.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// How long a token is valid for after it is issued.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(24);

/// The contents of a bearer token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The user the token was issued to.
    pub user_id: UserID,
    /// When the token was issued, as a Unix timestamp.
    pub iat: i64,
    /// When the token expires, as a Unix timestamp.
    pub exp: i64,
}

/// The keys used to sign and verify tokens, and how long new tokens last.
#[derive(Clone)]
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// How long a newly issued token is valid for.
    pub duration: Duration,
}

impl TokenKeys {
    /// Derive the signing keys from a shared secret.
    pub fn from_secret(secret: &str, duration: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            duration,
        }
    }
}

/// Create a signed token for `user_id` that expires after `keys.duration`.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn encode_token(user_id: UserID, keys: &TokenKeys) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        user_id,
        iat: now.unix_timestamp(),
        exp: (now + keys.duration).unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Check the signature and expiry of `token` and return its claims.
///
/// # Errors
///
/// Returns [Error::Unauthorized] if the token is malformed, was signed with a
/// different secret, or has expired.
pub fn decode_token(token: &str, keys: &TokenKeys) -> Result<Claims, Error> {
    decode::<Claims>(token, &keys.decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected token: {error}");
            Error::Unauthorized
        })
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            UserID,
            token::{Claims, DEFAULT_TOKEN_DURATION, TokenKeys, decode_token, encode_token},
        },
    };

    fn get_keys() -> TokenKeys {
        TokenKeys::from_secret("foobar", DEFAULT_TOKEN_DURATION)
    }

    #[test]
    fn decode_gives_user_id_of_encoded_token() {
        let keys = get_keys();
        let user_id = UserID::new(7);

        let token = encode_token(user_id, &keys).unwrap();
        let claims = decode_token(&token, &keys).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_DURATION.whole_seconds());
    }

    #[test]
    fn decode_fails_with_different_secret() {
        let token = encode_token(UserID::new(7), &get_keys()).unwrap();
        let other_keys = TokenKeys::from_secret("not foobar", DEFAULT_TOKEN_DURATION);

        assert_eq!(decode_token(&token, &other_keys), Err(Error::Unauthorized));
    }

    #[test]
    fn decode_fails_on_expired_token() {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            user_id: UserID::new(7),
            iat: (now - Duration::hours(2)).unix_timestamp(),
            exp: (now - Duration::hours(1)).unix_timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("foobar".as_bytes()),
        )
        .unwrap();

        assert_eq!(decode_token(&token, &get_keys()), Err(Error::Unauthorized));
    }

    #[test]
    fn decode_fails_on_garbage() {
        assert_eq!(
            decode_token("definitely.not.ajwt", &get_keys()),
            Err(Error::Unauthorized)
        );
    }
}
