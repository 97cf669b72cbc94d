//! JWT token generation and validation

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub is_admin: bool,
    /// Expiration timestamp
    pub exp: u64,
}

/// Caller identity, inserted into request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub is_admin: bool,
}

/// Generate an HS256 token for a user
pub fn generate_token(
    user_id: impl Into<String>,
    is_admin: bool,
    secret: &str,
    lifetime_seconds: u64,
) -> mealmate_shared::Result<String> {
    let now = u64::try_from(mealmate_shared::now()).unwrap_or_default();

    let claims = Claims {
        sub: user_id.into(),
        is_admin,
        exp: now + lifetime_seconds,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| mealmate_shared::Error::Server(err.to_string()))
}

/// Validate and decode a token, expired or tampered tokens are rejected
pub fn validate_token(token: &str, secret: &str) -> mealmate_shared::Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        tracing::debug!(err = %err, "invalid token");
        mealmate_shared::Error::Unauthorized
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_minimum_32_characters_long";

    #[test]
    fn round_trip() {
        let token = generate_token("01HZX", true, SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "01HZX");
        assert!(claims.is_admin);
    }

    #[test]
    fn rejects_wrong_secret_and_garbage() {
        let token = generate_token("01HZX", false, SECRET, 60).unwrap();

        assert!(matches!(
            validate_token(&token, "another_secret_key_that_is_long_enough"),
            Err(mealmate_shared::Error::Unauthorized)
        ));
        assert!(validate_token("not.a.token", SECRET).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let claims = Claims {
            sub: "01HZX".to_owned(),
            is_admin: false,
            exp: 1_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, SECRET).is_err());
    }
}
