//! JWT issuance and verification
//!
//! The token payload is minimal: the user id as `sub`, plus issued-at and
//! expiry timestamps. Anything else comes from the user document at request
//! time.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Sign a token for the given user id
pub fn issue(user_id: Uuid, secret: &str, ttl_secs: u64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + ttl_secs as i64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::with_source("Token generation failed", e))
}

/// Verify a token and return the user id it was issued for
pub fn verify(token: &str, secret: &str) -> Result<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| Error::auth("Token is not valid"))?;

    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_and_verify() {
        let user_id = Uuid::new_v4();
        let token = issue(user_id, SECRET, 3600).unwrap();
        assert_eq!(verify(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue(Uuid::new_v4(), SECRET, 3600).unwrap();
        let err = verify(&token, "other-secret").unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        // jsonwebtoken applies default leeway of 60s, so go well past it
        let user_id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(verify(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify("not.a.token", SECRET).is_err());
    }
}
