//! Session token verification.
//!
//! Sessions are issued by the external identity provider as HS256 JWTs.
//! The server only verifies them and reads the subject as an opaque user id.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

#[derive(Clone)]
pub struct SessionVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Validate a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    /// Mint a token the way the identity provider does. Used by tests and
    /// local tooling.
    pub fn issue(&self, user_id: &str, ttl_secs: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let now = coursehub_core::db::unix_timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn verifier() -> SessionVerifier {
        SessionVerifier::new(b"test-session-secret")
    }

    #[test]
    fn issued_token_verifies() {
        let v = verifier();
        let token = v.issue("user_1", 3600).unwrap();
        let claims = v.verify(&token).unwrap();
        assert_eq!(claims.sub, "user_1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_fails() {
        let v = verifier();
        // Past the default 60s leeway.
        let token = v.issue("user_1", -3600).unwrap();
        assert!(v.verify(&token).is_err());
    }

    #[test]
    fn wrong_secret_fails() {
        let token = verifier().issue("user_1", 3600).unwrap();
        assert!(SessionVerifier::new(b"other").verify(&token).is_err());
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
