use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token time-to-live when issuing tokens locally (tests, tooling)
pub const DEFAULT_TOKEN_TTL: i64 = 900; // 15 minutes

/// Claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerClaims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub jti: String, // JWT ID
}

/// Stateless HS256 token verifier.
///
/// Verification is purely cryptographic; there is no revocation list.
/// Issuing (`create_token`) exists for tests and local tooling — production
/// tokens come from the external identity service.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: String,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
        }
    }

    /// Create a signed token for the given subject.
    pub fn create_token(&self, user_id: &str, ttl_seconds: i64) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = BearerClaims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify the token signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<BearerClaims> {
        let token_data = decode::<BearerClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(jsonwebtoken::Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&JwtConfig::new("test-secret"))
    }

    #[test]
    fn test_token_round_trip() {
        let verifier = verifier();
        let token = verifier.create_token("user-1", DEFAULT_TOKEN_TTL).unwrap();
        let claims = verifier.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = verifier();
        let token = verifier.create_token("user-1", -3600).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = verifier().create_token("user-1", DEFAULT_TOKEN_TTL).unwrap();
        let other = TokenVerifier::new(&JwtConfig::new("other-secret"));
        assert!(other.verify_token(&token).is_err());
    }
}
