use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SessionError;
use crate::config::SessionConfig;
use crate::models::Identity;

/// Verifies session tokens minted by the hosted auth backend (HS256, shared secret).
#[derive(Clone)]
pub struct SessionVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: String,
}

/// Claims carried by a session access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: Option<String>,
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl SessionVerifier {
    pub fn new(config: &SessionConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            audience: config.audience.clone(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Identity, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)?.claims;

        let id = Uuid::parse_str(&claims.sub).map_err(|_| SessionError::InvalidSubject)?;
        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or(SessionError::MissingEmail)?;

        Ok(Identity { id, email })
    }

    /// Mint a token the way the auth backend does. Used by local tooling and tests.
    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        ttl: Duration,
    ) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            email: Some(email.to_string()),
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier(secret: &str) -> SessionVerifier {
        SessionVerifier::new(&SessionConfig {
            jwt_secret: secret.to_string(),
            audience: "authenticated".to_string(),
            cookie_name: "access_token".to_string(),
        })
    }

    #[test]
    fn issued_token_verifies() {
        let verifier = verifier("test-secret");
        let user_id = Uuid::new_v4();
        let token = verifier
            .issue(user_id, "amina@example.org", Duration::minutes(5))
            .unwrap();

        let identity = verifier.verify(&token).unwrap();
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.email, "amina@example.org");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = verifier("other-secret")
            .issue(Uuid::new_v4(), "x@example.org", Duration::minutes(5))
            .unwrap();
        assert!(matches!(
            verifier("test-secret").verify(&token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = verifier("test-secret");
        let token = verifier
            .issue(Uuid::new_v4(), "x@example.org", Duration::minutes(-10))
            .unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verifier("test-secret").verify("not.a.jwt").is_err());
    }
}
