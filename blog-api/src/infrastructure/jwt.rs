use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("token encode failed")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,

    #[error("token not valid yet")]
    NotYetValid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) username: String,
    pub(crate) iat: i64,
    pub(crate) nbf: i64,
    pub(crate) exp: i64,
}

pub(crate) struct JwtService {
    secret: String,
    ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;

    /// Any HMAC variant is accepted on verification, nothing else.
    const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
        [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub(crate) fn generate_token(&self, user_id: i64, username: &str) -> Result<String, JwtError> {
        self.generate_token_at(user_id, username, Utc::now())
    }

    pub(crate) fn generate_token_at(
        &self,
        user_id: i64,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }

        let issued_at = now.timestamp();
        let claims = Claims {
            user_id,
            username: username.into(),
            iat: issued_at,
            nbf: issued_at,
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Signing)
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_token_at(token, Utc::now())
    }

    /// Checks signature, algorithm family and `nbf <= now < exp`.
    pub(crate) fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = Self::ACCEPTED_ALGORITHMS.to_vec();
        // time window is checked below against `now`, without leeway
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::InvalidToken)?
        .claims;

        let now = now.timestamp();
        if now < claims.nbf {
            return Err(JwtError::NotYetValid);
        }
        if now >= claims.exp {
            return Err(JwtError::Expired);
        }
        Ok(claims)
    }
}
