//! Token service: signed session tokens and opaque remember-me tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::account::SessionClaims,
};

/// Bytes of entropy in a remember-me token
const REMEMBER_TOKEN_BYTES: usize = 64;

/// Outcome of checking a bearer token
#[derive(Debug, Clone)]
pub enum TokenVerdict {
    Valid(SessionClaims),
    Malformed,
    BadSignature,
    Expired,
}

impl TokenVerdict {
    /// Collapse every failure into an authentication error
    pub fn into_claims(self) -> AppResult<SessionClaims> {
        match self {
            TokenVerdict::Valid(claims) => Ok(claims),
            TokenVerdict::Malformed => Err(AppError::Authentication("Malformed token".into())),
            TokenVerdict::BadSignature => {
                Err(AppError::Authentication("Token signature mismatch".into()))
            }
            TokenVerdict::Expired => Err(AppError::Authentication("Token expired".into())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Freshly generated remember-me token; only `digest` is persisted
#[derive(Debug, Clone)]
pub struct RememberToken {
    pub token: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    session_ttl: Duration,
    remember_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            session_ttl: Duration::minutes(config.session_ttl_minutes),
            remember_ttl: Duration::days(config.remember_me_days),
        }
    }

    pub fn remember_ttl(&self) -> Duration {
        self.remember_ttl
    }

    /// Issue a session token for `subject`, using the configured lifetime unless `ttl` is given
    pub fn issue_session_token(
        &self,
        account_id: i64,
        subject: &str,
        ttl: Option<Duration>,
    ) -> AppResult<IssuedToken> {
        self.issue_session_token_at(account_id, subject, ttl, Utc::now())
    }

    pub(crate) fn issue_session_token_at(
        &self,
        account_id: i64,
        subject: &str,
        ttl: Option<Duration>,
        issued_at: DateTime<Utc>,
    ) -> AppResult<IssuedToken> {
        let expires_at = issued_at + ttl.unwrap_or(self.session_ttl);
        let claims = SessionClaims {
            sub: subject.to_string(),
            account_id,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
        };

        let token = claims
            .create_token(&self.secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Check signature and expiry of a bearer token
    pub fn verify_session_token(&self, token: &str) -> TokenVerdict {
        match SessionClaims::from_token(token, &self.secret) {
            Ok(claims) => TokenVerdict::Valid(claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => TokenVerdict::Expired,
                ErrorKind::InvalidSignature => TokenVerdict::BadSignature,
                _ => TokenVerdict::Malformed,
            },
        }
    }

    /// Generate a high-entropy remember-me token valid for the configured number of days
    pub fn issue_remember_token(&self) -> RememberToken {
        let mut bytes = [0u8; REMEMBER_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);
        RememberToken {
            digest: digest_remember_token(&token),
            token,
            expires_at: Utc::now() + self.remember_ttl,
        }
    }
}

/// SHA-256 hex digest under which a remember-me token is stored
pub fn digest_remember_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// True only when the presented token matches the stored digest and the
/// stored expiry lies in the future. Any missing piece yields false.
pub fn verify_remember_token(
    presented: Option<&str>,
    stored_digest: Option<&str>,
    stored_expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let (Some(presented), Some(stored_digest), Some(stored_expiry)) =
        (presented, stored_digest, stored_expiry)
    else {
        return false;
    };
    if presented.is_empty() || stored_digest.is_empty() {
        return false;
    }
    digest_remember_token(presented) == stored_digest && now < stored_expiry
}
