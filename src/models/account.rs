//! Account model, authentication requests and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Stored user account
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    /// 4-digit password recovery code
    #[serde(skip_serializing)]
    pub recovery_code: Option<String>,
    /// SHA-256 hex digest of the current remember-me token
    #[serde(skip_serializing)]
    pub remember_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub remember_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Fields written when an account is inserted
#[derive(Debug)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
    pub recovery_code: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3 to 64 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

/// Registration response; the recovery code is only ever shown here
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: Account,
    pub recovery_code: String,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Session token response for login and auto-login
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub user: Account,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyRecoveryCodeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub recovery_code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub recovery_code: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// JWT claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username
    pub sub: String,
    pub account_id: i64,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    /// Sign the claims with HS256
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Check signature and expiry, with no clock leeway
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(token_data.claims)
    }
}
