//! Credential store: password hashing, password policy and recovery codes

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use rand::Rng;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// Longest password accepted, in bytes
pub const MAX_PASSWORD_BYTES: usize = 72;
pub const MIN_PASSWORD_CHARS: usize = 8;
/// Characters that satisfy the "symbol" rule of the password policy
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Check a new password against the complexity policy and its confirmation
pub fn validate_new_password(password: &str, confirmation: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::Validation(
            "Password is too long (maximum 72 bytes allowed)".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(AppError::Validation(
            "Password must contain at least one special character".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain at least one number".to_string(),
        ));
    }
    if password != confirmation {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

/// A recovery code is exactly four ASCII digits
pub fn is_well_formed_recovery_code(code: &str) -> bool {
    code.len() == 4 && code.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Clone)]
pub struct CredentialStore {
    params: Params,
    /// Digest verified against when the username is unknown, so the
    /// failure path costs the same as a wrong password
    dummy_digest: Arc<OnceCell<String>>,
}

impl CredentialStore {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        let params = Params::new(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
            1,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Invalid password hashing parameters: {}", e)))?;

        Ok(Self {
            params,
            dummy_digest: Arc::new(OnceCell::new()),
        })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> AppResult<String> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::Validation(
                "Password is too long (maximum 72 bytes allowed)".to_string(),
            ));
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored digest; malformed digests never match
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!("Stored password digest is malformed: {}", e);
                return false;
            }
        };
        self.hasher()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burn one verification for an unknown account. Always false.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let digest = self
            .dummy_digest
            .get_or_try_init(|| self.hash(&self.generate_recovery_code()));
        if let Ok(digest) = digest {
            let _ = self.verify(password, digest);
        }
        false
    }

    /// Uniformly random 4-digit code; not unique across accounts
    pub fn generate_recovery_code(&self) -> String {
        let code: u16 = rand::thread_rng().gen_range(0..10_000);
        format!("{:04}", code)
    }
}
