//! Account manager: registration, login, session restoration and password recovery

use chrono::Utc;

use crate::{
    config::AdminConfig,
    error::{AppError, AppResult},
    models::account::{
        Account, NewAccount, RegisterRequest, ResetPasswordRequest, SessionClaims,
    },
    repository::Repository,
    services::{
        credentials::{is_well_formed_recovery_code, validate_new_password, CredentialStore},
        email::EmailService,
        tokens::{digest_remember_token, verify_remember_token, IssuedToken, RememberToken, TokenService},
    },
};

/// Result of a successful login or session restoration
#[derive(Debug)]
pub struct Session {
    pub token: IssuedToken,
    pub account: Account,
    /// Only set when a new remember-me token was issued
    pub remember: Option<RememberToken>,
}

#[derive(Clone)]
pub struct AccountsService {
    repository: Repository,
    credentials: CredentialStore,
    tokens: TokenService,
    email: EmailService,
}

impl AccountsService {
    pub fn new(
        repository: Repository,
        credentials: CredentialStore,
        tokens: TokenService,
        email: EmailService,
    ) -> Self {
        Self {
            repository,
            credentials,
            tokens,
            email,
        }
    }

    /// Create an active account; returns it with its initial recovery code
    pub async fn register(&self, request: RegisterRequest) -> AppResult<(Account, String)> {
        validator::Validate::validate(&request)?;
        validate_new_password(&request.password, &request.confirm_password)?;

        if self.repository.accounts.username_exists(&request.username).await? {
            return Err(AppError::Validation("Username already registered".to_string()));
        }
        if self.repository.accounts.email_exists(&request.email).await? {
            return Err(AppError::Validation("Email already registered".to_string()));
        }

        let recovery_code = self.credentials.generate_recovery_code();
        let account = self
            .repository
            .accounts
            .create(&NewAccount {
                username: request.username,
                email: request.email,
                full_name: request.full_name.filter(|n| !n.trim().is_empty()),
                password_hash: self.credentials.hash(&request.password)?,
                recovery_code: recovery_code.clone(),
            })
            .await?;

        tracing::info!(account_id = account.id, username = %account.username, "Account registered");
        Ok((account, recovery_code))
    }

    /// Check credentials and open a session. Every failure is the same
    /// authentication error to the caller.
    pub async fn login(&self, username: &str, password: &str, remember_me: bool) -> AppResult<Session> {
        let Some(account) = self.repository.accounts.get_by_username(username).await? else {
            self.credentials.verify_dummy(password);
            tracing::warn!(%username, "Login failed: unknown username");
            return Err(AppError::Authentication("Unknown username".to_string()));
        };

        if !self.credentials.verify(password, &account.password_hash) {
            tracing::warn!(account_id = account.id, "Login failed: wrong password");
            return Err(AppError::Authentication("Wrong password".to_string()));
        }

        if !account.is_active {
            tracing::warn!(account_id = account.id, "Login failed: account inactive");
            return Err(AppError::Authentication("Account inactive".to_string()));
        }

        let token = self
            .tokens
            .issue_session_token(account.id, &account.username, None)?;

        let remember = if remember_me {
            let remember = self.tokens.issue_remember_token();
            self.repository
                .accounts
                .set_remember_token(account.id, Some(&remember.digest), Some(remember.expires_at))
                .await?;
            Some(remember)
        } else {
            None
        };

        tracing::info!(account_id = account.id, remember_me, "Login succeeded");
        Ok(Session {
            token,
            account,
            remember,
        })
    }

    /// Open a session from a remember-me cookie. The remember token is not rotated.
    pub async fn restore_session(&self, presented: Option<&str>) -> AppResult<Session> {
        let presented = presented
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Authentication("No remember-me token".to_string()))?;

        let account = self
            .repository
            .accounts
            .get_by_remember_token_hash(&digest_remember_token(presented))
            .await?
            .ok_or_else(|| AppError::Authentication("Unknown remember-me token".to_string()))?;

        if !verify_remember_token(
            Some(presented),
            account.remember_token_hash.as_deref(),
            account.remember_token_expiry,
            Utc::now(),
        ) {
            return Err(AppError::Authentication("Remember-me token expired".to_string()));
        }

        if !account.is_active {
            return Err(AppError::Authentication("Account inactive".to_string()));
        }

        let token = self
            .tokens
            .issue_session_token(account.id, &account.username, None)?;

        tracing::info!(account_id = account.id, "Session restored from remember-me token");
        Ok(Session {
            token,
            account,
            remember: None,
        })
    }

    /// Forget the remember-me token behind `presented`, if any
    pub async fn logout(&self, presented: Option<&str>) -> AppResult<()> {
        if let Some(token) = presented.filter(|t| !t.is_empty()) {
            let cleared = self
                .repository
                .accounts
                .clear_remember_token(&digest_remember_token(token))
                .await?;
            tracing::debug!(cleared, "Remember-me token cleared on logout");
        }
        Ok(())
    }

    /// Deliver the account's recovery code. Succeeds whether or not the email is known.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let Some(account) = self.repository.accounts.get_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let code = match account.recovery_code {
            Some(ref code) if is_well_formed_recovery_code(code) => code.clone(),
            _ => {
                let code = self.credentials.generate_recovery_code();
                self.repository.accounts.set_recovery_code(account.id, &code).await?;
                code
            }
        };

        if let Err(e) = self.email.send_recovery_code(&account.email, &code).await {
            tracing::error!(account_id = account.id, "Recovery code delivery failed: {}", e);
        }
        Ok(())
    }

    /// Exact match of `code` against the stored recovery code
    pub async fn verify_recovery_code(&self, email: &str, code: &str) -> AppResult<bool> {
        if !is_well_formed_recovery_code(code) {
            return Ok(false);
        }
        let account = self.repository.accounts.get_by_email(email).await?;
        Ok(account
            .and_then(|a| a.recovery_code)
            .is_some_and(|stored| stored == code))
    }

    /// Replace the password, rotating the recovery code in the same statement
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<Account> {
        validator::Validate::validate(&request)?;
        let invalid = || AppError::Validation("Invalid email or recovery code".to_string());

        if !is_well_formed_recovery_code(&request.recovery_code) {
            return Err(invalid());
        }
        validate_new_password(&request.new_password, &request.confirm_new_password)?;

        let password_hash = self.credentials.hash(&request.new_password)?;
        let mut new_code = self.credentials.generate_recovery_code();
        while new_code == request.recovery_code {
            new_code = self.credentials.generate_recovery_code();
        }

        let account = self
            .repository
            .accounts
            .reset_password(&request.email, &request.recovery_code, &password_hash, &new_code)
            .await?
            .ok_or_else(invalid)?;

        tracing::info!(account_id = account.id, "Password reset");
        Ok(account)
    }

    /// Resolve verified session claims to a live account
    pub async fn current_account(&self, claims: &SessionClaims) -> AppResult<Account> {
        let account = match self.repository.accounts.get_by_id(claims.account_id).await {
            Ok(account) => account,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication("Account no longer exists".to_string()))
            }
            Err(e) => return Err(e),
        };

        if account.username != claims.sub {
            return Err(AppError::Authentication("Token subject mismatch".to_string()));
        }
        if !account.is_active {
            return Err(AppError::Authentication("Account inactive".to_string()));
        }
        Ok(account)
    }

    /// Create the bootstrap administrator when no account exists yet
    pub async fn ensure_admin(&self, admin: &AdminConfig) -> AppResult<Option<Account>> {
        if self.repository.accounts.count().await? > 0 {
            return Ok(None);
        }

        let recovery_code = self.credentials.generate_recovery_code();
        let account = self
            .repository
            .accounts
            .create(&NewAccount {
                username: admin.username.clone(),
                email: admin.email.clone(),
                full_name: admin.full_name.clone(),
                password_hash: self.credentials.hash(&admin.password)?,
                recovery_code: recovery_code.clone(),
            })
            .await?;

        tracing::warn!(
            username = %account.username,
            %recovery_code,
            "Created bootstrap administrator; change its password"
        );
        Ok(Some(account))
    }
}
