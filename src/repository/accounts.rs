//! Accounts repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::account::{Account, NewAccount},
};

#[derive(Clone)]
pub struct AccountsRepository {
    pool: Pool<Sqlite>,
}

impl AccountsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get account by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Account> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account with id {} not found", id)))
    }

    /// Get account by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// Get account by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    /// Get the account owning a remember-me token digest
    pub async fn get_by_remember_token_hash(&self, token_hash: &str) -> AppResult<Option<Account>> {
        let account =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE remember_token_hash = ?")
                .bind(token_hash)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = ?)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a new, active account
    pub async fn create(&self, account: &NewAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (username, email, password_hash, full_name, is_active, recovery_code, created_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.full_name)
        .bind(&account.recovery_code)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Username or email already registered"))
    }

    /// Store (or clear, with `None`) the remember-me token digest and its expiry
    pub async fn set_remember_token(
        &self,
        id: i64,
        token_hash: Option<&str>,
        expiry: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET remember_token_hash = ?, remember_token_expiry = ? WHERE id = ?")
            .bind(token_hash)
            .bind(expiry)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Clear whichever account holds this remember-me token digest
    pub async fn clear_remember_token(&self, token_hash: &str) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET remember_token_hash = NULL, remember_token_expiry = NULL
            WHERE remember_token_hash = ?
            "#,
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_recovery_code(&self, id: i64, code: &str) -> AppResult<()> {
        sqlx::query("UPDATE accounts SET recovery_code = ? WHERE id = ?")
            .bind(code)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replace the password and recovery code in one statement, only while
    /// `expected_code` is still the stored code. Returns `None` on mismatch.
    pub async fn reset_password(
        &self,
        email: &str,
        expected_code: &str,
        password_hash: &str,
        new_code: &str,
    ) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET password_hash = ?, recovery_code = ?,
                remember_token_hash = NULL, remember_token_expiry = NULL
            WHERE email = ? AND recovery_code = ?
            RETURNING *
            "#,
        )
        .bind(password_hash)
        .bind(new_code)
        .bind(email)
        .bind(expected_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }
}
