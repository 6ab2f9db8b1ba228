//! Issue records repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::issue::{CreateIssue, IssueRecord},
};

#[derive(Clone)]
pub struct IssuesRepository {
    pool: Pool<Sqlite>,
}

impl IssuesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all issue records, newest first
    pub async fn list(&self) -> AppResult<Vec<IssueRecord>> {
        let rows = sqlx::query_as::<_, IssueRecord>(
            "SELECT * FROM issue_records ORDER BY issue_date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get issue record by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<IssueRecord> {
        sqlx::query_as::<_, IssueRecord>("SELECT * FROM issue_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue record {} not found", id)))
    }

    /// Get issue record by ID and take the database write lock
    pub async fn lock_in(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<IssueRecord> {
        sqlx::query_as::<_, IssueRecord>("UPDATE issue_records SET id = id WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue record {} not found", id)))
    }

    /// Count records still holding stock for an equipment item
    pub async fn count_outstanding(&self, equipment_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM issue_records WHERE equipment_id = ? AND status = 'issued'",
        )
        .bind(equipment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Insert an issued record
    pub async fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        data: &CreateIssue,
        issue_date: NaiveDate,
    ) -> AppResult<IssueRecord> {
        let row = sqlx::query_as::<_, IssueRecord>(
            r#"
            INSERT INTO issue_records (equipment_id, issued_to, issued_lab, quantity, issue_date, return_date, status)
            VALUES (?, ?, ?, ?, ?, ?, 'issued')
            RETURNING *
            "#,
        )
        .bind(data.equipment_id)
        .bind(&data.issued_to)
        .bind(&data.issued_lab)
        .bind(data.quantity)
        .bind(issue_date)
        .bind(data.return_date)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Write the mutable columns of `record` back
    pub async fn update_in(&self, conn: &mut SqliteConnection, record: &IssueRecord) -> AppResult<IssueRecord> {
        sqlx::query_as::<_, IssueRecord>(
            r#"
            UPDATE issue_records
            SET issued_to = ?, issued_lab = ?, issue_date = ?, return_date = ?, status = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&record.issued_to)
        .bind(&record.issued_lab)
        .bind(record.issue_date)
        .bind(record.return_date)
        .bind(record.status)
        .bind(record.id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Issue record {} not found", record.id)))
    }

    /// Delete an issue record, returning it as it was
    pub async fn delete_in(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<IssueRecord> {
        sqlx::query_as::<_, IssueRecord>("DELETE FROM issue_records WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Issue record {} not found", id)))
    }
}
