//! Inventory ledger: issuing and returning equipment

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::issue::{CreateIssue, IssuePatch, IssueRecord, IssueStatus},
    repository::Repository,
    services::csv_io,
};

#[derive(Clone)]
pub struct IssuesService {
    repository: Repository,
}

impl IssuesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<IssueRecord>> {
        self.repository.issues.list().await
    }

    pub async fn get(&self, id: i64) -> AppResult<IssueRecord> {
        self.repository.issues.get_by_id(id).await
    }

    /// Reserve stock and record the issue in one transaction. The stock check
    /// and decrement are a single conditional update, and it is the first
    /// statement so the write lock is taken before anything is read.
    pub async fn reserve(&self, data: CreateIssue) -> AppResult<IssueRecord> {
        data.validate()?;

        let mut tx = self.repository.pool.begin().await?;
        if !self
            .repository
            .equipment
            .reserve(&mut *tx, data.equipment_id, data.quantity)
            .await?
        {
            let equipment = self
                .repository
                .equipment
                .find_in(&mut *tx, data.equipment_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", data.equipment_id)))?;

            tracing::warn!(
                equipment_id = equipment.id,
                requested = data.quantity,
                available = equipment.available_qty,
                "Issue refused: insufficient stock"
            );
            return Err(AppError::InsufficientStock {
                requested: data.quantity,
                available: equipment.available_qty,
            });
        }

        let issue_date = data.issue_date.unwrap_or_else(|| Utc::now().date_naive());
        let record = self
            .repository
            .issues
            .insert_in(&mut *tx, &data, issue_date)
            .await?;
        tx.commit().await?;

        tracing::info!(
            issue_id = record.id,
            equipment_id = record.equipment_id,
            quantity = record.quantity,
            "Stock reserved"
        );
        Ok(record)
    }

    /// Mark an issue as returned and give its quantity back
    pub async fn return_issue(
        &self,
        id: i64,
        return_date: Option<chrono::NaiveDate>,
    ) -> AppResult<IssueRecord> {
        let mut tx = self.repository.pool.begin().await?;
        let mut record = self.repository.issues.lock_in(&mut *tx, id).await?;
        if record.status == IssueStatus::Returned {
            return Err(AppError::Validation(format!("Issue record {} is already returned", id)));
        }

        record.status = IssueStatus::Returned;
        record.return_date = Some(return_date.unwrap_or_else(|| Utc::now().date_naive()));
        let record = self.repository.issues.update_in(&mut *tx, &record).await?;
        self.repository
            .equipment
            .release(&mut *tx, record.equipment_id, record.quantity)
            .await?;
        tx.commit().await?;

        tracing::info!(
            issue_id = record.id,
            equipment_id = record.equipment_id,
            quantity = record.quantity,
            "Stock released on return"
        );
        Ok(record)
    }

    /// Patch descriptive fields; a status change to returned releases stock
    pub async fn update(&self, id: i64, patch: IssuePatch) -> AppResult<IssueRecord> {
        patch.validate()?;

        let mut tx = self.repository.pool.begin().await?;
        let mut record = self.repository.issues.lock_in(&mut *tx, id).await?;

        let returning = match (record.status, patch.status) {
            (IssueStatus::Returned, Some(IssueStatus::Issued)) => {
                return Err(AppError::Validation(
                    "A returned issue record cannot be reopened".to_string(),
                ));
            }
            (IssueStatus::Issued, Some(IssueStatus::Returned)) => true,
            _ => false,
        };

        patch.apply(&mut record);
        if returning {
            record.status = IssueStatus::Returned;
            record.return_date = Some(patch.return_date.unwrap_or_else(|| Utc::now().date_naive()));
            self.repository
                .equipment
                .release(&mut *tx, record.equipment_id, record.quantity)
                .await?;
        }

        let record = self.repository.issues.update_in(&mut *tx, &record).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Delete an issue record; an outstanding one gives its stock back
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;
        let record = self.repository.issues.delete_in(&mut *tx, id).await?;
        if record.status == IssueStatus::Issued {
            self.repository
                .equipment
                .release(&mut *tx, record.equipment_id, record.quantity)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(issue_id = id, status = record.status.as_str(), "Issue record deleted");
        Ok(())
    }

    pub async fn export_csv(&self) -> AppResult<Vec<u8>> {
        let records = self.repository.issues.list().await?;
        csv_io::write_issues(&records)
    }
}
