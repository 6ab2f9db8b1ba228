//! Issue record model: equipment handed out to a borrower

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum IssueStatus {
    #[serde(alias = "Issued")]
    Issued,
    #[serde(alias = "Returned")]
    Returned,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Issued => "issued",
            IssueStatus::Returned => "returned",
        }
    }
}

/// Issue record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct IssueRecord {
    pub id: i64,
    pub equipment_id: i64,
    /// Borrower name
    pub issued_to: String,
    /// Borrowing lab
    pub issued_lab: String,
    pub quantity: i64,
    pub issue_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: IssueStatus,
}

/// Issue equipment request; reserves `quantity` units of the equipment
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateIssue {
    pub equipment_id: i64,
    #[validate(length(min = 1, message = "issued_to is required"))]
    pub issued_to: String,
    #[validate(length(min = 1, message = "issued_lab is required"))]
    pub issued_lab: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    /// Defaults to today
    pub issue_date: Option<NaiveDate>,
    /// Expected return date
    pub return_date: Option<NaiveDate>,
}

/// Partial issue record update
///
/// `equipment_id` and `quantity` are fixed once stock has been reserved.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct IssuePatch {
    #[validate(length(min = 1, message = "issued_to must not be empty"))]
    pub issued_to: Option<String>,
    #[validate(length(min = 1, message = "issued_lab must not be empty"))]
    pub issued_lab: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub status: Option<IssueStatus>,
}

impl IssuePatch {
    /// Merge the descriptive fields into `record`; status is handled by the ledger
    pub fn apply(&self, record: &mut IssueRecord) {
        if let Some(ref issued_to) = self.issued_to {
            record.issued_to = issued_to.clone();
        }
        if let Some(ref issued_lab) = self.issued_lab {
            record.issued_lab = issued_lab.clone();
        }
        if let Some(issue_date) = self.issue_date {
            record.issue_date = issue_date;
        }
        if let Some(return_date) = self.return_date {
            record.return_date = Some(return_date);
        }
    }
}

/// Return request
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReturnIssue {
    /// Defaults to today
    pub return_date: Option<NaiveDate>,
}
