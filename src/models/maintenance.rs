//! Maintenance record model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Completed")]
    Completed,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "pending",
            MaintenanceStatus::Completed => "completed",
        }
    }
}

impl Default for MaintenanceStatus {
    fn default() -> Self {
        MaintenanceStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRecord {
    pub id: i64,
    pub equipment_id: i64,
    pub fault_description: String,
    pub fault_date: NaiveDate,
    pub sent_for_repair_date: Option<NaiveDate>,
    pub return_from_repair_date: Option<NaiveDate>,
    pub status: MaintenanceStatus,
    pub remarks: Option<String>,
    pub cost: f64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenance {
    pub equipment_id: i64,
    #[validate(length(min = 1, message = "fault_description is required"))]
    pub fault_description: String,
    pub fault_date: NaiveDate,
    pub sent_for_repair_date: Option<NaiveDate>,
    pub return_from_repair_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: MaintenanceStatus,
    pub remarks: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "cost must not be negative"))]
    pub cost: f64,
}

/// Partial maintenance update; `equipment_id` is fixed after creation
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct MaintenancePatch {
    #[validate(length(min = 1, message = "fault_description must not be empty"))]
    pub fault_description: Option<String>,
    pub fault_date: Option<NaiveDate>,
    pub sent_for_repair_date: Option<NaiveDate>,
    pub return_from_repair_date: Option<NaiveDate>,
    pub status: Option<MaintenanceStatus>,
    pub remarks: Option<String>,
    #[validate(range(min = 0.0, message = "cost must not be negative"))]
    pub cost: Option<f64>,
}

impl MaintenancePatch {
    pub fn apply(self, record: &mut MaintenanceRecord) {
        if let Some(fault_description) = self.fault_description {
            record.fault_description = fault_description;
        }
        if let Some(fault_date) = self.fault_date {
            record.fault_date = fault_date;
        }
        if let Some(date) = self.sent_for_repair_date {
            record.sent_for_repair_date = Some(date);
        }
        if let Some(date) = self.return_from_repair_date {
            record.return_from_repair_date = Some(date);
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(remarks) = self.remarks {
            record.remarks = Some(remarks);
        }
        if let Some(cost) = self.cost {
            record.cost = cost;
        }
    }
}
