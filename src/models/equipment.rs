//! Equipment model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Equipment availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EquipmentStatus {
    #[serde(alias = "Available")]
    Available,
    #[serde(alias = "Issued")]
    Issued,
    #[serde(alias = "Faulty")]
    Faulty,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Available => "available",
            EquipmentStatus::Issued => "issued",
            EquipmentStatus::Faulty => "faulty",
        }
    }
}

impl Default for EquipmentStatus {
    fn default() -> Self {
        EquipmentStatus::Available
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(EquipmentStatus::Available),
            "issued" => Ok(EquipmentStatus::Issued),
            "faulty" => Ok(EquipmentStatus::Faulty),
            _ => Err(format!("Invalid equipment status: {}", s)),
        }
    }
}

/// Equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    /// Inventory code, unique across the inventory
    pub code: String,
    /// e.g. Resistor, Tool, IC
    pub category: Option<String>,
    /// Main storage lab
    pub lab: Option<String>,
    pub total_qty: i64,
    pub available_qty: i64,
    pub status: EquipmentStatus,
}

impl Equipment {
    /// `0 <= available_qty <= total_qty`
    pub fn check_quantities(&self) -> AppResult<()> {
        check_quantities(self.total_qty, self.available_qty)
    }
}

pub(crate) fn check_quantities(total_qty: i64, available_qty: i64) -> AppResult<()> {
    if total_qty < 0 {
        return Err(AppError::Validation("total_qty must not be negative".to_string()));
    }
    if available_qty < 0 {
        return Err(AppError::Validation("available_qty must not be negative".to_string()));
    }
    if available_qty > total_qty {
        return Err(AppError::Validation(
            "available_qty must not exceed total_qty".to_string(),
        ));
    }
    Ok(())
}

/// Create equipment request; a code that already exists is merged into the existing record
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    pub category: Option<String>,
    pub lab: Option<String>,
    pub total_qty: i64,
    /// Defaults to `total_qty`
    pub available_qty: Option<i64>,
    #[serde(default)]
    pub status: EquipmentStatus,
}

impl CreateEquipment {
    pub fn available_qty(&self) -> i64 {
        self.available_qty.unwrap_or(self.total_qty)
    }
}

/// Partial equipment update; only supplied fields are overwritten
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct EquipmentPatch {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Code must not be empty"))]
    pub code: Option<String>,
    pub category: Option<String>,
    pub lab: Option<String>,
    pub total_qty: Option<i64>,
    pub available_qty: Option<i64>,
    pub status: Option<EquipmentStatus>,
}

impl EquipmentPatch {
    /// Merge the supplied fields into `item`
    pub fn apply(self, item: &mut Equipment) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(code) = self.code {
            item.code = code;
        }
        if let Some(category) = self.category {
            item.category = Some(category);
        }
        if let Some(lab) = self.lab {
            item.lab = Some(lab);
        }
        if let Some(total_qty) = self.total_qty {
            item.total_qty = total_qty;
        }
        if let Some(available_qty) = self.available_qty {
            item.available_qty = available_qty;
        }
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}

/// Query parameters for equipment deletion
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteEquipmentParams {
    /// Delete even while issue records are outstanding
    pub force: Option<bool>,
}
