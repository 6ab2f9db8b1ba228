//! Bulk import report models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What an upsert did with an incoming equipment code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    Created,
    /// Quantities were added to an existing record with the same code
    Merged,
}

/// Report returned after a successful CSV import.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    pub imported: usize,
    pub created: usize,
    pub merged: usize,
    pub message: String,
}

impl ImportReport {
    pub fn from_actions(actions: &[ImportAction]) -> Self {
        let created = actions.iter().filter(|a| **a == ImportAction::Created).count();
        let merged = actions.len() - created;
        Self {
            imported: actions.len(),
            created,
            merged,
            message: format!("Successfully uploaded {} items", actions.len()),
        }
    }
}
