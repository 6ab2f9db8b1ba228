//! Data models for the lab inventory

pub mod account;
pub mod equipment;
pub mod import_report;
pub mod issue;
pub mod maintenance;

// Re-export commonly used types
pub use account::{Account, SessionClaims};
pub use equipment::{Equipment, EquipmentStatus};
pub use import_report::{ImportAction, ImportReport};
pub use issue::{IssueRecord, IssueStatus};
pub use maintenance::{MaintenanceRecord, MaintenanceStatus};
