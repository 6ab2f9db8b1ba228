//! Maintenance records service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::maintenance::{CreateMaintenance, MaintenancePatch, MaintenanceRecord},
    repository::Repository,
    services::csv_io,
};

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
}

impl MaintenanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<MaintenanceRecord>> {
        self.repository.maintenance.list().await
    }

    pub async fn get(&self, id: i64) -> AppResult<MaintenanceRecord> {
        self.repository.maintenance.get_by_id(id).await
    }

    pub async fn create(&self, data: CreateMaintenance) -> AppResult<MaintenanceRecord> {
        data.validate()?;

        match self.repository.equipment.get_by_id(data.equipment_id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Validation(format!(
                    "Equipment {} does not exist",
                    data.equipment_id
                )))
            }
            Err(e) => return Err(e),
        }

        let record = self.repository.maintenance.create(&data).await?;
        tracing::info!(
            maintenance_id = record.id,
            equipment_id = record.equipment_id,
            "Maintenance record created"
        );
        Ok(record)
    }

    pub async fn update(&self, id: i64, patch: MaintenancePatch) -> AppResult<MaintenanceRecord> {
        patch.validate()?;
        let mut record = self.repository.maintenance.get_by_id(id).await?;
        patch.apply(&mut record);
        self.repository.maintenance.update(&record).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        self.repository.maintenance.delete(id).await
    }

    pub async fn export_csv(&self) -> AppResult<Vec<u8>> {
        let records = self.repository.maintenance.list().await?;
        csv_io::write_maintenance(&records)
    }
}
