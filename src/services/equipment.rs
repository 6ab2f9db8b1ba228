//! Inventory ledger: equipment stock bookkeeping and CSV import/export

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{check_quantities, CreateEquipment, Equipment, EquipmentPatch},
        import_report::ImportReport,
    },
    repository::Repository,
    services::csv_io,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    /// Create equipment, or merge the quantities into the record with the same code
    pub async fn upsert_by_code(&self, data: CreateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        check_quantities(data.total_qty, data.available_qty())?;

        let mut tx = self.repository.pool.begin().await?;
        let (item, action) = self.repository.equipment.upsert_by_code(&mut *tx, &data).await?;
        tx.commit().await?;

        tracing::info!(
            equipment_id = item.id,
            code = %item.code,
            ?action,
            total_qty = item.total_qty,
            available_qty = item.available_qty,
            "Equipment saved"
        );
        Ok(item)
    }

    /// Overwrite only the supplied fields
    pub async fn update(&self, id: i64, patch: EquipmentPatch) -> AppResult<Equipment> {
        patch.validate()?;

        let mut tx = self.repository.pool.begin().await?;
        let mut item = self
            .repository
            .equipment
            .lock_in(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;

        if let Some(ref code) = patch.code {
            if *code != item.code
                && self.repository.equipment.code_exists_in(&mut *tx, code, id).await?
            {
                return Err(AppError::Validation(format!(
                    "Equipment code {} already exists",
                    code
                )));
            }
        }

        patch.apply(&mut item);
        item.check_quantities()?;

        let item = self.repository.equipment.update_in(&mut *tx, &item).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Delete equipment. Outstanding issue records block deletion unless `force`
    /// is set, in which case they are left pointing at the removed item.
    pub async fn delete(&self, id: i64, force: bool) -> AppResult<bool> {
        match self.repository.equipment.get_by_id(id).await {
            Ok(_) => {}
            Err(AppError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        }

        let outstanding = self.repository.issues.count_outstanding(id).await?;
        if outstanding > 0 && !force {
            return Err(AppError::Conflict(format!(
                "Equipment {} has {} outstanding issue record(s)",
                id, outstanding
            )));
        }

        let deleted = self.repository.equipment.delete(id).await?;
        if deleted {
            tracing::info!(equipment_id = id, outstanding, force, "Equipment deleted");
        }
        Ok(deleted)
    }

    /// All-or-nothing CSV import: nothing is written unless every row is valid
    pub async fn import_csv(&self, data: &[u8]) -> AppResult<ImportReport> {
        let rows = csv_io::parse_equipment_csv(data).map_err(|errors| {
            tracing::warn!(errors = errors.len(), "Equipment import rejected");
            AppError::ImportRejected(errors)
        })?;

        if rows.is_empty() {
            return Err(AppError::Validation("CSV file contains no data rows".to_string()));
        }

        let mut tx = self.repository.pool.begin().await?;
        let mut actions = Vec::with_capacity(rows.len());
        for row in &rows {
            let (_, action) = self.repository.equipment.upsert_by_code(&mut *tx, row).await?;
            actions.push(action);
        }
        tx.commit().await?;

        let report = ImportReport::from_actions(&actions);
        tracing::info!(
            imported = report.imported,
            created = report.created,
            merged = report.merged,
            "Equipment import committed"
        );
        Ok(report)
    }

    pub async fn export_csv(&self) -> AppResult<Vec<u8>> {
        let items = self.repository.equipment.list().await?;
        csv_io::write_equipment(&items)
    }
}
