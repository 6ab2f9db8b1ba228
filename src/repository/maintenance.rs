//! Maintenance records repository

use sqlx::{Pool, Sqlite};

use crate::{
    error::{AppError, AppResult},
    models::maintenance::{CreateMaintenance, MaintenanceRecord},
};

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: Pool<Sqlite>,
}

impl MaintenanceRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<MaintenanceRecord>> {
        let rows = sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM maintenance_records ORDER BY fault_date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<MaintenanceRecord> {
        sqlx::query_as::<_, MaintenanceRecord>("SELECT * FROM maintenance_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance record {} not found", id)))
    }

    pub async fn create(&self, data: &CreateMaintenance) -> AppResult<MaintenanceRecord> {
        let row = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            INSERT INTO maintenance_records
                (equipment_id, fault_description, fault_date, sent_for_repair_date,
                 return_from_repair_date, status, remarks, cost)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(data.equipment_id)
        .bind(&data.fault_description)
        .bind(data.fault_date)
        .bind(data.sent_for_repair_date)
        .bind(data.return_from_repair_date)
        .bind(data.status)
        .bind(&data.remarks)
        .bind(data.cost)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&self, record: &MaintenanceRecord) -> AppResult<MaintenanceRecord> {
        sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            UPDATE maintenance_records
            SET fault_description = ?, fault_date = ?, sent_for_repair_date = ?,
                return_from_repair_date = ?, status = ?, remarks = ?, cost = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&record.fault_description)
        .bind(record.fault_date)
        .bind(record.sent_for_repair_date)
        .bind(record.return_from_repair_date)
        .bind(record.status)
        .bind(&record.remarks)
        .bind(record.cost)
        .bind(record.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance record {} not found", record.id)))
    }

    /// Delete a record; returns false if it did not exist
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM maintenance_records WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
