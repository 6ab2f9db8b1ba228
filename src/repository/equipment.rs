//! Equipment repository for database operations

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{map_unique_violation, AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment},
        import_report::ImportAction,
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Sqlite>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// List all equipment
    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Get equipment by ID inside an open transaction
    pub async fn find_in(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Check whether another record already uses `code`
    pub async fn code_exists_in(
        &self,
        conn: &mut SqliteConnection,
        code: &str,
        exclude_id: i64,
    ) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment WHERE code = ? AND id != ?)")
                .bind(code)
                .bind(exclude_id)
                .fetch_one(&mut *conn)
                .await?;
        Ok(exists)
    }

    /// Get equipment by ID and take the database write lock, so nothing read
    /// later in the transaction can be changed by a concurrent writer
    pub async fn lock_in(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>(
            "UPDATE equipment SET id = id WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Same as [`lock_in`](Self::lock_in), looked up by code
    pub async fn lock_by_code_in(
        &self,
        conn: &mut SqliteConnection,
        code: &str,
    ) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>(
            "UPDATE equipment SET id = id WHERE code = ? RETURNING *",
        )
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row)
    }

    pub async fn insert_in(&self, conn: &mut SqliteConnection, data: &CreateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (name, code, category, lab, total_qty, available_qty, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.code)
        .bind(&data.category)
        .bind(&data.lab)
        .bind(data.total_qty)
        .bind(data.available_qty())
        .bind(data.status)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, "Equipment code already exists"))
    }

    /// Insert a new record, or add the incoming quantities to the record that
    /// already carries this code and overwrite its status
    pub async fn upsert_by_code(
        &self,
        conn: &mut SqliteConnection,
        data: &CreateEquipment,
    ) -> AppResult<(Equipment, ImportAction)> {
        let Some(mut item) = self.lock_by_code_in(&mut *conn, &data.code).await? else {
            let item = self.insert_in(&mut *conn, data).await?;
            return Ok((item, ImportAction::Created));
        };

        let (Some(total_qty), Some(available_qty)) = (
            item.total_qty.checked_add(data.total_qty),
            item.available_qty.checked_add(data.available_qty()),
        ) else {
            return Err(AppError::Validation(format!(
                "Merged quantity for equipment code {} is out of range",
                data.code
            )));
        };

        item.total_qty = total_qty;
        item.available_qty = available_qty;
        item.status = data.status;
        let item = self.update_in(&mut *conn, &item).await?;
        Ok((item, ImportAction::Merged))
    }

    /// Write every column of `item` back
    pub async fn update_in(&self, conn: &mut SqliteConnection, item: &Equipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET name = ?, code = ?, category = ?, lab = ?, total_qty = ?, available_qty = ?, status = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&item.name)
        .bind(&item.code)
        .bind(&item.category)
        .bind(&item.lab)
        .bind(item.total_qty)
        .bind(item.available_qty)
        .bind(item.status)
        .bind(item.id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_unique_violation(e, "Equipment code already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", item.id)))
    }

    /// Decrement availability only if enough units are available.
    /// Returns false when the item is missing or short of stock.
    pub async fn reserve(&self, conn: &mut SqliteConnection, id: i64, quantity: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE equipment SET available_qty = available_qty - ?
            WHERE id = ? AND available_qty >= ?
            "#,
        )
        .bind(quantity)
        .bind(id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Give reserved units back, never exceeding the total quantity
    pub async fn release(&self, conn: &mut SqliteConnection, id: i64, quantity: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE equipment SET available_qty = MIN(total_qty, available_qty + ?) WHERE id = ?",
        )
        .bind(quantity)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Delete equipment; returns false if it did not exist
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
