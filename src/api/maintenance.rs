//! Maintenance record endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::maintenance::{CreateMaintenance, MaintenancePatch, MaintenanceRecord},
    AppState,
};

use super::{csv_attachment, AuthenticatedUser};

#[utoipa::path(
    get,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Maintenance records", body = Vec<MaintenanceRecord>)
    )
)]
pub async fn list_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
) -> AppResult<Json<Vec<MaintenanceRecord>>> {
    let records = state.services.maintenance.list().await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Maintenance record ID")),
    responses(
        (status = 200, description = "Maintenance record", body = MaintenanceRecord),
        (status = 404, description = "Maintenance record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MaintenanceRecord>> {
    let record = state.services.maintenance.get(id).await?;
    Ok(Json(record))
}

/// Log a fault against a piece of equipment
#[utoipa::path(
    post,
    path = "/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenance,
    responses(
        (status = 201, description = "Maintenance record created", body = MaintenanceRecord),
        (status = 400, description = "Invalid input or unknown equipment", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Json(data): Json<CreateMaintenance>,
) -> AppResult<(StatusCode, Json<MaintenanceRecord>)> {
    let record = state.services.maintenance.create(data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Maintenance record ID")),
    request_body = MaintenancePatch,
    responses(
        (status = 200, description = "Maintenance record updated", body = MaintenanceRecord),
        (status = 404, description = "Maintenance record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(patch): Json<MaintenancePatch>,
) -> AppResult<Json<MaintenanceRecord>> {
    let record = state.services.maintenance.update(id, patch).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Maintenance record ID")),
    responses(
        (status = 204, description = "Maintenance record deleted"),
        (status = 404, description = "Maintenance record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if state.services.maintenance.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Maintenance record {} not found", id)))
    }
}

#[utoipa::path(
    get,
    path = "/maintenance/export",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv")
    )
)]
pub async fn export_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
) -> AppResult<Response> {
    let body = state.services.maintenance.export_csv().await?;
    Ok(csv_attachment("maintenance_records.csv", body))
}
