//! Equipment API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, DeleteEquipmentParams, Equipment, EquipmentPatch},
        import_report::ImportReport,
    },
    AppState,
};

use super::{csv_attachment, AuthenticatedUser};

/// List all equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Equipment list", body = Vec<Equipment>)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
) -> AppResult<Json<Vec<Equipment>>> {
    let items = state.services.equipment.list().await?;
    Ok(Json(items))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Equipment>> {
    let item = state.services.equipment.get(id).await?;
    Ok(Json(item))
}

/// Create equipment; an existing code has the quantities added to it
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created or merged", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Json(data): Json<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    let item = state.services.equipment.upsert_by_code(data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update the supplied fields of an equipment record
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Equipment ID")),
    request_body = EquipmentPatch,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 400, description = "Invalid quantities or duplicate code", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(patch): Json<EquipmentPatch>,
) -> AppResult<Json<Equipment>> {
    let item = state.services.equipment.update(id, patch).await?;
    Ok(Json(item))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Equipment ID"),
        DeleteEquipmentParams
    ),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Outstanding issue records exist", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(params): Query<DeleteEquipmentParams>,
) -> AppResult<StatusCode> {
    let force = params.force.unwrap_or(false);
    if state.services.equipment.delete(id, force).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Equipment {} not found", id)))
    }
}

/// Export the equipment list as CSV
#[utoipa::path(
    get,
    path = "/equipment/export",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv")
    )
)]
pub async fn export_equipment(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
) -> AppResult<Response> {
    let body = state.services.equipment.export_csv().await?;
    Ok(csv_attachment("equipment.csv", body))
}

/// Import equipment from a CSV upload (multipart field `file`)
#[utoipa::path(
    post,
    path = "/equipment/bulk-upload",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body(content = String, content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 200, description = "Every row imported", body = ImportReport),
        (status = 400, description = "Missing or non-CSV file", body = crate::error::ErrorResponse),
        (status = 422, description = "Rows rejected, nothing imported", body = crate::error::ErrorResponse)
    )
)]
pub async fn bulk_upload(
    State(state): State<AppState>,
    AuthenticatedUser(account): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<ImportReport>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.to_lowercase().ends_with(".csv") {
            return Err(AppError::Validation("Only CSV files are allowed".to_string()));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::Validation("Missing file field".to_string()))?;

    tracing::info!(account_id = account.id, %filename, size = bytes.len(), "Equipment CSV uploaded");
    let report = state.services.equipment.import_csv(&bytes).await?;
    Ok(Json(report))
}
