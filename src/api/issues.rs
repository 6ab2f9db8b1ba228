//! Issue record endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    error::AppResult,
    models::issue::{CreateIssue, IssuePatch, IssueRecord, ReturnIssue},
    AppState,
};

use super::{csv_attachment, AuthenticatedUser};

/// List issue records, newest first
#[utoipa::path(
    get,
    path = "/issues",
    tag = "issues",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Issue records", body = Vec<IssueRecord>)
    )
)]
pub async fn list_issues(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
) -> AppResult<Json<Vec<IssueRecord>>> {
    let records = state.services.issues.list().await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/issues/{id}",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Issue record ID")),
    responses(
        (status = 200, description = "Issue record", body = IssueRecord),
        (status = 404, description = "Issue record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_issue(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<IssueRecord>> {
    let record = state.services.issues.get(id).await?;
    Ok(Json(record))
}

/// Issue equipment, reserving the requested quantity
#[utoipa::path(
    post,
    path = "/issues",
    tag = "issues",
    security(("bearer_auth" = [])),
    request_body = CreateIssue,
    responses(
        (status = 201, description = "Equipment issued", body = IssueRecord),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Not enough units available", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_issue(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Json(data): Json<CreateIssue>,
) -> AppResult<(StatusCode, Json<IssueRecord>)> {
    let record = state.services.issues.reserve(data).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/issues/{id}",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Issue record ID")),
    request_body = IssuePatch,
    responses(
        (status = 200, description = "Issue record updated", body = IssueRecord),
        (status = 400, description = "Invalid change", body = crate::error::ErrorResponse),
        (status = 404, description = "Issue record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_issue(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(patch): Json<IssuePatch>,
) -> AppResult<Json<IssueRecord>> {
    let record = state.services.issues.update(id, patch).await?;
    Ok(Json(record))
}

/// Return issued equipment
#[utoipa::path(
    post,
    path = "/issues/{id}/return",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Issue record ID")),
    request_body = ReturnIssue,
    responses(
        (status = 200, description = "Equipment returned", body = IssueRecord),
        (status = 400, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 404, description = "Issue record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_issue(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
    body: Option<Json<ReturnIssue>>,
) -> AppResult<Json<IssueRecord>> {
    let return_date = body.and_then(|Json(r)| r.return_date);
    let record = state.services.issues.return_issue(id, return_date).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/issues/{id}",
    tag = "issues",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Issue record ID")),
    responses(
        (status = 204, description = "Issue record deleted"),
        (status = 404, description = "Issue record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_issue(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.issues.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/issues/export",
    tag = "issues",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv")
    )
)]
pub async fn export_issues(
    State(state): State<AppState>,
    AuthenticatedUser(_account): AuthenticatedUser,
) -> AppResult<Response> {
    let body = state.services.issues.export_csv().await?;
    Ok(csv_attachment("issue_records.csv", body))
}
