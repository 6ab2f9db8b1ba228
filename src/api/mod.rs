//! API handlers for the lab inventory REST endpoints

pub mod auth;
pub mod equipment;
pub mod health;
pub mod issues;
pub mod maintenance;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE},
        request::Parts,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::Account, AppState};

/// Extractor for the account behind a bearer session token
pub struct AuthenticatedUser(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.tokens.verify_session_token(token).into_claims()?;
        let account = state.services.accounts.current_account(&claims).await?;

        Ok(AuthenticatedUser(account))
    }
}

/// Serve CSV bytes as a file download
pub(crate) fn csv_attachment(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response()
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/auto-login", post(auth::auto_login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/verify-recovery-code", post(auth::verify_recovery_code))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/me", get(auth::me));

    let rate_limit = &state.config.rate_limit;
    if rate_limit.enabled {
        match GovernorConfigBuilder::default()
            .per_second(rate_limit.per_second)
            .burst_size(rate_limit.burst_size)
            .finish()
        {
            Some(conf) => {
                auth_routes = auth_routes.layer(GovernorLayer {
                    config: Box::leak(Box::new(conf)),
                });
            }
            None => tracing::warn!(
                per_second = rate_limit.per_second,
                burst_size = rate_limit.burst_size,
                "Invalid rate limit settings, authentication endpoints are not throttled"
            ),
        }
    }

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Equipment
        .route("/equipment", get(equipment::list_equipment).post(equipment::create_equipment))
        .route("/equipment/export", get(equipment::export_equipment))
        .route("/equipment/bulk-upload", post(equipment::bulk_upload))
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        // Issue records
        .route("/issues", get(issues::list_issues).post(issues::create_issue))
        .route("/issues/export", get(issues::export_issues))
        .route(
            "/issues/:id",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
        .route("/issues/:id/return", post(issues::return_issue))
        // Maintenance records
        .route(
            "/maintenance",
            get(maintenance::list_maintenance).post(maintenance::create_maintenance),
        )
        .route("/maintenance/export", get(maintenance::export_maintenance))
        .route(
            "/maintenance/:id",
            get(maintenance::get_maintenance)
                .put(maintenance::update_maintenance)
                .delete(maintenance::delete_maintenance),
        )
        .merge(auth_routes)
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
