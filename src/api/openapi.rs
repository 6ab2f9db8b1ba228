//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, equipment, health, issues, maintenance};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lab Inventory API",
        version = "2.2.1",
        description = "Department lab equipment inventory REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::auto_login,
        auth::logout,
        auth::forgot_password,
        auth::verify_recovery_code,
        auth::reset_password,
        auth::me,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::export_equipment,
        equipment::bulk_upload,
        // Issues
        issues::list_issues,
        issues::get_issue,
        issues::create_issue,
        issues::update_issue,
        issues::return_issue,
        issues::delete_issue,
        issues::export_issues,
        // Maintenance
        maintenance::list_maintenance,
        maintenance::get_maintenance,
        maintenance::create_maintenance,
        maintenance::update_maintenance,
        maintenance::delete_maintenance,
        maintenance::export_maintenance,
    ),
    components(
        schemas(
            // Auth
            crate::models::account::Account,
            crate::models::account::RegisterRequest,
            crate::models::account::RegisterResponse,
            crate::models::account::LoginRequest,
            crate::models::account::TokenResponse,
            crate::models::account::ForgotPasswordRequest,
            crate::models::account::VerifyRecoveryCodeRequest,
            crate::models::account::ResetPasswordRequest,
            crate::models::account::MessageResponse,
            auth::VerifyRecoveryCodeResponse,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::EquipmentStatus,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::EquipmentPatch,
            crate::models::import_report::ImportReport,
            crate::models::import_report::ImportAction,
            // Issues
            crate::models::issue::IssueRecord,
            crate::models::issue::IssueStatus,
            crate::models::issue::CreateIssue,
            crate::models::issue::IssuePatch,
            crate::models::issue::ReturnIssue,
            // Maintenance
            crate::models::maintenance::MaintenanceRecord,
            crate::models::maintenance::MaintenanceStatus,
            crate::models::maintenance::CreateMaintenance,
            crate::models::maintenance::MaintenancePatch,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Accounts, sessions and password recovery"),
        (name = "equipment", description = "Equipment stock and CSV import/export"),
        (name = "issues", description = "Equipment issued to borrowers"),
        (name = "maintenance", description = "Fault and repair records")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
