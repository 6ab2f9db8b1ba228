//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::account::{
        Account, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
        RegisterResponse, ResetPasswordRequest, TokenResponse, VerifyRecoveryCodeRequest,
    },
    services::accounts::Session,
    AppState,
};

use super::AuthenticatedUser;

/// Name of the remember-me cookie
pub const REMEMBER_COOKIE: &str = "remember_token";

/// Same body whether or not the email belongs to an account
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email is registered, a recovery code has been sent";

#[derive(Serialize, ToSchema)]
pub struct VerifyRecoveryCodeResponse {
    pub valid: bool,
}

fn token_response(session: Session) -> TokenResponse {
    TokenResponse {
        access_token: session.token.token,
        token_type: "bearer".to_string(),
        expires_at: session.token.expires_at,
        user: session.account,
    }
}

fn remember_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((REMEMBER_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.secure_cookies)
        .path("/")
        .max_age(time::Duration::seconds(
            state.services.tokens.remember_ttl().num_seconds(),
        ))
        .build()
}

fn presented_token(jar: &CookieJar) -> Option<String> {
    jar.get(REMEMBER_COOKIE).map(|c| c.value().to_string())
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid input, weak password or duplicate account", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let (user, recovery_code) = state.services.accounts.register(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user, recovery_code }),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; sets the remember-me cookie when requested", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let mut session = state
        .services
        .accounts
        .login(&request.username, &request.password, request.remember_me)
        .await?;

    let jar = match session.remember.take() {
        Some(remember) => jar.add(remember_cookie(&state, remember.token)),
        None => jar,
    };

    Ok((jar, Json(token_response(session))))
}

/// Open a session from the remember-me cookie
#[utoipa::path(
    post,
    path = "/auth/auto-login",
    tag = "auth",
    responses(
        (status = 200, description = "Session restored", body = TokenResponse),
        (status = 401, description = "Missing, unknown or expired remember-me token", body = crate::error::ErrorResponse)
    )
)]
pub async fn auto_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<Json<TokenResponse>> {
    let presented = presented_token(&jar);
    let session = state
        .services
        .accounts
        .restore_session(presented.as_deref())
        .await?;
    Ok(Json(token_response(session)))
}

/// Clear the remember-me cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let presented = presented_token(&jar);
    state.services.accounts.logout(presented.as_deref()).await?;

    let jar = jar.remove(Cookie::build(REMEMBER_COOKIE).path("/"));
    Ok((jar, Json(MessageResponse::new("Logged out"))))
}

/// Request delivery of the recovery code
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Generic acknowledgement", body = MessageResponse),
        (status = 400, description = "Malformed email", body = crate::error::ErrorResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    request.validate()?;
    state
        .services
        .accounts
        .request_password_reset(&request.email)
        .await?;
    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

/// Check a recovery code without consuming it
#[utoipa::path(
    post,
    path = "/auth/verify-recovery-code",
    tag = "auth",
    request_body = VerifyRecoveryCodeRequest,
    responses(
        (status = 200, description = "Whether the code matches", body = VerifyRecoveryCodeResponse)
    )
)]
pub async fn verify_recovery_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyRecoveryCodeRequest>,
) -> AppResult<Json<VerifyRecoveryCodeResponse>> {
    request.validate()?;
    let valid = state
        .services
        .accounts
        .verify_recovery_code(&request.email, &request.recovery_code)
        .await?;
    Ok(Json(VerifyRecoveryCodeResponse { valid }))
}

/// Set a new password using the recovery code
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Wrong code or weak password", body = crate::error::ErrorResponse)
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.services.accounts.reset_password(request).await?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// Get current user profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = Account),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(AuthenticatedUser(account): AuthenticatedUser) -> Json<Account> {
    Json(account)
}
