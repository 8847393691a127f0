use crate::db::models::UserSummary;
use crate::error::AuthError;
use crate::router::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: Option<String>,
}

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    message: &'static str,
    token: String,
    user: UserSummary,
}

#[derive(Serialize)]
struct CreateAccountResponse {
    success: bool,
    message: &'static str,
    user: UserSummary,
}

#[derive(Serialize)]
struct ForgotPasswordResponse {
    success: bool,
    message: &'static str,
    #[serde(rename = "newPassword")]
    new_password: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let (username, password) = require_credentials(&req)?;
    let account = state.reconciler.login(username, password).await?;
    let token = state.tokens.issue_local(&account)?;
    info!(account_id = account.id, "local login succeeded");
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        token,
        user: UserSummary::from(&account),
    }))
}

/// POST /api/create-account. No token is auto-issued; login is a separate
/// subsequent step.
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let (username, password) = require_credentials(&req)?;
    let account = state.reconciler.register(username.trim(), password).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateAccountResponse {
            success: true,
            message: "Account created successfully",
            user: UserSummary::from(&account),
        }),
    ))
}

/// POST /api/forgot-password. The replacement plaintext appears in this
/// response body exactly once and nowhere else.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let username = req
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(AuthError::Validation("Username is required"))?;
    let new_password = state.reconciler.reset_password(username).await?;
    Ok(Json(ForgotPasswordResponse {
        success: true,
        message: "Password reset successfully",
        new_password,
    }))
}

fn require_credentials(req: &CredentialsRequest) -> Result<(&str, &str), AuthError> {
    let username = req.username.as_deref().filter(|u| !u.trim().is_empty());
    let password = req.password.as_deref().filter(|p| !p.is_empty());
    match (username, password) {
        (Some(u), Some(p)) => Ok((u, p)),
        _ => Err(AuthError::Validation("Username and password are required")),
    }
}
