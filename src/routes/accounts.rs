//! Account routes — registration and login.
//!
//! Response bodies are `{"message": ...}` on success and `{"error": ...}`
//! on failure. Registration failures surface the store's error text; login
//! failures never do.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::services::accounts::{AccountError, Credentials, Registration};
use crate::state::AppState;

pub(crate) const REGISTERED: &str = "User registered successfully";
pub(crate) const LOGGED_IN: &str = "Login successful";
pub(crate) const MISSING_FIELDS: &str = "All fields are required";
pub(crate) const INVALID_BODY: &str = "Invalid JSON body";
pub(crate) const CONFLICT: &str = "Username or Email already exists";
pub(crate) const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub(crate) const SERVER_ERROR: &str = "Server error";

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub(crate) fn register_error(err: AccountError) -> ApiError {
    match err {
        AccountError::MissingFields => ApiError::new(StatusCode::BAD_REQUEST, MISSING_FIELDS),
        AccountError::Conflict => ApiError::new(StatusCode::CONFLICT, CONFLICT),
        AccountError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS),
        AccountError::Store(e) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        AccountError::Password(e) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub(crate) fn login_error(err: AccountError) -> ApiError {
    match err {
        AccountError::MissingFields => ApiError::new(StatusCode::BAD_REQUEST, MISSING_FIELDS),
        AccountError::Conflict | AccountError::Password(_) | AccountError::Store(_) => {
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
        }
        AccountError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS),
    }
}

fn message(text: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": text }))
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// Registration accepts `username` or, for clients built against the
/// role-carrying API, `name`. When both are sent `username` wins.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl From<RegisterBody> for Registration {
    fn from(body: RegisterBody) -> Self {
        Self {
            username: body.username.or(body.name),
            email: body.email,
            password: body.password,
            role: body.role,
        }
    }
}

/// Login accepts `name` or `username`. When both are sent `name` wins.
#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl From<LoginParams> for Credentials {
    fn from(params: LoginParams) -> Self {
        Self { username: params.name.or(params.username), password: params.password, role: params.role }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /register` — create an account.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "register body rejected");
        ApiError::new(StatusCode::BAD_REQUEST, INVALID_BODY)
    })?;

    state
        .accounts
        .register(body.into())
        .await
        .map_err(register_error)?;

    Ok((StatusCode::CREATED, message(REGISTERED)))
}

/// `GET /login?name=&password=&role=` — check credentials.
pub async fn login_query(
    State(state): State<AppState>,
    params: Result<Query<LoginParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(error = %rejection, "login query rejected");
        ApiError::new(StatusCode::BAD_REQUEST, MISSING_FIELDS)
    })?;
    login(&state, params).await
}

/// `POST /login` — check credentials sent as a JSON body.
pub async fn login_json(
    State(state): State<AppState>,
    body: Result<Json<LoginParams>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(params) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "login body rejected");
        ApiError::new(StatusCode::BAD_REQUEST, INVALID_BODY)
    })?;
    login(&state, params).await
}

async fn login(state: &AppState, params: LoginParams) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .accounts
        .login(params.into())
        .await
        .map_err(login_error)?;
    Ok(message(LOGGED_IN))
}

#[cfg(test)]
#[path = "accounts_test.rs"]
mod tests;
