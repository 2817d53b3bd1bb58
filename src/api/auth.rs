//! Authentication handlers and the bearer-token helper.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::errors::{Error, Result};

/// Extracts the bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(Error::Unauthorized)
}

/// Verifies the request's session and returns the caller's profile.
pub fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<crate::core::auth::UserProfile> {
    state.sessions.verify(bearer_token(headers)?)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let token = state.sessions.login(&request.email, &request.password)?;
    let user = state.sessions.verify(&token)?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "user": user,
    })))
}

pub async fn signup() -> Result<Json<Value>> {
    Err(Error::RegistrationDisabled)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    state.sessions.logout(bearer_token(&headers)?)?;
    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully",
    })))
}

pub async fn profile(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let user = require_auth(&state, &headers)?;
    Ok(Json(json!(user)))
}

pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let user = require_auth(&state, &headers)?;
    Ok(Json(json!({
        "valid": true,
        "user": user,
    })))
}
