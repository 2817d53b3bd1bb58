//! Settings page handlers. All require a valid session.
//!
//! Updates acknowledge and echo the submitted values; nothing is persisted
//! beyond the shop profile file the GET endpoints read from.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::auth::{bearer_token, require_auth};
use crate::api::state::AppState;
use crate::errors::{Error, Result};

pub async fn get_profile(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    let user = require_auth(&state, &headers)?;

    Ok(Json(json!({
        "firstName": "Sarah",
        "lastName": "Ahmed",
        "email": user.email,
        "phone": "+880 1712-345678",
        "role": "Owner & Manager",
        "avatar": "https://api.dicebear.com/7.x/avataaars/svg?seed=Sarah",
    })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(profile): Json<Value>,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "profile": profile,
    })))
}

pub async fn get_shop(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;

    Ok(Json(json!({
        "shopName": state.shop.name,
        "address": state.shop.address,
        "city": state.shop.city,
        "postal": state.shop.postal,
        "shopPhone": state.shop.phone,
        "shopEmail": state.shop.email,
        "hours": state.shop.hours,
    })))
}

pub async fn update_shop(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(shop): Json<Value>,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;
    Ok(Json(json!({
        "success": true,
        "message": "Shop details updated successfully",
        "shop": shop,
    })))
}

pub async fn get_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;
    Ok(Json(json!({
        "email": true,
        "sms": false,
        "push": true,
        "lowStock": true,
        "salesReports": true,
        "staffAlerts": true,
    })))
}

pub async fn update_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(preferences): Json<Value>,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;
    Ok(Json(json!({
        "success": true,
        "message": "Notification preferences updated successfully",
        "preferences": preferences,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PasswordChange>,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;

    if request.new_password != request.confirm_password {
        return Err(Error::validation("New passwords do not match"));
    }
    if request.current_password != state.settings.admin_password {
        return Err(Error::validation("Current password is incorrect"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Password changed successfully",
    })))
}

pub async fn get_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;

    Ok(Json(json!({
        "sessions": [
            {
                "id": 1,
                "device": "Chrome on Windows",
                "location": "Dhaka, Bangladesh",
                "lastActive": "Active now",
                "isCurrent": true,
            }
        ],
        "activeCount": state.sessions.active_count()?,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SessionLogout {
    pub session_id: i64,
}

pub async fn logout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SessionLogout>,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Session {} logged out successfully", request.session_id),
    })))
}

pub async fn logout_all_sessions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    require_auth(&state, &headers)?;
    state.sessions.logout_all_except(bearer_token(&headers)?)?;
    Ok(Json(json!({
        "success": true,
        "message": "All other sessions logged out successfully",
    })))
}
