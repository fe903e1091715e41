use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::services::{AdminUser, AuthUser};
use crate::dates;
use crate::state::AppState;
use crate::users::repo_types::WeightEntry;

use super::dto::{
    AdminUserRow, LogWeightRequest, ProfileResponse, SetRoleRequest, UpdateProfileRequest,
};
use super::services::{self, AdminStats, WeightLogOutcome};

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/profile", put(update_profile))
        .route("/me/weight", post(log_weight).get(weight_history))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/role", post(set_role))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/stats", get(stats))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            error!(user_id = %user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let metrics = payload.metrics();
    let user = services::update_profile(state.users.as_ref(), user_id, payload.name, metrics)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    info!(user_id = %user_id, daily_calories = ?user.daily_calories, "profile updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn log_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<LogWeightRequest>,
) -> Result<Json<WeightLogOutcome>, (StatusCode, String)> {
    let outcome = services::log_weight(
        state.users.as_ref(),
        user_id,
        payload.weight_kg,
        dates::today_utc(),
    )
    .await
    .map_err(internal)?
    .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    info!(user_id = %user_id, weight_kg = payload.weight_kg, "weight logged");
    Ok(Json(outcome))
}

#[instrument(skip(state))]
pub async fn weight_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WeightEntry>>, (StatusCode, String)> {
    let history = state
        .users
        .weight_history(user_id)
        .await
        .map_err(internal)?;
    Ok(Json(history))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<Vec<AdminUserRow>>, (StatusCode, String)> {
    let users = state.users.list().await.map_err(internal)?;
    Ok(Json(users.into_iter().map(AdminUserRow::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn set_role(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Json(payload): Json<SetRoleRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    if payload.user_id == admin_id {
        warn!(admin_id = %admin_id, "admin tried to change own role");
        return Err((StatusCode::BAD_REQUEST, "Cannot change own role".into()));
    }

    let updated = state
        .users
        .set_role(payload.user_id, payload.role)
        .await
        .map_err(internal)?;
    if !updated {
        return Err((StatusCode::NOT_FOUND, "User not found".into()));
    }
    info!(admin_id = %admin_id, user_id = %payload.user_id, role = payload.role.as_str(), "role changed");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if id == admin_id {
        warn!(admin_id = %admin_id, "admin tried to delete self");
        return Err((StatusCode::BAD_REQUEST, "Cannot delete self".into()));
    }

    let deleted = services::delete_account(state.users.as_ref(), state.plans.as_ref(), id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "User not found".into()));
    }
    info!(admin_id = %admin_id, user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<AdminStats>, (StatusCode, String)> {
    let stats = services::admin_stats(state.users.as_ref(), state.plans.as_ref())
        .await
        .map_err(internal)?;
    Ok(Json(stats))
}
