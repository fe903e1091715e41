use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use time::Date;
use tracing::{error, instrument, warn};

use crate::auth::services::AuthUser;
use crate::catalog::repo_types::MealType;
use crate::catalog::services::effective_catalog;
use crate::dates;
use crate::state::AppState;

use super::dto::{AssignMealRequest, SetWaterRequest};
use super::repo_types::DailyPlan;
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans/:date", get(get_plan))
        .route("/plans/:date/meals", post(assign_meal))
        .route("/plans/:date/meals/:slot", delete(remove_meal))
        .route("/plans/:date/water", put(set_water))
}

fn parse_date(raw: &str) -> Result<Date, (StatusCode, String)> {
    dates::parse(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid date: {raw} (expected YYYY-MM-DD)"),
        )
    })
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "plan store failure");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DailyPlan>, (StatusCode, String)> {
    let date = parse_date(&date)?;
    let plan = services::get_plan(state.plans.as_ref(), user_id, date)
        .await
        .map_err(internal)?;
    Ok(Json(plan))
}

#[instrument(skip(state, payload))]
pub async fn assign_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<AssignMealRequest>,
) -> Result<Json<DailyPlan>, (StatusCode, String)> {
    let date = parse_date(&date)?;

    let meal = effective_catalog(state.catalog.as_ref())
        .await
        .into_iter()
        .find(|meal| meal.id == payload.meal_id)
        .ok_or_else(|| {
            warn!(user_id = %user_id, meal_id = %payload.meal_id, "assign of unknown meal");
            (StatusCode::NOT_FOUND, "Meal not found".into())
        })?;

    let plan = services::assign_meal(state.plans.as_ref(), user_id, date, meal)
        .await
        .map_err(internal)?;
    Ok(Json(plan))
}

#[instrument(skip(state))]
pub async fn remove_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, slot)): Path<(String, String)>,
) -> Result<Json<DailyPlan>, (StatusCode, String)> {
    let date = parse_date(&date)?;
    let slot: MealType = slot
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;

    let plan = services::remove_meal(state.plans.as_ref(), user_id, date, slot)
        .await
        .map_err(internal)?;
    Ok(Json(plan))
}

#[instrument(skip(state, payload))]
pub async fn set_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
    Json(payload): Json<SetWaterRequest>,
) -> Result<Json<DailyPlan>, (StatusCode, String)> {
    let date = parse_date(&date)?;
    let plan = services::set_water(state.plans.as_ref(), user_id, date, payload.amount)
        .await
        .map_err(internal)?;
    Ok(Json(plan))
}
