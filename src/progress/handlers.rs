use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::{error, instrument};

use crate::auth::services::AuthUser;
use crate::dates;
use crate::state::AppState;

use super::services::{average_protein, weekly_progress, window_dates, DayProgress};

// Target shown when a user has never filled in their metrics.
const FALLBACK_CALORIE_TARGET: i32 = 2000;

pub fn routes() -> Router<AppState> {
    Router::new().route("/progress/weekly", get(weekly))
}

#[derive(Debug, Serialize)]
pub struct WeeklyProgressResponse {
    pub calorie_target: i32,
    pub average_protein: f64,
    pub days: Vec<DayProgress>,
}

#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<WeeklyProgressResponse>, (StatusCode, String)> {
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let window = window_dates(dates::today_utc());
    let plans = state
        .plans
        .get_range(user_id, window[0], window[window.len() - 1])
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "weekly progress read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let calorie_target = user.daily_calories.unwrap_or(FALLBACK_CALORIE_TARGET);
    let days = weekly_progress(&window, &plans, calorie_target);
    Ok(Json(WeeklyProgressResponse {
        calorie_target,
        average_protein: average_protein(&days),
        days,
    }))
}
