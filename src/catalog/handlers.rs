use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::services::{AdminUser, AuthUser};
use crate::state::AppState;

use super::dto::{ConvertMockMealRequest, DeleteMockMealRequest, MealPayload};
use super::repo_types::{Meal, MockMealMeta};
use super::services::{self, CatalogError};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/mock-meals/meta", get(mock_meal_meta))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/meals", post(create_meal))
        .route("/admin/meals/:id", put(update_meal).delete(delete_meal))
        .route("/admin/mock-meals/delete", post(delete_mock_meal))
        .route("/admin/mock-meals/convert", post(convert_mock_meal))
}

fn map_catalog_error(e: CatalogError) -> (StatusCode, String) {
    match e {
        CatalogError::NotFound => (StatusCode::NOT_FOUND, "Meal not found".into()),
        CatalogError::Other(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Json<Vec<Meal>> {
    Json(services::effective_catalog(state.catalog.as_ref()).await)
}

/// Overlay rows are public read-only data: clients use them to badge meals
/// that were converted from a built-in entry.
#[instrument(skip(state))]
pub async fn mock_meal_meta(
    State(state): State<AppState>,
) -> Result<Json<Vec<MockMealMeta>>, (StatusCode, String)> {
    let rows = services::overlay_rows(state.catalog.as_ref())
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Json(payload): Json<MealPayload>,
) -> Result<(StatusCode, Json<Meal>), (StatusCode, String)> {
    let meal = services::create_meal(state.catalog.as_ref(), payload.into_draft())
        .await
        .map_err(map_catalog_error)?;
    info!(admin_id = %admin_id, meal_id = %meal.id, "meal created");
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<i64>,
    Json(payload): Json<MealPayload>,
) -> Result<Json<Meal>, (StatusCode, String)> {
    let meal = services::update_persisted(state.catalog.as_ref(), id, payload.into_draft())
        .await
        .map_err(|e| {
            warn!(admin_id = %admin_id, %id, error = %e, "update meal failed");
            map_catalog_error(e)
        })?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::delete_persisted(state.catalog.as_ref(), id)
        .await
        .map_err(|e| {
            warn!(admin_id = %admin_id, %id, error = %e, "delete meal failed");
            map_catalog_error(e)
        })?;
    info!(admin_id = %admin_id, %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn delete_mock_meal(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Json(payload): Json<DeleteMockMealRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::delete_seed(state.catalog.as_ref(), &payload.mock_id)
        .await
        .map_err(map_catalog_error)?;
    info!(admin_id = %admin_id, mock_id = %payload.mock_id, "mock meal hidden");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn convert_mock_meal(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Json(payload): Json<ConvertMockMealRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::convert_seed(
        state.catalog.as_ref(),
        &payload.mock_id,
        payload.converted_meal_id,
    )
    .await
    .map_err(map_catalog_error)?;
    info!(
        admin_id = %admin_id,
        mock_id = %payload.mock_id,
        converted_meal_id = payload.converted_meal_id,
        "mock meal converted"
    );
    Ok(StatusCode::NO_CONTENT)
}
