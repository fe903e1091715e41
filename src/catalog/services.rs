use thiserror::Error;
use tracing::warn;

use super::merge::merge_catalog;
use super::repo::CatalogStore;
use super::repo_types::{Meal, MealDraft, MockMealMeta};
use super::seed::SEED_MEALS;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("meal not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The one global meal list: persisted meals first, then the mock meals the
/// overlay still shows. The two durable inputs are independent reads and are
/// fetched concurrently; if either is unavailable the catalog degrades to
/// the built-in mock meals so browsing keeps working.
pub async fn effective_catalog(store: &dyn CatalogStore) -> Vec<Meal> {
    let (persisted, overlay) = tokio::join!(store.list_persisted(), store.list_overlay());
    match (persisted, overlay) {
        (Ok(persisted), Ok(overlay)) => merge_catalog(&SEED_MEALS, persisted, &overlay),
        (persisted, overlay) => {
            if let Err(e) = &persisted {
                warn!(error = %e, "persisted catalog unavailable, serving mock meals only");
            }
            if let Err(e) = &overlay {
                warn!(error = %e, "mock meal overlay unavailable, serving mock meals only");
            }
            SEED_MEALS.clone()
        }
    }
}

pub async fn overlay_rows(store: &dyn CatalogStore) -> anyhow::Result<Vec<MockMealMeta>> {
    store.list_overlay().await
}

pub async fn create_meal(store: &dyn CatalogStore, draft: MealDraft) -> Result<Meal, CatalogError> {
    Ok(store.insert(draft).await?)
}

pub async fn update_persisted(
    store: &dyn CatalogStore,
    id: i64,
    draft: MealDraft,
) -> Result<Meal, CatalogError> {
    store.update(id, draft).await?.ok_or(CatalogError::NotFound)
}

pub async fn delete_persisted(store: &dyn CatalogStore, id: i64) -> Result<(), CatalogError> {
    if store.delete(id).await? {
        Ok(())
    } else {
        Err(CatalogError::NotFound)
    }
}

/// Mock meals cannot be removed from the immutable seed list; deleting one
/// records `deleted = true` in the overlay, which the merge then honors.
pub async fn delete_seed(store: &dyn CatalogStore, mock_id: &str) -> Result<(), CatalogError> {
    Ok(store.mark_seed_deleted(mock_id).await?)
}

/// Mock meals cannot be edited in place either: the caller first creates a
/// persisted meal carrying the edited fields, then records the conversion
/// here so the stand-in disappears and the persisted version takes over.
pub async fn convert_seed(
    store: &dyn CatalogStore,
    mock_id: &str,
    converted_meal_id: i64,
) -> Result<(), CatalogError> {
    Ok(store.record_conversion(mock_id, converted_meal_id).await?)
}
