use anyhow::Context;
use axum::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::repo_types::{Meal, MealDraft, MealId, MockMealMeta};

/// Durable side of the meal catalog: admin-created meals plus the overlay
/// that reconciles the built-in mock meals with them. The merge and the
/// admin services only see this trait, so the substrate is swappable.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_persisted(&self) -> anyhow::Result<Vec<Meal>>;
    /// Insert a new persisted meal and return it with its fresh id. The id
    /// is usable immediately, e.g. in a conversion recorded right after.
    async fn insert(&self, draft: MealDraft) -> anyhow::Result<Meal>;
    async fn update(&self, id: i64, draft: MealDraft) -> anyhow::Result<Option<Meal>>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;

    async fn list_overlay(&self) -> anyhow::Result<Vec<MockMealMeta>>;
    async fn mark_seed_deleted(&self, mock_id: &str) -> anyhow::Result<()>;
    async fn record_conversion(&self, mock_id: &str, converted_meal_id: i64)
        -> anyhow::Result<()>;
}

#[derive(Debug, FromRow)]
struct MealRow {
    id: i64,
    meal_name: String,
    meal_type: String,
    calories: i32,
    protein: i32,
    diet_tag: String,
    image_url: String,
}

impl MealRow {
    fn into_meal(self) -> anyhow::Result<Meal> {
        let meal_type = self
            .meal_type
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("meal {} has a bad meal_type", self.id))?;
        Ok(Meal {
            id: MealId::Persisted(self.id),
            meal_name: self.meal_name,
            meal_type,
            calories: self.calories,
            protein: self.protein,
            diet_tag: self.diet_tag,
            image_url: self.image_url,
        })
    }
}

#[derive(Clone)]
pub struct PgCatalogStore {
    db: PgPool,
}

impl PgCatalogStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_persisted(&self) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, meal_name, meal_type, calories, protein, diet_tag, image_url
            FROM meals
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list persisted meals")?;
        rows.into_iter().map(MealRow::into_meal).collect()
    }

    async fn insert(&self, draft: MealDraft) -> anyhow::Result<Meal> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            INSERT INTO meals (meal_name, meal_type, calories, protein, diet_tag, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, meal_name, meal_type, calories, protein, diet_tag, image_url
            "#,
        )
        .bind(&draft.meal_name)
        .bind(draft.meal_type.as_str())
        .bind(draft.calories)
        .bind(draft.protein)
        .bind(&draft.diet_tag)
        .bind(&draft.image_url)
        .fetch_one(&self.db)
        .await
        .context("insert meal")?;
        row.into_meal()
    }

    async fn update(&self, id: i64, draft: MealDraft) -> anyhow::Result<Option<Meal>> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            UPDATE meals
            SET meal_name = $2, meal_type = $3, calories = $4,
                protein = $5, diet_tag = $6, image_url = $7
            WHERE id = $1
            RETURNING id, meal_name, meal_type, calories, protein, diet_tag, image_url
            "#,
        )
        .bind(id)
        .bind(&draft.meal_name)
        .bind(draft.meal_type.as_str())
        .bind(draft.calories)
        .bind(draft.protein)
        .bind(&draft.diet_tag)
        .bind(&draft.image_url)
        .fetch_optional(&self.db)
        .await
        .context("update meal")?;
        row.map(MealRow::into_meal).transpose()
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM meals WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete meal")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_overlay(&self) -> anyhow::Result<Vec<MockMealMeta>> {
        let rows = sqlx::query_as::<_, MockMealMeta>(
            r#"
            SELECT mock_id, deleted, converted_meal_id
            FROM mock_meal_meta
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list mock meal meta")?;
        Ok(rows)
    }

    async fn mark_seed_deleted(&self, mock_id: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mock_meal_meta (mock_id, deleted)
            VALUES ($1, TRUE)
            ON CONFLICT (mock_id) DO UPDATE SET deleted = TRUE
            "#,
        )
        .bind(mock_id)
        .execute(&self.db)
        .await
        .context("mark mock meal deleted")?;
        Ok(())
    }

    async fn record_conversion(
        &self,
        mock_id: &str,
        converted_meal_id: i64,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mock_meal_meta (mock_id, deleted, converted_meal_id)
            VALUES ($1, FALSE, $2)
            ON CONFLICT (mock_id) DO UPDATE SET converted_meal_id = EXCLUDED.converted_meal_id
            "#,
        )
        .bind(mock_id)
        .bind(converted_meal_id)
        .execute(&self.db)
        .await
        .context("record mock meal conversion")?;
        Ok(())
    }
}

/// In-memory catalog used by `AppState::fake()` and unit tests.
#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<MemoryCatalogInner>,
}

#[derive(Default)]
struct MemoryCatalogInner {
    next_id: i64,
    // BTreeMap so iteration order is stable; listing reverses it to match
    // the newest-first ordering of the SQL store.
    meals: BTreeMap<i64, Meal>,
    overlay: BTreeMap<String, MockMealMeta>,
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_persisted(&self) -> anyhow::Result<Vec<Meal>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.meals.values().rev().cloned().collect())
    }

    async fn insert(&self, draft: MealDraft) -> anyhow::Result<Meal> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        let meal = draft.into_meal(MealId::Persisted(id));
        inner.meals.insert(id, meal.clone());
        Ok(meal)
    }

    async fn update(&self, id: i64, draft: MealDraft) -> anyhow::Result<Option<Meal>> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.meals.contains_key(&id) {
            return Ok(None);
        }
        let meal = draft.into_meal(MealId::Persisted(id));
        inner.meals.insert(id, meal.clone());
        Ok(Some(meal))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.lock().unwrap().meals.remove(&id).is_some())
    }

    async fn list_overlay(&self) -> anyhow::Result<Vec<MockMealMeta>> {
        Ok(self.inner.lock().unwrap().overlay.values().cloned().collect())
    }

    async fn mark_seed_deleted(&self, mock_id: &str) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .overlay
            .entry(mock_id.to_string())
            .or_insert_with(|| MockMealMeta {
                mock_id: mock_id.to_string(),
                deleted: false,
                converted_meal_id: None,
            })
            .deleted = true;
        Ok(())
    }

    async fn record_conversion(
        &self,
        mock_id: &str,
        converted_meal_id: i64,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .overlay
            .entry(mock_id.to_string())
            .or_insert_with(|| MockMealMeta {
                mock_id: mock_id.to_string(),
                deleted: false,
                converted_meal_id: None,
            })
            .converted_meal_id = Some(converted_meal_id);
        Ok(())
    }
}
