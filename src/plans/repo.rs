use anyhow::Context;
use axum::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Mutex;
use time::Date;
use uuid::Uuid;

use crate::catalog::repo_types::Meal;

use super::repo_types::DailyPlan;

/// Durable store of per-(user, date) plan rows. Mutations go through
/// [`upsert`](PlanStore::upsert) as one atomic write, so a row can never be
/// observed half-updated; concurrent writers are last-write-wins, which the
/// single-editor domain accepts.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<DailyPlan>>;
    async fn upsert(&self, user_id: Uuid, plan: &DailyPlan) -> anyhow::Result<()>;
    async fn get_range(&self, user_id: Uuid, from: Date, to: Date)
        -> anyhow::Result<Vec<DailyPlan>>;
    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<()>;
    async fn count_all(&self) -> anyhow::Result<i64>;
    async fn average_water(&self) -> anyhow::Result<Option<f64>>;
}

#[derive(FromRow)]
struct PlanRow {
    date: Date,
    breakfast: Option<Json<Meal>>,
    lunch: Option<Json<Meal>>,
    dinner: Option<Json<Meal>>,
    water_intake: f64,
}

impl PlanRow {
    fn into_plan(self) -> DailyPlan {
        DailyPlan {
            date: self.date,
            breakfast: self.breakfast.map(|Json(meal)| meal),
            lunch: self.lunch.map(|Json(meal)| meal),
            dinner: self.dinner.map(|Json(meal)| meal),
            water_intake: self.water_intake,
        }
    }
}

#[derive(Clone)]
pub struct PgPlanStore {
    db: PgPool,
}

impl PgPlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn get(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<DailyPlan>> {
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT date, breakfast, lunch, dinner, water_intake
            FROM plans
            WHERE user_id = $1 AND date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await
        .context("get plan")?;
        Ok(row.map(PlanRow::into_plan))
    }

    async fn upsert(&self, user_id: Uuid, plan: &DailyPlan) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plans (user_id, date, breakfast, lunch, dinner, water_intake)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, date) DO UPDATE
            SET breakfast = EXCLUDED.breakfast,
                lunch = EXCLUDED.lunch,
                dinner = EXCLUDED.dinner,
                water_intake = EXCLUDED.water_intake
            "#,
        )
        .bind(user_id)
        .bind(plan.date)
        .bind(plan.breakfast.clone().map(Json))
        .bind(plan.lunch.clone().map(Json))
        .bind(plan.dinner.clone().map(Json))
        .bind(plan.water_intake)
        .execute(&self.db)
        .await
        .context("upsert plan")?;
        Ok(())
    }

    async fn get_range(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<DailyPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT date, breakfast, lunch, dinner, water_intake
            FROM plans
            WHERE user_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .context("get plan range")?;
        Ok(rows.into_iter().map(PlanRow::into_plan).collect())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM plans WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete plans for user")?;
        Ok(())
    }

    async fn count_all(&self) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM plans"#)
            .fetch_one(&self.db)
            .await
            .context("count plans")?;
        Ok(count)
    }

    async fn average_water(&self) -> anyhow::Result<Option<f64>> {
        let (avg,): (Option<f64>,) = sqlx::query_as(r#"SELECT AVG(water_intake) FROM plans"#)
            .fetch_one(&self.db)
            .await
            .context("average water")?;
        Ok(avg)
    }
}

/// In-memory plan store used by `AppState::fake()` and unit tests.
#[derive(Default)]
pub struct MemoryPlanStore {
    plans: Mutex<HashMap<(Uuid, Date), DailyPlan>>,
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn get(&self, user_id: Uuid, date: Date) -> anyhow::Result<Option<DailyPlan>> {
        Ok(self.plans.lock().unwrap().get(&(user_id, date)).cloned())
    }

    async fn upsert(&self, user_id: Uuid, plan: &DailyPlan) -> anyhow::Result<()> {
        self.plans
            .lock()
            .unwrap()
            .insert((user_id, plan.date), plan.clone());
        Ok(())
    }

    async fn get_range(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<DailyPlan>> {
        let plans = self.plans.lock().unwrap();
        let mut rows: Vec<DailyPlan> = plans
            .iter()
            .filter(|((uid, date), _)| *uid == user_id && *date >= from && *date <= to)
            .map(|(_, plan)| plan.clone())
            .collect();
        rows.sort_by_key(|plan| plan.date);
        Ok(rows)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<()> {
        self.plans
            .lock()
            .unwrap()
            .retain(|(uid, _), _| *uid != user_id);
        Ok(())
    }

    async fn count_all(&self) -> anyhow::Result<i64> {
        Ok(self.plans.lock().unwrap().len() as i64)
    }

    async fn average_water(&self) -> anyhow::Result<Option<f64>> {
        let plans = self.plans.lock().unwrap();
        if plans.is_empty() {
            return Ok(None);
        }
        let sum: f64 = plans.values().map(|plan| plan.water_intake).sum();
        Ok(Some(sum / plans.len() as f64))
    }
}
