use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::nutrition::{
    self, ActivityLevel, BodyMetrics, FitnessGoal, Gender, NutritionTargets,
};
use crate::plans::repo::PlanStore;

use super::repo::UserStore;
use super::repo_types::{ProfileUpdate, User, WeightEntry};

/// Metrics a brand-new account starts with, until the user fills in their
/// profile. Targets are derived from these through the calculator so the
/// account is never created with values its own inputs would not produce.
pub fn registration_metrics() -> BodyMetrics {
    BodyMetrics {
        age: 25,
        gender: Gender::Male,
        weight_kg: 70.0,
        height_cm: 175.0,
        activity_level: ActivityLevel::Moderate,
        goal: FitnessGoal::Maintain,
    }
}

/// The stored metrics of a user, falling back to the registration defaults
/// for anything missing, with the given weight substituted in.
fn metrics_with_weight(user: &User, weight_kg: f64) -> BodyMetrics {
    let defaults = registration_metrics();
    BodyMetrics {
        age: user.age.unwrap_or(defaults.age),
        gender: user.gender.unwrap_or(defaults.gender),
        weight_kg,
        height_cm: user.height_cm.unwrap_or(defaults.height_cm),
        activity_level: user.activity_level.unwrap_or(defaults.activity_level),
        goal: user.goal.unwrap_or(defaults.goal),
    }
}

/// Replace the user's profile. The three derived targets are recomputed
/// from the submitted metrics in the same write; they are never accepted
/// from the caller.
pub async fn update_profile(
    store: &dyn UserStore,
    user_id: Uuid,
    name: String,
    metrics: BodyMetrics,
) -> anyhow::Result<Option<User>> {
    let targets = nutrition::compute_targets(&metrics);
    store
        .update_profile(
            user_id,
            ProfileUpdate {
                name,
                metrics,
                targets,
            },
        )
        .await
}

#[derive(Debug, Serialize)]
pub struct WeightLogOutcome {
    pub history: Vec<WeightEntry>,
    pub targets: NutritionTargets,
}

/// Record today's weight and refresh the derived targets.
///
/// A second log on the same calendar date replaces that date's entry rather
/// than appending. Weight feeds BMR, protein and water, so the targets are
/// recomputed in the same call; a weight-only update never leaves them
/// stale. `today` is evaluated once by the caller from a single clock.
pub async fn log_weight(
    users: &dyn UserStore,
    user_id: Uuid,
    weight_kg: f64,
    today: Date,
) -> anyhow::Result<Option<WeightLogOutcome>> {
    let Some(user) = users.find_by_id(user_id).await? else {
        return Ok(None);
    };

    let targets = nutrition::compute_targets(&metrics_with_weight(&user, weight_kg));
    users
        .upsert_weight_entry(
            user_id,
            WeightEntry {
                date: today,
                weight_kg,
            },
        )
        .await?;
    users.set_weight(user_id, weight_kg, targets).await?;
    let history = users.weight_history(user_id).await?;
    Ok(Some(WeightLogOutcome { history, targets }))
}

/// Remove an account and everything it owns: plans are deleted explicitly
/// (they live in their own store), weight history goes with the user row.
pub async fn delete_account(
    users: &dyn UserStore,
    plans: &dyn PlanStore,
    user_id: Uuid,
) -> anyhow::Result<bool> {
    plans.delete_for_user(user_id).await?;
    users.delete(user_id).await
}

/// Make sure the configured administrator account exists. Run at startup;
/// a second boot finds the account and leaves it alone.
pub async fn ensure_admin_account(
    users: &dyn UserStore,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    if users.find_by_email(email).await?.is_some() {
        return Ok(());
    }

    let metrics = registration_metrics();
    let user = users
        .create(super::repo_types::NewUser {
            name: "System Admin".into(),
            email: email.to_string(),
            password_hash: crate::auth::services::hash_password(password)?,
            role: super::repo_types::Role::Admin,
            metrics,
            targets: nutrition::compute_targets(&metrics),
        })
        .await?;
    tracing::info!(user_id = %user.id, email = %email, "admin account created");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_plans: i64,
    pub avg_water: Option<f64>,
}

pub async fn admin_stats(
    users: &dyn UserStore,
    plans: &dyn PlanStore,
) -> anyhow::Result<AdminStats> {
    Ok(AdminStats {
        total_users: users.count().await?,
        total_plans: plans.count_all().await?,
        avg_water: plans.average_water().await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::repo::MemoryPlanStore;
    use crate::plans::repo_types::DailyPlan;
    use crate::users::repo::MemoryUserStore;
    use crate::users::repo_types::{NewUser, Role};
    use time::macros::date;

    async fn seeded_user(store: &MemoryUserStore) -> User {
        let metrics = registration_metrics();
        store
            .create(NewUser {
                name: "Test User".into(),
                email: "test@example.com".into(),
                password_hash: "hash".into(),
                role: Role::User,
                metrics,
                targets: nutrition::compute_targets(&metrics),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn profile_update_recomputes_all_three_targets() {
        let store = MemoryUserStore::default();
        let user = seeded_user(&store).await;

        let metrics = BodyMetrics {
            age: 30,
            gender: Gender::Male,
            weight_kg: 80.0,
            height_cm: 180.0,
            activity_level: ActivityLevel::Moderate,
            goal: FitnessGoal::Maintain,
        };
        let updated = update_profile(&store, user.id, "Test User".into(), metrics)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.daily_calories, Some(2759));
        assert_eq!(updated.daily_protein, Some(96));
        assert_eq!(updated.daily_water, Some(2.8));
    }

    #[tokio::test]
    async fn profile_update_of_unknown_user_is_none() {
        let store = MemoryUserStore::default();
        let result = update_profile(
            &store,
            Uuid::new_v4(),
            "Ghost".into(),
            registration_metrics(),
        )
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn same_day_relog_replaces_the_entry() {
        let store = MemoryUserStore::default();
        let user = seeded_user(&store).await;
        let today = date!(2024 - 03 - 15);

        log_weight(&store, user.id, 71.0, today).await.unwrap();
        let outcome = log_weight(&store, user.id, 70.5, today)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.history[0].weight_kg, 70.5);
        assert_eq!(outcome.history[0].date, today);
    }

    #[tokio::test]
    async fn history_reads_newest_first() {
        let store = MemoryUserStore::default();
        let user = seeded_user(&store).await;

        log_weight(&store, user.id, 71.0, date!(2024 - 03 - 14))
            .await
            .unwrap();
        let outcome = log_weight(&store, user.id, 70.0, date!(2024 - 03 - 15))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.history[0].date, date!(2024 - 03 - 15));
        assert_eq!(outcome.history[1].date, date!(2024 - 03 - 14));
    }

    #[tokio::test]
    async fn logging_weight_refreshes_the_targets() {
        let store = MemoryUserStore::default();
        let user = seeded_user(&store).await;

        // Move the profile to the reference metrics first.
        let metrics = BodyMetrics {
            age: 30,
            gender: Gender::Male,
            weight_kg: 80.0,
            height_cm: 180.0,
            activity_level: ActivityLevel::Moderate,
            goal: FitnessGoal::Maintain,
        };
        update_profile(&store, user.id, "Test User".into(), metrics)
            .await
            .unwrap();

        let outcome = log_weight(&store, user.id, 90.0, date!(2024 - 03 - 15))
            .await
            .unwrap()
            .unwrap();
        // BMR = 900 + 1125 - 150 + 5 = 1880; 1880 * 1.55 = 2914.
        assert_eq!(outcome.targets.daily_calories, 2914);
        assert_eq!(outcome.targets.daily_protein, 108);
        assert_eq!(outcome.targets.daily_water, 3.2);

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.weight_kg, Some(90.0));
        assert_eq!(stored.daily_calories, Some(2914));
    }

    #[tokio::test]
    async fn deleting_an_account_removes_its_plans() {
        let users = MemoryUserStore::default();
        let plans = MemoryPlanStore::default();
        let user = seeded_user(&users).await;

        plans
            .upsert(user.id, &DailyPlan::empty(date!(2024 - 01 - 01)))
            .await
            .unwrap();
        assert!(delete_account(&users, &plans, user.id).await.unwrap());

        assert!(users.find_by_id(user.id).await.unwrap().is_none());
        assert_eq!(plans.count_all().await.unwrap(), 0);
        assert!(users.weight_history(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn admin_bootstrap_is_idempotent() {
        let users = MemoryUserStore::default();
        ensure_admin_account(&users, "admin@example.com", "change-me-123")
            .await
            .unwrap();
        ensure_admin_account(&users, "admin@example.com", "change-me-123")
            .await
            .unwrap();

        assert_eq!(users.count().await.unwrap(), 1);
        let admin = users
            .find_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.daily_calories.is_some());
    }

    #[tokio::test]
    async fn stats_cover_users_plans_and_water() {
        let users = MemoryUserStore::default();
        let plans = MemoryPlanStore::default();
        let user = seeded_user(&users).await;

        let mut plan = DailyPlan::empty(date!(2024 - 01 - 01));
        plan.water_intake = 2.0;
        plans.upsert(user.id, &plan).await.unwrap();
        let mut plan = DailyPlan::empty(date!(2024 - 01 - 02));
        plan.water_intake = 1.0;
        plans.upsert(user.id, &plan).await.unwrap();

        let stats = admin_stats(&users, &plans).await.unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_plans, 2);
        assert_eq!(stats.avg_water, Some(1.5));
    }
}
