use time::Date;
use uuid::Uuid;

use crate::catalog::repo_types::{Meal, MealType};

use super::repo::PlanStore;
use super::repo_types::DailyPlan;

/// Read a user's plan for a date. A date that was never written yields an
/// empty plan, never an absent result.
pub async fn get_plan(
    store: &dyn PlanStore,
    user_id: Uuid,
    date: Date,
) -> anyhow::Result<DailyPlan> {
    Ok(store
        .get(user_id, date)
        .await?
        .unwrap_or_else(|| DailyPlan::empty(date)))
}

/// Write a snapshot of `meal` into the slot named by its meal type,
/// creating the plan lazily. Re-assigning an occupied slot overwrites it.
/// The mutation is only visible once the durable upsert has succeeded.
pub async fn assign_meal(
    store: &dyn PlanStore,
    user_id: Uuid,
    date: Date,
    meal: Meal,
) -> anyhow::Result<DailyPlan> {
    let mut plan = get_plan(store, user_id, date).await?;
    let slot = meal.meal_type;
    plan.set_slot(slot, Some(meal));
    store.upsert(user_id, &plan).await?;
    Ok(plan)
}

/// Clear one slot, leaving the others and the water intake untouched.
/// Removing an already-empty slot is a no-op, not an error.
pub async fn remove_meal(
    store: &dyn PlanStore,
    user_id: Uuid,
    date: Date,
    slot: MealType,
) -> anyhow::Result<DailyPlan> {
    let mut plan = get_plan(store, user_id, date).await?;
    plan.set_slot(slot, None);
    store.upsert(user_id, &plan).await?;
    Ok(plan)
}

/// Replace the date's water intake with `max(0, amount)`. Negative input is
/// clamped rather than rejected.
pub async fn set_water(
    store: &dyn PlanStore,
    user_id: Uuid,
    date: Date,
    amount: f64,
) -> anyhow::Result<DailyPlan> {
    let mut plan = get_plan(store, user_id, date).await?;
    plan.water_intake = amount.max(0.0);
    store.upsert(user_id, &plan).await?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo_types::MealId;
    use crate::plans::repo::MemoryPlanStore;
    use time::macros::date;

    fn meal(name: &str, meal_type: MealType, calories: i32, protein: i32) -> Meal {
        Meal {
            id: MealId::Persisted(1),
            meal_name: name.to_string(),
            meal_type,
            calories,
            protein,
            diet_tag: "High Protein".into(),
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn unwritten_date_reads_as_an_empty_plan() {
        let store = MemoryPlanStore::default();
        let plan = get_plan(&store, Uuid::new_v4(), date!(2024 - 01 - 01))
            .await
            .unwrap();
        assert_eq!(plan, DailyPlan::empty(date!(2024 - 01 - 01)));
    }

    #[tokio::test]
    async fn assign_then_get_roundtrips_the_snapshot() {
        let store = MemoryPlanStore::default();
        let user = Uuid::new_v4();
        let day = date!(2024 - 01 - 01);
        let breakfast = meal("Omelette", MealType::Breakfast, 450, 30);

        assign_meal(&store, user, day, breakfast.clone())
            .await
            .unwrap();
        let plan = get_plan(&store, user, day).await.unwrap();
        assert_eq!(plan.breakfast.as_ref(), Some(&breakfast));
        assert!(plan.lunch.is_none());
        assert!(plan.dinner.is_none());
    }

    #[tokio::test]
    async fn reassigning_a_slot_overwrites_it() {
        let store = MemoryPlanStore::default();
        let user = Uuid::new_v4();
        let day = date!(2024 - 01 - 01);

        assign_meal(&store, user, day, meal("First", MealType::Lunch, 600, 40))
            .await
            .unwrap();
        let plan = assign_meal(&store, user, day, meal("Second", MealType::Lunch, 500, 35))
            .await
            .unwrap();
        assert_eq!(plan.lunch.as_ref().unwrap().meal_name, "Second");
    }

    #[tokio::test]
    async fn snapshots_survive_later_catalog_edits() {
        let store = MemoryPlanStore::default();
        let user = Uuid::new_v4();
        let day = date!(2024 - 01 - 01);
        let mut dinner = meal("Salmon", MealType::Dinner, 480, 34);

        assign_meal(&store, user, day, dinner.clone()).await.unwrap();
        // Mutating the caller's copy must not affect the stored plan.
        dinner.calories = 9000;
        let plan = get_plan(&store, user, day).await.unwrap();
        assert_eq!(plan.dinner.as_ref().unwrap().calories, 480);
    }

    #[tokio::test]
    async fn removing_an_empty_slot_is_a_no_op() {
        let store = MemoryPlanStore::default();
        let user = Uuid::new_v4();
        let day = date!(2024 - 01 - 01);

        assign_meal(&store, user, day, meal("Wrap", MealType::Lunch, 520, 26))
            .await
            .unwrap();
        let before = get_plan(&store, user, day).await.unwrap();
        let after = remove_meal(&store, user, day, MealType::Dinner).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn remove_clears_only_the_named_slot() {
        let store = MemoryPlanStore::default();
        let user = Uuid::new_v4();
        let day = date!(2024 - 01 - 01);

        assign_meal(&store, user, day, meal("Oats", MealType::Breakfast, 320, 12))
            .await
            .unwrap();
        assign_meal(&store, user, day, meal("Wrap", MealType::Lunch, 520, 26))
            .await
            .unwrap();
        set_water(&store, user, day, 1.5).await.unwrap();

        let plan = remove_meal(&store, user, day, MealType::Breakfast)
            .await
            .unwrap();
        assert!(plan.slot(MealType::Breakfast).is_none());
        assert!(plan.slot(MealType::Lunch).is_some());
        assert_eq!(plan.water_intake, 1.5);
    }

    #[tokio::test]
    async fn negative_water_is_clamped_to_zero() {
        let store = MemoryPlanStore::default();
        let user = Uuid::new_v4();
        let day = date!(2024 - 01 - 01);

        let plan = set_water(&store, user, day, -5.0).await.unwrap();
        assert_eq!(plan.water_intake, 0.0);
        let stored = get_plan(&store, user, day).await.unwrap();
        assert_eq!(stored.water_intake, 0.0);
    }

    #[tokio::test]
    async fn plans_are_partitioned_per_user() {
        let store = MemoryPlanStore::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let day = date!(2024 - 01 - 01);

        assign_meal(&store, alice, day, meal("Oats", MealType::Breakfast, 320, 12))
            .await
            .unwrap();
        let bobs = get_plan(&store, bob, day).await.unwrap();
        assert!(bobs.breakfast.is_none());
    }
}
