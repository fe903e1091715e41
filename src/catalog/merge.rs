use std::collections::HashSet;

use super::repo_types::{Meal, MealId, MockMealMeta};

/// Reconcile the three catalog inputs into the one global meal list.
///
/// Persisted meals come first (display precedence for admin-created
/// entries), followed by the mock meals that the overlay has not hidden.
/// A mock meal is hidden when it is marked deleted or has been converted
/// into a persisted meal; in the converted case the persisted version is
/// already in the list and keeping the stand-in would duplicate it.
/// De-duplication by id is first-occurrence-wins, which also guards against
/// a persisted meal colliding with a seed id.
pub fn merge_catalog(seed: &[Meal], persisted: Vec<Meal>, overlay: &[MockMealMeta]) -> Vec<Meal> {
    let hidden: HashSet<&str> = overlay
        .iter()
        .filter(|meta| meta.deleted || meta.converted_meal_id.is_some())
        .map(|meta| meta.mock_id.as_str())
        .collect();

    let visible_seed = seed.iter().filter(|meal| match &meal.id {
        MealId::Seed(id) => !hidden.contains(id.as_str()),
        MealId::Persisted(_) => true,
    });

    let mut seen: HashSet<MealId> = HashSet::new();
    let mut merged = Vec::with_capacity(persisted.len() + seed.len());
    for meal in persisted.into_iter().chain(visible_seed.cloned()) {
        if seen.insert(meal.id.clone()) {
            merged.push(meal);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::repo_types::MealType;

    fn seed_meal(id: &str, name: &str) -> Meal {
        Meal {
            id: MealId::Seed(id.to_string()),
            meal_name: name.to_string(),
            meal_type: MealType::Lunch,
            calories: 400,
            protein: 20,
            diet_tag: "Vegetarian".into(),
            image_url: String::new(),
        }
    }

    fn persisted_meal(id: i64, name: &str) -> Meal {
        Meal {
            id: MealId::Persisted(id),
            meal_name: name.to_string(),
            meal_type: MealType::Dinner,
            calories: 500,
            protein: 30,
            diet_tag: "Non-Veg".into(),
            image_url: String::new(),
        }
    }

    fn deleted(mock_id: &str) -> MockMealMeta {
        MockMealMeta {
            mock_id: mock_id.into(),
            deleted: true,
            converted_meal_id: None,
        }
    }

    fn converted(mock_id: &str, to: i64) -> MockMealMeta {
        MockMealMeta {
            mock_id: mock_id.into(),
            deleted: false,
            converted_meal_id: Some(to),
        }
    }

    #[test]
    fn persisted_meals_come_first() {
        let seed = vec![seed_meal("mock-1", "Oats")];
        let merged = merge_catalog(&seed, vec![persisted_meal(1, "Curry")], &[]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, MealId::Persisted(1));
        assert_eq!(merged[1].id, MealId::Seed("mock-1".into()));
    }

    #[test]
    fn deleted_seed_never_appears() {
        let seed = vec![seed_meal("mock-1", "Oats"), seed_meal("mock-2", "Wrap")];
        let merged = merge_catalog(
            &seed,
            vec![persisted_meal(1, "Curry")],
            &[deleted("mock-1")],
        );
        assert!(merged.iter().all(|m| m.id != MealId::Seed("mock-1".into())));
        assert!(merged.iter().any(|m| m.id == MealId::Seed("mock-2".into())));
    }

    #[test]
    fn converted_seed_is_replaced_by_its_persisted_meal() {
        let seed = vec![seed_meal("mock-1", "Oats")];
        let merged = merge_catalog(
            &seed,
            vec![persisted_meal(9, "Oats v2")],
            &[converted("mock-1", 9)],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, MealId::Persisted(9));
    }

    #[test]
    fn id_collisions_keep_the_first_occurrence() {
        // A seed entry that (wrongly) carries a persisted-looking id must
        // not produce a duplicate of an actual persisted meal.
        let mut rogue = seed_meal("mock-1", "Rogue");
        rogue.id = MealId::Persisted(5);
        let merged = merge_catalog(&[rogue], vec![persisted_meal(5, "Real")], &[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].meal_name, "Real");
    }

    #[test]
    fn overlay_rows_without_flags_hide_nothing() {
        let seed = vec![seed_meal("mock-1", "Oats")];
        let meta = MockMealMeta {
            mock_id: "mock-1".into(),
            deleted: false,
            converted_meal_id: None,
        };
        let merged = merge_catalog(&seed, vec![], &[meta]);
        assert_eq!(merged.len(), 1);
    }
}
