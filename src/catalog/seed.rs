use lazy_static::lazy_static;

use super::repo_types::{Meal, MealId, MealType, DEFAULT_MEAL_IMAGE};

fn mock(
    id: &str,
    meal_name: &str,
    meal_type: MealType,
    calories: i32,
    protein: i32,
    diet_tag: &str,
) -> Meal {
    Meal {
        id: MealId::Seed(id.to_string()),
        meal_name: meal_name.to_string(),
        meal_type,
        calories,
        protein,
        diet_tag: diet_tag.to_string(),
        image_url: DEFAULT_MEAL_IMAGE.to_string(),
    }
}

lazy_static! {
    /// The built-in starter catalog. Immutable for the process lifetime;
    /// admin deletions and edits of these entries go through the
    /// mock_meal_meta overlay instead of mutating this list.
    pub static ref SEED_MEALS: Vec<Meal> = vec![
        mock("mock-1", "Masala Oats Bowl", MealType::Breakfast, 320, 12, "Vegetarian"),
        mock("mock-2", "Greek Yogurt Parfait", MealType::Breakfast, 280, 18, "Vegetarian"),
        mock("mock-3", "Egg White Omelette", MealType::Breakfast, 240, 22, "High Protein"),
        mock("mock-4", "Peanut Butter Banana Toast", MealType::Breakfast, 390, 14, "Vegan"),
        mock("mock-5", "Grilled Chicken Salad", MealType::Lunch, 450, 38, "High Protein"),
        mock("mock-6", "Paneer Tikka Wrap", MealType::Lunch, 520, 26, "Vegetarian"),
        mock("mock-7", "Quinoa Veggie Bowl", MealType::Lunch, 430, 16, "Vegan"),
        mock("mock-8", "Dal Tadka with Rice", MealType::Lunch, 560, 21, "Vegetarian"),
        mock("mock-9", "Salmon with Greens", MealType::Dinner, 480, 34, "Non-Veg"),
        mock("mock-10", "Tofu Stir Fry", MealType::Dinner, 410, 24, "Vegan"),
        mock("mock-11", "Chicken Breast & Sweet Potato", MealType::Dinner, 530, 42, "High Protein"),
        mock("mock-12", "Vegetable Biryani", MealType::Dinner, 590, 15, "Vegetarian"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_ids_are_unique_and_non_numeric() {
        let mut seen = HashSet::new();
        for meal in SEED_MEALS.iter() {
            assert!(seen.insert(meal.id.clone()), "duplicate seed id {}", meal.id);
            assert!(
                !meal.id.is_persisted(),
                "seed meal {} must not carry a persisted id",
                meal.id
            );
        }
    }
}
