use serde::Deserialize;

use super::repo_types::{MealDraft, MealType, DEFAULT_MEAL_IMAGE};

/// Admin payload for creating or editing a persisted meal.
#[derive(Debug, Deserialize)]
pub struct MealPayload {
    pub meal_name: String,
    pub meal_type: MealType,
    #[serde(default)]
    pub calories: i32,
    #[serde(default)]
    pub protein: i32,
    pub diet_tag: Option<String>,
    pub image_url: Option<String>,
}

impl MealPayload {
    pub fn into_draft(self) -> MealDraft {
        MealDraft {
            meal_name: self.meal_name,
            meal_type: self.meal_type,
            calories: self.calories,
            protein: self.protein,
            diet_tag: self.diet_tag.unwrap_or_else(|| "Vegetarian".to_string()),
            image_url: self
                .image_url
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_MEAL_IMAGE.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteMockMealRequest {
    pub mock_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertMockMealRequest {
    pub mock_id: String,
    pub converted_meal_id: i64,
}
