use serde::{Deserialize, Serialize};
use time::Date;

use crate::catalog::repo_types::{Meal, MealType};

/// One user's plan for one calendar date.
///
/// An unset slot means "not yet assigned", which is distinct from a
/// zero-calorie meal. Slots hold full meal snapshots copied at assignment
/// time, so later catalog edits or deletions never change what a past day
/// looked like. An empty plan (no slots, zero water) is equivalent to no
/// plan at all but may still be materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch: Option<Meal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<Meal>,
    #[serde(default)]
    pub water_intake: f64,
}

impl DailyPlan {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            breakfast: None,
            lunch: None,
            dinner: None,
            water_intake: 0.0,
        }
    }

    pub fn slot(&self, slot: MealType) -> Option<&Meal> {
        match slot {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
        }
    }

    pub fn set_slot(&mut self, slot: MealType, meal: Option<Meal>) {
        match slot {
            MealType::Breakfast => self.breakfast = meal,
            MealType::Lunch => self.lunch = meal,
            MealType::Dinner => self.dinner = meal,
        }
    }

    pub fn total_calories(&self) -> i32 {
        [&self.breakfast, &self.lunch, &self.dinner]
            .into_iter()
            .flatten()
            .map(|meal| meal.calories)
            .sum()
    }

    pub fn total_protein(&self) -> i32 {
        [&self.breakfast, &self.lunch, &self.dinner]
            .into_iter()
            .flatten()
            .map(|meal| meal.protein)
            .sum()
    }
}
