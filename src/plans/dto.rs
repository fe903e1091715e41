use serde::Deserialize;

use crate::catalog::repo_types::MealId;

/// Body of POST /plans/:date/meals. The meal is resolved against the
/// effective catalog and its snapshot lands in the slot matching its type.
#[derive(Debug, Deserialize)]
pub struct AssignMealRequest {
    pub meal_id: MealId,
}

#[derive(Debug, Deserialize)]
pub struct SetWaterRequest {
    pub amount: f64,
}
