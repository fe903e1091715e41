use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::nutrition::{
    calorie_distribution, ActivityLevel, BodyMetrics, CalorieSplit, FitnessGoal, Gender,
};

use super::repo_types::{Role, User};

/// The profile a client sees: account data, metrics, the derived targets
/// and the recommended per-slot calorie split (advisory, not enforced).
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<FitnessGoal>,
    pub daily_calories: Option<i32>,
    pub daily_protein: Option<i32>,
    pub daily_water: Option<f64>,
    pub calorie_split: Option<CalorieSplit>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            age: user.age,
            gender: user.gender,
            height_cm: user.height_cm,
            weight_kg: user.weight_kg,
            activity_level: user.activity_level,
            goal: user.goal,
            daily_calories: user.daily_calories,
            daily_protein: user.daily_protein,
            daily_water: user.daily_water,
            calorie_split: user.daily_calories.map(calorie_distribution),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub age: i32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub goal: FitnessGoal,
}

impl UpdateProfileRequest {
    pub fn metrics(&self) -> BodyMetrics {
        BodyMetrics {
            age: self.age,
            gender: self.gender,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            activity_level: self.activity_level,
            goal: self.goal,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogWeightRequest {
    pub weight_kg: f64,
}

/// Compact per-user row for the admin accounts table.
#[derive(Debug, Serialize)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub goal: Option<FitnessGoal>,
    pub daily_calories: Option<i32>,
}

impl From<User> for AdminUserRow {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            goal: user.goal,
            daily_calories: user.daily_calories,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub user_id: Uuid,
    pub role: Role,
}
