use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::{ActivityLevel, BodyMetrics, FitnessGoal, Gender, NutritionTargets};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Account record. Body metrics are optional until the user fills in their
/// profile; the three daily targets are derived from them and are never set
/// independently.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
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
    pub created_at: OffsetDateTime,
}

/// One weight observation. At most one entry exists per calendar date; a
/// same-day re-log replaces the value instead of appending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    #[serde(with = "crate::dates::iso_date")]
    pub date: Date,
    pub weight_kg: f64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub metrics: BodyMetrics,
    pub targets: NutritionTargets,
}

/// Full profile replacement. Metrics and targets travel together so a
/// profile write can never leave the derived values stale.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub metrics: BodyMetrics,
    pub targets: NutritionTargets,
}
