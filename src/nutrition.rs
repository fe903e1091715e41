//! Daily nutrition targets from body metrics, activity level and goal.
//!
//! Pure arithmetic, no state and no validation: callers own input checking,
//! and degenerate inputs produce degenerate (but deterministic) output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("unknown gender: {s}")),
        }
    }
}

/// The five fixed activity multipliers. The wire form is the multiplier
/// itself as a string ("1.55"), which is what profile clients send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    #[serde(rename = "1.2")]
    Sedentary,
    #[serde(rename = "1.375")]
    Light,
    #[serde(rename = "1.55")]
    Moderate,
    #[serde(rename = "1.725")]
    Active,
    #[serde(rename = "1.9")]
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "1.2",
            ActivityLevel::Light => "1.375",
            ActivityLevel::Moderate => "1.55",
            ActivityLevel::Active => "1.725",
            ActivityLevel::VeryActive => "1.9",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.2" => Ok(ActivityLevel::Sedentary),
            "1.375" => Ok(ActivityLevel::Light),
            "1.55" => Ok(ActivityLevel::Moderate),
            "1.725" => Ok(ActivityLevel::Active),
            "1.9" => Ok(ActivityLevel::VeryActive),
            _ => Err(format!("unknown activity level: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitnessGoal {
    #[serde(rename = "Weight Loss")]
    Loss,
    #[serde(rename = "Maintain Weight")]
    Maintain,
    #[serde(rename = "Weight Gain")]
    Gain,
    #[serde(rename = "Muscle Gain")]
    MuscleGain,
}

impl FitnessGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            FitnessGoal::Loss => "Weight Loss",
            FitnessGoal::Maintain => "Maintain Weight",
            FitnessGoal::Gain => "Weight Gain",
            FitnessGoal::MuscleGain => "Muscle Gain",
        }
    }
}

impl FromStr for FitnessGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Weight Loss" => Ok(FitnessGoal::Loss),
            "Maintain Weight" => Ok(FitnessGoal::Maintain),
            "Weight Gain" => Ok(FitnessGoal::Gain),
            "Muscle Gain" => Ok(FitnessGoal::MuscleGain),
            _ => Err(format!("unknown fitness goal: {s}")),
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full body-metric input to a target computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub age: i32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub goal: FitnessGoal,
}

/// The three derived daily targets. Always recomputed as a set: they share
/// inputs, so updating one without the others would leave stale values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub daily_calories: i32,
    pub daily_protein: i32,
    pub daily_water: f64,
}

/// Basal metabolic rate per Mifflin-St Jeor.
///
/// The third gender bucket uses -78, the midpoint of the male (+5) and
/// female (-161) constants. That offset is a product simplification carried
/// over from the original requirements, not a medical claim.
pub fn bmr(age: i32, gender: Gender, weight_kg: f64, height_cm: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
        Gender::Other => base - 78.0,
    }
}

/// Daily calorie target: TDEE (BMR x activity) shifted by the goal
/// adjustment, rounded once at the end. No floor is applied; extreme inputs
/// can produce nonsensical (even negative) targets.
pub fn daily_calories(
    age: i32,
    gender: Gender,
    weight_kg: f64,
    height_cm: f64,
    activity_level: ActivityLevel,
    goal: FitnessGoal,
) -> i32 {
    let tdee = bmr(age, gender, weight_kg, height_cm) * activity_level.multiplier();
    let target = match goal {
        FitnessGoal::Loss => tdee - 500.0,
        FitnessGoal::Gain | FitnessGoal::MuscleGain => tdee + 400.0,
        FitnessGoal::Maintain => tdee,
    };
    target.round() as i32
}

/// Daily protein in grams: weight times a goal-dependent g/kg multiplier
/// (2.0 in a deficit, 1.8 when gaining, 1.2 otherwise).
pub fn daily_protein(weight_kg: f64, goal: FitnessGoal) -> i32 {
    let multiplier = match goal {
        FitnessGoal::Loss => 2.0,
        FitnessGoal::Gain | FitnessGoal::MuscleGain => 1.8,
        FitnessGoal::Maintain => 1.2,
    };
    (weight_kg * multiplier).round() as i32
}

/// Daily water in liters: 35 ml per kg, to one decimal place.
pub fn daily_water(weight_kg: f64) -> f64 {
    (weight_kg * 0.035 * 10.0).round() / 10.0
}

pub fn compute_targets(metrics: &BodyMetrics) -> NutritionTargets {
    NutritionTargets {
        daily_calories: daily_calories(
            metrics.age,
            metrics.gender,
            metrics.weight_kg,
            metrics.height_cm,
            metrics.activity_level,
            metrics.goal,
        ),
        daily_protein: daily_protein(metrics.weight_kg, metrics.goal),
        daily_water: daily_water(metrics.weight_kg),
    }
}

/// Recommended 30/40/30 split of the calorie target across the three slots.
/// Each share is rounded independently, so the parts may be off the total by
/// a calorie or two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalorieSplit {
    pub breakfast: i32,
    pub lunch: i32,
    pub dinner: i32,
}

pub fn calorie_distribution(total: i32) -> CalorieSplit {
    let total = f64::from(total);
    CalorieSplit {
        breakfast: (total * 0.3).round() as i32,
        lunch: (total * 0.4).round() as i32,
        dinner: (total * 0.3).round() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_metrics(goal: FitnessGoal) -> BodyMetrics {
        BodyMetrics {
            age: 30,
            gender: Gender::Male,
            weight_kg: 80.0,
            height_cm: 180.0,
            activity_level: ActivityLevel::Moderate,
            goal,
        }
    }

    #[test]
    fn bmr_constants_per_gender() {
        // 10*80 + 6.25*180 - 5*30 = 1775 before the gender constant.
        assert_eq!(bmr(30, Gender::Male, 80.0, 180.0), 1780.0);
        assert_eq!(bmr(30, Gender::Female, 80.0, 180.0), 1614.0);
        assert_eq!(bmr(30, Gender::Other, 80.0, 180.0), 1697.0);
    }

    #[test]
    fn maintain_target_is_tdee_rounded() {
        let targets = compute_targets(&reference_metrics(FitnessGoal::Maintain));
        // 1780 * 1.55 = 2759
        assert_eq!(targets.daily_calories, 2759);
        assert_eq!(targets.daily_protein, 96); // round(80 * 1.2)
        assert_eq!(targets.daily_water, 2.8); // round(80 * 0.035, 1)
    }

    #[test]
    fn loss_subtracts_500_and_raises_protein() {
        let targets = compute_targets(&reference_metrics(FitnessGoal::Loss));
        assert_eq!(targets.daily_calories, 2259);
        assert_eq!(targets.daily_protein, 160); // round(80 * 2.0)
    }

    #[test]
    fn gain_and_muscle_gain_add_400() {
        for goal in [FitnessGoal::Gain, FitnessGoal::MuscleGain] {
            let targets = compute_targets(&reference_metrics(goal));
            assert_eq!(targets.daily_calories, 2759 + 400);
            assert_eq!(targets.daily_protein, 144); // round(80 * 1.8)
        }
    }

    #[test]
    fn deterministic_for_same_input() {
        let metrics = reference_metrics(FitnessGoal::MuscleGain);
        assert_eq!(compute_targets(&metrics), compute_targets(&metrics));
    }

    #[test]
    fn water_rounds_to_one_decimal() {
        assert_eq!(daily_water(70.0), 2.5); // 2.45 rounds up
        assert_eq!(daily_water(65.0), 2.3); // 2.275 rounds to 2.3
        assert_eq!(daily_water(100.0), 3.5);
    }

    #[test]
    fn no_clamping_on_degenerate_input() {
        // An absurd age drives the target negative; the calculator reports
        // it as-is and leaves validation to the boundary layer.
        let cals = daily_calories(
            500,
            Gender::Female,
            1.0,
            1.0,
            ActivityLevel::Sedentary,
            FitnessGoal::Loss,
        );
        assert!(cals < 0);
    }

    #[test]
    fn distribution_is_30_40_30() {
        let split = calorie_distribution(2000);
        assert_eq!(split.breakfast, 600);
        assert_eq!(split.lunch, 800);
        assert_eq!(split.dinner, 600);

        // Independent rounding may not preserve the total exactly.
        let odd = calorie_distribution(2759);
        assert_eq!(odd.breakfast, 828);
        assert_eq!(odd.lunch, 1104);
        assert_eq!(odd.dinner, 828);
    }

    #[test]
    fn enums_roundtrip_their_wire_strings() {
        for level in [
            ActivityLevel::Sedentary,
            ActivityLevel::Light,
            ActivityLevel::Moderate,
            ActivityLevel::Active,
            ActivityLevel::VeryActive,
        ] {
            assert_eq!(level.as_str().parse::<ActivityLevel>().unwrap(), level);
        }
        for goal in [
            FitnessGoal::Loss,
            FitnessGoal::Maintain,
            FitnessGoal::Gain,
            FitnessGoal::MuscleGain,
        ] {
            assert_eq!(goal.as_str().parse::<FitnessGoal>().unwrap(), goal);
        }
        assert_eq!(
            serde_json::to_string(&ActivityLevel::Moderate).unwrap(),
            "\"1.55\""
        );
        assert_eq!(
            serde_json::to_string(&FitnessGoal::Loss).unwrap(),
            "\"Weight Loss\""
        );
    }
}
