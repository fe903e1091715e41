use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Shown when a meal has no image of its own.
pub const DEFAULT_MEAL_IMAGE: &str =
    "https://images.unsplash.com/photo-1512621776951-a57141f2eefd?w=640&q=80";

/// Identifier of a catalog meal.
///
/// Mock meals ship with the binary and have string ids ("mock-3"); persisted
/// meals live in the database under a numeric id. Carrying the distinction
/// as a tagged union keeps the two namespaces from ever being confused
/// inside the system; the string form is classified exactly once, at the
/// wire/database boundary, by [`MealId::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MealId {
    Seed(String),
    Persisted(i64),
}

impl MealId {
    pub fn is_persisted(&self) -> bool {
        matches!(self, MealId::Persisted(_))
    }
}

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealId::Seed(id) => f.write_str(id),
            MealId::Persisted(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for MealId {
    fn from(s: &str) -> Self {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<i64>() {
                return MealId::Persisted(n);
            }
        }
        MealId::Seed(s.to_string())
    }
}

impl FromStr for MealId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MealId::from(s))
    }
}

impl Serialize for MealId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MealId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(MealId::from(s.as_str()))
    }
}

/// The meal-time slot a catalog entry is intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            _ => Err(format!("unknown meal type: {s}")),
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog meal. Once assigned into a plan slot the value is copied, so a
/// `Meal` inside a plan is a snapshot frozen at assignment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    pub meal_name: String,
    pub meal_type: MealType,
    pub calories: i32,
    pub protein: i32,
    pub diet_tag: String,
    pub image_url: String,
}

/// Field set for creating or replacing a persisted meal.
#[derive(Debug, Clone)]
pub struct MealDraft {
    pub meal_name: String,
    pub meal_type: MealType,
    pub calories: i32,
    pub protein: i32,
    pub diet_tag: String,
    pub image_url: String,
}

impl MealDraft {
    pub fn into_meal(self, id: MealId) -> Meal {
        Meal {
            id,
            meal_name: self.meal_name,
            meal_type: self.meal_type,
            calories: self.calories,
            protein: self.protein,
            diet_tag: self.diet_tag,
            image_url: self.image_url,
        }
    }
}

/// Overlay row reconciling the immutable mock catalog with the database.
/// A mock meal disappears from the effective list once it is marked deleted
/// or has been converted into a persisted meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MockMealMeta {
    pub mock_id: String,
    pub deleted: bool,
    pub converted_meal_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_id_classifies_once_at_the_boundary() {
        assert_eq!(
            "42".parse::<MealId>().unwrap(),
            MealId::Persisted(42),
        );
        assert_eq!(
            "mock-7".parse::<MealId>().unwrap(),
            MealId::Seed("mock-7".into()),
        );
        // Leading zeros and huge digit strings still have to resolve
        // somewhere; anything that fails i64 parsing stays a seed id.
        assert_eq!(
            "99999999999999999999".parse::<MealId>().unwrap(),
            MealId::Seed("99999999999999999999".into()),
        );
        assert_eq!("".parse::<MealId>().unwrap(), MealId::Seed("".into()));
    }

    #[test]
    fn meal_id_serde_uses_the_string_form() {
        let persisted: MealId = serde_json::from_str("\"17\"").unwrap();
        assert_eq!(persisted, MealId::Persisted(17));
        assert_eq!(serde_json::to_string(&persisted).unwrap(), "\"17\"");

        let seed: MealId = serde_json::from_str("\"mock-2\"").unwrap();
        assert_eq!(seed, MealId::Seed("mock-2".into()));
        assert_eq!(serde_json::to_string(&seed).unwrap(), "\"mock-2\"");
    }

    #[test]
    fn meal_type_parses_case_insensitively() {
        assert_eq!("breakfast".parse::<MealType>().unwrap(), MealType::Breakfast);
        assert_eq!("Lunch".parse::<MealType>().unwrap(), MealType::Lunch);
        assert!("brunch".parse::<MealType>().is_err());
    }
}
