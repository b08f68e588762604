use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use crate::core::macros::CanonicalMacros;
use crate::models::{text_tag, UnknownTag};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner, MealType::Snack];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

// French labels are what the CLI historically accepted.
impl FromStr for MealType {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" | "petit-dejeuner" => Ok(MealType::Breakfast),
            "lunch" | "dejeuner" => Ok(MealType::Lunch),
            "dinner" | "diner" => Ok(MealType::Dinner),
            "snack" | "collation" => Ok(MealType::Snack),
            _ => Err(UnknownTag { kind: "meal type", value: s.to_string() }),
        }
    }
}

text_tag!(MealType);

/// One logged food. Never updated after insert.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct LoggedMeal {
    pub meal_id: Uuid,
    pub user_id: Uuid,
    pub meal_type: MealType,
    /// Calendar day the meal counts towards (server-local at log time).
    pub meal_date: NaiveDate,
    pub logged_at: DateTime<Utc>,
    pub food_id: i64,
    pub food_name: String,
    pub quantity_g: f64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub macros: CanonicalMacros,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_type_round_trips_through_its_tag() {
        for meal_type in MealType::ALL {
            assert_eq!(meal_type.as_str().parse::<MealType>(), Ok(meal_type));
        }
    }

    #[test]
    fn meal_type_accepts_french_aliases() {
        assert_eq!("petit-dejeuner".parse::<MealType>(), Ok(MealType::Breakfast));
        assert_eq!("Collation".parse::<MealType>(), Ok(MealType::Snack));
    }

    #[test]
    fn unknown_meal_type_is_rejected() {
        let err = "brunch".parse::<MealType>().unwrap_err();
        assert_eq!(err.value, "brunch");
        assert!(serde_json::from_str::<MealType>("\"brunch\"").is_err());
    }

    #[test]
    fn meal_type_serializes_as_tag() {
        assert_eq!(serde_json::to_string(&MealType::Dinner).unwrap(), "\"dinner\"");
    }
}
