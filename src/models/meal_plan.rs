use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::Utc;
use std::str::FromStr;
use crate::core::macros::CanonicalMacros;
use crate::models::{text_tag, UnknownTag};

/// The five parts of a planned day, in eating order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub enum MealSlot {
    Breakfast,
    Snack1,
    Lunch,
    Snack2,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 5] = [
        MealSlot::Breakfast,
        MealSlot::Snack1,
        MealSlot::Lunch,
        MealSlot::Snack2,
        MealSlot::Dinner,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Snack1 => "snack1",
            MealSlot::Lunch => "lunch",
            MealSlot::Snack2 => "snack2",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl FromStr for MealSlot {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTag { kind: "meal slot", value: s.to_string() })
    }
}

text_tag!(MealSlot);

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct MealPlan {
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct MealPlanItem {
    pub item_id: Uuid,
    pub plan_id: Uuid,
    pub slot: MealSlot,
    pub food_id: i64,
    pub food_name: String,
    pub quantity_g: f64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub macros: CanonicalMacros,
}

/// A plan together with its items, as listed to users.
#[derive(Serialize, Debug, Clone)]
pub struct MealPlanWithItems {
    #[serde(flatten)]
    pub plan: MealPlan,
    pub items: Vec<MealPlanItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_slot_round_trips() {
        for slot in MealSlot::ALL {
            assert_eq!(slot.as_str().parse::<MealSlot>(), Ok(slot));
            let json = serde_json::to_string(&slot).unwrap();
            assert_eq!(serde_json::from_str::<MealSlot>(&json).unwrap(), slot);
        }
    }

    #[test]
    fn slots_order_like_a_day() {
        let mut slots = vec![MealSlot::Dinner, MealSlot::Breakfast, MealSlot::Snack2, MealSlot::Lunch];
        slots.sort();
        assert_eq!(slots, vec![MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Snack2, MealSlot::Dinner]);
    }

    #[test]
    fn snack_without_number_is_not_a_slot() {
        assert!("snack".parse::<MealSlot>().is_err());
    }
}
