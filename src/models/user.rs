use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use chrono::Utc;
use crate::core::health::{self, Gender, HealthSummary};
use crate::core::targets::MacroTargets;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub age: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: Gender,
    pub targets: Json<MacroTargets>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl User {
    pub fn health(&self) -> HealthSummary {
        health::summarize(self.weight_kg, self.height_cm, self.age, self.gender)
    }

    /// The user's targets, or `None` when none were ever set.
    pub fn active_targets(&self) -> Option<MacroTargets> {
        let targets = self.targets.0;
        targets.is_set().then_some(targets)
    }
}

pub struct NewUser {
    pub name: String,
    pub age: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub gender: Gender,
}
