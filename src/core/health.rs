use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::UnknownTag;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "homme" => Ok(Gender::Male),
            "female" | "f" | "femme" => Ok(Gender::Female),
            _ => Err(UnknownTag { kind: "gender", value: s.to_string() }),
        }
    }
}

crate::models::text_tag!(Gender);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        };
        f.write_str(label)
    }
}

/// Body mass index. Returns 0 for a zero (or negative) height.
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Rough body-fat percentage from BMI and age.
///
/// This is a linear approximation (`1.20 * BMI + 0.23 * age * 0.12 - C`),
/// not the US Navy circumference method; treat it as a ballpark figure.
pub fn body_fat_estimate(weight_kg: f64, height_cm: f64, age: i32, gender: Gender) -> f64 {
    let age_factor = f64::from(age) * 0.12;
    let offset = match gender {
        Gender::Male => 16.2,
        Gender::Female => 5.4,
    };
    1.20 * bmi(weight_kg, height_cm) + 0.23 * age_factor - offset
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct HealthSummary {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmi: f64,
    pub category: BmiCategory,
    pub body_fat_pct: f64,
}

pub fn summarize(weight_kg: f64, height_cm: f64, age: i32, gender: Gender) -> HealthSummary {
    let bmi = bmi(weight_kg, height_cm);
    HealthSummary {
        weight_kg,
        height_cm,
        bmi,
        category: BmiCategory::from_bmi(bmi),
        body_fat_pct: body_fat_estimate(weight_kg, height_cm, age, gender),
    }
}
