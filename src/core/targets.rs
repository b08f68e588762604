use serde::{Deserialize, Serialize};

use crate::core::macros::CanonicalMacros;

/// Atwater energy factors, kcal per gram.
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBOHYDRATE: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// How far the split may drift from 100% before normalization is offered.
pub const SPLIT_TOLERANCE_PCT: f64 = 1.0;

/// Daily goals. The all-zero default means "no targets set".
///
/// Field names match what is stored in the `users.targets` JSON column.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroTargets {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbohydrate_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: f64,
}

/// Share of the calorie goal given to each energy macro, in percent.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct MacroSplit {
    pub protein_pct: f64,
    pub carbohydrate_pct: f64,
    pub fat_pct: f64,
}

impl MacroSplit {
    pub fn total(&self) -> f64 {
        self.protein_pct + self.carbohydrate_pct + self.fat_pct
    }

    pub fn needs_normalization(&self) -> bool {
        (self.total() - 100.0).abs() > SPLIT_TOLERANCE_PCT
    }

    /// Rescales the three shares so they sum to 100. Only call this once the
    /// user agreed to it. A zero total is returned unchanged.
    pub fn normalized(&self) -> MacroSplit {
        let total = self.total();
        if total <= 0.0 {
            return *self;
        }
        let factor = 100.0 / total;
        MacroSplit {
            protein_pct: self.protein_pct * factor,
            carbohydrate_pct: self.carbohydrate_pct * factor,
            fat_pct: self.fat_pct * factor,
        }
    }
}

pub fn derive_targets(calorie_goal: f64, split: MacroSplit, fiber_g: f64) -> MacroTargets {
    MacroTargets {
        calories: calorie_goal,
        protein_g: calorie_goal * split.protein_pct / 100.0 / KCAL_PER_G_PROTEIN,
        carbohydrate_g: calorie_goal * split.carbohydrate_pct / 100.0 / KCAL_PER_G_CARBOHYDRATE,
        fat_g: calorie_goal * split.fat_pct / 100.0 / KCAL_PER_G_FAT,
        fiber_g,
    }
}

impl MacroTargets {
    pub fn is_set(&self) -> bool {
        self.calories > 0.0
    }

    /// Percentage of the calorie goal each gram target accounts for. `None`
    /// when no calorie goal is set.
    pub fn energy_split(&self) -> Option<MacroSplit> {
        if !self.is_set() {
            return None;
        }
        Some(MacroSplit {
            protein_pct: self.protein_g * KCAL_PER_G_PROTEIN / self.calories * 100.0,
            carbohydrate_pct: self.carbohydrate_g * KCAL_PER_G_CARBOHYDRATE / self.calories * 100.0,
            fat_pct: self.fat_g * KCAL_PER_G_FAT / self.calories * 100.0,
        })
    }
}

/// Percent of target reached per macro. A field is `None`, and left out of
/// the JSON, when its target is zero.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetComparison {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbohydrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
}

fn percent_of(actual: f64, target: f64) -> Option<f64> {
    if target == 0.0 || !target.is_finite() {
        return None;
    }
    let pct = actual / target * 100.0;
    pct.is_finite().then_some(pct)
}

pub fn compare(actual: &CanonicalMacros, target: &MacroTargets) -> TargetComparison {
    TargetComparison {
        calories: percent_of(actual.calories, target.calories),
        protein: percent_of(actual.protein, target.protein_g),
        carbohydrate: percent_of(actual.carbohydrate, target.carbohydrate_g),
        fat: percent_of(actual.fat, target.fat_g),
        fiber: percent_of(actual.fiber, target.fiber_g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(p: f64, c: f64, f: f64) -> MacroSplit {
        MacroSplit { protein_pct: p, carbohydrate_pct: c, fat_pct: f }
    }

    #[test]
    fn derives_gram_targets_with_atwater_factors() {
        let targets = derive_targets(2000.0, split(30.0, 40.0, 30.0), 25.0);
        assert!((targets.protein_g - 150.0).abs() < 1e-9);
        assert!((targets.carbohydrate_g - 200.0).abs() < 1e-9);
        assert!((targets.fat_g - 66.67).abs() < 0.01);
        assert_eq!(targets.fiber_g, 25.0);
        assert_eq!(targets.calories, 2000.0);
    }

    #[test]
    fn split_within_one_point_is_accepted() {
        assert!(!split(30.0, 40.0, 30.0).needs_normalization());
        assert!(!split(30.0, 40.5, 30.0).needs_normalization());
        assert!(split(30.0, 45.0, 30.0).needs_normalization());
        assert!(split(20.0, 40.0, 30.0).needs_normalization());
    }

    #[test]
    fn normalization_rescales_to_100() {
        let fixed = split(30.0, 50.0, 40.0).normalized();
        assert!((fixed.total() - 100.0).abs() < 1e-9);
        assert!((fixed.protein_pct - 25.0).abs() < 1e-9);
        assert!((fixed.carbohydrate_pct - 41.666_666).abs() < 1e-4);
    }

    #[test]
    fn zero_split_is_left_alone() {
        let zero = split(0.0, 0.0, 0.0);
        assert_eq!(zero.normalized(), zero);
    }

    #[test]
    fn energy_split_recovers_percentages() {
        let targets = derive_targets(2000.0, split(30.0, 40.0, 30.0), 25.0);
        let back = targets.energy_split().unwrap();
        assert!((back.protein_pct - 30.0).abs() < 1e-9);
        assert!((back.carbohydrate_pct - 40.0).abs() < 1e-9);
        assert!((back.fat_pct - 30.0).abs() < 1e-9);
    }

    #[test]
    fn default_targets_are_unset() {
        assert!(!MacroTargets::default().is_set());
        assert!(MacroTargets::default().energy_split().is_none());
    }

    #[test]
    fn compare_reports_percent_of_target() {
        let targets = derive_targets(2000.0, split(30.0, 40.0, 30.0), 25.0);
        let actual = CanonicalMacros {
            protein: 75.0,
            carbohydrate: 200.0,
            fat: 0.0,
            calories: 1000.0,
            fiber: 30.0,
        };

        let cmp = compare(&actual, &targets);
        assert_eq!(cmp.calories, Some(50.0));
        assert!((cmp.protein.unwrap() - 50.0).abs() < 1e-9);
        assert!((cmp.carbohydrate.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(cmp.fat, Some(0.0));
        assert!((cmp.fiber.unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn zero_target_fields_are_omitted() {
        let targets = MacroTargets { calories: 2000.0, protein_g: 150.0, ..Default::default() };
        let actual = CanonicalMacros { calories: 500.0, protein: 30.0, fat: 12.0, fiber: 4.0, carbohydrate: 60.0 };

        let cmp = compare(&actual, &targets);
        assert_eq!(cmp.calories, Some(25.0));
        assert_eq!(cmp.protein, Some(20.0));
        assert_eq!(cmp.carbohydrate, None);
        assert_eq!(cmp.fat, None);
        assert_eq!(cmp.fiber, None);

        let json = serde_json::to_value(cmp).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["calories", "protein"]);
    }

    #[test]
    fn targets_json_without_fields_is_unset() {
        let targets: MacroTargets = serde_json::from_str("{}").unwrap();
        assert_eq!(targets, MacroTargets::default());
    }
}
