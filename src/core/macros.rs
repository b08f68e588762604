use serde::{Deserialize, Serialize};
use std::ops::Add;

/// The five tracked macros. Grams, except `calories` which is kcal.
///
/// Values fresh from the resolver are per 100 g; values stored on a
/// logged meal or plan item are already scaled to the consumed quantity.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct CanonicalMacros {
    pub protein: f64,
    pub carbohydrate: f64,
    pub fat: f64,
    pub calories: f64,
    pub fiber: f64,
}

impl CanonicalMacros {
    pub const ZERO: Self = Self {
        protein: 0.0,
        carbohydrate: 0.0,
        fat: 0.0,
        calories: 0.0,
        fiber: 0.0,
    };

    /// Replaces negative (and NaN) fields with 0.
    pub fn clamped(self) -> Self {
        Self {
            protein: non_negative(self.protein),
            carbohydrate: non_negative(self.carbohydrate),
            fat: non_negative(self.fat),
            calories: non_negative(self.calories),
            fiber: non_negative(self.fiber),
        }
    }

    /// True when none of protein, carbohydrate, fat or calories carries a value.
    /// Fiber alone doesn't count.
    pub fn has_no_energy_data(&self) -> bool {
        self.protein <= 0.0 && self.carbohydrate <= 0.0 && self.fat <= 0.0 && self.calories <= 0.0
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            protein: f(self.protein),
            carbohydrate: f(self.carbohydrate),
            fat: f(self.fat),
            calories: f(self.calories),
            fiber: f(self.fiber),
        }
    }
}

impl Add for CanonicalMacros {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            protein: self.protein + rhs.protein,
            carbohydrate: self.carbohydrate + rhs.carbohydrate,
            fat: self.fat + rhs.fat,
            calories: self.calories + rhs.calories,
            fiber: self.fiber + rhs.fiber,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Converts per-100g macros into the amount carried by `grams` of the food.
pub fn scale(per_100g: CanonicalMacros, grams: f64) -> CanonicalMacros {
    let ratio = grams / 100.0;
    per_100g.map(|value| value * ratio).clamped()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> CanonicalMacros {
        CanonicalMacros {
            protein: 31.0,
            carbohydrate: 0.0,
            fat: 3.6,
            calories: 165.0,
            fiber: 0.0,
        }
    }

    #[test]
    fn scaling_by_100g_is_identity() {
        let m = CanonicalMacros {
            protein: 2.7,
            carbohydrate: 28.0,
            fat: 0.3,
            calories: 130.0,
            fiber: 0.4,
        };
        assert_eq!(scale(m, 100.0), m);
        assert_eq!(scale(chicken(), 100.0), chicken());
    }

    #[test]
    fn scaling_by_zero_is_all_zero() {
        assert_eq!(scale(chicken(), 0.0), CanonicalMacros::ZERO);
    }

    #[test]
    fn scales_by_quantity() {
        let scaled = scale(chicken(), 150.0);
        assert_eq!(scaled.protein, 46.5);
        assert_eq!(scaled.calories, 247.5);
        assert!((scaled.fat - 5.4).abs() < 1e-9);
        assert_eq!(scaled.carbohydrate, 0.0);
    }

    #[test]
    fn negative_inputs_are_clamped() {
        let broken = CanonicalMacros {
            protein: -1.0,
            carbohydrate: 10.0,
            fat: f64::NAN,
            calories: -50.0,
            fiber: 2.0,
        };
        let scaled = scale(broken, 200.0);
        assert_eq!(scaled.protein, 0.0);
        assert_eq!(scaled.fat, 0.0);
        assert_eq!(scaled.calories, 0.0);
        assert_eq!(scaled.carbohydrate, 20.0);
        assert_eq!(scaled.fiber, 4.0);
    }

    #[test]
    fn energy_check_ignores_fiber() {
        let only_fiber = CanonicalMacros {
            fiber: 3.0,
            ..CanonicalMacros::ZERO
        };
        assert!(only_fiber.has_no_energy_data());
        assert!(!chicken().has_no_energy_data());
    }
}
