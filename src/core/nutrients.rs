use log::warn;

use crate::core::macros::CanonicalMacros;
use crate::fdc::{FoodRecord, RawNutrient};

/// How one macro is identified across FDC response shapes. FDC switched
/// numbering schemes, so every nutrient has a current id and an older
/// "nutrient number" that some endpoints still return.
#[derive(Debug, Clone, Copy)]
pub struct NutrientKey {
    pub modern_id: i64,
    pub legacy_id: i64,
    pub keyword: &'static str,
}

pub const PROTEIN: NutrientKey = NutrientKey { modern_id: 1003, legacy_id: 203, keyword: "protein" };
pub const CARBOHYDRATE: NutrientKey = NutrientKey { modern_id: 1005, legacy_id: 205, keyword: "carbohydrate" };
pub const FAT: NutrientKey = NutrientKey { modern_id: 1004, legacy_id: 204, keyword: "fat" };
pub const ENERGY: NutrientKey = NutrientKey { modern_id: 1008, legacy_id: 208, keyword: "energy" };
pub const FIBER: NutrientKey = NutrientKey { modern_id: 1079, legacy_id: 291, keyword: "fiber" };

type Matcher = fn(&RawNutrient, &NutrientKey) -> Option<f64>;

// Priority order. Each matcher is tried against the whole list before the
// next one runs.
const MATCHERS: [Matcher; 4] = [modern_flat_id, modern_nested_id, legacy_id, keyword_in_name];

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

// Either value field is accepted for both shapes: search hits carry `value`
// on flat entries, but some detail responses put `amount` on them too.
fn flat_value(n: &RawNutrient) -> Option<f64> {
    positive(n.value).or_else(|| positive(n.amount))
}

fn nested_value(n: &RawNutrient) -> Option<f64> {
    positive(n.amount).or_else(|| positive(n.value))
}

fn modern_flat_id(n: &RawNutrient, key: &NutrientKey) -> Option<f64> {
    (n.id == Some(key.modern_id)).then(|| flat_value(n)).flatten()
}

fn modern_nested_id(n: &RawNutrient, key: &NutrientKey) -> Option<f64> {
    (n.nested_id() == Some(key.modern_id)).then(|| nested_value(n)).flatten()
}

fn legacy_id(n: &RawNutrient, key: &NutrientKey) -> Option<f64> {
    if n.id == Some(key.legacy_id) {
        if let Some(v) = flat_value(n) {
            return Some(v);
        }
    }
    (n.nested_id() == Some(key.legacy_id)).then(|| nested_value(n)).flatten()
}

fn keyword_in_name(n: &RawNutrient, key: &NutrientKey) -> Option<f64> {
    let matches = |name: Option<&str>| {
        name.map(|s| s.to_lowercase().contains(key.keyword)).unwrap_or(false)
    };
    if matches(n.name.as_deref()) || matches(n.nested_name()) {
        flat_value(n)
    } else {
        None
    }
}

/// Finds one macro in a raw nutrient list. Returns 0 when nothing matches.
pub fn lookup(nutrients: &[RawNutrient], key: &NutrientKey) -> f64 {
    MATCHERS
        .iter()
        .find_map(|matcher| nutrients.iter().find_map(|n| matcher(n, key)))
        .unwrap_or(0.0)
}

/// Maps a food record to per-100g canonical macros.
///
/// Never fails: an unresolvable record yields all zeros, and a warning is
/// logged so schema drift upstream shows up in the logs. Deciding whether an
/// all-zero result is acceptable is up to the caller.
pub fn resolve(record: &FoodRecord) -> CanonicalMacros {
    let nutrients = &record.nutrients;
    let macros = CanonicalMacros {
        protein: lookup(nutrients, &PROTEIN),
        carbohydrate: lookup(nutrients, &CARBOHYDRATE),
        fat: lookup(nutrients, &FAT),
        calories: lookup(nutrients, &ENERGY),
        fiber: lookup(nutrients, &FIBER),
    }
    .clamped();

    if macros.has_no_energy_data() {
        match nutrients.first() {
            Some(first) => warn!(
                "No macro values resolved for '{}' (fdc_id {}); first nutrient: id={:?} name={:?} value={:?} entry={:?}",
                record.description, record.fdc_id, first.id, first.name, first.value, first
            ),
            None => warn!(
                "No macro values resolved for '{}' (fdc_id {}); nutrient list is empty",
                record.description, record.fdc_id
            ),
        }
    }

    macros
}
