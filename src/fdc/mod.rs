//! FoodData Central records and the provider seam the rest of the crate
//! talks to.
//!
//! FDC answers in several shapes: search hits carry flat
//! `nutrientId`/`nutrientName`/`value` entries, `format=full` detail
//! responses nest `nutrient { id, name }` next to an `amount`, and some
//! entries only carry a name. Every field is therefore optional here; making
//! sense of them is the job of `core::nutrients`.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::{FdcClient, FdcConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    #[serde(default)]
    pub fdc_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, rename = "foodNutrients", deserialize_with = "nullable_list")]
    pub nutrients: Vec<RawNutrient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNutrient {
    #[serde(default, rename = "nutrientId", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, rename = "nutrientName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrient: Option<NestedNutrient>,
    #[serde(default, rename = "unitName", skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedNutrient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawNutrient {
    pub fn nested_id(&self) -> Option<i64> {
        self.nutrient.as_ref().and_then(|n| n.id)
    }

    pub fn nested_name(&self) -> Option<&str> {
        self.nutrient.as_ref().and_then(|n| n.name.as_deref())
    }
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, thiserror::Error)]
pub enum FdcError {
    #[error("FDC request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("FDC API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("FDC response could not be decoded: {0}")]
    Decode(String),
}

/// Source of food records. Implementations own their own timeout and
/// caching policy; callers never retry.
#[async_trait]
pub trait FoodDataProvider: Send + Sync {
    /// Search results are not guaranteed to carry nutrient detail.
    async fn search(&self, query: &str) -> Result<Vec<FoodRecord>, FdcError>;

    async fn get_by_id(&self, fdc_id: i64) -> Result<FoodRecord, FdcError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_search_hit_shape() {
        let record: FoodRecord = serde_json::from_str(
            r#"{
                "fdcId": 171477,
                "description": "Chicken, broilers or fryers, breast, meat only, cooked, roasted",
                "dataType": "SR Legacy",
                "foodNutrients": [
                    {"nutrientId": 1003, "nutrientName": "Protein", "unitName": "G", "value": 31.0}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.fdc_id, 171477);
        assert_eq!(record.data_type.as_deref(), Some("SR Legacy"));
        assert_eq!(record.nutrients[0].id, Some(1003));
        assert_eq!(record.nutrients[0].value, Some(31.0));
        assert!(record.nutrients[0].nutrient.is_none());
    }

    #[test]
    fn decodes_full_detail_shape() {
        let record: FoodRecord = serde_json::from_str(
            r#"{
                "fdcId": 2012128,
                "description": "Rice, white, cooked",
                "foodNutrients": [
                    {"type": "FoodNutrient", "nutrient": {"id": 1005, "number": "205", "name": "Carbohydrate, by difference", "unitName": "g"}, "amount": 28.0}
                ]
            }"#,
        )
        .unwrap();

        let entry = &record.nutrients[0];
        assert_eq!(entry.id, None);
        assert_eq!(entry.nested_id(), Some(1005));
        assert_eq!(entry.nested_name(), Some("Carbohydrate, by difference"));
        assert_eq!(entry.amount, Some(28.0));
    }

    #[test]
    fn tolerates_missing_and_null_nutrient_lists() {
        let missing: FoodRecord = serde_json::from_str(r#"{"fdcId": 1, "description": "Water"}"#).unwrap();
        let null: FoodRecord =
            serde_json::from_str(r#"{"fdcId": 1, "description": "Water", "foodNutrients": null}"#).unwrap();

        assert!(missing.nutrients.is_empty());
        assert!(null.nutrients.is_empty());
    }
}
