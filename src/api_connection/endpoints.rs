use serde::{Deserialize, Serialize};

/// Path the calculator queries on the lookup proxy.
pub const NUTRITION_PATH: &str = "/api/nutrition";
/// Older alias of [`NUTRITION_PATH`], still served by the proxy.
pub const FETCH_NUTRITION_PATH: &str = "/api/fetchNutrition";

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.calorieninjas.com/v1/nutrition";
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// One candidate food returned by the lookup service.
///
/// Every field is optional on the wire; missing numbers count as zero when
/// the item is folded into recipe totals.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NutritionItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates_total_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_total_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_saturated_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium_mg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium_mg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol_mg: Option<f64>,
}

/// Body of a successful lookup: the candidate items for one free-text query.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NutritionResponse {
    #[serde(default)]
    pub items: Vec<NutritionItem>,
}

impl NutritionResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The item used for aggregation. Only the first candidate counts.
    pub fn first_item(&self) -> Option<&NutritionItem> {
        self.items.first()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Error body returned by the proxy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProxyErrorBody {
    pub error: String,
}
