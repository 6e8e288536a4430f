use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api_connection::{NutritionItem, NutritionLookup};

/// Queries shorter than this (after trimming) are not sent to the lookup service.
pub const MIN_QUERY_LEN: usize = 3;

/// Running sums across every ingredient row that produced a lookup result.
///
/// Older saved recipes used short keys (`cal`, `fat`, ...); those are accepted on read,
/// and a field missing from stored data reads as zero.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct NutrientTotals {
    #[serde(alias = "cal")]
    pub calories: f64,
    #[serde(alias = "fat")]
    pub fat_g: f64,
    #[serde(alias = "sat_fat")]
    pub saturated_fat_g: f64,
    #[serde(alias = "carb")]
    pub carbohydrates_g: f64,
    #[serde(alias = "protein")]
    pub protein_g: f64,
    #[serde(alias = "sodium")]
    pub sodium_mg: f64,
    #[serde(alias = "fiber")]
    pub fiber_g: f64,
    #[serde(alias = "sugar")]
    pub sugar_g: f64,
}

impl NutrientTotals {
    /// Folds one lookup item into the totals; missing fields contribute zero.
    pub fn add_item(&mut self, item: &NutritionItem) {
        macro_rules! add_field {
            ($total:ident, $source:ident) => {
                self.$total += item.$source.unwrap_or(0.0);
            };
        }
        add_field!(calories, calories);
        add_field!(fat_g, fat_total_g);
        add_field!(saturated_fat_g, fat_saturated_g);
        add_field!(carbohydrates_g, carbohydrates_total_g);
        add_field!(protein_g, protein_g);
        add_field!(sodium_mg, sodium_mg);
        add_field!(fiber_g, fiber_g);
        add_field!(sugar_g, sugar_g);
    }

    /// Fat + carbohydrates + protein, in grams.
    pub fn macro_grams(&self) -> f64 {
        self.fat_g + self.carbohydrates_g + self.protein_g
    }
}

/// What happened to a single ingredient row during a calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum IngredientOutcome {
    /// Blank or shorter than [`MIN_QUERY_LEN`]; never looked up.
    Skipped { query: String },
    /// Looked up, but no item came back (including exhausted retries).
    NoData { query: String },
    Found {
        query: String,
        matched_name: Option<String>,
    },
}

impl IngredientOutcome {
    pub fn query(&self) -> &str {
        match self {
            IngredientOutcome::Skipped { query }
            | IngredientOutcome::NoData { query }
            | IngredientOutcome::Found { query, .. } => query,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Could not find nutrition data for any of the ingredients")]
pub struct NoResultsError;

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeCalculation {
    pub totals: NutrientTotals,
    pub successful_lookups: usize,
    pub outcomes: Vec<IngredientOutcome>,
}

impl RecipeCalculation {
    /// Rejects a calculation where nothing was found; zeroed totals are not data.
    pub fn ensure_results(self) -> Result<Self, NoResultsError> {
        if self.successful_lookups == 0 {
            Err(NoResultsError)
        } else {
            Ok(self)
        }
    }
}

/// Looks up every ingredient row in order and sums the first item of each result.
///
/// Rows are processed one at a time; the next lookup starts only once the
/// previous one (including its retries) has finished.
pub async fn calculate_recipe<L, Q>(lookup: &L, queries: &[Q]) -> RecipeCalculation
where
    L: NutritionLookup + ?Sized,
    Q: AsRef<str>,
{
    let mut totals = NutrientTotals::default();
    let mut successful_lookups = 0;
    let mut outcomes = Vec::with_capacity(queries.len());

    for (idx, raw) in queries.iter().enumerate() {
        let query = raw.as_ref().trim();
        if query.chars().count() < MIN_QUERY_LEN {
            tracing::debug!(row = idx + 1, query, "skipping short ingredient row");
            outcomes.push(IngredientOutcome::Skipped {
                query: query.to_string(),
            });
            continue;
        }

        tracing::info!(row = idx + 1, total = queries.len(), query, "looking up ingredient");
        let response = lookup.fetch_nutrition(query).await;
        match response.first_item() {
            Some(item) => {
                totals.add_item(item);
                successful_lookups += 1;
                outcomes.push(IngredientOutcome::Found {
                    query: query.to_string(),
                    matched_name: item.name.clone(),
                });
            }
            None => {
                tracing::info!(query, "no nutrition data for ingredient");
                outcomes.push(IngredientOutcome::NoData {
                    query: query.to_string(),
                });
            }
        }
    }

    RecipeCalculation {
        totals,
        successful_lookups,
        outcomes,
    }
}
