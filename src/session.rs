use crate::api_connection::NutritionLookup;
use crate::presentation::{self, SharePayload};
use crate::recipe_aggregator::{calculate_recipe, NoResultsError, NutrientTotals, RecipeCalculation};
use crate::recipe_store::{RecipeStore, RecipeStoreError, SavedRecipe, ValidationError};
use crate::storage::KeyValueStore;

/// Ingredient rows together with the totals they produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LastCalculation {
    pub ingredients: Vec<String>,
    pub totals: NutrientTotals,
}

/// Application state for one user: the lookup service, saved recipes, and
/// the result of the most recent successful calculation.
pub struct NutritionSession<L, S> {
    lookup: L,
    recipes: RecipeStore<S>,
    last: Option<LastCalculation>,
}

impl<L: NutritionLookup, S: KeyValueStore> NutritionSession<L, S> {
    pub fn new(lookup: L, store: S) -> Self {
        Self {
            lookup,
            recipes: RecipeStore::new(store),
            last: None,
        }
    }

    /// Runs a calculation. A run with no successful lookups clears the previous result.
    pub async fn calculate<Q: AsRef<str>>(&mut self, queries: &[Q]) -> Result<RecipeCalculation, NoResultsError> {
        let outcome = calculate_recipe(&self.lookup, queries).await.ensure_results();
        self.last = match &outcome {
            Ok(calc) => Some(LastCalculation {
                ingredients: queries.iter().map(|q| q.as_ref().to_string()).collect(),
                totals: calc.totals,
            }),
            Err(_) => None,
        };
        outcome
    }

    pub fn last_calculation(&self) -> Option<&LastCalculation> {
        self.last.as_ref()
    }

    pub fn last_totals(&self) -> Option<&NutrientTotals> {
        self.last.as_ref().map(|l| &l.totals)
    }

    pub fn save_current(&self, name: &str) -> Result<SavedRecipe, RecipeStoreError> {
        match &self.last {
            Some(last) => self.recipes.save_recipe(name, &last.ingredients, Some(&last.totals)),
            None => self.recipes.save_recipe(name, &[], None),
        }
    }

    pub fn share_current(&self) -> Result<SharePayload, ValidationError> {
        self.last_totals()
            .map(presentation::share_text)
            .ok_or(ValidationError::NotCalculated)
    }

    pub fn recipes(&self) -> Vec<SavedRecipe> {
        self.recipes.list_recipes()
    }

    pub fn recipe(&self, id: u64) -> Option<SavedRecipe> {
        self.recipes.get_recipe(id)
    }

    pub fn delete_recipe(&self, id: u64) -> Result<Vec<SavedRecipe>, RecipeStoreError> {
        self.recipes.delete_recipe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::{NutritionItem, NutritionResponse};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    /// Answers every query except "nothing" with a fixed item.
    struct FixedLookup;

    #[async_trait]
    impl NutritionLookup for FixedLookup {
        async fn fetch_nutrition(&self, query: &str) -> NutritionResponse {
            if query == "nothing" {
                return NutritionResponse::empty();
            }
            NutritionResponse {
                items: vec![NutritionItem {
                    calories: Some(100.0),
                    protein_g: Some(5.0),
                    ..Default::default()
                }],
            }
        }
    }

    #[tokio::test]
    async fn test_calculate_then_save_snapshots_totals() {
        let mut session = NutritionSession::new(FixedLookup, MemoryStore::new());
        let calc = session.calculate(&["1 egg", "  ", "2 slices toast"]).await.unwrap();
        assert_eq!(calc.totals.calories, 200.0);

        let saved = session.save_current("Breakfast").unwrap();
        assert_eq!(saved.ingredients, vec!["1 egg", "2 slices toast"]);
        assert_eq!(saved.totals, calc.totals);
        assert_eq!(session.recipes()[0], saved);
        assert_eq!(session.recipe(saved.id), Some(saved));
    }

    #[tokio::test]
    async fn test_failed_calculation_clears_previous_totals() {
        let mut session = NutritionSession::new(FixedLookup, MemoryStore::new());
        session.calculate(&["1 egg"]).await.unwrap();
        assert!(session.last_totals().is_some());

        assert_eq!(session.calculate(&["nothing"]).await, Err(NoResultsError));
        assert!(session.last_totals().is_none());
        assert!(matches!(
            session.save_current("Nope"),
            Err(RecipeStoreError::Validation(ValidationError::NotCalculated))
        ));
        assert_eq!(session.share_current(), Err(ValidationError::NotCalculated));
        assert!(session.recipes().is_empty());
    }

    #[tokio::test]
    async fn test_share_uses_last_totals() {
        let mut session = NutritionSession::new(FixedLookup, MemoryStore::new());
        session.calculate(&["1 banana"]).await.unwrap();
        let payload = session.share_current().unwrap();
        assert!(payload.text.contains("*Calories - 100*"));
        assert!(payload.text.contains("Protein - 5.0 g"));
    }
}
