use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recipe_aggregator::NutrientTotals;
use crate::storage::{KeyValueStore, StorageError};

pub const RECIPES_KEY: &str = "nutrifind_recipes";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SavedRecipe {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub totals: NutrientTotals,
    #[serde(rename = "createdDate", alias = "date", default)]
    pub created_date: String,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please calculate the recipe nutrition before saving.")]
    NotCalculated,
    #[error("Please enter a name for your recipe.")]
    MissingName,
}

#[derive(Debug, Error)]
pub enum RecipeStoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to persist recipes: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to serialize recipes: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Saved recipes, kept newest first as one JSON array under [`RECIPES_KEY`].
pub struct RecipeStore<S> {
    store: S,
}

impl<S: KeyValueStore> RecipeStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current list, newest first.
    ///
    /// Data that is not a JSON array reads as empty. Inside an array, entries that
    /// cannot be read as a recipe are dropped and the rest are kept.
    pub fn list_recipes(&self) -> Vec<SavedRecipe> {
        let raw = match self.store.get(RECIPES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved recipes, treating as empty");
                return Vec::new();
            }
        };
        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "saved recipes are corrupted, treating as empty");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<SavedRecipe>(entry) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    tracing::warn!(index, error = %e, "dropping unreadable saved recipe");
                    None
                }
            })
            .collect()
    }

    pub fn get_recipe(&self, id: u64) -> Option<SavedRecipe> {
        self.list_recipes().into_iter().find(|r| r.id == id)
    }

    /// Snapshots a calculated recipe and prepends it to the stored list.
    ///
    /// `totals` is `None` when no successful calculation precedes the save.
    pub fn save_recipe(
        &self,
        name: &str,
        ingredients: &[String],
        totals: Option<&NutrientTotals>,
    ) -> Result<SavedRecipe, RecipeStoreError> {
        let ingredients: Vec<String> = ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        let totals = match totals {
            Some(totals) if !ingredients.is_empty() => *totals,
            _ => return Err(ValidationError::NotCalculated.into()),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName.into());
        }

        let mut recipes = self.list_recipes();
        let recipe = SavedRecipe {
            id: next_id(&recipes),
            name: name.to_string(),
            ingredients,
            totals,
            created_date: Local::now().format("%-m/%-d/%Y").to_string(),
        };
        recipes.insert(0, recipe.clone());
        self.persist(&recipes)?;
        tracing::info!(id = recipe.id, name = %recipe.name, "recipe saved");
        Ok(recipe)
    }

    /// Removes the recipe with `id` if present and returns the remaining list.
    pub fn delete_recipe(&self, id: u64) -> Result<Vec<SavedRecipe>, RecipeStoreError> {
        let mut recipes = self.list_recipes();
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        if recipes.len() == before {
            tracing::info!(id, "no saved recipe with this id");
            return Ok(recipes);
        }
        self.persist(&recipes)?;
        tracing::info!(id, "recipe deleted");
        Ok(recipes)
    }

    fn persist(&self, recipes: &[SavedRecipe]) -> Result<(), RecipeStoreError> {
        let json = serde_json::to_string(recipes)?;
        self.store.set(RECIPES_KEY, &json)?;
        Ok(())
    }
}

/// Millisecond timestamp, bumped past the newest existing id when the clock has not moved.
///
/// When the newest id is already `u64::MAX`, the smallest unused id is taken instead.
fn next_id(existing: &[SavedRecipe]) -> u64 {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    match existing.iter().map(|r| r.id).max() {
        Some(max) if max >= now => max.checked_add(1).unwrap_or_else(|| lowest_free_id(existing)),
        _ => now,
    }
}

fn lowest_free_id(existing: &[SavedRecipe]) -> u64 {
    let mut ids: Vec<u64> = existing.iter().map(|r| r.id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids.iter()
        .enumerate()
        .find(|(expected, id)| **id != *expected as u64)
        .map(|(expected, _)| expected as u64)
        .unwrap_or(ids.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::tempdir;

    fn totals() -> NutrientTotals {
        NutrientTotals {
            calories: 350.0,
            fat_g: 12.5,
            protein_g: 30.0,
            carbohydrates_g: 20.0,
            ..Default::default()
        }
    }

    fn ingredients(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_save_then_list_returns_newest_first() {
        let store = RecipeStore::new(MemoryStore::new());
        let first = store
            .save_recipe("Soup", &ingredients(&["1 onion"]), Some(&totals()))
            .unwrap();
        let second = store
            .save_recipe("  Mom's Chicken Soup ", &ingredients(&[" 100g chicken ", "", "1 cup broth"]), Some(&totals()))
            .unwrap();

        let listed = store.list_recipes();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0], second);
        assert_eq!(listed[1], first);
        assert_eq!(second.name, "Mom's Chicken Soup");
        assert_eq!(second.ingredients, vec!["100g chicken", "1 cup broth"]);
        assert_eq!(second.totals, totals());
        assert!(second.id > first.id);
        assert!(!second.created_date.is_empty());
    }

    #[test]
    fn test_save_without_calculation_is_rejected_and_not_persisted() {
        let backing = MemoryStore::new();
        let store = RecipeStore::new(&backing);
        let err = store
            .save_recipe("Soup", &ingredients(&["1 onion"]), None)
            .unwrap_err();
        assert!(matches!(err, RecipeStoreError::Validation(ValidationError::NotCalculated)));

        let err = store
            .save_recipe("Soup", &ingredients(&["  ", ""]), Some(&totals()))
            .unwrap_err();
        assert!(matches!(err, RecipeStoreError::Validation(ValidationError::NotCalculated)));
        assert_eq!(backing.get(RECIPES_KEY).unwrap(), None);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let store = RecipeStore::new(MemoryStore::new());
        store
            .save_recipe("Keep", &ingredients(&["1 onion"]), Some(&totals()))
            .unwrap();
        let err = store
            .save_recipe("   ", &ingredients(&["1 onion"]), Some(&totals()))
            .unwrap_err();
        assert!(matches!(err, RecipeStoreError::Validation(ValidationError::MissingName)));
        assert_eq!(store.list_recipes().len(), 1);
    }

    #[test]
    fn test_delete_missing_id_leaves_list_untouched() {
        let backing = MemoryStore::new();
        let store = RecipeStore::new(&backing);
        store
            .save_recipe("Soup", &ingredients(&["1 onion"]), Some(&totals()))
            .unwrap();
        let before = backing.get(RECIPES_KEY).unwrap();
        let remaining = store.delete_recipe(42).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(backing.get(RECIPES_KEY).unwrap(), before);
    }

    #[test]
    fn test_delete_removes_only_matching_recipe() {
        let store = RecipeStore::new(MemoryStore::new());
        let a = store.save_recipe("A", &ingredients(&["oats"]), Some(&totals())).unwrap();
        let b = store.save_recipe("B", &ingredients(&["milk"]), Some(&totals())).unwrap();
        let remaining = store.delete_recipe(a.id).unwrap();
        assert_eq!(remaining, vec![b.clone()]);
        assert_eq!(store.list_recipes(), vec![b.clone()]);
        assert_eq!(store.get_recipe(b.id), Some(b));
        assert_eq!(store.get_recipe(a.id), None);
    }

    #[test]
    fn test_corrupted_storage_reads_as_empty_and_recovers() {
        let backing = MemoryStore::new();
        backing.set(RECIPES_KEY, "{not json").unwrap();
        let store = RecipeStore::new(&backing);
        assert!(store.list_recipes().is_empty());

        backing.set(RECIPES_KEY, r#"{"id":1}"#).unwrap();
        assert!(store.list_recipes().is_empty());

        store.save_recipe("Fresh", &ingredients(&["kale"]), Some(&totals())).unwrap();
        assert_eq!(store.list_recipes().len(), 1);
    }

    #[test]
    fn test_reads_recipes_in_legacy_layout() {
        let backing = MemoryStore::new();
        backing
            .set(
                RECIPES_KEY,
                r#"[{"id":1700000000000,"name":"Old","ingredients":["1 egg"],
                    "totals":{"cal":72,"fat":5,"carb":0.4,"protein":6,"sodium":70,"fiber":0,"sugar":0.2,"sat_fat":1.6},
                    "date":"1/2/2024"}]"#,
            )
            .unwrap();
        let listed = RecipeStore::new(&backing).list_recipes();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].created_date, "1/2/2024");
        assert_eq!(listed[0].totals.calories, 72.0);
    }

    #[test]
    fn test_ids_stay_unique_when_clock_is_behind() {
        let future = SavedRecipe {
            id: u64::MAX - 1,
            name: "Future".into(),
            ingredients: ingredients(&["x"]),
            totals: totals(),
            created_date: String::new(),
        };
        assert_eq!(next_id(&[future]), u64::MAX);
    }

    #[test]
    fn test_save_after_maximum_id_does_not_overflow() {
        let backing = MemoryStore::new();
        backing
            .set(
                RECIPES_KEY,
                r#"[{"id":18446744073709551615,"name":"Edge","ingredients":["x"],"totals":{}}]"#,
            )
            .unwrap();
        let store = RecipeStore::new(&backing);
        let saved = store
            .save_recipe("y", &ingredients(&["oats"]), Some(&totals()))
            .unwrap();
        assert_eq!(saved.id, 0);

        let listed = store.list_recipes();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].id, u64::MAX);

        let again = store
            .save_recipe("z", &ingredients(&["milk"]), Some(&totals()))
            .unwrap();
        assert_eq!(again.id, 1);
    }

    #[test]
    fn test_unreadable_entry_is_dropped_and_others_survive() {
        let backing = MemoryStore::new();
        backing
            .set(
                RECIPES_KEY,
                r#"[{"id":2,"name":"Good","ingredients":["1 egg"],
                     "totals":{"cal":72,"fat":5,"carb":0.4,"protein":6,"sodium":70,"fiber":0,"sugar":0.2},
                     "date":"1/2/2024"},
                    {"name":"No id"},
                    {"id":1,"name":"Older","ingredients":["oats"],"totals":{"calories":150}}]"#,
            )
            .unwrap();
        let store = RecipeStore::new(&backing);

        let listed = store.list_recipes();
        let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Good", "Older"]);
        assert_eq!(listed[0].totals.saturated_fat_g, 0.0);
        assert_eq!(listed[0].totals.calories, 72.0);

        store.save_recipe("New", &ingredients(&["kale"]), Some(&totals())).unwrap();
        let names: Vec<String> = store.list_recipes().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["New", "Good", "Older"]);
    }

    #[test]
    fn test_file_backed_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let saved = RecipeStore::new(FileStore::new(dir.path()))
            .save_recipe("Chili", &ingredients(&["1 can beans"]), Some(&totals()))
            .unwrap();
        let reopened = RecipeStore::new(FileStore::new(dir.path()));
        assert_eq!(reopened.list_recipes(), vec![saved]);
    }
}
