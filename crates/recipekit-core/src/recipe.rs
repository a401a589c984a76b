//! Recipe records and the read-only recipe source contract.
//!
//! Recipes are owned by the persistence layer; the designer only reads them.

use crate::error::ResourceLoadError;
use crate::serde_util::{opt_string_or_number, string_or_number};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One ingredient line of a recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Ingredient name, e.g. "shallots"
    pub name: String,
    /// Amount, kept as text ("1/2", "2", "0.25")
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub quantity: String,
    /// Unit of measure, e.g. "cup", "g"
    #[serde(default)]
    pub measure: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, measure: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            measure: measure.into(),
        }
    }
}

/// A recipe record as delivered by the recipe source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub plating_guide: Option<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub service_types: Vec<String>,
    /// Path of the recipe photo, relative to the asset root
    #[serde(default)]
    pub image: Option<String>,
}

impl Recipe {
    /// Creates a recipe with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = Some(ingredients);
        self
    }

    pub fn with_steps(mut self, steps: impl Into<String>) -> Self {
        self.steps = Some(steps.into());
        self
    }

    pub fn with_plating_guide(mut self, guide: impl Into<String>) -> Self {
        self.plating_guide = Some(guide.into());
        self
    }

    pub fn with_allergens<S: Into<String>>(mut self, allergens: impl IntoIterator<Item = S>) -> Self {
        self.allergens = allergens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_service_types<S: Into<String>>(
        mut self,
        service_types: impl IntoIterator<Item = S>,
    ) -> Self {
        self.service_types = service_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image = Some(path.into());
        self
    }

    /// Returns true when the ingredient list is absent or empty.
    pub fn has_no_ingredients(&self) -> bool {
        self.ingredients.as_ref().map_or(true, |list| list.is_empty())
    }
}

/// Read-only access to recipe records.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Fetch one recipe by id. `Ok(None)` when no such recipe exists.
    async fn fetch(&self, id: &str) -> Result<Option<Recipe>, ResourceLoadError>;

    /// List every recipe in source order.
    async fn list(&self) -> Result<Vec<Recipe>, ResourceLoadError>;
}

/// Recipe source backed by a JSON file holding an array of records.
#[derive(Debug, Clone)]
pub struct JsonRecipeSource {
    path: PathBuf,
}

impl JsonRecipeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecipeSource for JsonRecipeSource {
    async fn fetch(&self, id: &str) -> Result<Option<Recipe>, ResourceLoadError> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    async fn list(&self) -> Result<Vec<Recipe>, ResourceLoadError> {
        let shown = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ResourceLoadError::NotFound {
                    path: shown.clone(),
                },
                _ => ResourceLoadError::Io {
                    path: shown.clone(),
                    reason: e.to_string(),
                },
            })?;

        let recipes: Vec<Recipe> =
            serde_json::from_str(&content).map_err(|e| ResourceLoadError::Decode {
                path: shown.clone(),
                reason: e.to_string(),
            })?;
        tracing::debug!(path = %shown, count = recipes.len(), "Loaded recipe file");
        Ok(recipes)
    }
}

/// In-memory recipe source.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecipeSource {
    recipes: Vec<Recipe>,
}

impl MemoryRecipeSource {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }
}

#[async_trait]
impl RecipeSource for MemoryRecipeSource {
    async fn fetch(&self, id: &str) -> Result<Option<Recipe>, ResourceLoadError> {
        Ok(self.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Recipe>, ResourceLoadError> {
        Ok(self.recipes.clone())
    }
}
