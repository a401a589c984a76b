//! Field binding: recipe record to bound shape content.
//!
//! [`bind`] is the only place recipe fields become display values. Initial
//! population, template rehydration, single-recipe preview and batch pages
//! all go through it and then through [`apply_bindings`].

use crate::assets::{Bitmap, BindingAssets};
use crate::model::{Shape, ShapeKind};
use recipekit_core::{Ingredient, Recipe};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const TITLE_FALLBACK: &str = "Recipe Title";
pub const INGREDIENTS_FALLBACK: &str = "No ingredients listed";
pub const STEPS_FALLBACK: &str = "No steps provided";
pub const PLATING_GUIDE_FALLBACK: &str = "No plating guide provided";
pub const ALLERGENS_FALLBACK: &str = "None listed";
pub const SERVICE_TYPES_FALLBACK: &str = "Not specified";

/// Marks a shape's content as derived from the recipe record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingTag {
    Title,
    IngredientsContent,
    StepsContent,
    PlatingGuideContent,
    AllergensContent,
    ServiceTypesContent,
    RecipeImage,
    Watermark,
}

impl BindingTag {
    pub const ALL: [BindingTag; 8] = [
        BindingTag::Title,
        BindingTag::IngredientsContent,
        BindingTag::StepsContent,
        BindingTag::PlatingGuideContent,
        BindingTag::AllergensContent,
        BindingTag::ServiceTypesContent,
        BindingTag::RecipeImage,
        BindingTag::Watermark,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingTag::Title => "title",
            BindingTag::IngredientsContent => "ingredients-content",
            BindingTag::StepsContent => "steps-content",
            BindingTag::PlatingGuideContent => "plating-guide-content",
            BindingTag::AllergensContent => "allergens-content",
            BindingTag::ServiceTypesContent => "service-types-content",
            BindingTag::RecipeImage => "recipe-image",
            BindingTag::Watermark => "watermark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == value)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, BindingTag::RecipeImage | BindingTag::Watermark)
    }
}

impl std::fmt::Display for BindingTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Text(String),
    Image { bitmap: Bitmap, opacity: f64 },
}

/// Values for every binding tag, computed from one recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundFields {
    values: HashMap<BindingTag, BoundValue>,
}

impl BoundFields {
    pub fn get(&self, tag: BindingTag) -> Option<&BoundValue> {
        self.values.get(&tag)
    }

    pub fn text(&self, tag: BindingTag) -> Option<&str> {
        match self.values.get(&tag) {
            Some(BoundValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn image(&self, tag: BindingTag) -> Option<&Bitmap> {
        match self.values.get(&tag) {
            Some(BoundValue::Image { bitmap, .. }) => Some(bitmap),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn text_or(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn list_or(items: &[String], fallback: &str) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// `"{quantity} {measure} {name}"` with empty parts left out.
pub fn ingredient_line(ingredient: &Ingredient) -> String {
    [
        ingredient.quantity.as_str(),
        ingredient.measure.as_str(),
        ingredient.name.as_str(),
    ]
    .iter()
    .map(|part| part.trim())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Maps a recipe to concrete values for every [`BindingTag`].
pub fn bind(recipe: &Recipe, assets: &BindingAssets) -> BoundFields {
    let ingredients = match recipe.ingredients.as_deref() {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(ingredient_line)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => INGREDIENTS_FALLBACK.to_string(),
    };

    let values = HashMap::from([
        (
            BindingTag::Title,
            BoundValue::Text(text_or(Some(&recipe.name), TITLE_FALLBACK)),
        ),
        (BindingTag::IngredientsContent, BoundValue::Text(ingredients)),
        (
            BindingTag::StepsContent,
            BoundValue::Text(text_or(recipe.steps.as_deref(), STEPS_FALLBACK)),
        ),
        (
            BindingTag::PlatingGuideContent,
            BoundValue::Text(text_or(
                recipe.plating_guide.as_deref(),
                PLATING_GUIDE_FALLBACK,
            )),
        ),
        (
            BindingTag::AllergensContent,
            BoundValue::Text(list_or(&recipe.allergens, ALLERGENS_FALLBACK)),
        ),
        (
            BindingTag::ServiceTypesContent,
            BoundValue::Text(list_or(&recipe.service_types, SERVICE_TYPES_FALLBACK)),
        ),
        (
            BindingTag::RecipeImage,
            BoundValue::Image {
                bitmap: assets.recipe_image.clone(),
                opacity: 1.0,
            },
        ),
        (
            BindingTag::Watermark,
            BoundValue::Image {
                bitmap: assets.watermark.clone(),
                opacity: assets.watermark_opacity,
            },
        ),
    ]);

    BoundFields { values }
}

/// Overwrites the content of every tagged shape with its bound value.
/// Layout and style stay as they are; untagged shapes are not touched.
/// Returns the number of shapes updated.
pub fn apply_bindings(shapes: &mut [Shape], fields: &BoundFields) -> usize {
    let mut applied = 0;
    for shape in shapes.iter_mut() {
        let Some(tag) = shape.binding_tag() else {
            continue;
        };
        match (&mut shape.kind, fields.get(tag)) {
            (ShapeKind::Text(text), Some(BoundValue::Text(value))) => {
                text.text = value.clone();
                applied += 1;
            }
            (ShapeKind::Image(image), Some(BoundValue::Image { bitmap, opacity })) => {
                image.set_bitmap(bitmap.clone(), *opacity);
                applied += 1;
            }
            (kind, _) => {
                tracing::debug!(
                    shape_id = %shape.id,
                    tag = %tag,
                    shape_type = %crate::model::DesignerShape::shape_type(kind),
                    "Binding tag does not fit shape kind; left unchanged"
                );
            }
        }
    }
    applied
}
