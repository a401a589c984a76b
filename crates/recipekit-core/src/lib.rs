//! # RecipeKit Core
//!
//! Core types, traits, and utilities for RecipeKit.
//! Provides the recipe record model consumed by the template designer,
//! the error taxonomy shared by every layer, and the request tokens used
//! to discard stale asynchronous responses.

pub mod error;
pub mod recipe;
pub mod request;
pub mod serde_util;

pub use error::{
    BatchAbortError, Error, RenderError, ResourceLoadError, Result, ShapeValidationError,
    StorageError,
};

pub use recipe::{Ingredient, JsonRecipeSource, MemoryRecipeSource, Recipe, RecipeSource};

pub use request::{RequestToken, RequestTracker};
