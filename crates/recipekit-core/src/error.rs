//! Error handling for RecipeKit
//!
//! Provides the error types for every layer of the template pipeline:
//! - Shape validation errors (recovered per shape during serialization)
//! - Resource load errors (templates, bitmaps, recipe files)
//! - Render errors (rasterization surface failures)
//! - Batch abort errors (one recipe failed during multi-page assembly)
//! - Storage errors (template writes)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Shape validation error
///
/// Raised when a shape property cannot be coerced into its storage form.
/// Serialization recovers from it locally by emitting a fallback record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeValidationError {
    /// A numeric field is NaN or infinite
    #[error("Shape '{shape_id}': field '{field}' is not a finite number")]
    NonFinite {
        /// The id of the offending shape.
        shape_id: String,
        /// The name of the field.
        field: &'static str,
    },

    /// A size field is negative
    #[error("Shape '{shape_id}': field '{field}' must not be negative (got {value})")]
    Negative {
        /// The id of the offending shape.
        shape_id: String,
        /// The name of the field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A required field is absent from a stored record
    #[error("Shape '{shape_id}': missing required field '{field}'")]
    MissingField {
        /// The id of the offending shape.
        shape_id: String,
        /// The name of the field.
        field: &'static str,
    },

    /// A line has fewer than two points or an odd coordinate count
    #[error("Shape '{shape_id}': line needs an even number of coordinates and at least two points (got {count})")]
    BadPoints {
        /// The id of the offending shape.
        shape_id: String,
        /// The number of coordinates supplied.
        count: usize,
    },

    /// The stored type tag names no known shape kind
    #[error("Shape '{shape_id}': unknown shape type '{shape_type}'")]
    UnknownType {
        /// The id of the offending shape.
        shape_id: String,
        /// The unrecognized type tag.
        shape_type: String,
    },
}

/// Resource load error
///
/// Represents failures fetching templates, bitmaps or recipe files.
/// Interactive callers recover with a fallback layout or placeholder image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceLoadError {
    /// Resource does not exist
    #[error("Resource not found: {path}")]
    NotFound {
        /// The path or key that was requested.
        path: String,
    },

    /// Resource exists but could not be read
    #[error("Failed to read {path}: {reason}")]
    Io {
        /// The path that failed to read.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// Resource was read but its bytes could not be decoded
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// The path whose contents were invalid.
        path: String,
        /// The decoder failure.
        reason: String,
    },

    /// A template document is not in the expected envelope shape
    #[error("Malformed template '{name}': {reason}")]
    MalformedTemplate {
        /// The template key.
        name: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Render error
///
/// Fatal for the single render call that raised it; the editing session
/// stays usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The pixel buffer could not be allocated
    #[error("Cannot allocate a {width}x{height} rasterization surface")]
    SurfaceUnavailable {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// A foreign-origin bitmap was drawn, so pixels cannot be read back
    #[error("Surface is tainted by foreign image '{source_path}'; copy it into the asset directory and export again")]
    TaintedSurface {
        /// The path of the image that tainted the surface.
        source_path: String,
    },

    /// Pixels were read back but could not be encoded
    #[error("Failed to encode output: {reason}")]
    Encode {
        /// The encoder failure.
        reason: String,
    },
}

/// Batch abort error
///
/// One recipe failed to render during multi-page assembly, so the whole
/// batch was discarded. Identifies the recipe so the caller can retry.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Batch aborted at recipe '{recipe_id}' (position {index}): {source}")]
pub struct BatchAbortError {
    /// The id of the recipe whose page failed.
    pub recipe_id: String,
    /// Zero-based position of that recipe in the input.
    pub index: usize,
    /// The render failure.
    pub source: RenderError,
}

/// Storage error
///
/// Represents failures persisting a template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The template could not be written
    #[error("Failed to save template '{name}': {reason}")]
    WriteFailed {
        /// The template key.
        name: String,
        /// The underlying failure.
        reason: String,
    },

    /// The template could not be encoded
    #[error("Failed to encode template '{name}': {reason}")]
    Encode {
        /// The template key.
        name: String,
        /// The encoder failure.
        reason: String,
    },
}

/// Main error type for RecipeKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Shape validation error
    #[error(transparent)]
    ShapeValidation(#[from] ShapeValidationError),

    /// Resource load error
    #[error(transparent)]
    ResourceLoad(#[from] ResourceLoadError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Batch abort error
    #[error(transparent)]
    BatchAbort(#[from] BatchAbortError),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Short label naming the error kind, used for user-facing notices
    pub fn kind_label(&self) -> &'static str {
        match self {
            Error::ShapeValidation(_) => "Validation",
            Error::ResourceLoad(_) => "Resource",
            Error::Render(_) => "Render",
            Error::BatchAbort(_) => "Batch",
            Error::Storage(_) | Error::Io(_) => "Storage",
            Error::Other(_) => "Other",
        }
    }

    /// Check if this is a render error
    pub fn is_render_error(&self) -> bool {
        matches!(self, Error::Render(_))
    }

    /// Check if this aborted a batch
    pub fn is_batch_abort(&self) -> bool {
        matches!(self, Error::BatchAbort(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
