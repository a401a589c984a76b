//! Template persistence.
//!
//! Templates are stored by name: `"default"` for the global layout and
//! `"recipe-<id>"` for a per-recipe override. The wire shapes match the
//! template service: reads return `{template: {fields: [...]}}`, writes
//! send `{templateName, template: {fields: [...]}}` and upsert by name.

use async_trait::async_trait;
use parking_lot::Mutex;
use recipekit_core::{ResourceLoadError, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::serialization::TemplateDocument;

const DEFAULT_KEY: &str = "default";
const RECIPE_PREFIX: &str = "recipe-";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateName {
    Default,
    Recipe(String),
}

impl TemplateName {
    pub fn for_recipe(id: impl Into<String>) -> Self {
        TemplateName::Recipe(id.into())
    }

    pub fn key(&self) -> String {
        match self {
            TemplateName::Default => DEFAULT_KEY.to_string(),
            TemplateName::Recipe(id) => format!("{RECIPE_PREFIX}{id}"),
        }
    }

    /// Inverse of [`key`](Self::key). Any key other than `"default"` or
    /// `"recipe-<id>"` is not a template name.
    pub fn parse(key: &str) -> Option<Self> {
        if key == DEFAULT_KEY {
            return Some(TemplateName::Default);
        }
        key.strip_prefix(RECIPE_PREFIX)
            .filter(|id| !id.is_empty())
            .map(|id| TemplateName::Recipe(id.to_string()))
    }
}

impl std::fmt::Display for TemplateName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// Read response: `{template: {fields: [...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEnvelope {
    pub template: TemplateDocument,
}

/// Write request: `{templateName, template: {fields: [...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTemplateRequest {
    pub template_name: String,
    pub template: TemplateDocument,
}

impl SaveTemplateRequest {
    pub fn new(name: &TemplateName, template: TemplateDocument) -> Self {
        Self {
            template_name: name.key(),
            template,
        }
    }
}

/// Read/write template storage.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// `Ok(None)` when no template is stored under `name`.
    async fn load(&self, name: &TemplateName) -> Result<Option<TemplateDocument>, ResourceLoadError>;

    /// Inserts or replaces the template named in the request.
    async fn save(&self, request: SaveTemplateRequest) -> Result<(), StorageError>;
}

/// One `<key>.json` envelope per template under a directory.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    dir: PathBuf,
}

impl FileTemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

fn parse_envelope(key: &str, content: &str) -> Result<Option<TemplateDocument>, ResourceLoadError> {
    let malformed = |reason: String| ResourceLoadError::MalformedTemplate {
        name: key.to_string(),
        reason,
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;
    let unset = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.get("template").map_or(true, |t| t.is_null()),
        _ => false,
    };
    if unset {
        return Ok(None);
    }
    let envelope: TemplateEnvelope =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
    Ok(Some(envelope.template))
}

#[async_trait]
impl TemplateStore for FileTemplateStore {
    async fn load(&self, name: &TemplateName) -> Result<Option<TemplateDocument>, ResourceLoadError> {
        let key = name.key();
        let path = self.path_for(&key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(template = %key, "No stored template");
                return Ok(None);
            }
            Err(e) => {
                return Err(ResourceLoadError::Io {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };
        let document = parse_envelope(&key, &content)?;
        if let Some(doc) = &document {
            tracing::debug!(template = %key, shapes = doc.len(), "Loaded template");
        }
        Ok(document)
    }

    async fn save(&self, request: SaveTemplateRequest) -> Result<(), StorageError> {
        let key = request.template_name.clone();
        let write_failed = |reason: String| StorageError::WriteFailed {
            name: key.clone(),
            reason,
        };
        let envelope = TemplateEnvelope {
            template: request.template,
        };
        let json = serde_json::to_string_pretty(&envelope).map_err(|e| StorageError::Encode {
            name: key.clone(),
            reason: e.to_string(),
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
        // Temp file then rename: readers never observe a partial write.
        let path = self.path_for(&key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
        tracing::info!(template = %key, path = %path.display(), "Saved template");
        Ok(())
    }
}

/// In-process template store.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: Mutex<HashMap<String, TemplateDocument>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(self, name: &TemplateName, document: TemplateDocument) -> Self {
        self.templates.lock().insert(name.key(), document);
        self
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.templates.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn load(&self, name: &TemplateName) -> Result<Option<TemplateDocument>, ResourceLoadError> {
        Ok(self.templates.lock().get(&name.key()).cloned())
    }

    async fn save(&self, request: SaveTemplateRequest) -> Result<(), StorageError> {
        self.templates
            .lock()
            .insert(request.template_name, request.template);
        Ok(())
    }
}

/// Loads `name`, treating a failed load as absent.
pub async fn load_or_none(store: &dyn TemplateStore, name: &TemplateName) -> Option<TemplateDocument> {
    match store.load(name).await {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(template = %name, error = %e, "Template unavailable; treating as unset");
            None
        }
    }
}

/// Template for one recipe: its override if stored, else the default,
/// else `None` (callers then use the fallback layout).
pub async fn resolve_template(store: &dyn TemplateStore, recipe_id: &str) -> Option<TemplateDocument> {
    if let Some(document) = load_or_none(store, &TemplateName::for_recipe(recipe_id)).await {
        return Some(document);
    }
    load_or_none(store, &TemplateName::Default).await
}
