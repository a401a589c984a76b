//! Bitmap resources: the in-memory [`Bitmap`], the [`BitmapSource`]
//! contract and the [`AssetLoader`] placeholder policy.

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use recipekit_core::{Recipe, ResourceLoadError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a bitmap's pixels came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitmapOrigin {
    /// Loaded from inside the asset root.
    Local,
    /// Loaded from outside the asset root. Drawing it taints the surface.
    Foreign { source: String },
    /// Generated neutral image.
    Placeholder,
}

/// Decoded RGBA bitmap. Clones share the pixel buffer.
#[derive(Clone)]
pub struct Bitmap {
    pixels: Arc<RgbaImage>,
    origin: BitmapOrigin,
}

impl Bitmap {
    pub fn new(image: RgbaImage, origin: BitmapOrigin) -> Self {
        Self {
            pixels: Arc::new(image),
            origin,
        }
    }

    pub fn local(image: RgbaImage) -> Self {
        Self::new(image, BitmapOrigin::Local)
    }

    pub fn foreign(image: RgbaImage, source: impl Into<String>) -> Self {
        Self::new(
            image,
            BitmapOrigin::Foreign {
                source: source.into(),
            },
        )
    }

    /// Neutral gray image with a darker one-pixel border.
    pub fn placeholder(width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1), height.max(1));
        let image = RgbaImage::from_fn(w, h, |x, y| {
            if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                Rgba([0xb0, 0xb0, 0xb0, 0xff])
            } else {
                Rgba([0xdd, 0xdd, 0xdd, 0xff])
            }
        });
        Self::new(image, BitmapOrigin::Placeholder)
    }

    pub fn decode(bytes: &[u8], origin: BitmapOrigin) -> Result<Self, image::ImageError> {
        Ok(Self::new(image::load_from_memory(bytes)?.to_rgba8(), origin))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn origin(&self) -> &BitmapOrigin {
        &self.origin
    }

    pub fn is_placeholder(&self) -> bool {
        self.origin == BitmapOrigin::Placeholder
    }

    pub fn foreign_source(&self) -> Option<&str> {
        match &self.origin {
            BitmapOrigin::Foreign { source } => Some(source),
            _ => None,
        }
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && (Arc::ptr_eq(&self.pixels, &other.pixels) || *self.pixels == *other.pixels)
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("origin", &self.origin)
            .finish()
    }
}

/// Read-only bitmap resource source, addressed by path.
#[async_trait]
pub trait BitmapSource: Send + Sync {
    async fn load(&self, path: &str) -> Result<Bitmap, ResourceLoadError>;
}

/// Loads bitmaps from disk, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct FsBitmapSource {
    root: PathBuf,
}

impl FsBitmapSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn is_inside_root(&self, resolved: &Path) -> bool {
        match (
            tokio::fs::canonicalize(&self.root).await,
            tokio::fs::canonicalize(resolved).await,
        ) {
            (Ok(root), Ok(file)) => file.starts_with(root),
            _ => false,
        }
    }
}

#[async_trait]
impl BitmapSource for FsBitmapSource {
    async fn load(&self, path: &str) -> Result<Bitmap, ResourceLoadError> {
        let candidate = Path::new(path);
        let resolved = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        let bytes = tokio::fs::read(&resolved).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ResourceLoadError::NotFound {
                    path: path.to_string(),
                }
            } else {
                ResourceLoadError::Io {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let origin = if self.is_inside_root(&resolved).await {
            BitmapOrigin::Local
        } else {
            BitmapOrigin::Foreign {
                source: path.to_string(),
            }
        };

        Bitmap::decode(&bytes, origin).map_err(|e| ResourceLoadError::Decode {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

/// In-memory bitmap source keyed by path.
#[derive(Debug, Default)]
pub struct MemoryBitmapSource {
    bitmaps: Mutex<HashMap<String, Bitmap>>,
}

impl MemoryBitmapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, bitmap: Bitmap) {
        self.bitmaps.lock().insert(path.into(), bitmap);
    }
}

#[async_trait]
impl BitmapSource for MemoryBitmapSource {
    async fn load(&self, path: &str) -> Result<Bitmap, ResourceLoadError> {
        self.bitmaps
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceLoadError::NotFound {
                path: path.to_string(),
            })
    }
}

/// Bitmaps resolved for one recipe, ready for field binding.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingAssets {
    pub recipe_image: Bitmap,
    pub watermark: Bitmap,
    pub watermark_opacity: f64,
}

impl BindingAssets {
    /// Placeholders only; used where no bitmap source is wired in.
    pub fn placeholders() -> Self {
        Self {
            recipe_image: Bitmap::placeholder(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT),
            watermark: Bitmap::placeholder(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT),
            watermark_opacity: DEFAULT_WATERMARK_OPACITY,
        }
    }
}

pub const DEFAULT_WATERMARK_OPACITY: f64 = 0.1;
const PLACEHOLDER_WIDTH: u32 = 120;
const PLACEHOLDER_HEIGHT: u32 = 90;

/// Wraps a [`BitmapSource`] with the placeholder policy: every failure is
/// logged and replaced, so callers never see an error.
#[derive(Clone)]
pub struct AssetLoader {
    source: Arc<dyn BitmapSource>,
    placeholder_path: Option<String>,
    logo_path: Option<String>,
    watermark_opacity: f64,
}

impl AssetLoader {
    pub fn new(source: Arc<dyn BitmapSource>) -> Self {
        Self {
            source,
            placeholder_path: None,
            logo_path: None,
            watermark_opacity: DEFAULT_WATERMARK_OPACITY,
        }
    }

    pub fn with_placeholder(mut self, path: impl Into<String>) -> Self {
        self.placeholder_path = Some(path.into());
        self
    }

    pub fn with_logo(mut self, path: impl Into<String>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    pub fn with_watermark_opacity(mut self, opacity: f64) -> Self {
        self.watermark_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn watermark_opacity(&self) -> f64 {
        self.watermark_opacity
    }

    /// The configured placeholder file, else a generated one.
    pub async fn placeholder(&self) -> Bitmap {
        if let Some(path) = &self.placeholder_path {
            match self.source.load(path).await {
                Ok(bitmap) => return bitmap,
                Err(e) => tracing::warn!(path = %path, error = %e, "Placeholder image unavailable"),
            }
        }
        Bitmap::placeholder(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)
    }

    /// Loads `path`, substituting the placeholder when absent or unloadable.
    pub async fn load_or_placeholder(&self, path: Option<&str>) -> Bitmap {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => match self.source.load(path).await {
                Ok(bitmap) => bitmap,
                Err(e) => {
                    tracing::warn!(path, error = %e, "Using placeholder for missing image");
                    self.placeholder().await
                }
            },
            None => self.placeholder().await,
        }
    }

    /// Resolves the recipe photo and the organization logo.
    pub async fn assets_for(&self, recipe: &Recipe) -> BindingAssets {
        let recipe_image = self.load_or_placeholder(recipe.image.as_deref()).await;
        let watermark = self.load_or_placeholder(self.logo_path.as_deref()).await;
        BindingAssets {
            recipe_image,
            watermark,
            watermark_opacity: self.watermark_opacity,
        }
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("placeholder_path", &self.placeholder_path)
            .field("logo_path", &self.logo_path)
            .field("watermark_opacity", &self.watermark_opacity)
            .finish()
    }
}
