use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::error::{ReelError, ReelResult};

/// Reference to an image or font asset.
#[derive(Clone, Debug)]
pub enum AssetRef {
    /// File path; relative paths resolve against the loader root.
    Path(PathBuf),
    /// Bytes already in memory (embedded assets, tests).
    Memory {
        /// Name used in diagnostics.
        name: String,
        /// Encoded asset bytes.
        bytes: Arc<Vec<u8>>,
    },
}

impl AssetRef {
    /// Reference a file path.
    pub fn path(p: impl Into<PathBuf>) -> Self {
        Self::Path(p.into())
    }

    /// Reference in-memory bytes.
    pub fn memory(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Memory {
            name: name.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Human-readable name for logs and errors.
    pub fn display_name(&self) -> String {
        match self {
            Self::Path(p) => p.display().to_string(),
            Self::Memory { name, .. } => format!("memory:{name}"),
        }
    }
}

/// Resolves asset references to bytes and decoded images.
///
/// Every failure is a [`ReelError::Load`].
pub trait AssetLoader {
    /// Read the raw bytes behind `reference`.
    fn load_bytes(&self, reference: &AssetRef) -> ReelResult<Vec<u8>>;

    /// Read and decode an image into premultiplied RGBA8.
    fn load_image(&self, reference: &AssetRef) -> ReelResult<PreparedImage> {
        let bytes = self.load_bytes(reference)?;
        decode_image(&bytes).map_err(|e| {
            ReelError::load(format!(
                "failed to decode image '{}': {e}",
                reference.display_name()
            ))
        })
    }
}

/// Filesystem loader resolving relative paths against a root directory.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory for relative references.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, p: &Path) -> ReelResult<PathBuf> {
        if p.is_absolute() {
            return Ok(p.to_path_buf());
        }
        let norm = normalize_rel_path(&p.to_string_lossy())?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl Default for FsAssetLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl AssetLoader for FsAssetLoader {
    fn load_bytes(&self, reference: &AssetRef) -> ReelResult<Vec<u8>> {
        match reference {
            AssetRef::Path(p) => {
                let path = self.resolve(p).map_err(|e| ReelError::load(e.to_string()))?;
                std::fs::read(&path).map_err(|e| {
                    ReelError::load(format!("failed to read asset '{}': {e}", path.display()))
                })
            }
            AssetRef::Memory { bytes, .. } => Ok(bytes.as_ref().clone()),
        }
    }
}

/// Normalize and validate loader-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> ReelResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(ReelError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(ReelError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ReelError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ReelError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Supplies the caption typeface.
///
/// Resolution never fails the run: an unavailable typeface yields `None` and captions render with
/// the default family.
pub trait FontProvider {
    /// Custom typeface bytes, or `None` for the default family.
    fn resolve_typeface(&self) -> Option<Vec<u8>>;
}

/// Always uses the default family.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTypeface;

impl FontProvider for DefaultTypeface {
    fn resolve_typeface(&self) -> Option<Vec<u8>> {
        None
    }
}

/// Loads a typeface through an [`AssetLoader`], falling back silently on failure.
pub struct LoaderTypeface<L> {
    loader: L,
    reference: AssetRef,
}

impl<L: AssetLoader> LoaderTypeface<L> {
    /// Resolve `reference` with `loader` when asked.
    pub fn new(loader: L, reference: AssetRef) -> Self {
        Self { loader, reference }
    }
}

impl<L: AssetLoader> FontProvider for LoaderTypeface<L> {
    fn resolve_typeface(&self) -> Option<Vec<u8>> {
        match self.loader.load_bytes(&self.reference) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(
                    font = %self.reference.display_name(),
                    error = %e,
                    "typeface failed to load, using default family"
                );
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
