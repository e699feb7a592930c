use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::foundation::error::{LaminateError, LaminateResult};
use crate::scene::model::Composition;
use crate::schema::validate::is_valid_reference;

/// Tag used when a reference omits one.
pub const DEFAULT_TAG: &str = "latest";

/// Parsed `name[:tag]` reference to a nested composition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CompositionRef {
    /// Composition name; may contain `/` for namespacing.
    pub name: String,
    /// Version tag, [`DEFAULT_TAG`] when omitted.
    pub tag: String,
}

impl CompositionRef {
    /// Parse a reference, failing with [`LaminateError::UnresolvedReference`] when malformed.
    pub fn parse(reference: &str) -> LaminateResult<Self> {
        if !is_valid_reference(reference) {
            return Err(LaminateError::unresolved(format!(
                "'{reference}' is not a valid composition reference"
            )));
        }
        let (name, tag) = reference.split_once(':').unwrap_or((reference, DEFAULT_TAG));
        Ok(Self {
            name: name.to_owned(),
            tag: tag.to_owned(),
        })
    }

    /// `{name}/{tag}`, used for cache-directory and registry lookups.
    pub fn relative_path(&self) -> PathBuf {
        Path::new(&self.name).join(format!("{}.json", self.tag))
    }
}

impl fmt::Display for CompositionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.tag)
    }
}

/// Source of image bytes and nested compositions.
///
/// Implementations decide the lookup policy (filesystem, HTTP registry, memory). The engine only
/// requires that a missing asset surfaces as [`LaminateError::UnresolvedReference`].
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Raw encoded bytes of the image at `location`.
    async fn fetch_image(&self, location: &str) -> LaminateResult<Vec<u8>>;

    /// The composition named by `reference`.
    async fn fetch_composition(&self, reference: &CompositionRef) -> LaminateResult<Composition>;
}

/// Options for [`FsFetcher`].
#[derive(Clone, Debug, Default)]
pub struct FsFetcherOpts {
    /// Base directory for relative image paths. Relative paths resolve against the working
    /// directory when unset.
    pub root: Option<PathBuf>,
    /// Directory holding `compositions/{name}/{tag}.json`. Nested compositions cannot be
    /// resolved when unset.
    pub cache_dir: Option<PathBuf>,
}

/// Local filesystem fetcher.
#[derive(Clone, Debug, Default)]
pub struct FsFetcher {
    opts: FsFetcherOpts,
}

impl FsFetcher {
    /// Create a fetcher.
    pub fn new(opts: FsFetcherOpts) -> Self {
        Self { opts }
    }

    /// Options in use.
    pub fn opts(&self) -> &FsFetcherOpts {
        &self.opts
    }

    /// Filesystem path for an image location, or `None` for remote URLs.
    pub fn image_path(&self, location: &str) -> Option<PathBuf> {
        if is_remote(location) {
            return None;
        }
        let raw = location.strip_prefix("file://").unwrap_or(location);
        let path = PathBuf::from(raw);
        match &self.opts.root {
            Some(root) if path.is_relative() => Some(root.join(path)),
            _ => Some(path),
        }
    }

    /// Path of `reference` inside the cache directory, if one is configured.
    pub fn composition_path(&self, reference: &CompositionRef) -> Option<PathBuf> {
        self.opts
            .cache_dir
            .as_ref()
            .map(|dir| dir.join("compositions").join(reference.relative_path()))
    }
}

pub(crate) fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[async_trait]
impl AssetFetcher for FsFetcher {
    async fn fetch_image(&self, location: &str) -> LaminateResult<Vec<u8>> {
        let path = self.image_path(location).ok_or_else(|| {
            LaminateError::unresolved(format!(
                "image '{location}' is remote; enable the `http` feature and use HttpFetcher"
            ))
        })?;
        tokio::fs::read(&path).await.map_err(|e| {
            LaminateError::unresolved(format!("image '{location}' ({}): {e}", path.display()))
        })
    }

    async fn fetch_composition(&self, reference: &CompositionRef) -> LaminateResult<Composition> {
        let path = self.composition_path(reference).ok_or_else(|| {
            LaminateError::unresolved(format!(
                "composition '{reference}': no cache directory configured"
            ))
        })?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            LaminateError::unresolved(format!(
                "composition '{reference}' ({}): {e}",
                path.display()
            ))
        })?;
        Composition::from_slice(&bytes)
    }
}

/// Fetcher serving assets registered up front. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryFetcher {
    images: HashMap<String, Vec<u8>>,
    compositions: HashMap<CompositionRef, Composition>,
    image_fetches: AtomicUsize,
}

impl InMemoryFetcher {
    /// Empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded image bytes under `location`.
    pub fn with_image(mut self, location: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.images.insert(location.into(), bytes);
        self
    }

    /// Register a composition under `reference` (`name` or `name:tag`).
    pub fn with_composition(
        mut self,
        reference: &str,
        composition: Composition,
    ) -> LaminateResult<Self> {
        self.compositions
            .insert(CompositionRef::parse(reference)?, composition);
        Ok(self)
    }

    /// How many times [`AssetFetcher::fetch_image`] has been called.
    pub fn image_fetches(&self) -> usize {
        self.image_fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AssetFetcher for InMemoryFetcher {
    async fn fetch_image(&self, location: &str) -> LaminateResult<Vec<u8>> {
        self.image_fetches.fetch_add(1, Ordering::Relaxed);
        self.images
            .get(location)
            .cloned()
            .ok_or_else(|| LaminateError::unresolved(format!("image '{location}' not found")))
    }

    async fn fetch_composition(&self, reference: &CompositionRef) -> LaminateResult<Composition> {
        self.compositions
            .get(reference)
            .cloned()
            .ok_or_else(|| LaminateError::unresolved(format!("composition '{reference}' not found")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
