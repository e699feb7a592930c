use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::assets::fetch::{AssetFetcher, CompositionRef, FsFetcher, FsFetcherOpts, is_remote};
use crate::foundation::error::{LaminateError, LaminateResult};
use crate::scene::model::Composition;

/// Options for [`HttpFetcher`].
#[derive(Clone, Debug)]
pub struct HttpFetcherOpts {
    /// Registry base URL; compositions are fetched from `{registry_url}/compositions/{name}/{tag}`.
    pub registry_url: String,
    /// Local cache directory, checked before the registry and filled after a download.
    pub cache_dir: Option<PathBuf>,
    /// Base directory for relative image paths.
    pub root: Option<PathBuf>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpFetcherOpts {
    /// Options for `registry_url` with no cache directory and a 30 second timeout.
    pub fn new(registry_url: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
            cache_dir: None,
            root: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Fetcher that reads `http(s)://` locations and a composition registry over HTTP, and
/// everything else from the local filesystem.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    local: FsFetcher,
    registry_url: String,
}

impl HttpFetcher {
    /// Build a fetcher and its HTTP client.
    pub fn new(opts: HttpFetcherOpts) -> LaminateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(opts.timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            local: FsFetcher::new(FsFetcherOpts {
                root: opts.root,
                cache_dir: opts.cache_dir,
            }),
            registry_url: opts.registry_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn get(&self, url: &str) -> LaminateResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| LaminateError::unresolved(format!("GET {url}: {e}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LaminateError::unresolved(format!("GET {url}: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn store_in_cache(&self, reference: &CompositionRef, bytes: &[u8]) {
        let Some(path) = self.local.composition_path(reference) else {
            return;
        };
        let write = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, bytes).await
        };
        if let Err(e) = write.await {
            tracing::warn!(%reference, path = %path.display(), error = %e, "could not cache composition");
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch_image(&self, location: &str) -> LaminateResult<Vec<u8>> {
        if is_remote(location) {
            return self.get(location).await;
        }
        self.local.fetch_image(location).await
    }

    async fn fetch_composition(&self, reference: &CompositionRef) -> LaminateResult<Composition> {
        if self.local.composition_path(reference).is_some() {
            match self.local.fetch_composition(reference).await {
                Ok(c) => {
                    tracing::debug!(%reference, "composition served from local cache");
                    return Ok(c);
                }
                Err(LaminateError::UnresolvedReference(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let url = format!(
            "{}/compositions/{}/{}",
            self.registry_url, reference.name, reference.tag
        );
        let bytes = self.get(&url).await?;
        let composition = Composition::from_slice(&bytes)?;
        self.store_in_cache(reference, &bytes).await;
        Ok(composition)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/http.rs"]
mod tests;
