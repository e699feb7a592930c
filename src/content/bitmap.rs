use std::sync::Arc;

use crate::encode::codec::decode_raster;
use crate::foundation::error::LaminateResult;
use crate::foundation::raster::Raster;
use crate::render::engine::RenderContext;

/// Decoded raster for `location` at its native resolution, served from the context's cache when
/// possible.
#[tracing::instrument(skip(ctx))]
pub(crate) async fn resolve_image(ctx: &RenderContext, location: &str) -> LaminateResult<Arc<Raster>> {
    if let Some(hit) = ctx.cache().get(location) {
        tracing::debug!(location, "image cache hit");
        return Ok(hit);
    }

    tracing::debug!(location, "image cache miss");
    let bytes = ctx.fetcher().fetch_image(location).await?;
    let raster = Arc::new(decode_raster(&bytes)?);
    ctx.cache().insert(location, Arc::clone(&raster));
    Ok(raster)
}
