use std::sync::Arc;

use futures::future::{BoxFuture, try_join_all};

use crate::assets::cache::AssetCache;
use crate::assets::fetch::{AssetFetcher, FsFetcher};
use crate::effects::blend::composite_at;
use crate::effects::mask::apply_alpha_stencil;
use crate::encode::codec::encode_raster;
use crate::foundation::error::LaminateResult;
use crate::foundation::raster::{Raster, ResizeFilter, ensure_pixel_budget};
use crate::render::layer::{PositionedRaster, render_layer_nested};
use crate::scene::model::{BlendMode, Composition, Layer};

/// Knobs for a render.
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Filter used whenever layer content is resized to its placed size.
    pub resize_filter: ResizeFilter,
    /// Deepest allowed chain of nested compositions.
    pub max_nesting_depth: usize,
    /// Resolve all layers of a composition concurrently. Compositing order is unaffected.
    pub concurrent_layers: bool,
    /// Check every gradient intersection against the gradient line and its perpendicular.
    pub strict_geometry: bool,
    /// Largest raster, in pixels, a render may allocate for the canvas or a placed layer.
    pub max_pixels: u64,
}

/// Default for [`RenderOpts::max_pixels`]: 64 megapixels, 256 MiB per raster.
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 26;

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            resize_filter: ResizeFilter::Bilinear,
            max_nesting_depth: 8,
            concurrent_layers: false,
            strict_geometry: false,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

/// Everything a render needs besides the document: options, the asset fetcher and the decoded
/// image cache.
///
/// Cloning is cheap and clones share the fetcher and the cache. Give two contexts separate
/// caches with [`RenderContext::with_cache`].
#[derive(Clone)]
pub struct RenderContext {
    opts: RenderOpts,
    fetcher: Arc<dyn AssetFetcher>,
    cache: Arc<AssetCache>,
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("opts", &self.opts)
            .field("cached_images", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Arc::new(FsFetcher::default()))
    }
}

impl RenderContext {
    /// Context with default options and a fresh cache.
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            opts: RenderOpts::default(),
            fetcher,
            cache: Arc::new(AssetCache::new()),
        }
    }

    /// Replace the options.
    pub fn with_opts(mut self, opts: RenderOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Use `cache` instead of the context's own.
    pub fn with_cache(mut self, cache: Arc<AssetCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Options in use.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// The asset fetcher.
    pub fn fetcher(&self) -> &dyn AssetFetcher {
        self.fetcher.as_ref()
    }

    /// The decoded image cache.
    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }
}

/// Render `comp` to a raster of `comp.size`.
///
/// The document is validated first; an invalid document never starts rendering. Any failure
/// while rendering a layer aborts the whole render.
#[tracing::instrument(skip_all, fields(id = comp.id.as_deref(), layers = comp.layers.len()))]
pub async fn process_composition(ctx: &RenderContext, comp: &Composition) -> LaminateResult<Raster> {
    render_composition(ctx, comp, Vec::new()).await
}

/// [`process_composition`] followed by encoding in `comp.format`.
pub async fn render_and_encode(ctx: &RenderContext, comp: &Composition) -> LaminateResult<Vec<u8>> {
    let raster = process_composition(ctx, comp).await?;
    encode_raster(&raster, comp.format)
}

/// Boxed so nested compositions can recurse back into the engine.
pub(crate) fn render_composition<'a>(
    ctx: &'a RenderContext,
    comp: &'a Composition,
    stack: Vec<String>,
) -> BoxFuture<'a, LaminateResult<Raster>> {
    Box::pin(async move {
        comp.validate()?;
        let canvas = comp.size;
        ensure_pixel_budget("canvas", canvas.width, canvas.height, ctx.opts().max_pixels)?;

        // Index 0 is the front-most layer; paint from the back.
        let paint_order: Vec<&Layer> = comp.layers.iter().rev().collect();

        let rendered = if ctx.opts().concurrent_layers {
            try_join_all(paint_order.iter().map(|layer| {
                render_layer_nested(ctx, canvas, layer.frame(), layer.mask.as_ref(), &stack)
            }))
            .await?
        } else {
            let mut out = Vec::with_capacity(paint_order.len());
            for layer in &paint_order {
                out.push(
                    render_layer_nested(ctx, canvas, layer.frame(), layer.mask.as_ref(), &stack)
                        .await?,
                );
            }
            out
        };

        let layers: Vec<RenderedLayer> = paint_order
            .iter()
            .zip(rendered)
            .filter_map(|(layer, placed)| placed.map(|p| RenderedLayer::new(layer, p)))
            .collect();

        let mut output = Raster::new(canvas.width, canvas.height)?;
        composite_layers(&mut output, &layers)?;
        Ok(output)
    })
}

struct RenderedLayer {
    placed: PositionedRaster,
    blend: BlendMode,
    opacity: f32,
    clipping: bool,
}

impl RenderedLayer {
    fn new(layer: &Layer, placed: PositionedRaster) -> Self {
        Self {
            placed,
            blend: layer.blending_mode,
            opacity: (layer.opacity / 100.0) as f32,
            clipping: layer.clipping_mask,
        }
    }

    fn composite_onto(&self, dst: &mut Raster, opacity: f32, blend: BlendMode) -> LaminateResult<()> {
        composite_at(
            dst,
            &self.placed.raster,
            self.placed.x,
            self.placed.y,
            opacity,
            blend,
        )
    }
}

/// Paint `layers` (back to front) onto `output`.
///
/// A run of clipping layers is merged with the nearest non-clipping layer beneath it, confined
/// to that base layer's alpha, and composited with the last clipper's blend mode and opacity.
fn composite_layers(output: &mut Raster, layers: &[RenderedLayer]) -> LaminateResult<()> {
    let mut base: Option<usize> = None;

    for (i, layer) in layers.iter().enumerate() {
        if !layer.clipping {
            base = Some(i);
        } else if base.is_none() {
            layer.composite_onto(output, layer.opacity, layer.blend)?;
            continue;
        }

        // Defer until the clipping run above the base ends.
        if layers.get(i + 1).is_some_and(|next| next.clipping) {
            continue;
        }

        match base {
            Some(b) if layer.clipping => {
                tracing::debug!(base = b, top = i, "flushing clipping group");
                let mut scratch = Raster::new(output.width, output.height)?;
                for member in &layers[b..=i] {
                    member.composite_onto(&mut scratch, member.opacity, member.blend)?;
                }
                let base_layer = &layers[b].placed;
                apply_alpha_stencil(&mut scratch, &base_layer.raster, base_layer.x, base_layer.y);
                composite_at(output, &scratch, 0, 0, layer.opacity, layer.blend)?;
            }
            _ => layer.composite_onto(output, layer.opacity, layer.blend)?,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
