//! Content resolvers: turn a layer's content descriptor into a raster at its natural size.

pub(crate) mod bitmap;
pub(crate) mod gradient;
pub(crate) mod nested;
pub(crate) mod solid;

use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::LaminateResult;
use crate::foundation::raster::Raster;
use crate::render::engine::RenderContext;
use crate::scene::model::LayerContent;

/// Resolve `content` against `canvas`. `Ok(None)` means the descriptor is incomplete and the
/// layer draws nothing.
pub(crate) async fn resolve_content(
    ctx: &RenderContext,
    canvas: Canvas,
    content: &LayerContent,
    stack: &[String],
) -> LaminateResult<Option<Arc<Raster>>> {
    Ok(match content {
        LayerContent::Solid(solid) => solid::resolve_solid(solid, canvas)?.map(Arc::new),
        LayerContent::Gradient(gradient) => Some(Arc::new(gradient::rasterize_gradient(
            gradient,
            canvas,
            ctx.opts().strict_geometry,
        )?)),
        LayerContent::Image(image) => match image.location.as_deref() {
            Some(location) => Some(bitmap::resolve_image(ctx, location).await?),
            None => None,
        },
        LayerContent::Composition(nested) => match nested.reference.as_deref() {
            Some(reference) => Some(Arc::new(
                nested::resolve_nested(ctx, reference, stack).await?,
            )),
            None => None,
        },
    })
}
