use crate::content::resolve_content;
use crate::effects::mask::apply_brightness_mask;
use crate::foundation::core::Canvas;
use crate::foundation::error::LaminateResult;
use crate::foundation::raster::{Raster, ensure_pixel_budget};
use crate::layout::placement::resolve_placement;
use crate::render::engine::RenderContext;
use crate::scene::model::{LayerFrame, LayerMask};

/// A raster sized and positioned for compositing onto the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionedRaster {
    /// Resized content, with any layer mask already applied.
    pub raster: Raster,
    /// Left edge on the canvas.
    pub x: i64,
    /// Top edge on the canvas.
    pub y: i64,
}

/// Render one layer (or mask): resolve content, place and resize it, then apply `mask`.
///
/// Returns `Ok(None)` when the content is incomplete and the layer draws nothing. A mask that
/// draws nothing leaves the content unmasked.
#[tracing::instrument(skip_all, fields(kind = frame.content.kind()))]
pub async fn render_layer(
    ctx: &RenderContext,
    canvas: Canvas,
    frame: LayerFrame<'_>,
    mask: Option<&LayerMask>,
) -> LaminateResult<Option<PositionedRaster>> {
    render_layer_nested(ctx, canvas, frame, mask, &[]).await
}

pub(crate) async fn render_layer_nested(
    ctx: &RenderContext,
    canvas: Canvas,
    frame: LayerFrame<'_>,
    mask: Option<&LayerMask>,
    stack: &[String],
) -> LaminateResult<Option<PositionedRaster>> {
    let Some(mut layer) = render_frame(ctx, canvas, frame, stack).await? else {
        tracing::debug!(kind = frame.content.kind(), "layer has no content, skipping");
        return Ok(None);
    };

    if let Some(mask) = mask
        && let Some(stencil) = render_frame(ctx, canvas, mask.frame(), stack).await?
    {
        apply_brightness_mask(&mut layer.raster, &stencil.raster, stencil.x, stencil.y);
    }

    Ok(Some(layer))
}

async fn render_frame(
    ctx: &RenderContext,
    canvas: Canvas,
    frame: LayerFrame<'_>,
    stack: &[String],
) -> LaminateResult<Option<PositionedRaster>> {
    let Some(content) = resolve_content(ctx, canvas, frame.content, stack).await? else {
        return Ok(None);
    };

    let placed = resolve_placement((content.width, content.height), canvas, &frame)?;
    ensure_pixel_budget(
        "placed layer",
        placed.width,
        placed.height,
        ctx.opts().max_pixels,
    )?;
    let raster = content.resized(placed.width, placed.height, ctx.opts().resize_filter)?;

    Ok(Some(PositionedRaster {
        raster,
        x: placed.x,
        y: placed.y,
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/render/layer.rs"]
mod tests;
