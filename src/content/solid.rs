use crate::foundation::core::Canvas;
use crate::foundation::error::LaminateResult;
use crate::foundation::raster::Raster;
use crate::scene::model::SolidContent;

/// Canvas-sized fill of the solid colour, or `None` when no colour is set.
///
/// The colour's alpha acts as a global opacity on an otherwise opaque pixel.
pub(crate) fn resolve_solid(solid: &SolidContent, canvas: Canvas) -> LaminateResult<Option<Raster>> {
    let Some(color) = solid.color else {
        return Ok(None);
    };
    Raster::filled(canvas.width, canvas.height, color.to_rgba8_premul()).map(Some)
}

#[cfg(test)]
#[path = "../../tests/unit/content/solid.rs"]
mod tests;
