use crate::foundation::core::Canvas;
use crate::foundation::error::{LaminateError, LaminateResult};
use crate::scene::model::{LayerFrame, OriginDescriptor, Placement};

/// Vertical half of an anchor descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAnchor {
    /// `top`
    Top,
    /// `center`
    Center,
    /// `bottom`
    Bottom,
}

/// Horizontal half of an anchor descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalAnchor {
    /// `left`
    Left,
    /// `center`
    Center,
    /// `right`
    Right,
}

/// Parsed `"<vertical> <horizontal>"` descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Anchor {
    /// Vertical token.
    pub vertical: VerticalAnchor,
    /// Horizontal token.
    pub horizontal: HorizontalAnchor,
}

impl Anchor {
    /// Parse a descriptor, failing with [`LaminateError::InvalidOrigin`] on any unknown token.
    pub fn parse(descriptor: &OriginDescriptor) -> LaminateResult<Self> {
        let raw = descriptor.as_str();
        let invalid = || LaminateError::invalid_origin(format!("'{raw}' is not a valid origin"));

        let mut tokens = raw.split_whitespace();
        let (Some(v), Some(h), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            return Err(invalid());
        };

        let vertical = match v {
            "top" => VerticalAnchor::Top,
            "center" => VerticalAnchor::Center,
            "bottom" => VerticalAnchor::Bottom,
            _ => return Err(invalid()),
        };
        let horizontal = match h {
            "left" => HorizontalAnchor::Left,
            "center" => HorizontalAnchor::Center,
            "right" => HorizontalAnchor::Right,
            _ => return Err(invalid()),
        };
        Ok(Self {
            vertical,
            horizontal,
        })
    }

    /// All nine descriptors, in row-major order from `"top left"` to `"bottom right"`.
    pub fn all_descriptors() -> [&'static str; 9] {
        [
            "top left",
            "top center",
            "top right",
            "center left",
            "center center",
            "center right",
            "bottom left",
            "bottom center",
            "bottom right",
        ]
    }
}

/// Final size and top-left offset of a layer on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedRect {
    /// Width in pixels, at least 1.
    pub width: u32,
    /// Height in pixels, at least 1.
    pub height: u32,
    /// Left edge; may lie outside the canvas.
    pub x: i64,
    /// Top edge; may lie outside the canvas.
    pub y: i64,
}

/// Resolve a raster of `natural` size against `canvas` using `frame`'s placement fields.
///
/// Size comes from the placement mode. Position is resolved per axis in two steps: the origin
/// anchors `position` on the content box, then the alignment re-anchors it on the canvas.
pub fn resolve_placement(
    natural: (u32, u32),
    canvas: Canvas,
    frame: &LayerFrame<'_>,
) -> LaminateResult<PlacedRect> {
    let origin = Anchor::parse(frame.origin)?;
    let alignment = Anchor::parse(frame.alignment)?;
    let (width, height) = resolve_size(natural, canvas, frame)?;

    let w = f64::from(width);
    let h = f64::from(height);

    let mut x = match origin.horizontal {
        HorizontalAnchor::Left => frame.position.x,
        HorizontalAnchor::Center => frame.position.x - round_half_up(w / 2.0),
        HorizontalAnchor::Right => frame.position.x - w,
    };
    let mut y = match origin.vertical {
        VerticalAnchor::Top => frame.position.y,
        VerticalAnchor::Center => frame.position.y - round_half_up(h / 2.0),
        VerticalAnchor::Bottom => frame.position.y - h,
    };

    match alignment.horizontal {
        HorizontalAnchor::Left => {}
        HorizontalAnchor::Center => x += canvas.width_f64() / 2.0,
        HorizontalAnchor::Right => x += canvas.width_f64(),
    }
    match alignment.vertical {
        VerticalAnchor::Top => {}
        VerticalAnchor::Center => y += canvas.height_f64() / 2.0,
        VerticalAnchor::Bottom => y += canvas.height_f64(),
    }

    Ok(PlacedRect {
        width,
        height,
        x: to_pixel(x)?,
        y: to_pixel(y)?,
    })
}

fn resolve_size(
    (w0, h0): (u32, u32),
    canvas: Canvas,
    frame: &LayerFrame<'_>,
) -> LaminateResult<(u32, u32)> {
    if w0 == 0 || h0 == 0 {
        return Err(LaminateError::composite(format!(
            "cannot place empty raster {w0}x{h0}"
        )));
    }

    let (cw, ch) = (canvas.width_f64(), canvas.height_f64());
    let (iw, ih) = (f64::from(w0), f64::from(h0));
    let wider_than_canvas = iw / ih > cw / ch;

    let (w, h) = match frame.placement {
        Placement::Cover if wider_than_canvas => (ch / ih * iw, ch),
        Placement::Cover => (cw, cw / iw * ih),
        Placement::Fit if wider_than_canvas => (cw, cw / iw * ih),
        Placement::Fit => (ch / ih * iw, ch),
        Placement::Stretch => (cw, ch),
        Placement::Custom => (iw * frame.scale.x, ih * frame.scale.y),
    };

    Ok((to_size(w)?, to_size(h)?))
}

fn to_size(v: f64) -> LaminateResult<u32> {
    let v = v.round();
    if !v.is_finite() || v > f64::from(u32::MAX) {
        return Err(LaminateError::composite(format!(
            "resolved layer size {v} is out of range"
        )));
    }
    Ok((v as u32).max(1))
}

fn to_pixel(v: f64) -> LaminateResult<i64> {
    let v = round_half_up(v);
    if !v.is_finite() || v.abs() > f64::from(u32::MAX) {
        return Err(LaminateError::composite(format!(
            "resolved layer offset {v} is out of range"
        )));
    }
    Ok(v as i64)
}

/// Round to nearest, ties towards positive infinity.
pub(crate) fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/placement.rs"]
mod tests;
