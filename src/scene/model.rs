use serde::{Deserialize, Serialize};

use crate::encode::codec::OutputFormat;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::math::unit_to_u8;
use crate::scene::params::Parameter;

/// A complete composition document: an output canvas and an ordered layer stack.
///
/// `layers[0]` is the topmost layer; rendering paints the last entry first.
///
/// A composition is plain data. It can be built programmatically or deserialized from JSON
/// (see [`Composition::from_reader`]); deserialization is strict and fills in every default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Composition {
    /// Optional document identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Optional human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Output canvas size.
    pub size: Canvas,
    /// Layer stack, topmost first.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Encoding used by [`crate::render_and_encode`].
    #[serde(default)]
    pub format: OutputFormat,
    /// Typed overrides, applied by [`crate::apply_parameters`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

/// One entry of a composition's layer stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Layer {
    /// Layer identifier, targeted by parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// What the layer draws.
    pub content: LayerContent,
    /// Anchor position in canvas pixels.
    #[serde(default)]
    pub position: Position,
    /// Anchor on the content box.
    #[serde(default)]
    pub origin: OriginDescriptor,
    /// Anchor on the canvas.
    #[serde(default)]
    pub alignment: OriginDescriptor,
    /// Sizing mode relative to the canvas.
    #[serde(default)]
    pub placement: Placement,
    /// Scale factors, used only with [`Placement::Custom`].
    #[serde(default)]
    pub scale: Scale,
    /// Opacity in percent (`0..=100`).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Blend mode used when compositing onto the layers below.
    #[serde(default)]
    pub blending_mode: BlendMode,
    /// Optional stencil restricting the layer's visible pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<LayerMask>,
    /// Confine this layer to the alpha of the nearest non-clipping layer beneath it.
    #[serde(default)]
    pub clipping_mask: bool,
}

fn default_opacity() -> f64 {
    100.0
}

impl Layer {
    /// A layer with default placement, full opacity and normal blending.
    pub fn new(content: LayerContent) -> Self {
        Self {
            id: None,
            name: None,
            content,
            position: Position::default(),
            origin: OriginDescriptor::default(),
            alignment: OriginDescriptor::default(),
            placement: Placement::default(),
            scale: Scale::default(),
            opacity: default_opacity(),
            blending_mode: BlendMode::default(),
            mask: None,
            clipping_mask: false,
        }
    }

    /// The placement-related fields, shared with [`LayerMask`].
    pub fn frame(&self) -> LayerFrame<'_> {
        LayerFrame {
            content: &self.content,
            position: self.position,
            origin: &self.origin,
            alignment: &self.alignment,
            placement: self.placement,
            scale: self.scale,
        }
    }
}

/// A constrained layer used only to produce an alpha stencil for its owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LayerMask {
    /// What the mask draws; its brightness becomes the stencil.
    pub content: LayerContent,
    /// Anchor position, relative to the owning layer's raster.
    #[serde(default)]
    pub position: Position,
    /// Anchor on the mask box.
    #[serde(default)]
    pub origin: OriginDescriptor,
    /// Anchor on the canvas.
    #[serde(default)]
    pub alignment: OriginDescriptor,
    /// Sizing mode relative to the canvas.
    #[serde(default)]
    pub placement: Placement,
    /// Scale factors, used only with [`Placement::Custom`].
    #[serde(default)]
    pub scale: Scale,
}

impl LayerMask {
    /// A mask with default placement.
    pub fn new(content: LayerContent) -> Self {
        Self {
            content,
            position: Position::default(),
            origin: OriginDescriptor::default(),
            alignment: OriginDescriptor::default(),
            placement: Placement::default(),
            scale: Scale::default(),
        }
    }

    /// The placement-related fields.
    pub fn frame(&self) -> LayerFrame<'_> {
        LayerFrame {
            content: &self.content,
            position: self.position,
            origin: &self.origin,
            alignment: &self.alignment,
            placement: self.placement,
            scale: self.scale,
        }
    }
}

/// Borrowed view over the fields that layers and masks share.
#[derive(Clone, Copy, Debug)]
pub struct LayerFrame<'a> {
    /// Content descriptor.
    pub content: &'a LayerContent,
    /// Anchor position.
    pub position: Position,
    /// Anchor on the content box.
    pub origin: &'a OriginDescriptor,
    /// Anchor on the canvas.
    pub alignment: &'a OriginDescriptor,
    /// Sizing mode.
    pub placement: Placement,
    /// Custom scale.
    pub scale: Scale,
}

/// Layer content, tagged by `"type"` in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerContent {
    /// Single colour filling the canvas.
    Solid(SolidContent),
    /// Linear or radial colour ramp over the canvas.
    Gradient(GradientContent),
    /// Bitmap fetched from a location.
    Image(ImageContent),
    /// Another composition, rendered recursively.
    Composition(CompositionContent),
}

impl LayerContent {
    /// Solid content of the given colour.
    pub fn solid(color: Rgba) -> Self {
        Self::Solid(SolidContent { color: Some(color) })
    }

    /// Image content at `location`.
    pub fn image(location: impl Into<String>) -> Self {
        Self::Image(ImageContent {
            location: Some(location.into()),
        })
    }

    /// Nested composition content for `name` or `name:tag`.
    pub fn composition(reference: impl Into<String>) -> Self {
        Self::Composition(CompositionContent {
            reference: Some(reference.into()),
        })
    }

    /// Short kind name, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LayerContent::Solid(_) => "solid",
            LayerContent::Gradient(_) => "gradient",
            LayerContent::Image(_) => "image",
            LayerContent::Composition(_) => "composition",
        }
    }
}

/// Solid fill. A missing colour means the layer draws nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolidContent {
    /// Fill colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
}

/// Gradient fill.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradientContent {
    /// End colours.
    #[serde(default)]
    pub color: GradientColors,
    /// End positions; missing coordinates use direction-specific defaults.
    #[serde(default)]
    pub pos: GradientPositions,
    /// Linear or radial.
    #[serde(default)]
    pub direction: GradientDirection,
}

/// Gradient end colours (black to white by default).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradientColors {
    /// Colour at the start point.
    #[serde(default = "Rgba::black")]
    pub from: Rgba,
    /// Colour at the end point.
    #[serde(default = "Rgba::white")]
    pub to: Rgba,
}

impl Default for GradientColors {
    fn default() -> Self {
        Self {
            from: Rgba::black(),
            to: Rgba::white(),
        }
    }
}

/// Gradient end points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradientPositions {
    /// Start point.
    #[serde(default)]
    pub from: GradientPoint,
    /// End point.
    #[serde(default)]
    pub to: GradientPoint,
}

/// A point whose coordinates may each be left to a default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradientPoint {
    /// X coordinate in canvas pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Y coordinate in canvas pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl GradientPoint {
    /// Fully specified point.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }
}

/// Gradient shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    /// Colour varies along the line from `pos.from` to `pos.to`.
    #[default]
    Linear,
    /// Colour varies with distance from `pos.from`; `pos.to` sets the radius.
    Radial,
}

/// Bitmap image. A missing location means the layer draws nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageContent {
    /// URL or filesystem path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Nested composition. A missing reference means the layer draws nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositionContent {
    /// `name` or `name:tag`.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Colour with 0–255 integer channels and a 0–1 alpha.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rgba {
    /// Red, `0..=255`.
    #[serde(default)]
    pub r: u8,
    /// Green, `0..=255`.
    #[serde(default)]
    pub g: u8,
    /// Blue, `0..=255`.
    #[serde(default)]
    pub b: u8,
    /// Alpha, `0..=1`.
    #[serde(default = "default_alpha")]
    pub a: f64,
}

fn default_alpha() -> f64 {
    1.0
}

impl Rgba {
    /// Build a colour.
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub fn black() -> Self {
        Self::new(0, 0, 0, 1.0)
    }

    /// Opaque white.
    pub fn white() -> Self {
        Self::new(255, 255, 255, 1.0)
    }

    /// Convert to premultiplied RGBA8.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, unit_to_u8(self.a))
    }
}

/// Anchor position in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Position {
    /// Horizontal position.
    #[serde(default)]
    pub x: f64,
    /// Vertical position.
    #[serde(default)]
    pub y: f64,
}

impl Position {
    /// Build a position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Scale factors for [`Placement::Custom`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scale {
    /// Horizontal factor.
    #[serde(default = "one")]
    pub x: f64,
    /// Vertical factor.
    #[serde(default = "one")]
    pub y: f64,
}

fn one() -> f64 {
    1.0
}

impl Default for Scale {
    fn default() -> Self {
        Self { x: 1.0, y: 1.0 }
    }
}

impl Scale {
    /// Build a scale.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `"<vertical> <horizontal>"` anchor descriptor, e.g. `"bottom right"`.
///
/// The string is kept as written; it is parsed (and rejected if malformed) during placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginDescriptor(pub String);

impl OriginDescriptor {
    /// Wrap a descriptor string.
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }

    /// The raw descriptor.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OriginDescriptor {
    fn default() -> Self {
        Self("top left".to_owned())
    }
}

/// How content is sized relative to the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Natural size times [`Layer::scale`].
    #[default]
    Custom,
    /// Uniformly scaled to cover the whole canvas.
    Cover,
    /// Uniformly scaled to fit inside the canvas.
    Fit,
    /// Stretched to exactly the canvas size.
    Stretch,
}

/// Per-channel formula combining a layer with the pixels beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Source-over.
    #[default]
    Normal,
    /// `s * d`.
    Multiply,
    /// `min(1, s + d)`.
    Add,
    /// `s + d - s * d`.
    Screen,
    /// Hard light with source and destination swapped.
    Overlay,
    /// `min(s, d)`.
    Darken,
    /// `max(s, d)`.
    Lighten,
    /// Multiply or screen, chosen by the source.
    Hardlight,
    /// `|d - s|`.
    Difference,
    /// `s + d - 2 * s * d`.
    Exclusion,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
