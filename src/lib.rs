//! Laminate is a declarative raster compositing engine.
//!
//! A [`Composition`] describes an output canvas and an ordered stack of layers (solid fills,
//! gradients, bitmaps, or other compositions). Rendering resolves every layer's content, sizes
//! and positions it, applies masks and clipping groups, and blends the result into a single
//! premultiplied RGBA8 [`Raster`]:
//!
//! - Load a [`Composition`] from JSON (strict, fully defaulted)
//! - Optionally [`apply_parameters`] to patch layers
//! - Build a [`RenderContext`] with an [`AssetFetcher`]
//! - Call [`process_composition`] or [`render_and_encode`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub(crate) mod assets;
pub(crate) mod content;
pub(crate) mod effects;
pub(crate) mod encode;
pub(crate) mod foundation;
pub(crate) mod geometry;
pub(crate) mod layout;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod schema;

pub use crate::foundation::core::{Canvas, Point, Rgba8Premul};
pub use crate::foundation::error::{GeometryError, LaminateError, LaminateResult};
pub use crate::foundation::raster::{Raster, ResizeFilter};

pub use crate::geometry::line::{
    LineDirection, LineEquation, ON_LINE_TOLERANCE, clamp, ensure_on_line, euclidean_distance,
    intersect, line_from_points, perpendicular_at, perpendicular_through, projection_ratio,
    solve_line_at,
};

pub use crate::scene::model::{
    BlendMode, Composition, CompositionContent, GradientColors, GradientContent,
    GradientDirection, GradientPoint, GradientPositions, ImageContent, Layer, LayerContent,
    LayerFrame, LayerMask, OriginDescriptor, Placement, Position, Rgba, Scale, SolidContent,
};
pub use crate::scene::params::{Parameter, TargetProperty, apply_parameters};

pub use crate::encode::codec::{OutputFormat, decode_raster, encode_raster};
pub use crate::layout::placement::{
    Anchor, HorizontalAnchor, PlacedRect, VerticalAnchor, resolve_placement,
};
pub use crate::effects::blend::composite_at;
pub use crate::effects::mask::{apply_alpha_stencil, apply_brightness_mask};
pub use crate::content::gradient::rasterize_gradient;

pub use crate::assets::cache::AssetCache;
pub use crate::assets::fetch::{
    AssetFetcher, CompositionRef, DEFAULT_TAG, FsFetcher, FsFetcherOpts, InMemoryFetcher,
};
#[cfg(feature = "http")]
pub use crate::assets::http::{HttpFetcher, HttpFetcherOpts};

pub use crate::render::engine::{
    DEFAULT_MAX_PIXELS, RenderContext, RenderOpts, process_composition, render_and_encode,
};
pub use crate::render::layer::{PositionedRaster, render_layer};
