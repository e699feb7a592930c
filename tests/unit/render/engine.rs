use super::*;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::LaminateError;
use crate::scene::model::{LayerContent, Rgba};

fn rgb(r: u8, g: u8, b: u8) -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(r, g, b, 255)
}

fn rendered(raster: Raster, x: i64, y: i64, clipping: bool) -> RenderedLayer {
    RenderedLayer {
        placed: PositionedRaster { raster, x, y },
        blend: BlendMode::Normal,
        opacity: 1.0,
        clipping,
    }
}

fn composite(layers: &[RenderedLayer]) -> Raster {
    let mut out = Raster::new(4, 4).unwrap();
    composite_layers(&mut out, layers).unwrap();
    out
}

#[test]
fn default_opts() {
    let opts = RenderOpts::default();
    assert_eq!(opts.resize_filter, ResizeFilter::Bilinear);
    assert_eq!(opts.max_nesting_depth, 8);
    assert!(!opts.concurrent_layers);
    assert!(!opts.strict_geometry);
    assert_eq!(opts.max_pixels, DEFAULT_MAX_PIXELS);
}

#[test]
fn clones_share_the_cache_unless_replaced() {
    let ctx = RenderContext::default();
    let clone = ctx.clone();
    ctx.cache()
        .insert("a", Arc::new(Raster::new(1, 1).unwrap()));
    assert!(clone.cache().contains("a"));

    let isolated = ctx.clone().with_cache(Arc::new(AssetCache::new()));
    assert!(!isolated.cache().contains("a"));
}

#[test]
fn clipper_without_base_composites_directly() {
    let blue = Raster::filled(2, 2, rgb(0, 0, 255)).unwrap();
    let clipped = composite(&[rendered(blue.clone(), 1, 1, true)]);
    let plain = composite(&[rendered(blue, 1, 1, false)]);
    assert_eq!(clipped, plain);
}

#[test]
fn every_baseless_clipper_is_drawn() {
    let out = composite(&[
        rendered(Raster::filled(1, 1, rgb(255, 0, 0)).unwrap(), 0, 0, true),
        rendered(Raster::filled(1, 1, rgb(0, 255, 0)).unwrap(), 3, 3, true),
    ]);
    assert_eq!(out.pixel(0, 0), Some(rgb(255, 0, 0)));
    assert_eq!(out.pixel(3, 3), Some(rgb(0, 255, 0)));
}

#[test]
fn clippers_are_confined_to_the_base_footprint() {
    let out = composite(&[
        rendered(Raster::filled(2, 2, rgb(255, 0, 0)).unwrap(), 2, 2, false),
        rendered(Raster::filled(4, 4, rgb(0, 0, 255)).unwrap(), 0, 0, true),
    ]);
    assert_eq!(out.pixel(0, 0), Some(Rgba8Premul::transparent()));
    assert_eq!(out.pixel(1, 3), Some(Rgba8Premul::transparent()));
    assert_eq!(out.pixel(2, 2), Some(rgb(0, 0, 255)));
    assert_eq!(out.pixel(3, 3), Some(rgb(0, 0, 255)));
}

#[test]
fn group_uses_the_top_clipper_opacity_and_blend() {
    let base = rendered(Raster::filled(4, 4, rgb(255, 0, 0)).unwrap(), 0, 0, false);
    let lower = rendered(Raster::filled(4, 4, rgb(0, 0, 255)).unwrap(), 0, 0, true);
    let mut top = rendered(Raster::filled(4, 4, rgb(0, 255, 0)).unwrap(), 0, 0, true);
    top.opacity = 0.5;

    let out = composite(&[base, lower, top]);
    let px = out.pixel(1, 1).unwrap();
    // The merged group lands at half opacity onto an empty canvas.
    assert!((127..=128).contains(&px.a), "{px:?}");
    assert_eq!(px.r, 0);
    assert!(px.g > 0 && px.b > 0);
}

#[test]
fn non_clipping_layers_after_a_group_paint_normally() {
    let out = composite(&[
        rendered(Raster::filled(1, 1, rgb(255, 0, 0)).unwrap(), 0, 0, false),
        rendered(Raster::filled(4, 4, rgb(0, 0, 255)).unwrap(), 0, 0, true),
        rendered(Raster::filled(1, 1, rgb(0, 255, 0)).unwrap(), 3, 3, false),
    ]);
    assert_eq!(out.pixel(0, 0), Some(rgb(0, 0, 255)));
    assert_eq!(out.pixel(1, 1), Some(Rgba8Premul::transparent()));
    assert_eq!(out.pixel(3, 3), Some(rgb(0, 255, 0)));
}

fn two_layer_doc() -> Composition {
    let mut back = Layer::new(LayerContent::solid(Rgba::new(255, 0, 0, 1.0)));
    back.id = Some("back".into());
    let mut front = Layer::new(LayerContent::solid(Rgba::new(0, 0, 255, 1.0)));
    front.id = Some("front".into());
    front.scale = crate::scene::model::Scale::new(0.5, 0.5);
    Composition {
        id: None,
        name: None,
        size: Canvas::new(4, 4).unwrap(),
        layers: vec![front, back],
        format: Default::default(),
        parameters: Vec::new(),
    }
}

#[tokio::test]
async fn first_layer_is_painted_last() {
    let out = process_composition(&RenderContext::default(), &two_layer_doc())
        .await
        .unwrap();
    assert_eq!(out.pixel(0, 0), Some(rgb(0, 0, 255)));
    assert_eq!(out.pixel(3, 3), Some(rgb(255, 0, 0)));
}

#[tokio::test]
async fn concurrent_resolution_keeps_paint_order() {
    let doc = two_layer_doc();
    let sequential = process_composition(&RenderContext::default(), &doc)
        .await
        .unwrap();
    let ctx = RenderContext::default().with_opts(RenderOpts {
        concurrent_layers: true,
        ..RenderOpts::default()
    });
    let concurrent = process_composition(&ctx, &doc).await.unwrap();
    assert_eq!(sequential, concurrent);
}

#[tokio::test]
async fn invalid_documents_never_render() {
    let mut doc = two_layer_doc();
    doc.layers[0].opacity = 150.0;
    let err = process_composition(&RenderContext::default(), &doc)
        .await
        .unwrap_err();
    assert!(matches!(err, LaminateError::Validation(_)));
}

#[tokio::test]
async fn render_and_encode_uses_the_document_format() {
    let bytes = render_and_encode(&RenderContext::default(), &two_layer_doc())
        .await
        .unwrap();
    assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn canvas_over_the_pixel_limit_is_refused() {
    let ctx = RenderContext::default().with_opts(RenderOpts {
        max_pixels: 15,
        ..RenderOpts::default()
    });
    let err = process_composition(&ctx, &two_layer_doc())
        .await
        .unwrap_err();
    assert!(matches!(err, LaminateError::CompositeOperation(_)));
}

#[tokio::test]
async fn canvas_at_the_pixel_limit_renders() {
    let ctx = RenderContext::default().with_opts(RenderOpts {
        max_pixels: 16,
        ..RenderOpts::default()
    });
    let out = process_composition(&ctx, &two_layer_doc()).await.unwrap();
    assert_eq!((out.width, out.height), (4, 4));
}
