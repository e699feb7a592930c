use super::*;
use crate::foundation::core::Rgba8Premul;

fn opaque(v: u8) -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(v, v, v, 255)
}

#[test]
fn white_keeps_black_removes_and_grey_halves() {
    let red = Rgba8Premul::from_straight_rgba(255, 0, 0, 255);
    let mut content = Raster::filled(3, 1, red).unwrap();
    let mut mask = Raster::new(3, 1).unwrap();
    mask.put_pixel(0, 0, opaque(255));
    mask.put_pixel(1, 0, opaque(0));
    mask.put_pixel(2, 0, opaque(128));

    apply_brightness_mask(&mut content, &mask, 0, 0);
    assert_eq!(content.pixel(0, 0), Some(red));
    assert_eq!(content.pixel(1, 0), Some(Rgba8Premul::transparent()));
    assert_eq!(
        content.pixel(2, 0),
        Some(Rgba8Premul {
            r: 128,
            g: 0,
            b: 0,
            a: 128
        })
    );
}

#[test]
fn transparent_mask_pixels_remove_content() {
    let mut content = Raster::filled(1, 1, opaque(200)).unwrap();
    let mask = Raster::new(1, 1).unwrap();
    apply_brightness_mask(&mut content, &mask, 0, 0);
    assert_eq!(content.pixel(0, 0), Some(Rgba8Premul::transparent()));
}

#[test]
fn pixels_outside_the_mask_footprint_are_untouched() {
    let px = opaque(90);
    let mut content = Raster::filled(4, 4, px).unwrap();
    let mask = Raster::filled(2, 2, opaque(0)).unwrap();
    apply_brightness_mask(&mut content, &mask, 1, 1);

    for y in 0..4 {
        for x in 0..4 {
            let inside = (1..3).contains(&x) && (1..3).contains(&y);
            let expected = if inside { Rgba8Premul::transparent() } else { px };
            assert_eq!(content.pixel(x, y), Some(expected), "({x}, {y})");
        }
    }
}

#[test]
fn alpha_stencil_uses_base_alpha_and_clears_the_rest() {
    let mut target = Raster::filled(4, 2, opaque(255)).unwrap();
    let mut base = Raster::new(2, 1).unwrap();
    // Base colour does not matter, only its alpha.
    base.put_pixel(0, 0, Rgba8Premul::from_straight_rgba(0, 0, 0, 255));
    base.put_pixel(1, 0, Rgba8Premul::from_straight_rgba(10, 200, 30, 51));

    apply_alpha_stencil(&mut target, &base, 1, 1);

    assert_eq!(target.pixel(1, 1), Some(opaque(255)));
    assert_eq!(
        target.pixel(2, 1),
        Some(Rgba8Premul {
            r: 51,
            g: 51,
            b: 51,
            a: 51
        })
    );
    for (x, y) in [(0, 0), (1, 0), (2, 0), (3, 0), (0, 1), (3, 1)] {
        assert_eq!(target.pixel(x, y), Some(Rgba8Premul::transparent()), "({x}, {y})");
    }
}

#[test]
fn alpha_stencil_handles_negative_offsets() {
    let mut target = Raster::filled(2, 2, opaque(255)).unwrap();
    let base = Raster::filled(2, 2, opaque(0)).unwrap();
    apply_alpha_stencil(&mut target, &base, -1, -1);
    assert_eq!(target.pixel(0, 0), Some(opaque(255)));
    assert_eq!(target.pixel(1, 1), Some(Rgba8Premul::transparent()));
}
