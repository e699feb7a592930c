use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(200, 100).unwrap();
    assert_eq!(c.center(), Point::new(100.0, 50.0));
}

#[test]
fn premul_roundtrip_is_identity_for_opaque_and_transparent() {
    let opaque = Rgba8Premul::from_straight_rgba(12, 200, 99, 255);
    assert_eq!(opaque.to_straight_rgba(), [12, 200, 99, 255]);

    let clear = Rgba8Premul::from_straight_rgba(12, 200, 99, 0);
    assert_eq!(clear, Rgba8Premul::transparent());
    assert_eq!(clear.to_straight_rgba(), [0, 0, 0, 0]);
}

#[test]
fn premul_half_alpha_halves_channels() {
    let px = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(px.to_array(), [128, 64, 0, 128]);
}
