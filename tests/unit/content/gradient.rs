use super::*;
use crate::geometry::line::LineDirection;
use crate::scene::model::{GradientColors, GradientPositions};

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn gradient(from: Rgba, to: Rgba, pos: GradientPositions, direction: GradientDirection) -> GradientContent {
    GradientContent {
        color: GradientColors { from, to },
        pos,
        direction,
    }
}

fn straight(r: &Raster, x: u32, y: u32) -> [u8; 4] {
    r.pixel(x, y).unwrap().to_straight_rgba()
}

fn close(a: [u8; 4], b: [u8; 4], tol: u8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tol)
}

#[test]
fn default_linear_runs_top_to_bottom() {
    let g = gradient(
        Rgba::new(0, 0, 255, 1.0),
        Rgba::new(255, 122, 0, 1.0),
        GradientPositions::default(),
        GradientDirection::Linear,
    );
    let r = rasterize_gradient(&g, canvas(200, 100), false).unwrap();
    assert_eq!(straight(&r, 0, 0), [0, 0, 255, 255]);
    assert!(close(straight(&r, 199, 99), [255, 122, 0, 255], 3));

    // Vertical line: every row is uniform.
    for y in [0, 37, 99] {
        let first = r.pixel(0, y).unwrap();
        assert!((0..200).all(|x| r.pixel(x, y) == Some(first)));
    }
}

#[test]
fn horizontal_midpoint_is_half_way() {
    let g = gradient(
        Rgba::black(),
        Rgba::white(),
        GradientPositions {
            from: GradientPoint::at(0.0, 0.0),
            to: GradientPoint::at(10.0, 0.0),
        },
        GradientDirection::Linear,
    );
    let r = rasterize_gradient(&g, canvas(11, 2), false).unwrap();
    assert_eq!(straight(&r, 0, 1), [0, 0, 0, 255]);
    assert_eq!(straight(&r, 5, 1), [128, 128, 128, 255]);
    assert_eq!(straight(&r, 10, 0), [255, 255, 255, 255]);
}

#[test]
fn diagonal_gradient_is_monotonic_and_passes_strict_checks() {
    let g = gradient(
        Rgba::black(),
        Rgba::white(),
        GradientPositions {
            from: GradientPoint::at(0.0, 0.0),
            to: GradientPoint::at(30.0, 20.0),
        },
        GradientDirection::Linear,
    );
    let r = rasterize_gradient(&g, canvas(31, 21), true).unwrap();
    let mut last = 0u8;
    for i in 0..=20 {
        let v = r.pixel(i, i).unwrap().r;
        assert!(v >= last);
        last = v;
    }
    assert_eq!(r.pixel(0, 0).unwrap().r, 0);
    assert_eq!(r.pixel(30, 20).unwrap().r, 255);
}

#[test]
fn identical_end_points_paint_the_start_colour() {
    let g = gradient(
        Rgba::new(9, 9, 9, 1.0),
        Rgba::white(),
        GradientPositions {
            from: GradientPoint::at(3.0, 3.0),
            to: GradientPoint::at(3.0, 3.0),
        },
        GradientDirection::Linear,
    );
    let r = rasterize_gradient(&g, canvas(6, 6), false).unwrap();
    assert!(r.data.chunks_exact(4).all(|c| c == [9, 9, 9, 255]));

    let radial = GradientContent {
        direction: GradientDirection::Radial,
        ..g
    };
    let r = rasterize_gradient(&radial, canvas(6, 6), false).unwrap();
    assert!(r.data.chunks_exact(4).all(|c| c == [9, 9, 9, 255]));
}

#[test]
fn radial_defaults_to_centre_and_clamps_beyond_radius() {
    let g = gradient(
        Rgba::white(),
        Rgba::black(),
        GradientPositions::default(),
        GradientDirection::Radial,
    );
    let r = rasterize_gradient(&g, canvas(20, 20), false).unwrap();
    assert_eq!(straight(&r, 10, 10), [255, 255, 255, 255]);
    // Distance 10 of radius ~14.14.
    let edge = straight(&r, 0, 10)[0];
    assert!((70..=80).contains(&edge), "{edge}");

    let small = gradient(
        Rgba::white(),
        Rgba::black(),
        GradientPositions {
            from: GradientPoint::default(),
            to: GradientPoint::at(12.0, 10.0),
        },
        GradientDirection::Radial,
    );
    let r = rasterize_gradient(&small, canvas(20, 20), false).unwrap();
    assert_eq!(straight(&r, 0, 0), [0, 0, 0, 255]);
}

#[test]
fn alpha_is_interpolated_and_premultiplied() {
    let g = gradient(
        Rgba::new(255, 255, 255, 0.0),
        Rgba::new(255, 255, 255, 1.0),
        GradientPositions {
            from: GradientPoint::at(0.0, 0.0),
            to: GradientPoint::at(2.0, 0.0),
        },
        GradientDirection::Linear,
    );
    let r = rasterize_gradient(&g, canvas(3, 1), false).unwrap();
    assert_eq!(r.pixel(0, 0), Some(Rgba8Premul::transparent()));
    assert_eq!(
        r.pixel(1, 0),
        Some(Rgba8Premul {
            r: 128,
            g: 128,
            b: 128,
            a: 128
        })
    );
    assert_eq!(r.pixel(2, 0).unwrap().a, 255);
}

#[test]
fn non_finite_points_are_geometry_errors() {
    let g = gradient(
        Rgba::black(),
        Rgba::white(),
        GradientPositions {
            from: GradientPoint::at(f64::NAN, 0.0),
            to: GradientPoint::default(),
        },
        GradientDirection::Linear,
    );
    let err = rasterize_gradient(&g, canvas(2, 2), false).unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::LaminateError::Geometry(GeometryError::InvalidInput(_))
    ));
}

#[test]
fn strict_projection_rejects_a_perpendicular_that_misses_the_pixel() {
    let line = line_from_points(Point::new(0.0, 0.0), Point::new(3.0, 1000.0)).unwrap();
    let pixel = Point::new(2.0, 5.0);
    let bogus = LineEquation {
        slope: 7.0,
        intercept: -12345.0,
        x: None,
        direction: LineDirection::UpRight,
        start: pixel,
        end: None,
    };

    let err = project(&line, &bogus, pixel, true).unwrap_err();
    assert!(matches!(err, GeometryError::PointNotOnLine { .. }));
    // Unchecked, the bogus perpendicular still yields a ratio.
    assert!(project(&line, &bogus, pixel, false).is_ok());
}

#[test]
fn strict_projection_accepts_the_true_perpendicular() {
    let line = line_from_points(Point::new(0.0, 0.0), Point::new(3.0, 1000.0)).unwrap();
    let pixel = Point::new(2.0, 5.0);
    let perpendicular = perpendicular_through(&line, pixel);
    let ratio = project(&line, &perpendicular, pixel, true).unwrap();
    assert!((0.0..=1.0).contains(&ratio));
}
