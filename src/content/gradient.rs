//! Gradient rasterizer.
//!
//! Linear gradients project every pixel onto the gradient line (through the perpendicular that
//! passes the pixel) and use the projection ratio along the segment. Radial gradients use the
//! distance from the start point relative to the start-end distance. Rows are rasterized in
//! parallel; the output is identical to a sequential pass.

use rayon::prelude::*;

use crate::foundation::core::{Canvas, Point, Rgba8Premul};
use crate::foundation::error::{GeometryError, LaminateResult};
use crate::foundation::math::{channel_to_u8, unit_to_u8};
use crate::foundation::raster::Raster;
use crate::geometry::line::{
    LineEquation, clamp, ensure_on_line, euclidean_distance, intersect, line_from_points,
    perpendicular_through, projection_ratio,
};
use crate::scene::model::{GradientContent, GradientDirection, GradientPoint, Rgba};

/// Rasterize `gradient` over the whole canvas.
///
/// With `strict` set, every perpendicular must pass through its pixel and every projected point
/// must lie on both the gradient line and the perpendicular; a deviation fails with
/// [`GeometryError::PointNotOnLine`].
pub fn rasterize_gradient(
    gradient: &GradientContent,
    canvas: Canvas,
    strict: bool,
) -> LaminateResult<Raster> {
    let mut raster = Raster::new(canvas.width, canvas.height)?;
    let row_len = (canvas.width as usize) * 4;
    let from = gradient.color.from;
    let to = gradient.color.to;

    match gradient.direction {
        GradientDirection::Linear => {
            let start = resolve_point(gradient.pos.from, Point::new(0.0, 0.0));
            let end = resolve_point(gradient.pos.to, Point::new(0.0, canvas.height_f64()));
            let line = line_from_points(start, end)?;

            raster
                .data
                .par_chunks_mut(row_len)
                .enumerate()
                .try_for_each(|(y, row)| -> Result<(), GeometryError> {
                    for (x, px) in row.chunks_exact_mut(4).enumerate() {
                        let p = Point::new(x as f64, y as f64);
                        let perpendicular = perpendicular_through(&line, p);
                        let ratio = project(&line, &perpendicular, p, strict)?;
                        px.copy_from_slice(&lerp_color(from, to, ratio).to_array());
                    }
                    Ok(())
                })?;
        }
        GradientDirection::Radial => {
            let center = resolve_point(gradient.pos.from, canvas.center());
            let edge = resolve_point(
                gradient.pos.to,
                Point::new(canvas.width_f64(), canvas.height_f64()),
            );
            let radius = euclidean_distance(center, edge);

            raster
                .data
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| {
                    for (x, px) in row.chunks_exact_mut(4).enumerate() {
                        let d = euclidean_distance(center, Point::new(x as f64, y as f64));
                        let ratio = if radius > 0.0 {
                            clamp(d / radius, 0.0, 1.0)
                        } else {
                            0.0
                        };
                        px.copy_from_slice(&lerp_color(from, to, ratio).to_array());
                    }
                });
        }
    }

    Ok(raster)
}

/// Ratio along `line` of the point where `perpendicular` (the line through `pixel`) meets it.
fn project(
    line: &LineEquation,
    perpendicular: &LineEquation,
    pixel: Point,
    strict: bool,
) -> Result<f64, GeometryError> {
    let hit = intersect(line, perpendicular)?;
    if strict {
        ensure_on_line(perpendicular, pixel)?;
        ensure_on_line(line, hit)?;
        ensure_on_line(perpendicular, hit)?;
    }
    projection_ratio(line, hit)
}

fn resolve_point(p: GradientPoint, default: Point) -> Point {
    Point::new(p.x.unwrap_or(default.x), p.y.unwrap_or(default.y))
}

fn lerp_color(from: Rgba, to: Rgba, t: f64) -> Rgba8Premul {
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    Rgba8Premul::from_straight_rgba(
        channel_to_u8(lerp(f64::from(from.r), f64::from(to.r))),
        channel_to_u8(lerp(f64::from(from.g), f64::from(to.g))),
        channel_to_u8(lerp(f64::from(from.b), f64::from(to.b))),
        unit_to_u8(lerp(from.a, to.a)),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/content/gradient.rs"]
mod tests;
