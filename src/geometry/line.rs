//! Line calculus used by the gradient rasterizer.
//!
//! Lines are kept in slope-intercept form `y = slope * x + intercept`. Vertical lines cannot be
//! expressed that way, so they carry an explicit `x` and report an infinite slope.

use crate::foundation::core::Point;
use crate::foundation::error::GeometryError;

/// Maximum deviation accepted by [`ensure_on_line`].
pub const ON_LINE_TOLERANCE: f64 = 1e-2;

/// Direction tag of a line, derived from the order of the two points it was built from.
///
/// "Up" means increasing `y`, "right" means increasing `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineDirection {
    /// Vertical, `y` increasing.
    Up,
    /// Vertical, `y` decreasing.
    Down,
    /// Horizontal, `x` decreasing.
    Left,
    /// Horizontal, `x` increasing.
    Right,
    /// Sloped, `y` and `x` increasing.
    UpRight,
    /// Sloped, `y` increasing and `x` decreasing.
    UpLeft,
    /// Sloped, `y` decreasing and `x` increasing.
    DownRight,
    /// Sloped, `y` and `x` decreasing.
    DownLeft,
}

impl LineDirection {
    /// `true` for [`LineDirection::Up`] / [`LineDirection::Down`].
    pub fn is_vertical(self) -> bool {
        matches!(self, LineDirection::Up | LineDirection::Down)
    }

    /// `true` for [`LineDirection::Left`] / [`LineDirection::Right`].
    pub fn is_horizontal(self) -> bool {
        matches!(self, LineDirection::Left | LineDirection::Right)
    }
}

/// A directed line, optionally bounded by an end point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineEquation {
    /// Slope; `f64::INFINITY` for vertical lines, `0.0` for horizontal ones.
    pub slope: f64,
    /// Y intercept; `0.0` for vertical lines.
    pub intercept: f64,
    /// X position, only set for vertical lines.
    pub x: Option<f64>,
    /// Direction tag.
    pub direction: LineDirection,
    /// First point the line was built from.
    pub start: Point,
    /// Second point, when the line describes a segment.
    pub end: Option<Point>,
}

impl LineEquation {
    /// `true` when the line is vertical.
    pub fn is_vertical(&self) -> bool {
        self.direction.is_vertical()
    }

    /// `true` when the line is horizontal.
    pub fn is_horizontal(&self) -> bool {
        self.direction.is_horizontal()
    }
}

/// Build the line through `p1` and `p2`, directed from `p1` towards `p2`.
pub fn line_from_points(p1: Point, p2: Point) -> Result<LineEquation, GeometryError> {
    for (name, p) in [("p1", p1), ("p2", p2)] {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(GeometryError::InvalidInput(format!(
                "{name} must have finite x and y (got {}, {})",
                p.x, p.y
            )));
        }
    }

    if p1.y == p2.y {
        return Ok(LineEquation {
            slope: 0.0,
            intercept: p1.y,
            x: None,
            direction: if p2.x > p1.x {
                LineDirection::Right
            } else {
                LineDirection::Left
            },
            start: p1,
            end: Some(p2),
        });
    }

    if p1.x == p2.x {
        return Ok(LineEquation {
            slope: f64::INFINITY,
            intercept: 0.0,
            x: Some(p1.x),
            direction: if p2.y > p1.y {
                LineDirection::Up
            } else {
                LineDirection::Down
            },
            start: p1,
            end: Some(p2),
        });
    }

    let slope = (p2.y - p1.y) / (p2.x - p1.x);
    let intercept = p1.y - slope * p1.x;
    let direction = match (p2.y > p1.y, p2.x > p1.x) {
        (true, true) => LineDirection::UpRight,
        (true, false) => LineDirection::UpLeft,
        (false, true) => LineDirection::DownRight,
        (false, false) => LineDirection::DownLeft,
    };

    Ok(LineEquation {
        slope,
        intercept,
        x: None,
        direction,
        start: p1,
        end: Some(p2),
    })
}

/// The unbounded line perpendicular to `line` passing through `point`.
pub fn perpendicular_through(line: &LineEquation, point: Point) -> LineEquation {
    if line.is_horizontal() {
        return LineEquation {
            slope: f64::INFINITY,
            intercept: 0.0,
            x: Some(point.x),
            direction: LineDirection::Down,
            start: point,
            end: None,
        };
    }

    if line.is_vertical() {
        return LineEquation {
            slope: 0.0,
            intercept: point.y,
            x: None,
            direction: LineDirection::Right,
            start: point,
            end: None,
        };
    }

    let slope = -1.0 / line.slope;
    let intercept = point.y - slope * point.x;
    LineEquation {
        slope,
        intercept,
        x: None,
        direction: if slope > 0.0 {
            LineDirection::UpRight
        } else {
            LineDirection::DownRight
        },
        start: point,
        end: None,
    }
}

/// Like [`perpendicular_through`], but first checks that `point` lies on `line`.
pub fn perpendicular_at(line: &LineEquation, point: Point) -> Result<LineEquation, GeometryError> {
    ensure_on_line(line, point)?;
    Ok(perpendicular_through(line, point))
}

/// Fail with [`GeometryError::PointNotOnLine`] when `point` is further than
/// [`ON_LINE_TOLERANCE`] from `line`.
pub fn ensure_on_line(line: &LineEquation, point: Point) -> Result<(), GeometryError> {
    let distance = match line.x {
        Some(x) if line.is_vertical() => (point.x - x).abs(),
        _ => (solve_line_at(line, point.x) - point.y).abs(),
    };
    if distance.is_nan() || distance > ON_LINE_TOLERANCE {
        return Err(GeometryError::PointNotOnLine {
            distance,
            tolerance: ON_LINE_TOLERANCE,
        });
    }
    Ok(())
}

/// Evaluate `y` at `x`. Meaningless for vertical lines; callers special-case those.
pub fn solve_line_at(line: &LineEquation, x: f64) -> f64 {
    line.slope * x + line.intercept
}

/// Intersection point of two lines.
pub fn intersect(a: &LineEquation, b: &LineEquation) -> Result<Point, GeometryError> {
    let both_vertical = a.is_vertical() && b.is_vertical();
    let both_horizontal = a.is_horizontal() && b.is_horizontal();
    let same_slope = !a.is_vertical() && !b.is_vertical() && a.slope == b.slope;
    if both_vertical || both_horizontal || same_slope {
        return Err(GeometryError::ParallelOrIdenticalLines);
    }

    if let (true, Some(x)) = (a.is_vertical(), a.x) {
        return Ok(Point::new(x, solve_line_at(b, x)));
    }
    if let (true, Some(x)) = (b.is_vertical(), b.x) {
        return Ok(Point::new(x, solve_line_at(a, x)));
    }

    let x = (b.intercept - a.intercept) / (a.slope - b.slope);
    Ok(Point::new(x, solve_line_at(a, x)))
}

/// How far `point` lies between `line.start` and `line.end`, clamped to `[0, 1]`.
///
/// Vertical lines measure along `y`, everything else along `x`. A zero-length segment yields 0.
pub fn projection_ratio(line: &LineEquation, point: Point) -> Result<f64, GeometryError> {
    let end = line.end.ok_or(GeometryError::IncompleteLine)?;

    let (offset, span) = if line.is_vertical() {
        (point.y - line.start.y, end.y - line.start.y)
    } else {
        (point.x - line.start.x, end.x - line.start.x)
    };
    if span == 0.0 {
        return Ok(0.0);
    }
    Ok(clamp(offset / span, 0.0, 1.0))
}

/// Standard clamp: `low` below the range, `high` above it, `value` otherwise.
pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    low.max(high.min(value))
}

/// Straight-line distance between two points.
pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/line.rs"]
mod tests;
