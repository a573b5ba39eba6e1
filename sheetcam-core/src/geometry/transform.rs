//! Placement transforms.
//!
//! Rotation goes through `geo`'s [`Rotate`], the same call the nesting engine
//! and the placement validator use, so all three agree on a pose.

use geo::{BoundingRect, Coord, MultiPoint, Point, Rotate};

use super::round_point;
use crate::model::{Point2, Rotation};

/// Axis-aligned extents of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extents {
    /// Extents of all points, or `None` when there are none.
    pub fn of<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let rect = to_multi_point(points).bounding_rect()?;
        Some(Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

fn to_multi_point<'a>(points: impl IntoIterator<Item = &'a Point2>) -> MultiPoint<f64> {
    points
        .into_iter()
        .map(|p| Point::from(Coord { x: p.x, y: p.y }))
        .collect()
}

/// Rotate points counter-clockwise by `degrees` about `pivot`.
pub fn rotate_points(points: &[Point2], degrees: f64, pivot: Point2) -> Vec<Point2> {
    if degrees == 0.0 {
        return points.to_vec();
    }
    to_multi_point(points)
        .rotate_around_point(degrees, Point::new(pivot.x, pivot.y))
        .iter()
        .map(|p| Point2::new(p.x(), p.y()))
        .collect()
}

/// Rotate about `pivot`, then translate by `(dx, dy)`, rounding the result.
///
/// Works for any number of points, single drill centers included.
pub fn transform_points(
    points: &[Point2],
    rotation: Rotation,
    pivot: Point2,
    dx: f64,
    dy: f64,
) -> Vec<Point2> {
    rotate_points(points, rotation.as_f64(), pivot)
        .into_iter()
        .map(|p| round_point(Point2::new(p.x + dx, p.y + dy)))
        .collect()
}
