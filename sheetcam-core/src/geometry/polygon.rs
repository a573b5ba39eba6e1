//! Polygon collaborator: thin wrappers over `geo` and `geo-clipper`.
//!
//! Clipping runs on integer coordinates scaled by [`CLIPPER_SCALE`], so
//! results are exact to a micron.

use geo::winding_order::{Winding, WindingOrder};
use geo::{Area, Coord, LineString, MultiPolygon, Polygon};
use geo_clipper::{Clipper, EndType, JoinType};

use super::round_point;
use crate::config::CLIPPER_SCALE;
use crate::model::Point2;

/// Corner treatment when offsetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Join {
    /// Sharp corners, limited to twice the offset.
    Miter,
    /// Arcs around convex corners.
    Round,
}

impl From<Join> for JoinType {
    fn from(j: Join) -> Self {
        match j {
            Join::Miter => JoinType::Miter(2.0),
            Join::Round => JoinType::Round(0.25),
        }
    }
}

fn to_line_string(points: &[Point2]) -> LineString<f64> {
    LineString::from(
        points
            .iter()
            .map(|p| Coord { x: p.x, y: p.y })
            .collect::<Vec<_>>(),
    )
}

/// Polygon from a ring of points, wound counter-clockwise.
pub fn to_polygon(points: &[Point2]) -> Polygon<f64> {
    Polygon::new(to_line_string(&orient(points, false)), vec![])
}

/// Polygon from an outer ring and hole rings.
///
/// Holes are wound opposite to the outer ring so offsetting treats them as holes.
pub fn polygon_with_holes(outer: &[Point2], holes: &[Vec<Point2>]) -> Polygon<f64> {
    Polygon::new(
        to_line_string(&orient(outer, false)),
        holes.iter().map(|h| to_line_string(&orient(h, true))).collect(),
    )
}

/// Axis-aligned rectangle with its minimum corner at `(x, y)`.
pub fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon<f64> {
    to_polygon(&[
        Point2::new(x, y),
        Point2::new(x + w, y),
        Point2::new(x + w, y + h),
        Point2::new(x, y + h),
        Point2::new(x, y),
    ])
}

/// Closed regular polygon approximating a circle, counter-clockwise.
pub fn circle_points(center: Point2, radius: f64, segments: usize) -> Vec<Point2> {
    let mut pts: Vec<Point2> = (0..segments)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / segments as f64;
            round_point(Point2::new(
                center.x + radius * a.cos(),
                center.y + radius * a.sin(),
            ))
        })
        .collect();
    if let Some(first) = pts.first().copied() {
        pts.push(first);
    }
    pts
}

/// Rounded points of a ring.
pub fn ring_points(ring: &LineString<f64>) -> Vec<Point2> {
    ring.coords()
        .map(|c| round_point(Point2::new(c.x, c.y)))
        .collect()
}

/// Signed enclosed area, positive for counter-clockwise rings.
pub fn signed_ring_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    Polygon::new(to_line_string(points), vec![]).signed_area()
}

/// Unsigned enclosed area of a ring.
pub fn ring_area(points: &[Point2]) -> f64 {
    signed_ring_area(points).abs()
}

/// Return the ring wound clockwise or counter-clockwise.
///
/// Degenerate rings without a winding order come back unchanged.
pub fn orient(points: &[Point2], clockwise: bool) -> Vec<Point2> {
    let mut ring = to_line_string(points);
    ring.close();
    let wanted = if clockwise {
        WindingOrder::Clockwise
    } else {
        WindingOrder::CounterClockwise
    };
    let mut out = points.to_vec();
    if matches!(ring.winding_order(), Some(order) if order != wanted) {
        out.reverse();
    }
    out
}

/// Offset a polygon outward (positive) or inward (negative).
pub fn buffer(poly: &Polygon<f64>, delta: f64, join: Join) -> MultiPolygon<f64> {
    poly.offset(delta, join.into(), EndType::ClosedPolygon, CLIPPER_SCALE)
}

/// Offset every polygon of a set.
pub fn buffer_multi(polys: &MultiPolygon<f64>, delta: f64, join: Join) -> MultiPolygon<f64> {
    polys.offset(delta, join.into(), EndType::ClosedPolygon, CLIPPER_SCALE)
}

/// Region of `a` not covered by `b`.
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    a.difference(b, CLIPPER_SCALE)
}

/// Union of all polygons in a set.
pub fn union_all(polys: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut iter = polys.into_iter();
    let Some(first) = iter.next() else {
        return MultiPolygon::new(vec![]);
    };
    iter.fold(MultiPolygon::new(vec![first]), |acc, p| {
        acc.union(&p, CLIPPER_SCALE)
    })
}
