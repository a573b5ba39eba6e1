//! Pocket clearing patterns.

use geo::{Area, BoundingRect, MultiPolygon};

use crate::geometry::polygon::{self, Join};
use crate::geometry::round4;
use crate::model::Point2;

/// Region the tool center may reach: the pocket inset by the tool radius.
fn reachable(boundary: &[Point2], islands: &[Vec<Point2>], tool_diameter: f64) -> MultiPolygon<f64> {
    let pocket = polygon::polygon_with_holes(boundary, islands);
    polygon::buffer(&pocket, -tool_diameter / 2.0, Join::Miter)
}

/// Successive inward offsets of the pocket boundary.
///
/// Starts with a half-diameter inset and steps inward by
/// `tool_diameter × stepover` until nothing is left. Rings around islands are
/// included.
pub fn contour_parallel(
    boundary: &[Point2],
    islands: &[Vec<Point2>],
    tool_diameter: f64,
    stepover: f64,
) -> Vec<Vec<Point2>> {
    let step = tool_diameter * stepover;
    let mut rings = Vec::new();
    let mut current = reachable(boundary, islands, tool_diameter);

    while !current.0.is_empty() && current.unsigned_area() > 0.0 {
        for poly in &current.0 {
            rings.extend(
                std::iter::once(poly.exterior())
                    .chain(poly.interiors())
                    .map(polygon::ring_points)
                    .filter(|r| r.len() >= 3),
            );
        }
        if step <= 0.0 {
            break;
        }
        current = polygon::buffer_multi(&current, -step, Join::Miter);
    }
    rings
}

/// X positions where the horizontal line `y` crosses the region's edges.
fn scanline_crossings(region: &MultiPolygon<f64>, y: f64) -> Vec<f64> {
    let mut xs = Vec::new();
    for poly in &region.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            for line in ring.lines() {
                let (a, b) = (line.start, line.end);
                if (a.y <= y && b.y > y) || (b.y <= y && a.y > y) {
                    xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
        }
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Alternating-direction horizontal scanlines across the reachable region.
///
/// Lines are spaced `tool_diameter × stepover` apart, starting half a step
/// above the bottom of the region. Each inside span is its own segment.
pub fn raster(
    boundary: &[Point2],
    islands: &[Vec<Point2>],
    tool_diameter: f64,
    stepover: f64,
) -> Vec<Vec<Point2>> {
    let step = tool_diameter * stepover;
    let region = reachable(boundary, islands, tool_diameter);
    let Some(bounds) = region.bounding_rect() else {
        return Vec::new();
    };
    if step <= 0.0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut left_to_right = true;
    let mut y = bounds.min().y + step / 2.0;
    while y <= bounds.max().y - step / 2.0 + 0.001 {
        let xs = scanline_crossings(&region, y);
        let mut spans: Vec<Vec<Point2>> = xs
            .chunks_exact(2)
            .map(|pair| {
                vec![
                    Point2::new(round4(pair[0]), round4(y)),
                    Point2::new(round4(pair[1]), round4(y)),
                ]
            })
            .collect();
        if !left_to_right {
            spans.reverse();
            for span in &mut spans {
                span.reverse();
            }
        }
        lines.extend(spans);
        left_to_right = !left_to_right;
        y += step;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::transform::Extents;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x, y),
            Point2::new(x + size, y),
            Point2::new(x + size, y + size),
            Point2::new(x, y + size),
            Point2::new(x, y),
        ]
    }

    // ==================== contour-parallel tests ====================

    #[test]
    fn test_first_ring_is_half_diameter_inset() {
        let rings = contour_parallel(&square(0.0, 0.0, 40.0), &[], 6.0, 0.5);
        assert!(rings.len() >= 2);
        let e = Extents::of(&rings[0]).unwrap();
        assert!((e.min_x - 3.0).abs() < 1e-3);
        assert!((e.width() - 34.0).abs() < 1e-3);
        let second = Extents::of(&rings[1]).unwrap();
        assert!((second.min_x - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_pocket_narrower_than_tool_is_empty() {
        assert!(contour_parallel(&square(0.0, 0.0, 5.0), &[], 6.0, 0.5).is_empty());
        assert!(raster(&square(0.0, 0.0, 5.0), &[], 6.0, 0.5).is_empty());
    }

    // ==================== raster tests ====================

    #[test]
    fn test_raster_alternates_direction() {
        let lines = raster(&square(0.0, 0.0, 40.0), &[], 6.0, 0.5);
        assert!(lines.len() >= 3);
        assert!(lines[0][0].x < lines[0][1].x);
        assert!(lines[1][0].x > lines[1][1].x);
        assert!((lines[0][0].y - 4.5).abs() < 1e-3);
        assert!((lines[1][0].y - 7.5).abs() < 1e-3);
        for l in &lines {
            assert!(l[0].y <= 37.0 + 1e-3);
        }
    }

    #[test]
    fn test_raster_splits_around_island() {
        let lines = raster(
            &square(0.0, 0.0, 60.0),
            &[square(20.0, 20.0, 20.0)],
            6.0,
            0.5,
        );
        let at_middle: Vec<_> = lines.iter().filter(|l| (l[0].y - 30.0).abs() < 1.6).collect();
        assert!(!at_middle.is_empty());
        assert!(at_middle.len() >= 2);
    }
}
