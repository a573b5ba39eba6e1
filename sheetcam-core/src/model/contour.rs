//! 2D contours produced by the detector.

use serde::{Deserialize, Serialize};

/// A 2D point in millimeters.
///
/// Serialized as a bare `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    pub fn distance_to(&self, other: &Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl From<[f64; 2]> for Point2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2> for [f64; 2] {
    fn from(p: Point2) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Role of a contour inside an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourKind {
    /// Outer boundary of a part.
    Exterior,
    /// Through-cutout inside a part (or an island inside a pocket).
    Interior,
    /// Boundary of a blind pocket.
    Pocket,
    /// Single-point drill center.
    DrillCenter,
}

/// Ordered 2D boundary points of one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Contour identifier, unique within its operation.
    pub id: String,
    /// Role of the contour.
    #[serde(rename = "type")]
    pub kind: ContourKind,
    /// Points; closed contours repeat the first point at the end.
    pub coords: Vec<Point2>,
    /// Whether the path returns to its start.
    pub closed: bool,
}

impl Contour {
    /// Create a closed contour, appending the first point if needed.
    pub fn closed(id: impl Into<String>, kind: ContourKind, mut coords: Vec<Point2>) -> Self {
        if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
            if first != last {
                coords.push(first);
            }
        }
        Self {
            id: id.into(),
            kind,
            coords,
            closed: true,
        }
    }

    /// Create a single-point drill center contour.
    pub fn drill_center(id: impl Into<String>, center: Point2) -> Self {
        Self {
            id: id.into(),
            kind: ContourKind::DrillCenter,
            coords: vec![center],
            closed: false,
        }
    }

    /// Check whether this contour cuts an interior feature.
    pub fn is_interior(&self) -> bool {
        self.kind == ContourKind::Interior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point2::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
        let back: Point2 = serde_json::from_str("[3.0, 4.0]").unwrap();
        assert_eq!(back, Point2::new(3.0, 4.0));
    }

    #[test]
    fn test_closed_contour_repeats_first_point() {
        let c = Contour::closed(
            "c1",
            ContourKind::Exterior,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 5.0),
            ],
        );
        assert_eq!(c.coords.len(), 4);
        assert_eq!(c.coords[0], c.coords[3]);
    }

    #[test]
    fn test_contour_kind_json_tag() {
        let c = Contour::drill_center("d1", Point2::new(5.0, 5.0));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "drill_center");
        assert_eq!(json["closed"], false);
    }
}
