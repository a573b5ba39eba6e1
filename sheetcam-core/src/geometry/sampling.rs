//! Wire sampling.
//!
//! The CAD kernel hands over cross-section wires as sequences of analytic
//! edges. Everything downstream works on point lists, so each wire is sampled
//! exactly once at the kernel boundary.

use serde::{Deserialize, Serialize};

use super::round_point;
use crate::model::Point2;

/// Edges shorter than this are ignored.
const MIN_EDGE_LENGTH: f64 = 0.001;

/// One edge of a kernel wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEdge {
    /// Straight segment.
    Line { start: Point2, end: Point2 },
    /// Circular arc swept counter-clockwise from `start_angle` to `end_angle`
    /// (degrees); a negative sweep runs clockwise.
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    /// Already discretized chain; its vertices are kept as-is.
    Polyline { points: Vec<Point2> },
}

impl WireEdge {
    /// Full circle edge.
    pub fn circle(center: Point2, radius: f64) -> Self {
        WireEdge::Arc {
            center,
            radius,
            start_angle: 0.0,
            end_angle: 360.0,
        }
    }

    /// Arc length of the edge.
    pub fn length(&self) -> f64 {
        match self {
            WireEdge::Line { start, end } => start.distance_to(end),
            WireEdge::Arc {
                radius,
                start_angle,
                end_angle,
                ..
            } => (end_angle - start_angle).to_radians().abs() * radius,
            WireEdge::Polyline { points } => points
                .windows(2)
                .map(|w| w[0].distance_to(&w[1]))
                .sum(),
        }
    }

    /// Point at normalized parameter `t` in [0, 1].
    pub fn position_at(&self, t: f64) -> Point2 {
        match self {
            WireEdge::Line { start, end } => Point2::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
            ),
            WireEdge::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let a = (start_angle + (end_angle - start_angle) * t).to_radians();
                Point2::new(center.x + radius * a.cos(), center.y + radius * a.sin())
            }
            WireEdge::Polyline { points } => {
                let target = self.length() * t;
                let mut walked = 0.0;
                for w in points.windows(2) {
                    let seg = w[0].distance_to(&w[1]);
                    if seg > 0.0 && walked + seg >= target {
                        let f = (target - walked) / seg;
                        return Point2::new(
                            w[0].x + (w[1].x - w[0].x) * f,
                            w[0].y + (w[1].y - w[0].y) * f,
                        );
                    }
                    walked += seg;
                }
                points.last().copied().unwrap_or_default()
            }
        }
    }
}

/// How densely to sample a wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SampleMode {
    /// Distribute `num_points` over the wire by edge-length ratio.
    Proportional { num_points: usize },
    /// Roughly one point every `step` mm.
    Resolution { step: f64 },
}

impl Default for SampleMode {
    fn default() -> Self {
        SampleMode::Proportional { num_points: 100 }
    }
}

/// Sample a wire into a closed point list.
///
/// Each line or arc edge contributes at least two points starting at its
/// start; polylines contribute their own vertices. The result repeats the
/// first point at the end when it is not empty.
pub fn sample_wire(edges: &[WireEdge], mode: SampleMode) -> Vec<Point2> {
    let wire_length: f64 = edges.iter().map(WireEdge::length).sum();
    let mut coords: Vec<Point2> = Vec::new();

    for edge in edges {
        let length = edge.length();
        if length < MIN_EDGE_LENGTH {
            continue;
        }

        if let WireEdge::Polyline { points } = edge {
            let n = points.len().saturating_sub(1);
            coords.extend(points[..n].iter().copied().map(round_point));
            continue;
        }

        let n = match mode {
            SampleMode::Proportional { num_points } => {
                ((num_points as f64 * length / wire_length) as usize).max(2)
            }
            SampleMode::Resolution { step } if step > 0.0 => ((length / step) as usize).max(2),
            SampleMode::Resolution { .. } => 2,
        };
        coords.extend((0..n).map(|i| round_point(edge.position_at(i as f64 / n as f64))));
    }

    if let (Some(first), Some(last)) = (coords.first().copied(), coords.last().copied()) {
        if first != last {
            coords.push(first);
        }
    }
    coords
}
