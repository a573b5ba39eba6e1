//! Cross-sections handed over by the CAD kernel.

use serde::{Deserialize, Serialize};

use super::polygon;
use super::sampling::{sample_wire, SampleMode, WireEdge};
use crate::model::Point2;

/// A plane intersection result: either a bounded face or a bare wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionPrimitive {
    Face {
        outer: Vec<WireEdge>,
        #[serde(default)]
        holes: Vec<Vec<WireEdge>>,
    },
    Wire { edges: Vec<WireEdge> },
}

/// Whether a wire bounds material or a hole in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireKind {
    Exterior,
    Interior,
}

/// A sampled, typed wire.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedWire {
    pub points: Vec<Point2>,
    pub kind: WireKind,
}

impl TypedWire {
    /// Enclosed area.
    pub fn area(&self) -> f64 {
        polygon::ring_area(&self.points)
    }
}

/// A sampled face: one outer ring and the holes it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledFace {
    pub outer: Vec<Point2>,
    pub holes: Vec<Vec<Point2>>,
}

/// All primitives cut by one horizontal plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    /// Height of the plane above the solid bottom.
    pub z: f64,
    #[serde(default)]
    pub primitives: Vec<SectionPrimitive>,
    #[serde(default)]
    pub sampling: SampleMode,
}

impl CrossSection {
    /// Sample every primitive into typed wires.
    ///
    /// Faces yield their outer wire as exterior and holes as interior; bare
    /// wires are taken as exterior. Wires that sample to nothing are dropped.
    pub fn typed_wires(&self) -> Vec<TypedWire> {
        let mut wires = Vec::new();
        let mut push = |edges: &[WireEdge], kind: WireKind| {
            let points = sample_wire(edges, self.sampling);
            if !points.is_empty() {
                wires.push(TypedWire { points, kind });
            }
        };
        for primitive in &self.primitives {
            match primitive {
                SectionPrimitive::Face { outer, holes } => {
                    push(outer, WireKind::Exterior);
                    for hole in holes {
                        push(hole, WireKind::Interior);
                    }
                }
                SectionPrimitive::Wire { edges } => push(edges, WireKind::Exterior),
            }
        }
        wires
    }

    /// Sample every primitive into faces, keeping each hole with its own face.
    ///
    /// Bare wires become faces without holes. Outer rings with fewer than
    /// three points are dropped, as are such holes.
    pub fn sampled_faces(&self) -> Vec<SampledFace> {
        let ring = |edges: &[WireEdge]| {
            let points = sample_wire(edges, self.sampling);
            (points.len() >= 3).then_some(points)
        };
        self.primitives
            .iter()
            .filter_map(|primitive| match primitive {
                SectionPrimitive::Face { outer, holes } => Some(SampledFace {
                    outer: ring(outer)?,
                    holes: holes.iter().filter_map(|h| ring(h)).collect(),
                }),
                SectionPrimitive::Wire { edges } => Some(SampledFace {
                    outer: ring(edges)?,
                    holes: Vec::new(),
                }),
            })
            .collect()
    }
}
