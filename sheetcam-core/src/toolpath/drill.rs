//! Peck drilling.

use super::passes::drill_levels;
use crate::model::{Point2, ToolpathPass};

/// Single-point passes plunging ever deeper at `center`.
///
/// The controller retracts between pecks, so every pass is a lone point.
/// Drill passes never carry tabs.
pub fn peck_passes(center: Point2, top: f64, depth: f64, peck: f64) -> Vec<ToolpathPass> {
    drill_levels(top, depth, peck)
        .into_iter()
        .enumerate()
        .map(|(i, z)| ToolpathPass {
            pass_number: (i + 1) as u32,
            z_depth: z,
            path: vec![center],
            tabs: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PENETRATION_MARGIN;

    #[test]
    fn test_peck_cycle() {
        let passes = peck_passes(Point2::new(10.0, 20.0), 18.0, 18.0, 6.0);
        assert_eq!(passes.len(), 3);
        assert!(passes.iter().all(|p| p.path == vec![Point2::new(10.0, 20.0)]));
        assert!(passes.iter().all(|p| p.tabs.is_empty()));
        assert!(passes.windows(2).all(|w| w[1].z_depth < w[0].z_depth));
        assert_eq!(passes[2].z_depth, -PENETRATION_MARGIN);
    }

    #[test]
    fn test_shallow_hole_single_peck() {
        let passes = peck_passes(Point2::new(0.0, 0.0), 18.0, 4.0, 6.0);
        assert_eq!(passes.len(), 1);
        assert!((passes[0].z_depth - 13.7).abs() < 1e-9);
    }
}
