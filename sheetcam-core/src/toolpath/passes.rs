//! Z step-down and holding tabs.
//!
//! Z = 0 is the bottom face of the stock; the top face sits at the stock
//! thickness. Through cuts finish [`PENETRATION_MARGIN`] below the bottom.

use crate::config::PENETRATION_MARGIN;
use crate::geometry::round4;
use crate::model::{Point2, TabSegment, TabSettings, ToolpathPass};

/// Number of passes needed to reach `total` in steps of `step`.
///
/// Always at least one. A tiny tolerance keeps exact multiples from rounding up.
pub fn pass_count(total: f64, step: f64) -> usize {
    if step <= 0.0 || total <= 0.0 {
        return 1;
    }
    ((total / step - 1e-9).ceil() as usize).max(1)
}

/// Z levels of a through cut starting at the stock top (`total_depth`).
///
/// Pass *i* sits at `total_depth − i·depth_per_pass`; the last pass is fixed at
/// `−PENETRATION_MARGIN`.
pub fn through_levels(total_depth: f64, depth_per_pass: f64) -> Vec<f64> {
    let n = pass_count(total_depth, depth_per_pass);
    (1..=n)
        .map(|i| {
            if i == n {
                -PENETRATION_MARGIN
            } else {
                round4(total_depth - i as f64 * depth_per_pass)
            }
        })
        .collect()
}

/// Peck levels of a drill cycle from `top` down through `depth`.
pub fn drill_levels(top: f64, depth: f64, peck: f64) -> Vec<f64> {
    let n = pass_count(depth, peck);
    (1..=n)
        .map(|i| {
            if i == n {
                round4(top - depth - PENETRATION_MARGIN)
            } else {
                round4(top - i as f64 * peck)
            }
        })
        .collect()
}

/// Blind levels of a pocket; the last one lands exactly on the floor.
pub fn pocket_levels(top: f64, depth: f64, depth_per_pass: f64) -> Vec<f64> {
    let n = pass_count(depth, depth_per_pass);
    (1..=n)
        .map(|i| {
            if i == n {
                round4(top - depth)
            } else {
                round4(top - i as f64 * depth_per_pass)
            }
        })
        .collect()
}

/// First path index whose cumulative distance reaches `target`.
fn distance_to_index(distances: &[f64], target: f64) -> usize {
    distances
        .iter()
        .position(|&d| d >= target)
        .unwrap_or(distances.len().saturating_sub(1))
}

/// Spread `tabs.count` bridges evenly along the path length.
///
/// Each bridge is centered in its sector and lifted to `z + tabs.height`.
pub fn compute_tabs(path: &[Point2], tabs: &TabSettings, z: f64) -> Vec<TabSegment> {
    let n = path.len();
    if !tabs.enabled || tabs.count == 0 || tabs.height <= 0.0 || n < 2 {
        return Vec::new();
    }

    let mut distances = Vec::with_capacity(n);
    distances.push(0.0);
    for w in path.windows(2) {
        let last = distances[distances.len() - 1];
        distances.push(last + w[0].distance_to(&w[1]));
    }
    let total = distances[n - 1];
    if total <= 0.0 {
        return Vec::new();
    }

    let spacing = total / f64::from(tabs.count);
    let half = tabs.width / 2.0;
    let z_tab = round4(z + tabs.height);

    (0..tabs.count)
        .map(|t| {
            let center = spacing * (f64::from(t) + 0.5);
            let start_index = distance_to_index(&distances, (center - half).max(0.0));
            let mut end_index = distance_to_index(&distances, (center + half).min(total));
            if end_index <= start_index {
                end_index = (start_index + 1).min(n - 1);
            }
            TabSegment {
                start_index,
                end_index,
                z_tab,
            }
        })
        .collect()
}

/// One pass per level over the same path; tabs go on the final pass only.
pub fn build_passes(path: &[Point2], levels: &[f64], tabs: Option<&TabSettings>) -> Vec<ToolpathPass> {
    let last = levels.len().saturating_sub(1);
    levels
        .iter()
        .enumerate()
        .map(|(i, &z)| ToolpathPass {
            pass_number: (i + 1) as u32,
            z_depth: z,
            path: path.to_vec(),
            tabs: match tabs {
                Some(t) if i == last => compute_tabs(path, t, z),
                _ => Vec::new(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_path() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(25.0, 0.0),
            Point2::new(50.0, 0.0),
            Point2::new(50.0, 25.0),
            Point2::new(50.0, 50.0),
            Point2::new(25.0, 50.0),
            Point2::new(0.0, 50.0),
            Point2::new(0.0, 25.0),
            Point2::new(0.0, 0.0),
        ]
    }

    fn tabs(count: u32) -> TabSettings {
        TabSettings {
            enabled: true,
            height: 8.0,
            width: 5.0,
            count,
        }
    }

    // ==================== step-down tests ====================

    #[test]
    fn test_through_levels_count_and_order() {
        for (total, dpp, expected) in [
            (18.0, 6.0, 3),
            (10.0, 6.0, 2),
            (19.0, 6.0, 4),
            (3.0, 6.0, 1),
            (12.7, 3.175, 4),
        ] {
            let levels = through_levels(total, dpp);
            assert_eq!(levels.len(), expected);
            assert!(levels.windows(2).all(|w| w[1] < w[0]), "{levels:?}");
            assert_eq!(*levels.last().unwrap(), -PENETRATION_MARGIN);
        }
    }

    #[test]
    fn test_through_levels_values() {
        assert_eq!(through_levels(18.0, 6.0), vec![12.0, 6.0, -0.3]);
    }

    #[test]
    fn test_drill_levels() {
        assert_eq!(drill_levels(18.0, 18.0, 6.0), vec![12.0, 6.0, -0.3]);
        assert_eq!(drill_levels(10.0, 10.0, 6.0), vec![4.0, -0.3]);
    }

    #[test]
    fn test_pocket_levels_stop_at_floor() {
        assert_eq!(pocket_levels(18.0, 5.0, 3.0), vec![15.0, 13.0]);
        assert_eq!(pocket_levels(18.0, 6.0, 3.0), vec![15.0, 12.0]);
    }

    #[test]
    fn test_zero_step_gives_single_pass() {
        assert_eq!(pass_count(10.0, 0.0), 1);
    }

    // ==================== tabs tests ====================

    #[test]
    fn test_tabs_only_on_final_pass() {
        let levels = through_levels(18.0, 6.0);
        let passes = build_passes(&square_path(), &levels, Some(&tabs(4)));
        assert_eq!(passes.len(), 3);
        assert!(passes[..2].iter().all(|p| p.tabs.is_empty()));
        let last = &passes[2];
        assert_eq!(last.tabs.len(), 4);
        for tab in &last.tabs {
            assert!(tab.z_tab > last.z_depth);
            assert!(tab.end_index > tab.start_index);
            assert!(tab.end_index < last.path.len());
        }
        assert_eq!(passes.iter().map(|p| p.pass_number).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_tab_windows_centered_in_sectors() {
        // 200 mm perimeter, 4 tabs -> centers at 25, 75, 125, 175.
        let segs = compute_tabs(&square_path(), &tabs(4), -0.3);
        let starts: Vec<usize> = segs.iter().map(|s| s.start_index).collect();
        assert_eq!(starts, vec![1, 3, 5, 7]);
        assert!((segs[0].z_tab - 7.7).abs() < 1e-9);
    }

    #[test]
    fn test_disabled_or_empty_tabs() {
        let mut t = tabs(4);
        t.enabled = false;
        assert!(compute_tabs(&square_path(), &t, 0.0).is_empty());
        assert!(compute_tabs(&square_path(), &tabs(0), 0.0).is_empty());
        assert!(compute_tabs(&[Point2::new(1.0, 1.0)], &tabs(4), 0.0).is_empty());
    }
}
