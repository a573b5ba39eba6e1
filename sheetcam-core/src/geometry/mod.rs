//! Stateless 2D geometry helpers.
//!
//! - [`transform`]: rotation about a pivot plus translation
//! - [`sampling`]: turning kernel wire edges into point lists
//! - [`section`]: typed cross-section primitives handed over by the CAD kernel
//! - [`polygon`]: buffer/difference/measure wrappers over `geo` and `geo-clipper`

pub mod polygon;
pub mod sampling;
pub mod section;
pub mod transform;

use crate::config::COORD_DECIMALS;
use crate::model::Point2;

/// Round a coordinate to the emitted precision, folding `-0.0` into `0.0`.
#[inline]
pub fn round4(v: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS);
    let r = (v * scale).round() / scale;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Round both coordinates of a point.
#[inline]
pub fn round_point(p: Point2) -> Point2 {
    Point2::new(round4(p.x), round4(p.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(1.234_56), 1.2346);
        assert_eq!(round4(-0.000_01), 0.0);
        assert!(round4(-0.000_01).is_sign_positive());
        assert_eq!(round4(10.0), 10.0);
    }
}
