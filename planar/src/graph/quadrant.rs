//! Quadrants of direction vectors, numbered counter-clockwise from the
//! north-east:
//!
//! ```text
//!  1 | 0
//!  --+--
//!  2 | 3
//! ```

use crate::geom::Coord;

/// The quadrant of a direction vector. Vectors on an axis go to the quadrant
/// that starts at that axis (counter-clockwise), so the zero vector is in 0.
pub fn quadrant(dx: f64, dy: f64) -> u8 {
    if dx >= 0.0 {
        if dy >= 0.0 {
            0
        } else {
            3
        }
    } else if dy >= 0.0 {
        1
    } else {
        2
    }
}

pub fn quadrant_of(p0: Coord, p1: Coord) -> u8 {
    quadrant(p1.x - p0.x, p1.y - p0.y)
}

/// Is the quadrant in the northern half-plane?
pub fn is_northern(quad: u8) -> bool {
    quad == 0 || quad == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants() {
        assert_eq!(quadrant(1.0, 1.0), 0);
        assert_eq!(quadrant(-1.0, 1.0), 1);
        assert_eq!(quadrant(-1.0, -1.0), 2);
        assert_eq!(quadrant(1.0, -1.0), 3);
        assert_eq!(quadrant(1.0, 0.0), 0);
        assert_eq!(quadrant(0.0, -1.0), 3);
        assert!(is_northern(1));
        assert!(!is_northern(2));
    }
}
