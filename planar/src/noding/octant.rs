//! Ordering of points along a segment, without computing distances.
//!
//! Octants are numbered counter-clockwise from the positive x axis:
//!
//! ```text
//!    \ 2 | 1 /
//!   3 \  |  / 0
//!  ----------
//!   4 /  |  \ 7
//!    / 5 | 6 \
//! ```

use std::cmp::Ordering;

use crate::geom::Coord;

/// The octant of a non-zero direction vector, or `None` for the zero vector.
pub fn octant(dx: f64, dy: f64) -> Option<u8> {
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    let adx = dx.abs();
    let ady = dy.abs();
    let ret = if dx >= 0.0 {
        if dy >= 0.0 {
            if adx >= ady {
                0
            } else {
                1
            }
        } else if adx >= ady {
            7
        } else {
            6
        }
    } else if dy >= 0.0 {
        if adx >= ady {
            3
        } else {
            2
        }
    } else if adx >= ady {
        4
    } else {
        5
    };
    Some(ret)
}

/// The octant of the segment `p0 -> p1`; zero-length segments get octant 0.
pub fn segment_octant(p0: Coord, p1: Coord) -> u8 {
    octant(p1.x - p0.x, p1.y - p0.y).unwrap_or(0)
}

fn relative_sign(x0: f64, x1: f64) -> i32 {
    if x0 < x1 {
        -1
    } else if x0 > x1 {
        1
    } else {
        0
    }
}

fn compare_value(c0: i32, c1: i32) -> Ordering {
    c0.cmp(&0).then(c1.cmp(&0))
}

/// Compares two points lying on a segment in the given octant, by their
/// position along the segment's direction.
pub fn compare_along(octant: u8, p0: Coord, p1: Coord) -> Ordering {
    if p0 == p1 {
        return Ordering::Equal;
    }
    let xs = relative_sign(p0.x, p1.x);
    let ys = relative_sign(p0.y, p1.y);
    match octant {
        0 => compare_value(xs, ys),
        1 => compare_value(ys, xs),
        2 => compare_value(ys, -xs),
        3 => compare_value(-xs, ys),
        4 => compare_value(-xs, -ys),
        5 => compare_value(-ys, -xs),
        6 => compare_value(-ys, xs),
        _ => compare_value(xs, -ys),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::{p, Reasonable};
    use crate::geom::LineSegment;
    use proptest::prelude::*;

    #[test]
    fn octants() {
        assert_eq!(octant(2.0, 1.0), Some(0));
        assert_eq!(octant(1.0, 2.0), Some(1));
        assert_eq!(octant(-1.0, 2.0), Some(2));
        assert_eq!(octant(-2.0, 1.0), Some(3));
        assert_eq!(octant(-2.0, -1.0), Some(4));
        assert_eq!(octant(-1.0, -2.0), Some(5));
        assert_eq!(octant(1.0, -2.0), Some(6));
        assert_eq!(octant(2.0, -1.0), Some(7));
        assert_eq!(octant(0.0, 0.0), None);
    }

    #[test]
    fn along_a_diagonal() {
        let o = segment_octant(p(4.0, 4.0), p(0.0, 0.0));
        assert_eq!(compare_along(o, p(3.0, 3.0), p(1.0, 1.0)), Ordering::Less);
        assert_eq!(compare_along(o, p(1.0, 1.0), p(3.0, 3.0)), Ordering::Greater);
        assert_eq!(compare_along(o, p(1.0, 1.0), p(1.0, 1.0)), Ordering::Equal);
    }

    proptest! {
        #[test]
        fn agrees_with_projection(s in LineSegment::reasonable(), t0 in 0.0..1.0f64, t1 in 0.0..1.0f64) {
            prop_assume!(s.length() > 1.0);
            let a = s.point_along_offset(t0, 0.0);
            let b = s.point_along_offset(t1, 0.0);
            let o = segment_octant(s.p0, s.p1);
            let expected = s.projection_factor(a).partial_cmp(&s.projection_factor(b)).unwrap();
            // Points that are very close might round to the same coordinate
            // along the major axis, in which case we can't say much.
            if (t0 - t1).abs() > 1e-3 {
                prop_assert_eq!(compare_along(o, a, b), expected);
            }
        }
    }
}
