//! The orientation predicate.
//!
//! Every other predicate in the crate (ring orientation, intersection
//! classification, star ordering, depth-segment ordering) bottoms out here, so
//! this needs to give self-consistent answers on every input, not just on the
//! easy ones.

use crate::geom::Coord;

/// Which side of a directed line a point is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Counter-clockwise.
    Left,
    /// Clockwise.
    Right,
    Collinear,
}

impl Orientation {
    pub fn from_index(idx: i32) -> Self {
        match idx.signum() {
            1 => Orientation::Left,
            -1 => Orientation::Right,
            _ => Orientation::Collinear,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Orientation::Left => 1,
            Orientation::Right => -1,
            Orientation::Collinear => 0,
        }
    }

    pub fn reversed(self) -> Self {
        Orientation::from_index(-self.index())
    }
}

// Euclid-style reduction loops are logarithmic in the ratio of the entries;
// for finite doubles this is far below this bound.
const MAX_REDUCTION_STEPS: u32 = 4096;

/// The sign of the determinant `| x1 y1 ; x2 y2 |`, computed exactly.
///
/// The entries are normalized to be non-negative (tracking the sign flips),
/// and then reduced in the manner of Euclid's algorithm until one of the
/// trivial cases applies.
pub fn sign_of_det2x2(x1: f64, y1: f64, x2: f64, y2: f64) -> i32 {
    if !(x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite()) {
        let det = x1 * y2 - y1 * x2;
        return if det > 0.0 {
            1
        } else if det < 0.0 {
            -1
        } else {
            0
        };
    }

    let (mut x1, mut y1, mut x2, mut y2) = (x1, y1, x2, y2);
    let mut sign = 1;

    if x1 == 0.0 || y2 == 0.0 {
        if y1 == 0.0 || x2 == 0.0 {
            return 0;
        } else if y1 > 0.0 {
            return if x2 > 0.0 { -sign } else { sign };
        } else {
            return if x2 > 0.0 { sign } else { -sign };
        }
    }
    if y1 == 0.0 || x2 == 0.0 {
        if y2 > 0.0 {
            return if x1 > 0.0 { sign } else { -sign };
        } else {
            return if x1 > 0.0 { -sign } else { sign };
        }
    }

    // Make the y entries positive, with y1 <= y2.
    if 0.0 < y1 {
        if 0.0 < y2 {
            if y1 > y2 {
                sign = -sign;
                std::mem::swap(&mut x1, &mut x2);
                std::mem::swap(&mut y1, &mut y2);
            }
        } else if y1 <= -y2 {
            sign = -sign;
            x2 = -x2;
            y2 = -y2;
        } else {
            (x1, x2) = (-x2, x1);
            (y1, y2) = (-y2, y1);
        }
    } else if 0.0 < y2 {
        if -y1 <= y2 {
            sign = -sign;
            x1 = -x1;
            y1 = -y1;
        } else {
            (x1, x2) = (x2, -x1);
            (y1, y2) = (y2, -y1);
        }
    } else if y1 >= y2 {
        x1 = -x1;
        y1 = -y1;
        x2 = -x2;
        y2 = -y2;
    } else {
        sign = -sign;
        (x1, x2) = (-x2, -x1);
        (y1, y2) = (-y2, -y1);
    }

    // Make the x entries positive. If |x2| < |x1| we're already done.
    if 0.0 < x1 {
        if 0.0 < x2 {
            if x1 > x2 {
                return sign;
            }
        } else {
            return sign;
        }
    } else if 0.0 < x2 {
        return -sign;
    } else if x1 >= x2 {
        sign = -sign;
        x1 = -x1;
        x2 = -x2;
    } else {
        return -sign;
    }

    // Now 0 < x1 <= x2 and 0 < y1 <= y2.
    let mut steps = 0;
    loop {
        steps += 1;
        assert!(
            steps < MAX_REDUCTION_STEPS,
            "orientation reduction did not terminate"
        );

        let k = (x2 / x1).floor();
        x2 -= k * x1;
        y2 -= k * y1;

        if y2 < 0.0 {
            return -sign;
        }
        if y2 > y1 {
            return sign;
        }

        if x1 > x2 + x2 {
            if y1 < y2 + y2 {
                return sign;
            }
        } else if y1 > y2 + y2 {
            return -sign;
        } else {
            x2 = x1 - x2;
            y2 = y1 - y2;
            sign = -sign;
        }
        if y2 == 0.0 {
            return if x2 == 0.0 { 0 } else { -sign };
        }
        if x2 == 0.0 {
            return sign;
        }

        // Same again, with the roles of 1 and 2 exchanged.
        let k = (x1 / x2).floor();
        x1 -= k * x2;
        y1 -= k * y2;

        if y1 < 0.0 {
            return sign;
        }
        if y1 > y2 {
            return -sign;
        }

        if x2 > x1 + x1 {
            if y2 < y1 + y1 {
                return -sign;
            }
        } else if y2 > y1 + y1 {
            return sign;
        } else {
            x1 = x2 - x1;
            y1 = y2 - y1;
            sign = -sign;
        }
        if y1 == 0.0 {
            return if x1 == 0.0 { 0 } else { sign };
        }
        if x1 == 0.0 {
            return -sign;
        }
    }
}

/// The orientation of `q` relative to the directed line `p1 -> p2`, as
/// `1` (left), `-1` (right) or `0` (collinear).
///
/// The three points are put into lexicographic order before the determinant
/// is evaluated, and the permutation's parity is applied to the result. The
/// rounding in the coordinate differences then depends only on the set of
/// points, which makes the answer exactly antisymmetric under swapping any two
/// of them.
pub fn orientation_index(p1: Coord, p2: Coord, q: Coord) -> i32 {
    let mut pts = [p1, p2, q];
    let mut parity = 1;
    // A three-element bubble sort, counting swaps.
    for (i, j) in [(0, 1), (1, 2), (0, 1)] {
        if pts[i].cmp_xy(&pts[j]).is_gt() {
            pts.swap(i, j);
            parity = -parity;
        }
    }
    let [a, b, c] = pts;
    parity * sign_of_det2x2(b.x - a.x, b.y - a.y, c.x - b.x, c.y - b.y)
}

pub fn orientation(p1: Coord, p2: Coord, q: Coord) -> Orientation {
    Orientation::from_index(orientation_index(p1, p2, q))
}
