use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::graph::{Label, Location, Position};

/// How many times a region is covered, counted separately for each of the
/// two input shapes.
///
/// Buffering only uses `shape_a`.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Depth {
    pub shape_a: i32,
    pub shape_b: i32,
}

impl std::fmt::Debug for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}a + {}b", self.shape_a, self.shape_b)
    }
}

impl Depth {
    pub fn new(shape_a: i32, shape_b: i32) -> Self {
        Depth { shape_a, shape_b }
    }

    pub fn get(&self, geom: usize) -> i32 {
        if geom == 0 {
            self.shape_a
        } else {
            self.shape_b
        }
    }

    pub fn get_mut(&mut self, geom: usize) -> &mut i32 {
        if geom == 0 {
            &mut self.shape_a
        } else {
            &mut self.shape_b
        }
    }

    /// The change in depth from the right side of an edge to its left side.
    ///
    /// For each shape, this is `+1` if the label has the interior on the left
    /// and the exterior on the right, `-1` for the reverse, and `0` otherwise.
    pub fn delta_of(label: &Label) -> Depth {
        let mut ret = Depth::default();
        for geom in 0..2 {
            let left = label.get(geom, Position::Left);
            let right = label.get(geom, Position::Right);
            *ret.get_mut(geom) = match (left, right) {
                (Location::Interior, Location::Exterior) => 1,
                (Location::Exterior, Location::Interior) => -1,
                _ => 0,
            };
        }
        ret
    }
}

impl Add for Depth {
    type Output = Depth;

    fn add(self, rhs: Depth) -> Depth {
        Depth::new(self.shape_a + rhs.shape_a, self.shape_b + rhs.shape_b)
    }
}

impl AddAssign for Depth {
    fn add_assign(&mut self, rhs: Depth) {
        *self = *self + rhs;
    }
}

impl Sub for Depth {
    type Output = Depth;

    fn sub(self, rhs: Depth) -> Depth {
        Depth::new(self.shape_a - rhs.shape_a, self.shape_b - rhs.shape_b)
    }
}

impl Neg for Depth {
    type Output = Depth;

    fn neg(self) -> Depth {
        Depth::new(-self.shape_a, -self.shape_b)
    }
}

impl Mul<i32> for Depth {
    type Output = Depth;

    fn mul(self, rhs: i32) -> Depth {
        Depth::new(self.shape_a * rhs, self.shape_b * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Location::*;

    #[test]
    fn deltas() {
        assert_eq!(
            Depth::delta_of(&Label::area(0, Boundary, Interior, Exterior)),
            Depth::new(1, 0)
        );
        assert_eq!(
            Depth::delta_of(&Label::area(1, Boundary, Exterior, Interior)),
            Depth::new(0, -1)
        );
        assert_eq!(
            Depth::delta_of(&Label::area(0, Boundary, Interior, Interior)),
            Depth::default()
        );
        assert_eq!(format!("{:?}", Depth::new(2, -1) * -1), "-2a + 1b");
    }
}
