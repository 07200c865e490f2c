use crate::{
    geom::{Coord, LineSegment},
    orientation::{orientation, Orientation},
};

/// How many intermediate vertices to sample when checking that a run of
/// deleted vertices stays close to the chord replacing it.
const NUM_PTS_TO_CHECK: usize = 10;

/// Removes shallow concavities from a buffer input line.
///
/// A vertex is deleted if the line turns towards the buffer side there and
/// the vertex (and a sample of the vertices already deleted around it) lies
/// within the tolerance of the chord that would replace it. Such vertices
/// can't change the offset curve by more than the tolerance, and removing
/// them avoids tiny inside-turn loops in the raw curve.
///
/// A positive tolerance simplifies the left side of the line, a negative one
/// the right side.
pub struct BufferInputLineSimplifier<'a> {
    input: &'a [Coord],
    tolerance: f64,
    concave: Orientation,
    deleted: Vec<bool>,
}

impl<'a> BufferInputLineSimplifier<'a> {
    pub fn simplify(input: &'a [Coord], tolerance: f64) -> Vec<Coord> {
        let mut simp = BufferInputLineSimplifier {
            input,
            tolerance: tolerance.abs(),
            concave: if tolerance < 0.0 {
                Orientation::Right
            } else {
                Orientation::Left
            },
            deleted: vec![false; input.len()],
        };
        while simp.delete_shallow_concavities() {}
        simp.collapse()
    }

    // One pass over the line. The end segments are never simplified, so the
    // end caps stay square to the input.
    fn delete_shallow_concavities(&mut self) -> bool {
        let mut idx = 1;
        let mut mid = self.next_kept(idx);
        let mut last = self.next_kept(mid);
        let mut changed = false;
        while last + 1 < self.input.len() {
            if self.is_deletable(idx, mid, last) {
                self.deleted[mid] = true;
                changed = true;
                idx = last;
            } else {
                idx = mid;
            }
            mid = self.next_kept(idx);
            last = self.next_kept(mid);
        }
        changed
    }

    fn next_kept(&self, idx: usize) -> usize {
        let mut next = idx + 1;
        while next < self.input.len() && self.deleted[next] {
            next += 1;
        }
        next
    }

    fn collapse(&self) -> Vec<Coord> {
        self.input
            .iter()
            .zip(&self.deleted)
            .filter(|(_, deleted)| !**deleted)
            .map(|(p, _)| *p)
            .collect()
    }

    fn is_deletable(&self, i0: usize, i1: usize, i2: usize) -> bool {
        let (p0, p1, p2) = (self.input[i0], self.input[i1], self.input[i2]);
        orientation(p0, p1, p2) == self.concave
            && self.is_shallow(p0, p1, p2)
            && self.is_shallow_sampled(p0, p2, i0, i2)
    }

    fn is_shallow_sampled(&self, p0: Coord, p2: Coord, i0: usize, i2: usize) -> bool {
        let step = ((i2 - i0) / NUM_PTS_TO_CHECK).max(1);
        (i0..i2)
            .step_by(step)
            .all(|i| self.is_shallow(p0, self.input[i], p2))
    }

    fn is_shallow(&self, p0: Coord, p1: Coord, p2: Coord) -> bool {
        LineSegment::new(p0, p2).distance_to(p1) < self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::ring;

    #[test]
    fn removes_shallow_dent_on_one_side_only() {
        // A small dent below the line: a left turn at the dent, and right
        // turns on either side of it.
        let line = ring(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (5.0, 0.0),
            (6.0, -0.01),
            (7.0, 0.0),
            (9.0, 0.0),
            (12.0, 0.0),
        ]);
        let left = BufferInputLineSimplifier::simplify(&line, 0.1);
        insta::assert_debug_snapshot!(left, @r###"
        [
            (0.0, 0.0),
            (3.0, 0.0),
            (5.0, 0.0),
            (7.0, 0.0),
            (9.0, 0.0),
            (12.0, 0.0),
        ]
        "###);

        let right = BufferInputLineSimplifier::simplify(&line, -0.1);
        insta::assert_debug_snapshot!(right, @r###"
        [
            (0.0, 0.0),
            (3.0, 0.0),
            (6.0, -0.01),
            (9.0, 0.0),
            (12.0, 0.0),
        ]
        "###);
    }

    #[test]
    fn end_segments_are_kept() {
        // Both dents are shallow right turns, but each sits on an end segment.
        let line = ring(&[(0.0, 0.0), (1.0, 0.01), (2.0, 0.0), (3.0, 0.01), (4.0, 0.0)]);
        assert_eq!(BufferInputLineSimplifier::simplify(&line, -0.1), line);

        let line = ring(&[(0.0, 0.0), (1.0, 0.01), (2.0, 0.0)]);
        assert_eq!(BufferInputLineSimplifier::simplify(&line, -0.1), line);
    }

    #[test]
    fn deep_turns_are_kept() {
        let line = ring(&[(0.0, 0.0), (1.0, -5.0), (2.0, 0.0)]);
        assert_eq!(BufferInputLineSimplifier::simplify(&line, -0.1), line);
    }

    #[test]
    fn short_lines() {
        let line = ring(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(BufferInputLineSimplifier::simplify(&line, 1.0), line);
        assert!(BufferInputLineSimplifier::simplify(&[], 1.0).is_empty());
    }
}
