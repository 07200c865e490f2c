//! Noding: splitting segment strings at their mutual intersections.
//!
//! After noding, two pieces meet only at their endpoints (or not at all).

pub mod chain;
mod mc_noder;
pub mod octant;
mod segment_string;
mod validate;

pub use mc_noder::McIndexNoder;
pub use segment_string::{NodedSegmentString, SegmentNode, SegmentNodeList};
pub use validate::NodingValidator;

use crate::{
    error::Result,
    geom::Coord,
    intersector::{Intersection, LineIntersector},
};

/// Computes the noded pieces of a collection of segment strings.
pub trait Noder {
    fn node<D: Clone>(
        &mut self,
        strings: Vec<NodedSegmentString<D>>,
    ) -> Result<Vec<NodedSegmentString<D>>>;
}

/// Processes pairs of segments that a noder thinks might intersect.
///
/// A segment is named by the index of its string in `strings`, and the index
/// of its first vertex in that string.
pub trait SegmentIntersector {
    fn process<D>(
        &mut self,
        strings: &mut [NodedSegmentString<D>],
        e0: usize,
        seg0: usize,
        e1: usize,
        seg1: usize,
    ) -> Result<()>;

    /// Once this returns true, the noder can stop looking for intersections.
    fn is_done(&self) -> bool {
        false
    }
}

fn segment_pair<D>(
    strings: &[NodedSegmentString<D>],
    e0: usize,
    seg0: usize,
    e1: usize,
    seg1: usize,
) -> [Coord; 4] {
    [
        strings[e0].coord(seg0),
        strings[e0].coord(seg0 + 1),
        strings[e1].coord(seg1),
        strings[e1].coord(seg1 + 1),
    ]
}

/// Adds a node for every non-trivial intersection it sees.
#[derive(Clone, Debug, Default)]
pub struct IntersectionAdder {
    li: LineIntersector,
    pub num_tests: usize,
    pub num_intersections: usize,
    pub num_interior_intersections: usize,
    pub num_proper_intersections: usize,
}

impl IntersectionAdder {
    pub fn new(li: LineIntersector) -> Self {
        IntersectionAdder {
            li,
            ..Default::default()
        }
    }

    pub fn has_proper_intersection(&self) -> bool {
        self.num_proper_intersections > 0
    }

    pub fn has_interior_intersection(&self) -> bool {
        self.num_interior_intersections > 0
    }

    // Adjacent segments of one string always meet at their shared vertex, as do
    // the first and last segments of a closed string. Those meetings aren't news.
    fn is_trivial<D>(
        strings: &[NodedSegmentString<D>],
        int: &Intersection,
        e0: usize,
        seg0: usize,
        e1: usize,
        seg1: usize,
    ) -> bool {
        if e0 != e1 || int.num() != 1 {
            return false;
        }
        if seg0.abs_diff(seg1) == 1 {
            return true;
        }
        let ss = &strings[e0];
        if ss.is_closed() {
            let max_seg = ss.len() - 2;
            if (seg0 == 0 && seg1 == max_seg) || (seg1 == 0 && seg0 == max_seg) {
                return true;
            }
        }
        false
    }
}

impl SegmentIntersector for IntersectionAdder {
    fn process<D>(
        &mut self,
        strings: &mut [NodedSegmentString<D>],
        e0: usize,
        seg0: usize,
        e1: usize,
        seg1: usize,
    ) -> Result<()> {
        if e0 == e1 && seg0 == seg1 {
            return Ok(());
        }
        self.num_tests += 1;
        let [p00, p01, p10, p11] = segment_pair(strings, e0, seg0, e1, seg1);
        let int = self.li.intersect(p00, p01, p10, p11);
        if !int.has_intersection() {
            return Ok(());
        }
        self.num_intersections += 1;
        if int.is_interior() {
            self.num_interior_intersections += 1;
        }
        if !Self::is_trivial(strings, &int, e0, seg0, e1, seg1) {
            strings[e0].add_intersections(&int, seg0)?;
            strings[e1].add_intersections(&int, seg1)?;
            if int.is_proper() {
                self.num_proper_intersections += 1;
            }
        }
        Ok(())
    }
}

/// Finds intersections that are interior to at least one of the segments.
///
/// Unless `find_all` is set, it stops at the first one.
#[derive(Clone, Debug, Default)]
pub struct InteriorIntersectionFinder {
    li: LineIntersector,
    pub find_all: bool,
    pub intersections: Vec<Coord>,
    /// The four endpoints of the segments of the last intersection found.
    pub segments: Option<[Coord; 4]>,
}

impl InteriorIntersectionFinder {
    pub fn new(li: LineIntersector) -> Self {
        InteriorIntersectionFinder {
            li,
            ..Default::default()
        }
    }

    pub fn find_all(li: LineIntersector) -> Self {
        InteriorIntersectionFinder {
            li,
            find_all: true,
            ..Default::default()
        }
    }

    pub fn has_intersection(&self) -> bool {
        !self.intersections.is_empty()
    }

    pub fn interior_intersection(&self) -> Option<Coord> {
        self.intersections.first().copied()
    }
}

impl SegmentIntersector for InteriorIntersectionFinder {
    fn process<D>(
        &mut self,
        strings: &mut [NodedSegmentString<D>],
        e0: usize,
        seg0: usize,
        e1: usize,
        seg1: usize,
    ) -> Result<()> {
        if self.is_done() || (e0 == e1 && seg0 == seg1) {
            return Ok(());
        }
        let pts = segment_pair(strings, e0, seg0, e1, seg1);
        let int = self.li.intersect(pts[0], pts[1], pts[2], pts[3]);
        if int.has_intersection() && int.is_interior() {
            self.segments = Some(pts);
            self.intersections.push(int.point(0));
        }
        Ok(())
    }

    fn is_done(&self) -> bool {
        !self.find_all && self.has_intersection()
    }
}

/// Collects interior intersection points, and adds them as nodes.
#[derive(Clone, Debug, Default)]
pub struct IntersectionFinderAdder {
    li: LineIntersector,
    pub interior_intersections: Vec<Coord>,
}

impl IntersectionFinderAdder {
    pub fn new(li: LineIntersector) -> Self {
        IntersectionFinderAdder {
            li,
            interior_intersections: Vec::new(),
        }
    }
}

impl SegmentIntersector for IntersectionFinderAdder {
    fn process<D>(
        &mut self,
        strings: &mut [NodedSegmentString<D>],
        e0: usize,
        seg0: usize,
        e1: usize,
        seg1: usize,
    ) -> Result<()> {
        if e0 == e1 && seg0 == seg1 {
            return Ok(());
        }
        let [p00, p01, p10, p11] = segment_pair(strings, e0, seg0, e1, seg1);
        let int = self.li.intersect(p00, p01, p10, p11);
        if int.has_intersection() && int.is_interior() {
            self.interior_intersections.extend_from_slice(int.points());
            strings[e0].add_intersections(&int, seg0)?;
            strings[e1].add_intersections(&int, seg1)?;
        }
        Ok(())
    }
}
