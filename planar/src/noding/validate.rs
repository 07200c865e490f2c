use crate::{
    error::{Error, Result},
    geom::Coord,
    intersector::LineIntersector,
};

use super::NodedSegmentString;

/// Checks that a collection of strings is fully noded.
///
/// This tests every pair of segments, so it is only suitable for testing and
/// for small inputs.
pub struct NodingValidator<'a, D> {
    strings: &'a [NodedSegmentString<D>],
    li: LineIntersector,
}

impl<'a, D> NodingValidator<'a, D> {
    pub fn new(strings: &'a [NodedSegmentString<D>]) -> Self {
        NodingValidator {
            strings,
            li: LineIntersector::new(),
        }
    }

    pub fn check_valid(&self) -> Result<()> {
        self.check_end_point_vertices()?;
        self.check_interior_intersections()?;
        self.check_collapses()
    }

    fn check_collapses(&self) -> Result<()> {
        for ss in self.strings {
            for w in ss.coords().windows(3) {
                if w[0] == w[2] {
                    return Err(Error::topology("found non-noded collapse", Some(w[1])));
                }
            }
        }
        Ok(())
    }

    fn check_interior_intersections(&self) -> Result<()> {
        for (i0, s0) in self.strings.iter().enumerate() {
            for (i1, s1) in self.strings.iter().enumerate() {
                for seg0 in 0..s0.len().saturating_sub(1) {
                    for seg1 in 0..s1.len().saturating_sub(1) {
                        if i0 == i1 && seg0 == seg1 {
                            continue;
                        }
                        self.check_pair(s0, seg0, s1, seg1)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_pair(
        &self,
        s0: &NodedSegmentString<D>,
        seg0: usize,
        s1: &NodedSegmentString<D>,
        seg1: usize,
    ) -> Result<()> {
        let (p00, p01) = (s0.coord(seg0), s0.coord(seg0 + 1));
        let (p10, p11) = (s1.coord(seg1), s1.coord(seg1 + 1));
        let int = self.li.intersect(p00, p01, p10, p11);
        if int.has_intersection() && (int.is_proper() || int.is_interior()) {
            return Err(Error::topology(
                format!(
                    "found non-noded intersection between {:?} -- {:?} and {:?} -- {:?}",
                    p00, p01, p10, p11
                ),
                Some(int.point(0)),
            ));
        }
        Ok(())
    }

    // An endpoint of one string must not be an interior vertex of any string.
    fn check_end_point_vertices(&self) -> Result<()> {
        for ss in self.strings {
            let (Some(first), Some(last)) = (ss.coords().first(), ss.coords().last()) else {
                continue;
            };
            for pt in [first, last] {
                self.check_not_interior_vertex(*pt)?;
            }
        }
        Ok(())
    }

    fn check_not_interior_vertex(&self, pt: Coord) -> Result<()> {
        for ss in self.strings {
            let pts = ss.coords();
            if pts.len() < 3 {
                continue;
            }
            if pts[1..pts.len() - 1].contains(&pt) {
                return Err(Error::topology(
                    "found endpoint/interior vertex intersection",
                    Some(pt),
                ));
            }
        }
        Ok(())
    }
}
