//! Snap rounding: noding on a fixed-precision grid.
//!
//! Every vertex and every intersection point becomes a hot pixel, and every
//! segment passing through a hot pixel gets a node at the pixel's centre.
//! The output then has all its vertices on the grid, and is fully noded
//! even though the intersection points have been moved.

mod hot_pixel;

pub use hot_pixel::HotPixel;

use log::debug;

use crate::{
    error::Result,
    geom::remove_repeated,
    intersector::{LineIntersector, PrecisionModel},
    noding::{
        chain::{ChainIndex, MonotoneChain},
        IntersectionFinderAdder, McIndexNoder, NodedSegmentString, Noder,
    },
};

/// A [`Noder`] that snap-rounds its input to a fixed grid.
#[derive(Clone, Copy, Debug)]
pub struct SnapRounder {
    precision: PrecisionModel,
    scale: f64,
}

impl SnapRounder {
    /// A snap rounder for the grid with spacing `1 / scale`.
    pub fn new(scale: f64) -> Result<Self> {
        Ok(SnapRounder {
            precision: PrecisionModel::fixed(scale)?,
            scale,
        })
    }

    pub fn precision(&self) -> PrecisionModel {
        self.precision
    }

    // Snaps every segment passing through `hp`, except the one starting at
    // `parent` (if any). Returns whether any node was added.
    fn snap<D>(
        &self,
        strings: &mut [NodedSegmentString<D>],
        chains: &ChainIndex,
        hp: &HotPixel,
        parent: Option<(usize, usize)>,
    ) -> Result<bool> {
        let env = hp.safe_envelope();
        let mut added = false;
        for chain in chains.query(&env) {
            let mut segs = Vec::new();
            chain.select(strings[chain.string].coords(), &env, |s| segs.push(s));
            for seg in segs {
                if parent == Some((chain.string, seg)) {
                    continue;
                }
                added |= hp.add_snapped_node(&mut strings[chain.string], seg)?;
            }
        }
        Ok(added)
    }
}

impl Noder for SnapRounder {
    fn node<D: Clone>(
        &mut self,
        strings: Vec<NodedSegmentString<D>>,
    ) -> Result<Vec<NodedSegmentString<D>>> {
        let mut strings: Vec<_> = strings
            .into_iter()
            .filter_map(|ss| {
                let (pts, data) = ss.into_parts();
                let rounded: Vec<_> = pts.iter().map(|c| self.precision.make_precise(*c)).collect();
                let pts = remove_repeated(&rounded);
                (pts.len() >= 2).then(|| NodedSegmentString::new(pts, data))
            })
            .collect();

        let mut finder = McIndexNoder::new(IntersectionFinderAdder::new(
            LineIntersector::with_precision(self.precision),
        ));
        finder.compute_intersections(&mut strings)?;
        let intersections = std::mem::take(&mut finder.intersector.interior_intersections);
        debug!(
            "snap rounding {} strings with {} interior intersections",
            strings.len(),
            intersections.len()
        );

        let chains = ChainIndex::new(
            strings
                .iter()
                .enumerate()
                .flat_map(|(i, s)| MonotoneChain::chains(i, s.coords()))
                .collect(),
        );

        for pt in intersections {
            let hp = HotPixel::new(pt, self.scale);
            self.snap(&mut strings, &chains, &hp, None)?;
        }

        for i in 0..strings.len() {
            for j in 0..strings[i].len() {
                let pt = strings[i].coord(j);
                let hp = HotPixel::new(pt, self.scale);
                if self.snap(&mut strings, &chains, &hp, Some((i, j)))? {
                    strings[i].add_intersection(pt, j)?;
                }
            }
        }

        NodedSegmentString::noded_substrings(&mut strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{tests::p, Coord};
    use proptest::prelude::*;

    fn snap_round(scale: f64, lines: Vec<Vec<Coord>>) -> Vec<NodedSegmentString<usize>> {
        let strings = lines
            .into_iter()
            .enumerate()
            .map(|(i, l)| NodedSegmentString::new(l, i))
            .collect();
        SnapRounder::new(scale).unwrap().node(strings).unwrap()
    }

    #[test]
    fn crossing_moves_to_grid() {
        // The lines cross at (5, 0.5), which rounds to (5, 1).
        let noded = snap_round(
            1.0,
            vec![
                vec![p(0.0, 0.0), p(10.0, 1.0)],
                vec![p(0.0, 1.0), p(10.0, 0.0)],
            ],
        );
        for line in [0, 1] {
            let pieces: Vec<_> = noded.iter().filter(|s| s.data == line).collect();
            assert_eq!(pieces.len(), 2);
            assert_eq!(pieces[0].coords().last(), Some(&p(5.0, 1.0)));
            assert_eq!(pieces[1].coord(0), p(5.0, 1.0));
        }
    }

    #[test]
    fn near_miss_shares_a_vertex() {
        // The second line passes within a pixel of the first one's end vertex.
        let noded = snap_round(
            10.0,
            vec![
                vec![p(0.0, 0.0), p(1.0, 1.0)],
                vec![p(0.0, 2.0), p(2.1, 0.0)],
            ],
        );
        let with_vertex: Vec<_> = noded
            .iter()
            .filter(|s| s.coords().contains(&p(1.0, 1.0)))
            .map(|s| s.data)
            .collect();
        assert!(with_vertex.contains(&0));
        assert!(with_vertex.contains(&1));
    }

    #[test]
    fn rounds_and_drops_collapsed() {
        let noded = snap_round(1.0, vec![vec![p(0.1, 0.1), p(0.2, 0.3)], vec![p(0.0, 0.0), p(2.4, 0.0)]]);
        assert_eq!(noded.len(), 1);
        assert_eq!(noded[0].coords(), &[p(0.0, 0.0), p(2.0, 0.0)]);
    }

    proptest! {
        #[test]
        fn output_is_on_grid(
            lines in prop::collection::vec(
                prop::collection::vec((-50.0..50.0f64, -50.0..50.0f64), 2..5),
                1..5,
            ),
        ) {
            let lines: Vec<Vec<Coord>> = lines
                .into_iter()
                .map(|l| l.into_iter().map(Coord::from).collect())
                .collect();
            let noded = snap_round(1.0, lines);
            for ss in &noded {
                for c in ss.coords() {
                    prop_assert_eq!(c.x, c.x.round());
                    prop_assert_eq!(c.y, c.y.round());
                }
            }
        }
    }
}
