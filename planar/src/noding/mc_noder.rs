use crate::error::Result;

use super::{chain::MonotoneChain, NodedSegmentString, Noder, SegmentIntersector};

/// A noder that only tests pairs of monotone chains with overlapping envelopes.
///
/// Chains are sorted by their minimum x, and each chain is tested against the
/// following chains until their minimum x passes its maximum x.
#[derive(Clone, Debug, Default)]
pub struct McIndexNoder<SI> {
    pub intersector: SI,
    /// The number of chain pairs whose envelopes overlapped.
    pub num_overlaps: usize,
}

impl<SI: SegmentIntersector> McIndexNoder<SI> {
    pub fn new(intersector: SI) -> Self {
        McIndexNoder {
            intersector,
            num_overlaps: 0,
        }
    }

    /// Runs the intersector over all candidate segment pairs, without
    /// splitting anything.
    pub fn compute_intersections<D>(&mut self, strings: &mut [NodedSegmentString<D>]) -> Result<()> {
        let mut chains: Vec<MonotoneChain> = strings
            .iter()
            .enumerate()
            .flat_map(|(i, s)| MonotoneChain::chains(i, s.coords()))
            .collect();
        chains.sort_by(|a, b| a.env.min_x.total_cmp(&b.env.min_x));

        for (i, query) in chains.iter().enumerate() {
            for test in &chains[i + 1..] {
                if test.env.min_x > query.env.max_x {
                    break;
                }
                if !test.env.intersects(&query.env) {
                    continue;
                }
                self.num_overlaps += 1;

                let mut pairs = Vec::new();
                query.overlaps(
                    strings[query.string].coords(),
                    test,
                    strings[test.string].coords(),
                    |s0, s1| pairs.push((s0, s1)),
                );
                for (s0, s1) in pairs {
                    self.intersector
                        .process(strings, query.string, s0, test.string, s1)?;
                    if self.intersector.is_done() {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }
}

impl<SI: SegmentIntersector> Noder for McIndexNoder<SI> {
    fn node<D: Clone>(
        &mut self,
        mut strings: Vec<NodedSegmentString<D>>,
    ) -> Result<Vec<NodedSegmentString<D>>> {
        self.compute_intersections(&mut strings)?;
        NodedSegmentString::noded_substrings(&mut strings)
    }
}
