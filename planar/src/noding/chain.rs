//! Monotone chains: runs of segments whose direction stays in one quadrant.
//!
//! A monotone chain is monotone in both x and y, so the envelope of any
//! sub-run is just the envelope of its two end vertices. This lets overlap
//! queries bisect chains without looking at the segments in between.

use crate::{
    geom::{Coord, Envelope},
    graph::quadrant::quadrant_of,
};

/// A monotone run of segments `start..end` (vertex indices) in one string.
#[derive(Clone, Copy, Debug)]
pub struct MonotoneChain {
    /// Which string (in the caller's list) this chain belongs to.
    pub string: usize,
    pub start: usize,
    pub end: usize,
    pub env: Envelope,
}

impl MonotoneChain {
    /// Splits a coordinate sequence into monotone chains.
    pub fn chains(string: usize, pts: &[Coord]) -> Vec<MonotoneChain> {
        let starts = chain_start_indices(pts);
        starts
            .windows(2)
            .map(|w| MonotoneChain {
                string,
                start: w[0],
                end: w[1],
                env: Envelope::of_points(pts[w[0]], pts[w[1]]),
            })
            .collect()
    }

    /// Calls `f` on the index of every segment of this chain whose envelope
    /// intersects `env`.
    pub fn select(&self, pts: &[Coord], env: &Envelope, mut f: impl FnMut(usize)) {
        let mut stack = vec![(self.start, self.end)];
        while let Some((start, end)) = stack.pop() {
            if !env.intersects(&Envelope::of_points(pts[start], pts[end])) {
                continue;
            }
            if end - start == 1 {
                f(start);
                continue;
            }
            let mid = (start + end) / 2;
            // Push the later half first, so that segments come out in order.
            if mid < end {
                stack.push((mid, end));
            }
            if start < mid {
                stack.push((start, mid));
            }
        }
    }

    /// Calls `f(i, j)` for every pair of segments (`i` in this chain, `j` in
    /// `other`) whose envelopes might intersect.
    pub fn overlaps(
        &self,
        pts: &[Coord],
        other: &MonotoneChain,
        other_pts: &[Coord],
        mut f: impl FnMut(usize, usize),
    ) {
        let mut stack = vec![(self.start, self.end, other.start, other.end)];
        while let Some((s0, e0, s1, e1)) = stack.pop() {
            if e0 - s0 == 1 && e1 - s1 == 1 {
                f(s0, s1);
                continue;
            }
            let env0 = Envelope::of_points(pts[s0], pts[e0]);
            let env1 = Envelope::of_points(other_pts[s1], other_pts[e1]);
            if !env0.intersects(&env1) {
                continue;
            }
            let mid0 = (s0 + e0) / 2;
            let mid1 = (s1 + e1) / 2;
            let mut halves = Vec::with_capacity(4);
            if s0 < mid0 {
                if s1 < mid1 {
                    halves.push((s0, mid0, s1, mid1));
                }
                if mid1 < e1 {
                    halves.push((s0, mid0, mid1, e1));
                }
            }
            if mid0 < e0 {
                if s1 < mid1 {
                    halves.push((mid0, e0, s1, mid1));
                }
                if mid1 < e1 {
                    halves.push((mid0, e0, mid1, e1));
                }
            }
            stack.extend(halves.into_iter().rev());
        }
    }
}

/// Monotone chains sorted by minimum x, for repeated envelope queries.
///
/// Alongside the sort, `reach[i]` holds the largest maximum x among the first
/// `i + 1` chains. Both are non-decreasing, so a query bisects for the range
/// of chains that can overlap it in x and scans only that range.
#[derive(Clone, Debug, Default)]
pub struct ChainIndex {
    chains: Vec<MonotoneChain>,
    reach: Vec<f64>,
}

impl ChainIndex {
    pub fn new(mut chains: Vec<MonotoneChain>) -> Self {
        chains.sort_by(|a, b| a.env.min_x.total_cmp(&b.env.min_x));
        let reach = chains
            .iter()
            .scan(f64::NEG_INFINITY, |max, c| {
                *max = max.max(c.env.max_x);
                Some(*max)
            })
            .collect();
        ChainIndex { chains, reach }
    }

    /// The chains whose envelopes intersect `env`.
    pub fn query<'a>(&'a self, env: &'a Envelope) -> impl Iterator<Item = &'a MonotoneChain> + 'a {
        let lo = self.reach.partition_point(|&x| x < env.min_x);
        let hi = self.chains.partition_point(|c| c.env.min_x <= env.max_x);
        self.chains[lo..hi.max(lo)]
            .iter()
            .filter(move |c| c.env.intersects(env))
    }
}

/// The vertex indices at which monotone chains start, plus the last index.
pub fn chain_start_indices(pts: &[Coord]) -> Vec<usize> {
    let mut ret = vec![0];
    if pts.len() < 2 {
        return ret;
    }
    let mut start = 0;
    loop {
        let last = find_chain_end(pts, start);
        ret.push(last);
        start = last;
        if start >= pts.len() - 1 {
            break;
        }
    }
    ret
}

// Repeated points have no direction, so they never end a chain.
fn find_chain_end(pts: &[Coord], start: usize) -> usize {
    let n = pts.len();
    let mut safe_start = start;
    while safe_start < n - 1 && pts[safe_start] == pts[safe_start + 1] {
        safe_start += 1;
    }
    if safe_start >= n - 1 {
        return n - 1;
    }
    let chain_quad = quadrant_of(pts[safe_start], pts[safe_start + 1]);
    let mut last = start + 1;
    while last < n {
        if pts[last - 1] != pts[last] && quadrant_of(pts[last - 1], pts[last]) != chain_quad {
            break;
        }
        last += 1;
    }
    last - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::tests::{grid_coord, p};
    use proptest::prelude::*;

    #[test]
    fn zigzag() {
        let pts = vec![
            p(0.0, 0.0),
            p(1.0, 1.0),
            p(1.0, 1.0),
            p(2.0, 3.0),
            p(3.0, 2.0),
            p(4.0, 0.0),
            p(3.0, -1.0),
        ];
        assert_eq!(chain_start_indices(&pts), vec![0, 3, 5, 6]);
        let chains = MonotoneChain::chains(0, &pts);
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[1].env, Envelope::of_points(p(2.0, 3.0), p(4.0, 0.0)));
    }

    #[test]
    fn select_by_envelope() {
        let pts: Vec<_> = (0..10).map(|i| p(i as f64, i as f64)).collect();
        let chain = MonotoneChain::chains(0, &pts)[0];
        let mut hits = Vec::new();
        chain.select(&pts, &Envelope::of_points(p(4.5, 4.5), p(4.6, 4.6)), |i| hits.push(i));
        assert_eq!(hits, vec![4]);
    }

    #[test]
    fn index_query() {
        // A long diagonal, and short steps along the x axis.
        let diagonal = vec![p(0.0, 0.0), p(100.0, 100.0)];
        let steps: Vec<_> = (0..50).map(|i| p(2.0 * i as f64, if i % 2 == 0 { 0.0 } else { 1.0 })).collect();
        let mut chains = MonotoneChain::chains(0, &diagonal);
        chains.extend(MonotoneChain::chains(1, &steps));
        let index = ChainIndex::new(chains);

        let hits = |env: Envelope| {
            let mut hits: Vec<_> = index.query(&env).map(|c| (c.string, c.start)).collect();
            hits.sort();
            hits
        };
        // The diagonal starts before the query but reaches past it.
        assert_eq!(hits(Envelope::of_points(p(50.5, 50.5), p(50.6, 50.6))), vec![(0, 0)]);
        assert_eq!(hits(Envelope::of_points(p(40.5, 0.2), p(40.6, 0.3))), vec![(0, 0), (1, 20)]);
        assert_eq!(hits(Envelope::of_points(p(98.5, 0.2), p(99.0, 0.3))), vec![(0, 0)]);
        assert_eq!(hits(Envelope::of_points(p(0.5, 0.5), p(0.6, 0.6))), vec![(0, 0), (1, 0)]);
        assert!(hits(Envelope::of_points(p(200.0, 0.0), p(201.0, 1.0))).is_empty());
        assert!(hits(Envelope::of_points(p(-2.0, 0.0), p(-1.0, 1.0))).is_empty());
    }

    proptest! {
        #[test]
        fn index_query_matches_a_scan(
            a in prop::collection::vec(grid_coord(4), 2..8),
            b in prop::collection::vec(grid_coord(4), 2..8),
            q0 in grid_coord(4),
            q1 in grid_coord(4),
        ) {
            let mut chains = MonotoneChain::chains(0, &a);
            chains.extend(MonotoneChain::chains(1, &b));
            let env = Envelope::of_points(q0, q1);
            let key = |c: &MonotoneChain| (c.string, c.start);
            let mut expected: Vec<_> = chains.iter().filter(|c| c.env.intersects(&env)).map(key).collect();
            expected.sort();
            let index = ChainIndex::new(chains);
            let mut found: Vec<_> = index.query(&env).map(key).collect();
            found.sort();
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn overlaps_find_every_crossing(
            a in prop::collection::vec(grid_coord(4), 2..8),
            b in prop::collection::vec(grid_coord(4), 2..8),
        ) {
            let li = crate::intersector::LineIntersector::new();
            let mut found = std::collections::BTreeSet::new();
            for ca in MonotoneChain::chains(0, &a) {
                for cb in MonotoneChain::chains(1, &b) {
                    ca.overlaps(&a, &cb, &b, |i, j| {
                        found.insert((i, j));
                    });
                }
            }
            for i in 0..a.len() - 1 {
                for j in 0..b.len() - 1 {
                    if li.intersect(a[i], a[i + 1], b[j], b[j + 1]).has_intersection() {
                        prop_assert!(found.contains(&(i, j)));
                    }
                }
            }
        }
    }
}
