//! Random perturbations of polylines, for property tests that want inputs
//! with near-coincidences.

use proptest::{arbitrary::any, prop_oneof, strategy::Strategy};

use crate::geom::Coord;

#[derive(Clone, Copy, Debug)]
pub enum FloatPerturbation {
    /// Perturb by between -128 and 127 ulps.
    Ulp(i8),
    /// Perturb by a bounded additive amount.
    Eps(f64),
}

impl FloatPerturbation {
    fn apply(&self, f: f64) -> f64 {
        match self {
            FloatPerturbation::Ulp(n) => {
                let mut f = f;
                for _ in 0..n.unsigned_abs() {
                    f = if *n > 0 { f.next_up() } else { f.next_down() };
                }
                f
            }
            FloatPerturbation::Eps(x) => f + x,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CoordPerturbation {
    pub x: FloatPerturbation,
    pub y: FloatPerturbation,
}

impl CoordPerturbation {
    pub fn apply(&self, p: Coord) -> Coord {
        Coord::new(self.x.apply(p.x), self.y.apply(p.y))
    }
}

#[derive(Clone, Debug)]
pub enum Perturbation {
    Base {
        idx: usize,
    },
    Point {
        perturbation: CoordPerturbation,
        idx: usize,
        next: Box<Perturbation>,
    },
    Subdivision {
        // Between 0.0 and 1.0
        t: f64,
        idx: usize,
        next: Box<Perturbation>,
    },
}

pub fn float_perturbation(eps: f64) -> impl Strategy<Value = FloatPerturbation> {
    prop_oneof![
        any::<i8>().prop_map(FloatPerturbation::Ulp),
        (-eps..=eps).prop_map(FloatPerturbation::Eps)
    ]
}

pub fn coord_perturbation(eps: f64) -> impl Strategy<Value = CoordPerturbation> {
    (float_perturbation(eps), float_perturbation(eps)).prop_map(|(x, y)| CoordPerturbation { x, y })
}

pub fn perturbation(eps: f64) -> impl Strategy<Value = Perturbation> {
    let leaf = any::<usize>().prop_map(|idx| Perturbation::Base { idx });
    leaf.prop_recursive(3, 16, 8, move |inner| {
        prop_oneof![
            (coord_perturbation(eps), any::<usize>(), inner.clone()).prop_map(
                |(perturbation, idx, next)| Perturbation::Point {
                    perturbation,
                    idx,
                    next: Box::new(next),
                }
            ),
            (0.0..1.0, any::<usize>(), inner.clone()).prop_map(|(t, idx, next)| {
                Perturbation::Subdivision {
                    t,
                    idx,
                    next: Box::new(next),
                }
            }),
        ]
    })
}

fn index<T>(arr: &[T], idx: usize) -> &T {
    &arr[idx % arr.len()]
}

/// Applies a perturbation to one of the base polylines. The result is treated
/// as a closed polyline: subdividing the last vertex splits the closing
/// segment.
pub fn realize_perturbation(base_cases: &[Vec<Coord>], pert: &Perturbation) -> Vec<Coord> {
    match pert {
        Perturbation::Base { idx } => index(base_cases, *idx).to_owned(),
        Perturbation::Point {
            perturbation,
            idx,
            next,
        } => {
            let mut next = realize_perturbation(base_cases, next);
            let len = next.len();
            let p = &mut next[*idx % len];
            *p = perturbation.apply(*p);
            next
        }
        Perturbation::Subdivision { t, idx, next } => {
            let mut next = realize_perturbation(base_cases, next);
            let idx = *idx % next.len();
            let p0 = *index(&next, idx);
            let p1 = *index(&next, idx + 1);
            let mid = Coord::new(p0.x + t * (p1.x - p0.x), p0.y + t * (p1.y - p0.y));
            next.insert(idx + 1, mid);
            next
        }
    }
}
