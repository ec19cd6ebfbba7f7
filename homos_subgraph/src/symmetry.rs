//! Codomain automorphisms used to replay search results.
//!
//! A generator `g` of Aut(G2) that fixes the images assigned so far maps
//! every completion `m` of the current partial map to the completion `g ∘ m`.
//! Only generators that also preserve the allowed targets and fix every
//! hinted image are kept, so `g ∘ m` honours the same restrictions as `m`.
//! Permutations that are not automorphisms of the codomain are dropped.

use std::collections::VecDeque;

use homos_common::Config;
use tracing::debug;

use crate::graph::is_permutation;
use crate::{Digraph, PartialMap, is_homomorphism};

/// Generators of Aut(G2) that are safe to replay through.
#[derive(Clone, Debug, Default)]
pub(crate) struct Symmetry {
    generators: Vec<Vec<usize>>,
}

impl Symmetry {
    /// Keeps the non-identity automorphisms compatible with the restrictions.
    pub(crate) fn new(
        generators: Vec<Vec<usize>>,
        codomain: &Digraph,
        config: &Config,
        image: Option<&PartialMap>,
    ) -> Self {
        let n2 = codomain.vertex_count();
        let total = generators.len();
        let (generators, broken): (Vec<Vec<usize>>, Vec<Vec<usize>>) =
            generators.into_iter().partition(|g| {
                is_permutation(g, n2) && is_homomorphism(codomain, codomain, g, config.respect_colors)
            });
        if !broken.is_empty() {
            debug!(
                "dropped {} generators that are not codomain automorphisms",
                broken.len()
            );
        }

        let allowed = config.targets.as_ref().map(|targets| {
            let mut allowed = vec![false; n2];
            for &t in targets {
                allowed[t] = true;
            }
            allowed
        });
        let generators: Vec<Vec<usize>> = generators
            .into_iter()
            .filter(|g| g.iter().enumerate().any(|(x, &y)| x != y))
            .filter(|g| {
                allowed
                    .as_ref()
                    .is_none_or(|allowed| (0..n2).all(|t| !allowed[t] || allowed[g[t]]))
            })
            .filter(|g| image.is_none_or(|image| image.fixed().all(|(_, t)| g[t] == t)))
            .collect();
        debug!(
            "kept {} of {} codomain automorphism generators",
            generators.len(),
            total
        );
        Self { generators }
    }

    pub(crate) fn generators(&self) -> &[Vec<usize>] {
        &self.generators
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Indices of every generator, the active set at the root.
    pub(crate) fn all(&self) -> Vec<usize> {
        (0..self.generators.len()).collect()
    }

    /// The members of `active` that also fix `point`.
    pub(crate) fn fixing(&self, active: &[usize], point: usize) -> Vec<usize> {
        active
            .iter()
            .copied()
            .filter(|&g| self.generators[g][point] == point)
            .collect()
    }

    /// Orbit of `point` under the `active` generators with, for each orbit
    /// point `w`, a group element sending `point` to `w`. The first entry is
    /// `point` itself with the identity.
    pub(crate) fn transversal(&self, active: &[usize], point: usize) -> Vec<(usize, Vec<usize>)> {
        let n = self.generators.first().map_or(0, Vec::len);
        let mut seen = vec![false; n];
        seen[point] = true;
        let mut out = vec![(point, (0..n).collect::<Vec<usize>>())];
        let mut queue = VecDeque::from([0]);
        while let Some(at) = queue.pop_front() {
            for &g in active {
                let g = &self.generators[g];
                let w = g[out[at].0];
                if !seen[w] {
                    seen[w] = true;
                    let element = compose(g, &out[at].1);
                    out.push((w, element));
                    queue.push_back(out.len() - 1);
                }
            }
        }
        out
    }
}

/// `(outer ∘ inner)(x) = outer[inner[x]]`.
pub(crate) fn compose(outer: &[usize], inner: &[usize]) -> Vec<usize> {
    inner.iter().map(|&x| outer[x]).collect()
}

/// Orbit of `point` under `generators`, in discovery order.
pub(crate) fn orbit(point: usize, generators: &[Vec<usize>], n: usize) -> Vec<usize> {
    let mut seen = vec![false; n];
    seen[point] = true;
    let mut orbit = vec![point];
    let mut next = 0;
    while next < orbit.len() {
        let x = orbit[next];
        next += 1;
        for g in generators {
            let y = g[x];
            if !seen[y] {
                seen[y] = true;
                orbit.push(y);
            }
        }
    }
    orbit
}
