use std::ops::ControlFlow;

use homos_common::{Config, HintMode, SymmetryMode};
use tracing::debug;

use super::canonical::CanonicalSearch;
use super::{AutomorphismOracle, AutomorphismStats, CanonicalForm};
use crate::symmetry::{Symmetry, orbit};
use crate::{Digraph, GraphIndex, PartialMap, UNASSIGNED, search};

/// Automorphism oracle built on the homomorphism search itself.
///
/// Generators form a strong generating set for the base `0, 1, ..., n-1`:
/// for every level `i`, from the last one down, and every vertex `t` not yet
/// known to share an orbit with `i`, the injective search is asked for one
/// automorphism fixing `0..i` pointwise and sending `i` to `t`. The group
/// order is the product of the basic orbit sizes.
///
/// Canonical labelings come from partition refinement with individualization,
/// see [`AutomorphismOracle::canonical_form`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BacktrackOracle;

impl AutomorphismOracle for BacktrackOracle {
    fn find_automorphisms(
        &self,
        graph: &Digraph,
        hook: &mut dyn FnMut(&[usize]),
    ) -> AutomorphismStats {
        let n = graph.vertex_count();
        let mut stats = AutomorphismStats {
            group_size_approx: 1.0,
            max_level: n as u64,
            ..AutomorphismStats::default()
        };
        let mut generators: Vec<Vec<usize>> = Vec::new();
        let index = GraphIndex::build(graph);

        for level in (0..n).rev() {
            let mut basic_orbit = orbit(level, &generators, n);
            for target in level + 1..n {
                if basic_orbit.contains(&target) || graph.color(target) != graph.color(level) {
                    continue;
                }
                let pairs: Vec<(usize, usize)> =
                    (0..level).map(|v| (v, v)).chain([(level, target)]).collect();
                let (found, nodes) = extend_to_automorphism(graph, &index, &pairs);
                stats.nof_nodes += nodes;
                match found {
                    Some(perm) => {
                        stats.nof_leaf_nodes += 1;
                        stats.nof_generators += 1;
                        hook(&perm);
                        generators.push(perm);
                        basic_orbit = orbit(level, &generators, n);
                    }
                    None => stats.nof_bad_nodes += 1,
                }
            }
            stats.group_size_approx *= basic_orbit.len() as f64;
        }

        debug!(
            "automorphism group of a {}-vertex graph: order {}, {} generators",
            n, stats.group_size_approx, stats.nof_generators
        );
        stats
    }

    /// Individualize-and-refine search over colour-refined partitions,
    /// keeping the labeling whose relabeled graph has the smallest
    /// certificate. A sibling is skipped when an automorphism fixing the
    /// individualized vertices maps an explored sibling onto it.
    fn canonical_form(&self, graph: &Digraph, hook: &mut dyn FnMut(&[usize])) -> CanonicalForm {
        let (labeling, mut stats) = CanonicalSearch::new(graph, hook).run();
        stats.group_size_approx = self
            .find_automorphisms(graph, &mut |_| {})
            .group_size_approx;
        CanonicalForm { labeling, stats }
    }
}

/// One automorphism of `graph` extending the fixed `pairs`, if any, and the
/// number of search nodes spent looking for it.
pub(super) fn extend_to_automorphism(
    graph: &Digraph,
    index: &GraphIndex,
    pairs: &[(usize, usize)],
) -> (Option<Vec<usize>>, u64) {
    let n = graph.vertex_count();
    let mut image = PartialMap::new(n);
    for &(from, to) in pairs {
        image.set(from, Some(to));
    }
    let config = Config::builder()
        .injective(true)
        .hint(HintMode::UseImage)
        .symmetry(SymmetryMode::Off)
        .max_results(1)
        .build();

    // Fixed pairs that already break an edge cannot extend.
    if search::validate(graph, graph, &config, Some(&image), n).is_err() {
        return (None, 0);
    }

    let mut buffer = vec![UNASSIGNED; n];
    let mut found = None;
    let report = search::run(
        graph,
        index,
        &config,
        Some(&image),
        &mut buffer,
        Symmetry::default(),
        &mut |perm: &[usize]| {
            found = Some(perm.to_vec());
            ControlFlow::Break(())
        },
    );
    (found, report.nodes)
}
