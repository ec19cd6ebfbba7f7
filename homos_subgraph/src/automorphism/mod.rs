//! Automorphism groups and canonical labelings of digraphs.
//!
//! The search only talks to an [`AutomorphismOracle`]; [`BacktrackOracle`] is
//! the implementation shipped with this crate.

mod backtrack;
mod canonical;

pub use backtrack::BacktrackOracle;

use crate::Digraph;

/// Counters describing one oracle run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AutomorphismStats {
    /// Order of the automorphism group. Exact for [`BacktrackOracle`] as long
    /// as it fits in an `f64`.
    pub group_size_approx: f64,
    /// Search tree nodes visited.
    pub nof_nodes: u64,
    /// Leaves reached.
    pub nof_leaf_nodes: u64,
    /// Nodes abandoned without producing anything.
    pub nof_bad_nodes: u64,
    /// Times a better canonical candidate replaced the current one.
    pub nof_canonical_updates: u64,
    /// Generators reported to the hook.
    pub nof_generators: u64,
    /// Deepest level of the search tree.
    pub max_level: u64,
}

/// A canonical labeling together with the statistics of the run producing it.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalForm {
    /// `labeling[v]` is the new index of vertex `v`.
    pub labeling: Vec<usize>,
    /// Counters of the run.
    pub stats: AutomorphismStats,
}

/// Source of automorphism information for a digraph.
///
/// Automorphisms are colour preserving. Every permutation passed to a hook
/// is indexed by vertex: `perm[v]` is the image of `v`. Implementations are
/// stateless with respect to the graphs they are given.
pub trait AutomorphismOracle {
    /// Reports a generating set of the automorphism group of `graph`, one
    /// permutation per hook call.
    fn find_automorphisms(
        &self,
        graph: &Digraph,
        hook: &mut dyn FnMut(&[usize]),
    ) -> AutomorphismStats;

    /// Computes a canonical labeling of `graph`: isomorphic graphs yield
    /// identical [`Digraph::permuted`] results. Automorphisms discovered on
    /// the way are reported to `hook`.
    fn canonical_form(&self, graph: &Digraph, hook: &mut dyn FnMut(&[usize])) -> CanonicalForm;

    /// Collects the generators reported by
    /// [`find_automorphisms`](Self::find_automorphisms).
    fn generators(&self, graph: &Digraph) -> Vec<Vec<usize>> {
        let mut generators = Vec::new();
        self.find_automorphisms(graph, &mut |perm| generators.push(perm.to_vec()));
        generators
    }
}
