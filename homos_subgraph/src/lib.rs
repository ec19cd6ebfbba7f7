//! Enumeration of digraph homomorphisms.
//!
//! Given a domain digraph `G1` and a codomain digraph `G2`, the search reports
//! every map `V(G1) -> V(G2)` that sends edges to edges (a homomorphism),
//! optionally only the injective ones (monomorphisms), only those agreeing
//! with a partial image, or only the first few.
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use homos_common::Config;
//! use homos_subgraph::{Digraph, find_homomorphisms};
//!
//! let edge = Digraph::from_edges(2, [(0, 1)]).unwrap();
//! let triangle = Digraph::from_edges(3, [(0, 1), (1, 2), (2, 0)]).unwrap();
//! let mut buffer = vec![0; 2];
//! let mut maps = Vec::new();
//! let report = find_homomorphisms(
//!     &edge,
//!     &triangle,
//!     &Config::default(),
//!     None,
//!     &mut buffer,
//!     |map: &[usize]| {
//!         maps.push(map.to_vec());
//!         ControlFlow::Continue(())
//!     },
//! )
//! .unwrap();
//! assert_eq!(report.results, 3);
//! maps.sort();
//! assert_eq!(maps, vec![vec![0, 1], vec![1, 2], vec![2, 0]]);
//! ```
//!
//! Automorphisms of the codomain are obtained from an [`AutomorphismOracle`]
//! and used to replay the results of one branch into its symmetric siblings
//! instead of searching them again.

mod error;
mod graph;
mod graph_index;
mod mapping;
mod report;
mod search;
mod symmetry;

pub mod automorphism;
pub mod profiling;
pub mod test_harness;

use std::ops::ControlFlow;

use homos_common::{Config, HintMode, SymmetryMode};
use tracing::info;

use crate::symmetry::Symmetry;

pub use crate::automorphism::{
    AutomorphismOracle, AutomorphismStats, BacktrackOracle, CanonicalForm,
};
pub use crate::error::HomosError;
pub use crate::graph::Digraph;
pub use crate::graph_index::GraphIndex;
pub use crate::mapping::{PartialMap, UNASSIGNED, is_homomorphism};
pub use crate::report::{SearchReport, StopReason};

/// Enumerates homomorphisms from `domain` to `codomain`, calling `hook` once
/// per map.
///
/// `map_buffer` is the working assignment; it needs one entry per domain
/// vertex and holds [`UNASSIGNED`] in all of them when the call returns. The
/// slice passed to `hook` is only valid during the call. Returning
/// `ControlFlow::Break` from `hook` ends the search. Codomain automorphisms
/// come from [`BacktrackOracle`].
///
/// # Errors
///
/// See [`HomosError`]: a short buffer, or a partial image that is missing,
/// has the wrong length, names a vertex outside the codomain or maps an edge
/// to a non-edge, or an allowed target outside the codomain.
pub fn find_homomorphisms<H>(
    domain: &Digraph,
    codomain: &Digraph,
    config: &Config,
    image: Option<&PartialMap>,
    map_buffer: &mut [usize],
    hook: H,
) -> Result<SearchReport, HomosError>
where
    H: FnMut(&[usize]) -> ControlFlow<()>,
{
    find_homomorphisms_with(
        &BacktrackOracle,
        domain,
        codomain,
        config,
        image,
        map_buffer,
        hook,
    )
}

/// Bounded searches up to this many results skip the automorphism oracle.
pub const FEW_RESULTS: usize = 64;

/// Whether a search under `config` asks the oracle for codomain generators.
///
/// Symmetry only pays off when the search is long enough: the oracle is
/// skipped for domains with at most one vertex, codomains with at most one
/// vertex and searches capped at [`FEW_RESULTS`] maps or fewer.
#[must_use]
pub fn wants_automorphisms(domain: &Digraph, codomain: &Digraph, config: &Config) -> bool {
    config.symmetry == SymmetryMode::Codomain
        && config.replay_buffer_limit > 0
        && domain.vertex_count() > 1
        && codomain.vertex_count() > 1
        && config.max_results.is_none_or(|max| max > FEW_RESULTS)
}

/// [`find_homomorphisms`] with a caller-chosen automorphism oracle.
///
/// # Errors
///
/// As for [`find_homomorphisms`].
pub fn find_homomorphisms_with<O, H>(
    oracle: &O,
    domain: &Digraph,
    codomain: &Digraph,
    config: &Config,
    image: Option<&PartialMap>,
    map_buffer: &mut [usize],
    hook: H,
) -> Result<SearchReport, HomosError>
where
    O: AutomorphismOracle + ?Sized,
    H: FnMut(&[usize]) -> ControlFlow<()>,
{
    search::validate(domain, codomain, config, image, map_buffer.len())?;
    let generators = if wants_automorphisms(domain, codomain, config) {
        let _t = profiling::Timer::new("search::automorphisms");
        oracle.generators(codomain)
    } else {
        Vec::new()
    };
    find_homomorphisms_with_generators(
        domain,
        codomain,
        config,
        image,
        map_buffer,
        &generators,
        hook,
    )
}

/// [`find_homomorphisms`] replaying through caller-supplied codomain
/// automorphisms instead of asking an oracle.
///
/// Entries of `generators` that are not automorphisms of `codomain` are
/// ignored. The generators are only used with [`SymmetryMode::Codomain`].
///
/// # Errors
///
/// As for [`find_homomorphisms`].
pub fn find_homomorphisms_with_generators<H>(
    domain: &Digraph,
    codomain: &Digraph,
    config: &Config,
    image: Option<&PartialMap>,
    map_buffer: &mut [usize],
    generators: &[Vec<usize>],
    mut hook: H,
) -> Result<SearchReport, HomosError>
where
    H: FnMut(&[usize]) -> ControlFlow<()>,
{
    info!(
        "starting homomorphism search: {} -> {} vertices",
        domain.vertex_count(),
        codomain.vertex_count()
    );
    search::validate(domain, codomain, config, image, map_buffer.len())?;

    let hinted = image.filter(|_| config.hint == HintMode::UseImage);
    let symmetry = if config.symmetry == SymmetryMode::Codomain {
        Symmetry::new(generators.to_vec(), codomain, config, hinted)
    } else {
        Symmetry::default()
    };
    let codomain_index = {
        let _t = profiling::Timer::new("search::index");
        GraphIndex::build(codomain)
    };

    let report = search::run(
        domain,
        &codomain_index,
        config,
        image,
        map_buffer,
        symmetry,
        &mut hook,
    );
    info!(
        "homomorphism search finished: {} results ({} replayed), {} nodes, {:?}",
        report.results, report.replayed, report.nodes, report.stop
    );
    Ok(report)
}

/// A reusable search front end owning its configuration, buffer and oracle.
///
/// The generators of the last codomain searched are cached, so repeated
/// searches into one codomain ask the oracle once.
#[derive(Clone, Debug, Default)]
pub struct HomomorphismFinder<O = BacktrackOracle> {
    config: Config,
    oracle: O,
    buffer: Vec<usize>,
    generators: Option<(Digraph, Vec<Vec<usize>>)>,
}

impl HomomorphismFinder {
    /// A finder using [`BacktrackOracle`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_oracle(config, BacktrackOracle)
    }
}

impl<O: AutomorphismOracle> HomomorphismFinder<O> {
    /// A finder using `oracle` for codomain automorphisms.
    pub const fn with_oracle(config: Config, oracle: O) -> Self {
        Self {
            config,
            oracle,
            buffer: Vec::new(),
            generators: None,
        }
    }

    /// The configuration every search runs with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The oracle asked for codomain automorphisms.
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Runs one search, see [`find_homomorphisms`].
    ///
    /// # Errors
    ///
    /// As for [`find_homomorphisms`].
    pub fn find<H>(
        &mut self,
        domain: &Digraph,
        codomain: &Digraph,
        image: Option<&PartialMap>,
        hook: H,
    ) -> Result<SearchReport, HomosError>
    where
        H: FnMut(&[usize]) -> ControlFlow<()>,
    {
        if self.buffer.len() < domain.vertex_count() {
            self.buffer.resize(domain.vertex_count(), UNASSIGNED);
        }
        search::validate(domain, codomain, &self.config, image, self.buffer.len())?;

        let wanted = wants_automorphisms(domain, codomain, &self.config);
        let stale = self
            .generators
            .as_ref()
            .is_none_or(|(cached, _)| cached != codomain);
        if wanted && stale {
            let _t = profiling::Timer::new("search::automorphisms");
            let generators = self.oracle.generators(codomain);
            self.generators = Some((codomain.clone(), generators));
        }
        let generators: &[Vec<usize>] = match &self.generators {
            Some((_, generators)) if wanted => generators,
            _ => &[],
        };

        find_homomorphisms_with_generators(
            domain,
            codomain,
            &self.config,
            image,
            &mut self.buffer,
            generators,
            hook,
        )
    }

    /// Every reported map, in the order reported.
    ///
    /// # Errors
    ///
    /// As for [`find_homomorphisms`].
    pub fn collect(
        &mut self,
        domain: &Digraph,
        codomain: &Digraph,
        image: Option<&PartialMap>,
    ) -> Result<Vec<Vec<usize>>, HomosError> {
        let mut maps = Vec::new();
        self.find(domain, codomain, image, |map| {
            maps.push(map.to_vec());
            ControlFlow::Continue(())
        })?;
        Ok(maps)
    }

    /// The number of reported maps.
    ///
    /// # Errors
    ///
    /// As for [`find_homomorphisms`].
    pub fn count(
        &mut self,
        domain: &Digraph,
        codomain: &Digraph,
        image: Option<&PartialMap>,
    ) -> Result<usize, HomosError> {
        self.find(domain, codomain, image, |_| ControlFlow::Continue(()))
            .map(|report| report.results)
    }
}
