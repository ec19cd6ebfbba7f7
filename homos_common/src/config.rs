//! Configuration for the homomorphism search.
//!
//! The search entry points take a [`Config`] describing what to enumerate
//! (how many maps, whether they must be injective, whether a partial image
//! constrains them) and how to search (visiting order, symmetry pruning).
//!
//! Quick examples
//!
//! All homomorphisms (the default):
//! ```
//! use homos_common::Config;
//! let cfg = Config::default();
//! assert!(cfg.max_results.is_none());
//! ```
//!
//! The first monomorphism only:
//! ```
//! use homos_common::Config;
//! let cfg = Config::builder().injective(true).max_results(1).build();
//! assert_eq!(cfg.max_results, Some(1));
//! ```
//!
//! Respect a caller-supplied partial image, no symmetry pruning:
//! ```
//! use homos_common::{Config, HintMode, SymmetryMode};
//! let cfg = Config::builder()
//!     .hint(HintMode::UseImage)
//!     .symmetry(SymmetryMode::Off)
//!     .build();
//! assert_eq!(cfg.hint, HintMode::UseImage);
//! ```

/// Global search configuration.
///
/// - max_results: stop after this many maps; `None` means unbounded.
/// - injective: only report maps sending distinct vertices to distinct vertices.
/// - hint: whether the partial image passed to the search is honoured.
/// - rank: only report maps whose image has exactly this many vertices.
/// - targets: only use these codomain vertices as images.
/// - respect_colors: a vertex may only map to a vertex of the same colour.
/// - symmetry: which automorphisms are used to prune the search.
/// - order: how the next domain vertex is chosen.
/// - replay_buffer_limit: how many maps one branch may hold for replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of maps reported, `None` for all of them.
    pub max_results: Option<usize>,
    /// Whether reported maps must be injective.
    pub injective: bool,
    /// Whether the partial image is used.
    pub hint: HintMode,
    /// Exact number of distinct image vertices required, if any.
    pub rank: Option<usize>,
    /// Codomain vertices that may be used as images, if restricted.
    pub targets: Option<Vec<usize>>,
    /// Whether vertex colours must be preserved.
    pub respect_colors: bool,
    /// Automorphism-based pruning.
    pub symmetry: SymmetryMode,
    /// Domain vertex visiting order.
    pub order: VertexOrder,
    /// Maps one branch may buffer for replay into its symmetric siblings.
    /// Past this the siblings are searched directly; 0 disables replay.
    pub replay_buffer_limit: usize,
}

/// Default for [`Config::replay_buffer_limit`].
pub const DEFAULT_REPLAY_BUFFER_LIMIT: usize = 4096;

impl Config {
    /// Starts a builder initialised with the defaults.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether `found` maps exhaust the configured limit.
    #[must_use]
    pub fn limit_reached(&self, found: usize) -> bool {
        self.max_results.is_some_and(|max| found >= max)
    }
}

impl Default for Config {
    /// Every homomorphism, colours respected, codomain symmetry pruning on.
    fn default() -> Self {
        Self {
            max_results: None,
            injective: false,
            hint: HintMode::None,
            rank: None,
            targets: None,
            respect_colors: true,
            symmetry: SymmetryMode::Codomain,
            order: VertexOrder::FewestCandidates,
            replay_buffer_limit: DEFAULT_REPLAY_BUFFER_LIMIT,
        }
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Caps the number of reported maps. Zero means unbounded.
    #[must_use]
    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = (max != 0).then_some(max);
        self
    }

    /// Removes any cap on the number of reported maps.
    #[must_use]
    pub fn unbounded(mut self) -> Self {
        self.config.max_results = None;
        self
    }

    /// Restricts the search to injective maps.
    #[must_use]
    pub fn injective(mut self, injective: bool) -> Self {
        self.config.injective = injective;
        self
    }

    /// Selects whether the partial image is honoured.
    #[must_use]
    pub fn hint(mut self, hint: HintMode) -> Self {
        self.config.hint = hint;
        self
    }

    /// Requires exactly `rank` distinct image vertices.
    #[must_use]
    pub fn rank(mut self, rank: usize) -> Self {
        self.config.rank = Some(rank);
        self
    }

    /// Restricts images to the given codomain vertices.
    #[must_use]
    pub fn targets(mut self, targets: impl IntoIterator<Item = usize>) -> Self {
        self.config.targets = Some(targets.into_iter().collect());
        self
    }

    /// Selects whether colours must be preserved.
    #[must_use]
    pub fn respect_colors(mut self, respect: bool) -> Self {
        self.config.respect_colors = respect;
        self
    }

    /// Selects the symmetry pruning mode.
    #[must_use]
    pub fn symmetry(mut self, symmetry: SymmetryMode) -> Self {
        self.config.symmetry = symmetry;
        self
    }

    /// Selects the visiting order.
    #[must_use]
    pub fn order(mut self, order: VertexOrder) -> Self {
        self.config.order = order;
        self
    }

    /// Caps the maps buffered per branch for symmetry replay.
    #[must_use]
    pub fn replay_buffer_limit(mut self, limit: usize) -> Self {
        self.config.replay_buffer_limit = limit;
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

/// Whether a caller-supplied partial image constrains the search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HintMode {
    /// Ignore any partial image.
    #[default]
    None,
    /// Every reported map agrees with the fixed entries of the partial image.
    UseImage,
}

/// Automorphism-based pruning of the search tree.
///
/// - Off: plain backtracking.
/// - Codomain: candidates that are equivalent under an automorphism of the
///   codomain fixing the current partial image are explored once; the other
///   branches are reported by mapping the explored results through that
///   automorphism. The reported set of maps is the same in both modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SymmetryMode {
    /// No automorphisms are computed.
    Off,
    /// Use automorphisms of the codomain.
    #[default]
    Codomain,
}

/// How the search picks the next domain vertex to assign.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VertexOrder {
    /// Ascending vertex index.
    Index,
    /// Fixed order computed up front: most connections to already ordered vertices first.
    DegreeGuided,
    /// At every depth, the unassigned vertex with the fewest remaining candidates.
    #[default]
    FewestCandidates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_results_is_unbounded() {
        let cfg = Config::builder().max_results(0).build();
        assert_eq!(cfg.max_results, None);
        assert!(!cfg.limit_reached(usize::MAX));
    }

    #[test]
    fn limit_reached_counts_inclusively() {
        let cfg = Config::builder().max_results(2).build();
        assert!(!cfg.limit_reached(1));
        assert!(cfg.limit_reached(2));
    }

    #[test]
    fn builder_sets_every_field() {
        let cfg = Config::builder()
            .injective(true)
            .hint(HintMode::UseImage)
            .rank(2)
            .targets([3, 1])
            .respect_colors(false)
            .symmetry(SymmetryMode::Off)
            .order(VertexOrder::Index)
            .replay_buffer_limit(16)
            .build();
        assert!(cfg.injective);
        assert_eq!(cfg.hint, HintMode::UseImage);
        assert_eq!(cfg.rank, Some(2));
        assert_eq!(cfg.targets, Some(vec![3, 1]));
        assert!(!cfg.respect_colors);
        assert_eq!(cfg.symmetry, SymmetryMode::Off);
        assert_eq!(cfg.order, VertexOrder::Index);
        assert_eq!(cfg.replay_buffer_limit, 16);
        assert_eq!(
            Config::default().replay_buffer_limit,
            DEFAULT_REPLAY_BUFFER_LIMIT
        );
    }
}
