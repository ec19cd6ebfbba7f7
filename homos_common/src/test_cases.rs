//! Common graph fixtures and expected homomorphism counts.
//!
//! Fixtures are plain edge lists so that every crate in the workspace can
//! build its own graph type from them. [`ALL_TEST_CASES`] pairs a domain and a
//! codomain fixture with a configuration and the number of maps the search
//! must report.

use crate::config::{Config, SymmetryMode};

/// A directed graph described by its vertex count, edges and optional colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFixture {
    /// Human-readable name used in failure messages.
    pub name: String,
    /// Number of vertices.
    pub vertices: usize,
    /// Directed edges `(from, to)`.
    pub edges: Vec<(usize, usize)>,
    /// One colour per vertex, if the fixture is coloured.
    pub colors: Option<Vec<u32>>,
}

impl GraphFixture {
    /// Uncoloured fixture from an edge list.
    pub fn new(name: impl Into<String>, vertices: usize, edges: Vec<(usize, usize)>) -> Self {
        Self {
            name: name.into(),
            vertices,
            edges,
            colors: None,
        }
    }

    /// Same fixture with one colour per vertex.
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<u32>) -> Self {
        debug_assert_eq!(colors.len(), self.vertices);
        self.colors = Some(colors);
        self
    }

    /// `n` vertices, no edges.
    #[must_use]
    pub fn empty(n: usize) -> Self {
        Self::new(format!("empty_{n}"), n, Vec::new())
    }

    /// Directed cycle `0 -> 1 -> ... -> n-1 -> 0`.
    #[must_use]
    pub fn cycle(n: usize) -> Self {
        let edges = (0..n).map(|i| (i, (i + 1) % n)).collect();
        Self::new(format!("cycle_{n}"), n, edges)
    }

    /// Directed path `0 -> 1 -> ... -> n-1`.
    #[must_use]
    pub fn path(n: usize) -> Self {
        let edges = (1..n).map(|i| (i - 1, i)).collect();
        Self::new(format!("path_{n}"), n, edges)
    }

    /// Every ordered pair of distinct vertices is an edge.
    #[must_use]
    pub fn complete(n: usize) -> Self {
        let edges = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();
        Self::new(format!("complete_{n}"), n, edges)
    }

    /// One vertex with a loop.
    #[must_use]
    pub fn self_loop() -> Self {
        Self::new("self_loop", 1, vec![(0, 0)])
    }
}

/// A complete test case definition.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// The name of the test case.
    pub name: &'static str,
    /// The configuration for the search.
    pub config: Config,
    /// The graph mapped from.
    pub domain: &'static GraphFixture,
    /// The graph mapped into.
    pub codomain: &'static GraphFixture,
    /// The expected number of maps.
    pub expected_matches: usize,
}

// #####################
// FIXTURES
// #####################
lazy_static::lazy_static! {
    /// A single edge `0 -> 1`.
    pub static ref EDGE: GraphFixture = GraphFixture::path(2);
    /// Directed 2-cycle.
    pub static ref CYCLE_2: GraphFixture = GraphFixture::cycle(2);
    /// Directed 3-cycle.
    pub static ref CYCLE_3: GraphFixture = GraphFixture::cycle(3);
    /// Directed 4-cycle.
    pub static ref CYCLE_4: GraphFixture = GraphFixture::cycle(4);
    /// Directed 6-cycle.
    pub static ref CYCLE_6: GraphFixture = GraphFixture::cycle(6);
    /// Directed path on three vertices.
    pub static ref PATH_3: GraphFixture = GraphFixture::path(3);
    /// Complete digraph on three vertices.
    pub static ref COMPLETE_3: GraphFixture = GraphFixture::complete(3);
    /// One vertex with a loop.
    pub static ref SELF_LOOP: GraphFixture = GraphFixture::self_loop();
    /// One isolated vertex.
    pub static ref EMPTY_1: GraphFixture = GraphFixture::empty(1);
    /// Two isolated vertices.
    pub static ref EMPTY_2: GraphFixture = GraphFixture::empty(2);
    /// Three isolated vertices.
    pub static ref EMPTY_3: GraphFixture = GraphFixture::empty(3);
    /// An edge whose endpoints have colours 0 and 1.
    pub static ref COLORED_EDGE: GraphFixture =
        GraphFixture::path(2).with_colors(vec![0, 1]);
    /// Complete digraph on three vertices coloured `0, 1, 1`.
    pub static ref COLORED_COMPLETE_3: GraphFixture =
        GraphFixture::complete(3).with_colors(vec![0, 1, 1]);
}

// #####################
// TEST CASES
// #####################
lazy_static::lazy_static! {
    /// Every case with its expected count.
    pub static ref ALL_TEST_CASES: Vec<TestCase> = vec![
        TestCase {
            name: "edge_into_cycle_3",
            config: Config::default(),
            domain: &EDGE,
            codomain: &CYCLE_3,
            expected_matches: 3,
        },
        TestCase {
            name: "edge_into_cycle_3_injective",
            config: Config::builder().injective(true).build(),
            domain: &EDGE,
            codomain: &CYCLE_3,
            expected_matches: 3,
        },
        TestCase {
            name: "edge_into_cycle_3_first_only",
            config: Config::builder().max_results(1).build(),
            domain: &EDGE,
            codomain: &CYCLE_3,
            expected_matches: 1,
        },
        TestCase {
            name: "loop_into_loop",
            config: Config::default(),
            domain: &SELF_LOOP,
            codomain: &SELF_LOOP,
            expected_matches: 1,
        },
        TestCase {
            name: "two_points_into_one_injective",
            config: Config::builder().injective(true).build(),
            domain: &EMPTY_2,
            codomain: &EMPTY_1,
            expected_matches: 0,
        },
        TestCase {
            name: "two_points_into_one",
            config: Config::default(),
            domain: &EMPTY_2,
            codomain: &EMPTY_1,
            expected_matches: 1,
        },
        TestCase {
            name: "cycle_3_into_cycle_3",
            config: Config::default(),
            domain: &CYCLE_3,
            codomain: &CYCLE_3,
            expected_matches: 3,
        },
        TestCase {
            name: "cycle_3_into_loop",
            config: Config::default(),
            domain: &CYCLE_3,
            codomain: &SELF_LOOP,
            expected_matches: 1,
        },
        TestCase {
            name: "cycle_4_into_cycle_2",
            config: Config::default(),
            domain: &CYCLE_4,
            codomain: &CYCLE_2,
            expected_matches: 2,
        },
        TestCase {
            name: "cycle_3_into_cycle_2",
            config: Config::default(),
            domain: &CYCLE_3,
            codomain: &CYCLE_2,
            expected_matches: 0,
        },
        TestCase {
            name: "cycle_6_into_cycle_3",
            config: Config::default(),
            domain: &CYCLE_6,
            codomain: &CYCLE_3,
            expected_matches: 3,
        },
        TestCase {
            name: "cycle_3_into_cycle_6",
            config: Config::default(),
            domain: &CYCLE_3,
            codomain: &CYCLE_6,
            expected_matches: 0,
        },
        TestCase {
            name: "path_3_into_complete_3",
            config: Config::default(),
            domain: &PATH_3,
            codomain: &COMPLETE_3,
            expected_matches: 12,
        },
        TestCase {
            name: "path_3_into_complete_3_injective",
            config: Config::builder().injective(true).build(),
            domain: &PATH_3,
            codomain: &COMPLETE_3,
            expected_matches: 6,
        },
        TestCase {
            name: "path_3_into_complete_3_no_symmetry",
            config: Config::builder().symmetry(SymmetryMode::Off).build(),
            domain: &PATH_3,
            codomain: &COMPLETE_3,
            expected_matches: 12,
        },
        TestCase {
            name: "complete_3_into_complete_3",
            config: Config::default(),
            domain: &COMPLETE_3,
            codomain: &COMPLETE_3,
            expected_matches: 6,
        },
        TestCase {
            name: "empty_3_into_empty_2",
            config: Config::default(),
            domain: &EMPTY_3,
            codomain: &EMPTY_2,
            expected_matches: 8,
        },
        TestCase {
            name: "empty_3_into_empty_2_injective",
            config: Config::builder().injective(true).build(),
            domain: &EMPTY_3,
            codomain: &EMPTY_2,
            expected_matches: 0,
        },
        TestCase {
            name: "empty_3_into_empty_2_capped",
            config: Config::builder().max_results(4).build(),
            domain: &EMPTY_3,
            codomain: &EMPTY_2,
            expected_matches: 4,
        },
        TestCase {
            name: "empty_2_into_empty_3_injective",
            config: Config::builder().injective(true).build(),
            domain: &EMPTY_2,
            codomain: &EMPTY_3,
            expected_matches: 6,
        },
        TestCase {
            name: "empty_3_into_empty_3_rank_2",
            config: Config::builder().rank(2).build(),
            domain: &EMPTY_3,
            codomain: &EMPTY_3,
            expected_matches: 18,
        },
        TestCase {
            name: "edge_into_complete_3_restricted_targets",
            config: Config::builder().targets([0, 1]).build(),
            domain: &EDGE,
            codomain: &COMPLETE_3,
            expected_matches: 2,
        },
        TestCase {
            name: "colored_edge_into_colored_complete_3",
            config: Config::default(),
            domain: &COLORED_EDGE,
            codomain: &COLORED_COMPLETE_3,
            expected_matches: 2,
        },
        TestCase {
            name: "colored_edge_into_colored_complete_3_colors_ignored",
            config: Config::builder().respect_colors(false).build(),
            domain: &COLORED_EDGE,
            codomain: &COLORED_COMPLETE_3,
            expected_matches: 6,
        },
    ];
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(GraphFixture::cycle(4), 4, 4)]
    #[case(GraphFixture::path(4), 4, 3)]
    #[case(GraphFixture::complete(4), 4, 12)]
    #[case(GraphFixture::empty(5), 5, 0)]
    fn families_have_expected_shape(
        #[case] fixture: GraphFixture,
        #[case] vertices: usize,
        #[case] edges: usize,
    ) {
        assert_eq!(fixture.vertices, vertices);
        assert_eq!(fixture.edges.len(), edges);
        assert!(
            fixture
                .edges
                .iter()
                .all(|&(u, v)| u < vertices && v < vertices)
        );
    }

    #[test]
    fn case_names_are_unique() {
        let mut names: Vec<_> = ALL_TEST_CASES.iter().map(|case| case.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
