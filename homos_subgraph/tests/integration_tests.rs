#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use std::cell::Cell;
use std::ops::ControlFlow;

use homos_common::{ALL_TEST_CASES, Config, HintMode, SymmetryMode, VertexOrder};
use homos_subgraph::test_harness::{run_case, setup_test_logging, sorted_maps};
use homos_subgraph::{
    AutomorphismOracle, AutomorphismStats, BacktrackOracle, CanonicalForm, Digraph,
    HomomorphismFinder, HomosError, PartialMap, StopReason, UNASSIGNED, find_homomorphisms,
    find_homomorphisms_with, find_homomorphisms_with_generators, is_homomorphism,
};
use rstest::rstest;

fn cycle(n: usize) -> Digraph {
    Digraph::from_edges(n, (0..n).map(|i| (i, (i + 1) % n))).unwrap()
}

fn edge() -> Digraph {
    Digraph::from_edges(2, [(0, 1)]).unwrap()
}

#[test]
fn all_shared_cases() {
    let failures: Vec<String> = ALL_TEST_CASES
        .iter()
        .filter_map(|case| run_case(case).err().map(|e| e.to_string()))
        .collect();
    assert!(
        failures.is_empty(),
        "{} test cases failed:\n - {}",
        failures.len(),
        failures.join("\n - ")
    );
}

#[rstest]
#[case(VertexOrder::Index)]
#[case(VertexOrder::DegreeGuided)]
#[case(VertexOrder::FewestCandidates)]
fn shared_cases_under_every_order(#[case] order: VertexOrder) {
    setup_test_logging();
    for case in ALL_TEST_CASES.iter() {
        let mut config = case.config.clone();
        config.order = order;
        let domain = Digraph::from_fixture(case.domain).unwrap();
        let codomain = Digraph::from_fixture(case.codomain).unwrap();
        let found = HomomorphismFinder::new(config)
            .count(&domain, &codomain, None)
            .unwrap();
        assert_eq!(found, case.expected_matches, "{} under {:?}", case.name, order);
    }
}

#[test]
fn edge_into_triangle_reports_each_rotation_once() {
    setup_test_logging();
    let maps = sorted_maps(&edge(), &cycle(3), &Config::default(), None).unwrap();
    assert_eq!(maps, vec![vec![0, 1], vec![1, 2], vec![2, 0]]);
}

#[test]
fn first_result_only() {
    setup_test_logging();
    let mut buffer = vec![0; 2];
    let mut seen = Vec::new();
    let config = Config::builder().max_results(1).build();
    let report = find_homomorphisms(&edge(), &cycle(3), &config, None, &mut buffer, |map| {
        seen.push(map.to_vec());
        ControlFlow::Continue(())
    })
    .unwrap();
    assert_eq!(report.results, 1);
    assert_eq!(report.stop, StopReason::LimitReached);
    assert_eq!(seen.len(), 1);
    assert!(is_homomorphism(&edge(), &cycle(3), &seen[0], true));
    assert_eq!(buffer, vec![UNASSIGNED, UNASSIGNED]);
}

#[rstest]
#[case(SymmetryMode::Off)]
#[case(SymmetryMode::Codomain)]
fn hook_break_resets_the_buffer(#[case] symmetry: SymmetryMode) {
    setup_test_logging();
    let domain = Digraph::new(3);
    let codomain = Digraph::new(3);
    let mut buffer = vec![42; 5];
    let mut calls = 0;
    let config = Config::builder().symmetry(symmetry).build();
    let report = find_homomorphisms(&domain, &codomain, &config, None, &mut buffer, |_| {
        calls += 1;
        if calls == 4 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .unwrap();
    assert_eq!(report.results, 4);
    assert_eq!(report.stop, StopReason::Aborted);
    assert_eq!(&buffer[..3], &[UNASSIGNED; 3]);
    // Entries past the domain are left alone.
    assert_eq!(&buffer[3..], &[42, 42]);
}

#[test]
fn image_hint_fixes_vertices() {
    setup_test_logging();
    let config = Config::builder().hint(HintMode::UseImage).build();
    let hint = PartialMap::new(2).fix(0, 1);
    let maps = sorted_maps(&edge(), &cycle(3), &config, Some(&hint)).unwrap();
    assert_eq!(maps, vec![vec![1, 2]]);

    // Without UseImage the partial image is ignored.
    let maps = sorted_maps(&edge(), &cycle(3), &Config::default(), Some(&hint)).unwrap();
    assert_eq!(maps.len(), 3);
}

#[test]
fn image_hint_with_inadmissible_target_finds_nothing() {
    setup_test_logging();
    let mut codomain = Digraph::new(2);
    codomain.add_edge(0, 1).unwrap();
    // Vertex 1 has no out-edges, so the tail of the edge cannot go there.
    let config = Config::builder().hint(HintMode::UseImage).build();
    let hint = PartialMap::new(2).fix(0, 1);
    let found = HomomorphismFinder::new(config)
        .count(&edge(), &codomain, Some(&hint))
        .unwrap();
    assert_eq!(found, 0);
}

#[test]
fn rejected_arguments() {
    setup_test_logging();
    let use_image = Config::builder().hint(HintMode::UseImage).build();
    let no_hook = |_: &[usize]| ControlFlow::Continue(());

    let mut short = vec![0; 1];
    assert_eq!(
        find_homomorphisms(&edge(), &cycle(3), &Config::default(), None, &mut short, no_hook),
        Err(HomosError::MapBufferTooShort { len: 1, required: 2 })
    );

    let mut buffer = vec![0; 2];
    assert_eq!(
        find_homomorphisms(&edge(), &cycle(3), &use_image, None, &mut buffer, no_hook),
        Err(HomosError::MissingImage)
    );

    let wrong_length = PartialMap::new(3);
    assert_eq!(
        find_homomorphisms(
            &edge(),
            &cycle(3),
            &use_image,
            Some(&wrong_length),
            &mut buffer,
            no_hook
        ),
        Err(HomosError::ImageLengthMismatch { len: 3, expected: 2 })
    );

    let out_of_range = PartialMap::new(2).fix(1, 3);
    assert!(matches!(
        find_homomorphisms(
            &edge(),
            &cycle(3),
            &use_image,
            Some(&out_of_range),
            &mut buffer,
            no_hook
        ),
        Err(HomosError::VertexOutOfRange { vertex: 3, .. })
    ));

    let inconsistent = PartialMap::new(2).fix(0, 0).fix(1, 2);
    assert_eq!(
        find_homomorphisms(
            &edge(),
            &cycle(3),
            &use_image,
            Some(&inconsistent),
            &mut buffer,
            no_hook
        ),
        Err(HomosError::InconsistentImage {
            from: 0,
            to: 1,
            image_from: 0,
            image_to: 2
        })
    );

    let bad_targets = Config::builder().targets([0, 7]).build();
    assert!(matches!(
        find_homomorphisms(&edge(), &cycle(3), &bad_targets, None, &mut buffer, no_hook),
        Err(HomosError::VertexOutOfRange { vertex: 7, .. })
    ));
}

#[rstest]
#[case(0, 0, 1)]
#[case(0, 3, 1)]
#[case(2, 0, 0)]
fn empty_graphs(#[case] n1: usize, #[case] n2: usize, #[case] expected: usize) {
    setup_test_logging();
    let found = HomomorphismFinder::new(Config::default())
        .count(&Digraph::new(n1), &Digraph::new(n2), None)
        .unwrap();
    assert_eq!(found, expected);
}

#[test]
fn symmetry_replays_into_sibling_branches() {
    setup_test_logging();
    let domain = Digraph::new(2);
    let codomain = Digraph::new(4);
    let mut finder = HomomorphismFinder::new(Config::default());
    let mut maps = Vec::new();
    let report = finder
        .find(&domain, &codomain, None, |map| {
            maps.push(map.to_vec());
            ControlFlow::Continue(())
        })
        .unwrap();
    assert_eq!(report.results, 16);
    assert!(report.replayed > 0);
    maps.sort();
    maps.dedup();
    assert_eq!(maps.len(), 16);

    let plain = HomomorphismFinder::new(Config::builder().symmetry(SymmetryMode::Off).build())
        .find(&domain, &codomain, None, |_| ControlFlow::Continue(()))
        .unwrap();
    assert_eq!(plain.replayed, 0);
    assert!(plain.nodes > report.nodes);
}

#[test]
fn colours_must_match() {
    setup_test_logging();
    let mut domain = edge();
    domain.change_color(1, 3).unwrap();
    // No codomain vertex has colour 3.
    let found = HomomorphismFinder::new(Config::default())
        .count(&domain, &cycle(3), None)
        .unwrap();
    assert_eq!(found, 0);
    let found = HomomorphismFinder::new(Config::builder().respect_colors(false).build())
        .count(&domain, &cycle(3), None)
        .unwrap();
    assert_eq!(found, 3);
}

#[test]
fn finder_reuses_its_buffer() {
    setup_test_logging();
    let mut finder = HomomorphismFinder::new(Config::builder().injective(true).build());
    assert_eq!(finder.count(&cycle(3), &cycle(3), None).unwrap(), 3);
    assert_eq!(finder.count(&edge(), &cycle(3), None).unwrap(), 3);
    assert_eq!(finder.count(&cycle(4), &cycle(4), None).unwrap(), 4);
    assert!(finder.config().injective);
}

/// [`BacktrackOracle`] counting how often it is asked for generators.
#[derive(Debug, Default)]
struct CountingOracle {
    calls: Cell<usize>,
}

impl AutomorphismOracle for CountingOracle {
    fn find_automorphisms(
        &self,
        graph: &Digraph,
        hook: &mut dyn FnMut(&[usize]),
    ) -> AutomorphismStats {
        self.calls.set(self.calls.get() + 1);
        BacktrackOracle.find_automorphisms(graph, hook)
    }

    fn canonical_form(&self, graph: &Digraph, hook: &mut dyn FnMut(&[usize])) -> CanonicalForm {
        BacktrackOracle.canonical_form(graph, hook)
    }
}

/// Reports permutations that are not automorphisms of a directed 3-cycle.
struct BrokenOracle;

impl AutomorphismOracle for BrokenOracle {
    fn find_automorphisms(
        &self,
        _graph: &Digraph,
        hook: &mut dyn FnMut(&[usize]),
    ) -> AutomorphismStats {
        hook(&[1, 0]);
        hook(&[2, 1, 0]);
        hook(&[0, 0, 0]);
        AutomorphismStats::default()
    }

    fn canonical_form(&self, graph: &Digraph, hook: &mut dyn FnMut(&[usize])) -> CanonicalForm {
        BacktrackOracle.canonical_form(graph, hook)
    }
}

#[test]
fn finder_asks_the_oracle_once_per_codomain() {
    setup_test_logging();
    let mut finder = HomomorphismFinder::with_oracle(Config::default(), CountingOracle::default());
    assert_eq!(finder.count(&edge(), &cycle(3), None).unwrap(), 3);
    assert_eq!(finder.count(&edge(), &cycle(3), None).unwrap(), 3);
    assert_eq!(finder.oracle().calls.get(), 1);
    assert_eq!(finder.count(&edge(), &cycle(4), None).unwrap(), 4);
    assert_eq!(finder.oracle().calls.get(), 2);
}

#[rstest]
#[case::first_result(Config::builder().max_results(1).build(), edge())]
#[case::few_results(Config::builder().max_results(64).build(), edge())]
#[case::single_vertex(Config::default(), Digraph::new(1))]
#[case::symmetry_off(Config::builder().symmetry(SymmetryMode::Off).build(), edge())]
#[case::no_replay(Config::builder().replay_buffer_limit(0).build(), edge())]
fn short_searches_skip_the_oracle(#[case] config: Config, #[case] domain: Digraph) {
    setup_test_logging();
    let mut finder = HomomorphismFinder::with_oracle(config, CountingOracle::default());
    let found = finder.count(&domain, &cycle(5), None).unwrap();
    assert!(found > 0);
    assert_eq!(finder.oracle().calls.get(), 0);
}

#[test]
fn non_automorphisms_from_an_oracle_are_ignored() {
    setup_test_logging();
    let mut buffer = vec![0; 2];
    let mut maps = Vec::new();
    let report = find_homomorphisms_with(
        &BrokenOracle,
        &edge(),
        &cycle(3),
        &Config::default(),
        None,
        &mut buffer,
        |map| {
            maps.push(map.to_vec());
            ControlFlow::Continue(())
        },
    )
    .unwrap();
    assert_eq!(report.replayed, 0);
    maps.sort();
    assert_eq!(maps, vec![vec![0, 1], vec![1, 2], vec![2, 0]]);
}

#[test]
fn caller_supplied_generators() {
    setup_test_logging();
    let rotation: Vec<usize> = (0..6).map(|i| (i + 1) % 6).collect();
    let mut buffer = vec![0; 2];
    let mut maps = Vec::new();
    let report = find_homomorphisms_with_generators(
        &edge(),
        &cycle(6),
        &Config::default(),
        None,
        &mut buffer,
        &[rotation],
        |map| {
            maps.push(map.to_vec());
            ControlFlow::Continue(())
        },
    )
    .unwrap();
    assert_eq!(report.results, 6);
    assert_eq!(report.replayed, 5);
    assert!(maps.iter().all(|map| is_homomorphism(&edge(), &cycle(6), map, true)));
}

#[rstest]
#[case(SymmetryMode::Off, 16)]
#[case(SymmetryMode::Codomain, 0)]
#[case(SymmetryMode::Codomain, 16)]
#[case(SymmetryMode::Codomain, 4096)]
fn replay_memory_is_bounded(#[case] symmetry: SymmetryMode, #[case] limit: usize) {
    setup_test_logging();
    let config = Config::builder()
        .symmetry(symmetry)
        .replay_buffer_limit(limit)
        .build();
    let mut finder = HomomorphismFinder::new(config);
    let report = finder
        .find(&Digraph::new(6), &Digraph::new(6), None, |_| ControlFlow::Continue(()))
        .unwrap();
    assert_eq!(report.results, 46_656);
    // One buffer per open depth at most.
    assert!(report.peak_buffered <= 6 * limit);
    if symmetry == SymmetryMode::Off {
        assert_eq!(report.peak_buffered, 0);
    }
}
