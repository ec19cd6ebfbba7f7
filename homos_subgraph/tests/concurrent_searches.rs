#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use homos_bitarray::set_lookup_size;
use homos_common::{ALL_TEST_CASES, Config};
use homos_subgraph::test_harness::setup_test_logging;
use homos_subgraph::{Digraph, HomomorphismFinder};
use rayon::prelude::*;

// Independent searches share only the bit array lookup tables.
#[test]
fn parallel_searches_agree_with_sequential_ones() {
    setup_test_logging();
    let run = |case: &homos_common::TestCase| {
        let domain = Digraph::from_fixture(case.domain).unwrap();
        let codomain = Digraph::from_fixture(case.codomain).unwrap();
        HomomorphismFinder::new(case.config.clone())
            .count(&domain, &codomain, None)
            .unwrap()
    };

    let (parallel, ()) = rayon::join(
        || ALL_TEST_CASES.par_iter().map(run).collect::<Vec<_>>(),
        || {
            for size in [8, 1, 600, 513] {
                set_lookup_size(size);
            }
        },
    );

    for (case, found) in ALL_TEST_CASES.iter().zip(parallel) {
        assert_eq!(found, case.expected_matches, "{}", case.name);
    }
}

#[test]
fn many_finders_on_one_codomain() {
    setup_test_logging();
    let codomain = Digraph::from_edges(6, (0..6).map(|i| (i, (i + 1) % 6))).unwrap();
    let counts: Vec<usize> = (1..=6usize)
        .into_par_iter()
        .map(|n| {
            let domain = Digraph::from_edges(n + 1, (0..n).map(|i| (i, i + 1))).unwrap();
            HomomorphismFinder::new(Config::default())
                .count(&domain, &codomain, None)
                .unwrap()
        })
        .collect();
    // A directed path into a directed cycle is fixed by the image of its start.
    assert_eq!(counts, vec![6; 6]);
}
