//! Helpers shared by the unit and integration tests.

use std::sync::Once;

use homos_common::{Config, HintMode, TestCase};
use itertools::Itertools;

use crate::{Digraph, HomomorphismFinder, HomosError, PartialMap};

static INIT: Once = Once::new();

/// Configures logging for the test runner.
pub fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Every map from `domain` to `codomain` allowed by `config`, found by trying
/// all `n2^n1` functions. Only usable on small graphs.
pub fn brute_force(
    domain: &Digraph,
    codomain: &Digraph,
    config: &Config,
    image: Option<&PartialMap>,
) -> Vec<Vec<usize>> {
    let n1 = domain.vertex_count();
    let n2 = codomain.vertex_count();
    let image = image.filter(|_| config.hint == HintMode::UseImage);

    let functions: Box<dyn Iterator<Item = Vec<usize>>> = if n1 == 0 {
        Box::new(std::iter::once(Vec::new()))
    } else {
        Box::new((0..n1).map(move |_| 0..n2).multi_cartesian_product())
    };

    functions
        .filter(|map| crate::is_homomorphism(domain, codomain, map, config.respect_colors))
        .filter(|map| !config.injective || map.iter().all_unique())
        .filter(|map| {
            config
                .rank
                .is_none_or(|rank| map.iter().unique().count() == rank)
        })
        .filter(|map| {
            config
                .targets
                .as_ref()
                .is_none_or(|targets| map.iter().all(|t| targets.contains(t)))
        })
        .filter(|map| image.is_none_or(|image| image.fixed().all(|(v, t)| map[v] == t)))
        .collect()
}

/// Runs a shared test case and compares the number of maps found with the
/// expected count.
#[track_caller]
pub fn run_case(case: &TestCase) -> Result<(), Box<dyn std::error::Error>> {
    setup_test_logging();

    let domain = Digraph::from_fixture(case.domain)?;
    let codomain = Digraph::from_fixture(case.codomain)?;
    let found = HomomorphismFinder::new(case.config.clone()).count(&domain, &codomain, None)?;

    if found != case.expected_matches {
        tracing::error!(
            "Expected {} maps, found {} for {} -> {}",
            case.expected_matches,
            found,
            case.domain.name,
            case.codomain.name
        );
        return Err(format!(
            "test case '{}': expected {} maps, found {}",
            case.name, case.expected_matches, found
        )
        .into());
    }
    Ok(())
}

/// Sorted list of every map reported by a search, for set comparisons.
///
/// # Errors
///
/// Whatever the search returns.
pub fn sorted_maps(
    domain: &Digraph,
    codomain: &Digraph,
    config: &Config,
    image: Option<&PartialMap>,
) -> Result<Vec<Vec<usize>>, HomosError> {
    let mut maps = HomomorphismFinder::new(config.clone()).collect(domain, codomain, image)?;
    maps.sort();
    Ok(maps)
}
