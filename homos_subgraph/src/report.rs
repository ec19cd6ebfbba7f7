/// Why a search returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// Every homomorphism was reported.
    #[default]
    Exhausted,
    /// `max_results` maps were reported.
    LimitReached,
    /// The hook returned `ControlFlow::Break`.
    Aborted,
}

/// Outcome of one search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Number of maps passed to the hook.
    pub results: usize,
    /// Which stop condition ended the search.
    pub stop: StopReason,
    /// Search tree nodes visited.
    pub nodes: u64,
    /// Maps obtained by applying a codomain automorphism to an earlier result
    /// instead of searching for them. Included in `results`.
    pub replayed: usize,
    /// Largest number of maps held for replay at any one time.
    pub peak_buffered: usize,
}

impl SearchReport {
    /// Whether the search ran to completion.
    #[must_use]
    pub fn is_exhaustive(&self) -> bool {
        self.stop == StopReason::Exhausted
    }
}
