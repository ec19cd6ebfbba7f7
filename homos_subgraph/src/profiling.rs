//! Scope timers for the search phases.
//!
//! With the `profiling` feature, every [`Timer`] adds its lifetime to a
//! process-wide table keyed by label; [`report`] logs the table. Without the
//! feature all of this compiles to nothing.

/// Accumulated time of one label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseStats {
    /// Timer label.
    pub label: &'static str,
    /// Number of completed timers.
    pub calls: u64,
    /// Sum of their lifetimes in nanoseconds.
    pub total_nanos: u128,
}

#[cfg(feature = "profiling")]
mod enabled {
    use std::sync::OnceLock;
    use std::time::Instant;

    use dashmap::DashMap;

    use super::PhaseStats;

    static PHASES: OnceLock<DashMap<&'static str, (u64, u128)>> = OnceLock::new();

    fn phases() -> &'static DashMap<&'static str, (u64, u128)> {
        PHASES.get_or_init(DashMap::new)
    }

    /// Records the time between its creation and its drop under `label`.
    pub struct Timer {
        label: &'static str,
        start: Instant,
    }

    impl Timer {
        /// Starts timing `label`.
        #[inline]
        pub fn new(label: &'static str) -> Self {
            Self {
                label,
                start: Instant::now(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let nanos = self.start.elapsed().as_nanos();
            let mut entry = phases().entry(self.label).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += nanos;
        }
    }

    /// Every label recorded so far, slowest first.
    pub fn snapshot() -> Vec<PhaseStats> {
        let mut rows: Vec<PhaseStats> = phases()
            .iter()
            .map(|kv| PhaseStats {
                label: kv.key(),
                calls: kv.value().0,
                total_nanos: kv.value().1,
            })
            .collect();
        rows.sort_by(|a, b| b.total_nanos.cmp(&a.total_nanos));
        rows
    }

    /// Logs [`snapshot`] at info level.
    pub fn report() {
        for row in snapshot() {
            let avg = if row.calls == 0 {
                0.0
            } else {
                row.total_nanos as f64 / row.calls as f64
            };
            tracing::info!(
                "{:<32} calls={:<10} total={:>9.3} ms avg={:>12.1} ns",
                row.label,
                row.calls,
                row.total_nanos as f64 / 1_000_000.0,
                avg
            );
        }
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use super::PhaseStats;

    /// No-op timer.
    #[derive(Clone, Copy)]
    pub struct Timer;

    impl Timer {
        /// Does nothing.
        #[inline]
        pub const fn new(_: &'static str) -> Self {
            Self
        }
    }

    /// Always empty.
    pub const fn snapshot() -> Vec<PhaseStats> {
        Vec::new()
    }

    /// Does nothing.
    pub const fn report() {}
}

#[cfg(feature = "profiling")]
pub use enabled::*;

#[cfg(not(feature = "profiling"))]
pub use disabled::*;
