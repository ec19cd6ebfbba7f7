//! Backtracking enumeration of homomorphisms.
//!
//! Every domain vertex owns a candidate set: a [`BitArray`] over the codomain
//! vertices it may still be sent to. Assigning `v -> t` narrows the sets of
//! the unassigned neighbours of `v` to the matching neighbourhood of `t`, and
//! a branch dies as soon as one set becomes empty.
//!
//! The sets of depth `d` live in row `d` of an arena. Descending copies the
//! unassigned rows into row `d + 1` and narrows the copy, so row `d` is never
//! written while a deeper level is active and nothing has to be restored on
//! the way back, however the level is left. Rows are allocated the first time
//! their depth is reached.
//!
//! With codomain symmetry, the maps found below a candidate are buffered and
//! replayed into the rest of its orbit. A buffer holds at most
//! `Config::replay_buffer_limit` maps; past that the orbit is searched
//! directly, so memory stays bounded by the depth times the limit.

mod ordering;

use std::ops::ControlFlow;

use contracts::*;
use homos_bitarray::BitArray;
use homos_common::{Config, HintMode};
use tracing::{debug, trace};

use crate::mapping::Assignment;
use crate::profiling::Timer;
use crate::symmetry::Symmetry;
use crate::{Digraph, GraphIndex, HomosError, PartialMap, SearchReport, StopReason};

/// Checks the arguments of a search before anything is allocated.
pub(crate) fn validate(
    domain: &Digraph,
    codomain: &Digraph,
    config: &Config,
    image: Option<&PartialMap>,
    map_buffer_len: usize,
) -> Result<(), HomosError> {
    let n1 = domain.vertex_count();
    let n2 = codomain.vertex_count();

    if map_buffer_len < n1 {
        return Err(HomosError::MapBufferTooShort {
            len: map_buffer_len,
            required: n1,
        });
    }

    if config.hint == HintMode::UseImage {
        let image = image.ok_or(HomosError::MissingImage)?;
        if image.len() != n1 {
            return Err(HomosError::ImageLengthMismatch {
                len: image.len(),
                expected: n1,
            });
        }
        for (_, target) in image.fixed() {
            HomosError::check_vertex("image target", target, n2)?;
        }
        for (from, to) in domain.edges() {
            if let (Some(image_from), Some(image_to)) = (image.get(from), image.get(to)) {
                if !codomain.has_edge(image_from, image_to) {
                    return Err(HomosError::InconsistentImage {
                        from,
                        to,
                        image_from,
                        image_to,
                    });
                }
            }
        }
    }

    if let Some(targets) = &config.targets {
        for &target in targets {
            HomosError::check_vertex("allowed target", target, n2)?;
        }
    }

    Ok(())
}

/// State of one search. Created by [`run`], which is the only entry point.
struct Search<'a, 'buf, H> {
    domain: &'a Digraph,
    codomain: &'a GraphIndex,
    config: &'a Config,
    n1: usize,
    n2: usize,
    fixed_order: Option<Vec<usize>>,
    /// Row `d` holds the candidate sets in effect at depth `d`.
    arena: Vec<Vec<BitArray>>,
    assignment: Assignment<'buf>,
    symmetry: Symmetry,
    /// Results of the branches whose symmetric siblings are still to be replayed.
    open_buffers: Vec<ReplayBuffer>,
    /// Maps currently held across `open_buffers`.
    buffered: usize,
    peak_buffered: usize,
    hook: &'a mut H,
    found: usize,
    nodes: u64,
    replayed: usize,
    stop: StopReason,
}

/// Enumerates the homomorphisms `domain -> codomain` described by `config`.
///
/// The arguments must have passed [`validate`]. `symmetry` holds the codomain
/// automorphisms used for replay; pass `Symmetry::default()` to search plainly.
pub(crate) fn run<H>(
    domain: &Digraph,
    codomain: &GraphIndex,
    config: &Config,
    image: Option<&PartialMap>,
    map_buffer: &mut [usize],
    symmetry: Symmetry,
    hook: &mut H,
) -> SearchReport
where
    H: FnMut(&[usize]) -> ControlFlow<()>,
{
    debug!(
        "search: {} -> {} vertices, injective={}, max_results={:?}",
        domain.vertex_count(),
        codomain.vertex_count(),
        config.injective,
        config.max_results
    );
    if !symmetry.is_empty() {
        debug!(
            "replaying through {} generators, at most {} maps per branch",
            symmetry.generators().len(),
            config.replay_buffer_limit
        );
    }

    let image = image.filter(|_| config.hint == HintMode::UseImage);
    let mut search = Search::new(domain, codomain, config, image, map_buffer, symmetry, hook);
    search.execute(image)
}

/// Maps found below one candidate, kept for replay into its orbit.
#[derive(Debug, Default)]
struct ReplayBuffer {
    maps: Vec<Vec<usize>>,
    /// Set once `maps` would pass the limit; the siblings are then searched.
    overflowed: bool,
}

impl<'a, 'buf, H> Search<'a, 'buf, H>
where
    H: FnMut(&[usize]) -> ControlFlow<()>,
{
    fn new(
        domain: &'a Digraph,
        codomain: &'a GraphIndex,
        config: &'a Config,
        image: Option<&PartialMap>,
        map_buffer: &'buf mut [usize],
        symmetry: Symmetry,
        hook: &'a mut H,
    ) -> Self {
        let n1 = domain.vertex_count();
        let n2 = codomain.vertex_count();
        Self {
            domain,
            codomain,
            config,
            n1,
            n2,
            fixed_order: ordering::fixed_order(domain, config.order, image),
            arena: Vec::new(),
            assignment: Assignment::new(&mut map_buffer[..n1], n2),
            symmetry,
            open_buffers: Vec::new(),
            buffered: 0,
            peak_buffered: 0,
            hook,
            found: 0,
            nodes: 0,
            replayed: 0,
            stop: StopReason::Exhausted,
        }
    }

    #[debug_ensures(self.assignment.is_clear(), "map buffer not reset")]
    fn execute(&mut self, image: Option<&PartialMap>) -> SearchReport {
        let _t = Timer::new("search::execute");
        if self.n1 > 0 {
            let root = self.initial_candidates(image);
            if root.iter().any(|set| set.is_empty(self.n2)) {
                debug!("a domain vertex has no admissible image");
                return self.report();
            }
            self.arena = vec![root];
        }

        let active = self.symmetry.all();
        // The outcome is recorded in `self.stop`.
        let _ = self.descend(0, &active);
        self.report()
    }

    fn report(&self) -> SearchReport {
        SearchReport {
            results: self.found,
            stop: self.stop,
            nodes: self.nodes,
            replayed: self.replayed,
            peak_buffered: self.peak_buffered,
        }
    }

    /// Row 0 of the arena: every image allowed before anything is assigned.
    fn initial_candidates(&self, image: Option<&PartialMap>) -> Vec<BitArray> {
        let n2 = self.n2;
        let mut allowed = BitArray::new(n2);
        match &self.config.targets {
            Some(targets) => {
                for &t in targets {
                    allowed.set(t, true);
                }
            }
            None => allowed.init(true, n2),
        }

        (0..self.n1)
            .map(|v| {
                let mut set = allowed.clone();
                if self.config.respect_colors {
                    match self.codomain.color_class(self.domain.color(v)) {
                        Some(class) => set.intersect_with(class, n2),
                        None => set.init(false, n2),
                    }
                }
                let rejected: Vec<usize> = set
                    .iter_ones(n2)
                    .filter(|&t| !self.admissible(v, t))
                    .collect();
                for t in rejected {
                    set.set(t, false);
                }
                if let Some(target) = image.and_then(|image| image.get(v)) {
                    let keep = set.get(target);
                    set.init(false, n2);
                    set.set(target, keep);
                }
                set
            })
            .collect()
    }

    /// Local conditions for `v -> t` that do not depend on other vertices.
    fn admissible(&self, v: usize, t: usize) -> bool {
        let (domain, codomain) = (self.domain, self.codomain);
        if domain.has_edge(v, v) && !codomain.has_loop(t) {
            return false;
        }
        if domain.out_degree(v) > 0 && codomain.out_degree(t) == 0 {
            return false;
        }
        if domain.in_degree(v) > 0 && codomain.in_degree(t) == 0 {
            return false;
        }
        !self.config.injective
            || (codomain.out_degree(t) >= domain.out_degree(v)
                && codomain.in_degree(t) >= domain.in_degree(v))
    }

    /// The next domain vertex to assign at `depth`.
    fn select(&self, depth: usize) -> usize {
        if let Some(order) = &self.fixed_order {
            return order[depth];
        }
        let row = &self.arena[depth];
        (0..self.n1)
            .filter(|&v| !self.assignment.is_assigned(v))
            .min_by_key(|&v| (row[v].population_count(self.n2), v))
            .unwrap_or(0)
    }

    fn descend(&mut self, depth: usize, active: &[usize]) -> ControlFlow<()> {
        self.nodes += 1;
        if depth == self.n1 {
            return self.emit_current();
        }

        let vertex = self.select(depth);
        let candidates: Vec<usize> = self.arena[depth][vertex].iter_ones(self.n2).collect();
        trace!(
            "depth {}: vertex {} has {} candidates",
            depth,
            vertex,
            candidates.len()
        );

        if active.is_empty() {
            for target in candidates {
                self.try_candidate(depth, vertex, target, active)?;
            }
            return ControlFlow::Continue(());
        }

        // Candidates in one orbit of the active generators have symmetric
        // subtrees; only the first one met is searched.
        let mut handled = BitArray::new(self.n2);
        for &target in &candidates {
            if handled.get(target) {
                continue;
            }
            handled.set(target, true);

            self.open_buffers.push(ReplayBuffer::default());
            let flow = self.try_candidate(depth, vertex, target, active);
            let buffer = self.open_buffers.pop().unwrap_or_default();
            self.buffered -= buffer.maps.len();
            flow?;
            if buffer.overflowed {
                trace!(
                    "depth {}: results of {} -> {} overflowed, searching its orbit",
                    depth,
                    vertex,
                    target
                );
                continue;
            }
            let results = buffer.maps;

            for (other, element) in self.symmetry.transversal(active, target).into_iter().skip(1) {
                if handled.get(other) || !self.arena[depth][vertex].get(other) {
                    continue;
                }
                handled.set(other, true);
                trace!(
                    "depth {}: replaying {} results of {} -> {} for {}",
                    depth,
                    results.len(),
                    vertex,
                    target,
                    other
                );
                for result in &results {
                    let moved: Vec<usize> = result.iter().map(|&x| element[x]).collect();
                    self.replayed += 1;
                    self.emit(&moved)?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Assigns `vertex -> target`, searches below it and undoes the assignment.
    fn try_candidate(
        &mut self,
        depth: usize,
        vertex: usize,
        target: usize,
        active: &[usize],
    ) -> ControlFlow<()> {
        debug_assert!(self.consistent_with_assigned(vertex, target));
        if !self.rank_reachable(target) {
            trace!("rank prune at {} -> {}", vertex, target);
            return ControlFlow::Continue(());
        }

        self.assignment.assign(vertex, target);
        let flow = if self.narrow(depth, vertex, target) {
            let next_active = if active.is_empty() {
                Vec::new()
            } else {
                self.symmetry.fixing(active, target)
            };
            self.descend(depth + 1, &next_active)
        } else {
            ControlFlow::Continue(())
        };
        self.assignment.unassign(vertex);
        flow
    }

    /// Whether assigning `target` next can still end with the required rank.
    fn rank_reachable(&self, target: usize) -> bool {
        let Some(rank) = self.config.rank else {
            return true;
        };
        let fresh = !self.assignment.is_used(target);
        let distinct = self.assignment.distinct_images() + usize::from(fresh);
        let remaining = self.n1 - self.assignment.assigned() - 1;
        distinct <= rank && distinct + remaining >= rank
    }

    /// Fills row `depth + 1` from row `depth` after `vertex -> target`.
    /// Returns `false` when some unassigned vertex runs out of candidates.
    fn narrow(&mut self, depth: usize, vertex: usize, target: usize) -> bool {
        let n2 = self.n2;
        if self.arena.len() == depth + 1 {
            let row = self.arena[depth].clone();
            self.arena.push(row);
        }
        let (done, rest) = self.arena.split_at_mut(depth + 1);
        let (current, next) = (&done[depth], &mut rest[0]);

        for w in (0..self.n1).filter(|&w| !self.assignment.is_assigned(w)) {
            next[w].copy_from(&current[w], n2);
        }
        for &w in self.domain.out_neighbours(vertex) {
            if !self.assignment.is_assigned(w) {
                next[w].intersect_with(self.codomain.out_set(target), n2);
            }
        }
        for &w in self.domain.in_neighbours(vertex) {
            if !self.assignment.is_assigned(w) {
                next[w].intersect_with(self.codomain.in_set(target), n2);
            }
        }

        for w in (0..self.n1).filter(|&w| !self.assignment.is_assigned(w)) {
            if self.config.injective {
                next[w].set(target, false);
            }
            if next[w].is_empty(n2) {
                trace!("depth {}: vertex {} ran out of candidates", depth + 1, w);
                return false;
            }
        }
        true
    }

    /// Whether `vertex -> target` keeps every edge to an assigned vertex.
    fn consistent_with_assigned(&self, vertex: usize, target: usize) -> bool {
        let out_ok = self.domain.out_neighbours(vertex).iter().all(|&w| {
            self.assignment
                .image(w)
                .is_none_or(|image| self.codomain.has_edge(target, image))
        });
        let in_ok = self.domain.in_neighbours(vertex).iter().all(|&w| {
            self.assignment
                .image(w)
                .is_none_or(|image| self.codomain.has_edge(image, target))
        });
        out_ok && in_ok
    }

    fn emit_current(&mut self) -> ControlFlow<()> {
        if self
            .config
            .rank
            .is_some_and(|rank| rank != self.assignment.distinct_images())
        {
            return ControlFlow::Continue(());
        }
        let current = self.assignment.as_slice().to_vec();
        self.emit(&current)
    }

    /// Reports a complete map to the hook and to every open replay buffer.
    fn emit(&mut self, map: &[usize]) -> ControlFlow<()> {
        let limit = self.config.replay_buffer_limit;
        for buffer in self.open_buffers.iter_mut().filter(|b| !b.overflowed) {
            if buffer.maps.len() < limit {
                buffer.maps.push(map.to_vec());
                self.buffered += 1;
            } else {
                self.buffered -= buffer.maps.len();
                buffer.maps = Vec::new();
                buffer.overflowed = true;
            }
        }
        self.peak_buffered = self.peak_buffered.max(self.buffered);
        self.found += 1;
        if (self.hook)(map).is_break() {
            debug!("hook stopped the search after {} results", self.found);
            self.stop = StopReason::Aborted;
            return ControlFlow::Break(());
        }
        if self.config.limit_reached(self.found) {
            self.stop = StopReason::LimitReached;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}
