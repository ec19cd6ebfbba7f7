//! Vertex maps between graphs: caller-supplied partial images and the
//! search's working assignment.

use contracts::*;

use crate::Digraph;

/// Marks an unassigned entry of a map buffer.
pub const UNASSIGNED: usize = usize::MAX;

/// A partial map from domain vertices to codomain vertices.
///
/// Entry `v` is `Some(t)` when domain vertex `v` is fixed to codomain vertex
/// `t`. Used as the image hint of a search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PartialMap {
    entries: Vec<Option<usize>>,
}

impl PartialMap {
    /// A map of `len` entries, none fixed.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            entries: vec![None; len],
        }
    }

    /// Fixes `vertex` to `target`, builder style.
    #[must_use]
    #[debug_requires(vertex < self.entries.len())]
    pub fn fix(mut self, vertex: usize, target: usize) -> Self {
        self.entries[vertex] = Some(target);
        self
    }

    /// Sets or clears the entry of `vertex`.
    #[debug_requires(vertex < self.entries.len())]
    pub fn set(&mut self, vertex: usize, target: Option<usize>) {
        self.entries[vertex] = target;
    }

    /// The entry of `vertex`, `None` when unfixed or past the end.
    #[must_use]
    pub fn get(&self, vertex: usize) -> Option<usize> {
        self.entries.get(vertex).copied().flatten()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed pairs `(vertex, target)` in ascending vertex order.
    pub fn fixed(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(vertex, target)| target.map(|t| (vertex, t)))
    }

    /// The entries as a slice.
    #[must_use]
    pub fn entries(&self) -> &[Option<usize>] {
        &self.entries
    }
}

impl From<Vec<Option<usize>>> for PartialMap {
    fn from(entries: Vec<Option<usize>>) -> Self {
        Self { entries }
    }
}

impl FromIterator<Option<usize>> for PartialMap {
    fn from_iter<I: IntoIterator<Item = Option<usize>>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Whether `map` is a homomorphism from `domain` to `codomain`.
///
/// `map` must have one in-range entry per domain vertex. With
/// `respect_colors`, every vertex must also keep its colour.
pub fn is_homomorphism(
    domain: &Digraph,
    codomain: &Digraph,
    map: &[usize],
    respect_colors: bool,
) -> bool {
    let n2 = codomain.vertex_count();
    map.len() == domain.vertex_count()
        && map.iter().all(|&t| t < n2)
        && (!respect_colors || (0..map.len()).all(|v| domain.color(v) == codomain.color(map[v])))
        && domain
            .edges()
            .all(|(from, to)| codomain.has_edge(map[from], map[to]))
}

/// The working assignment of a search, stored in the caller's buffer.
///
/// Tracks how often each codomain vertex is used so the number of distinct
/// images is available in constant time.
#[derive(Debug)]
pub(crate) struct Assignment<'buf> {
    map: &'buf mut [usize],
    image_uses: Vec<usize>,
    distinct_images: usize,
    assigned: usize,
}

impl<'buf> Assignment<'buf> {
    /// Wraps `map`, resetting every entry to [`UNASSIGNED`].
    #[debug_ensures(ret.assigned == 0)]
    pub(crate) fn new(map: &'buf mut [usize], codomain_size: usize) -> Self {
        map.fill(UNASSIGNED);
        Self {
            map,
            image_uses: vec![0; codomain_size],
            distinct_images: 0,
            assigned: 0,
        }
    }

    #[debug_requires(self.map[vertex] == UNASSIGNED, "vertex already assigned")]
    #[debug_ensures(self.map[vertex] == target)]
    pub(crate) fn assign(&mut self, vertex: usize, target: usize) {
        self.map[vertex] = target;
        if self.image_uses[target] == 0 {
            self.distinct_images += 1;
        }
        self.image_uses[target] += 1;
        self.assigned += 1;
    }

    #[debug_requires(self.map[vertex] != UNASSIGNED, "vertex not assigned")]
    #[debug_ensures(self.map[vertex] == UNASSIGNED)]
    pub(crate) fn unassign(&mut self, vertex: usize) {
        let target = std::mem::replace(&mut self.map[vertex], UNASSIGNED);
        self.image_uses[target] -= 1;
        if self.image_uses[target] == 0 {
            self.distinct_images -= 1;
        }
        self.assigned -= 1;
    }

    pub(crate) fn image(&self, vertex: usize) -> Option<usize> {
        let target = self.map[vertex];
        (target != UNASSIGNED).then_some(target)
    }

    /// Whether some vertex is currently sent to `target`.
    pub(crate) fn is_used(&self, target: usize) -> bool {
        self.image_uses[target] > 0
    }

    pub(crate) fn is_assigned(&self, vertex: usize) -> bool {
        self.map[vertex] != UNASSIGNED
    }

    pub(crate) const fn assigned(&self) -> usize {
        self.assigned
    }

    pub(crate) const fn distinct_images(&self) -> usize {
        self.distinct_images
    }

    pub(crate) fn as_slice(&self) -> &[usize] {
        self.map
    }

    /// Whether every entry is [`UNASSIGNED`].
    pub(crate) fn is_clear(&self) -> bool {
        self.assigned == 0 && self.map.iter().all(|&t| t == UNASSIGNED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_map_accessors() {
        let map = PartialMap::new(3).fix(2, 7);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(2), Some(7));
        assert_eq!(map.get(0), None);
        assert_eq!(map.get(10), None);
        assert_eq!(map.fixed().collect::<Vec<_>>(), vec![(2, 7)]);
        assert_eq!(PartialMap::from(vec![None, None, Some(7)]), map);
    }

    #[test]
    fn assignment_tracks_distinct_images() {
        let mut buffer = [5, 5, 5, 5];
        let mut assignment = Assignment::new(&mut buffer[..3], 4);
        assert!(assignment.is_clear());
        assignment.assign(0, 1);
        assignment.assign(1, 1);
        assignment.assign(2, 3);
        assert_eq!(assignment.distinct_images(), 2);
        assert_eq!(assignment.as_slice(), &[1, 1, 3]);
        assignment.unassign(1);
        assert_eq!(assignment.distinct_images(), 2);
        assert!(assignment.is_used(1));
        assignment.unassign(0);
        assert_eq!(assignment.distinct_images(), 1);
        assert!(!assignment.is_used(1));
        assert!(assignment.is_used(3));
        assert_eq!(assignment.image(2), Some(3));
        assert!(!assignment.is_assigned(0));
        assignment.unassign(2);
        assert!(assignment.is_clear());
        assert_eq!(buffer[3], 5);
    }

    #[test]
    fn homomorphism_check() {
        let edge = Digraph::from_edges(2, [(0, 1)]).unwrap();
        let cycle = Digraph::from_edges(3, [(0, 1), (1, 2), (2, 0)]).unwrap();
        assert!(is_homomorphism(&edge, &cycle, &[2, 0], true));
        assert!(!is_homomorphism(&edge, &cycle, &[0, 2], true));
        assert!(!is_homomorphism(&edge, &cycle, &[0], true));
        assert!(!is_homomorphism(&edge, &cycle, &[0, 3], true));
    }
}
