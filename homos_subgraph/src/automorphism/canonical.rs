//! Canonical labeling by individualization and refinement.

use std::cmp::Ordering;

use tracing::trace;

use super::AutomorphismStats;
use super::backtrack::extend_to_automorphism;
use crate::{Digraph, GraphIndex};

/// An ordered partition of the vertices. The order of the cells is
/// isomorphism invariant, the order inside a cell is not.
type Cells = Vec<Vec<usize>>;

/// Colours and sorted edges of a relabeled graph. Equal certificates mean
/// equal relabeled graphs.
type Certificate = (Vec<u32>, Vec<(usize, usize)>);

/// Cells of equal colour, ordered by colour.
fn initial_partition(graph: &Digraph) -> Cells {
    let mut order: Vec<usize> = (0..graph.vertex_count()).collect();
    order.sort_by_key(|&v| (graph.color(v), v));
    order
        .chunk_by(|&a, &b| graph.color(a) == graph.color(b))
        .map(<[usize]>::to_vec)
        .collect()
}

/// Splits cells until every vertex of a cell has the same number of out- and
/// in-neighbours in every cell. New cells take the place of the cell they
/// come from, ordered by those counts.
fn refine(graph: &Digraph, mut cells: Cells) -> Cells {
    loop {
        let mut cell_of = vec![0; graph.vertex_count()];
        for (index, cell) in cells.iter().enumerate() {
            for &v in cell {
                cell_of[v] = index;
            }
        }
        let signature = |v: usize| {
            let mut outs = vec![0usize; cells.len()];
            for &w in graph.out_neighbours(v) {
                outs[cell_of[w]] += 1;
            }
            let mut ins = vec![0usize; cells.len()];
            for &w in graph.in_neighbours(v) {
                ins[cell_of[w]] += 1;
            }
            (outs, ins)
        };

        let mut refined = Vec::with_capacity(cells.len());
        for cell in &cells {
            if cell.len() == 1 {
                refined.push(cell.clone());
                continue;
            }
            let mut keyed: Vec<_> = cell.iter().map(|&v| (signature(v), v)).collect();
            keyed.sort();
            for group in keyed.chunk_by(|a, b| a.0 == b.0) {
                refined.push(group.iter().map(|(_, v)| *v).collect());
            }
        }

        if refined.len() == cells.len() {
            return refined;
        }
        cells = refined;
    }
}

/// `cells` with `vertex` split off in front of its cell `target`.
fn individualize(cells: &Cells, target: usize, vertex: usize) -> Cells {
    let mut out = Vec::with_capacity(cells.len() + 1);
    out.extend_from_slice(&cells[..target]);
    out.push(vec![vertex]);
    out.push(cells[target].iter().copied().filter(|&v| v != vertex).collect());
    out.extend_from_slice(&cells[target + 1..]);
    out
}

fn certificate(graph: &Digraph, labeling: &[usize]) -> Certificate {
    let relabeled = graph.permuted(labeling);
    (relabeled.colors().to_vec(), relabeled.edges().collect())
}

pub(super) struct CanonicalSearch<'g, 'h> {
    graph: &'g Digraph,
    index: GraphIndex,
    hook: &'h mut dyn FnMut(&[usize]),
    best: Option<(Certificate, Vec<usize>)>,
    stats: AutomorphismStats,
}

impl<'g, 'h> CanonicalSearch<'g, 'h> {
    pub(super) fn new(graph: &'g Digraph, hook: &'h mut dyn FnMut(&[usize])) -> Self {
        Self {
            graph,
            index: GraphIndex::build(graph),
            hook,
            best: None,
            stats: AutomorphismStats::default(),
        }
    }

    /// The canonical labeling and the counters of the search.
    pub(super) fn run(mut self) -> (Vec<usize>, AutomorphismStats) {
        let root = initial_partition(self.graph);
        self.explore(root, &mut Vec::new());
        let labeling = self
            .best
            .map(|(_, labeling)| labeling)
            .unwrap_or_default();
        (labeling, self.stats)
    }

    fn explore(&mut self, cells: Cells, path: &mut Vec<usize>) {
        self.stats.nof_nodes += 1;
        self.stats.max_level = self.stats.max_level.max(path.len() as u64);

        let cells = refine(self.graph, cells);
        let Some(target) = cells.iter().position(|cell| cell.len() > 1) else {
            self.leaf(&cells);
            return;
        };

        let mut explored: Vec<usize> = Vec::new();
        for &vertex in &cells[target] {
            if explored
                .iter()
                .any(|&seen| self.equivalent(path.as_slice(), seen, vertex))
            {
                trace!("canonical search: skipping sibling {}", vertex);
                continue;
            }
            path.push(vertex);
            self.explore(individualize(&cells, target, vertex), path);
            path.pop();
            explored.push(vertex);
        }
    }

    /// Whether an automorphism fixing `path` pointwise sends `from` to `to`.
    fn equivalent(&mut self, path: &[usize], from: usize, to: usize) -> bool {
        let pairs: Vec<(usize, usize)> = path
            .iter()
            .map(|&v| (v, v))
            .chain([(from, to)])
            .collect();
        let (found, _) = extend_to_automorphism(self.graph, &self.index, &pairs);
        found.is_some_and(|perm| {
            self.stats.nof_generators += 1;
            (self.hook)(&perm);
            true
        })
    }

    fn leaf(&mut self, cells: &Cells) {
        self.stats.nof_leaf_nodes += 1;
        let mut labeling = vec![0; self.graph.vertex_count()];
        for (index, cell) in cells.iter().enumerate() {
            labeling[cell[0]] = index;
        }
        let leaf = certificate(self.graph, &labeling);

        let ordering = self
            .best
            .as_ref()
            .map_or(Ordering::Less, |(best, _)| leaf.cmp(best));
        match ordering {
            Ordering::Less => {
                self.stats.nof_canonical_updates += 1;
                self.best = Some((leaf, labeling));
            }
            Ordering::Equal => {
                // Both labelings give the same graph, so best⁻¹ ∘ leaf is an automorphism.
                if let Some((_, best)) = &self.best {
                    let mut inverse = vec![0; best.len()];
                    for (v, &image) in best.iter().enumerate() {
                        inverse[image] = v;
                    }
                    let perm: Vec<usize> = labeling.iter().map(|&image| inverse[image]).collect();
                    self.stats.nof_generators += 1;
                    (self.hook)(&perm);
                }
            }
            Ordering::Greater => self.stats.nof_bad_nodes += 1,
        }
    }
}
