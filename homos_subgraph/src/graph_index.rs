use std::collections::HashMap;

use homos_bitarray::BitArray;

use crate::Digraph;

/// A frozen, bit-array view of a [`Digraph`] used on the search hot path.
///
/// Every neighbourhood is a [`BitArray`] over the vertices of the indexed
/// graph, so candidate sets of another graph mapped into this one can be
/// narrowed with one block-wise intersection per edge.
#[derive(Clone, Debug)]
pub struct GraphIndex {
    vertex_count: usize,
    out_sets: Vec<BitArray>,
    in_sets: Vec<BitArray>,
    loops: BitArray,
    out_degrees: Vec<usize>,
    in_degrees: Vec<usize>,
    colors: Vec<u32>,
    color_classes: HashMap<u32, BitArray>,
}

impl GraphIndex {
    /// Indexes `graph`.
    pub fn build(graph: &Digraph) -> Self {
        let n = graph.vertex_count();

        // 1. Neighbourhoods and degrees
        let out_sets: Vec<BitArray> = (0..n)
            .map(|v| BitArray::from_positions(n, graph.out_neighbours(v)))
            .collect();
        let in_sets: Vec<BitArray> = (0..n)
            .map(|v| BitArray::from_positions(n, graph.in_neighbours(v)))
            .collect();
        let out_degrees = (0..n).map(|v| graph.out_degree(v)).collect();
        let in_degrees = (0..n).map(|v| graph.in_degree(v)).collect();

        // 2. Loops
        let mut loops = BitArray::new(n);
        for v in (0..n).filter(|&v| graph.has_edge(v, v)) {
            loops.set(v, true);
        }

        // 3. Colour classes
        let mut color_classes: HashMap<u32, BitArray> = HashMap::new();
        for (v, &color) in graph.colors().iter().enumerate() {
            color_classes
                .entry(color)
                .or_insert_with(|| BitArray::new(n))
                .set(v, true);
        }

        Self {
            vertex_count: n,
            out_sets,
            in_sets,
            loops,
            out_degrees,
            in_degrees,
            colors: graph.colors().to_vec(),
            color_classes,
        }
    }

    /// Number of indexed vertices.
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Out-neighbours of `v` as a bit array.
    pub fn out_set(&self, v: usize) -> &BitArray {
        &self.out_sets[v]
    }

    /// In-neighbours of `v` as a bit array.
    pub fn in_set(&self, v: usize) -> &BitArray {
        &self.in_sets[v]
    }

    /// Whether `v -> v` is an edge.
    pub fn has_loop(&self, v: usize) -> bool {
        self.loops.get(v)
    }

    /// Whether `from -> to` is an edge.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.out_sets[from].get(to)
    }

    /// Out-degree of `v`.
    pub fn out_degree(&self, v: usize) -> usize {
        self.out_degrees[v]
    }

    /// In-degree of `v`.
    pub fn in_degree(&self, v: usize) -> usize {
        self.in_degrees[v]
    }

    /// Colour of `v`.
    pub fn color(&self, v: usize) -> u32 {
        self.colors[v]
    }

    /// Vertices of colour `color`, if any vertex has it.
    pub fn color_class(&self, color: u32) -> Option<&BitArray> {
        self.color_classes.get(&color)
    }
}
