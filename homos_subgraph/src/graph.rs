//! Vertex-coloured directed graphs.

use std::fmt;

use contracts::*;
use homos_common::GraphFixture;

use crate::HomosError;

/// A directed graph on the vertices `0..vertex_count()`.
///
/// Loops are allowed, parallel edges are not: adding an edge that already
/// exists is a no-op. Every vertex carries a `u32` colour, `0` unless set.
/// Neighbour lists are kept sorted, so two graphs compare equal exactly when
/// they have the same colours and the same edge set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Digraph {
    out_neighbours: Vec<Vec<usize>>,
    in_neighbours: Vec<Vec<usize>>,
    colors: Vec<u32>,
    edge_count: usize,
}

impl Digraph {
    /// `n` isolated vertices of colour 0.
    pub fn new(n: usize) -> Self {
        Self {
            out_neighbours: vec![Vec::new(); n],
            in_neighbours: vec![Vec::new(); n],
            colors: vec![0; n],
            edge_count: 0,
        }
    }

    /// `n` vertices and the listed edges.
    ///
    /// # Errors
    ///
    /// [`HomosError::VertexOutOfRange`] for the first edge with an endpoint
    /// outside `0..n`.
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self, HomosError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut graph = Self::new(n);
        for (from, to) in edges {
            graph.add_edge(from, to)?;
        }
        Ok(graph)
    }

    /// Builds a graph from a shared fixture.
    ///
    /// # Errors
    ///
    /// [`HomosError::VertexOutOfRange`] if the fixture lists an edge or a
    /// colour for a vertex it does not have.
    pub fn from_fixture(fixture: &GraphFixture) -> Result<Self, HomosError> {
        let mut graph = Self::from_edges(fixture.vertices, fixture.edges.iter().copied())?;
        if let Some(colors) = &fixture.colors {
            for (vertex, &color) in colors.iter().enumerate() {
                graph.change_color(vertex, color)?;
            }
        }
        Ok(graph)
    }

    /// Appends a vertex with the given colour and returns its index.
    pub fn add_vertex(&mut self, color: u32) -> usize {
        self.out_neighbours.push(Vec::new());
        self.in_neighbours.push(Vec::new());
        self.colors.push(color);
        self.colors.len() - 1
    }

    /// Adds the edge `from -> to`. Adding an existing edge does nothing.
    ///
    /// # Errors
    ///
    /// [`HomosError::VertexOutOfRange`] if either endpoint is not a vertex.
    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<(), HomosError> {
        HomosError::check_vertex("edge tail", from, self.vertex_count())?;
        HomosError::check_vertex("edge head", to, self.vertex_count())?;
        let outs = &mut self.out_neighbours[from];
        if let Err(at) = outs.binary_search(&to) {
            outs.insert(at, to);
            let ins = &mut self.in_neighbours[to];
            if let Err(at) = ins.binary_search(&from) {
                ins.insert(at, from);
            }
            self.edge_count += 1;
        }
        Ok(())
    }

    /// Sets the colour of `vertex`.
    ///
    /// # Errors
    ///
    /// [`HomosError::VertexOutOfRange`] if `vertex` is not a vertex.
    pub fn change_color(&mut self, vertex: usize, color: u32) -> Result<(), HomosError> {
        HomosError::check_vertex("coloured", vertex, self.vertex_count())?;
        self.colors[vertex] = color;
        Ok(())
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.colors.len()
    }

    /// Number of edges, loops included.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of edges leaving `vertex`.
    #[must_use]
    pub fn out_degree(&self, vertex: usize) -> usize {
        self.out_neighbours[vertex].len()
    }

    /// Number of edges entering `vertex`.
    #[must_use]
    pub fn in_degree(&self, vertex: usize) -> usize {
        self.in_neighbours[vertex].len()
    }

    /// Heads of the edges leaving `vertex`, ascending.
    #[must_use]
    pub fn out_neighbours(&self, vertex: usize) -> &[usize] {
        &self.out_neighbours[vertex]
    }

    /// Tails of the edges entering `vertex`, ascending.
    #[must_use]
    pub fn in_neighbours(&self, vertex: usize) -> &[usize] {
        &self.in_neighbours[vertex]
    }

    /// Whether `from -> to` is an edge.
    #[must_use]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.out_neighbours
            .get(from)
            .is_some_and(|outs| outs.binary_search(&to).is_ok())
    }

    /// Colour of `vertex`.
    #[must_use]
    pub fn color(&self, vertex: usize) -> u32 {
        self.colors[vertex]
    }

    /// All vertex colours, indexed by vertex.
    #[must_use]
    pub fn colors(&self) -> &[u32] {
        &self.colors
    }

    /// All edges in lexicographic order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.out_neighbours
            .iter()
            .enumerate()
            .flat_map(|(from, outs)| outs.iter().map(move |&to| (from, to)))
    }

    /// The graph with every vertex `v` renamed to `labeling[v]`.
    ///
    /// `labeling` must be a permutation of `0..vertex_count()`.
    #[must_use]
    #[debug_requires(is_permutation(labeling, self.vertex_count()), "labeling is not a permutation")]
    pub fn permuted(&self, labeling: &[usize]) -> Self {
        let n = self.vertex_count();
        let mut out_neighbours = vec![Vec::new(); n];
        let mut in_neighbours = vec![Vec::new(); n];
        let mut colors = vec![0; n];
        for v in 0..n {
            colors[labeling[v]] = self.colors[v];
        }
        for (from, to) in self.edges() {
            out_neighbours[labeling[from]].push(labeling[to]);
            in_neighbours[labeling[to]].push(labeling[from]);
        }
        for list in out_neighbours.iter_mut().chain(in_neighbours.iter_mut()) {
            list.sort_unstable();
        }
        Self {
            out_neighbours,
            in_neighbours,
            colors,
            edge_count: self.edge_count,
        }
    }
}

/// Whether `perm` is a permutation of `0..n`.
pub(crate) fn is_permutation(perm: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    perm.len() == n
        && perm
            .iter()
            .all(|&image| image < n && !std::mem::replace(&mut seen[image], true))
}

impl fmt::Display for Digraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "digraph with {} vertices and {} edges",
            self.vertex_count(),
            self.edge_count
        )?;
        for v in 0..self.vertex_count() {
            write!(f, "  {v} [color {}] ->", self.colors[v])?;
            for to in &self.out_neighbours[v] {
                write!(f, " {to}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_edges_are_ignored() {
        let mut graph = Digraph::new(2);
        graph.add_edge(0, 1).unwrap();
        graph.add_edge(0, 1).unwrap();
        graph.add_edge(1, 1).unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.out_neighbours(0), &[1]);
        assert_eq!(graph.in_neighbours(1), &[0, 1]);
        assert_eq!(graph.out_degree(1), 1);
        assert_eq!(graph.in_degree(0), 0);
    }

    #[test]
    fn out_of_range_edges_are_rejected() {
        let mut graph = Digraph::new(2);
        assert_eq!(
            graph.add_edge(0, 2),
            Err(HomosError::vertex_out_of_range("edge head", 2, 2))
        );
        assert!(graph.change_color(5, 1).is_err());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn add_vertex_extends_the_graph() {
        let mut graph = Digraph::new(1);
        let v = graph.add_vertex(7);
        assert_eq!(v, 1);
        assert_eq!(graph.color(v), 7);
        graph.add_edge(v, 0).unwrap();
        assert!(graph.has_edge(1, 0));
        assert!(!graph.has_edge(0, 1));
        assert!(!graph.has_edge(9, 0));
    }

    #[test]
    fn permuted_relabels_edges_and_colours() {
        let mut graph = Digraph::from_edges(3, [(0, 1), (1, 2)]).unwrap();
        graph.change_color(0, 4).unwrap();
        let relabeled = graph.permuted(&[2, 0, 1]);
        assert_eq!(relabeled.edges().collect::<Vec<_>>(), vec![(0, 1), (2, 0)]);
        assert_eq!(relabeled.colors(), &[0, 0, 4]);
        assert_eq!(relabeled.permuted(&[1, 2, 0]), graph);
    }

    #[test]
    fn display_lists_adjacency() {
        let graph = Digraph::from_edges(2, [(0, 1)]).unwrap();
        assert_eq!(
            graph.to_string(),
            "digraph with 2 vertices and 1 edges\n  0 [color 0] -> 1\n  1 [color 0] ->\n"
        );
    }

    #[test]
    fn permutation_check() {
        assert!(is_permutation(&[1, 0, 2], 3));
        assert!(!is_permutation(&[1, 1, 2], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 3, 1], 3));
    }
}
