//! Overlap multigraph and its connected components ("islands")

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

/// Undirected multigraph over body indices
///
/// Duplicate edges are kept; they only cost a repeated swept test later.
#[derive(Debug, Clone, Default)]
pub struct OverlapGraph {
    adjacency: HashMap<usize, Vec<usize>>,
    /// Vertices in first-recorded order, which fixes island order
    vertices: Vec<usize>,
    edges: Vec<(usize, usize)>,
}

impl OverlapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.vertices.clear();
        self.edges.clear();
    }

    /// Record an overlap between bodies `i` and `j`
    pub fn add_edge(&mut self, i: usize, j: usize) {
        debug_assert_ne!(i, j, "self-overlap is not an edge");
        self.edges.push((i, j));
        for (from, to) in [(i, j), (j, i)] {
            match self.adjacency.entry(from) {
                Entry::Occupied(mut e) => e.get_mut().push(to),
                Entry::Vacant(e) => {
                    self.vertices.push(from);
                    e.insert(vec![to]);
                }
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Recorded edges, duplicates included
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Visit every connected component once with its vertices and edges
    ///
    /// Components come in order of their first-recorded vertex. Returns the
    /// number of components visited.
    pub fn query_islands<F>(&self, mut on_island: F) -> usize
    where
        F: FnMut(&[usize], &[(usize, usize)]),
    {
        let mut component: HashMap<usize, usize> = HashMap::with_capacity(self.vertices.len());
        let mut islands: Vec<Vec<usize>> = Vec::new();
        let mut queue = VecDeque::new();

        for &start in &self.vertices {
            if component.contains_key(&start) {
                continue;
            }
            let id = islands.len();
            component.insert(start, id);
            queue.push_back(start);

            let mut members = Vec::new();
            while let Some(v) = queue.pop_front() {
                members.push(v);
                for &n in &self.adjacency[&v] {
                    if let Entry::Vacant(e) = component.entry(n) {
                        e.insert(id);
                        queue.push_back(n);
                    }
                }
            }
            islands.push(members);
        }

        let mut island_edges = vec![Vec::new(); islands.len()];
        for &(i, j) in &self.edges {
            island_edges[component[&i]].push((i, j));
        }

        for (vertices, edges) in islands.iter().zip(&island_edges) {
            on_island(vertices, edges);
        }

        islands.len()
    }
}
