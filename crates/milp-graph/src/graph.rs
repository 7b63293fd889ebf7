use crate::builder::BuildError;
use crate::parser::{ParseError, Parser};

/// Undirected graph with vertices `0..num_vertices`
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawGraph")
)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    vertices: usize,
    edges: Vec<(usize, usize)>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGraph {
    vertices: usize,
    edges: Vec<(usize, usize)>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGraph> for Graph {
    type Error = BuildError;

    fn try_from(raw: RawGraph) -> Result<Self, BuildError> {
        Graph::new(raw.vertices, raw.edges)
    }
}

impl Graph {
    /// Builds a graph from 0-based edges
    pub fn new(vertices: usize, edges: Vec<(usize, usize)>) -> Result<Self, BuildError> {
        if let Some(&vertex) = edges.iter().flat_map(|(u, v)| [u, v]).find(|&&x| x >= vertices) {
            return Err(BuildError::VertexOutOfRange { vertex, vertices });
        }
        Ok(Self::from_parts(vertices, edges))
    }

    /// Parses a DIMACS graph file
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        Parser::parse(source)
    }

    pub(crate) fn from_parts(vertices: usize, edges: Vec<(usize, usize)>) -> Self {
        Self { vertices, edges }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Vertices without any incident edge
    pub fn isolated_vertices(&self) -> Vec<usize> {
        let mut touched = vec![false; self.vertices];
        for &(u, v) in &self.edges {
            touched[u] = true;
            touched[v] = true;
        }
        touched
            .iter()
            .enumerate()
            .filter_map(|(vertex, &t)| (!t).then_some(vertex))
            .collect()
    }
}
