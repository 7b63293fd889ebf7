use thiserror::Error;

use crate::graph::Graph;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing problem line (p <format> <vertices> <edges>)")]
    MissingProblemLine,
    #[error("Invalid line {line}: {content}")]
    InvalidLine { line: usize, content: String },
    #[error("Invalid number on line {line}: {text}")]
    InvalidNumber { line: usize, text: String },
    #[error("Vertex {vertex} on line {line} is out of range 1..={vertices}")]
    VertexOutOfRange {
        line: usize,
        vertex: usize,
        vertices: usize,
    },
    #[error("Problem line declares {declared} edges, found {found}")]
    EdgeCountMismatch { declared: usize, found: usize },
    #[error("Second problem line on line {line}")]
    DuplicateProblemLine { line: usize },
}

/// Reader for DIMACS graph files.
///
/// ```text
/// c comment
/// p edge 4 3
/// e 1 2
/// e 2 3
/// e 3 4
/// ```
///
/// Vertices are numbered from 1 in the file and from 0 in the [`Graph`].
pub struct Parser<'a> {
    source: &'a str,
    header: Option<(usize, usize)>,
    edges: Vec<(usize, usize)>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            header: None,
            edges: Vec::new(),
        }
    }

    pub fn parse(source: &str) -> Result<Graph, ParseError> {
        Parser::new(source).parse_graph()
    }

    fn parse_graph(mut self) -> Result<Graph, ParseError> {
        let source = self.source;
        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let mut fields = raw.split_whitespace();
            match fields.next() {
                None | Some("c") => {}
                Some("p") => self.parse_problem_line(line, raw, fields)?,
                Some("e") => self.parse_edge(line, raw, fields)?,
                Some(_) => {
                    return Err(ParseError::InvalidLine {
                        line,
                        content: raw.to_string(),
                    });
                }
            }
        }

        let (vertices, declared) = self.header.ok_or(ParseError::MissingProblemLine)?;
        if self.edges.len() != declared {
            return Err(ParseError::EdgeCountMismatch {
                declared,
                found: self.edges.len(),
            });
        }

        Ok(Graph::from_parts(vertices, self.edges))
    }

    fn parse_problem_line<'s>(
        &mut self,
        line: usize,
        raw: &str,
        mut fields: impl Iterator<Item = &'s str>,
    ) -> Result<(), ParseError> {
        if self.header.is_some() {
            return Err(ParseError::DuplicateProblemLine { line });
        }
        // The format word (`edge`, `col`) is not checked
        let (Some(_), Some(vertices), Some(edges), None) = (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(ParseError::InvalidLine {
                line,
                content: raw.to_string(),
            });
        };

        self.header = Some((parse_number(line, vertices)?, parse_number(line, edges)?));
        Ok(())
    }

    fn parse_edge<'s>(
        &mut self,
        line: usize,
        raw: &str,
        mut fields: impl Iterator<Item = &'s str>,
    ) -> Result<(), ParseError> {
        let (vertices, _) = self.header.ok_or(ParseError::MissingProblemLine)?;
        let (Some(u), Some(v), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(ParseError::InvalidLine {
                line,
                content: raw.to_string(),
            });
        };

        let endpoint = |text: &str| -> Result<usize, ParseError> {
            let vertex = parse_number(line, text)?;
            if vertex == 0 || vertex > vertices {
                return Err(ParseError::VertexOutOfRange { line, vertex, vertices });
            }
            Ok(vertex - 1)
        };
        let edge = (endpoint(u)?, endpoint(v)?);
        self.edges.push(edge);
        Ok(())
    }
}

fn parse_number(line: usize, text: &str) -> Result<usize, ParseError> {
    text.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        text: text.to_string(),
    })
}
