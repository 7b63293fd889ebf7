mod builder;
mod graph;
mod parser;

pub use builder::BuildError;
pub use graph::Graph;
pub use parser::{ParseError, Parser};
