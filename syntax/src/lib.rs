//! Lossless syntax trees for a small Scala-flavoured language.
//!
//! Every node knows its text, its parent and its children, and any node can
//! be replaced in place. Trees are single-threaded (`Rc`-based).

pub mod parser;
pub mod tree;

pub use parser::{ParseError, Parser};
pub use tree::{SyntaxKind, SyntaxNode};

/// Parse `source` as a file with file id 0.
pub fn parse(source: &str) -> Result<SyntaxNode, ParseError> {
    Parser::new(source.to_string(), 0).parse()
}
