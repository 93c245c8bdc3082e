pub mod error;
mod grammar;
mod lexer;

pub use error::ParseError;

use crate::tree::SyntaxNode;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Parse the source into a fresh tree rooted at a `File` node.
    /// The root's text is always the complete source.
    pub fn parse(&self) -> Result<SyntaxNode, ParseError> {
        let lexemes = lexer::tokenize(&self.source, self.file_id)?;
        let mut parser = grammar::SyntaxParser::new(&self.source, lexemes, self.file_id);
        parser.parse_file()?;
        Ok(parser.into_builder().finish())
    }
}
