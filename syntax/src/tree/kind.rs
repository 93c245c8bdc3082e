use std::fmt;
use std::str::FromStr;

/// The kind of a node in the syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root of every parsed source.
    File,

    // Declarations
    /// `val x: T = expr` or `var x = expr`
    ValDecl,
    /// `def f(params): T = expr`
    DefDecl,
    ParamList,
    Param,

    // Types
    /// A type annotation: `Int`, `List[Int]`
    Type,
    TypeArgs,

    // Expressions
    Name,
    Literal,
    Call,
    ArgList,
    Member,
    Binary,
    Unary,
    Paren,
    Block,
    If,

    // Leaves
    Token,
    Trivia,
}

impl SyntaxKind {
    pub fn is_leaf(self) -> bool {
        matches!(self, SyntaxKind::Token | SyntaxKind::Trivia)
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::Name
                | SyntaxKind::Literal
                | SyntaxKind::Call
                | SyntaxKind::Member
                | SyntaxKind::Binary
                | SyntaxKind::Unary
                | SyntaxKind::Paren
                | SyntaxKind::Block
                | SyntaxKind::If
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for SyntaxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: &[SyntaxKind] = &[
            SyntaxKind::File,
            SyntaxKind::ValDecl,
            SyntaxKind::DefDecl,
            SyntaxKind::ParamList,
            SyntaxKind::Param,
            SyntaxKind::Type,
            SyntaxKind::TypeArgs,
            SyntaxKind::Name,
            SyntaxKind::Literal,
            SyntaxKind::Call,
            SyntaxKind::ArgList,
            SyntaxKind::Member,
            SyntaxKind::Binary,
            SyntaxKind::Unary,
            SyntaxKind::Paren,
            SyntaxKind::Block,
            SyntaxKind::If,
            SyntaxKind::Token,
            SyntaxKind::Trivia,
        ];
        ALL.iter()
            .copied()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| format!("unknown syntax kind: {}", s))
    }
}
