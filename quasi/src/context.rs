use std::fmt;
use std::str::FromStr;

use syntax::{SyntaxKind, SyntaxNode};

/// The syntactic position a template is rendered for.
///
/// `wrap` is applied to the first template segment before parsing, so a
/// context can prefix the template with a small scaffold. `select` picks the
/// node of interest out of the parsed scaffold before fragments are spliced
/// in; a placeholder it returns stands for the fragment that replaces it.
#[derive(Clone, Copy)]
pub struct Context {
    name: &'static str,
    wrap: fn(&str) -> String,
    select: fn(&SyntaxNode) -> Option<SyntaxNode>,
}

impl Context {
    /// Statement position: the template is parsed as-is and its first item
    /// is returned.
    pub const STATEMENT: Context = Context::new("statement", identity_wrap, identity_select);

    /// Expression position: parsed as the initializer of `val v = …`.
    pub const EXPRESSION: Context = Context::new("expression", expression_wrap, initializer);

    /// Type position: parsed as the annotation of `val v: …`.
    pub const TYPE: Context = Context::new("type", type_wrap, type_annotation);

    pub const fn new(
        name: &'static str,
        wrap: fn(&str) -> String,
        select: fn(&SyntaxNode) -> Option<SyntaxNode>,
    ) -> Self {
        Context { name, wrap, select }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn wrap(&self, first_segment: &str) -> String {
        (self.wrap)(first_segment)
    }

    pub(crate) fn select(&self, node: &SyntaxNode) -> Option<SyntaxNode> {
        (self.select)(node)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::STATEMENT
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context").field(&self.name).finish()
    }
}

impl FromStr for Context {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "statement" | "stmt" => Ok(Context::STATEMENT),
            "expression" | "expr" => Ok(Context::EXPRESSION),
            "type" => Ok(Context::TYPE),
            other => Err(format!(
                "unknown context `{}` (expected statement, expression or type)",
                other
            )),
        }
    }
}

fn identity_wrap(text: &str) -> String {
    text.to_string()
}

fn identity_select(node: &SyntaxNode) -> Option<SyntaxNode> {
    Some(node.clone())
}

fn expression_wrap(text: &str) -> String {
    format!("val v = {}", text)
}

fn type_wrap(text: &str) -> String {
    format!("val v: {}", text)
}

/// The expression after `=` in a `ValDecl`.
fn initializer(decl: &SyntaxNode) -> Option<SyntaxNode> {
    if decl.kind() != SyntaxKind::ValDecl {
        return None;
    }
    decl.children()
        .into_iter()
        .skip_while(|child| !(child.kind() == SyntaxKind::Token && child.text() == "="))
        .find(|child| child.kind().is_expression())
}

fn type_annotation(decl: &SyntaxNode) -> Option<SyntaxNode> {
    if decl.kind() != SyntaxKind::ValDecl {
        return None;
    }
    decl.child_of_kind(SyntaxKind::Type)
}
