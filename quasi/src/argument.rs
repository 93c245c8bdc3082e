use std::rc::Rc;

use syntax::SyntaxNode;

use crate::matcher::PLACEHOLDER;

pub const DEFAULT_SEPARATOR: &str = ", ";

/// A value substituted into one template slot.
#[derive(Debug, Clone)]
pub enum Argument {
    /// Inserted as source text and parsed with the template.
    Str(String),
    /// Inserted as its decimal text.
    Int(i64),
    /// `None` contributes nothing; `Some` behaves like [`Argument::Fragment`].
    Optional(Option<SyntaxNode>),
    /// A pre-built node, spliced without re-parsing.
    Fragment(SyntaxNode),
    /// Pre-built nodes joined by `separator` in the template text.
    Sequence {
        nodes: Vec<SyntaxNode>,
        separator: String,
    },
}

impl Argument {
    pub fn str(text: impl Into<String>) -> Self {
        Argument::Str(text.into())
    }

    pub fn int(value: i64) -> Self {
        Argument::Int(value)
    }

    pub fn fragment(node: SyntaxNode) -> Self {
        Argument::Fragment(node)
    }

    pub fn optional(node: Option<SyntaxNode>) -> Self {
        Argument::Optional(node)
    }

    pub fn sequence(nodes: impl IntoIterator<Item = SyntaxNode>) -> Self {
        Self::sequence_with(nodes, DEFAULT_SEPARATOR)
    }

    pub fn sequence_with(
        nodes: impl IntoIterator<Item = SyntaxNode>,
        separator: impl Into<String>,
    ) -> Self {
        Argument::Sequence {
            nodes: nodes.into_iter().collect(),
            separator: separator.into(),
        }
    }
}

impl From<&str> for Argument {
    fn from(text: &str) -> Self {
        Argument::Str(text.to_string())
    }
}

impl From<String> for Argument {
    fn from(text: String) -> Self {
        Argument::Str(text)
    }
}

macro_rules! int_argument {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Argument {
            fn from(value: $ty) -> Self {
                Argument::Int(i64::from(value))
            }
        })*
    };
}

int_argument!(i8, i16, i32, i64, u8, u16, u32);

impl From<SyntaxNode> for Argument {
    fn from(node: SyntaxNode) -> Self {
        Argument::Fragment(node)
    }
}

impl From<Option<SyntaxNode>> for Argument {
    fn from(node: Option<SyntaxNode>) -> Self {
        Argument::Optional(node)
    }
}

impl From<Vec<SyntaxNode>> for Argument {
    fn from(nodes: Vec<SyntaxNode>) -> Self {
        Argument::sequence(nodes)
    }
}

/// A node waiting to replace one placeholder.
#[derive(Debug, Clone)]
pub(crate) enum Fragment {
    Node(SyntaxNode),
    /// Element `index` of a sequence argument.
    Element {
        sequence: Rc<[SyntaxNode]>,
        index: usize,
    },
}

impl Fragment {
    /// The node that will replace the placeholder.
    pub(crate) fn node(&self) -> &SyntaxNode {
        match self {
            Fragment::Node(node) => node,
            Fragment::Element { sequence, index } => &sequence[*index],
        }
    }
}

/// Arguments reduced to template text plus the fragments to splice.
#[derive(Debug, Default)]
pub(crate) struct Normalized {
    /// One entry per argument.
    pub separators: Vec<String>,
    /// All fragments, in argument order.
    pub fragments: Vec<Fragment>,
}

pub(crate) fn normalize(args: &[Argument]) -> Normalized {
    let mut out = Normalized::default();

    for arg in args {
        match arg {
            Argument::Str(text) => out.separators.push(text.clone()),
            Argument::Int(value) => out.separators.push(value.to_string()),
            Argument::Optional(None) => out.separators.push(String::new()),
            Argument::Optional(Some(node)) | Argument::Fragment(node) => {
                out.separators.push(PLACEHOLDER.to_string());
                out.fragments.push(Fragment::Node(node.clone()));
            }
            Argument::Sequence { nodes, separator } => {
                out.separators
                    .push(vec![PLACEHOLDER; nodes.len()].join(separator.as_str()));
                let sequence: Rc<[SyntaxNode]> = nodes.as_slice().into();
                out.fragments.extend(
                    (0..nodes.len()).map(|index| Fragment::Element {
                        sequence: Rc::clone(&sequence),
                        index,
                    }),
                );
            }
        }
    }

    out
}
