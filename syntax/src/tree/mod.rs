pub(crate) mod builder;
pub mod kind;

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

pub use kind::SyntaxKind;

/// A node in a lossless, mutable syntax tree.
///
/// Leaves (`Token`, `Trivia`) carry source text; interior nodes carry
/// children and their text is the concatenation of their leaves. Cloning a
/// `SyntaxNode` clones the handle, not the subtree, and equality is identity.
#[derive(Clone)]
pub struct SyntaxNode(Rc<NodeData>);

struct NodeData {
    kind: SyntaxKind,
    /// Source text for leaves, `None` for interior nodes.
    text: Option<String>,
    parent: RefCell<Weak<NodeData>>,
    children: RefCell<Vec<SyntaxNode>>,
}

impl SyntaxNode {
    pub(crate) fn leaf(kind: SyntaxKind, text: impl Into<String>) -> Self {
        SyntaxNode(Rc::new(NodeData {
            kind,
            text: Some(text.into()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    pub(crate) fn interior(kind: SyntaxKind, children: Vec<SyntaxNode>) -> Self {
        let node = SyntaxNode(Rc::new(NodeData {
            kind,
            text: None,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }));
        for child in &children {
            *child.0.parent.borrow_mut() = Rc::downgrade(&node.0);
        }
        *node.0.children.borrow_mut() = children;
        node
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    /// The exact source text covered by this node.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) {
        match &self.0.text {
            Some(text) => out.push_str(text),
            None => {
                for child in self.0.children.borrow().iter() {
                    child.write_text(out);
                }
            }
        }
    }

    /// The enclosing node, or `None` for a root (or a node whose tree was dropped).
    pub fn parent(&self) -> Option<SyntaxNode> {
        self.0.parent.borrow().upgrade().map(SyntaxNode)
    }

    /// All direct children, leaves included, in source order.
    pub fn children(&self) -> Vec<SyntaxNode> {
        self.0.children.borrow().clone()
    }

    /// Direct children that are not tokens or trivia.
    pub fn child_nodes(&self) -> Vec<SyntaxNode> {
        self.0
            .children
            .borrow()
            .iter()
            .filter(|child| !child.kind().is_leaf())
            .cloned()
            .collect()
    }

    /// First direct child of the given kind.
    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.0
            .children
            .borrow()
            .iter()
            .find(|child| child.kind() == kind)
            .cloned()
    }

    /// This node and all of its descendants in pre-order.
    pub fn descendants(&self) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.0.children.borrow().iter().rev().cloned());
            out.push(node);
        }
        out
    }

    /// Replace this node, in place, with `replacement`.
    ///
    /// `replacement` is first detached from wherever it currently lives.
    /// Returns `false` (and changes nothing) when `self` has no parent.
    pub fn replace_with(&self, replacement: &SyntaxNode) -> bool {
        if self == replacement {
            return true;
        }
        let Some(parent) = self.parent() else {
            return false;
        };
        replacement.detach();

        let mut siblings = parent.0.children.borrow_mut();
        let Some(index) = siblings.iter().position(|child| child == self) else {
            return false;
        };
        siblings[index] = replacement.clone();
        *replacement.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
        *self.0.parent.borrow_mut() = Weak::new();
        true
    }

    /// Remove this node from its parent, making it a root.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.0.children.borrow_mut().retain(|child| child != self);
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    /// An indented rendering of the tree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        match &self.0.text {
            Some(text) => out.push_str(&format!("{} {:?}\n", self.kind(), text)),
            None => out.push_str(&format!("{}\n", self.kind())),
        }
        for child in self.0.children.borrow().iter() {
            child.dump_into(out, depth + 1);
        }
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.text())
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}
