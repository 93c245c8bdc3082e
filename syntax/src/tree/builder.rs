use crate::tree::{SyntaxKind, SyntaxNode};

/// Position in the currently open node, used to wrap already-built children
/// into a new parent (e.g. the left operand of a binary expression).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint(usize);

/// Stack-based tree builder. Nodes are opened, filled with leaves and
/// finished in source order.
pub(crate) struct TreeBuilder {
    stack: Vec<(SyntaxKind, Vec<SyntaxNode>)>,
}

impl TreeBuilder {
    pub(crate) fn new(root: SyntaxKind) -> Self {
        TreeBuilder {
            stack: vec![(root, Vec::new())],
        }
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.stack.push((kind, Vec::new()));
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.stack.last().map_or(0, |(_, children)| children.len()))
    }

    /// Open a node that adopts every child added since `checkpoint`.
    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let adopted = match self.stack.last_mut() {
            Some((_, children)) if checkpoint.0 <= children.len() => {
                children.split_off(checkpoint.0)
            }
            _ => Vec::new(),
        };
        self.stack.push((kind, adopted));
    }

    pub(crate) fn leaf(&mut self, kind: SyntaxKind, text: &str) {
        if let Some((_, children)) = self.stack.last_mut() {
            children.push(SyntaxNode::leaf(kind, text));
        }
    }

    pub(crate) fn finish_node(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some((kind, children)) = self.stack.pop() {
            let node = SyntaxNode::interior(kind, children);
            if let Some((_, parent)) = self.stack.last_mut() {
                parent.push(node);
            }
        }
    }

    /// Close any nodes still open and return the root.
    pub(crate) fn finish(mut self) -> SyntaxNode {
        while self.stack.len() > 1 {
            self.finish_node();
        }
        match self.stack.pop() {
            Some((kind, children)) => SyntaxNode::interior(kind, children),
            None => SyntaxNode::interior(SyntaxKind::File, Vec::new()),
        }
    }
}
