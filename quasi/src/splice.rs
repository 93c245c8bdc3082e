use std::rc::Rc;

use syntax::SyntaxNode;
use tracing::{debug, trace};

use crate::argument::Fragment;

/// Nodes that were swapped out of the tree, each with what took its place.
pub(crate) type Replacements = Vec<(SyntaxNode, SyntaxNode)>;

/// Replace every placeholder with its fragment, in order.
pub(crate) fn splice(pairs: Vec<(SyntaxNode, Fragment)>) -> Replacements {
    let mut replaced = Replacements::new();
    let mut pairs = pairs.into_iter().peekable();

    while let Some((placeholder, fragment)) = pairs.next() {
        match fragment {
            Fragment::Node(node) => {
                trace!(kind = %node.kind(), "splicing fragment");
                placeholder.replace_with(&node);
                replaced.push((placeholder, node));
            }
            Fragment::Element { sequence, index } => {
                // Elements of one sequence are adjacent and start at index 0.
                let mut placeholders = vec![placeholder];
                while let Some((next, _)) = pairs.next_if(|(_, f)| same_sequence(f, &sequence)) {
                    placeholders.push(next);
                }
                trace!(first = index, len = placeholders.len(), "splicing sequence");
                splice_sequence(&placeholders, &sequence, &mut replaced);
            }
        }
    }

    replaced
}

/// The node standing in `node`'s place once splicing is done.
pub(crate) fn resolve(node: SyntaxNode, replaced: &Replacements) -> SyntaxNode {
    replaced
        .iter()
        .find(|(old, _)| *old == node)
        .map_or(node, |(_, new)| new.clone())
}

fn same_sequence(fragment: &Fragment, sequence: &Rc<[SyntaxNode]>) -> bool {
    matches!(fragment, Fragment::Element { sequence: other, .. } if Rc::ptr_eq(other, sequence))
}

/// Splice a whole sequence. When the elements are exactly the children of one
/// list node of the same kind as the list the placeholders sit in, that list
/// node replaces the placeholders' list; otherwise each element replaces its
/// own placeholder.
fn splice_sequence(
    placeholders: &[SyntaxNode],
    elements: &[SyntaxNode],
    replaced: &mut Replacements,
) {
    if let Some((target, source)) = reparent_pair(placeholders, elements) {
        debug!(kind = %target.kind(), "splicing sequence by reparenting");
        target.replace_with(&source);
        replaced.push((target, source));
    } else {
        debug!(len = elements.len(), "splicing sequence element-wise");
        for (placeholder, element) in placeholders.iter().zip(elements) {
            placeholder.replace_with(element);
        }
    }

    replaced.extend(placeholders.iter().cloned().zip(elements.iter().cloned()));
}

fn reparent_pair(
    placeholders: &[SyntaxNode],
    elements: &[SyntaxNode],
) -> Option<(SyntaxNode, SyntaxNode)> {
    let source = elements.first()?.parent()?;
    let target = placeholders.first()?.parent()?;
    // The file root is never replaced.
    target.parent()?;

    let all_children_of = |nodes: &[SyntaxNode], parent: &SyntaxNode| {
        nodes.iter().all(|node| node.parent().as_ref() == Some(parent))
    };

    let matches = source.kind() == target.kind()
        && source.child_nodes() == elements
        && all_children_of(placeholders, &target)
        && target.child_nodes().len() == placeholders.len();

    matches.then_some((target, source))
}

/// The first non-leaf child of the file root.
pub(crate) fn primary_child(root: &SyntaxNode) -> Option<SyntaxNode> {
    root.child_nodes().into_iter().next()
}
