use std::collections::HashSet;

use syntax::SyntaxNode;
use tracing::trace;

use crate::argument::{Argument, Fragment};
use crate::compile::interleave;
use crate::error::TemplateError;
use crate::template::Template;

/// Marker written into the composed source wherever a fragment goes.
///
/// The grammar lexes `$` as an identifier character, so this is always a
/// single identifier token and can never be produced by splitting a longer
/// one. Template text must not contain it as a standalone token.
pub const PLACEHOLDER: &str = "placeholder$0";

/// Reject literal input that would be mistaken for a fragment position.
///
/// Each segment and `Str` argument is checked on its own, then the literal
/// text they compose together, which catches a token glued across a slot.
pub(crate) fn check_collisions(
    template: &Template,
    args: &[Argument],
) -> Result<(), TemplateError> {
    let collision = |text: &str| TemplateError::PlaceholderCollision {
        template: template.text().to_string(),
        text: text.to_string(),
    };

    let literals = template.segments().iter().chain(args.iter().filter_map(|arg| match arg {
        Argument::Str(text) => Some(text),
        _ => None,
    }));
    for text in literals {
        if contains_placeholder_token(text) {
            return Err(collision(text));
        }
    }

    let composed = interleave(template.segments(), &literal_text(args));
    if contains_placeholder_token(&composed) {
        return Err(collision(&composed));
    }
    Ok(())
}

/// What each argument writes into the source, with fragment positions
/// reduced to a space so they split identifiers instead of joining them.
fn literal_text(args: &[Argument]) -> Vec<String> {
    args.iter()
        .map(|arg| match arg {
            Argument::Str(text) => text.clone(),
            Argument::Int(value) => value.to_string(),
            Argument::Optional(None) => String::new(),
            Argument::Sequence { nodes, .. } if nodes.is_empty() => String::new(),
            Argument::Optional(Some(_)) | Argument::Fragment(_) | Argument::Sequence { .. } => {
                " ".to_string()
            }
        })
        .collect()
}

/// True when `text` contains the placeholder not embedded in a longer identifier.
fn contains_placeholder_token(text: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    text.match_indices(PLACEHOLDER).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + PLACEHOLDER.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Placeholder nodes under `root`, in source order.
///
/// A node whose whole text is the placeholder is collected and not descended
/// into; the root itself is never a candidate.
pub(crate) fn collect_placeholders(root: &SyntaxNode) -> Vec<SyntaxNode> {
    let mut found = Vec::new();
    let mut stack: Vec<SyntaxNode> = root.children().into_iter().rev().collect();

    while let Some(node) = stack.pop() {
        if node.text() == PLACEHOLDER {
            trace!(kind = %node.kind(), index = found.len(), "matched placeholder");
            found.push(node);
            continue;
        }
        stack.extend(node.children().into_iter().rev());
    }

    found
}

/// Pair each placeholder with its fragment, failing on any count difference.
pub(crate) fn match_placeholders(
    root: &SyntaxNode,
    template: &Template,
    fragments: Vec<Fragment>,
) -> Result<Vec<(SyntaxNode, Fragment)>, TemplateError> {
    let placeholders = collect_placeholders(root);
    if placeholders.len() != fragments.len() {
        return Err(TemplateError::ArityMismatch {
            template: template.text().to_string(),
            expected: fragments.len(),
            found: placeholders.len(),
        });
    }
    check_distinct(template, &fragments)?;
    Ok(placeholders.into_iter().zip(fragments).collect())
}

/// Every fragment must be a separate subtree: splicing moves nodes, so a
/// node passed twice (or inside another fragment) would be pulled out of
/// the slot it was first spliced into.
fn check_distinct(template: &Template, fragments: &[Fragment]) -> Result<(), TemplateError> {
    let mut seen: HashSet<SyntaxNode> = HashSet::new();
    for fragment in fragments {
        let node = fragment.node();
        if !seen.insert(node.clone()) {
            return Err(TemplateError::DuplicateFragment {
                template: template.text().to_string(),
                text: node.text(),
            });
        }
    }

    for fragment in fragments {
        let inner = fragment.node();
        let mut ancestor = inner.parent();
        while let Some(outer) = ancestor {
            if seen.contains(&outer) {
                return Err(TemplateError::NestedFragment {
                    template: template.text().to_string(),
                    inner: inner.text(),
                    outer: outer.text(),
                });
            }
            ancestor = outer.parent();
        }
    }
    Ok(())
}
