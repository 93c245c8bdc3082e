//! Build syntax trees from templates.
//!
//! A template is source text with slots. Literal arguments are written into
//! the text and parsed with it; fragment arguments (already-built nodes) are
//! represented by a placeholder identifier while parsing and spliced in
//! afterwards, so they are never re-parsed.
//!
//! ```ignore
//! let session = Session::default();
//! let value = quasi::render(&session, "a + 1", &[], &Context::EXPRESSION)?;
//! let args = ["x".into(), value.into()];
//! let decl = quasi::render(&session, "val %s = %s", &args, &Context::STATEMENT)?;
//! assert_eq!(decl.text(), "val x = a + 1");
//! ```

pub mod argument;
mod compile;
pub mod context;
pub mod error;
mod matcher;
pub mod session;
mod splice;
pub mod template;

pub use argument::{Argument, DEFAULT_SEPARATOR};
pub use context::Context;
pub use error::TemplateError;
pub use matcher::PLACEHOLDER;
pub use session::Session;
pub use syntax::{SyntaxKind, SyntaxNode};
pub use template::Template;

use tracing::debug;

/// Render `template` with `args` in the given context.
///
/// The result is a root node (it has no parent). Fragments passed in `args`
/// are moved into the result tree. On error the fragments are untouched.
pub fn render(
    session: &Session,
    template: impl Into<Template>,
    args: &[Argument],
    context: &Context,
) -> Result<SyntaxNode, TemplateError> {
    let template = template.into();
    let normalized = argument::normalize(args);
    matcher::check_collisions(&template, args)?;

    let root = compile::compile(session, &template, &normalized.separators, context)?;
    let pairs = matcher::match_placeholders(&root, &template, normalized.fragments)?;

    // Select before splicing so a failed selection leaves every fragment
    // where the caller had it.
    let primary = splice::primary_child(&root).ok_or_else(|| TemplateError::Empty {
        template: template.text().to_string(),
    })?;
    let selection_error = || TemplateError::Selection {
        context: context.name(),
        source_text: root.text(),
    };
    let selected = context.select(&primary).ok_or_else(selection_error)?;
    let inside_placeholder = std::iter::successors(selected.parent(), SyntaxNode::parent)
        .any(|ancestor| pairs.iter().any(|(placeholder, _)| *placeholder == ancestor));
    if inside_placeholder {
        return Err(selection_error());
    }

    let replaced = splice::splice(pairs);
    let selected = splice::resolve(selected, &replaced);
    selected.detach();
    debug!(kind = %selected.kind(), text = %selected, "rendered template");
    Ok(selected)
}

/// Parse `code` literally (no slots) in the given context.
pub fn fragment(
    session: &Session,
    code: &str,
    context: &Context,
) -> Result<SyntaxNode, TemplateError> {
    render(session, Template::from_segments([code]), &[], context)
}
