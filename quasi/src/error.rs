use codespan_reporting::diagnostic::Diagnostic;
use syntax::ParseError;
use thiserror::Error;

/// Reasons a template can fail to render. Every variant is raised before
/// the tree is modified.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("composed template source does not parse: {error}")]
    Parse {
        /// The full source handed to the parser.
        source_text: String,
        #[source]
        error: ParseError,
    },

    #[error(
        "template `{template}` has {found} placeholder(s) but {expected} fragment(s) were supplied"
    )]
    ArityMismatch {
        template: String,
        expected: usize,
        found: usize,
    },

    #[error("template `{template}` uses the reserved placeholder token in `{text}`")]
    PlaceholderCollision { template: String, text: String },

    #[error("fragment `{text}` is passed to template `{template}` more than once")]
    DuplicateFragment { template: String, text: String },

    #[error("fragment `{inner}` is part of fragment `{outer}` passed to template `{template}`")]
    NestedFragment {
        template: String,
        inner: String,
        outer: String,
    },

    #[error("{context} context found no node in `{source_text}`")]
    Selection {
        context: &'static str,
        source_text: String,
    },

    #[error("template `{template}` produced no syntax")]
    Empty { template: String },
}

impl TemplateError {
    /// Convert to a codespan-reporting Diagnostic for display. Only `Parse`
    /// carries a label; it points into `source_text` under the parser's file id.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        match self {
            TemplateError::Parse { error, .. } => error
                .to_diagnostic()
                .with_message(format!("template does not parse: {}", error.message)),
            other => Diagnostic::error().with_message(other.to_string()),
        }
    }
}
