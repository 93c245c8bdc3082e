use syntax::{Parser, SyntaxNode};
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::TemplateError;
use crate::session::Session;
use crate::template::Template;

/// Alternate `segments` and `separators`, starting with a segment. When the
/// lengths differ, the leftovers of the longer side are appended in order.
pub(crate) fn interleave(segments: &[String], separators: &[String]) -> String {
    let steps = segments.len().max(separators.len());
    let mut out = String::new();
    for i in 0..steps {
        if let Some(segment) = segments.get(i) {
            out.push_str(segment);
        }
        if let Some(separator) = separators.get(i) {
            out.push_str(separator);
        }
    }
    out
}

/// Compose the template source and parse it into a fresh tree.
pub(crate) fn compile(
    session: &Session,
    template: &Template,
    separators: &[String],
    context: &Context,
) -> Result<SyntaxNode, TemplateError> {
    if template.slots() != separators.len() {
        warn!(
            template = %template,
            slots = template.slots(),
            arguments = separators.len(),
            "template slot count differs from argument count"
        );
    }

    let mut segments = template.segments().to_vec();
    if let Some(first) = segments.first_mut() {
        *first = context.wrap(first);
    }
    let source = interleave(&segments, separators);
    debug!(session = session.name(), context = context.name(), %source, "compiled template");

    Parser::new(source.clone(), session.file_id())
        .parse()
        .map_err(|error| TemplateError::Parse {
            source_text: source,
            error,
        })
}
