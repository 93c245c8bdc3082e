use std::fmt;

/// Literal text segments with one argument slot between each pair.
///
/// A template with N segments has N - 1 slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// The text the template was written as, kept for diagnostics.
    text: String,
    segments: Vec<String>,
}

impl Template {
    /// Parse a format string: `%s` and `%d` mark slots, `%%` is a literal
    /// percent sign, and any other `%` is kept as-is.
    pub fn parse(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                current.push(c);
                continue;
            }
            match chars.peek() {
                Some('s') | Some('d') => {
                    chars.next();
                    segments.push(std::mem::take(&mut current));
                }
                Some('%') => {
                    chars.next();
                    current.push('%');
                }
                _ => current.push('%'),
            }
        }
        segments.push(current);

        Template {
            text: text.to_string(),
            segments,
        }
    }

    /// Build a template from explicit segments. No directive processing is
    /// applied, so the segments are taken literally.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            segments.push(String::new());
        }
        Template {
            text: segments.join("%s"),
            segments,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of argument slots.
    pub fn slots(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Template::parse(text)
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Template::parse(&text)
    }
}

impl From<&Template> for Template {
    fn from(template: &Template) -> Self {
        template.clone()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_directives() {
        let template = Template::parse("val %s = %d");
        assert_eq!(template.segments(), &["val ", " = ", ""]);
        assert_eq!(template.slots(), 2);
        assert_eq!(template.text(), "val %s = %d");
    }

    #[test]
    fn double_percent_is_a_literal() {
        let template = Template::parse("a %% b");
        assert_eq!(template.segments(), &["a % b"]);
        assert_eq!(template.slots(), 0);
    }

    #[test]
    fn other_percent_sequences_are_kept() {
        let template = Template::parse("a % b %");
        assert_eq!(template.segments(), &["a % b %"]);
    }

    #[test]
    fn from_segments_is_literal() {
        let template = Template::from_segments(["x %s ", ""]);
        assert_eq!(template.segments(), &["x %s ", ""]);
        assert_eq!(template.slots(), 1);
    }

    #[test]
    fn empty_segment_list_has_one_segment() {
        let template = Template::from_segments(Vec::<String>::new());
        assert_eq!(template.segments(), &[""]);
        assert_eq!(template.slots(), 0);
    }
}
