mod scanner;

use crate::template::Template;

/// Parser entry point.
///
/// Grammar, scanned left to right:
///
/// - `{$name}` is a variable reference. `name` is one or more identifiers
///   (`[A-Za-z_][A-Za-z0-9_]*`) joined by `.`, with no whitespace.
/// - Every other character is literal text, including a `{` or `{$` that
///   does not start a complete reference, and every `}`.
///
/// There are no structural errors, so parsing is total and text without
/// variable references parses to a single literal.
pub struct Parser {
    source: String,
    file_id: usize,
}

impl Parser {
    pub fn new(source: impl Into<String>, file_id: usize) -> Self {
        Parser {
            source: source.into(),
            file_id,
        }
    }

    pub fn parse(&self) -> Template {
        let segments = scanner::scan(&self.source);
        Template::new(segments, self.source.clone(), self.file_id)
    }
}
