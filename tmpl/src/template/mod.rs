use std::ops::Range;

/// A parsed template: literal text runs and variable references, in render order.
///
/// Templates are immutable once built. Rendering only borrows them, so one
/// template can be shared across threads and rendered with any number of
/// variable maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
    source: String,
    /// The source file ID (for error reporting with codespan-reporting).
    source_id: usize,
}

/// An atomic unit of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the output verbatim. Never empty.
    Literal(String),
    /// A `{$name}` reference, resolved against the variable map at render time.
    Variable {
        name: String,
        /// Byte span of the whole `{$name}` tag in the source.
        span: Range<usize>,
    },
}

impl Segment {
    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }

    /// The variable name, if this segment is a reference.
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Segment::Variable { name, .. } => Some(name),
            Segment::Literal(_) => None,
        }
    }
}

impl Template {
    pub(crate) fn new(segments: Vec<Segment>, source: String, source_id: usize) -> Self {
        Template {
            segments,
            source,
            source_id,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The text this template was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the template contains no variable references, so every
    /// variable map renders it to the same text.
    pub fn is_static(&self) -> bool {
        self.segments.iter().all(Segment::is_literal)
    }

    /// Names of referenced variables in first-occurrence order, without duplicates.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.segments.iter().filter_map(Segment::variable_name) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}
