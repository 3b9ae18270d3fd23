use crate::template::Segment;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split template source into literal runs and variable references.
///
/// Scanning cannot fail. Anything that is not a complete `{$name}` tag,
/// including a malformed one, is literal text, so the literals concatenate
/// back to the source minus its variable tags.
pub fn scan(source: &str) -> Vec<Segment> {
    let mut state = ScanState::new(source);
    state.run();
    state.finalize()
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

struct ScanState<'a> {
    source: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
    /// Literal text accumulated since the last variable reference.
    pending: String,
    segments: Vec<Segment>,
}

impl<'a> ScanState<'a> {
    fn new(source: &'a str) -> Self {
        ScanState {
            source,
            pos: 0,
            pending: String::new(),
            segments: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.pos < self.source.len() {
            let rest = &self.source[self.pos..];
            match rest.find('{') {
                Some(offset) => {
                    self.pending.push_str(&rest[..offset]);
                    self.pos += offset;
                    self.scan_tag();
                }
                None => {
                    self.pending.push_str(rest);
                    self.pos = self.source.len();
                }
            }
        }
    }

    /// Handle the tag at `self.pos`, which points at a `{`.
    fn scan_tag(&mut self) {
        let start = self.pos;
        let rest = &self.source[start..];

        match variable_tag_len(rest) {
            Some(len) => {
                let name = &rest[2..len - 1];
                self.flush_literal();
                self.segments.push(Segment::Variable {
                    name: name.to_string(),
                    span: start..start + len,
                });
                self.pos += len;
            }
            None => {
                // Not a variable tag: the brace is plain text.
                self.pending.push('{');
                self.pos += 1;
            }
        }
    }

    fn flush_literal(&mut self) {
        if !self.pending.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.segments.push(Segment::Literal(text));
        }
    }

    fn finalize(mut self) -> Vec<Segment> {
        self.flush_literal();
        self.segments
    }
}

// ---------------------------------------------------------------------------
// Lexical helpers
// ---------------------------------------------------------------------------

/// Length of a complete `{$name}` tag at the start of `rest`, if there is one.
fn variable_tag_len(rest: &str) -> Option<usize> {
    let body = rest.strip_prefix("{$")?;
    let name_len = dotted_name_len(body.as_bytes())?;
    body[name_len..].starts_with('}').then_some(name_len + 3)
}

/// `ident ( "." ident )*`
fn dotted_name_len(bytes: &[u8]) -> Option<usize> {
    let mut len = ident_len(bytes)?;
    while bytes.get(len) == Some(&b'.') {
        len += 1 + ident_len(&bytes[len + 1..])?;
    }
    Some(len)
}

fn ident_len(bytes: &[u8]) -> Option<usize> {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    Some(
        bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
    )
}
