use std::io;
use std::ops::Range;
use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use thiserror::Error;

/// Failure to turn a [`TemplateSource`](crate::TemplateSource) into a Template.
///
/// Parsing itself cannot fail, so the only failure is reading the source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read template '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A non-fatal finding from rendering. The output is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderWarning {
    #[error("undefined variable `{name}` rendered as empty string")]
    MissingVariable {
        name: String,
        span: Range<usize>,
        source_id: usize,
    },
}

impl RenderWarning {
    pub fn span(&self) -> &Range<usize> {
        match self {
            RenderWarning::MissingVariable { span, .. } => span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        match self {
            RenderWarning::MissingVariable {
                span, source_id, ..
            } => Diagnostic::warning()
                .with_message(self.to_string())
                .with_labels(vec![
                    Label::primary(*source_id, span.clone())
                        .with_message("no binding for this variable"),
                ]),
        }
    }
}
