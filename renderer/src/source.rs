use std::path::PathBuf;

/// Where template text comes from. The caller decides; the text itself is
/// never inspected to guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Template text held in memory.
    Inline(String),
    /// A template file, resolved against the engine's base directory when relative.
    File(PathBuf),
}

impl TemplateSource {
    pub fn inline(text: impl Into<String>) -> Self {
        TemplateSource::Inline(text.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        TemplateSource::File(path.into())
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            TemplateSource::Inline(_) => "<inline>".to_string(),
            TemplateSource::File(path) => path.display().to_string(),
        }
    }
}
