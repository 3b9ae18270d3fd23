use std::path::{Path, PathBuf};

use tmpl::{Parser, Template};
use tracing::debug;

use crate::error::LoadError;
use crate::render::{Interpolator, Renderer};
use crate::source::TemplateSource;
use crate::variables::VariableMap;

/// Loads templates from a [`TemplateSource`] and renders them.
///
/// The renderer is fixed by the type parameter, so the implementation is
/// chosen at compile time.
#[derive(Debug, Clone)]
pub struct Engine<R = Interpolator> {
    /// Base directory for resolving relative template paths.
    base_dir: PathBuf,
    renderer: R,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            base_dir: PathBuf::from("."),
            renderer: Interpolator,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl<R: Renderer> Engine<R> {
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_renderer<S: Renderer>(self, renderer: S) -> Engine<S> {
        Engine {
            base_dir: self.base_dir,
            renderer,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Read the raw template text without parsing it.
    pub fn read_source(&self, source: &TemplateSource) -> Result<String, LoadError> {
        match source {
            TemplateSource::Inline(text) => Ok(text.clone()),
            TemplateSource::File(path) => {
                let resolved = self.resolve_path(path);
                debug!(path = %resolved.display(), "reading template file");
                std::fs::read_to_string(&resolved).map_err(|source| LoadError::Io {
                    path: resolved,
                    source,
                })
            }
        }
    }

    pub fn load(&self, source: &TemplateSource) -> Result<Template, LoadError> {
        self.load_with_id(source, 0)
    }

    /// Load with a codespan file id, so diagnostics point into the caller's file database.
    pub fn load_with_id(
        &self,
        source: &TemplateSource,
        file_id: usize,
    ) -> Result<Template, LoadError> {
        let text = self.read_source(source)?;
        Ok(Parser::new(text, file_id).parse())
    }

    pub fn render(&self, template: &Template, vars: &VariableMap) -> String {
        self.renderer.render(template, vars)
    }

    /// Load `source` and render it in one step.
    pub fn fetch(&self, source: &TemplateSource, vars: &VariableMap) -> Result<String, LoadError> {
        let template = self.load(source)?;
        Ok(self.render(&template, vars))
    }
}
