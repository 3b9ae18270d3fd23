pub mod engine;
pub mod error;
pub mod render;
pub mod source;
pub mod value;
pub mod variables;

pub use engine::Engine;
pub use error::{LoadError, RenderWarning};
pub use render::{Interpolator, Renderer};
pub use source::TemplateSource;
pub use value::Value;
pub use variables::VariableMap;

/// Render with the default [`Interpolator`].
pub fn render(template: &tmpl::Template, vars: &VariableMap) -> String {
    Interpolator.render(template, vars)
}
