use std::fmt;

use tmpl::{Segment, Template};
use tracing::trace;

use crate::error::RenderWarning;
use crate::variables::VariableMap;

/// Turns a parsed Template plus bindings into text.
///
/// Rendering is total: any template renders against any variable map,
/// including an empty one. Implementations must not mutate shared state, so
/// the same template and bindings always produce the same output.
pub trait Renderer {
    /// Write the rendered template into `out`.
    ///
    /// Implementations must return `Err` only when `out` itself fails.
    /// [`render`](Renderer::render) writes into a `String`, which never
    /// fails, so an error there means the implementation broke this rule.
    fn render_to(
        &self,
        template: &Template,
        vars: &VariableMap,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result;

    fn render(&self, template: &Template, vars: &VariableMap) -> String {
        let mut output = String::with_capacity(template.source().len());
        let result = self.render_to(template, vars, &mut output);
        debug_assert!(
            result.is_ok(),
            "render_to failed while writing into a String"
        );
        output
    }

    /// Render, also reporting every reference that had no binding, in source order.
    fn render_with_warnings(
        &self,
        template: &Template,
        vars: &VariableMap,
    ) -> (String, Vec<RenderWarning>) {
        (self.render(template, vars), missing_variables(template, vars))
    }
}

/// Literal text verbatim, variables by their `Display` form, missing
/// variables as the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interpolator;

impl Renderer for Interpolator {
    fn render_to(
        &self,
        template: &Template,
        vars: &VariableMap,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result {
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => out.write_str(text)?,
                Segment::Variable { name, .. } => match vars.get(name) {
                    Some(value) => write!(out, "{}", value)?,
                    None => trace!(variable = %name, "undefined variable rendered as empty string"),
                },
            }
        }
        Ok(())
    }
}

fn missing_variables(template: &Template, vars: &VariableMap) -> Vec<RenderWarning> {
    template
        .segments()
        .iter()
        .filter_map(|segment| match segment {
            Segment::Variable { name, span } if !vars.contains(name) => {
                Some(RenderWarning::MissingVariable {
                    name: name.clone(),
                    span: span.clone(),
                    source_id: template.source_id(),
                })
            }
            _ => None,
        })
        .collect()
}
