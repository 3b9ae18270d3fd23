pub mod parser;
pub mod template;

pub use parser::Parser;
pub use template::{Segment, Template};

/// Parse template source that is not registered with a codespan file database.
/// Diagnostics produced from the result refer to file id 0.
pub fn parse(source: impl Into<String>) -> Template {
    Parser::new(source, 0).parse()
}
