//! A canonical formatter for WGSL source.
//!
//! # Formatting a wgsl file
//!
//! ```rust
//! use wgslfmt::{format_str, FormatOptions};
//!
//! let formatted = format_str("fn add(a:f32,b:f32)->f32{return a+b;}", &FormatOptions::default())
//!     .unwrap();
//! assert_eq!(formatted, "fn add(a: f32, b: f32) -> f32 {\n  return a + b;\n}\n");
//! ```
//!
//! # Formatting embedded snippets
//!
//! [`format_embedded`] rewrites WGSL found in js/ts template literals, in
//! place, leaving the surrounding host source untouched. A literal
//! qualifies when it is tagged with the bare identifier `wgsl`, or when any
//! comment in the file trims to exactly `wgsl` (a file-scoped pragma).
//!
//! ```rust
//! use wgslfmt::{format_embedded, FormatOptions};
//!
//! let host = "const shader = wgsl`var x:f32=1.0;`;";
//! let formatted = format_embedded(host, &FormatOptions::default()).unwrap();
//! assert_eq!(formatted, "const shader = wgsl`var x: f32 = 1.0;`;");
//! ```

mod embed;
mod heuristics;
mod host;
mod printer;

pub use wgslfmt_doc::FormatOptions;
pub use wgslfmt_syntax::{ParseError, ParseErrorKind};

use printer::Printer;

#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl Error {
    /// Render the error as an annotated snippet of the file it came from.
    pub fn render_on(&self, source: &str) -> String {
        match self {
            Error::Parse(error) => error.render_on(source),
        }
    }
}

/// Format a WGSL source file.
pub fn format_str(source: &str, options: &FormatOptions) -> Result<String, Error> {
    let module = wgslfmt_syntax::parse(source)?;
    let printer = Printer::new(source);
    Ok(wgslfmt_doc::resolve(
        &printer.translation_unit(&module),
        options,
    ))
}

/// Reformat every qualifying WGSL snippet embedded in js/ts source,
/// returning the host text with the snippets rewritten in place.
pub fn format_embedded(source: &str, options: &FormatOptions) -> Result<String, Error> {
    embed::format_embedded(source, options)
}
