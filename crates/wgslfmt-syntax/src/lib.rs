//! A parser for WGSL files, written against the [specification].
//!
//! # Parsing a source file
//!
//! ```rust
//! let source = "@fragment fn frag_main() -> @location(0) vec4f { return vec4(1); }";
//! let module = wgslfmt_syntax::parse(source).unwrap();
//! println!("{module:?}");
//! ```
//!
//! The tree keeps the verbatim spelling of numeric literals and the outer
//! byte spans of declarations and statements, so a consumer can re-emit any
//! construct exactly as written.
//!
//! [specification]: https://www.w3.org/TR/WGSL/

pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod syntax;

pub use error::{ParseError, ParseErrorKind};
pub use parser::parse;
