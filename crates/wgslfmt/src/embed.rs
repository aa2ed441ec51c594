//! Reformatting of WGSL snippets embedded in host-language source.
//!
//! Qualifying template literals (tagged `wgsl`, or any literal in a file
//! carrying a `wgsl` pragma comment) are parsed and formatted through the
//! regular pipeline, synchronously, and the rewrites are collected as a
//! patch list applied to the raw host text in one pass. Literals with
//! interpolation holes are left untouched: splicing formatted text around
//! host expressions is not well-defined.

use std::ops::Range;

use wgslfmt_doc::FormatOptions;

use crate::host;
use crate::printer::Printer;
use crate::Error;

/// A single text rewrite: replace `range` of the original source with
/// `replacement`. Patches never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Patch {
    pub range: Range<usize>,
    pub replacement: String,
}

pub(crate) fn apply_patches(source: &str, mut patches: Vec<Patch>) -> String {
    patches.sort_by_key(|patch| patch.range.start);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for patch in patches {
        out.push_str(&source[cursor..patch.range.start]);
        out.push_str(&patch.replacement);
        cursor = patch.range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

pub(crate) fn format_embedded(source: &str, options: &FormatOptions) -> Result<String, Error> {
    let scan = host::scan(source);
    let mut patches = Vec::new();
    for template in &scan.templates {
        if !(template.tagged || scan.has_pragma) {
            continue;
        }
        if template.has_interpolation {
            continue;
        }
        let snippet = &source[template.content.clone()];
        // a snippet that fails to parse aborts the whole file; the span is
        // rebased so diagnostics point into the host source
        let module = wgslfmt_syntax::parse(snippet)
            .map_err(|err| Error::Parse(err.offset(template.content.start)))?;
        let printer = Printer::new(snippet);
        let formatted = wgslfmt_doc::resolve(&printer.translation_unit(&module), options);
        patches.push(Patch {
            range: template.content.clone(),
            replacement: fit_snippet(source, template.content.start, &formatted, options),
        });
    }
    Ok(apply_patches(source, patches))
}

/// Lay the formatted snippet back into the literal: single-line output
/// replaces the content as-is; multi-line output is indented one level past
/// the line holding the opening backtick, with the closing backtick on its
/// own line.
fn fit_snippet(
    source: &str,
    content_start: usize,
    formatted: &str,
    options: &FormatOptions,
) -> String {
    let formatted = formatted.trim_end();
    if !formatted.contains('\n') {
        return formatted.to_string();
    }
    let host_indent = line_indent(source, content_start);
    let inner_indent = format!("{}{}", host_indent, " ".repeat(options.indent_width));
    let mut out = String::from("\n");
    for line in formatted.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&inner_indent);
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str(&host_indent);
    out
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(source: &str, offset: usize) -> String {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}
