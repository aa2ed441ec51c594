//! The document tree and width-aware layout resolver for `wgslfmt`.
//!
//! The printer builds a [`Doc`] describing formatting intent (text, line
//! breaks, indentation scopes, width-sensitive groups) without committing to
//! a layout; [`resolve`] then decides at each [`Doc::Group`] boundary whether
//! to render flat or broken, based on the remaining line width.
//!
//! Construction and resolution are deliberately separated: everything
//! outside this crate only builds trees and never measures text.

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Doc {
    /// Produces no output.
    Nil,
    /// Literal text, emitted verbatim.
    Text(String),
    /// A space when flat, a line break when broken.
    Line,
    /// Nothing when flat, a line break when broken.
    Softline,
    /// A line break in every mode.
    Hardline,
    /// Raise the indentation level for the child.
    Indent(Box<Doc>),
    /// Render the child flat if it fits the remaining width, broken otherwise.
    Group(Box<Doc>),
    /// Emit `broken` or `flat` depending on the enclosing group's mode.
    IfBreak { broken: Box<Doc>, flat: Box<Doc> },
    /// A sequence of nodes rendered in order.
    Concat(Vec<Doc>),
}

// ── builders ────────────────────────────────────────────────────────────

pub fn nil() -> Doc {
    Doc::Nil
}

pub fn text(s: impl Into<String>) -> Doc {
    Doc::Text(s.into())
}

pub fn line() -> Doc {
    Doc::Line
}

pub fn softline() -> Doc {
    Doc::Softline
}

pub fn hardline() -> Doc {
    Doc::Hardline
}

pub fn indent(doc: Doc) -> Doc {
    Doc::Indent(Box::new(doc))
}

pub fn group(doc: Doc) -> Doc {
    Doc::Group(Box::new(doc))
}

pub fn if_break(broken: Doc, flat: Doc) -> Doc {
    Doc::IfBreak {
        broken: Box::new(broken),
        flat: Box::new(flat),
    }
}

pub fn concat(parts: Vec<Doc>) -> Doc {
    Doc::Concat(parts)
}

/// Interleave `separator` between `parts`.
pub fn join(separator: Doc, parts: Vec<Doc>) -> Doc {
    let mut out = Vec::with_capacity(parts.len() * 2);
    for part in parts {
        if !out.is_empty() {
            out.push(separator.clone());
        }
        out.push(part);
    }
    Doc::Concat(out)
}

/// Layout options, shared by the resolver and everything that formats.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Target line width before groups break.
    pub print_width: usize,
    /// Number of spaces per indentation level.
    pub indent_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            indent_width: 2,
        }
    }
}

/// Whether the current scope renders flat or broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Broken,
}

struct Command<'a> {
    indent: usize,
    mode: Mode,
    doc: &'a Doc,
}

/// Render a document, deciding group layout against `options.print_width`.
pub fn resolve(doc: &Doc, options: &FormatOptions) -> String {
    let mut out = String::new();
    let mut column = 0usize;
    let mut stack = vec![Command {
        indent: 0,
        mode: Mode::Broken,
        doc,
    }];

    while let Some(command) = stack.pop() {
        match command.doc {
            Doc::Nil => {}
            Doc::Text(s) => {
                out.push_str(s);
                column += s.chars().count();
            }
            Doc::Line => match command.mode {
                Mode::Flat => {
                    out.push(' ');
                    column += 1;
                }
                Mode::Broken => {
                    push_break(&mut out, command.indent);
                    column = command.indent;
                }
            },
            Doc::Softline => match command.mode {
                Mode::Flat => {}
                Mode::Broken => {
                    push_break(&mut out, command.indent);
                    column = command.indent;
                }
            },
            Doc::Hardline => {
                push_break(&mut out, command.indent);
                column = command.indent;
            }
            Doc::Indent(child) => {
                stack.push(Command {
                    indent: command.indent + options.indent_width,
                    mode: command.mode,
                    doc: child,
                });
            }
            Doc::Group(child) => {
                let mode = match flat_width(child) {
                    Some(width) if column + width <= options.print_width => Mode::Flat,
                    _ => Mode::Broken,
                };
                stack.push(Command {
                    indent: command.indent,
                    mode,
                    doc: child,
                });
            }
            Doc::IfBreak { broken, flat } => {
                let doc = match command.mode {
                    Mode::Flat => flat,
                    Mode::Broken => broken,
                };
                stack.push(Command {
                    indent: command.indent,
                    mode: command.mode,
                    doc,
                });
            }
            Doc::Concat(parts) => {
                for part in parts.iter().rev() {
                    stack.push(Command {
                        indent: command.indent,
                        mode: command.mode,
                        doc: part,
                    });
                }
            }
        }
    }

    out
}

fn push_break(out: &mut String, indent: usize) {
    // rewriting the break start keeps lines ending in a softline free of
    // trailing spaces
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
    for _ in 0..indent {
        out.push(' ');
    }
}

/// Width of `doc` rendered flat, or `None` when it contains a hard break and
/// can never fit on one line.
fn flat_width(doc: &Doc) -> Option<usize> {
    match doc {
        Doc::Nil => Some(0),
        Doc::Text(s) => Some(s.chars().count()),
        Doc::Line => Some(1),
        Doc::Softline => Some(0),
        Doc::Hardline => None,
        Doc::Indent(child) => flat_width(child),
        Doc::Group(child) => flat_width(child),
        Doc::IfBreak { flat, .. } => flat_width(flat),
        Doc::Concat(parts) => {
            let mut total = 0usize;
            for part in parts {
                total += flat_width(part)?;
            }
            Some(total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fits() -> FormatOptions {
        FormatOptions::default()
    }

    fn narrow(width: usize) -> FormatOptions {
        FormatOptions {
            print_width: width,
            indent_width: 2,
        }
    }

    #[test]
    fn group_renders_flat_when_it_fits() {
        let doc = group(concat(vec![text("a"), line(), text("b")]));
        assert_eq!(resolve(&doc, &fits()), "a b");
    }

    #[test]
    fn group_breaks_when_too_wide() {
        let doc = group(concat(vec![
            text("hello"),
            line(),
            text("beautiful"),
            line(),
            text("world"),
        ]));
        assert_eq!(resolve(&doc, &narrow(10)), "hello\nbeautiful\nworld");
    }

    #[test]
    fn hardline_always_breaks() {
        let doc = concat(vec![text("a"), hardline(), text("b")]);
        assert_eq!(resolve(&doc, &fits()), "a\nb");
    }

    #[test]
    fn indent_applies_to_breaks() {
        let doc = concat(vec![
            text("fn f() {"),
            indent(concat(vec![hardline(), text("body;")])),
            hardline(),
            text("}"),
        ]);
        assert_eq!(resolve(&doc, &fits()), "fn f() {\n  body;\n}");
    }

    #[test]
    fn nested_indent_accumulates() {
        let doc = concat(vec![
            text("a"),
            indent(concat(vec![
                hardline(),
                text("b"),
                indent(concat(vec![hardline(), text("c")])),
            ])),
            hardline(),
            text("d"),
        ]);
        assert_eq!(resolve(&doc, &fits()), "a\n  b\n    c\nd");
    }

    #[test]
    fn softline_vanishes_when_flat() {
        let doc = group(concat(vec![
            text("("),
            indent(concat(vec![softline(), text("x")])),
            softline(),
            text(")"),
        ]));
        assert_eq!(resolve(&doc, &fits()), "(x)");
    }

    #[test]
    fn if_break_selects_by_mode() {
        let trailing = |inner: Doc| {
            group(concat(vec![
                text("f("),
                indent(concat(vec![softline(), inner, if_break(text(","), nil())])),
                softline(),
                text(")"),
            ]))
        };
        let doc = trailing(text("x"));
        assert_eq!(resolve(&doc, &fits()), "f(x)");
        let doc = trailing(join(
            concat(vec![text(","), line()]),
            vec![text("first_argument"), text("second_argument")],
        ));
        assert_eq!(
            resolve(&doc, &narrow(20)),
            "f(\n  first_argument,\n  second_argument,\n)"
        );
    }

    #[test]
    fn join_interleaves_separators() {
        let doc = join(text(", "), vec![text("a"), text("b"), text("c")]);
        assert_eq!(resolve(&doc, &fits()), "a, b, c");
    }

    #[test]
    fn group_containing_hardline_cannot_flatten() {
        let doc = group(concat(vec![text("a"), hardline(), text("b")]));
        assert_eq!(resolve(&doc, &fits()), "a\nb");
    }

    #[test]
    fn no_trailing_whitespace_on_broken_lines() {
        let doc = group(concat(vec![
            text("a "),
            indent(concat(vec![softline(), text("bbbbbbbb")])),
        ]));
        let rendered = resolve(&doc, &narrow(5));
        for line in rendered.lines() {
            assert!(!line.ends_with(' '), "trailing space in {rendered:?}");
        }
    }
}
