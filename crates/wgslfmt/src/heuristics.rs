//! Layout rules that go beyond the default per-node rendering: matrix
//! constructor row grouping and float-literal normalization.

use itertools::Itertools;
use wgslfmt_doc::{concat, hardline, indent, join, text, Doc};
use wgslfmt_syntax::syntax::{
    Declaration, Expression, FunctionCall, LiteralExpression, UnaryOperator,
};

use crate::printer::Printer;

/// Row layout for matrix constructors.
///
/// Applies when the callee is named `matNxM`, the argument count is exactly
/// `N*M`, and every argument is a numeric literal or a negated numeric
/// literal. The call is then always broken into `M` rows of `N` values, one
/// row per line, every row ending in a comma. Constructors failing the shape
/// test fall back to the generic width-sensitive argument list.
pub(crate) fn matrix_rows(printer: &Printer, call: &FunctionCall) -> Option<Doc> {
    let (columns, rows) = matrix_shape(&call.name)?;
    if call.arguments.len() != columns * rows {
        return None;
    }
    if !call.arguments.iter().all(is_literal_argument) {
        return None;
    }
    let mut parts = vec![text(&call.name)];
    if let Some(args) = &call.template_args {
        parts.push(printer.template_args(args));
    }
    parts.push(text("("));
    let mut body = Vec::new();
    for row in &call.arguments.iter().chunks(columns) {
        let values: Vec<Doc> = row.map(|argument| printer.expression(argument)).collect();
        body.push(hardline());
        body.push(join(text(", "), values));
        body.push(text(","));
    }
    parts.push(indent(concat(body)));
    parts.push(hardline());
    parts.push(text(")"));
    Some(concat(parts))
}

/// `matNxM` with N and M single digits in 2..=4. Returns (N, M).
fn matrix_shape(name: &str) -> Option<(usize, usize)> {
    let dims = name.strip_prefix("mat")?.as_bytes();
    if dims.len() != 3 || dims[1] != b'x' {
        return None;
    }
    let columns = (dims[0] as char).to_digit(10)? as usize;
    let rows = (dims[2] as char).to_digit(10)? as usize;
    if !(2..=4).contains(&columns) || !(2..=4).contains(&rows) {
        return None;
    }
    Some((columns, rows))
}

fn is_literal_argument(expression: &Expression) -> bool {
    match expression {
        Expression::Literal(literal) => literal.is_numeric(),
        Expression::Unary(unary) => {
            matches!(unary.operator, UnaryOperator::Negation)
                && matches!(&*unary.operand, Expression::Literal(literal) if literal.is_numeric())
        }
        _ => false,
    }
}

/// Append the missing `.0` to a float literal written without a decimal
/// point or exponent (`1f` renders as `1.0f`). Anything already carrying a
/// `.`, an exponent, or a hex prefix passes through verbatim.
pub(crate) fn normalize_float(source_text: &str) -> String {
    if source_text.starts_with("0x") || source_text.starts_with("0X") {
        return source_text.to_string();
    }
    if source_text.contains(['.', 'e', 'E']) {
        return source_text.to_string();
    }
    match source_text.strip_suffix(['f', 'h']) {
        Some(digits) => {
            let suffix = &source_text[digits.len()..];
            format!("{digits}.0{suffix}")
        }
        None => format!("{source_text}.0"),
    }
}

/// The one position where an integer token is known to be float-typed
/// without inference: the initializer of a declaration annotated `f32` or
/// `f16`. A plain unsuffixed decimal integer there renders with `.0`.
pub(crate) fn float_typed_initializer(declaration: &Declaration) -> Option<String> {
    let ty = declaration.ty.as_ref()?;
    if ty.template_args.is_some() || !matches!(ty.name.as_str(), "f32" | "f16") {
        return None;
    }
    let Some(Expression::Literal(LiteralExpression::Int(source_text))) =
        &declaration.initializer
    else {
        return None;
    };
    if source_text.is_empty() || !source_text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{source_text}.0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_shape_accepts_only_2_to_4() {
        assert_eq!(matrix_shape("mat4x4"), Some((4, 4)));
        assert_eq!(matrix_shape("mat2x3"), Some((2, 3)));
        assert_eq!(matrix_shape("mat5x4"), None);
        assert_eq!(matrix_shape("mat4x4f"), None);
        assert_eq!(matrix_shape("matrix"), None);
        assert_eq!(matrix_shape("vec3"), None);
    }

    #[test]
    fn float_normalization() {
        assert_eq!(normalize_float("1.5"), "1.5");
        assert_eq!(normalize_float("1e3"), "1e3");
        assert_eq!(normalize_float("1f"), "1.0f");
        assert_eq!(normalize_float("2h"), "2.0h");
        assert_eq!(normalize_float("0x1p2"), "0x1p2");
        assert_eq!(normalize_float(".5"), ".5");
    }
}
