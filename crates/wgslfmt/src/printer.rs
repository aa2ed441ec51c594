//! The node printer: one method per syntax-node family, each producing a
//! document fragment.
//!
//! The printer is a read-only pass over the tree. It keeps the original
//! source only so that constructs it does not model (`const_assert`) can be
//! re-emitted byte for byte from their recorded spans. Width decisions are
//! never made here; they are expressed with groups and resolved by
//! `wgslfmt_doc`.

use itertools::Itertools;
use wgslfmt_doc::{
    concat, group, hardline, if_break, indent, join, line, nil, softline, text, Doc,
};
use wgslfmt_syntax::span::{Span, Spanned};
use wgslfmt_syntax::syntax::*;

use crate::heuristics;

pub(crate) struct Printer<'s> {
    source: &'s str,
}

impl<'s> Printer<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Re-emit the exact original bytes of a node. The safety valve for any
    /// construct without a dedicated formatting rule.
    fn verbatim(&self, span: &Span) -> Doc {
        text(span.slice(self.source))
    }

    pub(crate) fn translation_unit(&self, module: &TranslationUnit) -> Doc {
        let mut blocks = Vec::new();
        if !module.global_directives.is_empty() {
            let directives = module
                .global_directives
                .iter()
                .map(|directive| self.global_directive(directive))
                .collect();
            blocks.push(join(hardline(), directives));
        }
        for declaration in &module.global_declarations {
            blocks.push(self.global_declaration(declaration));
        }
        if blocks.is_empty() {
            return nil();
        }
        concat(vec![
            join(concat(vec![hardline(), hardline()]), blocks),
            hardline(),
        ])
    }

    fn global_directive(&self, directive: &GlobalDirective) -> Doc {
        match directive {
            GlobalDirective::Diagnostic(diagnostic) => text(format!(
                "diagnostic({}, {});",
                diagnostic.severity, diagnostic.rule_name
            )),
            GlobalDirective::Enable(enable) => {
                text(format!("enable {};", enable.extensions.iter().format(", ")))
            }
            GlobalDirective::Requires(requires) => text(format!(
                "requires {};",
                requires.extensions.iter().format(", ")
            )),
        }
    }

    fn global_declaration(&self, declaration: &Spanned<GlobalDeclaration>) -> Doc {
        match &declaration.node {
            GlobalDeclaration::Void => text(";"),
            GlobalDeclaration::Declaration(d) => concat(vec![self.declaration(d), text(";")]),
            GlobalDeclaration::TypeAlias(alias) => {
                concat(vec![self.type_alias(alias), text(";")])
            }
            GlobalDeclaration::Struct(s) => self.struct_declaration(s),
            GlobalDeclaration::Function(function) => self.function(function),
            // not modeled by the printer: re-emit the original source bytes
            GlobalDeclaration::ConstAssert(_) => self.verbatim(&declaration.span),
        }
    }

    // ── declarations ────────────────────────────────────────────────────

    /// `var`/`let`/`const`/`override`, without the terminating `;` so the
    /// same rendering serves `for` headers.
    fn declaration(&self, declaration: &Declaration) -> Doc {
        let mut parts = Vec::new();
        for attribute in &declaration.attributes {
            parts.push(self.attribute(attribute));
            parts.push(hardline());
        }
        parts.push(text(declaration.kind.to_string()));
        if let Some(args) = &declaration.template_args {
            parts.push(self.template_args(args));
        }
        parts.push(text(" "));
        parts.push(text(&declaration.name));
        if let Some(ty) = &declaration.ty {
            parts.push(text(": "));
            parts.push(self.type_expression(ty));
        }
        if let Some(initializer) = &declaration.initializer {
            parts.push(text(" = "));
            match heuristics::float_typed_initializer(declaration) {
                Some(normalized) => parts.push(text(normalized)),
                None => parts.push(self.expression(initializer)),
            }
        }
        concat(parts)
    }

    fn type_alias(&self, alias: &TypeAlias) -> Doc {
        concat(vec![
            text("alias "),
            text(&alias.name),
            text(" = "),
            self.type_expression(&alias.ty),
        ])
    }

    fn struct_declaration(&self, s: &Struct) -> Doc {
        if s.members.is_empty() {
            return text(format!("struct {} {{}}", s.name));
        }
        let mut members = Vec::new();
        for member in &s.members {
            members.push(hardline());
            members.push(self.inline_attributes(&member.attributes));
            members.push(text(&member.name));
            members.push(text(": "));
            members.push(self.type_expression(&member.ty));
            // struct members always end in a comma, the last one included
            members.push(text(","));
        }
        concat(vec![
            text(format!("struct {} {{", s.name)),
            indent(concat(members)),
            hardline(),
            text("}"),
        ])
    }

    fn function(&self, function: &Function) -> Doc {
        let mut parts = Vec::new();
        for attribute in &function.attributes {
            parts.push(self.attribute(attribute));
            parts.push(hardline());
        }
        parts.push(text("fn "));
        parts.push(text(&function.name));
        parts.push(self.parameter_list(&function.parameters));
        if let Some(return_type) = &function.return_type {
            parts.push(text(" -> "));
            parts.push(self.inline_attributes(&function.return_attributes));
            parts.push(self.type_expression(return_type));
        }
        parts.push(text(" "));
        parts.push(self.compound_statement(&function.body));
        concat(parts)
    }

    /// Parameters on one line when they fit, otherwise one per line with a
    /// trailing comma. The width decision belongs to the group.
    fn parameter_list(&self, parameters: &[FormalParameter]) -> Doc {
        if parameters.is_empty() {
            return text("()");
        }
        let parameters = parameters
            .iter()
            .map(|parameter| {
                concat(vec![
                    self.inline_attributes(&parameter.attributes),
                    text(&parameter.name),
                    text(": "),
                    self.type_expression(&parameter.ty),
                ])
            })
            .collect();
        group(concat(vec![
            text("("),
            indent(concat(vec![
                softline(),
                join(concat(vec![text(","), line()]), parameters),
                if_break(text(","), nil()),
            ])),
            softline(),
            text(")"),
        ]))
    }

    // ── attributes ──────────────────────────────────────────────────────

    fn attribute(&self, attribute: &Attribute) -> Doc {
        let mut parts = vec![text(format!("@{}", attribute.name))];
        if let Some(arguments) = &attribute.arguments {
            let arguments = arguments
                .iter()
                .map(|argument| self.expression(argument))
                .collect();
            parts.push(text("("));
            parts.push(join(text(", "), arguments));
            parts.push(text(")"));
        }
        concat(parts)
    }

    /// Attributes in positions that keep them on the same line (parameters,
    /// struct members, return types), each followed by a space.
    fn inline_attributes(&self, attributes: &[Attribute]) -> Doc {
        let mut parts = Vec::new();
        for attribute in attributes {
            parts.push(self.attribute(attribute));
            parts.push(text(" "));
        }
        concat(parts)
    }

    // ── statements ──────────────────────────────────────────────────────

    fn compound_statement(&self, compound: &CompoundStatement) -> Doc {
        let mut parts = vec![self.inline_attributes(&compound.attributes)];
        if compound.statements.is_empty() {
            parts.push(text("{}"));
            return concat(parts);
        }
        let statements = compound
            .statements
            .iter()
            .map(|statement| self.statement(statement))
            .collect();
        parts.push(text("{"));
        parts.push(indent(concat(vec![
            hardline(),
            join(hardline(), statements),
        ])));
        parts.push(hardline());
        parts.push(text("}"));
        concat(parts)
    }

    fn statement(&self, statement: &Spanned<Statement>) -> Doc {
        match &statement.node {
            Statement::Void => text(";"),
            Statement::Compound(compound) => self.compound_statement(compound),
            Statement::Assignment(_)
            | Statement::Increment(_)
            | Statement::Decrement(_)
            | Statement::FunctionCall(_)
            | Statement::Declaration(_) => concat(vec![
                self.unterminated_statement(&statement.node),
                text(";"),
            ]),
            Statement::If(if_statement) => self.if_statement(if_statement),
            Statement::Switch(switch) => self.switch_statement(switch),
            Statement::Loop(loop_statement) => self.loop_statement(loop_statement),
            Statement::For(for_statement) => self.for_statement(for_statement),
            Statement::While(while_statement) => self.while_statement(while_statement),
            Statement::Break => text("break;"),
            Statement::Continue => text("continue;"),
            Statement::Return(None) => text("return;"),
            Statement::Return(Some(expression)) => concat(vec![
                text("return "),
                self.expression(expression),
                text(";"),
            ]),
            Statement::Discard => text("discard;"),
            // not modeled by the printer: re-emit the original source bytes
            Statement::ConstAssert(_) => self.verbatim(&statement.span),
        }
    }

    /// The statement forms legal in `for` headers, without the trailing `;`:
    /// the header supplies its own separators.
    fn unterminated_statement(&self, statement: &Statement) -> Doc {
        match statement {
            Statement::Assignment(assignment) => concat(vec![
                self.expression(&assignment.lhs),
                text(format!(" {} ", assignment.operator)),
                self.expression(&assignment.rhs),
            ]),
            Statement::Increment(expression) => {
                concat(vec![self.expression(expression), text("++")])
            }
            Statement::Decrement(expression) => {
                concat(vec![self.expression(expression), text("--")])
            }
            Statement::FunctionCall(call) => self.call(call),
            Statement::Declaration(declaration) => self.declaration(declaration),
            _ => unreachable!("not a simple statement"),
        }
    }

    fn if_statement(&self, if_statement: &IfStatement) -> Doc {
        let mut parts = Vec::new();
        for attribute in &if_statement.attributes {
            parts.push(self.attribute(attribute));
            parts.push(hardline());
        }
        parts.push(text("if ("));
        parts.push(self.condition(&if_statement.if_clause.expression));
        parts.push(text(") "));
        parts.push(self.compound_statement(&if_statement.if_clause.body));
        for clause in &if_statement.else_if_clauses {
            parts.push(text(" else if ("));
            parts.push(self.condition(&clause.expression));
            parts.push(text(") "));
            parts.push(self.compound_statement(&clause.body));
        }
        if let Some(clause) = &if_statement.else_clause {
            parts.push(text(" else "));
            parts.push(self.compound_statement(&clause.body));
        }
        concat(parts)
    }

    /// A control-flow condition. The header supplies the parentheses, so one
    /// redundant parenthesized layer from the source is dropped.
    fn condition(&self, expression: &Expression) -> Doc {
        match expression {
            Expression::Parenthesized(parenthesized) => {
                self.expression(&parenthesized.expression)
            }
            other => self.expression(other),
        }
    }

    fn switch_statement(&self, switch: &SwitchStatement) -> Doc {
        let mut parts = Vec::new();
        for attribute in &switch.attributes {
            parts.push(self.attribute(attribute));
            parts.push(hardline());
        }
        parts.push(text("switch ("));
        parts.push(self.condition(&switch.expression));
        parts.push(text(") "));
        parts.push(self.inline_attributes(&switch.body_attributes));
        if switch.clauses.is_empty() {
            parts.push(text("{}"));
            return concat(parts);
        }
        let clauses = switch
            .clauses
            .iter()
            .map(|clause| self.switch_clause(clause))
            .collect();
        parts.push(text("{"));
        parts.push(indent(concat(vec![hardline(), join(hardline(), clauses)])));
        parts.push(hardline());
        parts.push(text("}"));
        concat(parts)
    }

    fn switch_clause(&self, clause: &SwitchClause) -> Doc {
        let header = if clause.case_selectors == [CaseSelector::Default] {
            text("default: ")
        } else {
            let selectors = clause
                .case_selectors
                .iter()
                .map(|selector| match selector {
                    CaseSelector::Default => text("default"),
                    CaseSelector::Expression(expression) => self.expression(expression),
                })
                .collect();
            concat(vec![text("case "), join(text(", "), selectors), text(": ")])
        };
        concat(vec![header, self.compound_statement(&clause.body)])
    }

    fn loop_statement(&self, loop_statement: &LoopStatement) -> Doc {
        let mut parts = Vec::new();
        for attribute in &loop_statement.attributes {
            parts.push(self.attribute(attribute));
            parts.push(hardline());
        }
        parts.push(text("loop "));
        parts.push(self.inline_attributes(&loop_statement.body.attributes));
        let mut inner: Vec<Doc> = loop_statement
            .body
            .statements
            .iter()
            .map(|statement| self.statement(statement))
            .collect();
        if let Some(continuing) = &loop_statement.continuing {
            inner.push(self.continuing_statement(continuing));
        }
        if inner.is_empty() {
            parts.push(text("{}"));
            return concat(parts);
        }
        parts.push(text("{"));
        parts.push(indent(concat(vec![hardline(), join(hardline(), inner)])));
        parts.push(hardline());
        parts.push(text("}"));
        concat(parts)
    }

    fn continuing_statement(&self, continuing: &ContinuingStatement) -> Doc {
        let mut inner: Vec<Doc> = continuing
            .body
            .statements
            .iter()
            .map(|statement| self.statement(statement))
            .collect();
        if let Some(expression) = &continuing.break_if {
            inner.push(concat(vec![
                text("break if "),
                self.expression(expression),
                text(";"),
            ]));
        }
        if inner.is_empty() {
            return text("continuing {}");
        }
        concat(vec![
            text("continuing {"),
            indent(concat(vec![hardline(), join(hardline(), inner)])),
            hardline(),
            text("}"),
        ])
    }

    fn for_statement(&self, for_statement: &ForStatement) -> Doc {
        let mut parts = Vec::new();
        for attribute in &for_statement.attributes {
            parts.push(self.attribute(attribute));
            parts.push(hardline());
        }
        parts.push(text("for ("));
        if let Some(initializer) = &for_statement.initializer {
            parts.push(self.unterminated_statement(initializer));
        }
        parts.push(text(";"));
        if let Some(condition) = &for_statement.condition {
            parts.push(text(" "));
            parts.push(self.expression(condition));
        }
        parts.push(text(";"));
        if let Some(update) = &for_statement.update {
            parts.push(text(" "));
            parts.push(self.unterminated_statement(update));
        }
        parts.push(text(") "));
        parts.push(self.compound_statement(&for_statement.body));
        concat(parts)
    }

    fn while_statement(&self, while_statement: &WhileStatement) -> Doc {
        let mut parts = Vec::new();
        for attribute in &while_statement.attributes {
            parts.push(self.attribute(attribute));
            parts.push(hardline());
        }
        parts.push(text("while ("));
        parts.push(self.condition(&while_statement.condition));
        parts.push(text(") "));
        parts.push(self.compound_statement(&while_statement.body));
        concat(parts)
    }

    // ── expressions ─────────────────────────────────────────────────────

    /// Parenthesization-free reconstruction: precedence comes from the
    /// tree's nesting, parentheses only from `Parenthesized` nodes.
    pub(crate) fn expression(&self, expression: &Expression) -> Doc {
        match expression {
            Expression::Literal(literal) => self.literal(literal),
            Expression::Parenthesized(parenthesized) => concat(vec![
                text("("),
                self.expression(&parenthesized.expression),
                text(")"),
            ]),
            Expression::NamedComponent(access) => concat(vec![
                self.expression(&access.base),
                text(format!(".{}", access.component)),
            ]),
            Expression::Indexing(indexing) => concat(vec![
                self.expression(&indexing.base),
                text("["),
                self.expression(&indexing.index),
                text("]"),
            ]),
            Expression::Unary(unary) => concat(vec![
                text(unary.operator.to_string()),
                self.expression(&unary.operand),
            ]),
            Expression::Binary(binary) => concat(vec![
                self.expression(&binary.left),
                text(format!(" {} ", binary.operator)),
                self.expression(&binary.right),
            ]),
            Expression::FunctionCall(call) => self.call(call),
            Expression::Identifier(identifier) => text(&identifier.name),
            Expression::Type(ty) => self.type_expression(ty),
        }
    }

    fn literal(&self, literal: &LiteralExpression) -> Doc {
        match literal {
            LiteralExpression::Bool(true) => text("true"),
            LiteralExpression::Bool(false) => text("false"),
            LiteralExpression::Int(source_text) => text(source_text),
            LiteralExpression::Float(source_text) => {
                text(heuristics::normalize_float(source_text))
            }
        }
    }

    fn call(&self, call: &FunctionCall) -> Doc {
        // matrix constructors made of literals get row layout, regardless
        // of width
        if let Some(doc) = heuristics::matrix_rows(self, call) {
            return doc;
        }
        let mut parts = vec![text(&call.name)];
        if let Some(args) = &call.template_args {
            parts.push(self.template_args(args));
        }
        if call.arguments.is_empty() {
            parts.push(text("()"));
            return concat(parts);
        }
        let arguments = call
            .arguments
            .iter()
            .map(|argument| self.expression(argument))
            .collect();
        parts.push(group(concat(vec![
            text("("),
            indent(concat(vec![
                softline(),
                join(concat(vec![text(","), line()]), arguments),
                if_break(text(","), nil()),
            ])),
            softline(),
            text(")"),
        ])));
        concat(parts)
    }

    pub(crate) fn template_args(&self, args: &[Expression]) -> Doc {
        let args = args
            .iter()
            .map(|argument| self.expression(argument))
            .collect();
        concat(vec![text("<"), join(text(", "), args), text(">")])
    }

    fn type_expression(&self, ty: &TypeExpression) -> Doc {
        let mut parts = vec![text(&ty.name)];
        if let Some(args) = &ty.template_args {
            parts.push(self.template_args(args));
        }
        concat(parts)
    }
}
