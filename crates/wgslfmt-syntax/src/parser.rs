//! A recursive-descent parser over a token buffer.
//!
//! The parser owns the full token list so that it can speculate: a `<` after
//! an identifier is tried as a template list and rolled back to a comparison
//! when that fails. Closing `>` tokens are consumed one character at a time,
//! so `array<vec2<f32>>` splits the `>>` token and `vec3<f32>=x` splits the
//! `>=` token. Short-circuit, relational and shift operators are excluded
//! from top-level template arguments (they require parentheses there), which
//! keeps the speculation aligned with WGSL template-list discovery.

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{tokenize, Token};
use crate::span::{Span, Spanned};
use crate::syntax::*;

/// Parse a WGSL source file into a [`TranslationUnit`].
pub fn parse(source: &str) -> Result<TranslationUnit, ParseError> {
    Parser::new(source)?.translation_unit()
}

pub(crate) struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    /// Number of leading characters already consumed from the current token.
    /// Only ever non-zero on the `>`-family tokens, while closing templates.
    split_offset: usize,
    /// End offset of the last consumed token, for outer spans.
    prev_end: usize,
    eof: usize,
}

fn split_token(token: &Token, offset: usize) -> Token {
    match (token, offset) {
        (Token::SymShiftRight, 1) => Token::SymGreaterThan,
        (Token::SymGreaterThanEqual, 1) => Token::SymEqual,
        (Token::SymShiftRightAssign, 1) => Token::SymGreaterThanEqual,
        (Token::SymShiftRightAssign, 2) => Token::SymEqual,
        _ => unreachable!("token splitting only applies to `>`-family tokens"),
    }
}

fn binary_op(token: &Token) -> Option<(BinaryOperator, u8)> {
    use BinaryOperator as Op;
    Some(match token {
        Token::SymOrOr => (Op::ShortCircuitOr, 1),
        Token::SymAndAnd => (Op::ShortCircuitAnd, 2),
        Token::SymOr => (Op::BitwiseOr, 3),
        Token::SymXor => (Op::BitwiseXor, 4),
        Token::SymAnd => (Op::BitwiseAnd, 5),
        Token::SymEqualEqual => (Op::Equality, 6),
        Token::SymNotEqual => (Op::Inequality, 6),
        Token::SymLessThan => (Op::LessThan, 7),
        Token::SymGreaterThan => (Op::GreaterThan, 7),
        Token::SymLessThanEqual => (Op::LessThanEqual, 7),
        Token::SymGreaterThanEqual => (Op::GreaterThanEqual, 7),
        Token::SymShiftLeft => (Op::ShiftLeft, 8),
        Token::SymShiftRight => (Op::ShiftRight, 8),
        Token::SymPlus => (Op::Addition, 9),
        Token::SymMinus => (Op::Subtraction, 9),
        Token::SymStar => (Op::Multiplication, 10),
        Token::SymForwardSlash => (Op::Division, 10),
        Token::SymModulo => (Op::Remainder, 10),
        _ => return None,
    })
}

fn assignment_op(token: &Token) -> Option<AssignmentOperator> {
    use AssignmentOperator as Op;
    Some(match token {
        Token::SymEqual => Op::Equal,
        Token::SymPlusEqual => Op::PlusEqual,
        Token::SymMinusEqual => Op::MinusEqual,
        Token::SymTimesEqual => Op::TimesEqual,
        Token::SymDivisionEqual => Op::DivisionEqual,
        Token::SymModuloEqual => Op::ModuloEqual,
        Token::SymAndEqual => Op::AndEqual,
        Token::SymOrEqual => Op::OrEqual,
        Token::SymXorEqual => Op::XorEqual,
        Token::SymShiftRightAssign => Op::ShiftRightAssign,
        Token::SymShiftLeftAssign => Op::ShiftLeftAssign,
        _ => return None,
    })
}

impl Parser {
    fn new(source: &str) -> Result<Self, ParseError> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            split_offset: 0,
            prev_end: 0,
            eof: source.len(),
        })
    }

    // ── token cursor ────────────────────────────────────────────────────

    fn peek(&self) -> Option<Token> {
        let (token, _) = self.tokens.get(self.pos)?;
        if self.split_offset > 0 {
            Some(split_token(token, self.split_offset))
        } else {
            Some(token.clone())
        }
    }

    fn peek2(&self) -> Option<Token> {
        self.tokens.get(self.pos + 1).map(|(token, _)| token.clone())
    }

    fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => Span::new(span.start + self.split_offset, span.end),
            None => Span::new(self.eof, self.eof),
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let (token, span) = self.tokens.get(self.pos)?.clone();
        let (token, span) = if self.split_offset > 0 {
            (
                split_token(&token, self.split_offset),
                Span::new(span.start + self.split_offset, span.end),
            )
        } else {
            (token, span)
        };
        self.pos += 1;
        self.split_offset = 0;
        self.prev_end = span.end;
        Some((token, span))
    }

    fn at(&self, token: &Token) -> bool {
        self.peek().as_ref() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<Span, ParseError> {
        if self.at(token) {
            let span = self.peek_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseErrorKind::UnexpectedToken {
                found: token.to_string(),
                expected: expected.to_string(),
            }
            .at(self.peek_span()),
            None => ParseErrorKind::UnexpectedEof {
                expected: expected.to_string(),
            }
            .at(Span::new(self.eof, self.eof)),
        }
    }

    fn ident(&mut self) -> Result<String, ParseError> {
        if let Some(Token::Ident(name)) = self.peek() {
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    /// An identifier, also accepting keywords as plain words. Attribute and
    /// diagnostic-rule names may collide with keywords (`@diagnostic`,
    /// `@const`).
    fn word(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name)
            }
            Some(token) => match token.keyword_text() {
                Some(text) => {
                    self.advance();
                    Ok(text.to_string())
                }
                None => Err(self.unexpected("an identifier")),
            },
            None => Err(self.unexpected("an identifier")),
        }
    }

    fn comma_separated<T>(
        &mut self,
        end: &Token,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        while !self.at(end) {
            items.push(item(self)?);
            if !self.eat(&Token::SymComma) {
                break;
            }
        }
        Ok(items)
    }

    // ── template lists ──────────────────────────────────────────────────

    fn at_template_end(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::SymGreaterThan
                    | Token::SymShiftRight
                    | Token::SymGreaterThanEqual
                    | Token::SymShiftRightAssign
            )
        )
    }

    /// Consume a single closing `>`, splitting `>>`, `>=` and `>>=`.
    fn consume_template_end(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(Token::SymGreaterThan) => {
                self.advance();
                Ok(())
            }
            Some(
                Token::SymShiftRight | Token::SymGreaterThanEqual | Token::SymShiftRightAssign,
            ) => {
                self.split_offset += 1;
                self.prev_end = self.peek_span().start;
                Ok(())
            }
            _ => Err(self.unexpected("`>`")),
        }
    }

    fn template_list(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.expect(&Token::SymLessThan)?;
        let mut args = vec![self.template_arg()?];
        while self.eat(&Token::SymComma) {
            if self.at_template_end() {
                break;
            }
            args.push(self.template_arg()?);
        }
        self.consume_template_end()?;
        Ok(args)
    }

    fn template_arg(&mut self) -> Result<Expression, ParseError> {
        self.binary_expression(1, true)
    }

    /// Speculatively parse a template list after an identifier in expression
    /// position; roll the cursor back when it is a comparison instead.
    fn try_template_list(&mut self) -> Option<Vec<Expression>> {
        let snapshot = (self.pos, self.split_offset, self.prev_end);
        match self.template_list() {
            Ok(args) => Some(args),
            Err(_) => {
                (self.pos, self.split_offset, self.prev_end) = snapshot;
                None
            }
        }
    }

    // ── expressions ─────────────────────────────────────────────────────

    pub(crate) fn expression(&mut self) -> Result<Expression, ParseError> {
        self.binary_expression(1, false)
    }

    fn binary_expression(
        &mut self,
        min_level: u8,
        in_template: bool,
    ) -> Result<Expression, ParseError> {
        let mut lhs = self.unary_expression()?;
        loop {
            let Some(token) = self.peek() else { break };
            let Some((operator, level)) = binary_op(&token) else {
                break;
            };
            if level < min_level {
                break;
            }
            // template arguments may not contain bare short-circuit,
            // relational or shift operators
            if in_template && matches!(level, 1 | 2 | 7 | 8) {
                break;
            }
            self.advance();
            let rhs = self.binary_expression(level + 1, in_template)?;
            lhs = Expression::Binary(BinaryExpression {
                operator,
                left: Box::new(lhs),
                right: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn unary_expression(&mut self) -> Result<Expression, ParseError> {
        let operator = match self.peek() {
            Some(Token::SymBang) => Some(UnaryOperator::LogicalNegation),
            Some(Token::SymMinus) => Some(UnaryOperator::Negation),
            Some(Token::SymTilde) => Some(UnaryOperator::BitwiseComplement),
            Some(Token::SymAnd) => Some(UnaryOperator::AddressOf),
            Some(Token::SymStar) => Some(UnaryOperator::Indirection),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let operand = self.unary_expression()?;
            Ok(Expression::Unary(UnaryExpression {
                operator,
                operand: Box::new(operand),
            }))
        } else {
            self.postfix_expression()
        }
    }

    fn postfix_expression(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.primary_expression()?;
        loop {
            if self.eat(&Token::SymPeriod) {
                let component = self.ident()?;
                expr = Expression::NamedComponent(NamedComponentExpression {
                    base: Box::new(expr),
                    component,
                });
            } else if self.eat(&Token::SymBracketLeft) {
                let index = self.expression()?;
                self.expect(&Token::SymBracketRight)?;
                expr = Expression::Indexing(IndexingExpression {
                    base: Box::new(expr),
                    index: Box::new(index),
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn primary_expression(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(Token::KwTrue) => {
                self.advance();
                Ok(Expression::Literal(LiteralExpression::Bool(true)))
            }
            Some(Token::KwFalse) => {
                self.advance();
                Ok(Expression::Literal(LiteralExpression::Bool(false)))
            }
            Some(Token::IntLiteral(text)) => {
                self.advance();
                Ok(Expression::Literal(LiteralExpression::Int(text)))
            }
            Some(Token::FloatLiteral(text)) => {
                self.advance();
                Ok(Expression::Literal(LiteralExpression::Float(text)))
            }
            Some(Token::SymParenLeft) => {
                self.advance();
                let expression = self.expression()?;
                self.expect(&Token::SymParenRight)?;
                Ok(Expression::Parenthesized(ParenthesizedExpression {
                    expression: Box::new(expression),
                }))
            }
            // the phony assignment target `_`
            Some(Token::SymUnderscore) => {
                self.advance();
                Ok(Expression::Identifier(IdentifierExpression {
                    name: "_".to_string(),
                }))
            }
            Some(Token::Ident(_)) => self.ident_primary(),
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn ident_primary(&mut self) -> Result<Expression, ParseError> {
        let name = self.ident()?;
        let template_args = if self.at(&Token::SymLessThan) {
            self.try_template_list()
        } else {
            None
        };
        if self.eat(&Token::SymParenLeft) {
            let arguments = self.comma_separated(&Token::SymParenRight, |p| p.expression())?;
            self.expect(&Token::SymParenRight)?;
            Ok(Expression::FunctionCall(FunctionCall {
                name,
                template_args,
                arguments,
            }))
        } else if template_args.is_some() {
            Ok(Expression::Type(TypeExpression {
                name,
                template_args,
            }))
        } else {
            Ok(Expression::Identifier(IdentifierExpression { name }))
        }
    }

    fn type_expression(&mut self) -> Result<TypeExpression, ParseError> {
        let name = self.ident()?;
        // in type position a `<` is always a template list
        let template_args = if self.at(&Token::SymLessThan) {
            Some(self.template_list()?)
        } else {
            None
        };
        Ok(TypeExpression {
            name,
            template_args,
        })
    }

    // ── attributes ──────────────────────────────────────────────────────

    fn attributes(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();
        while self.eat(&Token::SymAttr) {
            let name = self.word()?;
            let arguments = if self.eat(&Token::SymParenLeft) {
                let args = self.comma_separated(&Token::SymParenRight, |p| p.expression())?;
                self.expect(&Token::SymParenRight)?;
                Some(args)
            } else {
                None
            };
            attributes.push(Attribute { name, arguments });
        }
        Ok(attributes)
    }

    // ── directives ──────────────────────────────────────────────────────

    fn extension_list(&mut self) -> Result<Vec<String>, ParseError> {
        let extensions = self.comma_separated(&Token::SymSemicolon, |p| p.ident())?;
        self.expect(&Token::SymSemicolon)?;
        Ok(extensions)
    }

    fn diagnostic_directive(&mut self) -> Result<DiagnosticDirective, ParseError> {
        self.expect(&Token::KwDiagnostic)?;
        self.expect(&Token::SymParenLeft)?;
        let severity_span = self.peek_span();
        let severity_word = self.word()?;
        let severity = severity_word
            .parse::<DiagnosticSeverity>()
            .map_err(|kind| kind.at(severity_span))?;
        self.expect(&Token::SymComma)?;
        let mut rule_name = self.word()?;
        if self.eat(&Token::SymPeriod) {
            rule_name.push('.');
            rule_name.push_str(&self.word()?);
        }
        self.eat(&Token::SymComma);
        self.expect(&Token::SymParenRight)?;
        self.expect(&Token::SymSemicolon)?;
        Ok(DiagnosticDirective {
            severity,
            rule_name,
        })
    }

    // ── declarations ────────────────────────────────────────────────────

    fn declaration(&mut self, attributes: Vec<Attribute>) -> Result<Declaration, ParseError> {
        let kind = match self.peek() {
            Some(Token::KwConst) => DeclarationKind::Const,
            Some(Token::KwOverride) => DeclarationKind::Override,
            Some(Token::KwLet) => DeclarationKind::Let,
            Some(Token::KwVar) => DeclarationKind::Var,
            _ => return Err(self.unexpected("a declaration")),
        };
        self.advance();
        // address space and access mode, e.g. `var<storage, read_write>`
        let template_args = if self.at(&Token::SymLessThan) {
            Some(self.template_list()?)
        } else {
            None
        };
        let name = self.ident()?;
        let ty = if self.eat(&Token::SymColon) {
            Some(self.type_expression()?)
        } else {
            None
        };
        let initializer = if self.eat(&Token::SymEqual) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Declaration {
            attributes,
            kind,
            template_args,
            name,
            ty,
            initializer,
        })
    }

    fn type_alias(&mut self) -> Result<TypeAlias, ParseError> {
        self.expect(&Token::KwAlias)?;
        let name = self.ident()?;
        self.expect(&Token::SymEqual)?;
        let ty = self.type_expression()?;
        Ok(TypeAlias { name, ty })
    }

    fn struct_declaration(&mut self) -> Result<Struct, ParseError> {
        self.expect(&Token::KwStruct)?;
        let name = self.ident()?;
        self.expect(&Token::SymBraceLeft)?;
        let members = self.comma_separated(&Token::SymBraceRight, |p| p.struct_member())?;
        self.expect(&Token::SymBraceRight)?;
        Ok(Struct { name, members })
    }

    fn struct_member(&mut self) -> Result<StructMember, ParseError> {
        let attributes = self.attributes()?;
        let name = self.ident()?;
        self.expect(&Token::SymColon)?;
        let ty = self.type_expression()?;
        Ok(StructMember {
            attributes,
            name,
            ty,
        })
    }

    fn function(&mut self, attributes: Vec<Attribute>) -> Result<Function, ParseError> {
        self.expect(&Token::KwFn)?;
        let name = self.ident()?;
        self.expect(&Token::SymParenLeft)?;
        let parameters = self.comma_separated(&Token::SymParenRight, |p| p.formal_parameter())?;
        self.expect(&Token::SymParenRight)?;
        let (return_attributes, return_type) = if self.eat(&Token::SymArrow) {
            let return_attributes = self.attributes()?;
            (return_attributes, Some(self.type_expression()?))
        } else {
            (Vec::new(), None)
        };
        let body = self.compound_statement(Vec::new())?;
        Ok(Function {
            attributes,
            name,
            parameters,
            return_attributes,
            return_type,
            body,
        })
    }

    fn formal_parameter(&mut self) -> Result<FormalParameter, ParseError> {
        let attributes = self.attributes()?;
        let name = self.ident()?;
        self.expect(&Token::SymColon)?;
        let ty = self.type_expression()?;
        Ok(FormalParameter {
            attributes,
            name,
            ty,
        })
    }

    fn const_assert(&mut self) -> Result<ConstAssert, ParseError> {
        self.expect(&Token::KwConstAssert)?;
        let expression = self.expression()?;
        Ok(ConstAssert { expression })
    }

    // ── statements ──────────────────────────────────────────────────────

    fn compound_statement(
        &mut self,
        attributes: Vec<Attribute>,
    ) -> Result<CompoundStatement, ParseError> {
        self.expect(&Token::SymBraceLeft)?;
        let mut statements = Vec::new();
        while !self.at(&Token::SymBraceRight) {
            statements.push(self.statement()?);
        }
        self.expect(&Token::SymBraceRight)?;
        Ok(CompoundStatement {
            attributes,
            statements,
        })
    }

    fn statement(&mut self) -> Result<Spanned<Statement>, ParseError> {
        let start = self.peek_span().start;
        let attributes = self.attributes()?;
        let statement = self.statement_kind(attributes)?;
        Ok(Spanned::new(statement, Span::new(start, self.prev_end)))
    }

    fn statement_kind(&mut self, attributes: Vec<Attribute>) -> Result<Statement, ParseError> {
        match self.peek() {
            Some(Token::SymSemicolon) if attributes.is_empty() => {
                self.advance();
                Ok(Statement::Void)
            }
            Some(Token::SymBraceLeft) => {
                Ok(Statement::Compound(self.compound_statement(attributes)?))
            }
            Some(Token::KwIf) => Ok(Statement::If(self.if_statement(attributes)?)),
            Some(Token::KwSwitch) => Ok(Statement::Switch(self.switch_statement(attributes)?)),
            Some(Token::KwLoop) => Ok(Statement::Loop(self.loop_statement(attributes)?)),
            Some(Token::KwFor) => Ok(Statement::For(self.for_statement(attributes)?)),
            Some(Token::KwWhile) => Ok(Statement::While(self.while_statement(attributes)?)),
            Some(Token::KwBreak) if attributes.is_empty() => {
                self.advance();
                self.expect(&Token::SymSemicolon)?;
                Ok(Statement::Break)
            }
            Some(Token::KwContinue) if attributes.is_empty() => {
                self.advance();
                self.expect(&Token::SymSemicolon)?;
                Ok(Statement::Continue)
            }
            Some(Token::KwReturn) if attributes.is_empty() => {
                self.advance();
                let expression = if self.at(&Token::SymSemicolon) {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(&Token::SymSemicolon)?;
                Ok(Statement::Return(expression))
            }
            Some(Token::KwDiscard) if attributes.is_empty() => {
                self.advance();
                self.expect(&Token::SymSemicolon)?;
                Ok(Statement::Discard)
            }
            Some(Token::KwConstAssert) if attributes.is_empty() => {
                let assert = self.const_assert()?;
                self.expect(&Token::SymSemicolon)?;
                Ok(Statement::ConstAssert(assert))
            }
            Some(Token::KwConst | Token::KwLet | Token::KwVar) => {
                let declaration = self.declaration(attributes)?;
                self.expect(&Token::SymSemicolon)?;
                Ok(Statement::Declaration(declaration))
            }
            Some(_) if attributes.is_empty() => {
                let statement = self.simple_statement()?;
                self.expect(&Token::SymSemicolon)?;
                Ok(statement)
            }
            _ => Err(self.unexpected("a statement")),
        }
    }

    /// An assignment, increment, decrement or call, without the trailing `;`.
    /// Shared between statement position and `for` headers.
    fn simple_statement(&mut self) -> Result<Statement, ParseError> {
        let lhs = self.expression()?;
        match self.peek() {
            Some(Token::SymPlusPlus) => {
                self.advance();
                Ok(Statement::Increment(lhs))
            }
            Some(Token::SymMinusMinus) => {
                self.advance();
                Ok(Statement::Decrement(lhs))
            }
            Some(token) => {
                if let Some(operator) = assignment_op(&token) {
                    self.advance();
                    let rhs = self.expression()?;
                    Ok(Statement::Assignment(AssignmentStatement {
                        operator,
                        lhs,
                        rhs,
                    }))
                } else if let Expression::FunctionCall(call) = lhs {
                    Ok(Statement::FunctionCall(call))
                } else {
                    Err(self.unexpected("a statement"))
                }
            }
            None => {
                if let Expression::FunctionCall(call) = lhs {
                    Ok(Statement::FunctionCall(call))
                } else {
                    Err(self.unexpected("a statement"))
                }
            }
        }
    }

    fn if_statement(&mut self, attributes: Vec<Attribute>) -> Result<IfStatement, ParseError> {
        self.expect(&Token::KwIf)?;
        let expression = self.expression()?;
        let body = self.compound_statement(Vec::new())?;
        let if_clause = IfClause { expression, body };
        let mut else_if_clauses = Vec::new();
        let mut else_clause = None;
        while self.at(&Token::KwElse) {
            if self.peek2() == Some(Token::KwIf) {
                self.advance();
                self.advance();
                let expression = self.expression()?;
                let body = self.compound_statement(Vec::new())?;
                else_if_clauses.push(ElseIfClause { expression, body });
            } else {
                self.advance();
                let body = self.compound_statement(Vec::new())?;
                else_clause = Some(ElseClause { body });
                break;
            }
        }
        Ok(IfStatement {
            attributes,
            if_clause,
            else_if_clauses,
            else_clause,
        })
    }

    fn switch_statement(
        &mut self,
        attributes: Vec<Attribute>,
    ) -> Result<SwitchStatement, ParseError> {
        self.expect(&Token::KwSwitch)?;
        let expression = self.expression()?;
        let body_attributes = self.attributes()?;
        self.expect(&Token::SymBraceLeft)?;
        let mut clauses = Vec::new();
        while !self.at(&Token::SymBraceRight) {
            clauses.push(self.switch_clause()?);
        }
        self.expect(&Token::SymBraceRight)?;
        Ok(SwitchStatement {
            attributes,
            expression,
            body_attributes,
            clauses,
        })
    }

    fn switch_clause(&mut self) -> Result<SwitchClause, ParseError> {
        match self.peek() {
            Some(Token::KwCase) => {
                self.advance();
                let mut case_selectors = vec![self.case_selector()?];
                while self.eat(&Token::SymComma) {
                    if self.at(&Token::SymColon) || self.at(&Token::SymBraceLeft) {
                        break;
                    }
                    case_selectors.push(self.case_selector()?);
                }
                self.eat(&Token::SymColon);
                let body = self.compound_statement(Vec::new())?;
                Ok(SwitchClause {
                    case_selectors,
                    body,
                })
            }
            Some(Token::KwDefault) => {
                self.advance();
                self.eat(&Token::SymColon);
                let body = self.compound_statement(Vec::new())?;
                Ok(SwitchClause {
                    case_selectors: vec![CaseSelector::Default],
                    body,
                })
            }
            _ => Err(self.unexpected("`case` or `default`")),
        }
    }

    fn case_selector(&mut self) -> Result<CaseSelector, ParseError> {
        if self.eat(&Token::KwDefault) {
            Ok(CaseSelector::Default)
        } else {
            Ok(CaseSelector::Expression(self.expression()?))
        }
    }

    fn loop_statement(&mut self, attributes: Vec<Attribute>) -> Result<LoopStatement, ParseError> {
        self.expect(&Token::KwLoop)?;
        let body_attributes = self.attributes()?;
        self.expect(&Token::SymBraceLeft)?;
        let mut statements = Vec::new();
        let mut continuing = None;
        loop {
            match self.peek() {
                Some(Token::SymBraceRight) => break,
                Some(Token::KwContinuing) => {
                    continuing = Some(self.continuing_statement()?);
                    break;
                }
                Some(_) => statements.push(self.statement()?),
                None => return Err(self.unexpected("`}`")),
            }
        }
        self.expect(&Token::SymBraceRight)?;
        Ok(LoopStatement {
            attributes,
            body: CompoundStatement {
                attributes: body_attributes,
                statements,
            },
            continuing,
        })
    }

    fn continuing_statement(&mut self) -> Result<ContinuingStatement, ParseError> {
        self.expect(&Token::KwContinuing)?;
        self.expect(&Token::SymBraceLeft)?;
        let mut statements = Vec::new();
        let mut break_if = None;
        loop {
            match self.peek() {
                Some(Token::SymBraceRight) => break,
                Some(Token::KwBreak) if self.peek2() == Some(Token::KwIf) => {
                    self.advance();
                    self.advance();
                    break_if = Some(self.expression()?);
                    self.expect(&Token::SymSemicolon)?;
                    break;
                }
                Some(_) => statements.push(self.statement()?),
                None => return Err(self.unexpected("`}`")),
            }
        }
        self.expect(&Token::SymBraceRight)?;
        Ok(ContinuingStatement {
            body: CompoundStatement {
                attributes: Vec::new(),
                statements,
            },
            break_if,
        })
    }

    fn for_statement(&mut self, attributes: Vec<Attribute>) -> Result<ForStatement, ParseError> {
        self.expect(&Token::KwFor)?;
        self.expect(&Token::SymParenLeft)?;
        let initializer = if self.at(&Token::SymSemicolon) {
            None
        } else {
            Some(Box::new(self.for_init()?))
        };
        self.expect(&Token::SymSemicolon)?;
        let condition = if self.at(&Token::SymSemicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&Token::SymSemicolon)?;
        let update = if self.at(&Token::SymParenRight) {
            None
        } else {
            Some(Box::new(self.simple_statement()?))
        };
        self.expect(&Token::SymParenRight)?;
        let body = self.compound_statement(Vec::new())?;
        Ok(ForStatement {
            attributes,
            initializer,
            condition,
            update,
            body,
        })
    }

    fn for_init(&mut self) -> Result<Statement, ParseError> {
        match self.peek() {
            Some(Token::KwConst | Token::KwLet | Token::KwVar) => {
                Ok(Statement::Declaration(self.declaration(Vec::new())?))
            }
            _ => self.simple_statement(),
        }
    }

    fn while_statement(
        &mut self,
        attributes: Vec<Attribute>,
    ) -> Result<WhileStatement, ParseError> {
        self.expect(&Token::KwWhile)?;
        let condition = self.expression()?;
        let body = self.compound_statement(Vec::new())?;
        Ok(WhileStatement {
            attributes,
            condition,
            body,
        })
    }

    // ── translation unit ────────────────────────────────────────────────

    fn global_declaration(&mut self) -> Result<Spanned<GlobalDeclaration>, ParseError> {
        let start = self.peek_span().start;
        let attributes = self.attributes()?;
        let declaration = match self.peek() {
            Some(Token::SymSemicolon) if attributes.is_empty() => {
                self.advance();
                GlobalDeclaration::Void
            }
            Some(Token::KwConst | Token::KwLet | Token::KwVar | Token::KwOverride) => {
                let declaration = self.declaration(attributes)?;
                self.expect(&Token::SymSemicolon)?;
                GlobalDeclaration::Declaration(declaration)
            }
            Some(Token::KwAlias) if attributes.is_empty() => {
                let alias = self.type_alias()?;
                self.expect(&Token::SymSemicolon)?;
                GlobalDeclaration::TypeAlias(alias)
            }
            Some(Token::KwStruct) if attributes.is_empty() => {
                GlobalDeclaration::Struct(self.struct_declaration()?)
            }
            Some(Token::KwFn) => GlobalDeclaration::Function(self.function(attributes)?),
            Some(Token::KwConstAssert) if attributes.is_empty() => {
                let assert = self.const_assert()?;
                self.expect(&Token::SymSemicolon)?;
                GlobalDeclaration::ConstAssert(assert)
            }
            _ => return Err(self.unexpected("a declaration")),
        };
        Ok(Spanned::new(declaration, Span::new(start, self.prev_end)))
    }

    fn translation_unit(&mut self) -> Result<TranslationUnit, ParseError> {
        let mut global_directives = Vec::new();
        loop {
            match self.peek() {
                Some(Token::KwEnable) => {
                    self.advance();
                    global_directives.push(GlobalDirective::Enable(EnableDirective {
                        extensions: self.extension_list()?,
                    }));
                }
                Some(Token::KwRequires) => {
                    self.advance();
                    global_directives.push(GlobalDirective::Requires(RequiresDirective {
                        extensions: self.extension_list()?,
                    }));
                }
                Some(Token::KwDiagnostic) => {
                    global_directives.push(GlobalDirective::Diagnostic(
                        self.diagnostic_directive()?,
                    ));
                }
                _ => break,
            }
        }
        let mut global_declarations = Vec::new();
        while self.peek().is_some() {
            global_declarations.push(self.global_declaration()?);
        }
        Ok(TranslationUnit {
            global_directives,
            global_declarations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> TranslationUnit {
        match parse(source) {
            Ok(module) => module,
            Err(err) => panic!("{source:?} failed to parse: {err}"),
        }
    }

    fn first_declaration(module: &TranslationUnit) -> &GlobalDeclaration {
        &module.global_declarations[0].node
    }

    #[test]
    fn parses_a_function() {
        let module = parse_ok("fn add(a: f32, b: f32) -> f32 { return a + b; }");
        let GlobalDeclaration::Function(function) = first_declaration(&module) else {
            panic!("expected a function");
        };
        assert_eq!(function.name, "add");
        assert_eq!(function.parameters.len(), 2);
        assert!(function.return_type.is_some());
        assert_eq!(function.body.statements.len(), 1);
    }

    #[test]
    fn var_with_address_space() {
        let module = parse_ok("var<storage, read_write> data: array<f32>;");
        let GlobalDeclaration::Declaration(declaration) = first_declaration(&module) else {
            panic!("expected a declaration");
        };
        assert_eq!(declaration.kind, DeclarationKind::Var);
        assert_eq!(
            declaration.template_args.as_ref().map(|args| args.len()),
            Some(2)
        );
        assert!(declaration.initializer.is_none());
    }

    #[test]
    fn template_vs_comparison() {
        // expression position: `a < b` stays a comparison
        let module = parse_ok("const c = a < b;");
        let GlobalDeclaration::Declaration(declaration) = first_declaration(&module) else {
            panic!("expected a declaration");
        };
        let Some(Expression::Binary(binary)) = &declaration.initializer else {
            panic!("expected a binary expression");
        };
        assert_eq!(binary.operator, BinaryOperator::LessThan);
    }

    #[test]
    fn template_constructor_call() {
        let module = parse_ok("const v = vec3<f32>(1.0, 2.0, 3.0);");
        let GlobalDeclaration::Declaration(declaration) = first_declaration(&module) else {
            panic!("expected a declaration");
        };
        let Some(Expression::FunctionCall(call)) = &declaration.initializer else {
            panic!("expected a call");
        };
        assert_eq!(call.name, "vec3");
        assert_eq!(call.template_args.as_ref().map(|args| args.len()), Some(1));
        assert_eq!(call.arguments.len(), 3);
    }

    #[test]
    fn nested_template_splits_shift_right() {
        let module = parse_ok("var<private> m: array<vec2<f32>, 4>;");
        let GlobalDeclaration::Declaration(declaration) = first_declaration(&module) else {
            panic!("expected a declaration");
        };
        let ty = declaration.ty.as_ref().unwrap();
        assert_eq!(ty.name, "array");
        let args = ty.template_args.as_ref().unwrap();
        assert_eq!(args.len(), 2);
        let Expression::Type(inner) = &args[0] else {
            panic!("expected a type argument");
        };
        assert_eq!(inner.name, "vec2");
    }

    #[test]
    fn template_end_glued_to_equal() {
        // `vec2<f32>=` lexes the `>=` as one token; closing the template
        // must split it
        let module = parse_ok("fn f() { var v: vec2<f32>=vec2<f32>(0.0, 0.0); }");
        let GlobalDeclaration::Function(function) = first_declaration(&module) else {
            panic!("expected a function");
        };
        let Statement::Declaration(declaration) = &function.body.statements[0].node else {
            panic!("expected a declaration statement");
        };
        assert!(declaration.initializer.is_some());
    }

    #[test]
    fn double_template_close() {
        let module = parse_ok("alias A = array<vec2<f32>>;");
        let GlobalDeclaration::TypeAlias(alias) = first_declaration(&module) else {
            panic!("expected an alias");
        };
        assert_eq!(alias.ty.name, "array");
    }

    #[test]
    fn statement_forms() {
        parse_ok(
            "fn f() {
                var i = 0;
                i++;
                i -= 2;
                _ = i;
                loop {
                    if i > 3 { break; } else { continue; }
                    continuing {
                        i++;
                        break if i > 4;
                    }
                }
                for (var j = 0; j < 4; j++) {
                    g(j);
                }
                while i < 10 { i = i * 2; }
                switch i {
                    case 1, 2: { }
                    default: { }
                }
                return;
            }",
        );
    }

    #[test]
    fn directives_come_first() {
        let module = parse_ok("enable f16;\ndiagnostic(off, derivative_uniformity);\nconst x = 1;");
        assert_eq!(module.global_directives.len(), 2);
        assert_eq!(module.global_declarations.len(), 1);
    }

    #[test]
    fn const_assert_span_covers_the_statement() {
        let source = "const_assert  1 < 2;";
        let module = parse_ok(source);
        let spanned = &module.global_declarations[0];
        assert_eq!(spanned.span.slice(source), source);
        assert!(matches!(spanned.node, GlobalDeclaration::ConstAssert(_)));
    }

    #[test]
    fn attributes_on_declarations() {
        let module = parse_ok(
            "@group(0) @binding(1) var<uniform> u: mat4x4<f32>;
             @vertex fn main(@location(0) pos: vec4<f32>) -> @builtin(position) vec4<f32> {
                 return pos;
             }",
        );
        let GlobalDeclaration::Declaration(declaration) = first_declaration(&module) else {
            panic!("expected a declaration");
        };
        assert_eq!(declaration.attributes.len(), 2);
        let GlobalDeclaration::Function(function) = &module.global_declarations[1].node else {
            panic!("expected a function");
        };
        assert_eq!(function.attributes.len(), 1);
        assert_eq!(function.parameters[0].attributes.len(), 1);
        assert_eq!(function.return_attributes.len(), 1);
    }

    #[test]
    fn missing_brace_is_an_error() {
        assert!(parse("fn f() { return;").is_err());
    }

    #[test]
    fn comparison_against_call_rolls_back_cleanly() {
        // speculation walks into `min<...` and must roll back to `<`
        parse_ok("const c = a < min(1, 2);");
    }
}
