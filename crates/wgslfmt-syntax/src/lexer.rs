use std::fmt::Display;

use logos::Logos;

use crate::error::{ParseError, ParseErrorKind};
use crate::span::Span;

// following the spec at this date: https://www.w3.org/TR/2024/WD-WGSL-20240731/
//
// Numeric literals keep their source spelling: the formatter re-emits hex
// digits, exponents, signs and type suffixes verbatim, so nothing is ever
// parsed to a numeric value here.
#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(
    skip r"\s+",
    skip r"//[^\n\r]*[\n\r]*", // line comment
    skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")] // block comment
pub enum Token {
    // syntactic tokens
    // https://www.w3.org/TR/WGSL/#syntactic-tokens
    #[token("&")]
    SymAnd,
    #[token("&&")]
    SymAndAnd,
    #[token("->")]
    SymArrow,
    #[token("@")]
    SymAttr,
    #[token("/")]
    SymForwardSlash,
    #[token("!")]
    SymBang,
    #[token("[")]
    SymBracketLeft,
    #[token("]")]
    SymBracketRight,
    #[token("{")]
    SymBraceLeft,
    #[token("}")]
    SymBraceRight,
    #[token(":")]
    SymColon,
    #[token(",")]
    SymComma,
    #[token("=")]
    SymEqual,
    #[token("==")]
    SymEqualEqual,
    #[token("!=")]
    SymNotEqual,
    #[token(">")]
    SymGreaterThan,
    #[token(">=")]
    SymGreaterThanEqual,
    #[token(">>")]
    SymShiftRight,
    #[token("<")]
    SymLessThan,
    #[token("<=")]
    SymLessThanEqual,
    #[token("<<")]
    SymShiftLeft,
    #[token("%")]
    SymModulo,
    #[token("-")]
    SymMinus,
    #[token("--")]
    SymMinusMinus,
    #[token(".")]
    SymPeriod,
    #[token("+")]
    SymPlus,
    #[token("++")]
    SymPlusPlus,
    #[token("|")]
    SymOr,
    #[token("||")]
    SymOrOr,
    #[token("(")]
    SymParenLeft,
    #[token(")")]
    SymParenRight,
    #[token(";")]
    SymSemicolon,
    #[token("*")]
    SymStar,
    #[token("~")]
    SymTilde,
    #[token("_")]
    SymUnderscore,
    #[token("^")]
    SymXor,
    #[token("+=")]
    SymPlusEqual,
    #[token("-=")]
    SymMinusEqual,
    #[token("*=")]
    SymTimesEqual,
    #[token("/=")]
    SymDivisionEqual,
    #[token("%=")]
    SymModuloEqual,
    #[token("&=")]
    SymAndEqual,
    #[token("|=")]
    SymOrEqual,
    #[token("^=")]
    SymXorEqual,
    #[token(">>=")]
    SymShiftRightAssign,
    #[token("<<=")]
    SymShiftLeftAssign,

    // keywords
    // https://www.w3.org/TR/WGSL/#keyword-summary
    #[token("alias")]
    KwAlias,
    #[token("break")]
    KwBreak,
    #[token("case")]
    KwCase,
    #[token("const")]
    KwConst,
    #[token("const_assert")]
    KwConstAssert,
    #[token("continue")]
    KwContinue,
    #[token("continuing")]
    KwContinuing,
    #[token("default")]
    KwDefault,
    #[token("diagnostic")]
    KwDiagnostic,
    #[token("discard")]
    KwDiscard,
    #[token("else")]
    KwElse,
    #[token("enable")]
    KwEnable,
    #[token("false")]
    KwFalse,
    #[token("fn")]
    KwFn,
    #[token("for")]
    KwFor,
    #[token("if")]
    KwIf,
    #[token("let")]
    KwLet,
    #[token("loop")]
    KwLoop,
    #[token("override")]
    KwOverride,
    #[token("requires")]
    KwRequires,
    #[token("return")]
    KwReturn,
    #[token("struct")]
    KwStruct,
    #[token("switch")]
    KwSwitch,
    #[token("true")]
    KwTrue,
    #[token("var")]
    KwVar,
    #[token("while")]
    KwWhile,

    #[regex(r#"([_\p{XID_Start}][\p{XID_Continue}]+)|([\p{XID_Start}])"#, |lex| lex.slice().to_string())]
    Ident(String),
    #[regex(r#"(0|[1-9][0-9]*)[iu]?"#, |lex| lex.slice().to_string())] // dec
    #[regex(r#"0[xX][0-9a-fA-F]+[iu]?"#, |lex| lex.slice().to_string())] // hex
    IntLiteral(String),
    #[regex(r#"(0|[1-9][0-9]*)[fh]"#, |lex| lex.slice().to_string())] // suffix only
    #[regex(r#"([0-9]*\.[0-9]+|[0-9]+\.[0-9]*)([eE][+-]?[0-9]+)?[fh]?"#, |lex| lex.slice().to_string())] // dec
    #[regex(r#"[0-9]+[eE][+-]?[0-9]+[fh]?"#, |lex| lex.slice().to_string())] // exponent
    #[regex(r#"0[xX]([0-9a-fA-F]*\.[0-9a-fA-F]+|[0-9a-fA-F]+\.[0-9a-fA-F]*)([pP][+-]?[0-9]+[fh]?)?"#, |lex| lex.slice().to_string())] // hex
    #[regex(r#"0[xX][0-9a-fA-F]+[pP][+-]?[0-9]+[fh]?"#, |lex| lex.slice().to_string())] // hex exponent
    FloatLiteral(String),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::SymAnd => f.write_str("`&`"),
            Token::SymAndAnd => f.write_str("`&&`"),
            Token::SymArrow => f.write_str("`->`"),
            Token::SymAttr => f.write_str("`@`"),
            Token::SymForwardSlash => f.write_str("`/`"),
            Token::SymBang => f.write_str("`!`"),
            Token::SymBracketLeft => f.write_str("`[`"),
            Token::SymBracketRight => f.write_str("`]`"),
            Token::SymBraceLeft => f.write_str("`{`"),
            Token::SymBraceRight => f.write_str("`}`"),
            Token::SymColon => f.write_str("`:`"),
            Token::SymComma => f.write_str("`,`"),
            Token::SymEqual => f.write_str("`=`"),
            Token::SymEqualEqual => f.write_str("`==`"),
            Token::SymNotEqual => f.write_str("`!=`"),
            Token::SymGreaterThan => f.write_str("`>`"),
            Token::SymGreaterThanEqual => f.write_str("`>=`"),
            Token::SymShiftRight => f.write_str("`>>`"),
            Token::SymLessThan => f.write_str("`<`"),
            Token::SymLessThanEqual => f.write_str("`<=`"),
            Token::SymShiftLeft => f.write_str("`<<`"),
            Token::SymModulo => f.write_str("`%`"),
            Token::SymMinus => f.write_str("`-`"),
            Token::SymMinusMinus => f.write_str("`--`"),
            Token::SymPeriod => f.write_str("`.`"),
            Token::SymPlus => f.write_str("`+`"),
            Token::SymPlusPlus => f.write_str("`++`"),
            Token::SymOr => f.write_str("`|`"),
            Token::SymOrOr => f.write_str("`||`"),
            Token::SymParenLeft => f.write_str("`(`"),
            Token::SymParenRight => f.write_str("`)`"),
            Token::SymSemicolon => f.write_str("`;`"),
            Token::SymStar => f.write_str("`*`"),
            Token::SymTilde => f.write_str("`~`"),
            Token::SymUnderscore => f.write_str("`_`"),
            Token::SymXor => f.write_str("`^`"),
            Token::SymPlusEqual => f.write_str("`+=`"),
            Token::SymMinusEqual => f.write_str("`-=`"),
            Token::SymTimesEqual => f.write_str("`*=`"),
            Token::SymDivisionEqual => f.write_str("`/=`"),
            Token::SymModuloEqual => f.write_str("`%=`"),
            Token::SymAndEqual => f.write_str("`&=`"),
            Token::SymOrEqual => f.write_str("`|=`"),
            Token::SymXorEqual => f.write_str("`^=`"),
            Token::SymShiftRightAssign => f.write_str("`>>=`"),
            Token::SymShiftLeftAssign => f.write_str("`<<=`"),
            Token::KwAlias => f.write_str("`alias`"),
            Token::KwBreak => f.write_str("`break`"),
            Token::KwCase => f.write_str("`case`"),
            Token::KwConst => f.write_str("`const`"),
            Token::KwConstAssert => f.write_str("`const_assert`"),
            Token::KwContinue => f.write_str("`continue`"),
            Token::KwContinuing => f.write_str("`continuing`"),
            Token::KwDefault => f.write_str("`default`"),
            Token::KwDiagnostic => f.write_str("`diagnostic`"),
            Token::KwDiscard => f.write_str("`discard`"),
            Token::KwElse => f.write_str("`else`"),
            Token::KwEnable => f.write_str("`enable`"),
            Token::KwFalse => f.write_str("`false`"),
            Token::KwFn => f.write_str("`fn`"),
            Token::KwFor => f.write_str("`for`"),
            Token::KwIf => f.write_str("`if`"),
            Token::KwLet => f.write_str("`let`"),
            Token::KwLoop => f.write_str("`loop`"),
            Token::KwOverride => f.write_str("`override`"),
            Token::KwRequires => f.write_str("`requires`"),
            Token::KwReturn => f.write_str("`return`"),
            Token::KwStruct => f.write_str("`struct`"),
            Token::KwSwitch => f.write_str("`switch`"),
            Token::KwTrue => f.write_str("`true`"),
            Token::KwVar => f.write_str("`var`"),
            Token::KwWhile => f.write_str("`while`"),
            Token::Ident(s) => write!(f, "identifier `{s}`"),
            Token::IntLiteral(s) => write!(f, "literal `{s}`"),
            Token::FloatLiteral(s) => write!(f, "literal `{s}`"),
        }
    }
}

impl Token {
    /// The text a keyword token was lexed from, for the contexts that accept
    /// keywords as plain words (attribute names).
    pub(crate) fn keyword_text(&self) -> Option<&'static str> {
        match self {
            Token::KwAlias => Some("alias"),
            Token::KwBreak => Some("break"),
            Token::KwCase => Some("case"),
            Token::KwConst => Some("const"),
            Token::KwConstAssert => Some("const_assert"),
            Token::KwContinue => Some("continue"),
            Token::KwContinuing => Some("continuing"),
            Token::KwDefault => Some("default"),
            Token::KwDiagnostic => Some("diagnostic"),
            Token::KwDiscard => Some("discard"),
            Token::KwElse => Some("else"),
            Token::KwEnable => Some("enable"),
            Token::KwFalse => Some("false"),
            Token::KwFn => Some("fn"),
            Token::KwFor => Some("for"),
            Token::KwIf => Some("if"),
            Token::KwLet => Some("let"),
            Token::KwLoop => Some("loop"),
            Token::KwOverride => Some("override"),
            Token::KwRequires => Some("requires"),
            Token::KwReturn => Some("return"),
            Token::KwStruct => Some("struct"),
            Token::KwSwitch => Some("switch"),
            Token::KwTrue => Some("true"),
            Token::KwVar => Some("var"),
            Token::KwWhile => Some("while"),
            _ => None,
        }
    }
}

/// Lex a whole source file into a token buffer.
///
/// The parser works over the buffer rather than a token stream so that it can
/// speculate on template lists and roll back (see `parser`).
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    let mut tokens = Vec::new();
    for (token, range) in Token::lexer(source).spanned() {
        let span = Span::new(range.start, range.end);
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(ParseError::new(ParseErrorKind::InvalidToken, span)),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(token, _)| token)
            .collect()
    }

    #[test]
    fn literals_keep_their_spelling() {
        assert_eq!(
            kinds("0 12u 0x1F 1.5 1e3 1f .5 0x1p2"),
            vec![
                Token::IntLiteral("0".to_string()),
                Token::IntLiteral("12u".to_string()),
                Token::IntLiteral("0x1F".to_string()),
                Token::FloatLiteral("1.5".to_string()),
                Token::FloatLiteral("1e3".to_string()),
                Token::FloatLiteral("1f".to_string()),
                Token::FloatLiteral(".5".to_string()),
                Token::FloatLiteral("0x1p2".to_string()),
            ]
        );
    }

    #[test]
    fn member_access_is_not_a_float() {
        assert_eq!(
            kinds("a.x"),
            vec![
                Token::Ident("a".to_string()),
                Token::SymPeriod,
                Token::Ident("x".to_string()),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("// line\nlet /* block */ x"),
            vec![Token::KwLet, Token::Ident("x".to_string())]
        );
    }

    #[test]
    fn compound_operators_lex_greedily() {
        assert_eq!(
            kinds(">>= >> >= >"),
            vec![
                Token::SymShiftRightAssign,
                Token::SymShiftRight,
                Token::SymGreaterThanEqual,
                Token::SymGreaterThan,
            ]
        );
    }

    #[test]
    fn underscore_alone_is_a_symbol() {
        assert_eq!(
            kinds("_ _x"),
            vec![Token::SymUnderscore, Token::Ident("_x".to_string())]
        );
    }

    #[test]
    fn unknown_character_is_an_error() {
        assert!(tokenize("let x = #;").is_err());
    }
}
