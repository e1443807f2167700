//! Lexer for LookML source files.
//!
//! LookML is mostly `key: value` pairs and braces, with one wrinkle: fields
//! that hold SQL (`sql`, `sql_on`, `sql_table_name`, ...) take everything up
//! to the next `;;` verbatim. The lexer recognises those fields up front and
//! emits a single [`Token::Expr`] for them so the parser never has to look
//! inside SQL text.

use chumsky::prelude::*;

/// A token in a LookML document.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// A bare word: identifiers, enum values, numbers, dotted field refs.
    Word(&'src str),
    /// Contents of a double-quoted string.
    Str(&'src str),
    /// An expression field: key and the trimmed raw text before `;;`.
    Expr(&'src str, &'src str),

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
}

impl<'src> std::fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(w) => write!(f, "{}", w),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Expr(key, body) => write!(f, "{}: {} ;;", key, body),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
        }
    }
}

/// Returns true for keys whose value is raw SQL terminated by `;;`.
pub fn is_expression_key(key: &str) -> bool {
    key == "sql"
        || key == "html"
        || key == "expression"
        || key.starts_with("sql_")
        || key.ends_with("_sql")
}

/// Create the LookML lexer.
pub fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Token<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    // @{name} may appear inside a bare word
    let constant_ref = just("@{")
        .then(none_of('}').repeated())
        .then(just('}'))
        .ignored();

    // Anything that is not whitespace, punctuation, a quote or a comment start
    let word = constant_ref
        .or(none_of(" \t\r\n{}[],:;\"#").ignored())
        .repeated()
        .at_least(1)
        .to_slice();

    // sql_on: ${a.id} = ${b.a_id} ;;
    let expr = word
        .clone()
        .filter(|key: &&str| is_expression_key(key))
        .then_ignore(just(':').padded())
        .then(any().and_is(just(";;").not()).repeated().to_slice())
        .then_ignore(just(";;"))
        .map(|(key, body): (&str, &str)| Token::Expr(key, body.trim()));

    // Raw contents; `\"` and `\\` are unescaped by the parser
    let string_lit = just('"')
        .ignore_then(
            none_of("\\\"")
                .ignored()
                .or(just('\\').then(any()).ignored())
                .repeated()
                .to_slice(),
        )
        .then_ignore(just('"'))
        .map(Token::Str);

    let symbol = choice((
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just('[').to(Token::LBracket),
        just(']').to(Token::RBracket),
        just(',').to(Token::Comma),
        just(':').to(Token::Colon),
        just(';').to(Token::Semicolon),
    ));

    // # ... until newline
    let comment = just('#')
        .then(any().and_is(just('\n').not()).repeated())
        .ignored();

    // Expression fields must be tried before plain words
    let token = choice((expr, word.map(Token::Word), string_lit, symbol))
        .map_with(|tok, e| (tok, e.span()));

    token
        .padded_by(comment.padded().repeated())
        .padded()
        .repeated()
        .collect()
        .padded_by(comment.padded().repeated())
        .padded()
        .then_ignore(end())
}

/// Lex a source string into tokens.
///
/// Returns Ok with the token list on success, or Err with the lexer errors.
pub fn lex(source: &str) -> Result<Vec<(Token<'_>, SimpleSpan)>, Vec<Rich<'_, char>>> {
    let (tokens, errs) = lexer().parse(source).into_output_errors();
    if errs.is_empty() {
        Ok(tokens.unwrap_or_default())
    } else {
        Err(errs)
    }
}
