//! LookML source dialect: lexer, parser, document tree and writer.
//!
//! Parsing produces an untyped [`Node`] tree. The loader merges trees from
//! included files and substitutes constants before typed model values are
//! decoded, and the writer renders typed views and explores back to LookML.
//!
//! # Example
//!
//! ```ignore
//! use lkml2cube::lookml;
//!
//! let result = lookml::parse(r#"
//!     view: orders {
//!       sql_table_name: public.orders ;;
//!       dimension: id { type: number sql: ${TABLE}.id ;; }
//!     }
//! "#);
//! assert!(result.is_ok());
//! ```

pub mod lexer;
pub mod node;
pub mod parser;
pub mod writer;

pub use node::Node;

use std::ops::Range;

/// Result of parsing a LookML source.
#[derive(Debug)]
pub struct ParseResult {
    /// The parsed document, if parsing succeeded.
    pub document: Option<Node>,
    /// Parse errors with their source spans.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseResult {
    /// Returns true if parsing succeeded without errors.
    pub fn is_ok(&self) -> bool {
        self.document.is_some() && self.diagnostics.is_empty()
    }

    /// All diagnostics joined into one message, for error reporting.
    pub fn message(&self) -> String {
        self.diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A parse error with source location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Byte range in the source where the error applies.
    pub span: Range<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(span: Range<usize>, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at {:?})", self.message, self.span)
    }
}

impl std::error::Error for Diagnostic {}

/// Parse a LookML source string.
pub fn parse(source: &str) -> ParseResult {
    use chumsky::error::Rich;
    use chumsky::input::Input;
    use chumsky::span::SimpleSpan;
    use chumsky::span::Span as _;
    use chumsky::Parser as _;

    let (tokens, lex_errs) = lexer::lexer().parse(source).into_output_errors();

    let mut diagnostics: Vec<Diagnostic> = lex_errs
        .into_iter()
        .map(|e: Rich<'_, char>| {
            let span = e.span();
            Diagnostic::new(span.start()..span.end(), e.to_string())
        })
        .collect();

    let tokens: Vec<(lexer::Token<'_>, SimpleSpan)> = match tokens {
        Some(t) if diagnostics.is_empty() => t,
        _ => {
            return ParseResult {
                document: None,
                diagnostics,
            };
        }
    };

    let len = source.len();
    let eoi: SimpleSpan = (len..len).into();
    let token_stream = tokens.as_slice().map(
        eoi,
        |(tok, span): &(lexer::Token<'_>, SimpleSpan)| (tok, span),
    );

    let (document, parse_errs) = parser::parser().parse(token_stream).into_output_errors();

    diagnostics.extend(
        parse_errs
            .into_iter()
            .map(|e: Rich<'_, lexer::Token<'_>, SimpleSpan>| {
                let span = e.span();
                Diagnostic::new(span.start()..span.end(), e.to_string())
            }),
    );

    ParseResult {
        document,
        diagnostics,
    }
}

/// Parse a LookML file.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be read.
pub fn parse_file(path: &std::path::Path) -> std::io::Result<ParseResult> {
    let source = std::fs::read_to_string(path)?;
    Ok(parse(&source))
}
