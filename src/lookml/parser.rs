//! Parser for LookML using chumsky.
//!
//! Transforms the token stream from the lexer into a [`Node`] tree. Repeated
//! block keys (`view`, `dimension`, `join`, ...) are gathered into plural
//! sequences (`views`, `dimensions`, `joins`, ...) and a named block stores
//! its name under `name`, which is the shape every later stage expects.

use chumsky::input::ValueInput;
use chumsky::prelude::*;

use super::lexer::Token;
use super::node::Node;

/// Keys that may appear more than once in a block, with their plural form.
const REPEATABLE_KEYS: &[(&str, &str)] = &[
    ("view", "views"),
    ("explore", "explores"),
    ("dimension", "dimensions"),
    ("dimension_group", "dimension_groups"),
    ("measure", "measures"),
    ("join", "joins"),
    ("filter", "filters"),
    ("parameter", "parameters"),
    ("set", "sets"),
    ("include", "includes"),
    ("constant", "constants"),
    ("datagroup", "datagroups"),
];

/// Plural key for a repeatable key, if it is one.
pub fn plural_key(key: &str) -> Option<&'static str> {
    REPEATABLE_KEYS
        .iter()
        .find(|(singular, _)| *singular == key)
        .map(|(_, plural)| *plural)
}

/// A `key: value` entry as written in the source.
#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: Value,
}

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    List(Vec<Node>),
    Block {
        name: Option<String>,
        entries: Vec<Entry>,
    },
}

/// Create the LookML parser.
///
/// The parser is generic over the input type, accepting any `ValueInput`
/// that produces `Token` values with `SimpleSpan` spans.
pub fn parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, Node, extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    let word = select! {
        Token::Word(w) => w.to_string(),
    }
    .labelled("identifier");

    let string_lit = select! {
        Token::Str(s) => unescape(s),
    }
    .labelled("string literal");

    let expr = select! {
        Token::Expr(key, body) => (key.to_string(), body.to_string()),
    }
    .labelled("sql expression");

    // status: "complete" inside a list, as in measure filters
    let list_pair = word
        .clone()
        .then_ignore(just(Token::Colon))
        .then(string_lit.clone().or(word.clone()))
        .map(|(key, value)| Node::Mapping(vec![(key, Node::Scalar(value))]));

    // [a, b, "c"] or [field: "value", ...]
    let list = list_pair
        .or(word.clone().or(string_lit.clone()).map(Node::Scalar))
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LBracket), just(Token::RBracket));

    let entries = recursive(|entries| {
        let block = entries.delimited_by(just(Token::LBrace), just(Token::RBrace));

        let value = choice((
            word.clone()
                .then(block.clone())
                .map(|(name, entries)| Value::Block {
                    name: Some(name),
                    entries,
                }),
            block.map(|entries| Value::Block {
                name: None,
                entries,
            }),
            list.map(Value::List),
            string_lit.clone().map(Value::Scalar),
            word.clone().map(Value::Scalar),
        ));

        // key: value, where the colon may be left out (`view orders { }`)
        let pair = word
            .clone()
            .then_ignore(just(Token::Colon).or_not())
            .then(value)
            .map(|(key, value)| Entry { key, value });

        let expr_pair = expr.map(|(key, sql)| Entry {
            key,
            value: Value::Scalar(sql),
        });

        choice((expr_pair, pair))
            .then_ignore(just(Token::Semicolon).repeated())
            .repeated()
            .collect::<Vec<_>>()
    });

    entries.map(build_mapping)
}

/// Undo `\x` escapes inside a string literal.
fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}

/// Fold source entries into a mapping node, pluralising repeatable keys.
fn build_mapping(entries: Vec<Entry>) -> Node {
    let mut mapping = Node::mapping();
    for Entry { key, value } in entries {
        let node = match value {
            Value::Scalar(s) => Node::Scalar(s),
            Value::List(items) => Node::Sequence(items),
            Value::Block { name, entries } => {
                let body = build_mapping(entries);
                match name {
                    Some(name) => {
                        let mut named = Node::Mapping(vec![("name".to_string(), Node::Scalar(name))]);
                        if let Node::Mapping(fields) = body {
                            for (k, v) in fields {
                                named.insert(k, v);
                            }
                        }
                        named
                    }
                    None => body,
                }
            }
        };

        match plural_key(&key) {
            Some(plural) => mapping.push_to(plural, node),
            None => mapping.insert(key, node),
        }
    }
    mapping
}
