//! The crate provides parser combinators that run over text, bytes
//! or token streams produced by a `Logos` lexer.
//!
//! Parsers are plain values: they are built from [`primitives`], composed with the
//! methods of [`Parser`](parser::Parser) and the operators `|`, `>>`, `<<`, `+` and `*`,
//! and run with [`parse`](parser::Parser::parse) or [`parse_partial`](parser::Parser::parse_partial).
//! Alternation backtracks, and a failure reports the furthest position any branch reached
//! together with everything that was expected there.
//! Recursive grammars are tied with [`Forward`](forward::Forward),
//! longer rules can be written step by step with [`generate`](generate::generate).
//!
//! # Example
//!```
//!  use combit::forward::Forward;
//!  use combit::parser::Parser;
//!  use combit::primitives::{literal, pattern, whitespace};
//!
//!  #[derive(Debug, Clone, PartialEq)]
//!  enum Json {
//!     Null,
//!     Bool(bool),
//!     Number(f64),
//!     Str(String),
//!     Array(Vec<Json>),
//!  }
//!
//!  fn lexeme<'a, T: 'a>(p: Parser<'a, str, T>) -> Parser<'a, str, T> {
//!     p << whitespace().optional()
//!  }
//!
//!  let value: Forward<str, Json> = Forward::new();
//!
//!  let null = lexeme(literal("null")).result(Json::Null);
//!  let boolean = lexeme(literal("true")).result(Json::Bool(true))
//!     | lexeme(literal("false")).result(Json::Bool(false));
//!  let number = lexeme(pattern(r"-?[0-9]+(\.[0-9]+)?").unwrap())
//!     .map(|n| Json::Number(n.parse().unwrap_or_default()));
//!  let string = lexeme(pattern(r#""[^"]*""#).unwrap())
//!     .map(|s| Json::Str(s.trim_matches('"').to_string()));
//!  let array = (lexeme(literal("[")) >> value.parser().sep_by(lexeme(literal(","))) << lexeme(literal("]")))
//!     .map(Json::Array);
//!
//!  value.resolve((null | boolean | number | string | array).desc("a value")).unwrap();
//!
//!  assert_eq!(
//!     value.parse(r#"[1, "two", [true, null]]"#),
//!     Ok(Json::Array(vec![
//!         Json::Number(1.0),
//!         Json::Str("two".to_string()),
//!         Json::Array(vec![Json::Bool(true), Json::Null]),
//!     ]))
//!  );
//!  assert_eq!(
//!     value.parse("[1, ]").unwrap_err().to_string(),
//!     "expected 'a value' at 0:4"
//!  );
//! ```

#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ if false { let _ = format_args!($($arg)*); } }};
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {{ if false { let _ = format_args!($($arg)*); } }};
}

/// Runs parsers one after another and collects their values into a tuple.
///
/// # Example
/// ```
///  use combit::seq;
///  use combit::primitives::{digit, letter, literal};
///
///  let cell = seq!(letter(), digit(), literal("!").optional());
///  assert_eq!(cell.parse("a1"), Ok(('a', '1', None)));
///  assert_eq!(cell.parse("b2!"), Ok(('b', '2', Some("!".to_string()))));
/// ```
#[macro_export]
macro_rules! seq {
    ($($parser:expr),+ $(,)?) => {
        $crate::parser::Sequence::into_parser(($($parser,)+))
    };
}

pub mod stream;
pub mod step;
pub mod error;
pub mod parser;
pub mod primitives;
pub mod repeat;
pub mod generate;
pub mod forward;
pub mod lexer;
