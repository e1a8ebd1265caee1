use std::collections::BTreeSet;
use std::ops::Range;
use thiserror::Error;
use crate::stream::Position;

/// The input does not match the grammar.
///
/// It carries the furthest position any branch reached before failing
/// and the deduplicated, sorted descriptions of what was expected there.
///
/// # Examples
///
/// ```
/// use combit::primitives::literal;
/// use combit::error::Error;
///
///  let abc = literal("a") | literal("b") | literal("c");
///  match abc.parse("d") {
///     Err(Error::Parse(e)) => {
///         assert_eq!(e.to_string(), "expected one of 'a', 'b', 'c' at 0:0");
///         assert_eq!(e.offset(), 0);
///     }
///     other => panic!("unexpected {:?}", other),
///  }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {} at {}", render_expected(.expected), .position)]
pub struct ParseError {
    pub expected: BTreeSet<String>,
    pub position: Position,
}

impl ParseError {
    pub fn new(position: Position, expected: BTreeSet<String>) -> Self {
        ParseError { expected, position }
    }

    pub fn offset(&self) -> usize {
        self.position.offset
    }

    pub fn expects(&self, description: &str) -> bool {
        self.expected.contains(description)
    }
}

fn render_expected(expected: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = expected.iter().map(|e| format!("'{}'", e)).collect();
    match quoted.len() {
        0 => "nothing".to_string(),
        1 => quoted.join(""),
        _ => format!("one of {}", quoted.join(", ")),
    }
}

/// The grammar itself is misused.
///
/// These never describe the input and are never absorbed by alternation:
/// they travel up to the caller as soon as they happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A forward declaration was run before a parser was installed into it.
    #[error("forward declaration is used before it has been resolved")]
    Unresolved,
    /// A forward declaration can be resolved only once.
    #[error("forward declaration has already been resolved")]
    AlreadyResolved,
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("pattern {pattern:?} has no group {group}")]
    UnknownGroup { pattern: String, group: String },
    /// Line information was requested on a stream that has no lines.
    #[error("the stream has no line information")]
    NoLineInfo,
    #[error("position {pos} is out of a stream of length {len}")]
    OutOfRange { pos: usize, len: usize },
    /// An unbounded repetition succeeded without consuming anything and would never stop.
    #[error("unbounded repetition makes no progress at position {0}")]
    EmptyLoop(usize),
}

/// The result of a top-level `parse` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

impl Error {
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Definition(_) => None,
        }
    }
    pub fn is_definitional(&self) -> bool {
        matches!(self, Error::Definition(_))
    }
}

/// The lexer stumbled upon a slice no token matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("bad token {slice:?}, range: {span:?}")]
    BadToken { slice: String, span: Range<usize> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn render_single() {
        let e = ParseError::new(Position::new(1, Some((0, 1))), expected(&["b"]));
        assert_eq!(e.to_string(), "expected 'b' at 0:1");
    }

    #[test]
    fn render_many_sorted() {
        let e = ParseError::new(Position::new(1, None), expected(&["START/STOP", "EOF"]));
        assert_eq!(e.to_string(), "expected one of 'EOF', 'START/STOP' at 1");
    }

    #[test]
    fn render_nothing() {
        let e = ParseError::new(Position::new(0, Some((0, 0))), BTreeSet::new());
        assert_eq!(e.to_string(), "expected nothing at 0:0");
    }

    #[test]
    fn kinds_are_distinct() {
        let parse: Error = ParseError::new(Position::new(0, None), expected(&["x"])).into();
        let def: Error = DefinitionError::Unresolved.into();
        assert!(!parse.is_definitional());
        assert!(def.is_definitional());
        assert!(def.parse_error().is_none());
        assert_eq!(
            def.to_string(),
            "forward declaration is used before it has been resolved"
        );
    }
}
