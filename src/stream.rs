use std::fmt;
use std::fmt::Debug;
use crate::error::DefinitionError;

/// A resolved cursor into a stream.
///
/// `offset` is a byte offset for text, an index for bytes and tokens.
/// `line_col` is present only for text and holds zero-based `(line, column)`,
/// where the column is counted in characters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub offset: usize,
    pub line_col: Option<(usize, usize)>,
}

impl Position {
    pub fn new(offset: usize, line_col: Option<(usize, usize)>) -> Self {
        Position { offset, line_col }
    }
    pub fn line(&self) -> Option<usize> {
        self.line_col.map(|(l, _)| l)
    }
    pub fn column(&self) -> Option<usize> {
        self.line_col.map(|(_, c)| c)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_col {
            Some((line, column)) => write!(f, "{}:{}", line, column),
            None => write!(f, "{}", self.offset),
        }
    }
}

/// The input a parser runs against.
///
/// The same combinators work over text (`str`), bytes (`[u8]`) and any slice of tokens (`[T]`),
/// typically the output of [`tokenize`](crate::lexer::tokenize).
/// Positions are plain `usize` cursors: byte offsets for text, indexes otherwise.
///
/// # Examples
/// ```
///  use combit::stream::Stream;
///
///  let text = "ab\ncd";
///  assert_eq!(text.item_at(1), Some(('b', 2)));
///  assert_eq!(text.line_col(4), Ok(Some((1, 1))));
///
///  let tokens = [10, 20, 30];
///  assert_eq!(tokens[..].item_at(2), Some((30, 3)));
///  assert_eq!(tokens[..].line_col(2), Ok(None));
/// ```
pub trait Stream {
    /// A single element: `char` for text, `u8` for bytes, the token itself otherwise.
    type Item: Clone;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `pos` together with the position right after it.
    fn item_at(&self, pos: usize) -> Option<(Self::Item, usize)>;

    /// The unconsumed suffix starting from `pos`.
    fn rest(&self, pos: usize) -> &Self;

    /// A human readable form of an element, used as a default failure description.
    fn describe(item: &Self::Item) -> String;

    /// Zero-based line and column of `pos` or `None` if the stream has no notion of lines.
    /// A position past the end of the stream is a definitional error.
    fn line_col(&self, pos: usize) -> Result<Option<(usize, usize)>, DefinitionError>;

    fn position(&self, pos: usize) -> Result<Position, DefinitionError> {
        Ok(Position::new(pos, self.line_col(pos)?))
    }
}

impl Stream for str {
    type Item = char;

    fn len(&self) -> usize {
        str::len(self)
    }

    fn item_at(&self, pos: usize) -> Option<(char, usize)> {
        self.get(pos..)
            .and_then(|rest| rest.chars().next())
            .map(|c| (c, pos + c.len_utf8()))
    }

    fn rest(&self, pos: usize) -> &str {
        self.get(pos..).unwrap_or("")
    }

    fn describe(item: &char) -> String {
        item.to_string()
    }

    fn line_col(&self, pos: usize) -> Result<Option<(usize, usize)>, DefinitionError> {
        let before = self
            .get(..pos)
            .ok_or(DefinitionError::OutOfRange { pos, len: str::len(self) })?;
        let line = before.matches('\n').count();
        let column = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count(),
            None => before.chars().count(),
        };
        Ok(Some((line, column)))
    }
}

impl<T> Stream for [T]
    where T: Clone + Debug,
{
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn item_at(&self, pos: usize) -> Option<(T, usize)> {
        self.get(pos).map(|t| (t.clone(), pos + 1))
    }

    fn rest(&self, pos: usize) -> &[T] {
        self.get(pos..).unwrap_or(&[])
    }

    fn describe(item: &T) -> String {
        format!("{:?}", item)
    }

    fn line_col(&self, pos: usize) -> Result<Option<(usize, usize)>, DefinitionError> {
        if pos > <[T]>::len(self) {
            Err(DefinitionError::OutOfRange { pos, len: <[T]>::len(self) })
        } else {
            Ok(None)
        }
    }
}
