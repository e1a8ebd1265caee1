//! Straight-line composition of parsers.
//!
//! A routine is a state machine: it is handed the value of the parser it asked for last
//! (`None` on the first call) and answers with what to do next.
//! [`generate`] drives it in a loop, so a routine may ask for any number of parsers
//! without growing the stack.

use crate::parser::Parser;
use crate::step::{Furthest, Step};
use crate::stream::Stream;

/// What a routine wants next.
pub enum Next<'a, S: ?Sized, V, T> {
    /// Run this parser at the current position and hand its value back.
    Yield(Parser<'a, S, V>),
    /// Finish successfully with the value.
    Return(T),
    /// Finish by running this parser at the current position, its outcome becomes the result.
    Tail(Parser<'a, S, T>),
}

/// Builds a parser from a routine.
///
/// `factory` creates a fresh routine for every run, so no state leaks between parses.
/// The first failure of a yielded parser fails the whole, carrying the furthest
/// failure seen by all the steps before it.
///
/// # Examples
/// ```
///  use combit::generate::{generate, Next};
///  use combit::primitives::{literal, pattern};
///
///  // a length-prefixed word: `3:abc`
///  let counted = generate(|| {
///     let mut step = 0;
///     move |value: Option<String>| {
///         step += 1;
///         match (step, value) {
///             (1, _) => Next::Yield(pattern("[0-9]+").unwrap()),
///             (2, Some(n)) => Next::Yield(literal(":").result(n)),
///             (_, Some(n)) => match pattern(&format!(".{{{}}}", n)) {
///                 Ok(word) => Next::Tail(word),
///                 Err(_) => Next::Return(String::new()),
///             },
///             (_, None) => Next::Return(String::new()),
///         }
///     }
///  });
///
///  assert_eq!(counted.parse("3:abc"), Ok("abc".to_string()));
///  assert!(counted.parse("3:ab").is_err());
/// ```
///
/// Steps that produce different kinds of values share one enum:
/// ```
///  use combit::generate::{generate, Next};
///  use combit::primitives::{any_char, line_info, whitespace};
///
///  enum Part {
///     At((usize, usize)),
///     Char(char),
///  }
///
///  let located = generate(|| {
///     let mut step = 0;
///     let mut at = (0, 0);
///     move |value: Option<Part>| {
///         step += 1;
///         if let Some(Part::At(pos)) = &value {
///             at = *pos;
///         }
///         match (step, value) {
///             (1, _) => Next::Yield(line_info::<str>().map(Part::At)),
///             (2, _) => Next::Yield(any_char().map(Part::Char)),
///             (_, Some(Part::Char(c))) => Next::Return((at, c)),
///             _ => Next::Return((at, ' ')),
///         }
///     }
///  });
///
///  let chars = (whitespace().optional() >> located).many();
///  assert_eq!(chars.parse("a\n  b"), Ok(vec![((0, 0), 'a'), ((1, 2), 'b')]));
/// ```
pub fn generate<'a, S, V, T, F, R>(factory: F) -> Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        V: 'a,
        T: 'a,
        F: Fn() -> R + 'a,
        R: FnMut(Option<V>) -> Next<'a, S, V, T>,
{
    Parser::new(move |input: &S, start| {
        let mut routine = factory();
        let mut pos = start;
        let mut seen: Option<Furthest> = None;
        let mut last = None;
        loop {
            match routine(last.take()) {
                Next::Yield(parser) => match parser.run(input, pos) {
                    Step::Success(value, next, furthest) => {
                        seen = Furthest::merge(seen, furthest);
                        pos = next;
                        last = Some(value);
                    }
                    Step::Fail(failed_at, furthest) => return Step::Fail(failed_at, furthest.absorb(seen)),
                    Step::Error(e) => return Step::Error(e),
                },
                Next::Return(value) => return Step::Success(value, pos, seen),
                Next::Tail(parser) => return parser.run(input, pos).aggregate(seen),
            }
        }
    })
}

/// [`generate`] with a description for failures that happen before anything was consumed.
pub fn generate_desc<'a, S, V, T, F, R>(description: &str, factory: F) -> Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        V: 'a,
        T: 'a,
        F: Fn() -> R + 'a,
        R: FnMut(Option<V>) -> Next<'a, S, V, T>,
{
    generate(factory).desc(description)
}
