//! The repetition family: `times`, `many`, `at_least`, `at_most`, `sep_by` and `until`.
//!
//! Every loop here runs iteratively, so the number of repetitions is bounded only by the input.
//! An unbounded loop whose element succeeds without consuming anything is reported
//! as [`DefinitionError::EmptyLoop`] instead of spinning forever.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};
use crate::error::DefinitionError;
use crate::parser::Parser;
use crate::step::{Furthest, Step};
use crate::stream::Stream;

/// How many repetitions are acceptable. `max: None` means no upper limit.
///
/// Converts from a count (exactly that many) and from any `usize` range.
///
/// # Examples
/// ```
///  use combit::repeat::Bounds;
///
///  assert_eq!(Bounds::from(3), Bounds::new(3, Some(3)));
///  assert_eq!(Bounds::from(1..4), Bounds::new(1, Some(3)));
///  assert_eq!(Bounds::from(1..=4), Bounds::new(1, Some(4)));
///  assert_eq!(Bounds::from(2..), Bounds::new(2, None));
///  assert_eq!(Bounds::from(..), Bounds::new(0, None));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl Bounds {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        Bounds { min, max }
    }

    pub fn exactly(n: usize) -> Self {
        Bounds::new(n, Some(n))
    }

    pub fn at_least(n: usize) -> Self {
        Bounds::new(n, None)
    }

    pub fn at_most(n: usize) -> Self {
        Bounds::new(0, Some(n))
    }

    fn is_full(&self, count: usize) -> bool {
        self.max.map_or(false, |max| count >= max)
    }
}

impl From<usize> for Bounds {
    fn from(n: usize) -> Self {
        Bounds::exactly(n)
    }
}

impl From<Range<usize>> for Bounds {
    fn from(r: Range<usize>) -> Self {
        Bounds::new(r.start, Some(r.end.saturating_sub(1)))
    }
}

impl From<RangeInclusive<usize>> for Bounds {
    fn from(r: RangeInclusive<usize>) -> Self {
        Bounds::new(*r.start(), Some(*r.end()))
    }
}

impl From<RangeFrom<usize>> for Bounds {
    fn from(r: RangeFrom<usize>) -> Self {
        Bounds::at_least(r.start)
    }
}

impl From<RangeTo<usize>> for Bounds {
    fn from(r: RangeTo<usize>) -> Self {
        Bounds::at_most(r.end.saturating_sub(1))
    }
}

impl From<RangeToInclusive<usize>> for Bounds {
    fn from(r: RangeToInclusive<usize>) -> Self {
        Bounds::at_most(r.end)
    }
}

impl From<RangeFull> for Bounds {
    fn from(_: RangeFull) -> Self {
        Bounds::at_least(0)
    }
}

fn empty_loop<T>(pos: usize) -> Step<T> {
    log_debug!("repetition makes no progress at {}", pos);
    Step::Error(DefinitionError::EmptyLoop(pos))
}

fn nothing<'a, S, T>() -> Parser<'a, S, Vec<T>>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    Parser::new(|_: &S, pos| Step::success(Vec::new(), pos))
}

impl<'a, S, T> Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    /// Repeats the parser within the bounds.
    ///
    /// The first `min` repetitions are mandatory and a failure among them fails the whole.
    /// After that the loop stops silently at the first failure or once `max` is reached.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::literal;
    ///
    ///  let a = literal("a");
    ///  assert_eq!(a.clone().times(2).parse("aa").map(|v| v.len()), Ok(2));
    ///  assert!(a.clone().times(2).parse("a").is_err());
    ///  assert_eq!(a.clone().times(1..=3).parse_partial("aaaa").map(|(v, rest)| (v.len(), rest)), Ok((3, "a")));
    ///  assert_eq!((a * 2).parse("aa").map(|v| v.concat()), Ok("aa".to_string()));
    /// ```
    pub fn times<B: Into<Bounds>>(self, bounds: B) -> Parser<'a, S, Vec<T>> {
        let bounds = bounds.into();
        Parser::new(move |input: &S, start| {
            let mut values = Vec::new();
            let mut pos = start;
            let mut seen: Option<Furthest> = None;
            while !bounds.is_full(values.len()) {
                match self.run(input, pos) {
                    Step::Success(v, next, furthest) => {
                        if next == pos && bounds.max.is_none() && values.len() >= bounds.min {
                            return empty_loop(pos);
                        }
                        seen = Furthest::merge(seen, furthest);
                        values.push(v);
                        pos = next;
                    }
                    Step::Fail(failed_at, furthest) => {
                        if values.len() < bounds.min {
                            return Step::Fail(failed_at, furthest.absorb(seen));
                        }
                        seen = Furthest::merge(seen, Some(furthest));
                        break;
                    }
                    Step::Error(e) => return Step::Error(e),
                }
            }
            if values.len() < bounds.min {
                return Step::fail(pos, format!("at least {} items", bounds.min)).aggregate(seen);
            }
            Step::Success(values, pos, seen)
        })
    }

    /// Zero or more repetitions. Never fails on the input alone.
    pub fn many(self) -> Parser<'a, S, Vec<T>> {
        self.times(Bounds::at_least(0))
    }

    pub fn at_least(self, n: usize) -> Parser<'a, S, Vec<T>> {
        self.times(Bounds::at_least(n))
    }

    pub fn at_most(self, n: usize) -> Parser<'a, S, Vec<T>> {
        self.times(Bounds::at_most(n))
    }

    /// Zero or more occurrences separated by `separator`. The separator values are dropped.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::{literal, pattern};
    ///
    ///  let numbers = pattern("[0-9]+").unwrap().sep_by(literal(","));
    ///  assert_eq!(numbers.parse("1,22,3"), Ok(vec!["1".to_string(), "22".to_string(), "3".to_string()]));
    ///  assert_eq!(numbers.parse(""), Ok(vec![]));
    ///  assert!(numbers.parse("1,").is_err());
    /// ```
    pub fn sep_by<U: 'a>(self, separator: Parser<'a, S, U>) -> Parser<'a, S, Vec<T>> {
        self.sep_by_bounded(separator, Bounds::at_least(0))
    }

    /// Occurrences separated by `separator`, as many as the bounds allow.
    pub fn sep_by_bounded<U, B>(self, separator: Parser<'a, S, U>, bounds: B) -> Parser<'a, S, Vec<T>>
        where
            U: 'a,
            B: Into<Bounds>,
    {
        let bounds = bounds.into();
        if bounds.max == Some(0) {
            return nothing();
        }
        let tail = Bounds::new(
            bounds.min.saturating_sub(1),
            bounds.max.map(|max| max - 1),
        );
        let items = self
            .clone()
            .then_zip(separator.then(self).times(tail))
            .merge();
        if bounds.min == 0 {
            items.or(nothing())
        } else {
            items
        }
    }

    /// Repeats the parser until `terminator` matches, leaving the terminator unconsumed.
    ///
    /// The terminator is tried as a lookahead before every repetition.
    /// When the parser then fails, the failure names both what the parser
    /// and what the terminator expected.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::{any_char, literal};
    ///
    ///  let body = any_char().until(literal("*/")).concat();
    ///  assert_eq!(body.parse_partial("abc*/d"), Ok(("abc".to_string(), "*/d")));
    ///  assert!(body.parse("abc").is_err());
    /// ```
    pub fn until<U: 'a>(self, terminator: Parser<'a, S, U>) -> Parser<'a, S, Vec<T>> {
        self.until_bounded(terminator, Bounds::at_least(0))
    }

    /// [`until`](Parser::until) with bounds on the number of repetitions.
    /// Too few fails with `at least {min} items; got {n} item(s)`,
    /// too many with `at most {max} items`.
    pub fn until_bounded<U, B>(self, terminator: Parser<'a, S, U>, bounds: B) -> Parser<'a, S, Vec<T>>
        where
            U: 'a,
            B: Into<Bounds>,
    {
        repeat_until(self, terminator, bounds.into(), |_| None)
    }

    /// [`until_bounded`](Parser::until_bounded) that consumes the terminator
    /// and appends its value to the result.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::{letter, char_from};
    ///
    ///  let word = letter().until_consume(char_from(".!"), 1..).concat();
    ///  assert_eq!(word.parse_partial("hey!?"), Ok(("hey!".to_string(), "?")));
    /// ```
    pub fn until_consume<B>(self, terminator: Parser<'a, S, T>, bounds: B) -> Parser<'a, S, Vec<T>>
        where
            B: Into<Bounds>,
    {
        repeat_until(self, terminator, bounds.into(), Some)
    }
}

fn repeat_until<'a, S, T, U, K>(
    parser: Parser<'a, S, T>,
    terminator: Parser<'a, S, U>,
    bounds: Bounds,
    keep: K,
) -> Parser<'a, S, Vec<T>>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
        U: 'a,
        K: Fn(U) -> Option<T> + 'a,
{
    Parser::new(move |input: &S, start| {
        let mut values = Vec::new();
        let mut pos = start;
        let mut seen: Option<Furthest> = None;
        loop {
            let stop = match terminator.run(input, pos) {
                Step::Success(u, next, furthest) if values.len() >= bounds.min => {
                    seen = Furthest::merge(seen, furthest);
                    if let Some(t) = keep(u) {
                        values.push(t);
                        pos = next;
                    }
                    return Step::Success(values, pos, seen);
                }
                Step::Success(..) => None,
                Step::Fail(_, furthest) => Some(furthest),
                Step::Error(e) => return Step::Error(e),
            };
            if let Some(max) = bounds.max.filter(|max| values.len() >= *max) {
                return Step::fail(pos, format!("at most {} items", max));
            }
            match parser.run(input, pos) {
                Step::Success(v, next, furthest) => {
                    if next == pos && bounds.max.is_none() && values.len() >= bounds.min {
                        return empty_loop(pos);
                    }
                    seen = Furthest::merge(seen, furthest);
                    values.push(v);
                    pos = next;
                }
                Step::Fail(failed_at, furthest) if values.len() >= bounds.min => {
                    return Step::Fail(failed_at, furthest.absorb(stop).absorb(seen));
                }
                Step::Fail(..) => {
                    return Step::fail(
                        pos,
                        format!("at least {} items; got {} item(s)", bounds.min, values.len()),
                    );
                }
                Step::Error(e) => return Step::Error(e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::primitives::{any_char, char_from, digit, eof, index, letter, literal, pattern, succeed};
    use crate::test::parser_test::{expect, expect_error, expect_pos, fail_on};

    fn count<T>(r: Result<Vec<T>, Error>) -> Result<usize, Error> {
        r.map(|v| v.len())
    }

    #[test]
    fn many_never_fails() {
        let a = literal("a").many();
        assert_eq!(count(a.parse("")), Ok(0));
        assert_eq!(count(a.parse("aaa")), Ok(3));
        assert_eq!(a.parse_partial("b").map(|(v, rest)| (v.len(), rest)), Ok((0, "b")));
        expect_pos(a.run("aab", 0), 2);
    }

    #[test]
    fn times_exact() {
        let ab = letter().times(2).concat();
        assert_eq!(ab.parse("ab"), Ok("ab".to_string()));
        assert!(ab.parse("a").is_err());
        assert!(ab.parse("abc").is_err());
    }

    #[test]
    fn times_range() {
        let a = literal("a").times(1..=2);
        assert_eq!(count(a.parse("a")), Ok(1));
        assert_eq!(count(a.parse("aa")), Ok(2));
        assert!(a.parse("").is_err());
        assert!(a.parse("aaa").is_err());
        fail_on(a.run("b", 0), 0);
    }

    #[test]
    fn times_empty_range_fails() {
        let a = literal("a").times(Bounds::new(2, Some(1)));
        let err = a.parse("aa").unwrap_err();
        assert!(err.to_string().contains("at least 2 items"), "{}", err);
    }

    #[test]
    fn at_least_and_at_most() {
        let a = literal("a");
        assert!(a.clone().at_least(2).parse("a").is_err());
        assert_eq!(count(a.clone().at_least(2).parse("aaaa")), Ok(4));
        assert_eq!(count(a.clone().at_most(2).parse("")), Ok(0));
        assert!(a.at_most(2).parse("aaa").is_err());
    }

    #[test]
    fn repetition_keeps_furthest() {
        let digits = (literal("1") + literal("2")).many();
        let err = digits.parse("121x").unwrap_err();
        assert_eq!(err.to_string(), "expected '2' at 0:3");
    }

    #[test]
    fn long_repetition_is_iterative() {
        let input = "a".repeat(100_000);
        assert_eq!(count(any_char().many().parse(&input)), Ok(100_000));
        assert_eq!(count(any_char().until(eof()).parse(&input)), Ok(100_000));
    }

    #[test]
    fn zero_width_loop_is_rejected() {
        expect_error(succeed::<str, _>(1).many().run("abc", 0));
        expect_error(index::<str>().at_least(2).run("", 0));
        expect_error(literal("").sep_by(literal("")).run("x", 0));
        expect_error(succeed::<str, _>('x').until(literal("!")).run("ab", 0));
        // bounded loops are allowed to spin to their bound
        expect(succeed::<str, _>(1).times(3).run("", 0), vec![1, 1, 1]);
        assert_eq!(
            succeed::<str, _>(0).many().parse(""),
            Err(Error::Definition(DefinitionError::EmptyLoop(0)))
        );
    }

    #[test]
    fn sep_by_variants() {
        let n = digit();
        let comma = literal(",");
        let any = n.clone().sep_by(comma.clone());
        assert_eq!(any.parse("1,2,3"), Ok(vec!['1', '2', '3']));
        assert_eq!(any.parse(""), Ok(vec![]));

        let two_or_three = n.clone().sep_by_bounded(comma.clone(), 2..=3);
        assert!(two_or_three.parse("1").is_err());
        assert_eq!(two_or_three.parse("1,2"), Ok(vec!['1', '2']));
        assert!(two_or_three.parse("1,2,3,4").is_err());

        let none = n.clone().sep_by_bounded(comma.clone(), 0..=0);
        assert_eq!(none.parse(""), Ok(vec![]));
        assert!(none.parse("1").is_err());

        let some = n.sep_by_bounded(comma, 1..);
        assert!(some.parse("").is_err());
        assert_eq!(some.parse("7"), Ok(vec!['7']));
    }

    #[test]
    fn sep_by_trailing_separator() {
        let numbers = pattern("[0-9]+").unwrap().map(|s| s.parse::<u32>().unwrap()).sep_by(literal(","));
        assert_eq!(numbers.parse("1,2,3,4"), Ok(vec![1, 2, 3, 4]));
        let err = numbers.parse("1,2,3,").unwrap_err();
        let parse = err.parse_error().unwrap();
        assert_eq!(parse.offset(), 6);
        assert!(parse.expects("[0-9]+"));
    }

    #[test]
    fn until_bounds() {
        let s = literal("s").until_bounded(literal("x"), 3..=5);
        assert_eq!(
            s.parse_partial("ssx").unwrap_err().to_string(),
            "expected 'at least 3 items; got 2 item(s)' at 0:2"
        );
        assert_eq!(
            s.parse_partial("sssssssx").unwrap_err().to_string(),
            "expected 'at most 5 items' at 0:5"
        );
        assert_eq!(count(s.parse_partial("sssx").map(|(v, _)| v)), Ok(3));
        assert_eq!(s.parse_partial("ssssx").map(|(v, rest)| (v.len(), rest)), Ok((4, "x")));
    }

    #[test]
    fn until_reports_both_expectations() {
        let word = letter().until(literal(";"));
        assert_eq!(
            word.parse("ab1").unwrap_err().to_string(),
            "expected one of ';', 'a letter' at 0:2"
        );
    }

    #[test]
    fn until_terminator_below_min_is_content() {
        let xs = any_char().until_bounded(literal("x"), 2..);
        assert_eq!(xs.parse_partial("xxxy"), Ok((vec!['x', 'x'], "xy")));
    }

    #[test]
    fn until_consume_appends() {
        let quoted = literal("\"") >> any_char().until_consume(char_from("\""), ..);
        assert_eq!(quoted.concat().parse("\"ab\""), Ok("ab\"".to_string()));
    }
}
