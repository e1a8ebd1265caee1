use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{Add, BitOr, Mul, Shl, Shr};
use std::rc::Rc;
use crate::error::{Error, ParseError};
use crate::primitives::eof;
use crate::repeat::Bounds;
use crate::step::{Furthest, Step};
use crate::stream::{Position, Stream};

/// The base structure of the parser combinator.
///
/// A parser is a function from a stream and a start position to a [`Step`].
/// It holds no per-parse state so the same value can be cloned into many grammars
/// and run over many inputs. Cloning is cheap, the function itself is shared.
///
/// The usual way to build one is to start from [`primitives`](crate::primitives)
/// and compose them with the methods below or with the operators:
/// `|` (alternation), `>>` (keep the right value), `<<` (keep the left value),
/// `+` (concatenation of text or vectors) and `*` (repetition).
///
/// # Examples
/// ```
///  use combit::primitives::{literal, pattern};
///
///  let number = pattern(r"[0-9]+").unwrap().map(|s| s.parse::<u32>().unwrap());
///  let numbers = number.sep_by(literal(","));
///
///  assert_eq!(numbers.parse("1,2,3,4"), Ok(vec![1, 2, 3, 4]));
///  assert!(numbers.parse("1,2,3,").is_err());
///
///  let xy = literal("x") >> literal("y");
///  assert_eq!(xy.parse("xy"), Ok("y".to_string()));
///  assert_eq!(xy.parse("y").unwrap_err().to_string(), "expected 'x' at 0:0");
/// ```
pub struct Parser<'a, S: ?Sized, T> {
    run: Rc<dyn Fn(&S, usize) -> Step<T> + 'a>,
}

impl<'a, S: ?Sized, T> Clone for Parser<'a, S, T> {
    fn clone(&self) -> Self {
        Parser { run: Rc::clone(&self.run) }
    }
}

impl<'a, S, T> Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    /// Wraps a parsing function. This is the extension point for custom primitives.
    ///
    /// # Examples
    /// ```
    ///  use combit::parser::Parser;
    ///  use combit::step::Step;
    ///
    ///  // consumes everything till the end of the input
    ///  let rest: Parser<str, usize> = Parser::new(|input: &str, pos| Step::success(input.len() - pos, input.len()));
    ///  assert_eq!(rest.parse("abc"), Ok(3));
    /// ```
    pub fn new<F>(run: F) -> Self
        where
            F: Fn(&S, usize) -> Step<T> + 'a,
    {
        Parser { run: Rc::new(run) }
    }

    /// Runs the parser from the given position.
    pub fn run(&self, input: &S, pos: usize) -> Step<T> {
        (self.run)(input, pos)
    }

    /// Parses the whole input. Anything left unconsumed is a failure expecting `EOF`.
    pub fn parse(&self, input: &S) -> Result<T, Error> {
        self.clone()
            .skip(eof())
            .parse_partial(input)
            .map(|(value, _)| value)
    }

    /// Parses a prefix of the input and returns the value with the unconsumed rest.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::literal;
    ///
    ///  let ab = literal("a") + literal("b");
    ///  assert_eq!(ab.parse_partial("abcd"), Ok(("ab".to_string(), "cd")));
    /// ```
    pub fn parse_partial<'s>(&self, input: &'s S) -> Result<(T, &'s S), Error> {
        log_trace!("parse started on a stream of length {}", input.len());
        match self.run(input, 0) {
            Step::Success(value, pos, _) => {
                log_trace!("parse finished at {}", pos);
                Ok((value, input.rest(pos)))
            }
            Step::Fail(_, furthest) => {
                let error = ParseError::new(input.position(furthest.pos)?, furthest.expected);
                log_debug!("parse failed: {}", error);
                Err(error.into())
            }
            Step::Error(e) => {
                log_debug!("grammar error: {}", e);
                Err(e.into())
            }
        }
    }

    /// Runs the parser and hands its value to `f` to choose the next parser,
    /// which is run from where the first one stopped.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::{literal, pattern};
    ///
    ///  // a length-prefixed word
    ///  let word = pattern("[0-9]").unwrap()
    ///     .bind(|n| pattern(&format!("[a-z]{{{}}}", n)).unwrap());
    ///  assert_eq!(word.parse("3abc"), Ok("abc".to_string()));
    ///  assert!(word.parse("3ab").is_err());
    /// ```
    pub fn bind<U, F>(self, f: F) -> Parser<'a, S, U>
        where
            U: 'a,
            F: Fn(T) -> Parser<'a, S, U> + 'a,
    {
        Parser::new(move |input, pos| match self.run(input, pos) {
            Step::Success(v, next, seen) => f(v).run(input, next).aggregate(seen),
            Step::Fail(at, furthest) => Step::Fail(at, furthest),
            Step::Error(e) => Step::Error(e),
        })
    }

    pub fn map<U, F>(self, f: F) -> Parser<'a, S, U>
        where
            U: 'a,
            F: Fn(T) -> U + 'a,
    {
        Parser::new(move |input, pos| self.run(input, pos).map(&f))
    }

    /// Runs both parsers one after another and combines the values.
    pub fn then_combine<U, R, F>(self, other: Parser<'a, S, U>, combine: F) -> Parser<'a, S, R>
        where
            U: 'a,
            R: 'a,
            F: Fn(T, U) -> R + 'a,
    {
        Parser::new(move |input, pos| match self.run(input, pos) {
            Step::Success(l, next, seen) => other
                .run(input, next)
                .aggregate(seen)
                .map(|r| combine(l, r)),
            Step::Fail(at, furthest) => Step::Fail(at, furthest),
            Step::Error(e) => Step::Error(e),
        })
    }

    pub fn then_zip<U: 'a>(self, other: Parser<'a, S, U>) -> Parser<'a, S, (T, U)> {
        self.then_combine(other, |l, r| (l, r))
    }

    /// Keeps the value of `other`. The same as `self >> other`.
    pub fn then<U: 'a>(self, other: Parser<'a, S, U>) -> Parser<'a, S, U> {
        self.then_combine(other, |_, r| r)
    }

    /// Keeps the value of `self`. The same as `self << other`.
    pub fn skip<U: 'a>(self, other: Parser<'a, S, U>) -> Parser<'a, S, T> {
        self.then_combine(other, |l, _| l)
    }

    /// Replaces the value with a constant.
    pub fn result<U: Clone + 'a>(self, value: U) -> Parser<'a, S, U> {
        self.map(move |_| value.clone())
    }

    /// Tries `self`, then `other` from the same position. The same as `self | other`.
    pub fn or(self, other: Parser<'a, S, T>) -> Parser<'a, S, T> {
        alt(vec![self, other])
    }

    pub fn optional(self) -> Parser<'a, S, Option<T>> {
        self.map(Some).or(Parser::new(|_, pos| Step::success(None, pos)))
    }

    pub fn optional_or(self, default: T) -> Parser<'a, S, T>
        where
            T: Clone,
    {
        self.or(Parser::new(move |_, pos| Step::success(default.clone(), pos)))
    }

    /// Replaces what the parser reports as expected, but only when it fails
    /// without getting any further than its start. Deeper failures are kept as they are.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::{literal, satisfies};
    ///
    ///  let digit = satisfies::<str, _>(|c| c.is_ascii_digit(), "d").desc("a digit");
    ///  assert_eq!(digit.parse("x").unwrap_err().to_string(), "expected 'a digit' at 0:0");
    ///
    ///  let pair = (literal("(") >> literal(")")).desc("a pair");
    ///  assert_eq!(pair.parse("(x").unwrap_err().to_string(), "expected ')' at 0:1");
    /// ```
    pub fn desc<D: Into<String>>(self, description: D) -> Parser<'a, S, T> {
        let description = description.into();
        Parser::new(move |input, pos| match self.run(input, pos) {
            Step::Fail(_, furthest) if furthest.pos <= pos => Step::fail(pos, description.clone()),
            other => other,
        })
    }

    /// Reports the start and end positions along with the value.
    pub fn mark(self) -> Parser<'a, S, (Position, T, Position)> {
        Parser::new(move |input, pos| match self.run(input, pos) {
            Step::Success(v, next, seen) => match (input.position(pos), input.position(next)) {
                (Ok(start), Ok(end)) => Step::Success((start, v, end), next, seen),
                (Err(e), _) | (_, Err(e)) => Step::Error(e),
            },
            Step::Fail(at, furthest) => Step::Fail(at, furthest),
            Step::Error(e) => Step::Error(e),
        })
    }

    /// Runs the parser without moving forward on success.
    pub fn peek(self) -> Parser<'a, S, T> {
        Parser::new(move |input, pos| match self.run(input, pos) {
            Step::Success(v, _, seen) => Step::Success(v, pos, seen),
            other => other,
        })
    }

    /// Negative lookahead: succeeds without consuming exactly when `self` fails.
    ///
    /// # Examples
    /// ```
    ///  use combit::primitives::{digit, pattern};
    ///
    ///  let not_a_digit = digit().should_fail("not a digit") >> pattern(".*").unwrap();
    ///  assert_eq!(not_a_digit.parse("a10"), Ok("a10".to_string()));
    ///  assert_eq!(not_a_digit.parse("8").unwrap_err().to_string(), "expected 'not a digit' at 0:0");
    /// ```
    pub fn should_fail<D: Into<String>>(self, description: D) -> Parser<'a, S, ()> {
        let description = description.into();
        Parser::new(move |input, pos| match self.run(input, pos) {
            Step::Success(..) => Step::fail(pos, description.clone()),
            Step::Fail(..) => Step::success((), pos),
            Step::Error(e) => Step::Error(e),
        })
    }

    /// Pairs the value with a name, to be collected by [`seq_named`] style reducers.
    /// An empty name or a name starting with `_` marks a value to drop in `combine_named`.
    pub fn tag<N: Into<String>>(self, name: N) -> Parser<'a, S, (String, T)> {
        let name = name.into();
        self.map(move |v| (name.clone(), v))
    }

    /// Flattens a sequence of characters or chunks into one value.
    pub fn concat(self) -> Parser<'a, S, T::Output>
        where
            T: Concat,
            T::Output: 'a,
    {
        self.map(Concat::concat)
    }

    /// Logs every outcome under the given label when the `logging` feature is on.
    pub fn debug<L: Into<String>>(self, label: L) -> Parser<'a, S, T>
        where
            T: Debug,
    {
        let label = label.into();
        Parser::new(move |input, pos| self.run(input, pos).debug(&label))
    }
}

/// Tries the parsers in order from the same position and returns the first success.
///
/// When every branch fails, the failure reports the deepest position any branch reached
/// together with everything expected there.
///
/// # Examples
/// ```
///  use combit::parser::alt;
///  use combit::primitives::literal;
///
///  let abc = alt(vec![literal("a"), literal("b"), literal("c")]);
///  assert_eq!(abc.parse("b"), Ok("b".to_string()));
///  assert_eq!(abc.parse("d").unwrap_err().to_string(), "expected one of 'a', 'b', 'c' at 0:0");
/// ```
pub fn alt<'a, S, T, I>(parsers: I) -> Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
        I: IntoIterator<Item=Parser<'a, S, T>>,
{
    let parsers: Vec<_> = parsers.into_iter().collect();
    Parser::new(move |input, pos| {
        let mut seen = None;
        let mut failed_at = pos;
        for parser in parsers.iter() {
            match parser.run(input, pos).aggregate(seen) {
                Step::Fail(at, furthest) => {
                    failed_at = at;
                    seen = Some(furthest);
                }
                other => return other,
            }
        }
        Step::Fail(failed_at, seen.unwrap_or_else(|| Furthest::nothing(pos)))
    })
}

/// Runs the parsers one after another and collects their values.
/// See the [`seq!`](crate::seq) macro for parsers of different types.
pub fn seq<'a, S, T, I>(parsers: I) -> Parser<'a, S, Vec<T>>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
        I: IntoIterator<Item=Parser<'a, S, T>>,
{
    let parsers: Vec<_> = parsers.into_iter().collect();
    Parser::new(move |input, start| {
        let mut values = Vec::with_capacity(parsers.len());
        let mut pos = start;
        let mut seen = None;
        for parser in parsers.iter() {
            match parser.run(input, pos).aggregate(seen) {
                Step::Success(v, next, furthest) => {
                    values.push(v);
                    pos = next;
                    seen = furthest;
                }
                Step::Fail(at, furthest) => return Step::Fail(at, furthest),
                Step::Error(e) => return Step::Error(e),
            }
        }
        Step::Success(values, pos, seen)
    })
}

/// Runs the named parsers one after another and collects the values by name.
///
/// # Examples
/// ```
///  use combit::parser::seq_named;
///  use combit::primitives::{pattern, whitespace};
///
///  let name = seq_named(vec![
///     ("first", pattern(r"\S+").unwrap().skip(whitespace())),
///     ("last", pattern(r"\S+").unwrap()),
///  ]);
///  let parsed = name.parse("Jane Smith").unwrap();
///  assert_eq!(parsed["first"], "Jane");
///  assert_eq!(parsed["last"], "Smith");
/// ```
pub fn seq_named<'a, S, T, N, I>(parsers: I) -> Parser<'a, S, HashMap<String, T>>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
        N: Into<String>,
        I: IntoIterator<Item=(N, Parser<'a, S, T>)>,
{
    seq(parsers.into_iter().map(|(name, p)| p.tag(name))).to_map()
}

fn is_noise(name: &str) -> bool {
    name.is_empty() || name.starts_with('_')
}

impl<'a, S, L, R> Parser<'a, S, (L, R)>
    where
        S: Stream + ?Sized + 'a,
        L: 'a,
        R: 'a,
{
    /// Drops the right side of a pair.
    pub fn take_left(self) -> Parser<'a, S, L> {
        self.map(|(l, _)| l)
    }

    /// Drops the left side of a pair.
    pub fn take_right(self) -> Parser<'a, S, R> {
        self.map(|(_, r)| r)
    }
}

impl<'a, S, L> Parser<'a, S, (L, Vec<L>)>
    where
        S: Stream + ?Sized + 'a,
        L: 'a,
{
    /// Puts the head in front of the tail, for rules like `value (COMMA value)*`.
    pub fn merge(self) -> Parser<'a, S, Vec<L>> {
        self.map(|(h, mut rest)| {
            rest.insert(0, h);
            rest
        })
    }
}

impl<'a, S, K, V> Parser<'a, S, Vec<(K, V)>>
    where
        S: Stream + ?Sized + 'a,
        K: Eq + Hash + 'a,
        V: 'a,
{
    /// Collects pairs into a map. A later key wins over an earlier one.
    pub fn to_map(self) -> Parser<'a, S, HashMap<K, V>> {
        self.map(|r| r.into_iter().collect::<HashMap<_, _>>())
    }
}

impl<'a, S, T> Parser<'a, S, Vec<(String, T)>>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    /// Hands the tagged values to a constructor by name,
    /// dropping those tagged with an empty name or a name starting with `_`.
    pub fn combine_named<U, F>(self, constructor: F) -> Parser<'a, S, U>
        where
            U: 'a,
            F: Fn(HashMap<String, T>) -> U + 'a,
    {
        self.map(move |pairs| {
            constructor(pairs.into_iter().filter(|(k, _)| !is_noise(k)).collect())
        })
    }
}

impl<'a, S, T> Parser<'a, S, HashMap<String, T>>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    /// Hands the named values to a constructor,
    /// dropping those named with an empty name or a name starting with `_`.
    pub fn combine_named<U, F>(self, constructor: F) -> Parser<'a, S, U>
        where
            U: 'a,
            F: Fn(HashMap<String, T>) -> U + 'a,
    {
        self.map(move |mut named| {
            named.retain(|k, _| !is_noise(k));
            constructor(named)
        })
    }
}

impl<'a, S, T> Parser<'a, S, Vec<T>>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    /// Hands the collected values to `f`.
    pub fn combine<U, F>(self, f: F) -> Parser<'a, S, U>
        where
            U: 'a,
            F: Fn(Vec<T>) -> U + 'a,
    {
        self.map(f)
    }
}

macro_rules! impl_tuple_combine {
    ($($v:ident : $t:ident),+) => {
        impl<'a, S, $($t),+> Parser<'a, S, ($($t,)+)>
            where
                S: Stream + ?Sized + 'a,
                $($t: 'a),+
        {
            /// Hands the values of a sequence to `f` positionally.
            pub fn combine<U, F>(self, f: F) -> Parser<'a, S, U>
                where
                    U: 'a,
                    F: Fn($($t),+) -> U + 'a,
            {
                self.map(move |($($v,)+)| f($($v),+))
            }
        }
    };
}

impl_tuple_combine!(a: A, b: B);
impl_tuple_combine!(a: A, b: B, c: C);
impl_tuple_combine!(a: A, b: B, c: C, d: D);
impl_tuple_combine!(a: A, b: B, c: C, d: D, e: E);

/// A tuple of parsers run one after another, see [`seq!`](crate::seq).
pub trait Sequence<'a, S: ?Sized> {
    type Output;
    fn into_parser(self) -> Parser<'a, S, Self::Output>;
}

macro_rules! impl_sequence {
    ($($p:ident : $t:ident),+) => {
        impl<'a, S, $($t),+> Sequence<'a, S> for ($(Parser<'a, S, $t>,)+)
            where
                S: Stream + ?Sized + 'a,
                $($t: 'a),+
        {
            type Output = ($($t,)+);

            fn into_parser(self) -> Parser<'a, S, Self::Output> {
                let ($($p,)+) = self;
                Parser::new(move |input, start| {
                    let pos = start;
                    let seen = None;
                    $(
                        let ($p, pos, seen) = match $p.run(input, pos).aggregate(seen) {
                            Step::Success(v, next, furthest) => (v, next, furthest),
                            Step::Fail(at, furthest) => return Step::Fail(at, furthest),
                            Step::Error(e) => return Step::Error(e),
                        };
                    )+
                    Step::Success(($($p,)+), pos, seen)
                })
            }
        }
    };
}

impl_sequence!(a: A);
impl_sequence!(a: A, b: B);
impl_sequence!(a: A, b: B, c: C);
impl_sequence!(a: A, b: B, c: C, d: D);
impl_sequence!(a: A, b: B, c: C, d: D, e: E);
impl_sequence!(a: A, b: B, c: C, d: D, e: E, f: F);

/// Values that can be flattened into one, see [`Parser::concat`].
pub trait Concat {
    type Output;
    fn concat(self) -> Self::Output;
}

impl Concat for Vec<char> {
    type Output = String;
    fn concat(self) -> String {
        self.into_iter().collect()
    }
}

impl Concat for Vec<String> {
    type Output = String;
    fn concat(self) -> String {
        self.join("")
    }
}

impl Concat for Vec<u8> {
    type Output = Vec<u8>;
    fn concat(self) -> Vec<u8> {
        self
    }
}

impl<T> Concat for Vec<Vec<T>> {
    type Output = Vec<T>;
    fn concat(self) -> Vec<T> {
        self.into_iter().flatten().collect()
    }
}

impl<'a, S, T> BitOr for Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    type Output = Parser<'a, S, T>;

    fn bitor(self, rhs: Parser<'a, S, T>) -> Self::Output {
        self.or(rhs)
    }
}

impl<'a, S, T, U> Shr<Parser<'a, S, U>> for Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
        U: 'a,
{
    type Output = Parser<'a, S, U>;

    fn shr(self, rhs: Parser<'a, S, U>) -> Self::Output {
        self.then(rhs)
    }
}

impl<'a, S, T, U> Shl<Parser<'a, S, U>> for Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
        U: 'a,
{
    type Output = Parser<'a, S, T>;

    fn shl(self, rhs: Parser<'a, S, U>) -> Self::Output {
        self.skip(rhs)
    }
}

impl<'a, S> Add for Parser<'a, S, String>
    where
        S: Stream + ?Sized + 'a,
{
    type Output = Parser<'a, S, String>;

    fn add(self, rhs: Parser<'a, S, String>) -> Self::Output {
        self.then_combine(rhs, |l, r| l + &r)
    }
}

impl<'a, S, X> Add for Parser<'a, S, Vec<X>>
    where
        S: Stream + ?Sized + 'a,
        X: 'a,
{
    type Output = Parser<'a, S, Vec<X>>;

    fn add(self, rhs: Parser<'a, S, Vec<X>>) -> Self::Output {
        self.then_combine(rhs, |mut l, r| {
            l.extend(r);
            l
        })
    }
}

impl<'a, S, T, B> Mul<B> for Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
        B: Into<Bounds>,
{
    type Output = Parser<'a, S, Vec<T>>;

    fn mul(self, rhs: B) -> Self::Output {
        self.times(rhs)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use super::*;
    use crate::error::DefinitionError;
    use crate::primitives::{any_char, digit, fail, letter, literal, pattern, succeed, whitespace};
    use crate::test::parser_test::{expect, expect_pos, fail_on};

    #[test]
    fn bind_passes_value() {
        let piped = Rc::new(RefCell::new(String::new()));
        let sink = piped.clone();
        let parser = literal("x").bind(move |x| {
            sink.borrow_mut().push_str(&x);
            literal("y")
        });
        assert_eq!(parser.parse("xy"), Ok("y".to_string()));
        assert_eq!(piped.borrow().as_str(), "x");
        assert!(parser.parse("x").is_err());
    }

    #[test]
    fn map_round_trip() {
        let parser = literal("abc").map(|s| s.len());
        assert_eq!(parser.parse("abc"), Ok(3));
    }

    #[test]
    fn then_and_skip() {
        expect(
            (literal("x") >> literal("y")).run("xy", 0),
            "y".to_string(),
        );
        expect(
            (literal("x") << literal("y")).run("xy", 0),
            "x".to_string(),
        );
        expect_pos((literal("x") << literal("y")).run("xyz", 0), 2);
        fail_on((literal("x") >> literal("y")).run("xz", 0), 1);
    }

    #[test]
    fn alternation_is_left_biased() {
        let parser = literal("a").result(1) | pattern("a+").unwrap().result(2);
        assert_eq!(parser.parse_partial("aaa"), Ok((1, "aa")));
    }

    #[test]
    fn alternation_backtracks() {
        let parser = (literal("\\") >> literal("y")) | literal("z");
        assert_eq!(parser.parse("\\y"), Ok("y".to_string()));
        assert_eq!(parser.parse("z"), Ok("z".to_string()));
        let err = parser.parse("\\z").unwrap_err();
        assert_eq!(err.to_string(), "expected 'y' at 0:1");
    }

    #[test]
    fn empty_alternation_fails() {
        let parser: Parser<str, String> = alt(vec![]);
        assert_eq!(parser.parse("").unwrap_err().to_string(), "expected nothing at 0:0");
    }

    #[test]
    fn furthest_survives_backtracking() {
        // the first branch reaches position 2 before failing, the second fails at 0
        let parser = (literal("ab") + literal("c")) | literal("x");
        let err = parser.parse("abd").unwrap_err();
        assert_eq!(err.to_string(), "expected 'c' at 0:2");
    }

    #[test]
    fn furthest_reported_after_later_success() {
        let word = literal("a").many().concat() >> literal("!");
        let err = word.parse("aab").unwrap_err();
        assert_eq!(err.to_string(), "expected one of '!', 'a' at 0:2");
    }

    #[test]
    fn seq_collects() {
        assert_eq!(seq(Vec::<Parser<str, char>>::new()).parse(""), Ok(vec![]));
        assert_eq!(seq(vec![letter(), digit()]).parse("a1"), Ok(vec!['a', '1']));
        assert!(seq(vec![letter(), digit()]).parse("1a").is_err());
    }

    #[test]
    fn tuple_seq_and_combine() {
        let parser = crate::seq!(digit(), letter()).combine(|d, l| format!("{}{}", l, d));
        assert_eq!(parser.parse("1A"), Ok("A1".to_string()));
        let triple = crate::seq!(letter(), literal("-"), digit()).map(|(l, _, d)| (l, d));
        assert_eq!(triple.parse("x-9"), Ok(('x', '9')));
    }

    #[test]
    fn named_values() {
        #[derive(Debug, PartialEq)]
        struct Pair {
            word: String,
            number: u32,
        }
        let parser = seq(vec![
            pattern("[A-Z]+").unwrap().tag("word"),
            whitespace().tag("_whitespace"),
            pattern("[0-9]+").unwrap().tag("number"),
            pattern("!*").unwrap().tag(""),
        ])
            .combine_named(|mut named| Pair {
                word: named.remove("word").unwrap_or_default(),
                number: named.get("number").and_then(|n| n.parse().ok()).unwrap_or(0),
            });
        assert_eq!(
            parser.parse("ABC   123!"),
            Ok(Pair { word: "ABC".to_string(), number: 123 })
        );
    }

    #[test]
    fn named_map_drops_noise() {
        let parser = seq_named(vec![
            ("word", pattern("[a-z]+").unwrap()),
            ("_", whitespace()),
            ("rest", pattern(".*").unwrap()),
        ])
            .combine_named(|named| {
                let mut keys: Vec<String> = named.into_keys().collect();
                keys.sort();
                keys
            });
        assert_eq!(parser.parse("ab cd"), Ok(vec!["rest".to_string(), "word".to_string()]));
    }

    #[test]
    fn concat_chars() {
        let parser = letter().many().concat();
        assert_eq!(parser.parse(""), Ok(String::new()));
        assert_eq!(parser.parse("abc"), Ok("abc".to_string()));
    }

    #[test]
    fn add_and_multiply() {
        assert_eq!((letter().map(String::from) + digit().map(String::from)).parse("a1"), Ok("a1".to_string()));
        assert_eq!((letter() * 3).parse("abc"), Ok(vec!['a', 'b', 'c']));
        assert_eq!((letter() * (1..2)).parse("a"), Ok(vec!['a']));
        assert!((letter() * (1..2)).parse("aa").is_err());
    }

    #[test]
    fn optional_values() {
        let p = literal("a").optional();
        assert_eq!(p.parse("a"), Ok(Some("a".to_string())));
        assert_eq!(p.parse(""), Ok(None));
        let p = literal("a").optional_or("b".to_string());
        assert_eq!(p.parse(""), Ok("b".to_string()));
    }

    #[test]
    fn desc_masks_only_shallow_failures() {
        let thing = (literal("t") >> literal("h")).desc("a thing");
        let err = thing.parse("x").unwrap_err();
        assert_eq!(err.parse_error().map(|e| e.expects("a thing")), Some(true));
        assert_eq!(thing.parse("tx").unwrap_err().to_string(), "expected 'h' at 0:1");
    }

    #[test]
    fn mark_reports_positions() {
        let parser = (letter().many().mark() << literal("\n")).many();
        let lines = parser.parse("asdf\nqwer\n").unwrap();
        assert_eq!(lines.len(), 2);
        let (start, letters, end) = &lines[1];
        assert_eq!(start.line_col, Some((1, 0)));
        assert_eq!(letters, &vec!['q', 'w', 'e', 'r']);
        assert_eq!(end.line_col, Some((1, 4)));
    }

    #[test]
    fn peek_does_not_consume() {
        assert_eq!(any_char().peek().parse_partial("abc"), Ok(('a', "abc")));
        let err = digit().peek().parse("a").unwrap_err();
        assert_eq!(err.to_string(), "expected 'a digit' at 0:0");
    }

    #[test]
    fn should_fail_inverts() {
        let not_a_digit = digit().should_fail("not a digit") >> pattern(".*").unwrap();
        assert_eq!(not_a_digit.parse(""), Ok(String::new()));
        assert_eq!(not_a_digit.parse("abc"), Ok("abc".to_string()));
        assert!(not_a_digit.parse("8ab").is_err());
    }

    #[test]
    fn pairs_and_merge() {
        let list = letter()
            .then_zip((literal(",") >> letter()).many())
            .merge();
        assert_eq!(list.parse("a,b,c"), Ok(vec!['a', 'b', 'c']));
        let left = letter().then_zip(digit()).take_left();
        assert_eq!(left.parse("a1"), Ok('a'));
        let right = letter().then_zip(digit()).take_right();
        assert_eq!(right.parse("a1"), Ok('1'));
    }

    #[test]
    fn succeed_and_fail() {
        assert_eq!(succeed::<str, _>(7).parse(""), Ok(7));
        let never: Parser<str, ()> = fail("never");
        assert_eq!(never.parse("").unwrap_err().to_string(), "expected 'never' at 0:0");
    }

    #[test]
    fn definitional_error_escapes_alternation() {
        let broken: Parser<str, String> = Parser::new(|_, _| Step::Error(DefinitionError::Unresolved));
        let parser = broken | literal("a");
        assert_eq!(
            parser.parse("a"),
            Err(Error::Definition(DefinitionError::Unresolved))
        );
    }

    #[test]
    fn parsers_are_reusable() {
        let word = letter().many().concat();
        let twice = word.clone() << literal(" ");
        assert_eq!(twice.parse("ab "), Ok("ab".to_string()));
        assert_eq!(word.parse("cd"), Ok("cd".to_string()));
        assert_eq!(twice.parse("ef "), Ok("ef".to_string()));
    }
}
