//! The leaves of every grammar: literals, patterns, single elements and stream queries.
//!
//! Text parsers work over `str`, byte parsers over `[u8]` and the generic ones
//! ([`satisfies`], [`match_one`], [`eof`], [`index`], ...) over any [`Stream`].

use std::fmt;
use std::fmt::Debug;
use std::rc::Rc;
use regex_automata::meta::Regex;
use regex_automata::util::captures::Captures;
use regex_automata::util::syntax;
use regex_automata::{Anchored, Input, PatternID};
use crate::error::DefinitionError;
use crate::parser::{alt, Parser};
use crate::step::Step;
use crate::stream::{Position, Stream};

/// Always succeeds with the value and consumes nothing.
pub fn succeed<'a, S, T>(value: T) -> Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: Clone + 'a,
{
    Parser::new(move |_: &S, pos| Step::success(value.clone(), pos))
}

/// Always fails at the current position expecting `description`.
pub fn fail<'a, S, T>(description: &str) -> Parser<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    let description = description.to_string();
    Parser::new(move |_: &S, pos| Step::fail(pos, description.clone()))
}

/// Succeeds only at the end of the stream.
pub fn eof<'a, S>() -> Parser<'a, S, ()>
    where
        S: Stream + ?Sized + 'a,
{
    Parser::new(|input: &S, pos| {
        if pos >= input.len() {
            Step::success((), pos)
        } else {
            Step::fail(pos, "EOF")
        }
    })
}

/// The current position as a plain offset.
pub fn index<'a, S>() -> Parser<'a, S, usize>
    where
        S: Stream + ?Sized + 'a,
{
    Parser::new(|_: &S, pos| Step::success(pos, pos))
}

/// The current position with line and column when the stream has them.
pub fn position<'a, S>() -> Parser<'a, S, Position>
    where
        S: Stream + ?Sized + 'a,
{
    Parser::new(|input: &S, pos| match input.position(pos) {
        Ok(p) => Step::success(p, pos),
        Err(e) => Step::Error(e),
    })
}

/// The current zero-based `(line, column)`.
/// Running it over a stream without lines is a definitional error.
///
/// # Examples
/// ```
///  use combit::primitives::{any_char, line_info};
///
///  let located = line_info().then_zip(any_char()).many();
///  assert_eq!(
///     located.parse("A\nB"),
///     Ok(vec![((0, 0), 'A'), ((0, 1), '\n'), ((1, 0), 'B')])
///  );
/// ```
pub fn line_info<'a, S>() -> Parser<'a, S, (usize, usize)>
    where
        S: Stream + ?Sized + 'a,
{
    Parser::new(|input: &S, pos| match input.line_col(pos) {
        Ok(Some(line_col)) => Step::success(line_col, pos),
        Ok(None) => Step::Error(DefinitionError::NoLineInfo),
        Err(e) => Step::Error(e),
    })
}

/// Matches one element of the stream for which the predicate holds.
///
/// # Examples
/// ```
///  use combit::primitives::satisfies;
///
///  #[derive(Debug, Clone, PartialEq)]
///  enum Tok { Start, Word(String), Stop }
///
///  let word = satisfies::<[Tok], _>(|t| matches!(t, Tok::Word(_)), "a word");
///  let stream = vec![Tok::Word("hi".to_string())];
///  assert_eq!(word.parse(&stream), Ok(Tok::Word("hi".to_string())));
///  assert_eq!(word.parse(&[Tok::Stop]).unwrap_err().to_string(), "expected 'a word' at 0");
/// ```
pub fn satisfies<'a, S, F>(predicate: F, description: &str) -> Parser<'a, S, S::Item>
    where
        S: Stream + ?Sized + 'a,
        S::Item: 'a,
        F: Fn(&S::Item) -> bool + 'a,
{
    let description = description.to_string();
    Parser::new(move |input: &S, pos| match input.item_at(pos) {
        Some((item, next)) if predicate(&item) => Step::success(item, next),
        _ => Step::fail(pos, description.clone()),
    })
}

/// Matches exactly one element equal to `item`, described by the element itself.
pub fn match_one<'a, S>(item: S::Item) -> Parser<'a, S, S::Item>
    where
        S: Stream + ?Sized + 'a,
        S::Item: PartialEq + 'a,
{
    let description = S::describe(&item);
    match_one_desc(item, &description)
}

/// Matches exactly one element equal to `item`.
pub fn match_one_desc<'a, S>(item: S::Item, description: &str) -> Parser<'a, S, S::Item>
    where
        S: Stream + ?Sized + 'a,
        S::Item: PartialEq + 'a,
{
    satisfies(move |candidate: &S::Item| *candidate == item, description)
}

/// Matches the exact text.
pub fn literal<'a>(text: &str) -> Parser<'a, str, String> {
    let text = text.to_string();
    Parser::new(move |input: &str, pos| {
        let end = pos + text.len();
        match input.get(pos..end) {
            Some(candidate) if candidate == text => Step::success(candidate.to_string(), end),
            _ => Step::fail(pos, text.clone()),
        }
    })
}

/// Matches the text after normalizing both sides with `transform`.
/// The value is the slice of the input that matched.
///
/// # Examples
/// ```
///  use combit::primitives::literal_with;
///
///  let cat = literal_with("Cat", |s| s.to_lowercase());
///  assert_eq!(cat.parse("CaT"), Ok("CaT".to_string()));
///  assert!(cat.parse("dog").is_err());
/// ```
pub fn literal_with<'a, F>(text: &str, transform: F) -> Parser<'a, str, String>
    where
        F: Fn(&str) -> String + 'a,
{
    let text = text.to_string();
    let expected = transform(&text);
    let width = text.chars().count();
    Parser::new(move |input: &str, pos| {
        // the input spelling may differ in byte length, so take as many characters
        let rest = input.rest(pos);
        let len = rest.char_indices().nth(width).map_or(rest.len(), |(i, _)| i);
        let candidate = &rest[..len];
        if transform(candidate) == expected {
            Step::success(candidate.to_string(), pos + len)
        } else {
            Step::fail(pos, text.clone())
        }
    })
}

fn describe_bytes(bytes: &[u8]) -> String {
    bytes.escape_ascii().to_string()
}

/// Matches the exact bytes.
pub fn bytes_literal<'a>(bytes: &[u8]) -> Parser<'a, [u8], Vec<u8>> {
    bytes_literal_with(bytes, |b| b.to_vec())
}

/// Matches the bytes after normalizing both sides with `transform`.
pub fn bytes_literal_with<'a, F>(bytes: &[u8], transform: F) -> Parser<'a, [u8], Vec<u8>>
    where
        F: Fn(&[u8]) -> Vec<u8> + 'a,
{
    let bytes = bytes.to_vec();
    let expected = transform(&bytes);
    let description = describe_bytes(&bytes);
    Parser::new(move |input: &[u8], pos| {
        let end = pos + bytes.len();
        match input.get(pos..end) {
            Some(candidate) if transform(candidate) == expected => {
                Step::success(candidate.to_vec(), end)
            }
            _ => Step::fail(pos, description.clone()),
        }
    })
}

/// Matches the exact run of tokens.
pub fn literal_tokens<'a, T>(tokens: &[T]) -> Parser<'a, [T], Vec<T>>
    where
        T: Clone + Debug + PartialEq + 'a,
{
    let tokens = tokens.to_vec();
    let description = format!("{:?}", tokens);
    Parser::new(move |input: &[T], pos| {
        let end = pos + tokens.len();
        match input.get(pos..end) {
            Some(candidate) if candidate == tokens.as_slice() => {
                Step::success(candidate.to_vec(), end)
            }
            _ => Step::fail(pos, description.clone()),
        }
    })
}

/// A capture group of a pattern, by number or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Group {
    Index(usize),
    Name(String),
}

impl From<usize> for Group {
    fn from(i: usize) -> Self {
        Group::Index(i)
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Self {
        Group::Name(name.to_string())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Index(i) => write!(f, "{}", i),
            Group::Name(n) => write!(f, "{:?}", n),
        }
    }
}

fn invalid(pattern: &str, reason: impl ToString) -> DefinitionError {
    DefinitionError::InvalidPattern { pattern: pattern.to_string(), reason: reason.to_string() }
}

fn unknown(pattern: &str, group: &Group) -> DefinitionError {
    DefinitionError::UnknownGroup { pattern: pattern.to_string(), group: group.to_string() }
}

fn compile_text(pattern: &str) -> Result<Regex, DefinitionError> {
    Regex::new(pattern).map_err(|e| invalid(pattern, e))
}

fn compile_bytes(pattern: &str) -> Result<Regex, DefinitionError> {
    Regex::builder()
        .syntax(syntax::Config::new().utf8(false))
        .configure(Regex::config().utf8_empty(false))
        .build(pattern)
        .map_err(|e| invalid(pattern, e))
}

fn resolve_group(re: &Regex, pattern: &str, group: &Group) -> Result<usize, DefinitionError> {
    let info = re.group_info();
    match group {
        Group::Index(i) if *i < info.group_len(PatternID::ZERO) => Ok(*i),
        Group::Index(_) => Err(unknown(pattern, group)),
        Group::Name(name) => info
            .to_index(PatternID::ZERO, name)
            .ok_or_else(|| unknown(pattern, group)),
    }
}

/// An anchored match starting at `pos`.
/// The input before `pos` stays visible to assertions such as `\b` and `^`.
fn captures_at(re: &Regex, haystack: &[u8], pos: usize) -> Option<Captures> {
    if pos > haystack.len() {
        return None;
    }
    let search = Input::new(haystack).range(pos..).anchored(Anchored::Yes);
    let mut caps = re.create_captures();
    re.search_captures(&search, &mut caps);
    if caps.is_match() { Some(caps) } else { None }
}

/// Matches a regular expression at the current position and yields the whole match.
/// An invalid expression is reported right away as a definitional error.
///
/// # Examples
/// ```
///  use combit::primitives::pattern;
///
///  let digits = pattern("[0-9]+").unwrap();
///  assert_eq!(digits.parse_partial("123abc"), Ok(("123".to_string(), "abc")));
///  assert_eq!(digits.parse("x").unwrap_err().to_string(), "expected '[0-9]+' at 0:0");
///  assert!(pattern("[0-9").is_err());
/// ```
pub fn pattern<'a>(pattern: &str) -> Result<Parser<'a, str, String>, DefinitionError> {
    pattern_group(pattern, Group::Index(0))
}

/// Matches a regular expression and yields one capture group.
/// A group that took no part in the match yields an empty string.
///
/// # Examples
/// ```
///  use combit::primitives::{pattern_group, Group};
///
///  assert_eq!(pattern_group("a([0-9])b", Group::Index(1)).unwrap().parse("a1b"), Ok("1".to_string()));
///  assert_eq!(pattern_group("a(?P<name>[0-9])b", "name").unwrap().parse("a1b"), Ok("1".to_string()));
///  assert!(pattern_group("a([0-9])b", Group::Index(2)).is_err());
/// ```
pub fn pattern_group<'a, G>(pattern: &str, group: G) -> Result<Parser<'a, str, String>, DefinitionError>
    where
        G: Into<Group>,
{
    pattern_groups(pattern, [group]).map(|p| p.map(|mut values| values.remove(0)))
}

/// Matches a regular expression and yields several capture groups in the given order.
///
/// # Examples
/// ```
///  use combit::primitives::{pattern_groups, Group};
///
///  let pair = pattern_groups("a([0-9])b([0-9])c", [Group::Index(1), Group::Index(2)]).unwrap();
///  assert_eq!(pair.parse("a1b2c"), Ok(vec!["1".to_string(), "2".to_string()]));
/// ```
pub fn pattern_groups<'a, G, I>(pattern: &str, groups: I) -> Result<Parser<'a, str, Vec<String>>, DefinitionError>
    where
        G: Into<Group>,
        I: IntoIterator<Item=G>,
{
    let re = compile_text(pattern)?;
    let groups = groups
        .into_iter()
        .map(|g| resolve_group(&re, pattern, &g.into()))
        .collect::<Result<Vec<_>, _>>()?;
    let description = pattern.to_string();
    Ok(Parser::new(move |input: &str, pos| match captures_at(&re, input.as_bytes(), pos) {
        Some(caps) => {
            let end = caps.get_match().map_or(pos, |m| m.end());
            let values = groups
                .iter()
                .map(|&g| {
                    caps.get_group(g)
                        .and_then(|span| input.get(span.range()))
                        .map_or(String::new(), str::to_string)
                })
                .collect();
            Step::success(values, end)
        }
        None => Step::fail(pos, description.clone()),
    }))
}

/// Matches a regular expression over bytes and yields the whole match.
pub fn bytes_pattern<'a>(pattern: &str) -> Result<Parser<'a, [u8], Vec<u8>>, DefinitionError> {
    bytes_pattern_group(pattern, Group::Index(0))
}

/// Matches a regular expression over bytes and yields one capture group.
pub fn bytes_pattern_group<'a, G>(pattern: &str, group: G) -> Result<Parser<'a, [u8], Vec<u8>>, DefinitionError>
    where
        G: Into<Group>,
{
    let re = compile_bytes(pattern)?;
    let group = resolve_group(&re, pattern, &group.into())?;
    let description = pattern.to_string();
    Ok(Parser::new(move |input: &[u8], pos| match captures_at(&re, input, pos) {
        Some(caps) => {
            let end = caps.get_match().map_or(pos, |m| m.end());
            let value = caps
                .get_group(group)
                .and_then(|span| input.get(span.range()))
                .map_or(Vec::new(), <[u8]>::to_vec);
            Step::success(value, end)
        }
        None => Step::fail(pos, description.clone()),
    }))
}

/// Matches one of the characters, described as `[chars]`.
pub fn char_from<'a>(chars: &str) -> Parser<'a, str, char> {
    let set = chars.to_string();
    satisfies(move |c: &char| set.contains(*c), &format!("[{}]", chars))
}

/// Matches one of the bytes, described as `[bytes]`.
pub fn byte_from<'a>(bytes: &[u8]) -> Parser<'a, [u8], u8> {
    let set = bytes.to_vec();
    satisfies(move |b: &u8| set.contains(b), &format!("[{}]", describe_bytes(bytes)))
}

/// Matches any of the literals, trying the longest first.
///
/// # Examples
/// ```
///  use combit::primitives::{literal, string_from};
///
///  let titles = string_from(&["Mr", "Mr.", "Mrs", "Mrs."]);
///  assert_eq!((titles.clone() + literal(" Hyde")).parse("Mr. Hyde"), Ok("Mr. Hyde".to_string()));
///  assert_eq!(
///     titles.parse("foo").unwrap_err().to_string(),
///     "expected one of 'Mr', 'Mr.', 'Mrs', 'Mrs.' at 0:0"
///  );
/// ```
pub fn string_from<'a>(literals: &[&str]) -> Parser<'a, str, String> {
    alt(by_length(literals.iter().map(|s| (*s, ())))
        .into_iter()
        .map(|(s, _)| literal(&s)))
}

/// Matches any of the literals after normalizing with `transform`, trying the longest first.
pub fn string_from_with<'a, F>(literals: &[&str], transform: F) -> Parser<'a, str, String>
    where
        F: Fn(&str) -> String + 'a,
{
    let transform = Rc::new(transform);
    alt(by_length(literals.iter().map(|s| (*s, ())))
        .into_iter()
        .map(|(s, _)| {
            let transform = Rc::clone(&transform);
            literal_with(&s, move |x| transform(x))
        }))
}

/// Maps spellings to values, e.g. the variants of an enum, trying the longest spelling first.
///
/// # Examples
/// ```
///  use combit::primitives::from_variants;
///
///  #[derive(Debug, Clone, PartialEq)]
///  enum Pet { Cat, Dog }
///
///  let pet = from_variants(vec![("cat", Pet::Cat), ("dog", Pet::Dog)]);
///  assert_eq!(pet.parse("dog"), Ok(Pet::Dog));
///  assert!(pet.parse("cow").is_err());
/// ```
pub fn from_variants<'a, N, V, I>(variants: I) -> Parser<'a, str, V>
    where
        N: AsRef<str>,
        V: Clone + 'a,
        I: IntoIterator<Item=(N, V)>,
{
    alt(by_length(variants)
        .into_iter()
        .map(|(name, value)| literal(&name).result(value)))
}

/// The same as [`from_variants`] with both sides normalized by `transform`.
pub fn from_variants_with<'a, N, V, I, F>(variants: I, transform: F) -> Parser<'a, str, V>
    where
        N: AsRef<str>,
        V: Clone + 'a,
        I: IntoIterator<Item=(N, V)>,
        F: Fn(&str) -> String + 'a,
{
    let transform = Rc::new(transform);
    alt(by_length(variants)
        .into_iter()
        .map(|(name, value)| {
            let transform = Rc::clone(&transform);
            literal_with(&name, move |x| transform(x)).result(value)
        }))
}

fn by_length<N, V, I>(items: I) -> Vec<(String, V)>
    where
        N: AsRef<str>,
        I: IntoIterator<Item=(N, V)>,
{
    let mut items: Vec<(String, V)> = items
        .into_iter()
        .map(|(n, v)| (n.as_ref().to_string(), v))
        .collect();
    items.sort_by(|(l, _), (r, _)| r.len().cmp(&l.len()));
    items
}

pub fn any_char<'a>() -> Parser<'a, str, char> {
    satisfies(|_: &char| true, "any character")
}

pub fn letter<'a>() -> Parser<'a, str, char> {
    satisfies(|c: &char| c.is_alphabetic(), "a letter")
}

/// Any numeric character, including forms like `¹`. See [`decimal_digit`] for `0-9` only.
pub fn digit<'a>() -> Parser<'a, str, char> {
    satisfies(|c: &char| c.is_numeric(), "a digit")
}

pub fn decimal_digit<'a>() -> Parser<'a, str, char> {
    char_from("0123456789")
}

/// One or more whitespace characters.
pub fn whitespace<'a>() -> Parser<'a, str, String> {
    Parser::new(|input: &str, pos| {
        let rest = input.rest(pos);
        let len: usize = rest
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            Step::fail(pos, "whitespace")
        } else {
            Step::success(rest[..len].to_string(), pos + len)
        }
    })
}
