use std::collections::BTreeSet;
use std::fmt::Debug;
use crate::error::DefinitionError;
use Step::{Error, Fail, Success};

/// The deepest failure seen so far during a parse attempt:
/// the position and everything that was expected there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Furthest {
    pub pos: usize,
    pub expected: BTreeSet<String>,
}

impl Furthest {
    pub fn new<D: Into<String>>(pos: usize, description: D) -> Self {
        let mut expected = BTreeSet::new();
        expected.insert(description.into());
        Furthest { pos, expected }
    }

    /// A failure that expects nothing in particular, e.g. an empty alternation.
    pub fn nothing(pos: usize) -> Self {
        Furthest { pos, expected: BTreeSet::new() }
    }

    /// Keeps the deeper of two witnesses. On a tie, the expected sets are united.
    pub fn absorb(self, other: Option<Furthest>) -> Furthest {
        match other {
            None => self,
            Some(other) if other.pos > self.pos => other,
            Some(other) if other.pos < self.pos => self,
            Some(mut other) => {
                let mut expected = self.expected;
                expected.append(&mut other.expected);
                Furthest { pos: self.pos, expected }
            }
        }
    }

    pub fn merge(left: Option<Furthest>, right: Option<Furthest>) -> Option<Furthest> {
        match left {
            Some(l) => Some(l.absorb(right)),
            None => right,
        }
    }
}

/// The outcome of running a parser from some position.
///
/// Every outcome carries the furthest failure witnessed on the way, the success included,
/// since alternation may have discarded deeper branches before it found a way through.
#[derive(Debug, Clone)]
pub enum Step<T> {
    /// The value and the position to resume from.
    Success(T, usize, Option<Furthest>),
    /// The position the failure happened at and the furthest failure overall.
    Fail(usize, Furthest),
    /// The grammar is broken. Never recovered by backtracking.
    Error(DefinitionError),
}

impl<T> Step<T> {
    pub fn success(value: T, pos: usize) -> Self {
        Success(value, pos, None)
    }

    pub fn fail<D: Into<String>>(pos: usize, description: D) -> Self {
        Fail(pos, Furthest::new(pos, description))
    }

    /// Folds an earlier witness into this outcome, keeping the deeper one.
    pub fn aggregate(self, seen: Option<Furthest>) -> Self {
        match self {
            Success(v, pos, furthest) => Success(v, pos, Furthest::merge(furthest, seen)),
            Fail(pos, furthest) => Fail(pos, furthest.absorb(seen)),
            Error(e) => Error(e),
        }
    }

    pub fn map<Rhs, Map>(self, mapper: Map) -> Step<Rhs>
        where
            Map: FnOnce(T) -> Rhs,
    {
        match self {
            Success(t, pos, furthest) => Success(mapper(t), pos, furthest),
            Fail(pos, furthest) => Fail(pos, furthest),
            Error(e) => Error(e),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Success(t, _, _) => Some(t),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Success(..))
    }

    /// The position to resume from on success or the failing position otherwise.
    pub fn pos(&self) -> Option<usize> {
        match self {
            Success(_, pos, _) | Fail(pos, _) => Some(*pos),
            Error(_) => None,
        }
    }

    pub fn furthest(&self) -> Option<&Furthest> {
        match self {
            Success(_, _, furthest) => furthest.as_ref(),
            Fail(_, furthest) => Some(furthest),
            Error(_) => None,
        }
    }
}

impl<T: Debug> Step<T> {
    /// Logs the outcome under the given label when the `logging` feature is on.
    pub fn debug(self, label: &str) -> Step<T> {
        match &self {
            Success(v, pos, _) => log_debug!("debug | {} success, pos: {}, res: {:?}", label, pos, v),
            Fail(pos, furthest) => log_debug!(
                "debug | {} fail, pos: {}, furthest: {} {:?}",
                label,
                pos,
                furthest.pos,
                furthest.expected
            ),
            Error(e) => log_debug!("debug | {} error {:?}", label, e),
        }
        self
    }
}
