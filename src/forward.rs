use std::rc::Rc;
use once_cell::unsync::OnceCell;
use crate::error::{DefinitionError, Error};
use crate::parser::Parser;
use crate::step::Step;
use crate::stream::Stream;

/// A parser that is declared first and defined later, for recursive grammars.
///
/// [`parser`](Forward::parser) hands out references that may be used in the definition
/// before [`resolve`](Forward::resolve) installs it. Running an unresolved declaration is
/// a definitional error and a declaration can be resolved only once.
///
/// A self-referential definition is a reference cycle and lives as long as the program does.
///
/// # Examples
/// ```
///  use combit::forward::Forward;
///  use combit::primitives::literal;
///
///  let expr = Forward::new();
///  assert!(expr.parse("z").unwrap_err().is_definitional());
///
///  expr.resolve((literal("a") + expr.parser()) | literal("z")).unwrap();
///  assert_eq!(expr.parse("aaaz"), Ok("aaaz".to_string()));
///  assert!(expr.parse("aa").is_err());
///  assert!(expr.resolve(literal("b")).is_err());
/// ```
pub struct Forward<'a, S: ?Sized, T> {
    slot: Rc<OnceCell<Parser<'a, S, T>>>,
}

impl<'a, S: ?Sized, T> Clone for Forward<'a, S, T> {
    fn clone(&self) -> Self {
        Forward { slot: Rc::clone(&self.slot) }
    }
}

impl<'a, S, T> Default for Forward<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    fn default() -> Self {
        Forward::new()
    }
}

impl<'a, S, T> Forward<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    pub fn new() -> Self {
        Forward { slot: Rc::new(OnceCell::new()) }
    }

    /// A parser that runs whatever the declaration resolves to.
    pub fn parser(&self) -> Parser<'a, S, T> {
        let slot = Rc::clone(&self.slot);
        Parser::new(move |input: &S, pos| match slot.get() {
            Some(parser) => parser.run(input, pos),
            None => Step::Error(DefinitionError::Unresolved),
        })
    }

    /// Installs the definition.
    pub fn resolve(&self, parser: Parser<'a, S, T>) -> Result<(), DefinitionError> {
        match self.slot.set(parser) {
            Ok(()) => {
                log_debug!("forward declaration resolved");
                Ok(())
            }
            Err(_) => Err(DefinitionError::AlreadyResolved),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn parse(&self, input: &S) -> Result<T, Error> {
        self.parser().parse(input)
    }

    pub fn parse_partial<'s>(&self, input: &'s S) -> Result<(T, &'s S), Error> {
        self.parser().parse_partial(input)
    }
}

/// A fresh, unresolved [`Forward`].
pub fn forward_declaration<'a, S, T>() -> Forward<'a, S, T>
    where
        S: Stream + ?Sized + 'a,
        T: 'a,
{
    Forward::new()
}
