//! Turns source text into a token stream with a `Logos` lexer.
//!
//! A `Vec` of tokens is a [`Stream`](crate::stream::Stream) itself,
//! so the same combinators that parse text can parse the tokens.

use std::ops::Range;
use logos::Logos;
use crate::error::LexError;

/// Runs the lexer over the whole source and collects the tokens.
/// Stops at the first slice no token matches.
///
/// # Examples
/// ```
///  use logos::Logos;
///  use combit::lexer::tokenize;
///  use combit::primitives::match_one;
///
///  #[derive(Logos, Debug, Clone, PartialEq)]
///  #[logos(skip r"[ \t\r\n]+")]
///  pub enum Token<'a> {
///     #[regex(r"[a-z]+")]
///     Word(&'a str),
///     #[token(",")]
///     Comma,
///  }
///
///  let tokens = tokenize::<Token>("one, two").unwrap();
///  assert_eq!(tokens, vec![Token::Word("one"), Token::Comma, Token::Word("two")]);
///
///  let first = match_one::<[Token]>(Token::Word("one")) << match_one(Token::Comma);
///  assert_eq!(first.parse_partial(&tokens).map(|(t, rest)| (t, rest.len())), Ok((Token::Word("one"), 1)));
///
///  assert!(tokenize::<Token>("one; two").is_err());
/// ```
pub fn tokenize<'a, T>(source: &'a str) -> Result<Vec<T>, LexError>
    where
        T: Logos<'a, Source=str>,
        T::Extras: Default,
{
    tokenize_spanned(source).map(|tokens| tokens.into_iter().map(|(t, _)| t).collect())
}

/// The same as [`tokenize`] keeping the byte span of every token in the source,
/// e.g. to turn the index of a failed token back into a place in the text.
pub fn tokenize_spanned<'a, T>(source: &'a str) -> Result<Vec<(T, Range<usize>)>, LexError>
    where
        T: Logos<'a, Source=str>,
        T::Extras: Default,
{
    let mut delegate = T::lexer(source);
    let mut tokens = vec![];

    while let Some(token) = delegate.next() {
        match token {
            Ok(t) => tokens.push((t, delegate.span())),
            Err(_) => {
                return Err(LexError::BadToken {
                    slice: delegate.slice().to_string(),
                    span: delegate.span(),
                });
            }
        }
    }
    log_trace!("lexed {} tokens", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use logos::Logos;
    use crate::error::LexError;
    use crate::lexer::{tokenize, tokenize_spanned};
    use crate::test::lexer_test::{expect, expect_failed};

    #[derive(Logos, Debug, Clone, PartialEq)]
    #[logos(skip r"[ \t\r\n]+")]
    enum T<'a> {
        #[regex(r"[a-zA-Z-]+")]
        Word(&'a str),
        #[token(",")]
        Comma,
        #[token(".")]
        Dot,
        #[token("!")]
        Bang,
        #[token("?")]
        Question,
    }

    #[test]
    fn words() {
        expect::<T>(
            "I have a strange addiction,\n It often sets off sparks!",
            vec![
                T::Word("I"), T::Word("have"), T::Word("a"), T::Word("strange"),
                T::Word("addiction"), T::Comma, T::Word("It"), T::Word("often"),
                T::Word("sets"), T::Word("off"), T::Word("sparks"), T::Bang,
            ],
        );
        expect::<T>("", vec![]);
    }

    #[test]
    fn bad_token() {
        expect_failed::<T>("abc > d");
        assert_eq!(
            tokenize::<T>("abc > d"),
            Err(LexError::BadToken { slice: ">".to_string(), span: 4..5 })
        );
    }

    #[test]
    fn spans() {
        let tokens = tokenize_spanned::<T>("ab, c?").unwrap();
        assert_eq!(
            tokens,
            vec![(T::Word("ab"), 0..2), (T::Comma, 2..3), (T::Word("c"), 4..5), (T::Question, 5..6)]
        );
    }
}
