//! logos-based tokenizer for track length specifications.
//!
//! Accepted inputs look like `20`, `*`, `2.5*`, `Auto`, optionally followed by
//! bounds: `Auto; min: 20; max: 200`.
//!
//! `2*` lexes as [`Token::Number`] followed by [`Token::Star`]; the parser
//! joins the pair into a weighted proportional length.

use logos::Logos;

use crate::error::{GridError, Result};

/// Token produced by the length lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    /// Number: integer or float, possibly negative (rejected later with a clear message).
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier: `Auto`, `min`, `max`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    /// `*`
    #[token("*")]
    Star,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `:`
    #[token(":")]
    Colon,
}

/// Tokenize a length string into `(Token, slice)` pairs.
///
/// Unlike the lenient stylesheet lexer, any unrecognized character is an
/// [`GridError::InvalidLength`]: a bad length must fail at template construction.
pub fn tokenize(input: &str) -> Result<Vec<(Token, &str)>> {
    Token::lexer(input)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, &input[span])),
            Err(()) => Err(GridError::InvalidLength {
                input: input.to_owned(),
                message: format!("unexpected character `{}`", &input[span]),
            }),
        })
        .collect()
}
