//! Tokenizer for the note markup.
//!
//! The markup is split into tags and text using the [Logos] lexer generator.
//! Tag contents are not interpreted here; see [`super::tag`].
//!
//! The lexer is lossless: every byte of the input ends up in exactly one
//! token, which is what lets the parser recover from any input.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `<name ...>`, including self-closing `<br/>`
    #[regex(r"<[A-Za-z][^<>]*>")]
    OpenTag,

    /// `</name>`
    #[regex(r"</[A-Za-z][^<>]*>")]
    CloseTag,

    /// `<!DOCTYPE ...>`, simple `<!-- comments -->` and `<?...?>`
    #[regex(r"<[!?][^<>]*>")]
    Declaration,

    /// A `<` that does not start a tag
    #[token("<")]
    Lt,

    #[regex(r"[^<]+")]
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let kind = match result {
            Ok(kind) => kind,
            // Unrecognized input is kept as text
            Err(()) => TokenKind::Text,
        };
        tokens.push(Token { kind, text });
    }

    tokens
}
