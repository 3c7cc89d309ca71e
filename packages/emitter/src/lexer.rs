//! Lexer for TypeScript source using logos
//!
//! Only as precise as statement splitting needs: brackets, separators,
//! strings and comments are distinguished, every other operator is lumped
//! into [`Token::Operator`].

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    #[token("\n")]
    Newline,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    Str,

    #[regex(r"`([^`\\]|\\.)*`")]
    Template,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9A-Za-z_]+)?")]
    Number,

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("...")]
    Spread,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
    #[token("=>")]
    Arrow,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("/")]
    Slash,

    #[regex(r"[+\-*%|&!^~@#\\]+")]
    Operator,

    #[regex(r"[^\x00-\x7F]+")]
    NonAscii,
}

/// Consume through the closing `*/`; an unterminated comment runs to the end of input
fn block_comment(lex: &mut logos::Lexer<Token>) -> bool {
    let consumed = match lex.remainder().find("*/") {
        Some(end) => end + 2,
        None => lex.remainder().len(),
    };
    lex.bump(consumed);
    true
}

impl Token {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Token::Newline | Token::LineComment | Token::BlockComment
        )
    }

    pub fn opens(self) -> bool {
        matches!(self, Token::LBrace | Token::LParen | Token::LBracket)
    }

    pub fn closes(self) -> bool {
        matches!(self, Token::RBrace | Token::RParen | Token::RBracket)
    }
}

/// A token with its source text and byte span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tok<'src> {
    pub kind: Token,
    pub text: &'src str,
    pub span: Range<usize>,
}

impl<'src> Tok<'src> {
    pub fn is(&self, kind: Token) -> bool {
        self.kind == kind
    }

    pub fn is_word(&self, word: &str) -> bool {
        self.kind == Token::Ident && self.text == word
    }
}

/// Tokenize a whole file; unrecognized input (e.g. an unterminated string) is skipped
pub fn tokenize(source: &str) -> Vec<Tok<'_>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(kind) = result {
            let span = lexer.span();
            tokens.push(Tok {
                kind,
                text: &source[span.clone()],
                span,
            });
        }
    }

    tokens
}
