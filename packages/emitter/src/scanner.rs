//! Top-level statement splitting
//!
//! Statements end at a `;` outside brackets, or at a newline outside
//! brackets when the line could end a statement and the next line does not
//! continue it (a simplified form of automatic semicolon insertion).

use crate::lexer::{tokenize, Tok, Token};

/// Words that continue an expression or type on the following line
const CONTINUATION_WORDS: &[&str] = &[
    "as",
    "satisfies",
    "extends",
    "implements",
    "in",
    "instanceof",
    "of",
];

#[derive(Debug, Clone)]
pub struct Statement<'src> {
    src: &'src str,
    /// Every token of the statement, trivia included
    pub tokens: Vec<Tok<'src>>,
    /// `/** ... */` comment directly preceding the statement
    pub doc: Option<&'src str>,
}

impl<'src> Statement<'src> {
    pub fn text(&self) -> &'src str {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => &self.src[first.span.start..last.span.end],
            _ => "",
        }
    }

    /// Tokens without newlines and comments
    pub fn significant(&self) -> Vec<&Tok<'src>> {
        self.tokens.iter().filter(|t| !t.kind.is_trivia()).collect()
    }

    /// Source text from `from` to the end of the statement
    pub fn text_from(&self, from: &Tok<'src>) -> &'src str {
        let end = self.tokens.last().map(|t| t.span.end).unwrap_or(from.span.end);
        &self.src[from.span.start..end]
    }

    /// Source text covering `first..=last`
    pub fn slice(&self, first: &Tok<'src>, last: &Tok<'src>) -> &'src str {
        if last.span.end <= first.span.start {
            return "";
        }
        &self.src[first.span.start..last.span.end]
    }

    pub fn source(&self) -> &'src str {
        self.src
    }
}

/// Split a whole file into top-level statements
pub fn scan(source: &str) -> Vec<Statement<'_>> {
    let tokens = tokenize(source);
    split_statements(source, &tokens)
}

/// Split a token run (a file or a class body) into statements
pub fn split_statements<'src>(src: &'src str, tokens: &[Tok<'src>]) -> Vec<Statement<'src>> {
    let mut statements = Vec::new();
    let mut current: Vec<Tok<'src>> = Vec::new();
    let mut depth = 0usize;
    let mut pending_doc: Option<&'src str> = None;
    let mut current_doc: Option<&'src str> = None;

    for (index, tok) in tokens.iter().enumerate() {
        match tok.kind {
            Token::LineComment | Token::BlockComment if current.is_empty() => {
                if tok.kind == Token::BlockComment && tok.text.starts_with("/**") {
                    pending_doc = Some(tok.text);
                }
                continue;
            }
            Token::Newline => {
                if current.is_empty() {
                    continue;
                }
                if depth == 0 && ends_line(&current) && !continues(next_significant(tokens, index)) {
                    flush(src, &mut statements, &mut current, &mut current_doc);
                    continue;
                }
                current.push(tok.clone());
                continue;
            }
            _ => {}
        }

        if current.is_empty() {
            current_doc = pending_doc.take();
        }

        if tok.kind.opens() {
            depth += 1;
        } else if tok.kind.closes() {
            depth = depth.saturating_sub(1);
        }

        current.push(tok.clone());

        if tok.kind == Token::Semicolon && depth == 0 {
            flush(src, &mut statements, &mut current, &mut current_doc);
        }
    }

    flush(src, &mut statements, &mut current, &mut current_doc);
    statements
}

fn flush<'src>(
    src: &'src str,
    statements: &mut Vec<Statement<'src>>,
    current: &mut Vec<Tok<'src>>,
    doc: &mut Option<&'src str>,
) {
    // Trailing trivia never belongs to the statement text
    while current.last().map(|t| t.kind.is_trivia()).unwrap_or(false) {
        current.pop();
    }
    if current.is_empty() {
        return;
    }
    statements.push(Statement {
        src,
        tokens: std::mem::take(current),
        doc: doc.take(),
    });
}

fn ends_line(current: &[Tok<'_>]) -> bool {
    let last = current.iter().rev().find(|t| !t.kind.is_trivia());
    matches!(
        last.map(|t| t.kind),
        Some(
            Token::Ident
                | Token::Number
                | Token::Str
                | Token::Template
                | Token::RBrace
                | Token::RParen
                | Token::RBracket
                | Token::Gt
                | Token::NonAscii
        )
    )
}

fn next_significant<'a, 'src>(tokens: &'a [Tok<'src>], index: usize) -> Option<&'a Tok<'src>> {
    tokens[index + 1..].iter().find(|t| !t.kind.is_trivia())
}

fn continues(next: Option<&Tok<'_>>) -> bool {
    let Some(next) = next else { return false };
    match next.kind {
        Token::Dot
        | Token::Comma
        | Token::Question
        | Token::Colon
        | Token::Eq
        | Token::Arrow
        | Token::Lt
        | Token::Gt
        | Token::Slash
        | Token::LParen
        | Token::LBracket
        | Token::RParen
        | Token::RBracket
        | Token::RBrace
        | Token::Template => true,
        Token::Operator => !matches!(next.text.chars().next(), Some('!' | '@' | '#')),
        Token::Ident => CONTINUATION_WORDS.contains(&next.text),
        _ => false,
    }
}
