//! Input tokenizer driven by a grammar's terminal definitions.
//!
//! Scanning is longest-match: at each position every constant literal and
//! every pattern regex is probed, anchored at the position, and the longest
//! match wins. Ties go to constants over patterns, then to declaration
//! order. Whitespace separates tokens and is never part of one.

use crate::error::{LexError, Span, Spanned};
use crate::grammar::{Grammar, Terminal, Token};

/// Tokenizer over one grammar's constant and pattern token definitions.
pub struct Lexer<'g> {
    grammar: &'g Grammar,
}

impl<'g> Lexer<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Tokenizes `input` into a sequence ending with one end-of-input token.
    ///
    /// Fails with [`LexError::UnknownToken`] if some non-whitespace position
    /// matches no terminal definition.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Spanned<Token>>, LexError> {
        let mut tokens = Vec::new();
        let mut cursor = Cursor::new(input);

        loop {
            cursor.skip_whitespace();
            if cursor.at_end() {
                break;
            }

            let rest = cursor.rest();
            let mut best: Option<(usize, Terminal)> = None;
            for literal in self.grammar.constant_tokens() {
                if rest.starts_with(literal.as_str()) {
                    let len = literal.len();
                    if best.as_ref().map_or(true, |(best_len, _)| len > *best_len) {
                        best = Some((len, Terminal::Constant(literal.clone())));
                    }
                }
            }
            for (name, regex) in self.grammar.regex_tokens() {
                if let Some(found) = regex.find(rest) {
                    // Only a match anchored at the position counts.
                    if found.start() == 0 && found.len() > 0 {
                        let len = found.len();
                        if best.as_ref().map_or(true, |(best_len, _)| len > *best_len) {
                            best = Some((len, Terminal::Pattern(name.clone())));
                        }
                    }
                }
            }

            match best {
                Some((len, kind)) => {
                    let lexeme = &rest[..len];
                    let span = cursor.span(len);
                    log::trace!("matched {} as {} at {}", lexeme, kind, span.display());
                    tokens.push(Spanned::new(Token::new(kind, lexeme.into()), span));
                    cursor.advance(len);
                }
                None => {
                    let lexeme = rest.split_whitespace().next().unwrap_or(rest);
                    return Err(LexError::UnknownToken {
                        lexeme: lexeme.into(),
                        span: cursor.span(lexeme.len()),
                    });
                }
            }
        }

        tokens.push(Spanned::new(Token::new(Terminal::Eof, "".into()), cursor.span(0)));
        Ok(tokens)
    }
}

/// Byte-offset cursor with 1-based line/column accounting.
struct Cursor<'i> {
    input: &'i str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'i> Cursor<'i> {
    fn new(input: &'i str) -> Self {
        Self { input, offset: 0, line: 1, column: 1 }
    }

    fn rest(&self) -> &'i str {
        &self.input[self.offset..]
    }

    fn at_end(&self) -> bool {
        self.offset == self.input.len()
    }

    fn span(&self, len: usize) -> Span {
        Span::new(self.offset, len, self.line, self.column)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.rest().chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.step(c);
        }
    }

    fn advance(&mut self, len: usize) {
        let end = self.offset + len;
        while self.offset < end {
            if let Some(c) = self.rest().chars().next() {
                self.step(c);
            } else {
                break;
            }
        }
    }

    fn step(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}
