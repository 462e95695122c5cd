//! Source-location and error types used across grammar analysis and parsing.
//!
//! Every fallible operation in this crate reports its failure through one of
//! the enums below. Errors are ordinary values carrying the offending piece
//! of input (a span, a token, a table cell), never panics.

use crate::grammar::{Nonterminal, Production, Terminal, Token};
use crate::tables::Action;
use smartstring::alias::String;
use std::fmt::Debug;
use thiserror::Error;

/// A region of source text: byte offset, byte length, and the 1-based
/// line/column of its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character.
    pub offset: usize,
    /// Byte length of the region.
    pub len: usize,
    /// 1-based line number of the first character.
    pub line: usize,
    /// 1-based column number of the first character.
    pub column: usize,
}

impl Span {
    #[inline]
    pub const fn new(offset: usize, len: usize, line: usize, column: usize) -> Self {
        Self { offset, len, line, column }
    }

    /// Returns `true` if the span covers no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pretty-print for diagnostics (human-readable).
    #[inline]
    pub fn display(&self) -> std::string::String {
        format!("{}:{}", self.line, self.column)
    }
}

/// A value paired with the span of text it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T: Debug + Clone> {
    value: T,
    span: Span,
}

impl<T: Debug + Clone> Spanned<T> {
    #[inline]
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    pub fn span(&self) -> &Span {
        &self.span
    }

    #[inline]
    pub fn into_value(self) -> T {
        self.value
    }

    #[inline]
    pub fn into_tuple(self) -> (T, Span) {
        (self.value, self.span)
    }
}

impl<T: Debug + Clone> std::ops::Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

/// Errors raised while parsing and validating grammar definition text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A line does not match any of the grammar definition forms.
    #[error("malformed grammar at line {line}")]
    MalformedRule { line: usize },

    /// A `%name -> /regex/` definition carries an invalid regular expression.
    #[error("invalid regex for token %{name}: {reason}")]
    InvalidRegex { name: String, reason: String },

    /// The same `%name` is defined more than once.
    #[error("regex token %{name} is defined more than once")]
    DuplicateRegexToken { name: String },

    /// A rule references a nonterminal that no rule produces.
    #[error("symbol {symbol} in rule {production} is not defined")]
    UndefinedSymbol { symbol: Nonterminal, production: Production },

    /// A rule references a `%name` token that is never defined.
    #[error("regex token %{name} in rule {production} is not defined")]
    UndefinedRegexToken { name: String, production: Production },

    /// The grammar text contains no productions.
    #[error("grammar is empty")]
    EmptyGrammar,
}

/// A parse-table cell received two different actions.
///
/// Raised at parser construction time. The grammar is not LR(1) or LALR(1)
/// respectively and has to be rewritten by the caller; no implicit
/// shift/reduce preference is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conflict at state {state} on {token}: {existing} vs {incoming}")]
pub struct ConflictError {
    /// The automaton state whose action row collided.
    pub state: usize,
    /// The lookahead terminal of the colliding cell.
    pub token: Terminal,
    /// The action already written into the cell.
    pub existing: Action,
    /// The action whose write detected the collision.
    pub incoming: Action,
}

/// Errors raised while tokenizing input text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// No terminal definition matches at the given position.
    #[error("unknown token {lexeme} at {}", .span.display())]
    UnknownToken { lexeme: String, span: Span },
}

/// Errors raised by the parser state machine when no action is defined for
/// the current state and lookahead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// The lookahead token has no action in the current state.
    #[error("unexpected token {} (expected one of {})", .token.value(), comma_separated(.expected))]
    UnexpectedToken {
        token: Spanned<Token>,
        state: usize,
        expected: Vec<Terminal>,
    },

    /// Input ended although the current state required more tokens.
    #[error("unexpected end of input (expected one of {})", comma_separated(.expected))]
    UnexpectedEof { state: usize, expected: Vec<Terminal> },
}

impl SyntaxError {
    /// The terminals with a defined action in the failing state.
    pub fn expected(&self) -> &[Terminal] {
        match self {
            SyntaxError::UnexpectedToken { expected, .. } => expected,
            SyntaxError::UnexpectedEof { expected, .. } => expected,
        }
    }

    /// The automaton state in which the parse failed.
    pub fn state(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { state, .. } => *state,
            SyntaxError::UnexpectedEof { state, .. } => *state,
        }
    }
}

/// Any failure of a text-input parse run.
///
/// `Parser::parse` and `Parser::trace` tokenize first and run the state
/// machine second, so either stage's error can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

fn comma_separated(terminals: &[Terminal]) -> std::string::String {
    terminals.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}
