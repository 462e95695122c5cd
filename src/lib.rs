//! Grammar-driven LR(1) and LALR(1) parser generation and parsing.
//!
//! A [`Grammar`] is parsed from a small line-oriented definition language,
//! validated, and handed to [`Parser::lr1`] or [`Parser::lalr1`], which
//! compute FIRST/FOLLOW sets, build the item-set automaton, and derive the
//! ACTION/GOTO tables. Parsing is a table-driven shift-reduce loop
//! producing a [`Tree`], with optional step-by-step tracing. Every derived
//! artifact is immutable and inspectable.
//!
//! ```
//! use lrgram::{Grammar, Parser};
//!
//! let grammar = Grammar::parse(
//!     "
//!     P -> E
//!     E -> E '+' T
//!     E -> E '-' T
//!     E -> T
//!     T -> %num
//!     %num -> /[0-9]+/
//!     ",
//! )?;
//! let parser = Parser::lalr1(grammar)?;
//!
//! let tree = parser.parse("3 + 4 - 2")?;
//! assert_eq!(tree.to_string().lines().next(), Some("P"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod automaton;
mod error;
mod grammar;
mod lexer;
mod parser;
mod sets;
mod tables;
mod trace;
mod tree;

pub use crate::automaton::{Automaton, AutomatonKind, Item, State};
pub use crate::error::{
    ConflictError, GrammarError, LexError, ParsingError, Span, Spanned, SyntaxError,
};
pub use crate::grammar::{Grammar, Nonterminal, Production, Symbol, Terminal, Token};
pub use crate::lexer::Lexer;
pub use crate::parser::Parser;
pub use crate::sets::{FirstTable, FollowTable};
pub use crate::tables::{Action, ActionTable, GotoTable, ParsingTables};
pub use crate::trace::{Step, Trace};
pub use crate::tree::Tree;
