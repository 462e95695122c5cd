//! Table-driven shift-reduce parsing.
//!
//! A [`Parser`] owns the grammar together with every artifact derived from
//! it: FIRST/FOLLOW tables, the automaton, and the ACTION/GOTO tables. The
//! artifacts are built once at construction and never mutated; a different
//! grammar means building a new parser. Parsing itself is a loop over a
//! stack of (state, tree) pairs dispatching on one action-table cell per
//! iteration.

use crate::automaton::Automaton;
use crate::error::{ConflictError, LexError, ParsingError, Spanned, SyntaxError};
use crate::grammar::{Grammar, Terminal, Token};
use crate::lexer::Lexer;
use crate::sets::{FirstTable, FollowTable};
use crate::tables::{Action, ActionTable, GotoTable, ParsingTables};
use crate::trace::{Step, Trace};
use crate::tree::Tree;

/// An LR(1) or LALR(1) parser for one grammar.
#[derive(Debug)]
pub struct Parser {
    grammar: Grammar,
    first: FirstTable,
    follow: FollowTable,
    automaton: Automaton,
    tables: ParsingTables,
}

impl Parser {
    /// Builds a canonical LR(1) parser, consuming the grammar.
    ///
    /// Fails with [`ConflictError`] if the grammar is not LR(1).
    pub fn lr1(grammar: Grammar) -> Result<Parser, ConflictError> {
        let first = FirstTable::of(&grammar);
        let automaton = Automaton::lr1(&grammar, &first);
        Self::assemble(grammar, first, automaton)
    }

    /// Builds an LALR(1) parser, consuming the grammar.
    ///
    /// Fails with [`ConflictError`] if the grammar is not LALR(1); a
    /// grammar can be LR(1) yet fail here when merging introduces a
    /// reduce/reduce collision.
    pub fn lalr1(grammar: Grammar) -> Result<Parser, ConflictError> {
        let first = FirstTable::of(&grammar);
        let automaton = Automaton::lalr1(&grammar, &first);
        Self::assemble(grammar, first, automaton)
    }

    fn assemble(
        grammar: Grammar,
        first: FirstTable,
        automaton: Automaton,
    ) -> Result<Parser, ConflictError> {
        let follow = FollowTable::of(&grammar, &first);
        let tables = ParsingTables::of(&grammar, &automaton)?;
        Ok(Parser { grammar, first, follow, automaton, tables })
    }

    /// Tokenizes `input` with the grammar's terminal definitions.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Spanned<Token>>, LexError> {
        Lexer::new(&self.grammar).tokenize(input)
    }

    /// Parses `input`, returning its parse tree.
    pub fn parse(&self, input: &str) -> Result<Tree, ParsingError> {
        let tokens = self.tokenize(input)?;
        let (_, tree) = self.drive(tokens, false)?;
        Ok(tree)
    }

    /// Parses an already-tokenized sequence.
    pub fn parse_tokens(&self, tokens: Vec<Spanned<Token>>) -> Result<Tree, SyntaxError> {
        let (_, tree) = self.drive(tokens, false)?;
        Ok(tree)
    }

    /// Parses `input` while logging one [`Step`] per transition.
    pub fn trace(&self, input: &str) -> Result<(Trace, Tree), ParsingError> {
        let tokens = self.tokenize(input)?;
        Ok(self.drive(tokens, true)?)
    }

    /// Traces an already-tokenized sequence.
    pub fn trace_tokens(
        &self,
        tokens: Vec<Spanned<Token>>,
    ) -> Result<(Trace, Tree), SyntaxError> {
        self.drive(tokens, true)
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn first_table(&self) -> &FirstTable {
        &self.first
    }

    pub fn follow_table(&self) -> &FollowTable {
        &self.follow
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn tables(&self) -> &ParsingTables {
        &self.tables
    }

    pub fn action_table(&self) -> &ActionTable {
        self.tables.action_table()
    }

    pub fn goto_table(&self) -> &GotoTable {
        self.tables.goto_table()
    }

    /// The state machine. One iteration reads the action cell for the
    /// current state and lookahead and applies it; reduce does not advance
    /// the lookahead. `collect` switches step logging on.
    fn drive(
        &self,
        mut tokens: Vec<Spanned<Token>>,
        collect: bool,
    ) -> Result<(Trace, Tree), SyntaxError> {
        if tokens.last().map(|token| token.kind()) != Some(&Terminal::Eof) {
            let eof = synthetic_eof(tokens.last());
            tokens.push(eof);
        }

        let action_table = self.tables.action_table();
        let goto_table = self.tables.goto_table();

        let mut trace = Trace::new();
        let mut states: Vec<usize> = vec![0];
        let mut state = 0;
        let mut trees: Vec<Tree> = Vec::new();
        let mut position = 0;

        loop {
            let lookahead = &tokens[position];
            let action = match action_table[state].get(lookahead.kind()) {
                Some(action) => *action,
                None => {
                    let expected: Vec<Terminal> = action_table[state].keys().cloned().collect();
                    log::trace!("error on {} in state {}", lookahead.value(), state);
                    return Err(if *lookahead.kind() == Terminal::Eof {
                        SyntaxError::UnexpectedEof { state, expected }
                    } else {
                        SyntaxError::UnexpectedToken { token: lookahead.clone(), state, expected }
                    });
                }
            };

            if collect {
                trace.push(Step::new(
                    states.clone(),
                    trees.iter().map(Tree::symbol).collect(),
                    lookahead.clone(),
                    action,
                ));
            }
            if log::log_enabled!(log::Level::Trace) {
                self.dump_state(&states, &trees, lookahead, action);
            }

            match action {
                Action::Shift { state: next } => {
                    trees.push(Tree::Terminal(lookahead.clone()));
                    states.push(next);
                    state = next;
                    position += 1;
                }

                Action::Reduce { production } => {
                    let production = &self.grammar.productions()[production];
                    let arity = production.rhs().len();
                    let children = trees.split_off(trees.len() - arity);
                    states.truncate(states.len() - arity);
                    state = states[states.len() - 1];
                    let Some(&next) = goto_table[state].get(production.lhs()) else {
                        unreachable!("missing goto for {} in state {}", production.lhs(), state);
                    };
                    trees.push(Tree::Nonterminal { symbol: production.lhs().clone(), children });
                    states.push(next);
                    state = next;
                }

                Action::Accept => {
                    assert!(trees.len() == 1);
                    let Some(tree) = trees.pop() else {
                        unreachable!();
                    };
                    return Ok((trace, tree));
                }
            }
        }
    }

    fn dump_state(&self, states: &[usize], trees: &[Tree], lookahead: &Spanned<Token>, action: Action) {
        let mut output = String::new();
        for (index, state) in states.iter().enumerate() {
            output.push_str(&format!("<{}>  ", state));
            if let Some(tree) = trees.get(index) {
                output.push_str(&format!("{}  ", tree.symbol()));
            }
        }
        log::trace!("{}<-  {}  =>  {}", output, lookahead.value(), action);
    }
}

fn synthetic_eof(last: Option<&Spanned<Token>>) -> Spanned<Token> {
    let span = match last {
        Some(token) => {
            let span = token.span();
            crate::error::Span::new(span.offset + span.len, 0, span.line, span.column + span.len)
        }
        None => crate::error::Span::new(0, 0, 1, 1),
    };
    Spanned::new(Token::new(Terminal::Eof, "".into()), span)
}
