//! ACTION and GOTO table derivation.
//!
//! Each automaton state becomes one action row keyed by terminal and one
//! goto row keyed by nonterminal. A cell holds exactly one action; writing a
//! different action into an occupied cell aborts construction with a
//! [`ConflictError`], covering both shift/reduce and reduce/reduce
//! collisions. An absent cell means a syntax error at parse time.

use crate::automaton::Automaton;
use crate::error::ConflictError;
use crate::grammar::{Grammar, Nonterminal, Symbol, Terminal};
use indexmap::IndexMap;
use std::fmt;
use std::io::{self, Write};
use std::ops::Deref;

/// One parse decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Consume the lookahead and move to a state.
    Shift { state: usize },
    /// Replace the top of the stack with a production's lhs.
    Reduce { production: usize },
    /// The input is a complete derivation of the start symbol.
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift { state } => write!(f, "shift {}", state),
            Action::Reduce { production } => write!(f, "reduce {}", production),
            Action::Accept => write!(f, "accept"),
        }
    }
}

/// (state, terminal) -> action rows, indexed by state id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable(Vec<IndexMap<Terminal, Action>>);

impl Deref for ActionTable {
    type Target = Vec<IndexMap<Terminal, Action>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// (state, nonterminal) -> state rows, indexed by state id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoTable(Vec<IndexMap<Nonterminal, usize>>);

impl Deref for GotoTable {
    type Target = Vec<IndexMap<Nonterminal, usize>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The ACTION and GOTO tables derived from one automaton. Immutable once
/// built; a new grammar means a new build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingTables {
    action: ActionTable,
    goto: GotoTable,
}

impl ParsingTables {
    /// Derives the tables for `automaton`.
    ///
    /// Fails with [`ConflictError`] on the first cell that receives two
    /// different actions. The grammar is then not LR(1) or LALR(1),
    /// whichever collection `automaton` is.
    pub fn of(grammar: &Grammar, automaton: &Automaton) -> Result<Self, ConflictError> {
        let sentinel = grammar.productions().len();
        let mut action_rows = vec![IndexMap::new(); automaton.states().len()];
        let mut goto_rows = vec![IndexMap::new(); automaton.states().len()];

        for state in automaton.states() {
            for (symbol, target) in state.transitions() {
                match symbol {
                    Symbol::Terminal(terminal) => {
                        set(
                            &mut action_rows[state.id()],
                            state.id(),
                            terminal.clone(),
                            Action::Shift { state: *target },
                        )?;
                    }
                    Symbol::Nonterminal(nonterminal) => {
                        goto_rows[state.id()].insert(nonterminal.clone(), *target);
                    }
                }
            }
            for item in state.items() {
                let production = automaton.production(grammar, item.production());
                if item.dot() < production.rhs().len() {
                    continue;
                }
                for lookahead in item.lookaheads() {
                    let incoming = if item.production() == sentinel && *lookahead == Terminal::Eof
                    {
                        Action::Accept
                    } else {
                        Action::Reduce { production: item.production() }
                    };
                    set(&mut action_rows[state.id()], state.id(), lookahead.clone(), incoming)?;
                }
            }
        }

        Ok(Self { action: ActionTable(action_rows), goto: GotoTable(goto_rows) })
    }

    pub fn action_table(&self) -> &ActionTable {
        &self.action
    }

    pub fn goto_table(&self) -> &GotoTable {
        &self.goto
    }

    /// Writes both tables to `out`: one `A,<state>,<terminal>,<action>` line
    /// per action cell and one `G,<state>,<nonterminal>,<target>` line per
    /// goto cell.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "TS,{}\n", self.action.len())?;
        for (state, row) in self.action.iter().enumerate() {
            for (terminal, action) in row {
                writeln!(out, "A,{},{},{}", state, terminal, action)?;
            }
            for (nonterminal, target) in &self.goto[state] {
                writeln!(out, "G,{},{},{}", state, nonterminal, target)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Writes one action cell, failing on a differing occupant. Re-writing the
/// identical action is a no-op.
fn set(
    row: &mut IndexMap<Terminal, Action>,
    state: usize,
    token: Terminal,
    incoming: Action,
) -> Result<(), ConflictError> {
    if let Some(existing) = row.get(&token).copied() {
        if existing == incoming {
            return Ok(());
        }
        log::debug!("conflict at state {} on {}: {} vs {}", state, token, existing, incoming);
        return Err(ConflictError { state, token, existing, incoming });
    }
    row.insert(token, incoming);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use crate::sets::FirstTable;
    use pretty_assertions::assert_eq;

    fn tables(text: &str) -> Result<(Grammar, ParsingTables), ConflictError> {
        let grammar = Grammar::parse(text).unwrap();
        let first = FirstTable::of(&grammar);
        let automaton = Automaton::lr1(&grammar, &first);
        ParsingTables::of(&grammar, &automaton).map(|tables| (grammar, tables))
    }

    fn constant(text: &str) -> Terminal {
        Terminal::Constant(text.into())
    }

    #[test]
    fn binary_addition_tables() {
        let (_, tables) = tables("E -> E '+' B\nE -> B\nB -> '0'\nB -> '1'\n").unwrap();
        let action = tables.action_table();
        let goto = tables.goto_table();
        assert_eq!(action.len(), 7);

        // State 0 shifts the literals and has gotos for both nonterminals.
        assert_eq!(action[0].get(&constant("0")), Some(&Action::Shift { state: 3 }));
        assert_eq!(action[0].get(&constant("1")), Some(&Action::Shift { state: 4 }));
        assert_eq!(action[0].get(&constant("+")), None);
        assert_eq!(goto[0].get(&Nonterminal::from("E")), Some(&1));
        assert_eq!(goto[0].get(&Nonterminal::from("B")), Some(&2));

        // State 1: shift on '+', accept on end of input.
        assert_eq!(action[1].get(&constant("+")), Some(&Action::Shift { state: 5 }));
        assert_eq!(action[1].get(&Terminal::Eof), Some(&Action::Accept));

        // Completed-item states reduce under both lookaheads.
        assert_eq!(action[2].get(&constant("+")), Some(&Action::Reduce { production: 1 }));
        assert_eq!(action[2].get(&Terminal::Eof), Some(&Action::Reduce { production: 1 }));
        assert_eq!(action[3].get(&Terminal::Eof), Some(&Action::Reduce { production: 2 }));
        assert_eq!(action[4].get(&Terminal::Eof), Some(&Action::Reduce { production: 3 }));
        assert_eq!(action[6].get(&Terminal::Eof), Some(&Action::Reduce { production: 0 }));
        assert_eq!(goto[5].get(&Nonterminal::from("B")), Some(&6));
    }

    #[test]
    fn shift_reduce_conflict_is_fatal() {
        let error = tables("E -> E '+' E\nE -> '1'\n").unwrap_err();
        assert_eq!(error.token, constant("+"));
        let is_shift_reduce = matches!(
            (error.existing, error.incoming),
            (Action::Shift { .. }, Action::Reduce { .. })
                | (Action::Reduce { .. }, Action::Shift { .. }),
        );
        assert!(is_shift_reduce, "unexpected conflict pair: {}", error);
    }

    #[test]
    fn reduce_reduce_conflict_is_fatal() {
        let error = tables("S -> A\nS -> B\nA -> 'a'\nB -> 'a'\n").unwrap_err();
        assert_eq!(error.token, Terminal::Eof);
        assert!(matches!(
            (error.existing, error.incoming),
            (Action::Reduce { .. }, Action::Reduce { .. }),
        ));
        assert!(error.to_string().starts_with(&format!("conflict at state {} on $", error.state)));
    }

    #[test]
    fn derivation_is_deterministic() {
        let text = "P -> E\nE -> E '+' T\nE -> T\nT -> %num\n%num -> /[0-9]+/\n";
        let (_, first_build) = tables(text).unwrap();
        let (_, second_build) = tables(text).unwrap();
        assert_eq!(first_build, second_build);
    }

    #[test]
    fn write_renders_cells() {
        let (_, tables) = tables("E -> E '+' B\nE -> B\nB -> '0'\nB -> '1'\n").unwrap();
        let mut out = Vec::new();
        tables.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("A,0,'0',shift 3"));
        assert!(text.contains("A,1,$,accept"));
        assert!(text.contains("G,0,E,1"));
    }
}
