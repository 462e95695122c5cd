//! Step-by-step parse traces.
//!
//! A trace is an owned, ordered log produced by a complete run of the
//! parser; one [`Step`] records the machine's configuration at the moment
//! an action was chosen. Traces are plain values, trivially comparable and
//! replayable in tests.

use crate::error::Spanned;
use crate::grammar::{Symbol, Token};
use crate::tables::Action;
use std::io::{self, Write};

/// One parser transition: the stacks and lookahead at decision time, and
/// the action taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    states: Vec<usize>,
    symbols: Vec<Symbol>,
    lookahead: Spanned<Token>,
    action: Action,
}

impl Step {
    pub(crate) fn new(
        states: Vec<usize>,
        symbols: Vec<Symbol>,
        lookahead: Spanned<Token>,
        action: Action,
    ) -> Self {
        Self { states, symbols, lookahead, action }
    }

    /// The state stack, bottom first.
    pub fn state_stack(&self) -> &[usize] {
        &self.states
    }

    /// The symbols recognized so far, bottom first.
    pub fn symbol_stack(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The lookahead token the action was chosen on.
    pub fn lookahead(&self) -> &Spanned<Token> {
        &self.lookahead
    }

    /// The action taken from this configuration.
    pub fn action_taken(&self) -> &Action {
        &self.action
    }
}

/// The ordered log of one parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    steps: Vec<Step>,
}

impl Trace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Writes the log to `out`, one
    /// `N,<step>,<states>,<symbols>,<lookahead>,<action>` line per step.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "NS,{}\n", self.steps.len())?;
        for (index, step) in self.steps.iter().enumerate() {
            let states =
                step.states.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(" ");
            let symbols =
                step.symbols.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ");
            writeln!(
                out,
                "N,{},{},{},{},{}",
                index,
                states,
                symbols,
                step.lookahead.value(),
                step.action,
            )?;
        }
        Ok(())
    }
}
