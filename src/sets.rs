//! FIRST and FOLLOW set computation.
//!
//! Both tables are least fixpoints, computed by repeated full passes over
//! the production list until a pass changes nothing. Nullability is tracked
//! alongside FIRST instead of an epsilon pseudo-terminal. Recomputing over
//! an already-computed grammar yields identical tables.

use crate::grammar::{Grammar, Nonterminal, Symbol, Terminal};
use indexmap::{IndexMap, IndexSet};
use std::io::{self, Write};
use std::ops::Deref;

/// FIRST sets of every nonterminal, plus the set of nullable nonterminals.
///
/// `FIRST(t) = { t }` for terminals, so only nonterminals are tabulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstTable {
    sets: IndexMap<Nonterminal, IndexSet<Terminal>>,
    nullable: IndexSet<Nonterminal>,
}

impl FirstTable {
    /// Computes FIRST sets for `grammar`.
    pub fn of(grammar: &Grammar) -> Self {
        let mut sets: IndexMap<Nonterminal, IndexSet<Terminal>> =
            grammar.symbols().iter().map(|symbol| (symbol.clone(), IndexSet::new())).collect();
        let mut nullable = IndexSet::new();

        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions() {
                let lhs = production.lhs();
                let mut all_nullable = true;
                for symbol in production.rhs() {
                    match symbol {
                        Symbol::Terminal(terminal) => {
                            if sets[lhs.name()].insert(terminal.clone()) {
                                changed = true;
                            }
                            all_nullable = false;
                        }
                        Symbol::Nonterminal(nonterminal) => {
                            // Snapshot to release the borrow before inserting.
                            let first = sets[nonterminal.name()].clone();
                            for terminal in first {
                                if sets[lhs.name()].insert(terminal) {
                                    changed = true;
                                }
                            }
                            if !nullable.contains(nonterminal) {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && nullable.insert(lhs.clone()) {
                    changed = true;
                }
            }
        }

        Self { sets, nullable }
    }

    /// Whether `nonterminal` can derive the empty string.
    pub fn is_nullable(&self, nonterminal: &Nonterminal) -> bool {
        self.nullable.contains(nonterminal)
    }

    /// The nullable nonterminals.
    pub fn nullable(&self) -> &IndexSet<Nonterminal> {
        &self.nullable
    }

    /// FIRST of a symbol sequence, and whether the whole sequence is
    /// nullable. This is the FIRST(beta) used in closure and FOLLOW.
    pub(crate) fn first_of(&self, symbols: &[Symbol]) -> (IndexSet<Terminal>, bool) {
        let mut first = IndexSet::new();
        for symbol in symbols {
            match symbol {
                Symbol::Terminal(terminal) => {
                    first.insert(terminal.clone());
                    return (first, false);
                }
                Symbol::Nonterminal(nonterminal) => {
                    first.extend(self.sets[nonterminal.name()].iter().cloned());
                    if !self.nullable.contains(nonterminal) {
                        return (first, false);
                    }
                }
            }
        }
        (first, true)
    }

    /// Writes the table to `out`, one `FIRST,<symbol>,{...}` line per
    /// nonterminal, with `` `empty' `` marking nullability.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (symbol, set) in &self.sets {
            write!(out, "FIRST,{},{{", symbol)?;
            if self.nullable.contains(symbol) {
                write!(out, "`empty', ")?;
            }
            for terminal in set {
                write!(out, "{}, ", terminal)?;
            }
            writeln!(out, "}}")?;
        }
        Ok(())
    }
}

impl Deref for FirstTable {
    type Target = IndexMap<Nonterminal, IndexSet<Terminal>>;

    fn deref(&self) -> &Self::Target {
        &self.sets
    }
}

/// FOLLOW sets of every nonterminal. The start symbol's set always contains
/// the end-of-input terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowTable {
    sets: IndexMap<Nonterminal, IndexSet<Terminal>>,
}

impl FollowTable {
    /// Computes FOLLOW sets for `grammar` from its FIRST sets.
    pub fn of(grammar: &Grammar, first: &FirstTable) -> Self {
        let mut sets: IndexMap<Nonterminal, IndexSet<Terminal>> =
            grammar.symbols().iter().map(|symbol| (symbol.clone(), IndexSet::new())).collect();
        sets[grammar.start_symbol().name()].insert(Terminal::Eof);

        let mut changed = true;
        while changed {
            changed = false;
            for production in grammar.productions() {
                let lhs = production.lhs();
                let rhs = production.rhs();
                for (position, symbol) in rhs.iter().enumerate() {
                    let Symbol::Nonterminal(nonterminal) = symbol else {
                        continue;
                    };
                    let (beta_first, beta_nullable) = first.first_of(&rhs[position + 1..]);
                    for terminal in beta_first {
                        if sets[nonterminal.name()].insert(terminal) {
                            changed = true;
                        }
                    }
                    if beta_nullable {
                        let lhs_follow = sets[lhs.name()].clone();
                        for terminal in lhs_follow {
                            if sets[nonterminal.name()].insert(terminal) {
                                changed = true;
                            }
                        }
                    }
                }
            }
        }

        Self { sets }
    }

    /// Writes the table to `out`, one `FOLLOW,<symbol>,{...}` line per
    /// nonterminal.
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (symbol, set) in &self.sets {
            write!(out, "FOLLOW,{},{{", symbol)?;
            for terminal in set {
                write!(out, "{}, ", terminal)?;
            }
            writeln!(out, "}}")?;
        }
        Ok(())
    }
}

impl Deref for FollowTable {
    type Target = IndexMap<Nonterminal, IndexSet<Terminal>>;

    fn deref(&self) -> &Self::Target {
        &self.sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use pretty_assertions::assert_eq;

    fn terminals(items: &[Terminal]) -> IndexSet<Terminal> {
        items.iter().cloned().collect()
    }

    fn constant(text: &str) -> Terminal {
        Terminal::Constant(text.into())
    }

    #[test]
    fn binary_addition_first_sets() {
        let grammar = Grammar::parse("E -> E '+' B\nE -> B\nB -> '0'\nB -> '1'\n").unwrap();
        let first = FirstTable::of(&grammar);
        assert_eq!(first["E"], terminals(&[constant("0"), constant("1")]));
        assert_eq!(first["B"], terminals(&[constant("0"), constant("1")]));
        assert!(first.nullable().is_empty());
    }

    #[test]
    fn binary_addition_follow_sets() {
        let grammar = Grammar::parse("E -> E '+' B\nE -> B\nB -> '0'\nB -> '1'\n").unwrap();
        let first = FirstTable::of(&grammar);
        let follow = FollowTable::of(&grammar, &first);
        assert_eq!(follow["E"], terminals(&[Terminal::Eof, constant("+")]));
        assert_eq!(follow["B"], terminals(&[Terminal::Eof, constant("+")]));
    }

    #[test]
    fn nullable_chains_propagate() {
        // A and B are nullable, so FIRST(S) sees through both and FOLLOW(A)
        // picks up FIRST(B) as well as what follows S.
        let grammar =
            Grammar::parse("S -> A B 'x'\nA -> 'a'\nA ->\nB -> 'b'\nB ->\n").unwrap();
        let first = FirstTable::of(&grammar);
        assert_eq!(first["S"], terminals(&[constant("a"), constant("b"), constant("x")]));
        assert!(first.is_nullable(&"A".into()));
        assert!(first.is_nullable(&"B".into()));
        assert!(!first.is_nullable(&"S".into()));

        let follow = FollowTable::of(&grammar, &first);
        assert_eq!(follow["A"], terminals(&[constant("b"), constant("x")]));
        assert_eq!(follow["B"], terminals(&[constant("x")]));
    }

    #[test]
    fn fully_nullable_start() {
        let grammar = Grammar::parse("S -> A A\nA ->\nA -> 'a'\n").unwrap();
        let first = FirstTable::of(&grammar);
        assert!(first.is_nullable(&"S".into()));
        let follow = FollowTable::of(&grammar, &first);
        // A is followed by A's first set and, through nullability, by
        // everything that follows S.
        assert_eq!(follow["A"], terminals(&[constant("a"), Terminal::Eof]));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let grammar =
            Grammar::parse("P -> E\nE -> E '+' T\nE -> T\nT -> %num\n%num -> /[0-9]+/\n").unwrap();
        let first = FirstTable::of(&grammar);
        let follow = FollowTable::of(&grammar, &first);
        assert_eq!(FirstTable::of(&grammar), first);
        assert_eq!(FollowTable::of(&grammar, &first), follow);
    }

    #[test]
    fn first_of_sequence() {
        let grammar = Grammar::parse("S -> A 'x'\nA -> 'a'\nA ->\n").unwrap();
        let first = FirstTable::of(&grammar);
        let rhs = grammar.productions()[0].rhs();
        let (set, nullable) = first.first_of(rhs);
        assert_eq!(set, terminals(&[constant("a"), constant("x")]));
        assert!(!nullable);
        let (set, nullable) = first.first_of(&rhs[..1]);
        assert_eq!(set, terminals(&[constant("a")]));
        assert!(nullable);
    }
}
