//! LR(1) item machinery and automaton construction.
//!
//! States are closure-complete item sets identified by stable integer ids in
//! breadth-first discovery order; transitions are an explicit symbol-to-id
//! map, so the automaton is a plain graph with no reference cycles. The
//! grammar is augmented internally with `S' -> Start`, addressed by the
//! sentinel production index `grammar.productions().len()`; the sentinel
//! never appears in the public production list.
//!
//! Two constructions exist over the same grammar: [`Automaton::lr1`], the
//! canonical collection distinguishing states by lookahead, and
//! [`Automaton::lalr1`], obtained from it by merging states that share a
//! core and unioning their lookaheads.

use crate::grammar::{Grammar, Nonterminal, Production, Symbol, Terminal};
use crate::sets::FirstTable;
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

/// A production with a dot position and the lookahead terminals under which
/// its completion may be reduced.
///
/// Two items are core-equal when production index and dot position match,
/// ignoring lookaheads. Core equality is the LALR(1) merge key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    production: usize,
    dot: usize,
    lookaheads: BTreeSet<Terminal>,
}

impl Item {
    pub fn new(production: usize, dot: usize, lookaheads: BTreeSet<Terminal>) -> Self {
        Self { production, dot, lookaheads }
    }

    /// Index of the item's production; `grammar.productions().len()` is the
    /// internal augmented start production.
    pub fn production(&self) -> usize {
        self.production
    }

    /// Dot position, in `0..=rhs.len()`.
    pub fn dot(&self) -> usize {
        self.dot
    }

    pub fn lookaheads(&self) -> &BTreeSet<Terminal> {
        &self.lookaheads
    }

    /// The (production, dot) pair identifying this item up to lookaheads.
    pub fn core(&self) -> (usize, usize) {
        (self.production, self.dot)
    }
}

/// A deduplicated, closure-complete item set with its outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: usize,
    items: BTreeSet<Item>,
    transitions: IndexMap<Symbol, usize>,
}

impl State {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn items(&self) -> &BTreeSet<Item> {
        &self.items
    }

    /// Outgoing transitions in grammar declaration order of their symbols.
    pub fn transitions(&self) -> &IndexMap<Symbol, usize> {
        &self.transitions
    }
}

/// Which construction produced an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonKind {
    Lr1,
    Lalr1,
}

/// The automaton: states in discovery order, state 0 the start state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    states: Vec<State>,
    kind: AutomatonKind,
    augmented: Production,
}

/// Item sets under construction: core -> lookaheads. Kept as ordered maps so
/// structural equality and hashing are stable.
type ItemMap = BTreeMap<(usize, usize), BTreeSet<Terminal>>;

impl Automaton {
    /// Builds the canonical LR(1) collection for `grammar`.
    pub fn lr1(grammar: &Grammar, first: &FirstTable) -> Self {
        let builder = Builder::new(grammar, first);
        let states = builder.collect_states();
        builder.materialize(states, AutomatonKind::Lr1)
    }

    /// Builds the LALR(1) collection: the LR(1) collection with core-equal
    /// states merged and their lookaheads unioned.
    pub fn lalr1(grammar: &Grammar, first: &FirstTable) -> Self {
        let builder = Builder::new(grammar, first);
        let lr1 = builder.collect_states();

        let mut core_ids: IndexMap<BTreeSet<(usize, usize)>, usize> = IndexMap::new();
        let mut assignment = Vec::with_capacity(lr1.len());
        for (items, _) in &lr1 {
            let core: BTreeSet<(usize, usize)> = items.keys().copied().collect();
            let next_id = core_ids.len();
            assignment.push(*core_ids.entry(core).or_insert(next_id));
        }

        let mut merged: Vec<(ItemMap, IndexMap<Symbol, usize>)> =
            vec![(ItemMap::new(), IndexMap::new()); core_ids.len()];
        for (id, (items, transitions)) in lr1.iter().enumerate() {
            let (merged_items, merged_transitions) = &mut merged[assignment[id]];
            for (core, lookaheads) in items {
                merged_items.entry(*core).or_default().extend(lookaheads.iter().cloned());
            }
            for (symbol, target) in transitions {
                merged_transitions.insert(symbol.clone(), assignment[*target]);
            }
        }
        log::debug!("merged {} LR(1) states into {} LALR(1) states", lr1.len(), merged.len());

        builder.materialize(merged, AutomatonKind::Lalr1)
    }

    /// The states, indexed by id.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn kind(&self) -> AutomatonKind {
        self.kind
    }

    /// Resolves an item's production index, mapping the internal sentinel to
    /// the augmented start production.
    pub fn production<'a>(&'a self, grammar: &'a Grammar, index: usize) -> &'a Production {
        grammar.productions().get(index).unwrap_or(&self.augmented)
    }

    /// Writes the state list to `out`: one `S,<id>,<item>` line per item
    /// with a `.` dot marker and the lookahead set, then one
    /// `T,<id>,<symbol> -> <target>` line per transition.
    pub fn write<W: Write>(&self, grammar: &Grammar, out: &mut W) -> io::Result<()> {
        writeln!(out, "SS,{}\n", self.states.len())?;
        for state in &self.states {
            for item in &state.items {
                let production = self.production(grammar, item.production());
                write!(out, "S,{},{} ->", state.id, production.lhs())?;
                for (position, symbol) in production.rhs().iter().enumerate() {
                    if position == item.dot() {
                        write!(out, " .")?;
                    }
                    write!(out, " {}", symbol)?;
                }
                if item.dot() == production.rhs().len() {
                    write!(out, " .")?;
                }
                write!(out, ",{{")?;
                for lookahead in item.lookaheads() {
                    write!(out, " {}", lookahead)?;
                }
                writeln!(out, " }}")?;
            }
            for (symbol, target) in &state.transitions {
                writeln!(out, "T,{},{} -> {}", state.id, symbol, target)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

struct Builder<'g> {
    grammar: &'g Grammar,
    first: &'g FirstTable,
    augmented: Production,
    sentinel: usize,
    alphabet: Vec<Symbol>,
}

impl<'g> Builder<'g> {
    fn new(grammar: &'g Grammar, first: &'g FirstTable) -> Self {
        let augmented = Production::new(
            Nonterminal::from("S'"),
            vec![Symbol::Nonterminal(grammar.start_symbol().clone())],
        );
        let mut alphabet: Vec<Symbol> =
            grammar.symbols().iter().cloned().map(Symbol::Nonterminal).collect();
        alphabet.extend(
            grammar
                .constant_tokens()
                .iter()
                .map(|literal| Symbol::Terminal(Terminal::Constant(literal.clone()))),
        );
        alphabet.extend(
            grammar
                .regex_tokens()
                .keys()
                .map(|name| Symbol::Terminal(Terminal::Pattern(name.clone()))),
        );
        Self { grammar, first, augmented, sentinel: grammar.productions().len(), alphabet }
    }

    fn rhs(&self, production: usize) -> &[Symbol] {
        if production == self.sentinel {
            self.augmented.rhs()
        } else {
            self.grammar.productions()[production].rhs()
        }
    }

    /// Expands `items` until every nonterminal after a dot has all of its
    /// productions present, merging lookaheads into existing cores.
    fn closure(&self, mut items: ItemMap) -> ItemMap {
        let mut changed = true;
        while changed {
            changed = false;
            for ((production, dot), lookaheads) in items.clone() {
                let rhs = self.rhs(production);
                let Some(Symbol::Nonterminal(next)) = rhs.get(dot) else {
                    continue;
                };
                let (beta_first, beta_nullable) = self.first.first_of(&rhs[dot + 1..]);
                let mut new_lookaheads: BTreeSet<Terminal> = beta_first.into_iter().collect();
                if beta_nullable {
                    new_lookaheads.extend(lookaheads.iter().cloned());
                }
                for target in self.grammar.productions_of(next) {
                    let fresh = !items.contains_key(&(target, 0));
                    let entry = items.entry((target, 0)).or_default();
                    for lookahead in &new_lookaheads {
                        if entry.insert(lookahead.clone()) {
                            changed = true;
                        }
                    }
                    if fresh {
                        changed = true;
                    }
                }
            }
        }
        items
    }

    /// Kernel of the successor of `items` on `symbol`: every item with the
    /// dot before `symbol`, advanced past it.
    fn goto_kernel(&self, items: &ItemMap, symbol: &Symbol) -> ItemMap {
        let mut kernel = ItemMap::new();
        for ((production, dot), lookaheads) in items {
            if self.rhs(*production).get(*dot) == Some(symbol) {
                kernel
                    .entry((*production, dot + 1))
                    .or_default()
                    .extend(lookaheads.iter().cloned());
            }
        }
        kernel
    }

    /// Breadth-first discovery of the canonical collection. Candidate
    /// symbols are visited in grammar declaration order, so ids are
    /// reproducible across runs.
    fn collect_states(&self) -> Vec<(ItemMap, IndexMap<Symbol, usize>)> {
        let start_kernel =
            ItemMap::from([((self.sentinel, 0), BTreeSet::from([Terminal::Eof]))]);
        let mut states: Vec<(ItemMap, IndexMap<Symbol, usize>)> =
            vec![(self.closure(start_kernel), IndexMap::new())];
        let mut ids: IndexMap<ItemMap, usize> = IndexMap::new();
        ids.insert(states[0].0.clone(), 0);

        let mut cursor = 0;
        while cursor < states.len() {
            let current = states[cursor].0.clone();
            for symbol in &self.alphabet {
                let kernel = self.goto_kernel(&current, symbol);
                if kernel.is_empty() {
                    continue;
                }
                let closed = self.closure(kernel);
                let target = match ids.get(&closed).copied() {
                    Some(id) => id,
                    None => {
                        let id = states.len();
                        log::trace!("state {} discovered from {} on {}", id, cursor, symbol);
                        ids.insert(closed.clone(), id);
                        states.push((closed, IndexMap::new()));
                        id
                    }
                };
                states[cursor].1.insert(symbol.clone(), target);
            }
            cursor += 1;
        }
        states
    }

    fn materialize(
        &self,
        states: Vec<(ItemMap, IndexMap<Symbol, usize>)>,
        kind: AutomatonKind,
    ) -> Automaton {
        let states = states
            .into_iter()
            .enumerate()
            .map(|(id, (items, transitions))| State {
                id,
                items: items
                    .into_iter()
                    .map(|((production, dot), lookaheads)| Item { production, dot, lookaheads })
                    .collect(),
                transitions,
            })
            .collect();
        Automaton { states, kind, augmented: self.augmented.clone() }
    }
}
