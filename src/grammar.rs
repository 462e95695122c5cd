//! Grammar definition model.
//!
//! This module turns grammar definition text into an immutable [`Grammar`]:
//! an ordered list of productions, the start nonterminal, and the terminal
//! definitions the tokenizer runs on. Lexing of the definition text is done
//! with a declarative [`logos`] token specification; the line shapes are
//! then matched directly, so every error carries an exact line number.
//!
//! The accepted forms, one per line:
//!
//! ```text
//! # comment
//! @start Expr
//! %num -> /[0-9]+/
//! Expr -> Expr '+' Term
//! Expr -> Term
//! Term -> %num
//! ```

use crate::error::GrammarError;
use indexmap::{IndexMap, IndexSet};
use logos::Logos;
use regex::Regex;
use smartstring::alias::String;
use std::fmt;

/// A terminal symbol: either an exact literal, a regex-defined token, or
/// the synthetic end-of-input marker.
///
/// Displays the way it is written in grammar text (`'+'`, `%num`) with `$`
/// for end-of-input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    /// An exact literal, e.g. `'+'`. Carries the literal text.
    Constant(String),
    /// A regex-defined token, e.g. `%num`. Carries the token name.
    Pattern(String),
    /// End of input, rendered as `$`.
    Eof,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Constant(lexeme) => write!(f, "'{}'", lexeme),
            Terminal::Pattern(name) => write!(f, "%{}", name),
            Terminal::Eof => write!(f, "$"),
        }
    }
}

/// A nonterminal symbol, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonterminal(String);

impl Nonterminal {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Nonterminal {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl std::borrow::Borrow<str> for Nonterminal {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An element of a production right hand side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    Nonterminal(Nonterminal),
}

impl From<Terminal> for Symbol {
    fn from(terminal: Terminal) -> Self {
        Symbol::Terminal(terminal)
    }
}

impl From<Nonterminal> for Symbol {
    fn from(nonterminal: Nonterminal) -> Self {
        Symbol::Nonterminal(nonterminal)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(terminal) => terminal.fmt(f),
            Symbol::Nonterminal(nonterminal) => nonterminal.fmt(f),
        }
    }
}

/// One rewrite rule `lhs -> rhs`, identified by its index in
/// [`Grammar::productions`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    lhs: Nonterminal,
    rhs: Vec<Symbol>,
}

impl Production {
    pub fn new(lhs: Nonterminal, rhs: Vec<Symbol>) -> Self {
        Self { lhs, rhs }
    }

    pub fn lhs(&self) -> &Nonterminal {
        &self.lhs
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

/// One lexed token of an input string: the terminal it matched and the
/// matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: Terminal,
    lexeme: String,
}

impl Token {
    pub fn new(kind: Terminal, lexeme: String) -> Self {
        Self { kind, lexeme }
    }

    pub fn kind(&self) -> &Terminal {
        &self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Terminal::Eof => write!(f, "$"),
            _ => write!(f, "{}", self.lexeme),
        }
    }
}

/// Raw tokens of the grammar definition language.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum RawToken {
    /// Line break, marking a rule boundary.
    #[regex(r"\n")]
    LineFeed,

    /// A comment running to the end of the line.
    #[regex(r"#[^\n]*")]
    Comment,

    /// The production separator.
    #[token("->")]
    Arrow,

    /// The explicit start-symbol marker.
    #[token("@start")]
    Start,

    /// A nonterminal name.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// A `%name` reference or definition head.
    #[regex(r"%[A-Za-z_][A-Za-z0-9_]*")]
    Percent,

    /// A quoted constant token.
    #[regex(r"'[^'\n]*'")]
    Literal,

    /// A `/regex/` pattern body.
    #[regex(r"/(?:[^/\\\n]|\\.)*/")]
    Regex,
}

/// One rhs element as written, before name resolution.
#[derive(Debug, Clone)]
enum RawSymbol {
    Ident(String),
    Pattern(String),
    Literal(String),
}

/// An immutable grammar: productions in declaration order, the start
/// nonterminal, and the constant/pattern token definitions.
///
/// Built once by [`Grammar::parse`] and never mutated afterwards. `Clone`
/// yields a value-independent copy that shares no mutable state with the
/// original.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: IndexSet<Nonterminal>,
    productions: Vec<Production>,
    start: Nonterminal,
    constant_tokens: IndexSet<String>,
    regex_tokens: IndexMap<String, Regex>,
    explicit_start: bool,
}

impl Grammar {
    /// Parses and validates grammar definition text.
    ///
    /// Every nonterminal referenced in a rhs must appear as the lhs of some
    /// rule, every `%name` reference must have a definition, pattern names
    /// must be unique, and at least one production must exist. All failures
    /// are reported as [`GrammarError`]s.
    pub fn parse(text: &str) -> Result<Grammar, GrammarError> {
        let lines = lex_lines(text)?;

        let mut raw_productions: Vec<(String, Vec<RawSymbol>, usize)> = Vec::new();
        let mut constant_tokens = IndexSet::new();
        let mut regex_tokens: IndexMap<String, Regex> = IndexMap::new();
        let mut start_override: Option<String> = None;

        for (line_no, line) in lines {
            match line.as_slice() {
                [] => {}
                [(RawToken::Start, _), (RawToken::Ident, name)] => {
                    if start_override.is_some() {
                        return Err(GrammarError::MalformedRule { line: line_no });
                    }
                    start_override = Some(name.clone());
                }
                [(RawToken::Percent, name), (RawToken::Arrow, _), (RawToken::Regex, source)] => {
                    let name = strip_percent(name);
                    if regex_tokens.contains_key(&name) {
                        return Err(GrammarError::DuplicateRegexToken { name });
                    }
                    let source = unescape_regex(source);
                    let regex = Regex::new(&source).map_err(|error| {
                        GrammarError::InvalidRegex { name: name.clone(), reason: error.to_string().into() }
                    })?;
                    regex_tokens.insert(name, regex);
                }
                [(RawToken::Ident, lhs), (RawToken::Arrow, _), rest @ ..] => {
                    let mut rhs = Vec::with_capacity(rest.len());
                    for (kind, lexeme) in rest {
                        match kind {
                            RawToken::Ident => rhs.push(RawSymbol::Ident(lexeme.clone())),
                            RawToken::Percent => rhs.push(RawSymbol::Pattern(strip_percent(lexeme))),
                            RawToken::Literal => {
                                let literal = strip_quotes(lexeme);
                                if literal.is_empty() {
                                    return Err(GrammarError::MalformedRule { line: line_no });
                                }
                                constant_tokens.insert(literal.clone());
                                rhs.push(RawSymbol::Literal(literal));
                            }
                            _ => return Err(GrammarError::MalformedRule { line: line_no }),
                        }
                    }
                    raw_productions.push((lhs.clone(), rhs, line_no));
                }
                _ => return Err(GrammarError::MalformedRule { line: line_no }),
            }
        }

        if raw_productions.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        let symbols: IndexSet<Nonterminal> =
            raw_productions.iter().map(|(lhs, _, _)| Nonterminal(lhs.clone())).collect();

        let mut productions = Vec::with_capacity(raw_productions.len());
        for (lhs, raw_rhs, _) in &raw_productions {
            let rhs = raw_rhs
                .iter()
                .map(|raw| match raw {
                    RawSymbol::Ident(name) => Symbol::Nonterminal(Nonterminal(name.clone())),
                    RawSymbol::Pattern(name) => Symbol::Terminal(Terminal::Pattern(name.clone())),
                    RawSymbol::Literal(text) => Symbol::Terminal(Terminal::Constant(text.clone())),
                })
                .collect();
            productions.push(Production::new(Nonterminal(lhs.clone()), rhs));
        }

        // Resolution checks run after the full production list exists, so
        // forward references within the grammar are fine.
        for production in &productions {
            for symbol in production.rhs() {
                match symbol {
                    Symbol::Nonterminal(nonterminal) => {
                        if !symbols.contains(nonterminal) {
                            return Err(GrammarError::UndefinedSymbol {
                                symbol: nonterminal.clone(),
                                production: production.clone(),
                            });
                        }
                    }
                    Symbol::Terminal(Terminal::Pattern(name)) => {
                        if !regex_tokens.contains_key(name) {
                            return Err(GrammarError::UndefinedRegexToken {
                                name: name.clone(),
                                production: production.clone(),
                            });
                        }
                    }
                    Symbol::Terminal(_) => {}
                }
            }
        }

        let explicit_start = start_override.is_some();
        let start = match start_override {
            Some(name) => {
                let nonterminal = Nonterminal(name);
                if !symbols.contains(&nonterminal) {
                    let production = Production::new(nonterminal.clone(), Vec::new());
                    return Err(GrammarError::UndefinedSymbol { symbol: nonterminal, production });
                }
                nonterminal
            }
            None => productions[0].lhs().clone(),
        };

        log::debug!(
            "parsed grammar: {} productions, {} nonterminals, {} constant tokens, {} regex tokens",
            productions.len(),
            symbols.len(),
            constant_tokens.len(),
            regex_tokens.len(),
        );

        Ok(Grammar { symbols, productions, start, constant_tokens, regex_tokens, explicit_start })
    }

    /// The declared nonterminals, in declaration order of their first rule.
    pub fn symbols(&self) -> &IndexSet<Nonterminal> {
        &self.symbols
    }

    /// The productions, in declaration order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The start nonterminal.
    pub fn start_symbol(&self) -> &Nonterminal {
        &self.start
    }

    /// The constant token literals, in declaration order.
    pub fn constant_tokens(&self) -> &IndexSet<String> {
        &self.constant_tokens
    }

    /// The pattern token definitions, in declaration order.
    pub fn regex_tokens(&self) -> &IndexMap<String, Regex> {
        &self.regex_tokens
    }

    /// Indices of the productions whose lhs is `nonterminal`.
    pub(crate) fn productions_of<'a>(
        &'a self,
        nonterminal: &'a Nonterminal,
    ) -> impl Iterator<Item = usize> + 'a {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, production)| production.lhs() == nonterminal)
            .map(|(index, _)| index)
    }
}

impl fmt::Display for Grammar {
    /// Canonical text rendering. Reparsing the output yields a grammar with
    /// the same productions, token definitions, and start symbol.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explicit_start {
            writeln!(f, "@start {}", self.start)?;
        }
        for (name, regex) in &self.regex_tokens {
            writeln!(f, "%{} -> /{}/", name, escape_regex(regex.as_str()))?;
        }
        for production in &self.productions {
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}

/// Lexes grammar text into per-line token lists, dropping comments.
fn lex_lines(text: &str) -> Result<Vec<(usize, Vec<(RawToken, String)>)>, GrammarError> {
    let mut lexer = RawToken::lexer(text);
    let mut lines = Vec::new();
    let mut current: Vec<(RawToken, String)> = Vec::new();
    let mut line_no = 1;

    while let Some(result) = lexer.next() {
        match result {
            Ok(RawToken::LineFeed) => {
                lines.push((line_no, std::mem::take(&mut current)));
                line_no += 1;
            }
            Ok(RawToken::Comment) => {}
            Ok(token) => current.push((token, lexer.slice().into())),
            Err(()) => return Err(GrammarError::MalformedRule { line: line_no }),
        }
    }
    lines.push((line_no, current));
    Ok(lines)
}

fn strip_percent(lexeme: &str) -> String {
    lexeme.trim_start_matches('%').into()
}

fn strip_quotes(lexeme: &str) -> String {
    lexeme.trim_matches('\'').into()
}

/// Undo `\/` escapes inside a `/.../` pattern body. All other escape
/// sequences belong to the regex itself and pass through untouched.
fn unescape_regex(lexeme: &str) -> std::string::String {
    let body = &lexeme[1..lexeme.len() - 1];
    body.replace("\\/", "/")
}

fn escape_regex(source: &str) -> std::string::String {
    source.replace('/', "\\/")
}
