mod common;

use lrgram::{Grammar, GrammarError, Nonterminal, Terminal};
use pretty_assertions::assert_eq;

#[test]
fn parsing_every_correct_grammar() {
    for text in common::grammars::CORRECT {
        assert!(Grammar::parse(text).is_ok(), "failed to parse:\n{}", text);
    }
}

#[test]
fn rejecting_every_invalid_grammar() {
    for text in common::grammars::INVALID {
        assert!(Grammar::parse(text).is_err(), "accepted invalid grammar:\n{}", text);
    }
}

#[test]
fn reporting_empty_grammar() {
    assert_eq!(Grammar::parse("").unwrap_err().to_string(), "grammar is empty");
}

#[test]
fn reporting_undefined_symbol_with_its_rule() {
    let error = Grammar::parse("S -> E '+' F\nE -> '1'\n").unwrap_err();
    assert_eq!(error.to_string(), "symbol F in rule S -> E '+' F is not defined");
}

#[test]
fn reporting_undefined_regex_token_with_its_rule() {
    let error = Grammar::parse("E -> %i '+' %i\n").unwrap_err();
    assert_eq!(error.to_string(), "regex token %i in rule E -> %i '+' %i is not defined");
}

#[test]
fn reporting_duplicate_regex_token() {
    let error = Grammar::parse("S -> %a\n%a -> /x/\n%a -> /y/\n").unwrap_err();
    assert_eq!(error.to_string(), "regex token %a is defined more than once");
}

#[test]
fn accessors_expose_the_declared_grammar() {
    let grammar = Grammar::parse(common::grammars::MATH).unwrap();

    assert_eq!(
        grammar.symbols().iter().cloned().collect::<Vec<_>>(),
        ["P", "E", "T"].map(Nonterminal::from),
    );
    assert_eq!(grammar.start_symbol(), &Nonterminal::from("P"));
    assert_eq!(grammar.productions().len(), 5);
    assert_eq!(grammar.productions()[4].to_string(), "T -> %num");
    assert_eq!(
        grammar.constant_tokens().iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        vec!["+", "-"],
    );
    assert_eq!(grammar.regex_tokens()["num"].as_str(), "[0-9]+");
}

#[test]
fn stringify_round_trips_every_correct_grammar() {
    for text in common::grammars::CORRECT {
        let grammar = Grammar::parse(text).unwrap();
        let reparsed = Grammar::parse(&grammar.to_string()).unwrap();
        assert_eq!(reparsed.productions(), grammar.productions());
        assert_eq!(reparsed.symbols(), grammar.symbols());
        assert_eq!(reparsed.constant_tokens(), grammar.constant_tokens());
        assert_eq!(reparsed.start_symbol(), grammar.start_symbol());
        let regexes =
            |g: &Grammar| g.regex_tokens().iter().map(|(n, r)| (n.clone(), r.as_str().to_owned())).collect::<Vec<_>>();
        assert_eq!(regexes(&reparsed), regexes(&grammar));
    }
}

#[test]
fn explicit_start_survives_round_trip() {
    let grammar = Grammar::parse("@start E\nP -> E\nE -> '1'\n").unwrap();
    assert_eq!(grammar.start_symbol(), &Nonterminal::from("E"));
    let reparsed = Grammar::parse(&grammar.to_string()).unwrap();
    assert_eq!(reparsed.start_symbol(), &Nonterminal::from("E"));
}

#[test]
fn clones_are_value_independent() {
    let grammar = Grammar::parse(common::grammars::CALCULATOR).unwrap();
    let copy = grammar.clone();
    drop(grammar);
    assert_eq!(copy.productions().len(), 10);
    assert_eq!(copy.regex_tokens()["f"].as_str(), "[0-9]+(\\.[0-9]+)?");
}

#[test]
fn terminals_render_as_written() {
    assert_eq!(Terminal::Constant("+".into()).to_string(), "'+'");
    assert_eq!(Terminal::Pattern("num".into()).to_string(), "%num");
    assert_eq!(Terminal::Eof.to_string(), "$");
}
