//! Parse trees.
//!
//! A successful parse yields one [`Tree`]: terminal leaves carry the matched
//! token with its span, nonterminal nodes carry their children in rhs order.
//! `Display` renders the tree with box-drawing branches.

use crate::error::Spanned;
use crate::grammar::{Nonterminal, Symbol, Token};
use std::fmt;

/// One node of a parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    /// A shifted token.
    Terminal(Spanned<Token>),
    /// A reduced production: the lhs nonterminal over its rhs derivations.
    Nonterminal { symbol: Nonterminal, children: Vec<Tree> },
}

impl Tree {
    /// The grammar symbol this node derives.
    pub fn symbol(&self) -> Symbol {
        match self {
            Tree::Terminal(token) => Symbol::Terminal(token.kind().clone()),
            Tree::Nonterminal { symbol, .. } => Symbol::Nonterminal(symbol.clone()),
        }
    }

    /// Child nodes; empty for terminal leaves.
    pub fn children(&self) -> &[Tree] {
        match self {
            Tree::Terminal(_) => &[],
            Tree::Nonterminal { children, .. } => children,
        }
    }

    fn label(&self) -> String {
        match self {
            Tree::Terminal(token) => token.value().to_string(),
            Tree::Nonterminal { symbol, .. } => symbol.to_string(),
        }
    }

    fn fmt_children(&self, f: &mut fmt::Formatter<'_>, prefix: &str) -> fmt::Result {
        let children = self.children();
        for (index, child) in children.iter().enumerate() {
            let last = index + 1 == children.len();
            writeln!(f, "{}{} {}", prefix, if last { "└─" } else { "├─" }, child.label())?;
            let extended = format!("{}{}", prefix, if last { "   " } else { "│  " });
            child.fmt_children(f, &extended)?;
        }
        Ok(())
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label())?;
        self.fmt_children(f, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;
    use crate::grammar::Terminal;
    use pretty_assertions::assert_eq;

    fn leaf(lexeme: &str) -> Tree {
        Tree::Terminal(Spanned::new(
            Token::new(Terminal::Constant(lexeme.into()), lexeme.into()),
            Span::new(0, lexeme.len(), 1, 1),
        ))
    }

    #[test]
    fn renders_nested_branches() {
        let tree = Tree::Nonterminal {
            symbol: "E".into(),
            children: vec![
                Tree::Nonterminal { symbol: "E".into(), children: vec![leaf("1")] },
                leaf("+"),
                Tree::Nonterminal { symbol: "B".into(), children: vec![leaf("0")] },
            ],
        };
        let expected = "
E
├─ E
│  └─ 1
├─ +
└─ B
   └─ 0
";
        assert_eq!(tree.to_string().trim(), expected.trim());
    }

    #[test]
    fn symbol_and_children_accessors() {
        let tree = Tree::Nonterminal { symbol: "E".into(), children: vec![leaf("1")] };
        assert_eq!(tree.symbol(), Symbol::Nonterminal("E".into()));
        assert_eq!(tree.children().len(), 1);
        assert_eq!(tree.children()[0].symbol(), Symbol::Terminal(Terminal::Constant("1".into())));
        assert!(tree.children()[0].children().is_empty());
    }
}
