//! Shared grammar fixtures for the integration suites.

#![allow(dead_code)]

pub mod grammars {
    /// Left-recursive arithmetic over single-digit-or-more numbers.
    pub const MATH: &str = "
P -> E
E -> E '+' T
E -> E '-' T
E -> T
T -> %num
%num -> /[0-9]+/
";

    /// The smallest grammar with interesting FIRST/FOLLOW sets.
    pub const BINARY_ADDITION: &str = "
E -> E '+' B
E -> B
B -> '0'
B -> '1'
";

    /// Four levels of precedence, parenthesized grouping, decimal numbers.
    pub const CALCULATOR: &str = "
Expr -> Expr '+' Factor
Expr -> Expr '-' Factor
Expr -> Factor
Factor -> Factor '*' Exponent
Factor -> Factor '/' Exponent
Factor -> Exponent
Exponent -> Term '^' Exponent
Exponent -> Term
Term -> '(' Expr ')'
Term -> %f
%f -> /[0-9]+(\\.[0-9]+)?/
";

    /// A grammar with nullable nonterminals.
    pub const OPTIONAL_PREFIX: &str = "
S -> A B 'x'
A -> 'a'
A ->
B -> 'b'
B ->
";

    /// Ambiguous: after `E '+' E` the next `'+'` can extend either side.
    pub const SHIFT_REDUCE_CONFLICT: &str = "
E -> E '+' E
E -> '1'
";

    /// Ambiguous: `'a'` completes two different nonterminals at once.
    pub const REDUCE_REDUCE_CONFLICT: &str = "
S -> A
S -> B
A -> 'a'
B -> 'a'
";

    /// Grammars that construct under both LR(1) and LALR(1).
    pub const CORRECT: &[&str] = &[MATH, BINARY_ADDITION, CALCULATOR, OPTIONAL_PREFIX];

    /// Grammars that are rejected at parser construction time.
    pub const AMBIGUOUS: &[&str] = &[SHIFT_REDUCE_CONFLICT, REDUCE_REDUCE_CONFLICT];

    /// Grammar texts rejected by `Grammar::parse` itself.
    pub const INVALID: &[&str] = &[
        "",
        "# nothing but a comment\n",
        "S -> E '+' F\nE -> '1'\n",
        "E -> %i '+' %i\n",
        "S -> %a\n%a -> /x/\n%a -> /y/\n",
        "S -> 'x'\n-> E\n",
    ];
}
