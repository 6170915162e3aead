//! Module providing Token struct for lexing

/// Represents Tokens in a chemical formula
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub enum Token {
    /// Element symbol, e.g. `C` or `Na`
    Element(String),
    /// Repeat count
    Number(u64),
    /// Symbolic repeat count, e.g. the `n` of `(C2H4O)n`
    Variable(String),
    LeftParen,
    RightParen,
    Eof,
}
