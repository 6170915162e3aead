//! Module for parsing chemical formula strings into flattened formulas

use crate::io::formula_parse::lexer::LexerError;
use crate::io::formula_parse::parser::ParseError;
use crate::metabolic_model::formula::Formula;
use thiserror::Error;

pub mod lexer;
pub mod parser;
pub mod token;

/// Parse a chemical formula string into a flattened [`Formula`]
///
/// # Parameters
/// - `input`: &str representing the formula, e.g. `C6H12O6` or `(C2H4O)n`
///
/// # Returns
/// Parse result which is
/// - `Ok`: The flattened formula, possibly marked as variable.
/// - `Err`: Returns the FormulaParseError describing the issue with the formula which
///     was being parsed.
///
/// # Examples
/// ```rust
/// use fluxmap_core::io::formula_parse::parse_formula;
/// let formula = parse_formula("(CH2)2O").unwrap();
/// assert_eq!(formula.count("H"), 4);
/// ```
pub fn parse_formula(input: &str) -> Result<Formula, FormulaParseError> {
    let tokens = lexer::Lexer::new(input).lex()?;
    let mut parser = parser::FormulaParser::new(tokens);
    Ok(parser.parse()?)
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum FormulaParseError {
    /// Lexing Error
    #[error("Error occurred during lexing of formula: {0}")]
    LexingError(#[from] LexerError),
    /// Parsing Error
    #[error("Error occurred during parsing of formula: {0}")]
    ParsingError(#[from] ParseError),
}
