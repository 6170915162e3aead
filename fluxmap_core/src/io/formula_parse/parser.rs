use crate::io::formula_parse::token::Token;
use crate::metabolic_model::formula::Formula;

use thiserror::Error;
/*
Formula Grammar:
formula -> sequence EOF ;
sequence -> term* ;
term -> ( ELEMENT | "(" sequence ")" ) multiplier? ;
multiplier -> NUMBER | VARIABLE ;

e.g. C6H12O6, (CH2)2COOH, (C2H4O)n
 */

/// Element symbols standing in for an unspecified chemical group
const GENERIC_SYMBOLS: [&str; 2] = ["R", "X"];

/// Formula Parser
pub struct FormulaParser {
    /// Vector of tokens from the formula string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
}

impl FormulaParser {
    /// Create a new FormulaParser
    pub fn new(tokens: Vec<Token>) -> FormulaParser {
        FormulaParser { tokens, current: 0 }
    }

    // region Parsing Functions

    /// Parse the token vector into a flattened formula
    pub fn parse(&mut self) -> Result<Formula, ParseError> {
        let formula = self.sequence()?;
        if !self.is_at_end() {
            // Only an unmatched `)` can stop a sequence early
            return Err(ParseError::UnmatchedParen);
        }
        Ok(formula)
    }

    fn sequence(&mut self) -> Result<Formula, ParseError> {
        let mut formula = Formula::default();
        while !self.is_at_end() && !self.check(&Token::RightParen) {
            let (term, empty) = self.term()?;
            let repeat = self.multiplier()?;
            match repeat {
                Repeat::Times(n) => formula.merge(&term, n).ok_or(ParseError::CountOverflow)?,
                Repeat::Variable => {
                    formula.merge(&term, 1).ok_or(ParseError::CountOverflow)?;
                    formula.mark_variable();
                }
            }
            if empty {
                return Err(ParseError::EmptyGroup);
            }
        }
        Ok(formula)
    }

    /// Parse one element or group, also reporting whether it was an empty group
    fn term(&mut self) -> Result<(Formula, bool), ParseError> {
        match self.advance() {
            Token::Element(symbol) => {
                let mut formula = Formula::default();
                if GENERIC_SYMBOLS.contains(&symbol.as_str()) {
                    formula.mark_variable();
                } else {
                    formula.add(&symbol, 1);
                }
                Ok((formula, false))
            }
            Token::LeftParen => {
                let inner = self.sequence()?;
                self.consume(Token::RightParen)?;
                let empty = inner.is_empty() && !inner.is_variable();
                Ok((inner, empty))
            }
            token => Err(ParseError::UnexpectedToken(format!("{:?}", token))),
        }
    }

    fn multiplier(&mut self) -> Result<Repeat, ParseError> {
        match self.peek() {
            Token::Number(0) => Err(ParseError::ZeroCount),
            Token::Number(n) => {
                self.advance();
                Ok(Repeat::Times(n))
            }
            Token::Variable(_) => {
                self.advance();
                Ok(Repeat::Variable)
            }
            _ => Ok(Repeat::Times(1)),
        }
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// Check whether the current token matches the provided `token`
    fn check(&self, token: &Token) -> bool {
        if self.is_at_end() {
            return false;
        }
        &self.peek() == token
    }

    /// Advance `self.current` one position unless at end of token Vec, then return the
    /// previous token.
    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
            return self.tokens[self.current - 1].clone();
        }
        Token::Eof
    }

    /// Check whether the parser is at the end of the source Vec
    fn is_at_end(&self) -> bool {
        self.peek() == Token::Eof
    }

    /// Get a copy of the current token
    fn peek(&self) -> Token {
        self.tokens
            .get(self.current)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    /// Check whether the current token matches an input token, if it matches advance to the
    /// next token, and if it doesn't return an error.
    fn consume(&mut self, token: Token) -> Result<Token, ParseError> {
        if self.check(&token) {
            return Ok(self.advance());
        }
        Err(ParseError::UnmatchedParen)
    }

    // endregion parsing helper functions
}

enum Repeat {
    Times(u64),
    Variable,
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// A token appeared where an element or group was expected
    #[error("Unexpected token {0}, expected an element or a group")]
    UnexpectedToken(String),
    /// Parenthesis do not match up
    #[error("Unmatched parenthesis")]
    UnmatchedParen,
    /// Group contains nothing
    #[error("Empty group `()`")]
    EmptyGroup,
    /// Repeat count of zero
    #[error("Repeat count must be at least 1")]
    ZeroCount,
    /// An element count does not fit in 64 bits
    #[error("Element count overflows")]
    CountOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::formula_parse::lexer::Lexer;

    fn parse(input: &str) -> Result<Formula, ParseError> {
        let tokens = Lexer::new(input).lex().unwrap();
        FormulaParser::new(tokens).parse()
    }

    #[test]
    fn plain_formula() {
        let formula = parse("C6H12O6").unwrap();
        assert_eq!(formula, Formula::from_elements([("C", 6), ("H", 12), ("O", 6)]));
        assert!(!formula.is_variable());
    }

    #[test]
    fn repeated_elements_accumulate() {
        let formula = parse("CH3COOH").unwrap();
        assert_eq!(formula, Formula::from_elements([("C", 2), ("H", 4), ("O", 2)]));
    }

    #[test]
    fn nested_groups() {
        let formula = parse("C((CH2)2O)3").unwrap();
        assert_eq!(formula, Formula::from_elements([("C", 7), ("H", 12), ("O", 3)]));
    }

    #[test]
    fn variable_groups() {
        let polymer = parse("(C6H10O5)n").unwrap();
        assert!(polymer.is_variable());
        let radical = parse("C5H9O2R").unwrap();
        assert!(radical.is_variable());
        assert_eq!(radical.count("C"), 5);
    }

    #[test]
    fn malformed_formulas() {
        assert_eq!(parse("(CH2"), Err(ParseError::UnmatchedParen));
        assert_eq!(parse("CH2)"), Err(ParseError::UnmatchedParen));
        assert_eq!(parse("C()2"), Err(ParseError::EmptyGroup));
        assert_eq!(parse("C0"), Err(ParseError::ZeroCount));
        assert!(matches!(parse("2C"), Err(ParseError::UnexpectedToken(_))));
    }

    #[test]
    fn overflowing_counts() {
        assert_eq!(parse("(C2)18446744073709551615"), Err(ParseError::CountOverflow));
        assert_eq!(
            parse("C18446744073709551615C"),
            Err(ParseError::CountOverflow)
        );
        assert_eq!(parse("C18446744073709551615").unwrap().count("C"), u64::MAX);
    }
}
