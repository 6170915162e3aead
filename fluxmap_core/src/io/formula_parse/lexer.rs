//! Lex a formula string into a series of tokens for later parsing

use thiserror::Error;

use crate::io::formula_parse::token::Token;

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source into tokens, always terminated by [`Token::Eof`]
    pub fn lex(mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::Eof);
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            // Single Character Tokens
            '(' => self.add_token(Token::LeftParen),
            ')' => self.add_token(Token::RightParen),
            // Element symbols start upper case and absorb following lower case letters
            'A'..='Z' => self.read_element(),
            // Lower case letters on their own are a symbolic repeat count
            'a'..='z' => self.read_variable(),
            '0'..='9' => self.read_number()?,
            // Whitespace
            ' ' | '\r' | '\n' | '\t' => {}
            other => {
                return Err(LexerError::InvalidCharacter {
                    character: other,
                    position: self.start,
                })
            }
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn read_element(&mut self) {
        while self.peek().is_ascii_lowercase() {
            self.advance();
        }
        let text = self.text();
        self.add_token(Token::Element(text));
    }

    fn read_variable(&mut self) {
        while self.peek().is_ascii_lowercase() {
            self.advance();
        }
        let text = self.text();
        self.add_token(Token::Variable(text));
    }

    fn read_number(&mut self) -> Result<(), LexerError> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let text = self.text();
        match text.parse::<u64>() {
            Ok(n) => {
                self.add_token(Token::Number(n));
                Ok(())
            }
            Err(_) => Err(LexerError::InvalidNumber(text)),
        }
    }

    fn text(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    #[error("Invalid character `{character}` at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("Repeat count `{0}` is too large")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use crate::io::formula_parse::lexer::{Lexer, LexerError};
    use crate::io::formula_parse::token::Token;

    #[test]
    fn test_simple_formula() {
        let tokens = Lexer::new("C6H12O6").lex().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Element("C".to_string()),
                Token::Number(6),
                Token::Element("H".to_string()),
                Token::Number(12),
                Token::Element("O".to_string()),
                Token::Number(6),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_grouping() {
        let tokens = Lexer::new("(C2H4O)n Na").lex().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                Token::Element("C".to_string()),
                Token::Number(2),
                Token::Element("H".to_string()),
                Token::Number(4),
                Token::Element("O".to_string()),
                Token::RightParen,
                Token::Variable("n".to_string()),
                Token::Element("Na".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_invalid_character() {
        let err = Lexer::new("C6*H12").lex().unwrap_err();
        assert_eq!(
            err,
            LexerError::InvalidCharacter {
                character: '*',
                position: 2
            }
        );
    }
}
