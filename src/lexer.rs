//! Lexer for the shorthand relation / functional dependency notation.
//!
//! Lexing is total: characters outside the notation become [`Token::Other`]
//! so that callers can tell an exact `R(A, B)` line from a noisy one.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),

    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Semicolon, // ;
    Arrow,     // -> or →
    Other(char),

    Eof,
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if is_ident_char(c) {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '→' => Token::Arrow,
            '-' if self.chars.peek() == Some(&'>') => {
                self.chars.next();
                Token::Arrow
            }
            c if is_ident_char(c) => Token::Ident(self.read_ident(c)),
            c => Token::Other(c),
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            if tok == Token::Eof {
                tokens.push(tok);
                break;
            }
            tokens.push(tok);
        }
        tokens
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
