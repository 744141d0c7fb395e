//! SQL lexer for the `CREATE TABLE` subset.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Table,
    Primary,
    /// `KEY` as written; also valid as a column name.
    Key(String),
    Foreign,
    References,
    Constraint,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    // End of input
    Eof,
}

impl fmt::Display for Token {
    /// Source-like rendering, used to rebuild column types such as `VARCHAR(50)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Create => f.write_str("CREATE"),
            Token::Table => f.write_str("TABLE"),
            Token::Primary => f.write_str("PRIMARY"),
            Token::Key(s) => f.write_str(s),
            Token::Foreign => f.write_str("FOREIGN"),
            Token::References => f.write_str("REFERENCES"),
            Token::Constraint => f.write_str("CONSTRAINT"),
            Token::Ident(s) | Token::Num(s) => f.write_str(s),
            Token::Str(s) => write!(f, "'{}'", s),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Dot => f.write_str("."),
            Token::Eof => Ok(()),
        }
    }
}

/// SQL lexer.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    current_char: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let current_char = chars.next();
        Self { chars, current_char }
    }

    fn advance(&mut self) {
        self.current_char = self.chars.next();
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        // current char is the `*` of `/*`
        self.advance();
        while let Some(c) = self.current_char {
            self.advance();
            if c == '*' && self.current_char == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char {
            if c.is_alphanumeric() || c == '_' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Read up to `close`; a doubled closing quote is an escaped quote.
    fn read_quoted(&mut self, close: char) -> String {
        self.advance(); // opening quote
        let mut s = String::new();
        while let Some(c) = self.current_char {
            if c == close {
                if close != ']' && self.peek() == Some(&close) {
                    s.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else {
                s.push(c);
                self.advance();
            }
        }
        s
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        while let Some(c) = self.current_char {
            if c.is_ascii_digit() || c == '.' {
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(s: String) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "TABLE" => Token::Table,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key(s),
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "CONSTRAINT" => Token::Constraint,
            _ => Token::Ident(s),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            match self.current_char {
                None => return Token::Eof,

                Some('-') => {
                    if self.peek() == Some(&'-') {
                        self.skip_line_comment();
                    } else {
                        self.advance();
                    }
                }
                Some('/') => {
                    self.advance();
                    if self.current_char == Some('*') {
                        self.skip_block_comment();
                    }
                }
                Some('#') => self.skip_line_comment(),

                Some('(') => {
                    self.advance();
                    return Token::LParen;
                }
                Some(')') => {
                    self.advance();
                    return Token::RParen;
                }
                Some(',') => {
                    self.advance();
                    return Token::Comma;
                }
                Some(';') => {
                    self.advance();
                    return Token::Semicolon;
                }
                Some('.') => {
                    self.advance();
                    return Token::Dot;
                }

                // Quoted identifiers never become keywords.
                Some('"') => return Token::Ident(self.read_quoted('"')),
                Some('`') => return Token::Ident(self.read_quoted('`')),
                Some('[') => return Token::Ident(self.read_quoted(']')),
                Some('\'') => return Token::Str(self.read_quoted('\'')),

                Some(c) if c.is_ascii_digit() => return Token::Num(self.read_number()),
                Some(c) if c.is_alphabetic() || c == '_' => {
                    let ident = self.read_identifier();
                    return Self::keyword_or_ident(ident);
                }

                // Operators and anything else outside the subset.
                Some(_) => self.advance(),
            }
        }
    }

    /// Collect all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}
