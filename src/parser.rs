//! Extraction of relations and functional dependencies from free-form text.
//!
//! Lines of the form `Name(A, B, C)` are shorthand relations, every other line
//! is read as FD notation. When no shorthand relation is present the whole text
//! is retried as SQL DDL. Nothing here fails: unreadable input is skipped.

use crate::ast::{FunctionalDependency, ParsedInput, Relation, SqlSchema};
use crate::infer::infer_fds;
use crate::lexer::{Lexer, Token};
use crate::sql::parse_sql;
use tracing::{debug, trace};

/// Name of the relation synthesized when only FDs were given.
pub const UNIVERSAL_RELATION: &str = "R";

/// Parse schema text into relations and FDs.
pub fn parse_input(text: &str) -> ParsedInput {
    let mut relations = Vec::new();
    let mut fds = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let tokens = Lexer::new(line).tokenize();
        match Parser::new(&tokens).parse_relation() {
            Some(rel) => relations.push(rel),
            None => fds.extend(Parser::new(&tokens).parse_fd_line()),
        }
    }

    let mut sql = None;
    if relations.is_empty() {
        let schema = parse_sql(text);
        if !schema.tables.is_empty() {
            debug!(
                tables = schema.tables.len(),
                relationships = schema.relationships.len(),
                "read input as SQL DDL"
            );
            relations.extend(relations_from_tables(&schema));
            fds.extend(infer_fds(&schema));
            sql = Some(schema);
        }
    }

    if relations.is_empty() && !fds.is_empty() {
        let attributes = fds
            .iter()
            .flat_map(|fd| fd.lhs().iter())
            .chain(fds.iter().flat_map(|fd| fd.rhs().iter()))
            .cloned()
            .collect();
        relations.push(Relation::new(UNIVERSAL_RELATION, attributes));
    }

    debug!(
        relations = relations.len(),
        fds = fds.len(),
        "parsed schema input"
    );

    ParsedInput {
        relations,
        fds,
        sql,
    }
}

/// Parse FD-only text, one or more dependencies per line.
pub fn parse_fds(text: &str) -> Vec<FunctionalDependency> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .flat_map(|line| {
            let tokens = Lexer::new(line).tokenize();
            Parser::new(&tokens).parse_fd_line()
        })
        .collect()
}

fn relations_from_tables(schema: &SqlSchema) -> Vec<Relation> {
    schema
        .tables
        .iter()
        .map(|t| Relation::new(t.name.clone(), t.column_names()))
        .collect()
}

/// Parser over the tokens of a single line.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &'t Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> &'t Token {
        let tok = self.tokens.get(self.pos).unwrap_or(&Token::Eof);
        self.pos += 1;
        tok
    }

    /// `Name ( attr {, attr} )` spanning the whole line.
    fn parse_relation(&mut self) -> Option<Relation> {
        let name = match self.advance() {
            Token::Ident(name) => name.clone(),
            _ => return None,
        };
        if *self.advance() != Token::LParen {
            return None;
        }

        let mut attributes = Vec::new();
        loop {
            match self.advance() {
                Token::Ident(attr) => attributes.push(attr.clone()),
                Token::Comma => {}
                Token::RParen => break,
                _ => return None,
            }
        }

        if *self.peek() != Token::Eof || attributes.is_empty() {
            return None;
        }
        Some(Relation::new(name, attributes))
    }

    /// All FDs on one line.
    ///
    /// `;` always ends a dependency. Within a statement, comma-separated
    /// pieces without an arrow belong to the neighbouring dependency: before
    /// the first arrow they extend the next LHS, after it the current RHS.
    fn parse_fd_line(&mut self) -> Vec<FunctionalDependency> {
        let rest = &self.tokens[self.pos.min(self.tokens.len())..];
        self.pos = self.tokens.len();

        let mut fds = Vec::new();
        for statement in rest.split(|t| matches!(t, Token::Semicolon | Token::Eof)) {
            fds.extend(parse_fd_statement(statement));
        }
        fds
    }
}

fn parse_fd_statement(tokens: &[Token]) -> Vec<FunctionalDependency> {
    let mut fds = Vec::new();
    let mut pending_lhs: Vec<String> = Vec::new();
    let mut current: Option<(Vec<String>, Vec<String>)> = None;

    for segment in tokens.split(|t| *t == Token::Comma) {
        let arrows: Vec<usize> = segment
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Token::Arrow)
            .map(|(i, _)| i)
            .collect();

        match arrows.as_slice() {
            [] => match current.as_mut() {
                Some((_, rhs)) => rhs.extend(idents(segment)),
                None => pending_lhs.extend(idents(segment)),
            },
            [arrow] => {
                fds.extend(finish(current.take()));
                let mut lhs = std::mem::take(&mut pending_lhs);
                lhs.extend(idents(&segment[..*arrow]));
                current = Some((lhs, idents(&segment[arrow + 1..])));
            }
            _ => {
                trace!(arrows = arrows.len(), "dropping segment with several arrows");
                fds.extend(finish(current.take()));
                pending_lhs.clear();
            }
        }
    }

    fds.extend(finish(current));
    if !pending_lhs.is_empty() {
        trace!(attributes = ?pending_lhs, "dropping attribute list without arrow");
    }
    fds
}

fn finish(side_lists: Option<(Vec<String>, Vec<String>)>) -> Option<FunctionalDependency> {
    let (lhs, rhs) = side_lists?;
    let fd = FunctionalDependency::new(lhs, rhs);
    if fd.is_none() {
        trace!("dropping dependency with an empty side");
    }
    fd
}

fn idents(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Ident(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}
