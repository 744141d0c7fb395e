//! Best-effort extraction of tables, keys and relationships from SQL DDL.

use super::lexer::{Lexer, Token};
use crate::ast::{Column, FkRef, Relationship, SqlSchema, Table};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Extract every `CREATE TABLE` statement from `input`.
///
/// Definitions outside the supported subset are skipped, never reported.
pub fn parse_sql(input: &str) -> SqlSchema {
    let tokens = Lexer::new(input).tokenize();
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// One table body before column tags are finalized.
#[derive(Default)]
struct TableDraft {
    columns: Vec<ColumnDraft>,
    pk_columns: Vec<String>,
    fks: Vec<FkInfo>,
}

struct ColumnDraft {
    name: String,
    data_type: String,
    is_pk: bool,
    fk_ref: Option<FkRef>,
}

struct FkInfo {
    columns: Vec<String>,
    target: String,
    target_columns: Vec<String>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn parse(&mut self) -> SqlSchema {
        let mut tables: Vec<Table> = Vec::new();
        let mut relationships = Vec::new();

        while self.current() != &Token::Eof {
            if self.current() != &Token::Create {
                self.advance();
                continue;
            }
            self.advance();
            if self.current() != &Token::Table {
                continue;
            }
            self.advance();
            self.skip_if_not_exists();

            let Some((name, draft)) = self.parse_create_table() else {
                continue;
            };

            for fk in &draft.fks {
                relationships.push(Relationship {
                    from: name.clone(),
                    to: fk.target.clone(),
                    fk_columns: fk.columns.clone(),
                    ref_columns: fk.target_columns.clone(),
                });
            }

            let table = draft.finish(name);
            trace!(table = %table.name, columns = table.columns.len(), "parsed table");
            // A redefinition replaces the earlier table in place.
            match tables.iter_mut().find(|t| t.name == table.name) {
                Some(existing) => *existing = table,
                None => tables.push(table),
            }
        }

        if relationships.is_empty() {
            relationships = guess_relationships(&tables);
            if !relationships.is_empty() {
                debug!(
                    count = relationships.len(),
                    "inferred relationships from primary key names"
                );
            }
        }

        SqlSchema {
            tables,
            relationships: dedup_relationships(relationships),
        }
    }

    fn skip_if_not_exists(&mut self) {
        for word in ["IF", "NOT", "EXISTS"] {
            if !is_word(self.current(), word) {
                return;
            }
            self.advance();
        }
    }

    /// Table name (optionally `schema.table`) followed by a parenthesized body.
    fn parse_create_table(&mut self) -> Option<(String, TableDraft)> {
        let mut name = match self.current() {
            Token::Ident(name) => name.clone(),
            _ => return None,
        };
        self.advance();

        while self.current() == &Token::Dot {
            self.advance();
            match self.current() {
                Token::Ident(part) => {
                    name = part.clone();
                    self.advance();
                }
                _ => return None,
            }
        }

        if self.current() != &Token::LParen {
            return None;
        }
        self.advance();

        let body = self.collect_body()?;
        let mut draft = TableDraft::default();
        for definition in split_top_level(&body) {
            draft.add_definition(definition);
        }
        Some((name, draft))
    }

    /// Tokens up to the `)` matching the already consumed `(`.
    fn collect_body(&mut self) -> Option<Vec<Token>> {
        let mut body = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.current() {
                Token::Eof => {
                    trace!("unterminated table body");
                    return None;
                }
                Token::RParen if depth == 0 => {
                    self.advance();
                    return Some(body);
                }
                tok => {
                    match tok {
                        Token::LParen => depth += 1,
                        Token::RParen => depth -= 1,
                        _ => {}
                    }
                    body.push(tok.clone());
                    self.advance();
                }
            }
        }
    }
}

impl TableDraft {
    fn add_definition(&mut self, def: &[Token]) {
        match def {
            [Token::Primary, Token::Key(_), rest @ ..] => {
                self.pk_columns.extend(column_list(rest).unwrap_or_default());
            }
            [Token::Foreign, ..] => self.add_foreign_key(def),
            [Token::Constraint, Token::Ident(_), rest @ ..] => match rest {
                [Token::Primary, Token::Key(_), cols @ ..] => {
                    self.pk_columns.extend(column_list(cols).unwrap_or_default());
                }
                [Token::Foreign, ..] => self.add_foreign_key(rest),
                _ => trace!("skipping constraint"),
            },
            _ if is_index_definition(def) => trace!("skipping index"),
            [Token::Ident(_) | Token::Key(_), ..] => {
                if let Some(column) = self.parse_column(def) {
                    self.columns.push(column);
                }
            }
            _ => trace!(definition = ?def.first(), "skipping definition"),
        }
    }

    /// `FOREIGN KEY (cols) REFERENCES table (cols)`
    fn add_foreign_key(&mut self, def: &[Token]) {
        let [Token::Foreign, Token::Key(_), rest @ ..] = def else {
            return;
        };
        let Some((columns, rest)) = column_list_with_rest(rest) else {
            return;
        };
        let [Token::References, rest @ ..] = rest else {
            return;
        };
        if let Some((target, target_columns)) = reference(rest) {
            self.fks.push(FkInfo {
                columns,
                target,
                target_columns,
            });
        }
    }

    /// `name type[(args)] [PRIMARY KEY] [REFERENCES table(cols)] ...`
    fn parse_column(&mut self, def: &[Token]) -> Option<ColumnDraft> {
        let [first, Token::Ident(type_name), rest @ ..] = def else {
            trace!("skipping column without a type");
            return None;
        };
        let name = column_name(first)?.to_string();

        let mut data_type = type_name.clone();
        let mut rest = rest;
        if rest.first() == Some(&Token::LParen) {
            let end = matching_paren(rest)?;
            data_type.extend(rest[..=end].iter().map(|t| t.to_string()));
            rest = &rest[end + 1..];
        }

        let is_pk = rest
            .windows(2)
            .any(|w| matches!(w, [Token::Primary, Token::Key(_)]));

        let fk_ref = rest
            .iter()
            .position(|t| *t == Token::References)
            .and_then(|i| reference(&rest[i + 1..]))
            .map(|(table, columns)| FkRef { table, columns });

        if let Some(r) = &fk_ref {
            self.fks.push(FkInfo {
                columns: vec![name.clone()],
                target: r.table.clone(),
                target_columns: r.columns.clone(),
            });
        }
        if is_pk {
            self.pk_columns.push(name.clone());
        }

        Some(ColumnDraft {
            name,
            data_type,
            is_pk,
            fk_ref,
        })
    }

    fn finish(self, name: String) -> Table {
        let columns = self
            .columns
            .into_iter()
            .map(|c| {
                let fk_ref = c.fk_ref.or_else(|| {
                    self.fks
                        .iter()
                        .find(|fk| fk.columns.contains(&c.name))
                        .map(|fk| FkRef {
                            table: fk.target.clone(),
                            columns: fk.target_columns.clone(),
                        })
                });
                Column {
                    is_pk: c.is_pk || self.pk_columns.contains(&c.name),
                    is_fk: fk_ref.is_some(),
                    fk_ref,
                    name: c.name,
                    data_type: c.data_type,
                }
            })
            .collect();
        Table { name, columns }
    }
}

/// Split a table body on commas outside parentheses.
fn split_top_level(body: &[Token]) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, tok) in body.iter().enumerate() {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Identifier text, including the words that double as keywords.
fn column_name(token: &Token) -> Option<&str> {
    match token {
        Token::Ident(s) | Token::Key(s) => Some(s.as_str()),
        _ => None,
    }
}

fn is_word(token: &Token, word: &str) -> bool {
    matches!(token, Token::Ident(s) if s.eq_ignore_ascii_case(word))
}

/// `KEY name (cols)`, `INDEX name (cols)`, `UNIQUE name (cols)` and similar.
/// A column such as `key VARCHAR(10)` has a number inside the parentheses.
fn is_index_definition(def: &[Token]) -> bool {
    let [first, Token::Ident(_), Token::LParen, Token::Ident(_), ..] = def else {
        return false;
    };
    column_name(first).is_some_and(|w| {
        ["KEY", "INDEX", "UNIQUE", "FULLTEXT", "SPATIAL"]
            .iter()
            .any(|k| w.eq_ignore_ascii_case(k))
    })
}

/// Index of the `)` closing the `(` at `tokens[0]`.
fn matching_paren(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        match tok {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `( a, b, ... )` at the start of `tokens`, plus whatever follows it.
fn column_list_with_rest(tokens: &[Token]) -> Option<(Vec<String>, &[Token])> {
    if tokens.first() != Some(&Token::LParen) {
        return None;
    }
    let end = matching_paren(tokens)?;
    let columns: Vec<String> = tokens[1..end]
        .iter()
        .filter_map(|t| match t {
            Token::Ident(name) => Some(name.clone()),
            _ => None,
        })
        .collect();
    if columns.is_empty() {
        return None;
    }
    Some((columns, &tokens[end + 1..]))
}

fn column_list(tokens: &[Token]) -> Option<Vec<String>> {
    column_list_with_rest(tokens).map(|(columns, _)| columns)
}

/// `table[.table] (cols)` following `REFERENCES`.
fn reference(tokens: &[Token]) -> Option<(String, Vec<String>)> {
    let [Token::Ident(first), rest @ ..] = tokens else {
        return None;
    };
    let mut table = first.clone();
    let mut rest = rest;
    while let [Token::Dot, Token::Ident(part), tail @ ..] = rest {
        table = part.clone();
        rest = tail;
    }
    let columns = column_list(rest)?;
    Some((table, columns))
}

/// Match every column against tables whose primary key is that single column.
fn guess_relationships(tables: &[Table]) -> Vec<Relationship> {
    let mut single_pk: HashMap<String, &str> = HashMap::new();
    for table in tables {
        if let [pk] = table.primary_key().as_slice() {
            single_pk.insert(pk.to_lowercase(), table.name.as_str());
        }
    }

    let mut relationships = Vec::new();
    for table in tables {
        for column in &table.columns {
            let Some(&parent) = single_pk.get(&column.name.to_lowercase()) else {
                continue;
            };
            if parent == table.name {
                continue;
            }
            relationships.push(Relationship {
                from: table.name.clone(),
                to: parent.to_string(),
                fk_columns: vec![column.name.clone()],
                ref_columns: vec![column.name.clone()],
            });
        }
    }
    relationships
}

fn dedup_relationships(relationships: Vec<Relationship>) -> Vec<Relationship> {
    let mut seen = HashSet::new();
    relationships
        .into_iter()
        .filter(|r| {
            seen.insert((
                r.from.clone(),
                r.to.clone(),
                r.fk_columns.clone(),
                r.ref_columns.clone(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let sql = r#"
            CREATE TABLE users (
                id INT PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                balance DECIMAL(10, 2)
            );
        "#;

        let schema = parse_sql(sql);
        assert_eq!(schema.tables.len(), 1);

        let users = &schema.tables[0];
        assert_eq!(users.name, "users");
        assert_eq!(users.columns.len(), 3);
        assert!(users.columns[0].is_pk);
        assert_eq!(users.columns[1].data_type, "VARCHAR(255)");
        assert!(!users.columns[1].is_pk);
        assert_eq!(users.columns[2].data_type, "DECIMAL(10,2)");
        assert!(schema.relationships.is_empty());
    }

    #[test]
    fn test_table_level_keys() {
        let sql = r#"
            CREATE TABLE IF NOT EXISTS app.enrollment (
                student_id INT,
                course_id INT,
                grade CHAR(2),
                PRIMARY KEY (student_id, course_id),
                FOREIGN KEY (student_id) REFERENCES student(id),
                CONSTRAINT fk_course FOREIGN KEY (course_id) REFERENCES course (id) ON DELETE CASCADE,
                CHECK (grade <> 'F')
            );
        "#;

        let schema = parse_sql(sql);
        let table = &schema.tables[0];
        assert_eq!(table.name, "enrollment");
        assert_eq!(table.primary_key(), vec!["student_id", "course_id"]);
        assert_eq!(table.columns.len(), 3);

        let student = &table.columns[0];
        assert!(student.is_fk);
        assert_eq!(
            student.fk_ref,
            Some(FkRef {
                table: "student".into(),
                columns: vec!["id".into()],
            })
        );
        assert!(!table.columns[2].is_fk);

        assert_eq!(schema.relationships.len(), 2);
        assert_eq!(schema.relationships[0].from, "enrollment");
        assert_eq!(schema.relationships[0].to, "student");
        assert_eq!(schema.relationships[1].to, "course");
        assert_eq!(schema.relationships[1].fk_columns, vec!["course_id"]);
    }

    #[test]
    fn test_inline_reference() {
        let sql = r#"
            CREATE TABLE users (id INT PRIMARY KEY);
            create table `orders` (
                id INT PRIMARY KEY,
                user_id INT REFERENCES users(id)
            );
        "#;

        let schema = parse_sql(sql);
        assert_eq!(schema.tables.len(), 2);
        assert_eq!(schema.relationships.len(), 1);

        let rel = &schema.relationships[0];
        assert_eq!(rel.from, "orders");
        assert_eq!(rel.to, "users");
        assert_eq!(rel.ref_columns, vec!["id"]);
        assert!(schema.tables[1].columns[1].is_fk);
    }

    #[test]
    fn test_guessed_relationships() {
        let sql = r#"
            CREATE TABLE dept (dept_id INT PRIMARY KEY, dname TEXT);
            CREATE TABLE emp (emp_id INT PRIMARY KEY, DEPT_ID INT, ename TEXT);
        "#;

        let schema = parse_sql(sql);
        assert_eq!(schema.relationships.len(), 1);
        let rel = &schema.relationships[0];
        assert_eq!(rel.from, "emp");
        assert_eq!(rel.to, "dept");
        assert_eq!(rel.fk_columns, vec!["DEPT_ID"]);
        assert_eq!(rel.ref_columns, vec!["DEPT_ID"]);
    }

    #[test]
    fn test_duplicate_relationships_removed() {
        let sql = r#"
            CREATE TABLE a (id INT PRIMARY KEY);
            CREATE TABLE b (
                a_id INT REFERENCES a(id),
                FOREIGN KEY (a_id) REFERENCES a(id)
            );
        "#;

        let schema = parse_sql(sql);
        assert_eq!(schema.relationships.len(), 1);
    }

    #[test]
    fn test_malformed_input_is_skipped() {
        let sql = "CREATE TABLE broken (id INT, name";
        assert!(parse_sql(sql).tables.is_empty());

        let sql = "CREATE INDEX idx ON t (x); CREATE TABLE t (lonely, x INT);";
        let schema = parse_sql(sql);
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].column_names(), vec!["x"]);
    }

    #[test]
    fn test_keyword_named_columns() {
        let sql = r#"
            CREATE TABLE settings (
                Key VARCHAR(20) PRIMARY KEY,
                index INT,
                unique BOOLEAN,
                check TEXT,
                exists INT,
                KEY idx_index (index),
                UNIQUE KEY uk_check (check),
                INDEX idx_unique (unique)
            );
        "#;

        let schema = parse_sql(sql);
        let table = &schema.tables[0];
        assert_eq!(
            table.column_names(),
            vec!["Key", "index", "unique", "check", "exists"]
        );
        assert_eq!(table.primary_key(), vec!["Key"]);
        assert_eq!(table.columns[0].data_type, "VARCHAR(20)");
    }

    #[test]
    fn test_if_not_exists_words_any_case() {
        let schema = parse_sql("create table if not exists t (id INT);");
        assert_eq!(schema.tables[0].name, "t");
    }
}
