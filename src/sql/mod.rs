//! SQL `CREATE TABLE` extraction.

mod lexer;
mod parser;

pub use parser::parse_sql;
