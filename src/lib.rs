pub mod ast;
pub mod error;
pub mod infer;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod sql;

use wasm_bindgen::prelude::*;

use ast::{FunctionalDependency, Relation, SqlSchema};
use error::{NormalizeError, Result};
use normalize::NormalForms;
use serde::Serialize;
use tracing::debug;

pub struct Options {
    /// Largest universe accepted; key enumeration is exponential in it.
    pub max_attributes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { max_attributes: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub relations: Vec<Relation>,
    pub fds: Vec<FunctionalDependency>,
    pub normal_forms: NormalForms,
}

/// Extract relations and FDs from `input`, append any `extra_fds`, and
/// normalize.
pub fn normalize(input: &str, extra_fds: Option<&str>, options: &Options) -> Result<Report> {
    if input.trim().is_empty() {
        return Err(NormalizeError::EmptyInput);
    }

    let mut parsed = parser::parse_input(input);
    parsed.fds.extend(parser::parse_fds(extra_fds.unwrap_or("")));
    debug!(
        relations = parsed.relations.len(),
        fds = parsed.fds.len(),
        "parsed input"
    );

    let count = normalize::universe(&parsed.relations, &parsed.fds).len();
    if count > options.max_attributes {
        return Err(NormalizeError::TooManyAttributes {
            count,
            limit: options.max_attributes,
        });
    }

    let normal_forms = normalize::normalize_steps(&parsed.relations, &parsed.fds);
    Ok(Report {
        relations: parsed.relations,
        fds: parsed.fds,
        normal_forms,
    })
}

/// Tables and relationships declared by SQL `CREATE TABLE` statements.
pub fn extract_sql(text: &str) -> SqlSchema {
    sql::parse_sql(text)
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Normalize schema text, returning the report as JSON
#[wasm_bindgen(js_name = "normalizeSchema")]
pub fn normalize_schema(input: &str, fds: Option<String>) -> std::result::Result<String, JsValue> {
    let report = normalize(input, fds.as_deref(), &Options::default()).map_err(to_js)?;
    serde_json::to_string(&report).map_err(|e| to_js(e.into()))
}

/// Parse SQL DDL into `{tables, relationships}` JSON
#[wasm_bindgen(js_name = "parseSqlSchema")]
pub fn parse_sql_schema(sql: &str) -> std::result::Result<String, JsValue> {
    serde_json::to_string(&extract_sql(sql)).map_err(|e| to_js(e.into()))
}

fn to_js(err: NormalizeError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
