use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relation {
    pub name: String,
    pub attributes: Vec<String>,
}

impl Relation {
    /// Build a relation, dropping repeated attributes (first occurrence wins).
    pub fn new(name: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            attributes: dedup(attributes),
        }
    }
}

/// A functional dependency `lhs -> rhs`.
///
/// Both sides are non-empty and free of duplicates; the only way to build one
/// outside this module is [`FunctionalDependency::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionalDependency {
    pub(crate) lhs: Vec<String>,
    pub(crate) rhs: Vec<String>,
}

impl FunctionalDependency {
    pub fn new<L, R, S>(lhs: L, rhs: R) -> Option<Self>
    where
        L: IntoIterator<Item = S>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lhs = clean_side(lhs);
        let rhs = clean_side(rhs);
        if lhs.is_empty() || rhs.is_empty() {
            return None;
        }
        Some(Self { lhs, rhs })
    }

    pub fn lhs(&self) -> &[String] {
        &self.lhs
    }

    pub fn rhs(&self) -> &[String] {
        &self.rhs
    }

    /// `rhs ⊆ lhs`
    pub fn is_trivial(&self) -> bool {
        self.rhs.iter().all(|a| self.lhs.contains(a))
    }

    /// Every attribute mentioned by the FD, LHS first.
    pub fn attributes(&self) -> impl Iterator<Item = &String> {
        self.lhs.iter().chain(self.rhs.iter())
    }

    /// Both sides lie within `attrs`.
    pub fn within(&self, attrs: &[String]) -> bool {
        self.attributes().all(|a| attrs.contains(a))
    }
}

impl fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.lhs.join(", "), self.rhs.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlSchema {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
}

impl SqlSchema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn primary_key(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_pk)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(rename = "isPK")]
    pub is_pk: bool,
    #[serde(rename = "isFK")]
    pub is_fk: bool,
    #[serde(rename = "fkRef")]
    pub fk_ref: Option<FkRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FkRef {
    pub table: String,
    pub columns: Vec<String>,
}

/// Directed edge from the child table (holding the FK) to its parent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub fk_columns: Vec<String>,
    pub ref_columns: Vec<String>,
}

impl Relationship {
    pub fn label(&self) -> String {
        format!("{} -> {}", self.fk_columns.join(","), self.ref_columns.join(","))
    }
}

/// Everything extracted from one input text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedInput {
    pub relations: Vec<Relation>,
    pub fds: Vec<FunctionalDependency>,
    /// Present when the text was read as SQL DDL.
    pub sql: Option<SqlSchema>,
}

pub(crate) fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn clean_side<I, S>(side: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let trimmed = side
        .into_iter()
        .map(|s| {
            let s: String = s.into();
            s.trim().to_string()
        })
        .filter(|s| !s.is_empty())
        .collect();
    dedup(trimmed)
}
