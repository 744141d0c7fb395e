//! Baseline functional dependencies implied by primary and foreign keys.

use crate::ast::{FunctionalDependency, SqlSchema};

/// Derive FDs from key declarations.
///
/// - every table with both key and non-key columns: `PK -> non-PK columns`
/// - every relationship whose parent has a primary key: `FK columns -> parent PK`
///
/// Duplicates are left for the canonical cover to remove.
pub fn infer_fds(schema: &SqlSchema) -> Vec<FunctionalDependency> {
    let mut fds = Vec::new();

    for table in &schema.tables {
        let pk = table.primary_key();
        let others: Vec<String> = table
            .columns
            .iter()
            .filter(|c| !c.is_pk)
            .map(|c| c.name.clone())
            .collect();
        if let Some(fd) = FunctionalDependency::new(pk, others) {
            fds.push(fd);
        }
    }

    for rel in &schema.relationships {
        let parent_pk = schema
            .table(&rel.to)
            .map(|t| t.primary_key())
            .unwrap_or_default();
        if let Some(fd) = FunctionalDependency::new(rel.fk_columns.clone(), parent_pk) {
            fds.push(fd);
        }
    }

    fds
}
