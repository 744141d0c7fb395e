//! Plain-text rendering of normalization results.

use crate::ast::{FunctionalDependency, SqlSchema};
use crate::normalize::{NormalForms, NormalizedRelation};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// `Name(A, B, C)`
pub fn format_relation(name: &str, attributes: &[String]) -> String {
    format!("{}({})", name, attributes.join(", "))
}

pub struct TextRenderer {
    pub indent: usize,
    /// Minimum spaces between the relation column and the reason column.
    pub gap: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { indent: 2, gap: 2 }
    }
}

impl TextRenderer {
    /// One block per normal form, reasons aligned within each block.
    pub fn render(&self, forms: &NormalForms) -> String {
        let mut out = String::new();
        for (i, (label, relations)) in forms.steps().into_iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(label);
            out.push('\n');
            self.render_block(&mut out, relations);
        }
        out
    }

    pub fn render_fds(&self, fds: &[FunctionalDependency]) -> String {
        let mut out = String::from("FDs\n");
        if fds.is_empty() {
            self.push_line(&mut out, "(none)");
        }
        for fd in fds {
            self.push_line(&mut out, &fd.to_string());
        }
        out
    }

    /// Tables as `name(columns)`, then `from -> to (fk -> ref)` lines.
    pub fn render_ddl(&self, schema: &SqlSchema) -> String {
        let mut out = String::from("Tables\n");
        if schema.tables.is_empty() {
            self.push_line(&mut out, "(none)");
        }
        for table in &schema.tables {
            self.push_line(&mut out, &format_relation(&table.name, &table.column_names()));
        }
        if !schema.relationships.is_empty() {
            out.push_str("\nRelationships\n");
        }
        for rel in &schema.relationships {
            let line = format!("{} -> {} ({})", rel.from, rel.to, rel.label());
            self.push_line(&mut out, &line);
        }
        out
    }

    fn render_block(&self, out: &mut String, relations: &[NormalizedRelation]) {
        if relations.is_empty() {
            self.push_line(out, "(none)");
            return;
        }

        let cells: Vec<String> = relations
            .iter()
            .map(|r| format_relation(&r.name, &r.attributes))
            .collect();
        let width = cells.iter().map(|c| c.width()).max().unwrap_or(0);

        for (cell, relation) in cells.iter().zip(relations) {
            let pad = width - cell.width() + self.gap;
            let _ = writeln!(
                out,
                "{:indent$}{}{:pad$}{}",
                "",
                cell,
                "",
                relation.reason,
                indent = self.indent,
                pad = pad
            );
        }
    }

    fn push_line(&self, out: &mut String, text: &str) {
        let _ = writeln!(out, "{:indent$}{}", "", text, indent = self.indent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Relation;
    use crate::normalize::normalize_steps;

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_format_relation() {
        assert_eq!(format_relation("R", &attrs(&["A", "B"])), "R(A, B)");
        assert_eq!(format_relation("Empty", &[]), "Empty()");
    }

    #[test]
    fn test_render_aligned() {
        let relations = vec![Relation::new("R", attrs(&["A", "B", "C"]))];
        let fds = vec![FunctionalDependency::new(["A"], ["B"]).unwrap()];
        let text = TextRenderer::default().render(&normalize_steps(&relations, &fds));

        assert!(text.starts_with("1NF\n  R(A, B, C)  Atomic values assumed\n"));
        assert!(text.contains("\n3NF\n  R1(A, B)  3NF synthesis\n  R2(A, C)  3NF synthesis\n"));
        assert!(text.contains("\nBCNF\n"));
    }

    #[test]
    fn test_render_empty_steps() {
        let text = TextRenderer::default().render(&NormalForms::default());
        assert_eq!(text, "1NF\n  (none)\n\n2NF\n  (none)\n\n3NF\n  (none)\n\nBCNF\n  (none)\n");
    }

    #[test]
    fn test_render_wide_names() {
        let relations = vec![
            Relation::new("学生", attrs(&["名前"])),
            Relation::new("S", attrs(&["A"])),
        ];
        let text = TextRenderer::default().render(&normalize_steps(&relations, &[]));
        // "学生(名前)" is 10 columns wide, "S(A)" is 4.
        assert!(text.contains("  学生(名前)  Atomic"));
        assert!(text.contains("  S(A)        Atomic"));
    }

    #[test]
    fn test_render_fds() {
        let fds = vec![FunctionalDependency::new(["A", "B"], ["C"]).unwrap()];
        assert_eq!(TextRenderer::default().render_fds(&fds), "FDs\n  A, B -> C\n");
        assert_eq!(TextRenderer::default().render_fds(&[]), "FDs\n  (none)\n");
    }

    #[test]
    fn test_render_ddl() {
        let schema = crate::sql::parse_sql(
            "CREATE TABLE users (id INT PRIMARY KEY);\n\
             CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users(id));",
        );
        assert_eq!(
            TextRenderer::default().render_ddl(&schema),
            "Tables\n  users(id)\n  orders(id, user_id)\n\n\
             Relationships\n  orders -> users (user_id -> id)\n"
        );
        assert_eq!(
            TextRenderer::default().render_ddl(&SqlSchema::default()),
            "Tables\n  (none)\n"
        );
    }
}
