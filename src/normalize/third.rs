//! Third normal form by synthesis from the canonical cover.

use super::cover::canonical_cover;
use super::keys::candidate_keys;
use crate::ast::{FunctionalDependency, Relation};
use tracing::debug;

/// One relation per canonical-cover FD, named `R1, R2, ...` in cover order.
///
/// When no synthesized relation contains the first candidate key of the
/// universe, the key itself is appended as a final relation so the
/// decomposition stays lossless.
pub fn synthesize_3nf(attrs: &[String], fds: &[FunctionalDependency]) -> Vec<Relation> {
    let mut groups: Vec<Vec<String>> = canonical_cover(fds)
        .iter()
        .map(|fd| fd.attributes().cloned().collect())
        .collect();

    let key = candidate_keys(attrs, fds).into_iter().next().unwrap_or_default();
    let has_key = groups
        .iter()
        .any(|g| key.iter().all(|k| g.contains(k)));
    if !key.is_empty() && !has_key {
        debug!(key = ?key, "adding key relation");
        groups.push(key);
    }

    groups
        .into_iter()
        .enumerate()
        .map(|(i, attributes)| Relation::new(format!("R{}", i + 1), attributes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn fd(lhs: &[&str], rhs: &[&str]) -> FunctionalDependency {
        FunctionalDependency::new(lhs.iter().copied(), rhs.iter().copied()).unwrap()
    }

    #[test]
    fn test_chain_synthesis() {
        let fds = vec![fd(&["A"], &["B"]), fd(&["B"], &["C"]), fd(&["C"], &["D"])];
        let rels = synthesize_3nf(&attrs(&["A", "B", "C", "D"]), &fds);
        assert_eq!(
            rels,
            vec![
                Relation::new("R1", attrs(&["A", "B"])),
                Relation::new("R2", attrs(&["B", "C"])),
                Relation::new("R3", attrs(&["C", "D"])),
            ]
        );
    }

    #[test]
    fn test_key_relation_added() {
        // Key is AC; neither A -> B nor C -> D contains it.
        let fds = vec![fd(&["A"], &["B"]), fd(&["C"], &["D"])];
        let rels = synthesize_3nf(&attrs(&["A", "B", "C", "D"]), &fds);
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[2], Relation::new("R3", attrs(&["A", "C"])));
    }

    #[test]
    fn test_no_fds_single_relation() {
        let rels = synthesize_3nf(&attrs(&["A", "B", "C"]), &[]);
        assert_eq!(rels, vec![Relation::new("R1", attrs(&["A", "B", "C"]))]);
    }

    #[test]
    fn test_empty_universe() {
        assert!(synthesize_3nf(&[], &[]).is_empty());
    }
}
