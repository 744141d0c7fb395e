//! Boyce-Codd normal form by repeated violation splitting.

use super::closure::closure;
use crate::ast::{FunctionalDependency, Relation};
use std::collections::HashSet;
use tracing::{debug, trace};

/// First FD, in input order, that breaks BCNF on `attrs`.
///
/// Only FDs lying entirely inside `attrs` are considered. An FD violates when
/// it is nontrivial and the closure of its LHS misses part of `attrs`.
pub fn find_violation<'a>(
    attrs: &[String],
    fds: &'a [FunctionalDependency],
) -> Option<&'a FunctionalDependency> {
    fds.iter().filter(|fd| fd.within(attrs)).find(|fd| {
        if fd.is_trivial() {
            return false;
        }
        let cl = closure(fd.lhs(), fds);
        !attrs.iter().all(|a| cl.contains(a))
    })
}

/// Split `attrs` until no piece has a violation under its projected FDs.
///
/// A violation `X -> Y` on `R` yields `X ∪ Y` and `(R - Y) ∪ X`; the first
/// piece is fully decomposed before the second. Pieces with the same attribute
/// set are reported once, attributes sorted, named `R1, R2, ...`. An empty
/// universe has no relations.
pub fn decompose_bcnf(attrs: &[String], fds: &[FunctionalDependency]) -> Vec<Relation> {
    if attrs.is_empty() {
        return Vec::new();
    }
    let mut work: Vec<(Vec<String>, Vec<FunctionalDependency>)> =
        vec![(attrs.to_vec(), project(attrs, fds))];
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut out: Vec<Relation> = Vec::new();

    while let Some((current, local)) = work.pop() {
        let Some(fd) = find_violation(&current, &local) else {
            let mut sorted = current;
            sorted.sort();
            if seen.insert(sorted.clone()) {
                trace!(relation = ?sorted, "in BCNF");
                out.push(Relation::new(format!("R{}", out.len() + 1), sorted));
            }
            continue;
        };
        debug!(relation = ?current, fd = %fd, "BCNF violation");

        let left: Vec<String> = fd.attributes().cloned().collect();
        let right: Vec<String> = current
            .iter()
            .filter(|a| !fd.rhs().contains(a) || fd.lhs().contains(a))
            .cloned()
            .collect();

        let right_fds = project(&right, &local);
        let left_fds = project(&left, &local);
        work.push((right, right_fds));
        work.push((left, left_fds));
    }

    out
}

fn project(attrs: &[String], fds: &[FunctionalDependency]) -> Vec<FunctionalDependency> {
    fds.iter().filter(|fd| fd.within(attrs)).cloned().collect()
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

    fn attribute_sets(rels: &[Relation]) -> Vec<Vec<String>> {
        rels.iter().map(|r| r.attributes.clone()).collect()
    }

    #[test]
    fn test_chain_decomposition() {
        let universe = attrs(&["A", "B", "C", "D"]);
        let fds = vec![fd(&["A"], &["B"]), fd(&["B"], &["C"]), fd(&["C"], &["D"])];
        let rels = decompose_bcnf(&universe, &fds);
        assert_eq!(
            attribute_sets(&rels),
            vec![attrs(&["B", "C"]), attrs(&["A", "B"]), attrs(&["A", "D"])]
        );
        let names: Vec<&str> = rels.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn test_find_violation_first_in_order() {
        let universe = attrs(&["A", "B", "C", "D"]);
        let fds = vec![fd(&["A"], &["B"]), fd(&["B"], &["C"]), fd(&["C"], &["D"])];
        assert_eq!(find_violation(&universe, &fds), Some(&fds[1]));
    }

    #[test]
    fn test_already_bcnf() {
        let universe = attrs(&["B", "A"]);
        let fds = vec![fd(&["A"], &["B"])];
        assert_eq!(find_violation(&universe, &fds), None);
        assert_eq!(attribute_sets(&decompose_bcnf(&universe, &fds)), vec![attrs(&["A", "B"])]);
    }

    #[test]
    fn test_trivial_fd_is_not_a_violation() {
        let universe = attrs(&["A", "B", "C"]);
        let fds = vec![fd(&["A", "B"], &["A"])];
        assert_eq!(find_violation(&universe, &fds), None);
    }

    #[test]
    fn test_results_free_of_violations_and_cover_universe() {
        let universe = attrs(&["A", "B", "C", "D", "E"]);
        let fds = vec![
            fd(&["A"], &["B", "C"]),
            fd(&["C", "D"], &["E"]),
            fd(&["B"], &["D"]),
            fd(&["E"], &["A"]),
        ];
        let rels = decompose_bcnf(&universe, &fds);
        for r in &rels {
            let local = project(&r.attributes, &fds);
            assert_eq!(find_violation(&r.attributes, &local), None, "{r:?}");
        }
        for a in &universe {
            assert!(rels.iter().any(|r| r.attributes.contains(a)), "{a} lost");
        }
    }

    #[test]
    fn test_duplicate_pieces_reported_once() {
        let universe = attrs(&["A", "B", "C"]);
        let fds = vec![fd(&["A"], &["B"]), fd(&["C"], &["B"])];
        let rels = decompose_bcnf(&universe, &fds);
        let sets = attribute_sets(&rels);
        let unique: HashSet<_> = sets.iter().cloned().collect();
        assert_eq!(unique.len(), sets.len());
    }

    #[test]
    fn test_no_fds() {
        let rels = decompose_bcnf(&attrs(&["C", "A"]), &[]);
        assert_eq!(rels, vec![Relation::new("R1", attrs(&["A", "C"]))]);
    }

    #[test]
    fn test_empty_universe() {
        assert!(decompose_bcnf(&[], &[]).is_empty());
        assert!(decompose_bcnf(&[], &[fd(&["A"], &["B"])]).is_empty());
    }
}
