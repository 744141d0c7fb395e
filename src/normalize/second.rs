//! Second normal form: split off partial dependencies on the primary key.

use super::keys::candidate_keys;
use crate::ast::{FunctionalDependency, Relation};
use tracing::debug;

/// Decompose one relation so no non-key attribute depends on part of its key.
///
/// The working key is the first candidate key in enumeration order. Every
/// local FD whose LHS is a proper, non-empty subset of that key moves its RHS
/// into a relation `<name>_<LHS>`. The reduced relation comes first, the
/// split-offs follow in FD order; split-offs with the same LHS set are combined.
pub fn decompose_2nf(relation: &Relation, fds: &[FunctionalDependency]) -> Vec<Relation> {
    if relation.attributes.is_empty() {
        return vec![relation.clone()];
    }

    let local: Vec<FunctionalDependency> = fds
        .iter()
        .filter(|fd| fd.within(&relation.attributes))
        .cloned()
        .collect();
    let key = candidate_keys(&relation.attributes, &local)
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut remaining = relation.attributes.clone();
    // Keyed by the sorted LHS so `A, B` and `B, A` share one split-off.
    let mut split_offs: Vec<(Vec<String>, Relation)> = Vec::new();

    for fd in &local {
        if fd.is_trivial() || !is_proper_subset(fd.lhs(), &key) {
            continue;
        }

        let name = format!("{}_{}", relation.name, fd.lhs().concat());
        debug!(relation = %relation.name, fd = %fd, split = %name, "partial dependency");

        let mut lhs_set = fd.lhs().to_vec();
        lhs_set.sort();
        let attributes: Vec<String> = fd.attributes().cloned().collect();
        match split_offs.iter_mut().find(|(k, _)| *k == lhs_set) {
            Some((_, existing)) => {
                let mut merged = std::mem::take(&mut existing.attributes);
                merged.extend(attributes);
                *existing = Relation::new(name, merged);
            }
            None => split_offs.push((lhs_set, Relation::new(name, attributes))),
        }

        remaining.retain(|a| !fd.rhs().contains(a) || fd.lhs().contains(a));
    }

    let mut out = Vec::with_capacity(split_offs.len() + 1);
    out.push(Relation::new(relation.name.clone(), remaining));
    out.extend(split_offs.into_iter().map(|(_, r)| r));
    out
}

fn is_proper_subset(part: &[String], whole: &[String]) -> bool {
    !part.is_empty() && part.len() < whole.len() && part.iter().all(|a| whole.contains(a))
}
