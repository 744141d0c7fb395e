//! Attribute-set closure under a set of functional dependencies.

use crate::ast::FunctionalDependency;
use std::collections::HashSet;

/// Smallest superset of `attrs` closed under `fds`.
///
/// The input attributes come first, followed by derived attributes in the order
/// they were added. Full passes over `fds` repeat until one adds nothing.
pub fn closure(attrs: &[String], fds: &[FunctionalDependency]) -> Vec<String> {
    let mut present: HashSet<&str> = HashSet::with_capacity(attrs.len());
    let mut ordered: Vec<&str> = Vec::with_capacity(attrs.len());
    for a in attrs {
        if present.insert(a.as_str()) {
            ordered.push(a.as_str());
        }
    }

    let mut changed = !fds.is_empty();
    while changed {
        changed = false;
        for fd in fds {
            if !fd.lhs().iter().all(|a| present.contains(a.as_str())) {
                continue;
            }
            for b in fd.rhs() {
                if present.insert(b.as_str()) {
                    ordered.push(b.as_str());
                    changed = true;
                }
            }
        }
    }

    ordered.into_iter().map(str::to_string).collect()
}

/// `closure(attrs)` contains every attribute of `universe`.
pub fn is_superkey(attrs: &[String], universe: &[String], fds: &[FunctionalDependency]) -> bool {
    let cl = closure(attrs, fds);
    universe.iter().all(|a| cl.contains(a))
}
