//! Canonical (minimal) cover of a set of functional dependencies.

use super::closure::closure;
use crate::ast::FunctionalDependency;
use tracing::trace;

/// Reduce `fds` to an equivalent minimal set.
///
/// The phases must run in this order; removing redundant FDs before the
/// left-hand sides are reduced can leave a non-minimal result.
///
/// 1. split right-hand sides into single attributes
/// 2. drop extraneous left-hand attributes
/// 3. drop FDs derivable from the others
/// 4. merge FDs with the same left-hand side
pub fn canonical_cover(fds: &[FunctionalDependency]) -> Vec<FunctionalDependency> {
    let mut cover = split_rhs(fds);
    remove_extraneous_lhs(&mut cover);
    remove_redundant(&mut cover);
    merge_by_lhs(cover)
}

fn split_rhs(fds: &[FunctionalDependency]) -> Vec<FunctionalDependency> {
    fds.iter()
        .flat_map(|fd| {
            fd.rhs().iter().map(|b| FunctionalDependency {
                lhs: fd.lhs().to_vec(),
                rhs: vec![b.clone()],
            })
        })
        .collect()
}

/// `a` is extraneous in `X -> b` when `b` is in the closure of `X - a` under
/// the current set. The set is updated after each removal, so removals cascade.
fn remove_extraneous_lhs(fds: &mut [FunctionalDependency]) {
    let mut changed = true;
    while changed {
        changed = false;
        for i in 0..fds.len() {
            let mut j = 0;
            while fds[i].lhs.len() > 1 && j < fds[i].lhs.len() {
                let mut reduced = fds[i].lhs.clone();
                let removed = reduced.remove(j);
                if closure(&reduced, fds).contains(&fds[i].rhs[0]) {
                    trace!(attribute = %removed, fd = %fds[i], "extraneous attribute");
                    fds[i].lhs = reduced;
                    changed = true;
                } else {
                    j += 1;
                }
            }
        }
    }
}

/// Drop one derivable FD at a time and rescan until none is left.
fn remove_redundant(fds: &mut Vec<FunctionalDependency>) {
    'scan: loop {
        for i in 0..fds.len() {
            let others: Vec<FunctionalDependency> = fds
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i)
                .map(|(_, fd)| fd.clone())
                .collect();
            if closure(&fds[i].lhs, &others).contains(&fds[i].rhs[0]) {
                let fd = fds.remove(i);
                trace!(fd = %fd, "redundant dependency");
                continue 'scan;
            }
        }
        break;
    }
}

fn merge_by_lhs(fds: Vec<FunctionalDependency>) -> Vec<FunctionalDependency> {
    let mut merged: Vec<(Vec<String>, FunctionalDependency)> = Vec::new();
    for fd in fds {
        let mut key = fd.lhs.clone();
        key.sort();
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                for b in fd.rhs {
                    if !existing.rhs.contains(&b) {
                        existing.rhs.push(b);
                    }
                }
            }
            None => merged.push((key, fd)),
        }
    }
    merged.into_iter().map(|(_, fd)| fd).collect()
}
