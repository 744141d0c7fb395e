//! Candidate key enumeration.
//!
//! Every non-empty subset of the universe is tried, smallest first, so the cost
//! is exponential in the attribute count. Callers bound the universe size.

use crate::ast::{FunctionalDependency, dedup};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Largest universe the bitmask enumeration can represent.
pub const MAX_ENUMERABLE_ATTRIBUTES: usize = 63;

/// Minimal attribute sets whose closure is the whole of `attrs`.
///
/// Keys are reported in enumeration order: by size, then by the bitmask in
/// which bit `i` stands for `attrs[i]`. Attributes inside a key keep universe
/// order. An empty universe yields a single empty key.
pub fn candidate_keys(attrs: &[String], fds: &[FunctionalDependency]) -> Vec<Vec<String>> {
    let universe = dedup(attrs.to_vec());
    let n = universe.len();
    if n == 0 {
        return vec![universe];
    }
    if n > MAX_ENUMERABLE_ATTRIBUTES {
        warn!(
            attributes = n,
            limit = MAX_ENUMERABLE_ATTRIBUTES,
            "too many attributes to enumerate keys, using the whole universe"
        );
        return vec![universe];
    }

    let index = IndexedFds::new(&universe, fds);
    let limit = 1u64 << n;
    let mut keys: Vec<u64> = Vec::new();

    for size in 1..=n {
        let mut mask = (1u64 << size) - 1;
        while mask < limit {
            let minimal = !keys.iter().any(|&k| (mask & k) == k);
            if minimal && index.derives_all(mask) {
                keys.push(mask);
            }
            mask = next_combination(mask);
        }
    }

    debug!(attributes = n, keys = keys.len(), "enumerated candidate keys");

    if keys.is_empty() {
        return vec![universe];
    }
    keys.into_iter()
        .map(|mask| {
            universe
                .iter()
                .enumerate()
                .filter(|(i, _)| (mask >> i) & 1 == 1)
                .map(|(_, a)| a.clone())
                .collect()
        })
        .collect()
}

/// Next larger integer with the same number of set bits.
fn next_combination(mask: u64) -> u64 {
    let lowest = mask & mask.wrapping_neg();
    let ripple = mask + lowest;
    (((ripple ^ mask) >> 2) / lowest) | ripple
}

/// FDs rewritten over attribute slots; slots `0..n` are the universe, FD
/// attributes outside it get the following slots.
struct IndexedFds {
    universe_len: usize,
    slots: usize,
    fds: Vec<(Vec<usize>, Vec<usize>)>,
}

impl IndexedFds {
    fn new(universe: &[String], fds: &[FunctionalDependency]) -> Self {
        let mut slot_of: HashMap<&str, usize> = universe
            .iter()
            .enumerate()
            .map(|(i, a)| (a.as_str(), i))
            .collect();

        let mut indexed = Vec::with_capacity(fds.len());
        for fd in fds {
            let lhs: Vec<usize> = fd.lhs().iter().map(|a| intern(&mut slot_of, a)).collect();
            let rhs: Vec<usize> = fd.rhs().iter().map(|a| intern(&mut slot_of, a)).collect();
            indexed.push((lhs, rhs));
        }

        Self {
            universe_len: universe.len(),
            slots: slot_of.len(),
            fds: indexed,
        }
    }

    /// Closure of the subset `mask` covers the universe.
    fn derives_all(&self, mask: u64) -> bool {
        let mut present = vec![false; self.slots];
        for (i, p) in present.iter_mut().enumerate().take(self.universe_len) {
            *p = (mask >> i) & 1 == 1;
        }

        let mut changed = true;
        while changed {
            changed = false;
            for (lhs, rhs) in &self.fds {
                if lhs.iter().all(|&a| present[a]) {
                    for &b in rhs {
                        if !present[b] {
                            present[b] = true;
                            changed = true;
                        }
                    }
                }
            }
        }

        present[..self.universe_len].iter().all(|&p| p)
    }
}

fn intern<'a>(slot_of: &mut HashMap<&'a str, usize>, attr: &'a str) -> usize {
    let next = slot_of.len();
    *slot_of.entry(attr).or_insert(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::closure::closure;

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn fd(lhs: &[&str], rhs: &[&str]) -> FunctionalDependency {
        FunctionalDependency::new(lhs.iter().copied(), rhs.iter().copied()).unwrap()
    }

    fn keys_of(names: &[&str], fds: &[FunctionalDependency]) -> Vec<Vec<String>> {
        candidate_keys(&attrs(names), fds)
    }

    #[test]
    fn test_single_key_chain() {
        let fds = vec![fd(&["A"], &["B"]), fd(&["B"], &["C"])];
        assert_eq!(keys_of(&["A", "B", "C"], &fds), vec![attrs(&["A"])]);
    }

    #[test]
    fn test_several_keys_in_enumeration_order() {
        // A <-> B, and C is independent.
        let fds = vec![fd(&["A"], &["B"]), fd(&["B"], &["A"])];
        assert_eq!(
            keys_of(&["A", "B", "C"], &fds),
            vec![attrs(&["A", "C"]), attrs(&["B", "C"])]
        );
    }

    #[test]
    fn test_composite_key() {
        let fds = vec![fd(&["A", "B"], &["C"]), fd(&["C"], &["D"])];
        assert_eq!(keys_of(&["A", "B", "C", "D"], &fds), vec![attrs(&["A", "B"])]);
    }

    #[test]
    fn test_no_fds_whole_universe() {
        assert_eq!(keys_of(&["A", "B"], &[]), vec![attrs(&["A", "B"])]);
    }

    #[test]
    fn test_empty_universe() {
        assert_eq!(keys_of(&[], &[]), vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_outside_attributes_participate() {
        // X is not in the universe but links A to B.
        let fds = vec![fd(&["A"], &["X"]), fd(&["X"], &["B"])];
        assert_eq!(keys_of(&["A", "B"], &fds), vec![attrs(&["A"])]);
    }

    #[test]
    fn test_keys_minimal_and_complete() {
        let universe = attrs(&["A", "B", "C", "D", "E"]);
        let fds = vec![
            fd(&["A", "B"], &["C"]),
            fd(&["C", "D"], &["E"]),
            fd(&["E"], &["A"]),
            fd(&["B"], &["D"]),
        ];
        let keys = candidate_keys(&universe, &fds);
        assert!(!keys.is_empty());
        for key in &keys {
            let cl = closure(key, &fds);
            assert!(universe.iter().all(|a| cl.contains(a)));
        }
        for (i, a) in keys.iter().enumerate() {
            for (j, b) in keys.iter().enumerate() {
                if i != j {
                    assert!(!a.iter().all(|x| b.contains(x)), "{a:?} within {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_next_combination() {
        assert_eq!(next_combination(0b0011), 0b0101);
        assert_eq!(next_combination(0b0101), 0b0110);
        assert_eq!(next_combination(0b0110), 0b1001);
    }
}
