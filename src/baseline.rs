//! The starting extension of a generation run.

use std::collections::BTreeSet;

use tracing::debug;

use crate::poset::Poset;

/// One linear extension plus the pairs the engine will sweep.
///
/// Minimal elements are peeled two at a time. Each pair `(a, b)` is a pair of
/// incomparable elements that were both minimal once everything before them
/// had been removed; they sit in adjacent slots, `a` first. An element peeled
/// alone is below everything after it and never moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub permutation: Vec<usize>,
    pub pairs: Vec<(usize, usize)>,
}

impl Baseline {
    /// Inverse of `permutation`: slot of each element.
    pub fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0; self.permutation.len()];
        for (slot, &e) in self.permutation.iter().enumerate() {
            pos[e] = slot;
        }
        pos
    }
}

/// Computes the baseline, breaking ties by smallest index.
pub fn initial_extension<K>(poset: &Poset<K>) -> Baseline {
    let n = poset.len();
    let mut indegree: Vec<usize> = (0..n).map(|e| poset.lower_covers(e).len()).collect();
    let mut ready: BTreeSet<usize> = poset.minimal_elements().collect();
    let mut permutation = Vec::with_capacity(n);
    let mut pairs = Vec::new();

    while let Some(a) = ready.pop_first() {
        // Take both before releasing successors so the pair is minimal together.
        let taken = match ready.pop_first() {
            Some(b) => {
                pairs.push((a, b));
                [Some(a), Some(b)]
            }
            None => [Some(a), None],
        };
        for x in taken.into_iter().flatten() {
            permutation.push(x);
            for &y in poset.upper_covers(x) {
                indegree[y] -= 1;
                if indegree[y] == 0 {
                    ready.insert(y);
                }
            }
        }
    }

    assert_eq!(permutation.len(), n, "order model contains a cycle");
    debug!(elements = n, pairs = pairs.len(), "computed baseline extension");
    Baseline { permutation, pairs }
}
