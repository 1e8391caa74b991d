//! Property tests over random DAGs, checked against brute force.

use std::collections::HashSet;

use itertools::Itertools;
use linext::{initial_extension, Engine, Poset, Step};
use proptest::prelude::*;

/// A random DAG on `n <= 7` vertices: pairs `i < j` of a shuffled vertex
/// order, each kept with probability `density`.
fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (0usize..=7, 0.0f64..0.7).prop_flat_map(|(n, density)| {
        let pairs = n * n.saturating_sub(1) / 2;
        (
            Just(n),
            proptest::collection::vec(proptest::bool::weighted(density), pairs),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
            .prop_map(|(n, keep, order)| {
                let edges = (0..n)
                    .tuple_combinations()
                    .zip(keep)
                    .filter(|&(_, k)| k)
                    .map(|((i, j), _)| (order[i], order[j]))
                    .collect();
                (n, edges)
            })
    })
}

fn build(n: usize, edges: &[(usize, usize)]) -> Poset<usize> {
    Poset::new(0..n, edges.iter().copied()).expect("generated graph is acyclic")
}

/// Every permutation of the elements that respects the order.
fn brute_force(poset: &Poset<usize>) -> HashSet<Vec<usize>> {
    let n = poset.len();
    (0..n)
        .permutations(n)
        .filter(|perm| {
            (0..n).all(|i| ((i + 1)..n).all(|j| !poset.is_less(perm[j], perm[i])))
        })
        .collect()
}

fn respects_covers(poset: &Poset<usize>, ext: &[usize]) -> bool {
    let mut pos = vec![0; ext.len()];
    for (slot, &e) in ext.iter().enumerate() {
        pos[e] = slot;
    }
    poset.cover_relations().all(|(a, b)| pos[a] < pos[b])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Emitted extensions are exactly the brute-force set, each once.
    #[test]
    fn complete_and_unique((n, edges) in arb_dag()) {
        let p = build(n, &edges);
        let emitted: Vec<Vec<usize>> = p.linear_extensions().collect();
        let distinct: HashSet<Vec<usize>> = emitted.iter().cloned().collect();
        prop_assert_eq!(distinct.len(), emitted.len(), "an extension repeated");
        prop_assert_eq!(distinct, brute_force(&p));
    }

    #[test]
    fn every_emission_respects_covers((n, edges) in arb_dag()) {
        let p = build(n, &edges);
        for ext in p.linear_extensions() {
            prop_assert!(respects_covers(&p, &ext));
        }
    }

    /// Each walk step swaps two adjacent incomparable elements or flips the
    /// sign, and no signed state is visited twice.
    #[test]
    fn walk_steps_are_adjacent_transpositions((n, edges) in arb_dag()) {
        let p = build(n, &edges);
        let mut engine = Engine::new(&p);
        let mut prev = engine.permutation().to_vec();
        let mut prev_sign = engine.is_positive();
        let mut visited = HashSet::new();
        visited.insert((prev.clone(), prev_sign));

        while let Some(step) = engine.advance() {
            let cur = engine.permutation().to_vec();
            match step {
                Step::Flip => {
                    prop_assert_eq!(&cur, &prev);
                    prop_assert_ne!(engine.is_positive(), prev_sign);
                }
                Step::Swap { slot } => {
                    prop_assert_eq!(engine.is_positive(), prev_sign);
                    let diff: Vec<usize> = (0..n).filter(|&s| cur[s] != prev[s]).collect();
                    prop_assert_eq!(diff, vec![slot, slot + 1]);
                    prop_assert_eq!(cur[slot], prev[slot + 1]);
                    prop_assert!(p.incomparable(cur[slot], cur[slot + 1]));
                }
            }
            prev = cur;
            prev_sign = engine.is_positive();
            prop_assert!(visited.insert((prev.clone(), prev_sign)), "signed state revisited");
        }
    }

    /// The walk visits every extension twice, once per sign, unless the order
    /// is a chain. Work is therefore linear in the number of extensions.
    #[test]
    fn walk_length_is_twice_the_extension_count((n, edges) in arb_dag()) {
        let p = build(n, &edges);
        let count = p.linear_extensions().count();
        let mut engine = Engine::new(&p);
        let mut states = 1usize;
        while engine.advance().is_some() {
            states += 1;
        }
        if p.incomparable_pairs().next().is_some() {
            prop_assert_eq!(states, 2 * count);
        } else {
            prop_assert_eq!((states, count), (1, 1));
        }
    }

    /// Separate runs and reset runs produce the same set.
    #[test]
    fn restartable((n, edges) in arb_dag()) {
        let p = build(n, &edges);
        let first: HashSet<Vec<usize>> = p.linear_extensions().collect();
        let mut run = p.linear_extensions();
        let _ = run.next();
        run.reset();
        let second: HashSet<Vec<usize>> = run.collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn baseline_is_an_extension((n, edges) in arb_dag()) {
        let p = build(n, &edges);
        let base = initial_extension(&p);
        prop_assert!(respects_covers(&p, &base.permutation));
        let pos = base.positions();
        for &(a, b) in &base.pairs {
            prop_assert_eq!(pos[a] + 1, pos[b]);
            prop_assert!(p.incomparable(a, b));
        }
    }

    /// Closing any path back on itself is rejected.
    #[test]
    fn cycles_are_rejected(
        (n, edges) in arb_dag(),
        len in 1usize..5,
        start in 0usize..8,
    ) {
        let n = n.max(1);
        let cycle: Vec<(usize, usize)> = (0..len)
            .map(|k| ((start + k) % n, (start + k + 1) % n))
            .chain(std::iter::once(((start + len) % n, start % n)))
            .collect();
        let all: Vec<_> = edges.into_iter().chain(cycle).collect();
        prop_assert!(Poset::new(0..n, all).is_err());
    }
}

#[test]
fn disjoint_chains_need_the_sign_flip() {
    // 4 even and 2 odd extensions: no single-swap path covers all six.
    let p = Poset::new(0..4usize, [(0, 1), (2, 3)]).unwrap();
    let parity = |perm: &[usize]| {
        (0..perm.len())
            .tuple_combinations()
            .filter(|&(i, j)| perm[i] > perm[j])
            .count()
            % 2
    };
    let even = p.linear_extensions().filter(|e| parity(e) == 0).count();
    assert_eq!(even, 4);
    assert_eq!(p.linear_extensions().count(), 6);
}
