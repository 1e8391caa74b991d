use std::fmt;
use std::hash::Hash;

use ordermap::OrderMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use tracing::debug;

use crate::error::{NotAcyclicError, Result};

/// A finite partial order over caller-supplied labels.
///
/// Elements are the dense indices `0..len()`, assigned in order of first
/// appearance. The model is immutable once built.
#[derive(Debug, Clone)]
pub struct Poset<K> {
    /// Stable order-of-appearance (OOA): key -> idx
    idx: OrderMap<K, usize>,
    /// Reverse index: idx -> key
    keys: Vec<K>,
    /// Hasse edges: upper covers as sorted adjacency lists
    succ: Vec<Vec<usize>>,
    /// Hasse edges: lower covers as sorted adjacency lists
    pred: Vec<Vec<usize>>,
    /// Strict order, row-major: `less[a * n + b]` iff a < b
    less: Vec<bool>,
}

impl<K: Eq + Hash + Clone + fmt::Debug> Poset<K> {
    /// Builds the order generated by `edges` over `labels`.
    ///
    /// An edge `(u, v)` means `u` must precede `v`. Endpoints that are not in
    /// `labels` become elements too, appended after the listed labels.
    pub fn new<L, E>(labels: L, edges: E) -> Result<Self>
    where
        L: IntoIterator<Item = K>,
        E: IntoIterator<Item = (K, K)>,
    {
        let mut p = Self::empty();
        for k in labels {
            let _ = p.add_key(k);
        }
        let raw: Vec<(usize, usize)> = edges
            .into_iter()
            .map(|(u, v)| (p.add_key(u), p.add_key(v)))
            .collect();
        p.normalize(&raw)?;
        Ok(p)
    }

    /// Builds an order from a successor map: each entry lists the labels its
    /// key must precede.
    pub fn from_adjacency<I, S>(adjacency: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, S)>,
        S: IntoIterator<Item = K>,
    {
        let mut p = Self::empty();
        let mut raw = Vec::new();
        for (k, succs) in adjacency {
            let u = p.add_key(k);
            for s in succs {
                let v = p.add_key(s);
                raw.push((u, v));
            }
        }
        p.normalize(&raw)?;
        Ok(p)
    }

    /// Builds an order where every row is a chain: each key precedes the keys
    /// after it in the same row.
    pub fn from_chains(rows: &[Vec<K>]) -> Result<Self> {
        let mut p = Self::empty();
        for row in rows {
            for k in row {
                let _ = p.add_key(k.clone());
            }
        }
        let mut raw = Vec::new();
        for row in rows {
            for pair in row.windows(2) {
                raw.push((p.idx[&pair[0]], p.idx[&pair[1]]));
            }
        }
        p.normalize(&raw)?;
        Ok(p)
    }

    fn empty() -> Self {
        Self {
            idx: OrderMap::new(),
            keys: Vec::new(),
            succ: Vec::new(),
            pred: Vec::new(),
            less: Vec::new(),
        }
    }

    fn add_key(&mut self, k: K) -> usize {
        if let Some(&i) = self.idx.get(&k) {
            return i;
        }
        let i = self.keys.len();
        self.idx.insert(k.clone(), i);
        self.keys.push(k);
        i
    }

    /// Rejects cycles, then fills in the closure and the Hasse edges.
    fn normalize(&mut self, raw: &[(usize, usize)]) -> Result<()> {
        let n = self.keys.len();

        if let Some(&(i, _)) = raw.iter().find(|(u, v)| u == v) {
            return Err(self.cycle_through(i));
        }

        let mut g: DiGraph<(), ()> = DiGraph::with_capacity(n, raw.len());
        let nodes: Vec<NodeIndex> = (0..n).map(|_| g.add_node(())).collect();
        for &(u, v) in raw {
            g.update_edge(nodes[u], nodes[v], ());
        }

        if let Err(cycle) = toposort(&g, None) {
            return Err(self.cycle_through(cycle.node_id().index()));
        }

        // 1. Transitive closure, one DFS per element
        let mut less = vec![false; n * n];
        for u in 0..n {
            let mut dfs = Dfs::new(&g, nodes[u]);
            while let Some(nx) = dfs.next(&g) {
                let v = nx.index();
                if v != u {
                    less[u * n + v] = true;
                }
            }
        }

        // 2. Reduce to Hasse edges. Every cover is an input edge, so only
        // those need checking for an intermediate element.
        let mut succ: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut pred: Vec<Vec<usize>> = vec![Vec::new(); n];
        for edge in g.raw_edges() {
            let (u, v) = (edge.source().index(), edge.target().index());
            let implied = (0..n).any(|c| less[u * n + c] && less[c * n + v]);
            if !implied {
                succ[u].push(v);
                pred[v].push(u);
            }
        }
        for row in succ.iter_mut().chain(pred.iter_mut()) {
            row.sort_unstable();
        }

        self.succ = succ;
        self.pred = pred;
        self.less = less;
        debug!(
            elements = n,
            edges = raw.len(),
            covers = self.succ.iter().map(Vec::len).sum::<usize>(),
            "built order model"
        );
        Ok(())
    }

    fn cycle_through(&self, i: usize) -> NotAcyclicError {
        NotAcyclicError {
            witness: format!("{:?}", self.keys[i]),
        }
    }

    /// Internal index of `label`, if it is an element.
    pub fn index_of(&self, label: &K) -> Option<usize> {
        self.idx.get(label).copied()
    }
}

impl<K> Poset<K> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn label(&self, e: usize) -> &K {
        &self.keys[e]
    }

    /// All labels, indexed by element.
    pub fn labels(&self) -> &[K] {
        &self.keys
    }

    /// Elements covering `e`, ascending.
    pub fn upper_covers(&self, e: usize) -> &[usize] {
        &self.succ[e]
    }

    /// Elements covered by `e`, ascending.
    pub fn lower_covers(&self, e: usize) -> &[usize] {
        &self.pred[e]
    }

    /// The Hasse diagram as `(lower, upper)` pairs.
    pub fn cover_relations(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.succ
            .iter()
            .enumerate()
            .flat_map(|(u, vs)| vs.iter().map(move |&v| (u, v)))
    }

    /// True iff `a` strictly precedes `b`.
    pub fn is_less(&self, a: usize, b: usize) -> bool {
        self.less[a * self.len() + b]
    }

    /// True iff neither element precedes the other. An element is not
    /// incomparable to itself.
    pub fn incomparable(&self, a: usize, b: usize) -> bool {
        a != b && !self.is_less(a, b) && !self.is_less(b, a)
    }

    /// Oriented incomparabilities: every `(i, j)` with `i < j` and `i ∥ j`.
    pub fn incomparable_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| {
            ((i + 1)..n)
                .filter(move |&j| self.incomparable(i, j))
                .map(move |j| (i, j))
        })
    }

    pub fn minimal_elements(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&e| self.pred[e].is_empty())
    }
}

impl<K> fmt::Display for Poset<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Finite poset containing {} elements", self.len())
    }
}
