use std::fmt;
use std::iter::FusedIterator;

use tracing::debug;

use crate::engine::Engine;
use crate::poset::Poset;

/// Lazy sequence of every linear extension of a poset, as label vectors.
///
/// Each value owns its labels; the engine's buffer is translated at the
/// moment of emission. Runs are independent: any number may share one poset.
#[derive(Debug, Clone)]
pub struct LinearExtensions<'p, K> {
    engine: Engine<'p, K>,
    emitted: usize,
    finished: bool,
}

impl<'p, K> LinearExtensions<'p, K> {
    pub fn new(poset: &'p Poset<K>) -> Self {
        Self {
            engine: Engine::new(poset),
            emitted: 0,
            finished: false,
        }
    }

    /// Starts over from the first extension.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.emitted = 0;
        self.finished = false;
    }

    /// Number of extensions produced so far in this run.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl<K: Clone> Iterator for LinearExtensions<'_, K> {
    type Item = Vec<K>;

    fn next(&mut self) -> Option<Vec<K>> {
        if self.finished {
            return None;
        }
        let poset = self.engine.poset();
        match self.engine.next_extension() {
            Some(perm) => {
                self.emitted += 1;
                Some(perm.iter().map(|&e| poset.label(e).clone()).collect())
            }
            None => {
                self.finished = true;
                debug!(emitted = self.emitted, "linear extensions exhausted");
                None
            }
        }
    }
}

impl<K: Clone> FusedIterator for LinearExtensions<'_, K> {}

impl<K> fmt::Display for LinearExtensions<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Linear extensions of {}", self.engine.poset())
    }
}

/// Starts a fresh enumeration over `poset`.
pub fn extensions_of<K>(poset: &Poset<K>) -> LinearExtensions<'_, K> {
    LinearExtensions::new(poset)
}

impl<K> Poset<K> {
    /// Starts a fresh enumeration of this order's linear extensions.
    pub fn linear_extensions(&self) -> LinearExtensions<'_, K> {
        LinearExtensions::new(self)
    }
}
