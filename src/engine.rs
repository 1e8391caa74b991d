//! Constant amortized time walk over the linear extensions of a poset.
//!
//! This is the Pruesse–Ruskey Gray code. The engine walks *signed* extensions:
//! every step either exchanges two incomparable elements in adjacent slots or
//! flips the sign while leaving the permutation alone. Each signed extension
//! is visited at most once and each extension is visited exactly once with a
//! positive sign, so the positive states are the linear extensions, each
//! emitted once.
//!
//! Plain single-swap Gray codes do not exist in general: for `a < b, c < d`
//! four of the six extensions are even permutations, so no path alternating
//! parity can cover them. The sign flip is what makes the walk possible.
//! Consecutive extensions are therefore joined by a run of legal swaps, not
//! necessarily a single one, even for orders where a single-swap path exists.
//!
//! The recursion of the published algorithm is unrolled into an explicit stack
//! of frames, one per active pair level, so the walk can stop after any step
//! and resume on demand.

use tracing::trace;

use crate::baseline::{initial_extension, Baseline};
use crate::poset::Poset;

/// One step of the signed walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// The elements in `slot` and `slot + 1` were exchanged.
    Swap { slot: usize },
    /// The sign changed; the permutation did not.
    Flip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

/// Where a frame resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resume {
    Start,
    SweepB,
    AfterB,
    SweepA,
    AfterA,
    Settle,
    ReturnA,
    Tail,
    ReturnB,
}

/// Movement bookkeeping for pair `level` while its sweep is in progress.
#[derive(Debug, Clone, Copy)]
struct Frame {
    level: usize,
    resume: Resume,
    /// Moves of `b` to the right so far.
    mrb: usize,
    /// Moves of `a` to the right during the current `b` position.
    mra: usize,
    /// Moves of `a` to the left still owed.
    mla: usize,
    /// Set once `a` has been able to move right at all.
    typical: bool,
    /// Loop counter for the return sweeps.
    done: usize,
}

impl Frame {
    fn new(level: usize) -> Self {
        Self {
            level,
            resume: Resume::Start,
            mrb: 0,
            mra: 0,
            mla: 0,
            typical: false,
            done: 0,
        }
    }
}

/// Generation state for one run. Owns its permutation; borrows the poset.
#[derive(Debug, Clone)]
pub struct Engine<'p, K> {
    poset: &'p Poset<K>,
    baseline: Baseline,
    perm: Vec<usize>,
    pos: Vec<usize>,
    a: Vec<usize>,
    b: Vec<usize>,
    positive: bool,
    stack: Vec<Frame>,
    /// The top pair has been switched and the second pass started.
    mirrored: bool,
    /// The current state is positive and `next_extension` has not yet
    /// handed it out.
    pending: bool,
}

impl<'p, K> Engine<'p, K> {
    pub fn new(poset: &'p Poset<K>) -> Self {
        let baseline = initial_extension(poset);
        let mut engine = Self {
            poset,
            perm: Vec::new(),
            pos: Vec::new(),
            a: Vec::new(),
            b: Vec::new(),
            positive: true,
            stack: Vec::new(),
            mirrored: false,
            pending: true,
            baseline,
        };
        engine.reset();
        engine
    }

    /// Rewinds to the baseline extension.
    pub fn reset(&mut self) {
        self.perm.clone_from(&self.baseline.permutation);
        self.pos = self.baseline.positions();
        self.a = self.baseline.pairs.iter().map(|&(a, _)| a).collect();
        self.b = self.baseline.pairs.iter().map(|&(_, b)| b).collect();
        self.positive = true;
        self.stack.clear();
        if let Some(top) = self.a.len().checked_sub(1) {
            self.stack.push(Frame::new(top));
        }
        self.mirrored = false;
        self.pending = true;
    }

    pub fn poset(&self) -> &'p Poset<K> {
        self.poset
    }

    /// Current permutation of element indices.
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    /// Current slot of element `e`.
    pub fn position(&self, e: usize) -> usize {
        self.pos[e]
    }

    /// Sign of the current state.
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// Next linear extension, lending the permutation buffer.
    ///
    /// The first call yields the baseline; `None` once every extension has
    /// been produced. May be mixed with `advance`: a positive state reached
    /// by `advance` is handed out by the next call, while positive states
    /// stepped over are not revisited.
    pub fn next_extension(&mut self) -> Option<&[usize]> {
        if !self.pending {
            while self.advance().is_some() && !self.pending {}
        }
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(&self.perm)
    }

    /// Takes one step of the signed walk. `None` when the walk is complete.
    pub fn advance(&mut self) -> Option<Step> {
        let step = self.walk()?;
        self.pending = self.positive;
        Some(step)
    }

    fn walk(&mut self) -> Option<Step> {
        loop {
            let Some(&frame) = self.stack.last() else {
                return self.begin_mirror();
            };
            let mut f = frame;
            let i = f.level;
            let (a, b) = (self.a[i], self.b[i]);

            // Every step is followed by a full sweep of the level below.
            let step = match f.resume {
                Resume::Start => {
                    f.resume = Resume::SweepB;
                    self.descend(f, None)
                }
                Resume::SweepB => {
                    if self.can_move_right(b, None) {
                        f.mrb += 1;
                        f.resume = Resume::AfterB;
                        let step = self.shift(b, Direction::Right);
                        self.descend(f, Some(step))
                    } else {
                        f.resume = Resume::Tail;
                        self.store(f)
                    }
                }
                Resume::AfterB => {
                    f.mra = 0;
                    f.resume = if self.can_move_right(a, Some(b)) {
                        f.typical = true;
                        Resume::SweepA
                    } else {
                        Resume::Settle
                    };
                    self.store(f)
                }
                Resume::SweepA => {
                    f.mra += 1;
                    f.resume = Resume::AfterA;
                    let step = self.shift(a, Direction::Right);
                    self.descend(f, Some(step))
                }
                Resume::AfterA => {
                    f.resume = if self.can_move_right(a, Some(b)) {
                        Resume::SweepA
                    } else {
                        Resume::Settle
                    };
                    self.store(f)
                }
                Resume::Settle => {
                    if f.typical {
                        f.mla = if f.mrb % 2 == 1 {
                            f.mra.saturating_sub(1)
                        } else {
                            f.mra + 1
                        };
                        f.done = 0;
                        f.resume = Resume::ReturnA;
                        let step = self.switch(i.checked_sub(1));
                        self.descend(f, Some(step))
                    } else {
                        f.resume = Resume::SweepB;
                        self.store(f)
                    }
                }
                Resume::ReturnA => {
                    if f.done < f.mla {
                        f.done += 1;
                        let step = self.shift(a, Direction::Left);
                        self.descend(f, Some(step))
                    } else {
                        f.resume = Resume::SweepB;
                        self.store(f)
                    }
                }
                Resume::Tail => {
                    let step = if f.typical && f.mrb % 2 == 1 {
                        self.shift(a, Direction::Left)
                    } else {
                        self.switch(i.checked_sub(1))
                    };
                    f.done = 0;
                    f.resume = Resume::ReturnB;
                    self.descend(f, Some(step))
                }
                Resume::ReturnB => {
                    if f.done < f.mrb {
                        f.done += 1;
                        let step = self.shift(b, Direction::Left);
                        self.descend(f, Some(step))
                    } else {
                        self.stack.pop();
                        None
                    }
                }
            };
            if step.is_some() {
                return step;
            }
        }
    }

    /// Writes `f` back to the top of the stack.
    fn store(&mut self, f: Frame) -> Option<Step> {
        if let Some(top) = self.stack.last_mut() {
            *top = f;
        }
        None
    }

    /// Writes `f` back and opens a sweep of the pair below it.
    fn descend(&mut self, f: Frame, step: Option<Step>) -> Option<Step> {
        self.store(f);
        if let Some(below) = f.level.checked_sub(1) {
            self.stack.push(Frame::new(below));
        }
        step
    }

    /// After the first pass over the top pair, switch it and sweep again.
    fn begin_mirror(&mut self) -> Option<Step> {
        let top = self.a.len().checked_sub(1)?;
        if self.mirrored {
            return None;
        }
        self.mirrored = true;
        trace!(level = top, "starting mirrored pass");
        let step = self.switch(Some(top));
        self.stack.push(Frame::new(top));
        Some(step)
    }

    /// `x` can take one step right: not at the end, the neighbour is not
    /// `blocker`, and the neighbour is incomparable to `x`.
    fn can_move_right(&self, x: usize, blocker: Option<usize>) -> bool {
        let next = self.pos[x] + 1;
        if next >= self.perm.len() {
            return false;
        }
        let y = self.perm[next];
        Some(y) != blocker && self.poset.incomparable(x, y)
    }

    fn shift(&mut self, x: usize, dir: Direction) -> Step {
        let slot = match dir {
            Direction::Right => self.pos[x],
            Direction::Left => self.pos[x] - 1,
        };
        self.transpose(slot)
    }

    /// Exchanges the two members of pair `level`, or flips the sign when
    /// there is no such pair.
    fn switch(&mut self, level: Option<usize>) -> Step {
        let Some(j) = level else {
            self.positive = !self.positive;
            return Step::Flip;
        };
        let (x, y) = (self.a[j], self.b[j]);
        let (px, py) = (self.pos[x], self.pos[y]);
        assert_eq!(px.abs_diff(py), 1, "pair {j} is not adjacent");
        let step = self.transpose(px.min(py));
        self.a[j] = y;
        self.b[j] = x;
        step
    }

    fn transpose(&mut self, slot: usize) -> Step {
        let (x, y) = (self.perm[slot], self.perm[slot + 1]);
        assert!(
            self.poset.incomparable(x, y),
            "attempted to swap comparable elements {x} and {y}"
        );
        self.perm.swap(slot, slot + 1);
        self.pos[x] = slot + 1;
        self.pos[y] = slot;
        Step::Swap { slot }
    }
}
