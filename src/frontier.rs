//! Frontiers, the discovered-but-not-yet-expanded States of a search.
//!
//! Every discipline shares the [`Frontier`] contract and stamps each pushed
//! State with a monotonic sequence number. Whenever two entries share a
//! priority key the one inserted first wins, which makes every strategy
//! reproducible run after run.

use std::collections::VecDeque;
use std::fmt::Debug;

use derive_more::Display;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::data_structures::heap::Heap;
use crate::space::State;

/// A State waiting in a Frontier.
///
/// Ranked by `(key, seq)`. `seq` is unique within a Frontier, so two entries
/// never compare equal unless they are the same entry.
#[derive(Copy, Clone, Debug)]
pub struct FrontierEntry<K, St> {
    /// The priority key. Lower goes first.
    pub key: K,
    /// Insertion order within the Frontier.
    pub seq: u64,
    pub state: St,
    /// The State that discovered this one. `None` for the start.
    pub parent: Option<St>,
}

impl<K: Ord, St> PartialEq for FrontierEntry<K, St> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}
impl<K: Ord, St> Eq for FrontierEntry<K, St> {}

impl<K: Ord, St> PartialOrd for FrontierEntry<K, St> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<K: Ord, St> Ord for FrontierEntry<K, St> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// The ordering discipline shared by every strategy.
pub trait Frontier<K, St: State>: Debug {
    /// Schedules `state` and returns its sequence number.
    fn push(&mut self, key: K, state: St, parent: Option<St>) -> u64;
    fn pop(&mut self) -> Option<FrontierEntry<K, St>>;
    fn is_empty(&self) -> bool;
    fn len(&self) -> usize;
    /// Whether some live entry holds `s`.
    fn contains(&self, s: &St) -> bool;
    /// The States currently waiting, for observers.
    fn snapshot(&self) -> Vec<St>;
}

/// Counts live entries per State so `contains` is O(1) even when a State is
/// queued more than once.
#[derive(Clone, Debug)]
struct Occupancy<St: State> {
    counts: FxHashMap<St, u32>,
}

impl<St: State> Occupancy<St> {
    fn new() -> Self {
        Self {
            counts: FxHashMap::default(),
        }
    }
    fn add(&mut self, s: St) {
        *self.counts.entry(s).or_insert(0) += 1;
    }
    fn remove(&mut self, s: &St) {
        match self.counts.get_mut(s) {
            Some(1) => {
                self.counts.remove(s);
            }
            Some(n) => *n -= 1,
            None => unreachable!("Removed {s:?} which was never added"),
        }
    }
    fn contains(&self, s: &St) -> bool {
        self.counts.contains_key(s)
    }
}

/// Strict arrival order (BFS).
#[derive(Clone, Debug)]
pub struct FifoFrontier<St: State> {
    queue: VecDeque<FrontierEntry<(), St>>,
    live: Occupancy<St>,
    next_seq: u64,
}

impl<St: State> FifoFrontier<St> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(256),
            live: Occupancy::new(),
            next_seq: 0,
        }
    }
}

impl<St: State> Default for FifoFrontier<St> {
    fn default() -> Self {
        Self::new()
    }
}

impl<St: State> Frontier<(), St> for FifoFrontier<St> {
    fn push(&mut self, key: (), state: St, parent: Option<St>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.add(state);
        self.queue.push_back(FrontierEntry {
            key,
            seq,
            state,
            parent,
        });
        seq
    }
    fn pop(&mut self) -> Option<FrontierEntry<(), St>> {
        let entry = self.queue.pop_front()?;
        self.live.remove(&entry.state);
        Some(entry)
    }
    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
    fn len(&self) -> usize {
        self.queue.len()
    }
    fn contains(&self, s: &St) -> bool {
        self.live.contains(s)
    }
    fn snapshot(&self) -> Vec<St> {
        self.queue.iter().map(|e| e.state).collect()
    }
}

/// Lowest key first, earliest insertion among equal keys (A*, Greedy
/// Best-First).
#[derive(Clone, Debug)]
pub struct PriorityFrontier<K, St>
where
    K: Ord + Copy + Debug,
    St: State,
{
    open: Heap<FrontierEntry<K, St>>,
    live: Occupancy<St>,
    next_seq: u64,
}

impl<K, St> PriorityFrontier<K, St>
where
    K: Ord + Copy + Debug,
    St: State,
{
    pub fn new() -> Self {
        Self {
            open: Heap::with_capacity(256),
            live: Occupancy::new(),
            next_seq: 0,
        }
    }

    pub fn peek_key(&self) -> Option<K> {
        self.open.peek().map(|e| e.key)
    }
}

impl<K, St> Default for PriorityFrontier<K, St>
where
    K: Ord + Copy + Debug,
    St: State,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, St> Frontier<K, St> for PriorityFrontier<K, St>
where
    K: Ord + Copy + Debug,
    St: State,
{
    fn push(&mut self, key: K, state: St, parent: Option<St>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.add(state);
        self.open.push(FrontierEntry {
            key,
            seq,
            state,
            parent,
        });
        seq
    }
    fn pop(&mut self) -> Option<FrontierEntry<K, St>> {
        let entry = self.open.pop()?;
        self.live.remove(&entry.state);
        Some(entry)
    }
    fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
    fn len(&self) -> usize {
        self.open.len()
    }
    fn contains(&self, s: &St) -> bool {
        self.live.contains(s)
    }
    fn snapshot(&self) -> Vec<St> {
        let mut entries: Vec<&FrontierEntry<K, St>> = self.open.iter().collect();
        entries.sort();
        entries.into_iter().map(|e| e.state).collect()
    }
}

/// One level of a depth-first descent.
#[derive(Clone, Debug)]
struct Frame<K, St> {
    entry: FrontierEntry<K, St>,
    /// Successors still to try, in neighbour order.
    successors: SmallVec<[St; 4]>,
    /// Cursor into `successors`.
    next: usize,
}

/// Depth-first stack with backtracking (DFS, DLS, IDA*).
///
/// The stack doubles as the path-local visited set: a State is "visited" while
/// it is on the current path. Popping a frame backtracks, releasing its State
/// so other branches may go through it later, but a single path never
/// contains a State twice.
#[derive(Clone, Debug)]
pub struct DepthFirstStack<K, St: State> {
    frames: Vec<Frame<K, St>>,
    on_path: FxHashSet<St>,
    next_seq: u64,
}

impl<K: Copy + Debug, St: State> DepthFirstStack<K, St> {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(64),
            on_path: FxHashSet::default(),
            next_seq: 0,
        }
    }

    pub fn top(&self) -> Option<&FrontierEntry<K, St>> {
        self.frames.last().map(|f| &f.entry)
    }

    /// Sets the successors the top frame will hand out.
    pub fn set_successors<I: IntoIterator<Item = St>>(&mut self, successors: I) {
        if let Some(top) = self.frames.last_mut() {
            top.successors = successors.into_iter().collect();
            top.next = 0;
        }
    }

    /// Hands out the next successor of the top frame that is not already on
    /// the current path.
    pub fn next_successor(&mut self) -> Option<St> {
        let top = self.frames.last_mut()?;
        while top.next < top.successors.len() {
            let s = top.successors[top.next];
            top.next += 1;
            if !self.on_path.contains(&s) {
                return Some(s);
            }
        }
        None
    }

    /// The States from the bottom to the top of the stack.
    pub fn path(&self) -> Vec<St> {
        self.frames.iter().map(|f| f.entry.state).collect()
    }

    /// Number of edges on the current path.
    pub fn depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }
}

impl<K: Copy + Debug, St: State> Default for DepthFirstStack<K, St> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Debug, St: State> Frontier<K, St> for DepthFirstStack<K, St> {
    fn push(&mut self, key: K, state: St, parent: Option<St>) -> u64 {
        let inserted = self.on_path.insert(state);
        assert!(inserted, "{state:?} is already on the current path");

        let seq = self.next_seq;
        self.next_seq += 1;
        self.frames.push(Frame {
            entry: FrontierEntry {
                key,
                seq,
                state,
                parent,
            },
            successors: SmallVec::new(),
            next: 0,
        });
        seq
    }
    /// Backtracks out of the top frame.
    fn pop(&mut self) -> Option<FrontierEntry<K, St>> {
        let frame = self.frames.pop()?;
        self.on_path.remove(&frame.entry.state);
        Some(frame.entry)
    }
    fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
    fn len(&self) -> usize {
        self.frames.len()
    }
    fn contains(&self, s: &St) -> bool {
        self.on_path.contains(s)
    }
    fn snapshot(&self) -> Vec<St> {
        self.frames
            .iter()
            .flat_map(|f| f.successors[f.next..].iter().copied())
            .filter(|s| !self.on_path.contains(s))
            .collect()
    }
}

/// Which end of a bidirectional search.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Side {
    #[display("start")]
    Start,
    #[display("goal")]
    Goal,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Start => Side::Goal,
            Side::Goal => Side::Start,
        }
    }
}

/// Two independent FIFOs expanded in strict alternation (bidirectional).
///
/// The goal side is seeded with every goal, so it searches backwards from
/// all of them at once.
#[derive(Clone, Debug)]
pub struct DualFrontier<St: State> {
    start: FifoFrontier<St>,
    goal: FifoFrontier<St>,
    turn: Side,
}

impl<St: State> DualFrontier<St> {
    pub fn new(start: St, goals: &[St]) -> Self {
        let mut dual = Self {
            start: FifoFrontier::new(),
            goal: FifoFrontier::new(),
            turn: Side::Start,
        };
        dual.start.push((), start, None);
        for g in goals {
            dual.goal.push((), *g, None);
        }
        dual
    }

    pub fn side(&self, side: Side) -> &FifoFrontier<St> {
        match side {
            Side::Start => &self.start,
            Side::Goal => &self.goal,
        }
    }
    pub fn side_mut(&mut self, side: Side) -> &mut FifoFrontier<St> {
        match side {
            Side::Start => &mut self.start,
            Side::Goal => &mut self.goal,
        }
    }

    /// Returns whose turn it is and hands the next turn to the other side.
    pub fn take_turn(&mut self) -> Side {
        let side = self.turn;
        self.turn = side.other();
        side
    }

    /// Once either side runs dry the two searches can no longer meet.
    pub fn exhausted(&self) -> bool {
        self.start.is_empty() || self.goal.is_empty()
    }

    pub fn snapshot(&self) -> Vec<St> {
        let mut s = self.start.snapshot();
        s.extend(self.goal.snapshot());
        s
    }
}
