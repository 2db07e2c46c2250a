use std::fmt::Debug;
use std::hash::Hash;

use num_traits::SaturatingAdd;
use num_traits::sign::Unsigned;
use smallvec::SmallVec;

pub trait Action: Copy + Clone + Debug + PartialEq + Eq {}
pub trait State: Copy + Clone + Debug + PartialEq + Eq + Hash {}
pub trait Cost:
    Copy
    + Clone
    + Debug
    + std::fmt::Display
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + SaturatingAdd
    + Unsigned
    + num_traits::bounds::UpperBounded
    + std::ops::Add<Output = Self>
    + std::ops::AddAssign
{
    fn valid(&self) -> bool {
        *self != Self::max_value()
    }
}

/// Successors of a State, in the order the Space wants them tried.
///
/// Grids never have more than 4 neighbours, so this never spills to the heap.
pub type Neighbours<St, A> = SmallVec<[(St, A); 4]>;

/// A graph-like view over States where every edge has unit cost.
///
/// Edges are expected to be symmetric. Bidirectional search expands the goal
/// side with the same `neighbours` as the start side.
pub trait Space<St, A>: Clone + Debug
where
    St: State,
    A: Action,
{
    fn apply(&self, s: &St, a: &A) -> Option<St>;

    /// Verify a State is within the Space.
    fn valid(&self, s: &St) -> bool;
    /// Whether an in-bounds State can never be stepped on.
    fn blocked(&self, s: &St) -> bool;

    /// Expands a State.
    ///
    /// The order is fixed for a given Space and is what every strategy uses to
    /// break ties between siblings.
    fn neighbours(&self, s: &St) -> Neighbours<St, A>;

    /// The Action that takes `from` to `to` in a single step, if any.
    fn action_between(&self, from: &St, to: &St) -> Option<A>;

    /// Checks that a path only steps on free States and that each step is a
    /// single valid Action.
    fn valid_path(&self, path: &[St]) -> bool {
        if !path.iter().all(|s| self.valid(s) && !self.blocked(s)) {
            return false;
        }
        path.windows(2).all(|w| match self.action_between(&w[0], &w[1]) {
            Some(a) => self.apply(&w[0], &a) == Some(w[1]),
            None => false,
        })
    }
}
