use crate::space::Action;
use crate::space::Cost;
use crate::space::Space;
use crate::space::State;

/// A problem with a single start and a set of goals where reaching any of
/// them ends the search.
pub trait ObjectiveProblem<Sp, St, A>: std::fmt::Debug
where
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    fn space(&self) -> &Sp;
    fn start(&self) -> St;
    /// All goals, in the order they were given.
    fn goals(&self) -> &[St];

    fn is_goal(&self, s: &St) -> bool {
        self.goals().contains(s)
    }
}

/// A heuristic estimating the cost between two States.
pub trait ObjectiveHeuristic<St, C>: std::fmt::Debug
where
    St: State,
    C: Cost,
{
    fn h(a: &St, b: &St) -> C;

    /// The estimate to the closest of `goals`.
    ///
    /// Returns `C::max_value()` when there are no goals.
    #[inline(always)]
    fn h_nearest(s: &St, goals: &[St]) -> C {
        let mut h = C::max_value();
        for g in goals {
            h = std::cmp::min(h, Self::h(s, g));
        }
        h
    }
}
