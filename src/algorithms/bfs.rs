use std::fmt::Debug;
use std::marker::PhantomData;

use crate::context::SearchContext;
use crate::context::SearchRun;
use crate::frontier::FifoFrontier;
use crate::frontier::Frontier;
use crate::observer::Flow;
use crate::problem::ObjectiveProblem;
use crate::search::PredecessorMap;
use crate::search::SearchResult;
use crate::space::Action;
use crate::space::Space;
use crate::space::State;

/// Breadth-First Search.
///
/// States are marked visited the moment they are enqueued, so none is ever
/// queued twice. Expansion is level by level, which makes the first goal
/// popped one with the fewest moves.
pub struct BreadthFirstSearch<'p, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    problem: &'p P,
    open: FifoFrontier<St>,
    /// Doubles as the visited set.
    predecessors: PredecessorMap<St>,
    _phantom_space: PhantomData<Sp>,
    _phantom_action: PhantomData<A>,
}

impl<'p, P, Sp, St, A> BreadthFirstSearch<'p, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    #[must_use]
    pub fn new(problem: &'p P) -> Self {
        let start = problem.start();
        let mut open = FifoFrontier::new();
        open.push((), start, None);

        Self {
            problem,
            open,
            predecessors: PredecessorMap::new(start),
            _phantom_space: PhantomData,
            _phantom_action: PhantomData,
        }
    }

    pub fn search(mut self, ctx: &SearchContext<'_, Sp, St>) -> SearchResult<St, A> {
        let space = self.problem.space();
        let mut run = SearchRun::new("BFS", ctx);

        while let Some(entry) = self.open.pop() {
            let current = entry.state;
            let flow = run.expand(
                space,
                current,
                || self.open.snapshot(),
                || self.predecessors.path_to(current),
            );
            if flow == Flow::Stop {
                return run.stopped();
            }

            if self.problem.is_goal(&current) {
                return run.found(space, self.predecessors.path_to(current));
            }

            for (s, _a) in space.neighbours(&current) {
                if self.predecessors.insert(s, current) {
                    self.open.push((), s, Some(current));
                }
            }
        }

        run.exhausted()
    }
}

impl<P, Sp, St, A> Debug for BreadthFirstSearch<'_, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "BFS{{|open|: {}, |reached|: {}}}",
            self.open.len(),
            self.predecessors.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::testing::*;
    use crate::problems::grid_2d::Grid2DAction;
    use crate::problems::grid_2d::Grid2DProblem;
    use crate::problems::grid_2d::Grid2DSpace;
    use crate::problems::grid_2d::Grid2DState;
    use crate::search::SearchStatus;

    type Search<'p> = BreadthFirstSearch<'p, Grid2DProblem, Grid2DSpace, Grid2DState, Grid2DAction>;

    #[test]
    fn open_grid_takes_shortest_path() {
        let problem = open_5x5();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.path.len(), 9);
        assert!(
            r.directions
                .iter()
                .all(|a| matches!(a, Grid2DAction::Down | Grid2DAction::Right))
        );
    }

    #[test]
    fn goes_through_the_gap() {
        let problem = wall_with_gap();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.moves(), Some(12));
        assert!(r.path.contains(&s(4, 2)));
    }

    #[test]
    fn start_on_goal_is_immediate() {
        let problem = start_on_goal();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_eq!(r.path, vec![s(1, 1)]);
        assert_eq!(r.moves(), Some(0));
        assert!(r.directions.is_empty());
        assert_eq!(r.expansions, 1);
    }

    #[test]
    fn exhausts_reachable_states() {
        let problem = walled_off();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert!(!r.found);
        assert_eq!(r.status, SearchStatus::Exhausted);
        assert!(r.path.is_empty());
        assert_eq!(r.expansions, 3);
    }

    #[test]
    fn is_deterministic() {
        let problem = wall_with_gap();
        let a = Search::new(&problem).search(&SearchContext::new());
        let b = Search::new(&problem).search(&SearchContext::new());
        assert_eq!(a, b);
    }

    #[test]
    fn budget_stops_the_search() {
        let problem = open_5x5();
        let ctx = SearchContext::new().with_expansion_budget(4);
        let r = Search::new(&problem).search(&ctx);
        assert!(!r.found);
        assert_eq!(r.status, SearchStatus::Stopped);
        assert_eq!(r.expansions, 4);
    }
}
