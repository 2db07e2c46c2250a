use std::fmt::Debug;
use std::marker::PhantomData;

use crate::context::SearchContext;
use crate::context::SearchRun;
use crate::frontier::Frontier;
use crate::frontier::PriorityFrontier;
use crate::observer::Flow;
use crate::problem::ObjectiveHeuristic;
use crate::problem::ObjectiveProblem;
use crate::search::PredecessorMap;
use crate::search::SearchResult;
use crate::space::Action;
use crate::space::Cost;
use crate::space::Space;
use crate::space::State;

/// Greedy Best-First Search.
///
/// Always expands the State that looks closest to a goal, ignoring how far
/// it's from the start. States are marked visited when first discovered and
/// keep the predecessor that discovered them, so paths are often longer than
/// necessary.
pub struct GreedyBestFirstSearch<'p, H, P, Sp, St, A, C>
where
    H: ObjectiveHeuristic<St, C>,
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    C: Cost,
{
    problem: &'p P,
    /// Keyed by h.
    open: PriorityFrontier<C, St>,
    /// Doubles as the visited set.
    predecessors: PredecessorMap<St>,
    _phantom_heuristic: PhantomData<H>,
    _phantom_space: PhantomData<Sp>,
    _phantom_action: PhantomData<A>,
}

impl<'p, H, P, Sp, St, A, C> GreedyBestFirstSearch<'p, H, P, Sp, St, A, C>
where
    H: ObjectiveHeuristic<St, C>,
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    C: Cost,
{
    #[must_use]
    pub fn new(problem: &'p P) -> Self {
        let start = problem.start();
        let mut open = PriorityFrontier::new();
        open.push(H::h_nearest(&start, problem.goals()), start, None);

        Self {
            problem,
            open,
            predecessors: PredecessorMap::new(start),
            _phantom_heuristic: PhantomData,
            _phantom_space: PhantomData,
            _phantom_action: PhantomData,
        }
    }

    pub fn search(mut self, ctx: &SearchContext<'_, Sp, St>) -> SearchResult<St, A> {
        let space = self.problem.space();
        let goals = self.problem.goals();
        let mut run = SearchRun::new("GBFS", ctx);

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
                    self.open.push(H::h_nearest(&s, goals), s, Some(current));
                }
            }
        }

        run.exhausted()
    }
}

impl<H, P, Sp, St, A, C> Debug for GreedyBestFirstSearch<'_, H, P, Sp, St, A, C>
where
    H: ObjectiveHeuristic<St, C>,
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "GBFS{{|open|: {}, |reached|: {}, best h: {:?}}}",
            self.open.len(),
            self.predecessors.len(),
            self.open.peek_key()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::bfs::BreadthFirstSearch;
    use crate::algorithms::testing::*;
    use crate::problems::grid_2d::Grid2DAction;
    use crate::problems::grid_2d::Grid2DCost;
    use crate::problems::grid_2d::Grid2DHeuristicManhattan;
    use crate::problems::grid_2d::Grid2DProblem;
    use crate::problems::grid_2d::Grid2DSpace;
    use crate::problems::grid_2d::Grid2DState;
    use crate::search::SearchStatus;

    type Search<'p> = GreedyBestFirstSearch<
        'p,
        Grid2DHeuristicManhattan,
        Grid2DProblem,
        Grid2DSpace,
        Grid2DState,
        Grid2DAction,
        Grid2DCost,
    >;

    #[test]
    fn open_grid_goes_straight_for_the_goal() {
        let problem = open_5x5();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.moves(), Some(8));
        assert_eq!(r.expansions, 9);
    }

    #[test]
    fn can_be_worse_than_bfs() {
        // Heads down the left edge towards the goal, bumps into the wall and
        // keeps the detour it took to get there.
        let problem = Grid2DProblem::from_map(indoc::indoc! {"
            R - - - - -
            - - - - - -
            - - - - - -
            - - - X - -
            - - - X - G
        "})
        .unwrap();

        let greedy = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &greedy);
        assert_eq!(greedy.moves(), Some(13));

        let bfs = BreadthFirstSearch::<Grid2DProblem, Grid2DSpace, Grid2DState, Grid2DAction>::new(
            &problem,
        )
        .search(&SearchContext::new());
        assert_eq!(bfs.moves(), Some(9));
    }

    #[test]
    fn start_on_goal_is_immediate() {
        let problem = start_on_goal();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_eq!(r.path, vec![s(1, 1)]);
        assert_eq!(r.expansions, 1);
    }

    #[test]
    fn exhausts_reachable_states() {
        let problem = walled_off();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert!(!r.found);
        assert_eq!(r.status, SearchStatus::Exhausted);
        assert_eq!(r.expansions, 3);
    }
}
