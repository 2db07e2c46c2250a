use std::fmt::Debug;
use std::marker::PhantomData;

use crate::context::SearchContext;
use crate::context::SearchRun;
use crate::frontier::DepthFirstStack;
use crate::frontier::Frontier;
use crate::observer::Flow;
use crate::problem::ObjectiveProblem;
use crate::search::SearchResult;
use crate::space::Action;
use crate::space::Space;
use crate::space::State;

/// Depth-First Search with backtracking.
///
/// Only the current path counts as visited, so after backing out of a branch
/// its States may be reached again through another one. The first path found
/// is returned, and it's rarely the shortest.
///
/// Without a depth limit the number of simple paths explored grows
/// exponentially when the goal is unreachable. Use an expansion budget on
/// anything but small grids.
pub struct DepthFirstSearch<'p, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    problem: &'p P,
    name: &'static str,
    /// Maximum number of moves on a path.
    limit: Option<usize>,
    /// Keyed by depth.
    open: DepthFirstStack<usize, St>,
    _phantom_space: PhantomData<Sp>,
    _phantom_action: PhantomData<A>,
}

impl<'p, P, Sp, St, A> DepthFirstSearch<'p, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    #[must_use]
    pub fn new(problem: &'p P) -> Self {
        Self {
            problem,
            name: "DFS",
            limit: None,
            open: DepthFirstStack::new(),
            _phantom_space: PhantomData,
            _phantom_action: PhantomData,
        }
    }

    /// Never goes deeper than `limit` moves from the start.
    #[must_use]
    pub(crate) fn bounded(problem: &'p P, name: &'static str, limit: usize) -> Self {
        Self {
            name,
            limit: Some(limit),
            ..Self::new(problem)
        }
    }

    pub fn search(mut self, ctx: &SearchContext<'_, Sp, St>) -> SearchResult<St, A> {
        let space = self.problem.space();
        let mut run = SearchRun::new(self.name, ctx);

        let mut entering = Some((self.problem.start(), None));
        loop {
            if let Some((current, parent)) = entering.take() {
                let depth = self.open.len();
                self.open.push(depth, current, parent);

                let flow = run.expand(
                    space,
                    current,
                    || self.open.snapshot(),
                    || self.open.path(),
                );
                if flow == Flow::Stop {
                    return run.stopped();
                }
                if self.problem.is_goal(&current) {
                    return run.found(space, self.open.path());
                }

                if self.limit.is_none_or(|limit| depth < limit) {
                    self.open
                        .set_successors(space.neighbours(&current).into_iter().map(|(s, _a)| s));
                }
            }

            let Some(top) = self.open.top().map(|e| e.state) else {
                break;
            };
            match self.open.next_successor() {
                Some(s) => entering = Some((s, Some(top))),
                None => {
                    self.open.pop();
                }
            }
        }

        run.exhausted()
    }
}

impl<P, Sp, St, A> Debug for DepthFirstSearch<'_, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}{{limit: {:?}, depth: {}}}",
            self.name,
            self.limit,
            self.open.depth()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::testing::*;
    use crate::observer::Expansion;
    use crate::observer::SearchObserver;
    use crate::problems::grid_2d::Grid2DAction;
    use crate::problems::grid_2d::Grid2DProblem;
    use crate::problems::grid_2d::Grid2DSpace;
    use crate::problems::grid_2d::Grid2DState;
    use crate::search::SearchStatus;

    type Search<'p> = DepthFirstSearch<'p, Grid2DProblem, Grid2DSpace, Grid2DState, Grid2DAction>;

    #[test]
    fn follows_the_first_neighbour() {
        // Up is tried first, so once a column is done it snakes back up the
        // next one instead of heading for the goal.
        let problem = open_5x5();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.moves(), Some(24));
        assert_eq!(r.expansions, 25);

        use Grid2DAction::*;
        let expected: Vec<Grid2DAction> = [
            [Down; 4].as_slice(),
            &[Right],
            &[Up; 4],
            &[Right],
            &[Down; 4],
            &[Right],
            &[Up; 4],
            &[Right],
            &[Down; 4],
        ]
        .concat();
        assert_eq!(r.directions, expected);
    }

    #[test]
    fn finds_a_way_through_the_gap() {
        let problem = wall_with_gap();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert!(r.path.contains(&s(4, 2)));
    }

    #[test]
    fn start_on_goal_is_immediate() {
        let problem = start_on_goal();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_eq!(r.path, vec![s(1, 1)]);
        assert_eq!(r.expansions, 1);
    }

    #[test]
    fn exhausts_every_simple_path() {
        let problem = walled_off();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert!(!r.found);
        assert_eq!(r.status, SearchStatus::Exhausted);
        // (0,0) -> (1,0) -> (2,0), nothing else is reachable.
        assert_eq!(r.expansions, 3);
    }

    #[test]
    fn revisits_through_other_branches() {
        // A 2x2 loop, the goal is unreachable behind the wall.
        let problem = Grid2DProblem::from_map(indoc::indoc! {"
            R -
            - -
            X X
            - G
        "})
        .unwrap();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert!(!r.found);
        // (0,0) then both ways around the loop: 1 + 3 + 3.
        assert_eq!(r.expansions, 7);
    }

    #[derive(Debug)]
    struct DepthRecorder {
        max_depth: std::cell::Cell<usize>,
    }

    impl SearchObserver<Grid2DSpace, Grid2DState> for DepthRecorder {
        fn on_expand(&self, e: &Expansion<'_, Grid2DSpace, Grid2DState>) -> Flow {
            assert_eq!(e.path.last(), Some(&e.current));
            let depth = e.path.len() - 1;
            self.max_depth.set(self.max_depth.get().max(depth));
            Flow::Continue
        }
    }

    #[test]
    fn paths_never_repeat_states() {
        let problem = wall_with_gap();
        let observer = DepthRecorder {
            max_depth: std::cell::Cell::new(0),
        };
        let ctx = SearchContext::new().with_observer(&observer);
        let r = Search::new(&problem).search(&ctx);
        assert_valid(&problem, &r);
        // A simple path can't be longer than the number of free cells.
        assert!(observer.max_depth.get() < 21);
    }
}
