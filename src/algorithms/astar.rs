use std::fmt::Debug;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

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

/// A* over unit-cost Spaces.
///
/// The Frontier is keyed by `f = g + h` alone, so States with equal f-values
/// come out in the order they were pushed. States are closed when dequeued and never expanded again. Their
/// predecessor is the parent of the entry that closed them, which for an
/// admissible heuristic is on a shortest path. Worse entries left behind in
/// the Frontier are skipped when they come up.
pub struct AStarSearch<'p, H, P, Sp, St, A, C>
where
    H: ObjectiveHeuristic<St, C>,
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    C: Cost,
{
    problem: &'p P,

    /// Keyed by f.
    open: PriorityFrontier<C, St>,

    /// Best g-value seen for each State reached so far.
    g: FxHashMap<St, C>,

    /// States already expanded.
    closed: FxHashSet<St>,

    /// Only holds closed States.
    predecessors: PredecessorMap<St>,

    _phantom_heuristic: PhantomData<H>,
    _phantom_space: PhantomData<Sp>,
    _phantom_action: PhantomData<A>,
}

impl<'p, H, P, Sp, St, A, C> AStarSearch<'p, H, P, Sp, St, A, C>
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

        let mut search = Self {
            problem,
            open: PriorityFrontier::new(),
            g: FxHashMap::default(),
            closed: FxHashSet::default(),
            predecessors: PredecessorMap::new(start),
            _phantom_heuristic: PhantomData,
            _phantom_space: PhantomData,
            _phantom_action: PhantomData,
        };

        let h = search.h(&start);
        search.g.insert(start, C::zero());
        search.open.push(h, start, None);
        search
    }

    pub fn search(mut self, ctx: &SearchContext<'_, Sp, St>) -> SearchResult<St, A> {
        let space = self.problem.space();
        let mut run = SearchRun::new("A*", ctx);

        while let Some(entry) = self.open.pop() {
            let current = entry.state;
            if !self.closed.insert(current) {
                // Superseded by a better entry that was closed first.
                continue;
            }
            if let Some(parent) = entry.parent {
                let inserted = self.predecessors.insert(current, parent);
                debug_assert!(inserted);
            }

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

            let Some(&g) = self.g.get(&current) else {
                unreachable!("Expanded {current:?} which was never reached");
            };
            let neigh_g = g + C::one();
            for (s, _a) in space.neighbours(&current) {
                if self.closed.contains(&s) {
                    continue;
                }
                if self.g.get(&s).is_some_and(|old_g| *old_g <= neigh_g) {
                    continue;
                }
                self.g.insert(s, neigh_g);
                let f = neigh_g.saturating_add(&self.h(&s));
                self.open.push(f, s, Some(current));
            }
        }

        run.exhausted()
    }

    #[inline(always)]
    #[must_use]
    pub(crate) fn h(&self, s: &St) -> C {
        H::h_nearest(s, self.problem.goals())
    }

    pub fn is_closed(&self, s: &St) -> bool {
        self.closed.contains(s)
    }

    pub fn write_memory_stats<W: std::fmt::Write>(&self, mut out: W) -> Result<W, std::fmt::Error> {
        writeln!(out, "|open|: {}", self.open.len())?;
        writeln!(out, "|closed|: {}", self.closed.len())?;
        writeln!(out, "|g|: {}", self.g.len())?;
        writeln!(
            out,
            "g: {} bytes",
            (size_of::<St>() + size_of::<C>()) * self.g.capacity()
        )?;
        Ok(out)
    }
}

impl<H, P, Sp, St, A, C> Debug for AStarSearch<'_, H, P, Sp, St, A, C>
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
            "A*{{|open|: {}, |closed|: {}, best f: {:?}}}",
            self.open.len(),
            self.closed.len(),
            self.open.peek_key()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::testing::*;
    use crate::problems::grid_2d::Grid2DAction;
    use crate::problems::grid_2d::Grid2DCost;
    use crate::problems::grid_2d::Grid2DHeuristicManhattan;
    use crate::problems::grid_2d::Grid2DProblem;
    use crate::problems::grid_2d::Grid2DSpace;
    use crate::problems::grid_2d::Grid2DState;
    use crate::search::SearchStatus;

    type Search<'p> = AStarSearch<
        'p,
        Grid2DHeuristicManhattan,
        Grid2DProblem,
        Grid2DSpace,
        Grid2DState,
        Grid2DAction,
        Grid2DCost,
    >;

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
        // Every free cell has f = 8 and ties go by insertion order, so the
        // whole grid is expanded before the goal comes up.
        assert_eq!(r.expansions, 25);
        assert_eq!(r.directions[..4], [Grid2DAction::Down; 4]);
    }

    #[test]
    fn goes_around_the_wall() {
        let problem = wall_with_gap();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.moves(), Some(12));
    }

    #[test]
    fn start_on_goal_is_immediate() {
        let problem = start_on_goal();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_eq!(r.path, vec![s(1, 1)]);
        assert_eq!(r.expansions, 1);
    }

    #[test]
    fn heads_for_the_nearest_goal() {
        let problem = Grid2DProblem::new(
            Grid2DSpace::new_empty(8, 8),
            s(3, 3),
            vec![s(7, 7), s(3, 1)],
        )
        .unwrap();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.goal, Some(s(3, 1)));
        assert_eq!(r.directions, vec![Grid2DAction::Up, Grid2DAction::Up]);
    }

    #[test]
    fn exhausts_reachable_states() {
        let problem = walled_off();
        let r = Search::new(&problem).search(&SearchContext::new());
        assert!(!r.found);
        assert_eq!(r.status, SearchStatus::Exhausted);
        assert_eq!(r.expansions, 3);
    }

    #[test]
    fn stats_are_written() {
        let problem = open_5x5();
        let search = Search::new(&problem);
        assert!(!search.is_closed(&s(0, 0)));
        let stats = search.write_memory_stats(String::new()).unwrap();
        assert!(stats.starts_with("|open|: 1\n"));
    }
}
