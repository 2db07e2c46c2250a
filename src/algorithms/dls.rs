use std::fmt::Debug;

use crate::algorithms::dfs::DepthFirstSearch;
use crate::context::SearchContext;
use crate::problem::ObjectiveProblem;
use crate::search::SearchResult;
use crate::space::Action;
use crate::space::Space;
use crate::space::State;

/// Depth-Limited Search.
///
/// A Depth-First Search that never follows a path for more than `limit`
/// moves. Missing the goal within the limit and exhausting the whole Space
/// are reported the same way.
pub struct DepthLimitedSearch<'p, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    inner: DepthFirstSearch<'p, P, Sp, St, A>,
    limit: usize,
}

impl<'p, P, Sp, St, A> DepthLimitedSearch<'p, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    #[must_use]
    pub fn new(problem: &'p P, limit: usize) -> Self {
        Self {
            inner: DepthFirstSearch::bounded(problem, "DLS", limit),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn search(self, ctx: &SearchContext<'_, Sp, St>) -> SearchResult<St, A> {
        log::debug!("DLS: limited to {} moves", self.limit);
        self.inner.search(ctx)
    }
}

impl<P, Sp, St, A> Debug for DepthLimitedSearch<'_, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.inner.fmt(f)
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

    type Search<'p> =
        DepthLimitedSearch<'p, Grid2DProblem, Grid2DSpace, Grid2DState, Grid2DAction>;

    #[test]
    fn too_shallow_misses_the_goal() {
        let problem = wall_with_gap();
        for limit in [0, 4, 11] {
            let r = Search::new(&problem, limit).search(&SearchContext::new());
            assert!(!r.found, "limit {limit}");
            assert_eq!(r.status, SearchStatus::Exhausted);
            assert!(r.path.is_empty());
        }
    }

    #[test]
    fn deep_enough_goes_through_the_gap() {
        let problem = wall_with_gap();
        let r = Search::new(&problem, 12).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.moves(), Some(12));
        assert!(r.path.contains(&s(4, 2)));

        let r = Search::new(&problem, 20).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert!(r.moves().is_some_and(|m| m <= 20));
    }

    #[test]
    fn zero_limit_only_checks_the_start() {
        let problem = start_on_goal();
        let r = Search::new(&problem, 0).search(&SearchContext::new());
        assert_eq!(r.path, vec![s(1, 1)]);
        assert_eq!(r.expansions, 1);

        let problem = open_5x5();
        let r = Search::new(&problem, 0).search(&SearchContext::new());
        assert!(!r.found);
        assert_eq!(r.expansions, 1);
    }

    #[test]
    fn never_goes_past_the_limit() {
        let problem = open_5x5();
        let r = Search::new(&problem, 8).search(&SearchContext::new());
        assert_valid(&problem, &r);
        assert_eq!(r.moves(), Some(8));
    }
}
