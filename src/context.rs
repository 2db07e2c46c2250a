use crate::observer::Expansion;
use crate::observer::Flow;
use crate::observer::NoObserver;
use crate::observer::SearchObserver;
use crate::search::SearchResult;
use crate::search::SearchStatus;
use crate::space::Action;
use crate::space::Space;
use crate::space::State;

/// Caller-owned settings for a search run.
///
/// The observer outlives the run and is only ever borrowed by it.
pub struct SearchContext<'o, Sp, St> {
    observer: &'o dyn SearchObserver<Sp, St>,
    expansion_budget: Option<usize>,
}

impl<Sp, St> SearchContext<'static, Sp, St> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            observer: &NoObserver,
            expansion_budget: None,
        }
    }
}

impl<Sp, St> Default for SearchContext<'static, Sp, St> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'o, Sp, St> SearchContext<'o, Sp, St> {
    #[must_use]
    pub fn with_observer<'n>(
        self,
        observer: &'n dyn SearchObserver<Sp, St>,
    ) -> SearchContext<'n, Sp, St> {
        SearchContext {
            observer,
            expansion_budget: self.expansion_budget,
        }
    }

    /// Stops runs after `budget` expansions.
    #[must_use]
    pub fn with_expansion_budget(mut self, budget: usize) -> Self {
        self.expansion_budget = Some(budget);
        self
    }

    pub fn expansion_budget(&self) -> Option<usize> {
        self.expansion_budget
    }
}

impl<Sp, St> std::fmt::Debug for SearchContext<'_, Sp, St> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "SearchContext{{observer: {}, budget: {:?}}}",
            self.observer.is_active(),
            self.expansion_budget
        )
    }
}

/// Bookkeeping for one run: counts expansions, drives the observer and builds
/// the final `SearchResult`.
pub(crate) struct SearchRun<'c, 'o, Sp, St> {
    name: &'static str,
    ctx: &'c SearchContext<'o, Sp, St>,
    expansions: usize,
    status: SearchStatus,
}

impl<'c, 'o, Sp, St> SearchRun<'c, 'o, Sp, St>
where
    St: State,
{
    pub(crate) fn new(name: &'static str, ctx: &'c SearchContext<'o, Sp, St>) -> Self {
        Self {
            name,
            ctx,
            expansions: 0,
            status: SearchStatus::Ready,
        }
    }

    pub(crate) fn expansions(&self) -> usize {
        self.expansions
    }

    /// Accounts for expanding `current` and notifies the observer.
    ///
    /// The snapshots are only built for active observers.
    pub(crate) fn expand<F, P>(&mut self, space: &Sp, current: St, frontier: F, path: P) -> Flow
    where
        F: FnOnce() -> Vec<St>,
        P: FnOnce() -> Vec<St>,
    {
        if self
            .ctx
            .expansion_budget
            .is_some_and(|budget| self.expansions >= budget)
        {
            log::debug!("{}: expansion budget of {} spent", self.name, self.expansions);
            return Flow::Stop;
        }

        if self.status == SearchStatus::Ready {
            log::debug!("{}: expanding from {:?}", self.name, current);
            self.status = SearchStatus::Expanding;
        }
        self.expansions += 1;

        if !self.ctx.observer.is_active() {
            return Flow::Continue;
        }
        let frontier = frontier();
        let path = path();
        self.ctx.observer.on_expand(&Expansion {
            space,
            current,
            frontier: &frontier,
            path: &path,
            expansions: self.expansions,
        })
    }

    pub(crate) fn found<A>(self, space: &Sp, path: Vec<St>) -> SearchResult<St, A>
    where
        Sp: Space<St, A>,
        A: Action,
    {
        let result = SearchResult::found(space, path, self.expansions);
        log::info!(
            "{}: reached {:?} in {} moves after {} expansions",
            self.name,
            result.goal,
            result.path.len() - 1,
            self.expansions,
        );
        result
    }

    pub(crate) fn exhausted<A: Action>(self) -> SearchResult<St, A> {
        self.finish(SearchStatus::Exhausted)
    }

    pub(crate) fn stopped<A: Action>(self) -> SearchResult<St, A> {
        self.finish(SearchStatus::Stopped)
    }

    fn finish<A: Action>(self, status: SearchStatus) -> SearchResult<St, A> {
        log::info!(
            "{}: no path ({}) after {} expansions",
            self.name,
            status,
            self.expansions
        );
        SearchResult::not_found(status, self.expansions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::grid_2d::Grid2DSpace;
    use crate::problems::grid_2d::Grid2DState;

    fn s(x: u32, y: u32) -> Grid2DState {
        Grid2DState::new(x, y).unwrap()
    }

    #[test]
    fn budget_allows_exactly_that_many_expansions() {
        let space = Grid2DSpace::new_empty(2, 2);
        let ctx = SearchContext::new().with_expansion_budget(2);
        let mut run = SearchRun::new("test", &ctx);
        assert_eq!(run.status, SearchStatus::Ready);

        assert_eq!(run.expand(&space, s(0, 0), Vec::new, Vec::new), Flow::Continue);
        assert_eq!(run.status, SearchStatus::Expanding);
        assert_eq!(run.expand(&space, s(1, 0), Vec::new, Vec::new), Flow::Continue);
        assert_eq!(run.expand(&space, s(1, 1), Vec::new, Vec::new), Flow::Stop);
        assert_eq!(run.expansions(), 2);

        let r = run.stopped::<crate::problems::grid_2d::Grid2DAction>();
        assert_eq!(r.status, SearchStatus::Stopped);
        assert_eq!(r.expansions, 2);
    }

    #[test]
    fn zero_budget_stops_before_the_first_expansion() {
        let space = Grid2DSpace::new_empty(1, 1);
        let ctx = SearchContext::new().with_expansion_budget(0);
        let mut run = SearchRun::new("test", &ctx);
        assert_eq!(run.expand(&space, s(0, 0), Vec::new, Vec::new), Flow::Stop);
        assert_eq!(run.status, SearchStatus::Ready);
        assert_eq!(run.expansions(), 0);
    }
}
