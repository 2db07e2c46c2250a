use std::cmp::min;
use std::fmt::Debug;
use std::marker::PhantomData;

use crate::context::SearchContext;
use crate::context::SearchRun;
use crate::frontier::DepthFirstStack;
use crate::frontier::Frontier;
use crate::observer::Flow;
use crate::problem::ObjectiveHeuristic;
use crate::problem::ObjectiveProblem;
use crate::search::SearchResult;
use crate::space::Action;
use crate::space::Cost;
use crate::space::Space;
use crate::space::State;

/// How a single threshold-bounded descent ended.
#[derive(Debug)]
enum Descent<St, C> {
    Found(Vec<St>),
    Stopped,
    /// Nothing left under the threshold. Holds the smallest f-value that went
    /// over it, or `C::max_value()` if nothing did.
    Exceeded(C),
}

/// Iterative Deepening A*.
///
/// Runs depth-first descents bounded by an f-value threshold, starting at
/// the heuristic estimate of the start and raising it to the smallest f-value
/// that overflowed the previous descent. Each descent only keeps the current
/// path in memory.
pub struct IterativeDeepeningAStarSearch<'p, H, P, Sp, St, A, C>
where
    H: ObjectiveHeuristic<St, C>,
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    C: Cost,
{
    problem: &'p P,
    max_iterations: Option<usize>,
    _phantom_heuristic: PhantomData<H>,
    _phantom_space: PhantomData<Sp>,
    _phantom_state: PhantomData<St>,
    _phantom_action: PhantomData<A>,
    _phantom_cost: PhantomData<C>,
}

impl<'p, H, P, Sp, St, A, C> IterativeDeepeningAStarSearch<'p, H, P, Sp, St, A, C>
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
        Self {
            problem,
            max_iterations: None,
            _phantom_heuristic: PhantomData,
            _phantom_space: PhantomData,
            _phantom_state: PhantomData,
            _phantom_action: PhantomData,
            _phantom_cost: PhantomData,
        }
    }

    /// Gives up after `max_iterations` descents.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn search(self, ctx: &SearchContext<'_, Sp, St>) -> SearchResult<St, A> {
        let space = self.problem.space();
        let mut run = SearchRun::new("IDA*", ctx);

        let mut threshold = H::h_nearest(&self.problem.start(), self.problem.goals());
        let mut iteration = 0usize;
        loop {
            if self.max_iterations.is_some_and(|max| iteration >= max) {
                log::debug!("IDA*: gave up after {iteration} iterations");
                return run.exhausted();
            }
            iteration += 1;
            log::debug!(
                "IDA*: iteration {iteration} with threshold {threshold} ({} expansions so far)",
                run.expansions()
            );

            match self.descend(&mut run, threshold) {
                Descent::Found(path) => return run.found(space, path),
                Descent::Stopped => return run.stopped(),
                Descent::Exceeded(next) if next.valid() => {
                    debug_assert!(next > threshold);
                    threshold = next;
                }
                Descent::Exceeded(_) => return run.exhausted(),
            }
        }
    }

    /// Depth-first descent pruning every State with `g + h > threshold`.
    fn descend(&self, run: &mut SearchRun<'_, '_, Sp, St>, threshold: C) -> Descent<St, C> {
        let space = self.problem.space();
        let goals = self.problem.goals();
        // Keyed by g.
        let mut open = DepthFirstStack::<C, St>::new();
        let mut min_overflow = C::max_value();

        let mut entering = Some((self.problem.start(), C::zero(), None));
        loop {
            if let Some((current, g, parent)) = entering.take() {
                open.push(g, current, parent);

                let flow = run.expand(space, current, || open.snapshot(), || open.path());
                if flow == Flow::Stop {
                    return Descent::Stopped;
                }
                if self.problem.is_goal(&current) {
                    return Descent::Found(open.path());
                }

                open.set_successors(space.neighbours(&current).into_iter().map(|(s, _a)| s));
            }

            let Some((top, g)) = open.top().map(|e| (e.state, e.key)) else {
                return Descent::Exceeded(min_overflow);
            };
            match open.next_successor() {
                Some(s) => {
                    let child_g = g + C::one();
                    let f = child_g.saturating_add(&H::h_nearest(&s, goals));
                    if f > threshold {
                        min_overflow = min(min_overflow, f);
                    } else {
                        entering = Some((s, child_g, Some(top)));
                    }
                }
                None => {
                    open.pop();
                }
            }
        }
    }
}

impl<H, P, Sp, St, A, C> Debug for IterativeDeepeningAStarSearch<'_, H, P, Sp, St, A, C>
where
    H: ObjectiveHeuristic<St, C>,
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "IDA*{{max_iterations: {:?}}}", self.max_iterations)
    }
}
