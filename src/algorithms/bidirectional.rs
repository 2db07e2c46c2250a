use std::fmt::Debug;
use std::marker::PhantomData;

use crate::context::SearchContext;
use crate::context::SearchRun;
use crate::frontier::DualFrontier;
use crate::frontier::Frontier;
use crate::frontier::Side;
use crate::observer::Flow;
use crate::problem::ObjectiveProblem;
use crate::search::PredecessorMap;
use crate::search::SearchResult;
use crate::space::Action;
use crate::space::Space;
use crate::space::State;

/// Bidirectional Breadth-First Search between the start and the goals.
///
/// The goal side starts from every goal at once. Both sides take turns
/// expanding one full BFS layer. A State discovered by one side that the
/// other side had already discovered is a meeting point, and the cheapest one
/// found during a layer joins the two halves of the path. Expanding whole
/// layers is what keeps the path as short as the one from a single BFS.
pub struct BidirectionalSearch<'p, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    problem: &'p P,
    _phantom_space: PhantomData<Sp>,
    _phantom_state: PhantomData<St>,
    _phantom_action: PhantomData<A>,
}

/// What each side has discovered so far.
struct Reached<St: State> {
    start: PredecessorMap<St>,
    goal: PredecessorMap<St>,
}

impl<St: State> Reached<St> {
    /// The side expanding and the side it may meet.
    fn split(&mut self, side: Side) -> (&mut PredecessorMap<St>, &PredecessorMap<St>) {
        match side {
            Side::Start => (&mut self.start, &self.goal),
            Side::Goal => (&mut self.goal, &self.start),
        }
    }

    /// Moves between `meeting` and the roots it was reached from.
    fn cost_through(&self, meeting: St) -> usize {
        self.start.path_to(meeting).len() + self.goal.path_to(meeting).len() - 2
    }

    /// Start-side path up to `meeting`, followed by the goal-side walk from
    /// there to whichever goal discovered it. `meeting` shows up once.
    fn join(&self, meeting: St) -> Vec<St> {
        let mut path = self.start.path_to(meeting);
        let mut s = meeting;
        while let Some(next) = self.goal.get(&s) {
            path.push(*next);
            s = *next;
        }
        debug_assert!(self.goal.is_root(&s));
        path
    }
}

impl<'p, P, Sp, St, A> BidirectionalSearch<'p, P, Sp, St, A>
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
            _phantom_space: PhantomData,
            _phantom_state: PhantomData,
            _phantom_action: PhantomData,
        }
    }

    pub fn search(self, ctx: &SearchContext<'_, Sp, St>) -> SearchResult<St, A> {
        let space = self.problem.space();
        let mut run = SearchRun::new("Bidirectional", ctx);

        let start = self.problem.start();
        if self.problem.is_goal(&start) {
            return run.found(space, vec![start]);
        }
        let goals = self.problem.goals();
        if goals.is_empty() {
            return run.exhausted();
        }

        let mut open = DualFrontier::new(start, goals);
        let mut reached = Reached {
            start: PredecessorMap::new(start),
            goal: PredecessorMap::with_roots(goals.iter().copied()),
        };

        while !open.exhausted() {
            let side = open.take_turn();
            let mut meetings = vec![];

            for _ in 0..open.side(side).len() {
                let Some(entry) = open.side_mut(side).pop() else {
                    break;
                };
                let current = entry.state;

                let (own, other) = reached.split(side);
                let flow = run.expand(
                    space,
                    current,
                    || open.snapshot(),
                    || own.path_to(current),
                );
                if flow == Flow::Stop {
                    return run.stopped();
                }

                for (s, _a) in space.neighbours(&current) {
                    if own.insert(s, current) {
                        open.side_mut(side).push((), s, Some(current));
                        if other.contains(&s) {
                            meetings.push(s);
                        }
                    }
                }
            }

            if let Some(meeting) = meetings.into_iter().min_by_key(|m| reached.cost_through(*m)) {
                log::debug!("Bidirectional: {side} side met the other one at {meeting:?}");
                let path = reached.join(meeting);
                debug_assert!(space.valid_path(&path));
                return run.found(space, path);
            }
        }

        run.exhausted()
    }
}

impl<P, Sp, St, A> Debug for BidirectionalSearch<'_, P, Sp, St, A>
where
    P: ObjectiveProblem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bidirectional{{start: {:?}, {} goals}}",
            self.problem.start(),
            self.problem.goals().len()
        )
    }
}
