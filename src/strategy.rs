//! The closed set of search strategies behind a single entry point.

use derive_more::Display;

use crate::algorithms::astar::AStarSearch;
use crate::algorithms::bfs::BreadthFirstSearch;
use crate::algorithms::bidirectional::BidirectionalSearch;
use crate::algorithms::dfs::DepthFirstSearch;
use crate::algorithms::dls::DepthLimitedSearch;
use crate::algorithms::greedy::GreedyBestFirstSearch;
use crate::algorithms::ida_star::IterativeDeepeningAStarSearch;
use crate::context::SearchContext;
use crate::problem::ObjectiveHeuristic;
use crate::problem::ObjectiveProblem;
use crate::search::SearchResult;
use crate::space::Action;
use crate::space::Cost;
use crate::space::Space;
use crate::space::State;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    #[display("BFS")]
    BreadthFirst,
    #[display("DFS")]
    DepthFirst,
    /// Depth-First Search bounded to `limit` moves.
    #[display("DLS({limit})")]
    DepthLimited { limit: usize },
    /// IDA*, optionally giving up after `max_iterations` threshold raises.
    #[display("IDA*")]
    IterativeDeepeningAStar { max_iterations: Option<usize> },
    #[display("A*")]
    AStar,
    #[display("GBFS")]
    GreedyBestFirst,
    #[display("Bidirectional")]
    Bidirectional,
}

impl SearchStrategy {
    /// Every strategy, with `limit` for the depth-limited one.
    pub fn all(limit: usize) -> [SearchStrategy; 7] {
        [
            SearchStrategy::BreadthFirst,
            SearchStrategy::DepthFirst,
            SearchStrategy::DepthLimited { limit },
            SearchStrategy::IterativeDeepeningAStar {
                max_iterations: None,
            },
            SearchStrategy::AStar,
            SearchStrategy::GreedyBestFirst,
            SearchStrategy::Bidirectional,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::BreadthFirst => "BFS",
            SearchStrategy::DepthFirst => "DFS",
            SearchStrategy::DepthLimited { .. } => "DLS",
            SearchStrategy::IterativeDeepeningAStar { .. } => "IDA*",
            SearchStrategy::AStar => "A*",
            SearchStrategy::GreedyBestFirst => "GBFS",
            SearchStrategy::Bidirectional => "Bidirectional",
        }
    }

    /// Whether a found path is guaranteed to have the fewest moves.
    pub fn is_optimal(&self) -> bool {
        matches!(
            self,
            SearchStrategy::BreadthFirst
                | SearchStrategy::IterativeDeepeningAStar { .. }
                | SearchStrategy::AStar
                | SearchStrategy::Bidirectional
        )
    }

    /// Runs this strategy over `problem`.
    ///
    /// `H` is only used by the informed strategies.
    pub fn run<H, P, Sp, St, A, C>(
        &self,
        problem: &P,
        ctx: &SearchContext<'_, Sp, St>,
    ) -> SearchResult<St, A>
    where
        H: ObjectiveHeuristic<St, C>,
        P: ObjectiveProblem<Sp, St, A>,
        Sp: Space<St, A>,
        St: State,
        A: Action,
        C: Cost,
    {
        match *self {
            SearchStrategy::BreadthFirst => BreadthFirstSearch::new(problem).search(ctx),
            SearchStrategy::DepthFirst => DepthFirstSearch::new(problem).search(ctx),
            SearchStrategy::DepthLimited { limit } => {
                DepthLimitedSearch::new(problem, limit).search(ctx)
            }
            SearchStrategy::IterativeDeepeningAStar { max_iterations } => {
                let search = IterativeDeepeningAStarSearch::<H, P, Sp, St, A, C>::new(problem);
                match max_iterations {
                    Some(max) => search.with_max_iterations(max).search(ctx),
                    None => search.search(ctx),
                }
            }
            SearchStrategy::AStar => AStarSearch::<H, P, Sp, St, A, C>::new(problem).search(ctx),
            SearchStrategy::GreedyBestFirst => {
                GreedyBestFirstSearch::<H, P, Sp, St, A, C>::new(problem).search(ctx)
            }
            SearchStrategy::Bidirectional => BidirectionalSearch::new(problem).search(ctx),
        }
    }
}
