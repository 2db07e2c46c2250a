use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anstream::eprintln;
use anstream::println;
use clap::Parser;
use clap::ValueEnum;
use owo_colors::OwoColorize;
use thousands::Separable;

use grid_search::animation::TerminalAnimation;
use grid_search::context::SearchContext;
use grid_search::observer::LoggingObserver;
use grid_search::problems::grid_2d::Grid2DAction;
use grid_search::problems::grid_2d::Grid2DCost;
use grid_search::problems::grid_2d::Grid2DHeuristicManhattan;
use grid_search::problems::grid_2d::Grid2DProblem;
use grid_search::problems::grid_2d::Grid2DSpace;
use grid_search::problems::grid_2d::Grid2DState;
use grid_search::problems::grid_2d::NeighbourOrder;
use grid_search::search::SearchResult;
use grid_search::strategy::SearchStrategy;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Breadth-First Search
    Bfs,
    /// Depth-First Search
    Dfs,
    /// Depth-Limited Search, needs --limit
    Dls,
    /// Iterative Deepening A*, --limit bounds the iterations
    IdaStar,
    /// A*
    Astar,
    /// Greedy Best-First Search
    Greedy,
    /// Bidirectional Breadth-First Search
    Bidirectional,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Order {
    /// up, left, down, right
    #[default]
    UpLeftDownRight,
    /// down, right, up, left
    DownRightUpLeft,
}

impl From<Order> for NeighbourOrder {
    fn from(o: Order) -> Self {
        match o {
            Order::UpLeftDownRight => NeighbourOrder::UpLeftDownRight,
            Order::DownRightUpLeft => NeighbourOrder::DownRightUpLeft,
        }
    }
}

/// Finds a path from the start to one of the goals of a grid description.
#[derive(Parser, Debug)]
#[clap(long_version = grid_search::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Grid description: dimensions, start, goals and blocks, one per line.
    #[arg()]
    file: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Algorithm::Bfs)]
    algorithm: Algorithm,

    /// Depth limit for DLS, iteration bound for IDA*.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    limit: Option<u64>,

    /// Animate the search in the terminal.
    #[arg(long)]
    gui: bool,

    /// Pause between animation frames.
    #[arg(long, env = "GRID_SEARCH_DELAY_MS", default_value_t = 50u64)]
    delay_ms: u64,

    /// Give up after this many expansions.
    #[arg(long)]
    max_expansions: Option<usize>,

    #[arg(long, value_enum, default_value_t = Order::UpLeftDownRight)]
    neighbour_order: Order,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

impl Args {
    fn strategy(&self) -> Result<SearchStrategy, String> {
        let limit = self
            .limit
            .map(usize::try_from)
            .transpose()
            .map_err(|e| format!("--limit is too large: {e}"))?;
        Ok(match self.algorithm {
            Algorithm::Bfs => SearchStrategy::BreadthFirst,
            Algorithm::Dfs => SearchStrategy::DepthFirst,
            Algorithm::Dls => SearchStrategy::DepthLimited {
                limit: limit.ok_or("dls needs a depth --limit")?,
            },
            Algorithm::IdaStar => SearchStrategy::IterativeDeepeningAStar {
                max_iterations: limit,
            },
            Algorithm::Astar => SearchStrategy::AStar,
            Algorithm::Greedy => SearchStrategy::GreedyBestFirst,
            Algorithm::Bidirectional => SearchStrategy::Bidirectional,
        })
    }
}

fn search(
    strategy: SearchStrategy,
    problem: &Grid2DProblem,
    ctx: &SearchContext<'_, Grid2DSpace, Grid2DState>,
) -> SearchResult<Grid2DState, Grid2DAction> {
    strategy.run::<
        Grid2DHeuristicManhattan,
        Grid2DProblem,
        Grid2DSpace,
        Grid2DState,
        Grid2DAction,
        Grid2DCost,
    >(problem, ctx)
}

fn report(problem: &Grid2DProblem, r: &SearchResult<Grid2DState, Grid2DAction>) {
    println!("{}", problem.render(&r.path));
    match r.moves() {
        Some(moves) => {
            println!("{} in {} moves", "Path found".green().bold(), moves);
            let positions: Vec<String> = r.path.iter().map(|s| s.to_string()).collect();
            println!("Positions: {}", positions.join(" "));
            let directions: Vec<String> = r.directions.iter().map(Grid2DAction::to_string).collect();
            println!("Directions: {}", directions.join(", "));
        }
        None => println!("{} ({})", "No path found".yellow().bold(), r.status),
    }
    println!("Expansions: {}", r.expansions.separate_with_commas());
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    args.color.write_global();

    let strategy = match args.strategy() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    let problem = match Grid2DProblem::try_from(args.file.as_path()) {
        Ok(p) => p.with_neighbour_order(args.neighbour_order.into()),
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    log::info!("Running {strategy} on {problem:?}");

    let ctx = SearchContext::new();
    let ctx = match args.max_expansions {
        Some(budget) => ctx.with_expansion_budget(budget),
        None => ctx,
    };

    let r = if args.gui {
        let animation = TerminalAnimation::new(
            &problem,
            strategy.name(),
            anstream::stdout(),
            Duration::from_millis(args.delay_ms),
        );
        search(strategy, &problem, &ctx.with_observer(&animation))
    } else {
        let tracer = LoggingObserver {
            name: strategy.name(),
        };
        search(strategy, &problem, &ctx.with_observer(&tracer))
    };

    report(&problem, &r);
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(args: &[&str]) -> Result<SearchStrategy, String> {
        let args = Args::try_parse_from(std::iter::once("grid-search").chain(args.iter().copied()))
            .map_err(|e| e.to_string())?;
        args.strategy()
    }

    #[test]
    fn limits_reach_the_strategy() {
        assert_eq!(
            strategy(&["grid.txt", "-a", "dls", "-l", "12"]),
            Ok(SearchStrategy::DepthLimited { limit: 12 })
        );
        assert_eq!(
            strategy(&["grid.txt", "-a", "ida-star", "--limit", "3"]),
            Ok(SearchStrategy::IterativeDeepeningAStar {
                max_iterations: Some(3)
            })
        );
        assert_eq!(
            strategy(&["grid.txt", "-a", "ida-star"]),
            Ok(SearchStrategy::IterativeDeepeningAStar {
                max_iterations: None
            })
        );
        assert_eq!(strategy(&["grid.txt"]), Ok(SearchStrategy::BreadthFirst));
    }

    #[test]
    fn bad_limits_are_rejected() {
        assert!(strategy(&["grid.txt", "-a", "dls"]).is_err());
        assert!(strategy(&["grid.txt", "-a", "dls", "-l", "0"]).is_err());
        assert!(strategy(&["grid.txt", "-a", "dls", "-l", "-3"]).is_err());
    }
}
