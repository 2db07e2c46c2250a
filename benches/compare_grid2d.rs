use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use grid_search::context::SearchContext;
use grid_search::problems::grid_2d::Grid2DAction;
use grid_search::problems::grid_2d::Grid2DCost;
use grid_search::problems::grid_2d::Grid2DHeuristicManhattan;
use grid_search::problems::grid_2d::Grid2DProblem;
use grid_search::problems::grid_2d::Grid2DSpace;
use grid_search::problems::grid_2d::Grid2DState;
use grid_search::strategy::SearchStrategy;

/// Depth-first strategies may go through exponentially many paths.
const EXPANSION_BUDGET: usize = 100_000;

fn run(strategy: SearchStrategy, problem: &Grid2DProblem) -> usize {
    let ctx = SearchContext::new().with_expansion_budget(EXPANSION_BUDGET);
    let r = strategy.run::<
        Grid2DHeuristicManhattan,
        Grid2DProblem,
        Grid2DSpace,
        Grid2DState,
        Grid2DAction,
        Grid2DCost,
    >(problem, &ctx);
    r.expansions
}

fn compare_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Grid2D Search");

    for (rows, cols) in [(32, 32), (128, 128)] {
        for i in 0..3 {
            let instance_name = format!("random[{rows}x{cols}]:{i}");
            let mut rng = ChaCha8Rng::seed_from_u64(i);
            let space = Grid2DSpace::random(&mut rng, rows, cols, 0.2);
            let Some(start) = space.random_state(&mut rng) else {
                continue;
            };
            let Some(goal) = space.random_state(&mut rng) else {
                continue;
            };
            let Ok(problem) = Grid2DProblem::new(space, start, vec![goal]) else {
                continue;
            };
            // Same walls, but a few goals to race towards.
            let multi_goal = problem.randomize(&mut rng, 3);

            for strategy in SearchStrategy::all(rows + cols) {
                group.bench_with_input(
                    BenchmarkId::new(strategy.name(), &instance_name),
                    &problem,
                    |b, p| b.iter(|| run(strategy, p)),
                );
                if let Some(multi_goal) = &multi_goal {
                    group.bench_with_input(
                        BenchmarkId::new(strategy.name(), format!("{instance_name}+goals")),
                        multi_goal,
                        |b, p| b.iter(|| run(strategy, p)),
                    );
                }
            }
        }
    }
    group.finish();
}

criterion_group!(benches, compare_search);
criterion_main!(benches);
