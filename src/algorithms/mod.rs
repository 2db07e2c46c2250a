//! Implementation of search algorithms.
//!
//! These algorithms can do path-finding on generic search problems over unit
//! cost Spaces. They all take the problem by reference, run to completion in
//! `search` and report through a `SearchResult`.

pub mod astar;
pub mod bfs;
pub mod bidirectional;
pub mod dfs;
pub mod dls;
pub mod greedy;
pub mod ida_star;

#[cfg(test)]
pub(crate) mod testing {
    use indoc::indoc;

    use crate::problem::ObjectiveProblem;
    use crate::problems::grid_2d::Grid2DAction;
    use crate::problems::grid_2d::Grid2DProblem;
    use crate::problems::grid_2d::Grid2DSpace;
    use crate::problems::grid_2d::Grid2DState;
    use crate::search::SearchResult;
    use crate::space::Space;

    pub(crate) fn s(x: u32, y: u32) -> Grid2DState {
        Grid2DState::new(x, y).unwrap()
    }

    /// 5x5 and no obstacles, from the top-left to the bottom-right corner.
    pub(crate) fn open_5x5() -> Grid2DProblem {
        Grid2DProblem::new(Grid2DSpace::new_empty(5, 5), s(0, 0), vec![s(4, 4)]).unwrap()
    }

    /// A wall across row 2 with a single gap at its right end.
    pub(crate) fn wall_with_gap() -> Grid2DProblem {
        Grid2DProblem::from_map(indoc! {"
            R - - - -
            - - - - -
            X X X X -
            - - - - -
            G - - - -
        "})
        .unwrap()
    }

    /// A full wall, the goal can't be reached.
    pub(crate) fn walled_off() -> Grid2DProblem {
        Grid2DProblem::from_map(indoc! {"
            R - -
            X X X
            - G -
        "})
        .unwrap()
    }

    pub(crate) fn start_on_goal() -> Grid2DProblem {
        Grid2DProblem::new(Grid2DSpace::new_empty(3, 3), s(1, 1), vec![s(1, 1), s(2, 2)]).unwrap()
    }

    /// Checks the shape every found path must have.
    pub(crate) fn assert_valid(
        problem: &Grid2DProblem,
        result: &SearchResult<Grid2DState, Grid2DAction>,
    ) {
        assert!(result.found, "{result}");
        assert_eq!(result.path.first(), Some(&problem.start()));
        assert_eq!(result.path.last(), result.goal.as_ref());
        assert!(problem.is_goal(&result.goal.unwrap()));
        assert!(problem.space().valid_path(&result.path), "{:?}", result.path);
        assert_eq!(result.directions.len(), result.path.len() - 1);
    }
}
