//! Animated terminal rendering of a running search.
//!
//! Redraws the whole grid on every expansion and sleeps between frames so the
//! search can be followed by eye.

use std::cell::RefCell;
use std::io::Write;
use std::time::Duration;

use owo_colors::OwoColorize;
use rustc_hash::FxHashSet;

use crate::observer::Expansion;
use crate::observer::Flow;
use crate::observer::SearchObserver;
use crate::problem::ObjectiveProblem;
use crate::problems::grid_2d::Grid2DCell;
use crate::problems::grid_2d::Grid2DProblem;
use crate::problems::grid_2d::Grid2DSpace;
use crate::problems::grid_2d::Grid2DState;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Draws each expansion of a search over a `Grid2DProblem` into `out`.
///
/// `@` is the State being expanded, `P` the path to it, `+` the frontier and
/// `.` States expanded earlier.
pub struct TerminalAnimation<'p, W: Write> {
    problem: &'p Grid2DProblem,
    name: &'static str,
    delay: Duration,
    out: RefCell<W>,
    expanded: RefCell<FxHashSet<Grid2DState>>,
}

impl<'p, W: Write> TerminalAnimation<'p, W> {
    pub fn new(problem: &'p Grid2DProblem, name: &'static str, out: W, delay: Duration) -> Self {
        Self {
            problem,
            name,
            delay,
            out: RefCell::new(out),
            expanded: RefCell::new(FxHashSet::default()),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn frame(&self, e: &Expansion<'_, Grid2DSpace, Grid2DState>) -> String {
        let space = self.problem.space();
        let frontier: FxHashSet<&Grid2DState> = e.frontier.iter().collect();
        let path: FxHashSet<&Grid2DState> = e.path.iter().collect();
        let expanded = self.expanded.borrow();

        let mut frame = format!(
            "{}: expansion {}, |frontier| {}, depth {}\n",
            self.name.bold(),
            e.expansions,
            e.frontier.len(),
            e.path.len().saturating_sub(1),
        );
        for y in 0..space.rows() {
            for x in 0..space.cols() {
                let Some(s) = Grid2DState::new_from_usize(x, y) else {
                    unreachable!("Grid dimensions were checked on construction");
                };
                if x > 0 {
                    frame.push(' ');
                }
                let glyph = if s == e.current {
                    "@".blue().bold().to_string()
                } else if s == self.problem.start() {
                    "S".blue().to_string()
                } else if self.problem.goal_set().contains(&s) {
                    "G".green().bold().to_string()
                } else if path.contains(&s) {
                    "P".cyan().to_string()
                } else if frontier.contains(&s) {
                    "+".yellow().to_string()
                } else if space.cell(&s) == Some(Grid2DCell::Blocked) {
                    "X".dimmed().to_string()
                } else if expanded.contains(&s) {
                    ".".dimmed().to_string()
                } else {
                    "-".to_string()
                };
                frame.push_str(&glyph);
            }
            frame.push('\n');
        }
        frame
    }
}

impl<W: Write> SearchObserver<Grid2DSpace, Grid2DState> for TerminalAnimation<'_, W> {
    fn on_expand(&self, e: &Expansion<'_, Grid2DSpace, Grid2DState>) -> Flow {
        let frame = self.frame(e);
        self.expanded.borrow_mut().insert(e.current);

        let mut out = self.out.borrow_mut();
        if let Err(err) = write!(out, "{CLEAR_SCREEN}{frame}").and_then(|()| out.flush()) {
            log::warn!("Stopping the animation: {err}");
            return Flow::Stop;
        }
        drop(out);

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Flow::Continue
    }
}

impl<W: Write> std::fmt::Debug for TerminalAnimation<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "TerminalAnimation{{{}, delay: {:?}, {} frames}}",
            self.name,
            self.delay,
            self.expanded.borrow().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::testing::*;
    use crate::context::SearchContext;
    use crate::problems::grid_2d::Grid2DAction;
    use crate::problems::grid_2d::Grid2DCost;
    use crate::problems::grid_2d::Grid2DHeuristicManhattan;
    use crate::strategy::SearchStrategy;

    #[test]
    fn draws_a_frame_per_expansion() {
        let problem = wall_with_gap();
        let animation = TerminalAnimation::new(&problem, "BFS", Vec::new(), Duration::ZERO);
        let ctx = SearchContext::new().with_observer(&animation);
        let r = SearchStrategy::BreadthFirst.run::<
            Grid2DHeuristicManhattan,
            Grid2DProblem,
            Grid2DSpace,
            Grid2DState,
            Grid2DAction,
            Grid2DCost,
        >(&problem, &ctx);
        assert!(r.found);

        let out = String::from_utf8(animation.into_inner()).unwrap();
        assert_eq!(out.matches(CLEAR_SCREEN).count(), r.expansions);
        assert!(out.contains(&format!("expansion {}", r.expansions)));
        assert!(out.contains('@'));
    }

    #[derive(Debug)]
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_stop_the_search() {
        let problem = open_5x5();
        let animation = TerminalAnimation::new(&problem, "DFS", Broken, Duration::ZERO);
        let ctx = SearchContext::new().with_observer(&animation);
        let r = SearchStrategy::DepthFirst.run::<
            Grid2DHeuristicManhattan,
            Grid2DProblem,
            Grid2DSpace,
            Grid2DState,
            Grid2DAction,
            Grid2DCost,
        >(&problem, &ctx);
        assert!(!r.found);
        assert_eq!(r.expansions, 1);
    }
}
