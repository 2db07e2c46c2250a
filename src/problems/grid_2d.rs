use std::fmt::Write;
use std::hash::Hash;

use derive_more::Display;
use nonmax::NonMaxU32;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use thiserror::Error;

use crate::problem::ObjectiveHeuristic;
use crate::problem::ObjectiveProblem;
use crate::space::Action;
use crate::space::Cost;
use crate::space::Neighbours;
use crate::space::Space;
use crate::space::State;

const RANDOM_STATE_MAX_TRIES: usize = 10_000;

pub(crate) type CoordIntrinsic = u32;
pub type Coord = NonMaxU32;

/// A cell position. `x` is the column (growing rightwards) and `y` the row
/// (growing downwards).
#[derive(Copy, Clone, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({x},{y})")]
pub struct Grid2DState {
    pub(crate) x: Coord,
    pub(crate) y: Coord,
}

impl Grid2DState {
    pub fn new(x: CoordIntrinsic, y: CoordIntrinsic) -> Option<Grid2DState> {
        Some(Grid2DState {
            x: Coord::new(x)?,
            y: Coord::new(y)?,
        })
    }
    pub fn new_from_usize(x: usize, y: usize) -> Option<Grid2DState> {
        let x = CoordIntrinsic::try_from(x).ok()?;
        let y = CoordIntrinsic::try_from(y).ok()?;
        Self::new(x, y)
    }

    #[inline(always)]
    pub fn x(&self) -> CoordIntrinsic {
        self.x.get()
    }
    #[inline(always)]
    pub fn y(&self) -> CoordIntrinsic {
        self.y.get()
    }
}
impl State for Grid2DState {}

impl std::fmt::Debug for Grid2DState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({},{})", self.x(), self.y())
    }
}

/// A single 4-connected step.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grid2DAction {
    #[display("up")]
    Up, // y--
    #[display("left")]
    Left, // x--
    #[display("down")]
    Down, // y++
    #[display("right")]
    Right, // x++
}
impl Action for Grid2DAction {}

impl Grid2DAction {
    /// The `(dx, dy)` of this step.
    #[rustfmt::skip]
    pub fn delta(&self) -> (i64, i64) {
        match self {
            Grid2DAction::Up    => ( 0, -1),
            Grid2DAction::Left  => (-1,  0),
            Grid2DAction::Down  => ( 0,  1),
            Grid2DAction::Right => ( 1,  0),
        }
    }

    pub fn from_delta(dx: i64, dy: i64) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Grid2DAction::Up),
            (-1, 0) => Some(Grid2DAction::Left),
            (0, 1) => Some(Grid2DAction::Down),
            (1, 0) => Some(Grid2DAction::Right),
            _ => None,
        }
    }
}

/// Order in which `neighbours` tries the four directions.
///
/// The order is what breaks ties between siblings, so every strategy on the
/// same Space sees the same one.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq)]
pub enum NeighbourOrder {
    /// up, left, down, right.
    #[default]
    #[display("up-left-down-right")]
    UpLeftDownRight,
    /// down, right, up, left.
    #[display("down-right-up-left")]
    DownRightUpLeft,
}

impl NeighbourOrder {
    pub fn actions(&self) -> [Grid2DAction; 4] {
        use Grid2DAction::*;
        match self {
            NeighbourOrder::UpLeftDownRight => [Up, Left, Down, Right],
            NeighbourOrder::DownRightUpLeft => [Down, Right, Up, Left],
        }
    }
}

pub type Grid2DCost = CoordIntrinsic;
impl Cost for Grid2DCost {}

/// What a cell holds.
///
/// `Start` and `Goal` only matter for rendering. Searches reason about the
/// problem's start and goal set, and whether a cell is `Blocked`.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Grid2DCell {
    #[display("-")]
    Empty,
    #[display("X")]
    Blocked,
    #[display("R")]
    Start,
    #[display("G")]
    Goal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Grid2DCellParseError {
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
}

impl std::convert::TryFrom<char> for Grid2DCell {
    type Error = Grid2DCellParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            '-' | '.' | ' ' => Ok(Grid2DCell::Empty),
            'X' | '#' | '█' => Ok(Grid2DCell::Blocked),
            'R' | 'S' => Ok(Grid2DCell::Start),
            'G' => Ok(Grid2DCell::Goal),
            ch => Err(Grid2DCellParseError::InvalidCharacter(ch)),
        }
    }
}

/// The GridModel: a rectangular matrix of cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid2DSpace {
    pub(crate) map: Vec<Vec<Grid2DCell>>,
    order: NeighbourOrder,
}

impl Grid2DSpace {
    /// An obstacle-free grid. Panics if either dimension is zero.
    pub fn new_empty(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "Empty {rows}x{cols} grid");
        assert!(Self::safe_dimensions(rows, cols));
        Self {
            map: vec![vec![Grid2DCell::Empty; cols]; rows],
            order: NeighbourOrder::default(),
        }
    }

    #[must_use]
    pub fn with_neighbour_order(mut self, order: NeighbourOrder) -> Self {
        self.order = order;
        self
    }
    pub fn neighbour_order(&self) -> NeighbourOrder {
        self.order
    }

    pub(crate) fn safe_dimensions(rows: usize, cols: usize) -> bool {
        (rows < CoordIntrinsic::MAX as usize) && (cols < CoordIntrinsic::MAX as usize)
    }

    pub fn rows(&self) -> usize {
        self.map.len()
    }
    pub fn cols(&self) -> usize {
        self.map[0].len()
    }
    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    #[inline(always)]
    pub fn in_bounds(&self, s: &Grid2DState) -> bool {
        (s.y() as usize) < self.rows() && (s.x() as usize) < self.cols()
    }

    /// Out of bounds cells are not blocked, they don't exist.
    #[inline(always)]
    pub fn is_blocked(&self, s: &Grid2DState) -> bool {
        self.cell(s) == Some(Grid2DCell::Blocked)
    }

    #[inline(always)]
    pub fn cell(&self, s: &Grid2DState) -> Option<Grid2DCell> {
        self.map
            .get(s.y() as usize)
            .and_then(|row| row.get(s.x() as usize))
            .copied()
    }

    pub(crate) fn set(&mut self, s: &Grid2DState, cell: Grid2DCell) {
        debug_assert!(self.in_bounds(s));
        self.map[s.y() as usize][s.x() as usize] = cell;
    }

    /// Blocks the `width`x`height` rectangle whose top-left corner is `(x, y)`.
    ///
    /// Cells falling outside the grid are skipped. Returns how many were.
    pub fn place_block(&mut self, x: u32, y: u32, width: u32, height: u32) -> usize {
        let (x, y) = (x as u64, y as u64);
        let (rows, cols) = (self.rows() as u64, self.cols() as u64);
        let rows_in = y.min(rows)..(y + height as u64).min(rows);
        let cols_in = x.min(cols)..(x + width as u64).min(cols);

        for row in rows_in.clone() {
            for col in cols_in.clone() {
                self.map[row as usize][col as usize] = Grid2DCell::Blocked;
            }
        }

        let covered = width as u64 * height as u64;
        let inside = (rows_in.end - rows_in.start) * (cols_in.end - cols_in.start);
        let clipped = (covered - inside) as usize;
        if clipped > 0 {
            log::debug!("Clipped {clipped} cells of block ({x},{y}) {width}x{height}");
        }
        clipped
    }

    /// Drops the Start and Goal markers, leaving only Empty and Blocked cells.
    pub(crate) fn clear_markers(&mut self) {
        for cell in self.map.iter_mut().flatten() {
            if *cell != Grid2DCell::Blocked {
                *cell = Grid2DCell::Empty;
            }
        }
    }

    /// A grid where each cell is blocked with probability `density`.
    pub fn random<R: rand::Rng>(r: &mut R, rows: usize, cols: usize, density: f64) -> Self {
        let mut space = Self::new_empty(rows, cols);
        for cell in space.map.iter_mut().flatten() {
            if r.random_bool(density) {
                *cell = Grid2DCell::Blocked;
            }
        }
        space
    }

    pub fn random_state<R: rand::Rng>(&self, r: &mut R) -> Option<Grid2DState> {
        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            let x = r.random_range(0..self.cols());
            let y = r.random_range(0..self.rows());
            if self.map[y][x] != Grid2DCell::Blocked {
                return Grid2DState::new_from_usize(x, y);
            }
        }

        None
    }
}

impl Space<Grid2DState, Grid2DAction> for Grid2DSpace {
    #[inline(always)]
    fn apply(&self, s: &Grid2DState, a: &Grid2DAction) -> Option<Grid2DState> {
        let (dx, dy) = a.delta();
        let x = s.x() as i64 + dx;
        let y = s.y() as i64 + dy;
        if x < 0 || y < 0 {
            return None;
        }
        let next = Grid2DState::new_from_usize(x as usize, y as usize)?;
        self.in_bounds(&next).then_some(next)
    }

    #[inline(always)]
    fn valid(&self, s: &Grid2DState) -> bool {
        self.in_bounds(s)
    }

    #[inline(always)]
    fn blocked(&self, s: &Grid2DState) -> bool {
        self.is_blocked(s)
    }

    /// Gets the free neighbours of a given position, in the configured order.
    fn neighbours(&self, s: &Grid2DState) -> Neighbours<Grid2DState, Grid2DAction> {
        let mut v = SmallVec::new();
        for a in self.order.actions() {
            if let Some(n) = self.apply(s, &a) {
                if !self.is_blocked(&n) {
                    v.push((n, a));
                }
            }
        }
        v
    }

    fn action_between(&self, from: &Grid2DState, to: &Grid2DState) -> Option<Grid2DAction> {
        let dx = to.x() as i64 - from.x() as i64;
        let dy = to.y() as i64 - from.y() as i64;
        Grid2DAction::from_delta(dx, dy)
    }
}

impl std::fmt::Display for Grid2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for line in &self.map {
            let mut sep = "";
            for cell in line {
                write!(f, "{sep}{cell}")?;
                sep = " ";
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Grid2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Grid2D({}x{}, {})", self.rows(), self.cols(), self.order)
    }
}

/// Why a start or goal set can't be searched on a grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Grid2DProblemError {
    #[error("At least one goal is needed")]
    NoGoals,
    #[error("The {what} {s} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        what: &'static str,
        s: Grid2DState,
        rows: usize,
        cols: usize,
    },
    #[error("The {what} {s} is blocked")]
    Blocked { what: &'static str, s: Grid2DState },
}

/// Why a grid description couldn't be loaded.
#[derive(Debug, Error)]
pub enum Grid2DParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("The first line should contain at least two numbers, found '{line}'")]
    MissingDimensions { line: String },
    #[error("A {rows}x{cols} grid is not searchable")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("Line {number}: expected the start as 'x,y', found '{line}'")]
    InvalidStart { number: usize, line: String },
    #[error("Missing the goals line")]
    MissingGoals,
    #[error("Line {number}: expected goals as 'x,y|x,y|...', found '{goal}'")]
    InvalidGoal { number: usize, goal: String },
    #[error("Line {number}: expected a block as 'x y width height', found '{line}'")]
    InvalidBlock { number: usize, line: String },
    #[error("Invalid cell {e} found at ({x},{y})")]
    InvalidCell {
        e: Grid2DCellParseError,
        x: usize,
        y: usize,
    },
    #[error("Invalid problem: {0}")]
    Problem(#[from] Grid2DProblemError),
    #[error("I/O error when loading '{p}': {e}")]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
}

/// A GridModel with a start and a set of goals.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid2DProblem {
    space: Grid2DSpace,
    start: Grid2DState,
    goals: Vec<Grid2DState>,
    goal_set: FxHashSet<Grid2DState>,
}

impl Grid2DProblem {
    /// Validates and builds a problem. Start and goals must be within bounds
    /// and free, and there must be at least one goal.
    pub fn new(
        mut space: Grid2DSpace,
        start: Grid2DState,
        goals: Vec<Grid2DState>,
    ) -> Result<Self, Grid2DProblemError> {
        if goals.is_empty() {
            return Err(Grid2DProblemError::NoGoals);
        }
        for (what, s) in std::iter::once(("start", &start)).chain(goals.iter().map(|g| ("goal", g))) {
            if !space.in_bounds(s) {
                return Err(Grid2DProblemError::OutOfBounds {
                    what,
                    s: *s,
                    rows: space.rows(),
                    cols: space.cols(),
                });
            }
            if space.is_blocked(s) {
                return Err(Grid2DProblemError::Blocked { what, s: *s });
            }
        }

        let mut goal_set = FxHashSet::default();
        let goals: Vec<Grid2DState> = goals.into_iter().filter(|g| goal_set.insert(*g)).collect();

        space.clear_markers();
        space.set(&start, Grid2DCell::Start);
        for g in &goals {
            space.set(g, Grid2DCell::Goal);
        }

        Ok(Self {
            space,
            start,
            goals,
            goal_set,
        })
    }

    /// Parses an ASCII map, one character per cell.
    ///
    /// `-`, `.` or space are empty, `X`/`#` blocked, `R`/`S` the start and `G`
    /// goals (in reading order).
    pub fn from_map(s: &str) -> Result<Self, Grid2DParseError> {
        let lines: Vec<Vec<char>> = s
            .lines()
            .map(|l| l.trim_end().chars().filter(|c| *c != ' ').collect::<Vec<char>>())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(Grid2DParseError::EmptyInput);
        }

        let rows = lines.len();
        let cols = lines.iter().map(Vec::len).max().unwrap_or(0);
        if !Grid2DSpace::safe_dimensions(rows, cols) {
            return Err(Grid2DParseError::InvalidDimensions { rows, cols });
        }
        let mut space = Grid2DSpace::new_empty(rows, cols);
        let mut start = None;
        let mut goals = vec![];

        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.iter().enumerate() {
                let cell = Grid2DCell::try_from(*ch)
                    .map_err(|e| Grid2DParseError::InvalidCell { e, x, y })?;
                // Both fit as the dimensions were checked above.
                let s = Grid2DState::new_from_usize(x, y);
                match (cell, s) {
                    (Grid2DCell::Start, Some(s)) => start = Some(s),
                    (Grid2DCell::Goal, Some(s)) => goals.push(s),
                    (Grid2DCell::Blocked, Some(s)) => space.set(&s, Grid2DCell::Blocked),
                    _ => {}
                }
            }
        }

        let start = start.ok_or_else(|| Grid2DParseError::InvalidStart {
            number: 0,
            line: "no start cell in map".to_string(),
        })?;
        Ok(Self::new(space, start, goals)?)
    }

    /// Expands neighbours in `order` from now on.
    #[must_use]
    pub fn with_neighbour_order(mut self, order: NeighbourOrder) -> Self {
        self.space = self.space.with_neighbour_order(order);
        self
    }

    pub fn goal_set(&self) -> &FxHashSet<Grid2DState> {
        &self.goal_set
    }

    /// Re-renders the grid marking `path`.
    ///
    /// `S` is the start, `P` path cells, `G` goals (reached or not), `X`
    /// blocked cells and `-` everything else.
    pub fn render(&self, path: &[Grid2DState]) -> String {
        let on_path: FxHashSet<&Grid2DState> = path.iter().collect();
        let end = path.last().filter(|_| path.len() > 1);

        let mut out = String::with_capacity(self.space.rows() * (2 * self.space.cols() + 1));
        for (y, line) in self.space.map.iter().enumerate() {
            for (x, cell) in line.iter().enumerate() {
                let Some(s) = Grid2DState::new_from_usize(x, y) else {
                    unreachable!("Grid dimensions were checked on construction");
                };
                let glyph = if s == self.start {
                    'S'
                } else if Some(&s) == end || self.goal_set.contains(&s) {
                    'G'
                } else if on_path.contains(&s) {
                    'P'
                } else if *cell == Grid2DCell::Blocked {
                    'X'
                } else {
                    '-'
                };
                if x > 0 {
                    out.push(' ');
                }
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    /// A new problem on the same grid with a random start and `num_goals`
    /// random goals.
    pub fn randomize<R: rand::Rng>(&self, r: &mut R, num_goals: u16) -> Option<Grid2DProblem> {
        let mut space = self.space.clone();
        space.clear_markers();

        let start = space.random_state(r)?;
        let mut goals = vec![];
        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            if goals.len() >= num_goals as usize {
                break;
            }
            goals.push(space.random_state(r)?);
        }

        Grid2DProblem::new(space, start, goals).ok()
    }
}

impl ObjectiveProblem<Grid2DSpace, Grid2DState, Grid2DAction> for Grid2DProblem {
    fn space(&self) -> &Grid2DSpace {
        &self.space
    }
    fn start(&self) -> Grid2DState {
        self.start
    }
    fn goals(&self) -> &[Grid2DState] {
        &self.goals
    }
    fn is_goal(&self, s: &Grid2DState) -> bool {
        self.goal_set.contains(s)
    }
}

/// Every whole number in `line`, ignoring whatever surrounds them.
fn integers(line: &str) -> Option<Vec<u32>> {
    line.split(|c: char| !c.is_ascii_digit())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<u32>().ok())
        .collect()
}

/// Parses the line-oriented grid description.
///
/// ```text
/// // Comments start with '//' and blank lines are ignored.
/// [5,11]        // rows, cols. Only the first two numbers count
/// (0,1)         // start x,y
/// (7,0) | (10,3)  // goals
/// (2,0,2,2)     // blocks: x, y, width, height
/// ```
impl std::convert::TryFrom<&str> for Grid2DProblem {
    type Error = Grid2DParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.split("//").next().unwrap_or("").trim()))
            .filter(|(_, l)| !l.is_empty());

        let (_, dimensions) = lines.next().ok_or(Grid2DParseError::EmptyInput)?;
        let (rows, cols) = match integers(dimensions).as_deref() {
            Some([rows, cols, ..]) => (*rows as usize, *cols as usize),
            _ => {
                return Err(Grid2DParseError::MissingDimensions {
                    line: dimensions.to_string(),
                });
            }
        };
        if rows == 0 || cols == 0 || !Grid2DSpace::safe_dimensions(rows, cols) {
            return Err(Grid2DParseError::InvalidDimensions { rows, cols });
        }
        let mut space = Grid2DSpace::new_empty(rows, cols);

        let invalid_start = |number: usize, line: &str| Grid2DParseError::InvalidStart {
            number,
            line: line.to_string(),
        };
        let (number, start_line) = lines.next().ok_or_else(|| invalid_start(0, ""))?;
        let start = match integers(start_line).as_deref() {
            Some([x, y, ..]) => Grid2DState::new(*x, *y),
            _ => None,
        }
        .ok_or_else(|| invalid_start(number, start_line))?;

        let (number, goals_line) = lines.next().ok_or(Grid2DParseError::MissingGoals)?;
        let mut goals = vec![];
        for goal in goals_line.split('|').map(str::trim).filter(|g| !g.is_empty()) {
            let g = match integers(goal).as_deref() {
                Some([x, y, ..]) => Grid2DState::new(*x, *y),
                _ => None,
            }
            .ok_or_else(|| Grid2DParseError::InvalidGoal {
                number,
                goal: goal.to_string(),
            })?;
            goals.push(g);
        }

        for (number, line) in lines {
            match integers(line).as_deref() {
                Some([x, y, w, h, ..]) => {
                    space.place_block(*x, *y, *w, *h);
                }
                _ => {
                    return Err(Grid2DParseError::InvalidBlock {
                        number,
                        line: line.to_string(),
                    });
                }
            }
        }

        Ok(Grid2DProblem::new(space, start, goals)?)
    }
}

impl std::convert::TryFrom<&std::path::Path> for Grid2DProblem {
    type Error = Grid2DParseError;

    fn try_from(p: &std::path::Path) -> Result<Self, Self::Error> {
        let s = std::fs::read_to_string(p).map_err(|e| Grid2DParseError::IOError {
            p: p.to_path_buf(),
            e,
        })?;
        Grid2DProblem::try_from(s.as_str())
    }
}

impl std::fmt::Display for Grid2DProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "Grid2DProblem({}x{}) (s:{:?}, g:{:?}):",
            self.space.rows(),
            self.space.cols(),
            self.start,
            self.goals
        )?;
        write!(f, "{}", self.space)
    }
}

impl std::fmt::Debug for Grid2DProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut goals = String::new();
        for g in &self.goals {
            write!(goals, "{g}")?;
        }
        write!(f, "Grid2DProblem{{{:?}, s: {}, g: {}}}", self.space, self.start, goals)
    }
}

/// Manhattan distance, admissible on 4-connected unit-cost grids.
#[derive(Debug)]
pub struct Grid2DHeuristicManhattan;

impl ObjectiveHeuristic<Grid2DState, Grid2DCost> for Grid2DHeuristicManhattan {
    #[inline(always)]
    fn h(a: &Grid2DState, b: &Grid2DState) -> Grid2DCost {
        a.x().abs_diff(b.x()) + a.y().abs_diff(b.y())
    }
}
