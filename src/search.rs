use std::fmt::Debug;

use derive_more::Display;
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::space::Action;
use crate::space::Space;
use crate::space::State;

/// Records, for each discovered State, the State that discovered it.
///
/// Naturally forms a Search Forest rooted at the States the search started
/// from. Each State gets a predecessor at most once and it's never
/// overwritten, so walking back from any State always terminates at a root.
#[derive(Clone)]
pub struct PredecessorMap<St: State> {
    roots: FxHashSet<St>,
    parents: FxHashMap<St, St>,
}

impl<St: State> PredecessorMap<St> {
    #[must_use]
    pub fn new(root: St) -> Self {
        Self::with_roots([root])
    }

    /// A forest with one tree per root, like a search started from several
    /// States at once.
    #[must_use]
    pub fn with_roots<I: IntoIterator<Item = St>>(roots: I) -> Self {
        Self {
            roots: roots.into_iter().collect(),
            parents: FxHashMap::default(),
        }
    }

    pub fn is_root(&self, s: &St) -> bool {
        self.roots.contains(s)
    }

    /// Records that `parent` discovered `child`.
    ///
    /// Returns false, leaving the map untouched, when `child` is a root or
    /// already has a predecessor.
    pub fn insert(&mut self, child: St, parent: St) -> bool {
        if self.is_root(&child) || self.parents.contains_key(&child) {
            return false;
        }
        debug_assert!(child != parent);
        self.parents.insert(child, parent);
        true
    }

    pub fn get(&self, s: &St) -> Option<&St> {
        self.parents.get(s)
    }

    /// Whether `s` was reached, either as a root or through `insert`.
    pub fn contains(&self, s: &St) -> bool {
        self.is_root(s) || self.parents.contains_key(s)
    }

    pub fn len(&self) -> usize {
        self.parents.len() + self.roots.len()
    }

    /// Walks predecessors from `end` back to its root and returns the States
    /// from that root to `end`.
    ///
    /// Returns an empty path if `end` was never reached.
    #[must_use]
    pub fn path_to(&self, end: St) -> Vec<St> {
        if !self.contains(&end) {
            return vec![];
        }

        let mut path = vec![end];
        let mut s = end;
        while let Some(p) = self.parents.get(&s) {
            debug_assert!(path.len() <= self.len(), "Predecessors have a cycle");
            path.push(*p);
            s = *p;
        }
        debug_assert!(self.is_root(&s));

        path.reverse();
        path
    }
}

impl<St: State> Debug for PredecessorMap<St> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "PredecessorMap{{{} roots, ({} nodes)}}",
            self.roots.len(),
            self.len()
        )
    }
}

/// Maps each step of a path to the Action taking it.
///
/// Panics if two consecutive States aren't a single Action apart, which means
/// the path didn't come from a search over `space`.
#[must_use]
pub fn encode_directions<Sp, St, A>(space: &Sp, path: &[St]) -> Vec<A>
where
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    path.windows(2)
        .map(|w| match space.action_between(&w[0], &w[1]) {
            Some(a) => a,
            None => panic!("{:?} -> {:?} is not a single step", w[0], w[1]),
        })
        .collect()
}

/// Where a search run is at.
///
/// `Ready` becomes `Expanding` on the first pop; `Found`, `Exhausted` and
/// `Stopped` are terminal.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum SearchStatus {
    #[display("ready")]
    Ready,
    #[display("expanding")]
    Expanding,
    #[display("found")]
    Found,
    #[display("exhausted")]
    Exhausted,
    /// An observer or the expansion budget asked to stop.
    #[display("stopped")]
    Stopped,
}

impl SearchStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SearchStatus::Found | SearchStatus::Exhausted | SearchStatus::Stopped
        )
    }
}

/// The outcome of a single search run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult<St, A>
where
    St: State,
    A: Action,
{
    pub found: bool,
    pub status: SearchStatus,
    /// From the start to `goal`, both included. Empty unless found.
    pub path: Vec<St>,
    pub goal: Option<St>,
    /// Number of States expanded.
    pub expansions: usize,
    /// One Action per step of `path`.
    pub directions: Vec<A>,
}

impl<St, A> SearchResult<St, A>
where
    St: State,
    A: Action,
{
    /// A successful run ending at the last State of `path`.
    #[must_use]
    pub fn found<Sp: Space<St, A>>(space: &Sp, path: Vec<St>, expansions: usize) -> Self {
        debug_assert!(!path.is_empty());
        let directions = encode_directions(space, &path);
        Self {
            found: true,
            status: SearchStatus::Found,
            goal: path.last().copied(),
            path,
            expansions,
            directions,
        }
    }

    /// A run that ended without reaching a goal.
    #[must_use]
    pub fn not_found(status: SearchStatus, expansions: usize) -> Self {
        debug_assert!(status.is_terminal() && status != SearchStatus::Found);
        Self {
            found: false,
            status,
            path: vec![],
            goal: None,
            expansions,
            directions: vec![],
        }
    }

    pub fn is_found(&self) -> bool {
        self.found
    }

    /// Number of steps taken, if a path was found.
    pub fn moves(&self) -> Option<usize> {
        self.found.then(|| self.path.len() - 1)
    }
}

impl<St, A> std::fmt::Display for SearchResult<St, A>
where
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.path.first(), self.goal) {
            (Some(start), Some(goal)) => write!(
                f,
                "SearchResult({}, {:?}:{:?}:{:?}, {} expansions)",
                self.status,
                start,
                self.directions.iter().take(20).collect::<Vec<_>>(),
                goal,
                self.expansions,
            ),
            _ => write!(
                f,
                "SearchResult({}, {} expansions)",
                self.status, self.expansions
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::grid_2d::Grid2DAction;
    use crate::problems::grid_2d::Grid2DSpace;
    use crate::problems::grid_2d::Grid2DState;

    fn s(x: u32, y: u32) -> Grid2DState {
        Grid2DState::new(x, y).unwrap()
    }

    #[test]
    fn reconstructs_from_root() {
        let mut m = PredecessorMap::new(s(0, 0));
        assert!(m.insert(s(1, 0), s(0, 0)));
        assert!(m.insert(s(1, 1), s(1, 0)));
        assert!(m.insert(s(0, 1), s(0, 0)));

        assert_eq!(m.path_to(s(1, 1)), vec![s(0, 0), s(1, 0), s(1, 1)]);
        assert_eq!(m.path_to(s(0, 0)), vec![s(0, 0)]);
        assert_eq!(m.path_to(s(5, 5)), vec![]);
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn never_overwrites() {
        let mut m = PredecessorMap::new(s(0, 0));
        assert!(m.insert(s(1, 1), s(1, 0)));
        assert!(!m.insert(s(1, 1), s(0, 1)));
        assert!(!m.insert(s(0, 0), s(0, 1)));
        assert_eq!(m.get(&s(1, 1)), Some(&s(1, 0)));
        assert_eq!(m.get(&s(0, 0)), None);
    }

    #[test]
    fn walks_back_to_the_nearest_root() {
        let mut m = PredecessorMap::with_roots([s(0, 0), s(3, 0)]);
        assert!(m.insert(s(2, 0), s(3, 0)));
        assert!(m.insert(s(1, 0), s(0, 0)));
        assert!(!m.insert(s(3, 0), s(2, 0)));

        assert!(m.is_root(&s(3, 0)));
        assert_eq!(m.path_to(s(2, 0)), vec![s(3, 0), s(2, 0)]);
        assert_eq!(m.path_to(s(1, 0)), vec![s(0, 0), s(1, 0)]);
        assert_eq!(m.path_to(s(3, 0)), vec![s(3, 0)]);
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn encodes_unit_steps() {
        let space = Grid2DSpace::new_empty(3, 3);
        let path = [s(1, 1), s(1, 0), s(0, 0), s(0, 1), s(1, 1)];
        assert_eq!(
            encode_directions(&space, &path),
            vec![
                Grid2DAction::Up,
                Grid2DAction::Left,
                Grid2DAction::Down,
                Grid2DAction::Right
            ]
        );
        assert!(encode_directions(&space, &path[..1]).is_empty());
    }

    #[test]
    #[should_panic(expected = "is not a single step")]
    fn encoding_rejects_jumps() {
        let space = Grid2DSpace::new_empty(3, 3);
        let _ = encode_directions(&space, &[s(0, 0), s(1, 1)]);
    }

    #[test]
    fn result_shapes() {
        let space = Grid2DSpace::new_empty(2, 2);
        let r = SearchResult::found(&space, vec![s(0, 0), s(0, 1)], 2);
        assert!(r.is_found());
        assert_eq!(r.moves(), Some(1));
        assert_eq!(r.goal, Some(s(0, 1)));
        assert_eq!(r.directions, vec![Grid2DAction::Down]);

        let r = SearchResult::<Grid2DState, Grid2DAction>::not_found(SearchStatus::Exhausted, 7);
        assert!(!r.found);
        assert_eq!(r.moves(), None);
        assert_eq!(r.to_string(), "SearchResult(exhausted, 7 expansions)");
    }
}
