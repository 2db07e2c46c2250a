use std::cmp::min;
use std::fmt::Debug;

use crate::derank::derank;

const HEAP_ARITY: usize = 4usize;
#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    crate::heap_primitives::index_parent::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_left(i: usize) -> usize {
    crate::heap_primitives::index_first_children::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_right(i: usize) -> usize {
    crate::heap_primitives::index_last_children::<HEAP_ARITY>(i)
}

/// An array-backed A-ary min-heap.
///
/// Nodes are compared with their own `Ord`, so callers that need a
/// deterministic order between equally ranked nodes must fold the tie-break
/// into it (see `FrontierEntry`).
#[derive(Clone)]
pub struct Heap<N>
where
    N: Ord + Debug,
{
    heap: Vec<N>,
}

impl<N> Heap<N>
where
    N: Ord + Debug,
{
    pub fn new() -> Self {
        Self { heap: vec![] }
    }
    pub fn with_capacity(s: usize) -> Self {
        Self {
            heap: Vec::with_capacity(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn peek(&self) -> Option<&N> {
        self.heap.first()
    }

    /// Iterates over the nodes in heap (not rank) order.
    pub fn iter(&self) -> std::slice::Iter<'_, N> {
        self.heap.iter()
    }

    /// Pushes a node and returns the index it settled at.
    pub fn push(&mut self, n: N) -> usize {
        self.verify_heap();
        let heap_index = self.heap.len(); // Future heap_index

        self.heap.push(n);
        let heap_index = self.sift_up(heap_index);

        self.verify_heap();
        heap_index
    }

    pub fn pop(&mut self) -> Option<N> {
        self.verify_heap();
        if self.heap.len() <= 1 {
            return self.heap.pop();
        }

        let top = self.pop_non_trivial_heap();
        self.verify_heap();
        Some(top)
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        // Every node goes after its parent node, if any.
        for i in 1..self.heap.len() {
            let p = up(i);
            assert!(
                self.heap[p] <= self.heap[i],
                "Node[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }

    /// Pops the top node from a Heap with at least 2 elements.
    ///
    /// Works by unfairly sifting down the top-node to the last level, where it
    /// can be swapped with the very last element of the array and popped.
    fn pop_non_trivial_heap(&mut self) -> N {
        debug_assert!(
            self.heap.len() > 1,
            "It doesn't get easier. Why are you calling this?"
        );

        let len = self.heap.len();
        let last = len - 1;

        // 1. Pretend there's a hole at the root and bubble the best child up
        //    until the hole reaches a leaf.
        let mut hole = 0;
        loop {
            let child = down_left(hole);
            if child >= len {
                break;
            }
            debug_assert_eq!(child + HEAP_ARITY, down_right(hole) + 1);
            let child = child + derank(&self.heap[child..min(child + HEAP_ARITY, len)]);

            self.heap.swap(hole, child);
            hole = child;
        }

        // 2. The hole is a leaf, but it may not be at the end of the array.
        if hole != last {
            self.heap.swap(hole, last);
            self.sift_up(hole);
        }

        // 3. The old top is now the last element.
        match self.heap.pop() {
            Some(top) => top,
            None => unreachable!("Heap had at least two nodes"),
        }
    }

    /// Raises a node
    /// Returns it's new index
    #[inline(always)]
    fn sift_up(&mut self, mut pos: usize) -> usize {
        debug_assert!(pos < self.heap.len(), "Index out of bounds...");

        while pos > 0 {
            let parent = up(pos);
            if self.heap[parent] <= self.heap[pos] {
                break;
            }
            self.heap.swap(parent, pos);
            pos = parent;
        }
        pos
    }
}

impl<N> Default for Heap<N>
where
    N: Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Debug for Heap<N>
where
    N: Ord + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Heap{{({} nodes)}}", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_works() {
        let mut heap = Heap::<String>::new();

        heap.push("aoeu".to_string());
        assert_eq!(heap.pop(), Some("aoeu".to_string()));
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn heap_sorts() {
        let mut heap = Heap::<&str>::new();

        assert_eq!(heap.push("c"), 0usize);
        assert_eq!(heap.push("e"), 1usize);
        assert_eq!(heap.push("f"), 2usize);
        assert_eq!(heap.push("a"), 0usize);
        assert_eq!(heap.push("d"), 4usize);
        assert_eq!(heap.push("b"), 1usize);

        let popped: Vec<&str> = std::iter::from_fn(|| heap.pop()).collect();
        assert_eq!(popped, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn heap_sorts_many() {
        let mut heap = Heap::<u32>::with_capacity(128);
        // A permutation of 0..97
        for i in 0..97u32 {
            heap.push((i * 37) % 97);
        }
        assert_eq!(heap.len(), 97);
        for expected in 0..97u32 {
            assert_eq!(heap.pop(), Some(expected));
        }
        assert!(heap.is_empty());
    }
}
