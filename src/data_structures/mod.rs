//! Containers backing the search frontiers.

pub mod heap;
