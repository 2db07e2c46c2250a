use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod data_structures;
pub mod derank;
pub mod heap_primitives;

// Search space and problems
// -------------------------
pub mod problem;
pub mod search;
pub mod space;

// Problems
// --------
pub mod problems;

// Searching
// ---------
pub mod context;
pub mod frontier;
pub mod observer;

// Algorithms
// ----------
pub mod algorithms;
pub mod strategy;

// Presentation
// ------------
pub mod animation;
