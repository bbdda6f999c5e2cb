//! Competitive map pool
//!
//! Fixed list of named maps with a uniform random pick for the `map` command.

use rand::seq::SliceRandom;

/// Current map pool.
pub const MAP_POOL: &[&str] = &[
    "Ascent",
    "Bind",
    "Haven",
    "Split",
    "Lotus",
    "Fracture",
    "Icebox",
    "Pearl",
    "Sunset",
    "Abyss",
    "Corrode",
];

/// Pick a random map from the pool.
pub fn pick_random() -> &'static str {
    // The pool is a non-empty constant, so choose() cannot return None.
    MAP_POOL
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MAP_POOL[0])
}
