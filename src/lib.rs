//! Ricochet Robots boards, sliding movement and a shortest-path solver.

pub mod bits;
pub mod board;
pub mod engine;
pub mod error;
pub mod game;
pub mod generator;
pub mod geometry;
pub mod layout;
pub mod solver;
pub mod traversal;

pub use board::{Board, Deflector, Orientation};
pub use error::{Error, Result};
pub use game::{GameState, Puzzle, Robot};
pub use geometry::{ALL_DIRECTIONS, Coordinate, Direction};
pub use layout::Layout;
pub use solver::{Command, SolveResult, Solver, SolverConfig};
