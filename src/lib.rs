//! Rubik's Cube Model and Solver Library
//!
//! Models the 3x3x3 cube as 26 pieces in integer coordinates, with exact
//! signed-permutation matrices for face turns, and solves any reachable
//! state layer by layer. Rendering is left to callers, which read the cube
//! through [`cube::Cube::color_at`] and [`cube::Cube::face_grid`] or the
//! ASCII net `Display` impl.

pub mod cube;
pub mod geometry;
pub mod pieces;
pub mod solver;

pub use cube::{Cube, Face, Move};
pub use solver::{solve, SolveError};
