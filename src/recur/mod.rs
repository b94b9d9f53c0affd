//! Polynomial recurrences shared by the shell evaluators.

pub mod poly;

pub use poly::{nabla1, x1};
