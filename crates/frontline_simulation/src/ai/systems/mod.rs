//! AI systems (strategic layer logic)

pub mod brains;

pub use brains::*;
