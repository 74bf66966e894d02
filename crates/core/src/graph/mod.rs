//! The fragment conflict graph and odd-cycle search over it.

pub mod conflict;
pub mod odd_cycle;

pub use conflict::ConflictGraph;
pub use odd_cycle::{odd_cycle, Cycle};
