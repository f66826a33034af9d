pub mod rate;
pub mod request;
pub mod solver;

pub use request::{MatchRequest, OutcomeRange, TossResult};
pub use solver::{solve, SolveError};
