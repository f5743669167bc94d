pub mod policy;
pub mod solver;

pub use policy::{HeuristicPolicy, Policy, PolicyContext, SolverPolicy};
pub use solver::{LOSS, Solver, SolverStats, Strategy, WIN, best_strategy};
