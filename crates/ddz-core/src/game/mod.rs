pub mod endgame;
pub mod serialization;
