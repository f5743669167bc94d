pub mod classify;
pub mod generate;
pub mod legality;

pub use classify::{classify, read_as};
pub use generate::generate_moves;
pub use legality::{beats, is_legal, legal_responses};
