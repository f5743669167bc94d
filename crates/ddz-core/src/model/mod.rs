pub mod combo;
pub mod deck;
pub mod hand;
pub mod rank;
pub mod side;
