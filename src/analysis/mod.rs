//! Text analysis over story titles.

pub mod words;

pub use words::*;
