pub mod generation;
pub mod import;
pub mod views;

pub use views::*;
