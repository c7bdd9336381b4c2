pub mod domain;
pub mod prelude;
pub mod mock;
