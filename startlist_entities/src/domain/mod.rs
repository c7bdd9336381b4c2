pub mod entry;
pub mod ranking;
pub mod rules;
pub mod schedule;
pub mod snapshot;
