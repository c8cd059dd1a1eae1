//! Replaying adapters that replay recorded interactions.

pub mod process;

pub use process::ReplayingProcessSpawner;
