//! Port traits defining external boundaries.
//!
//! The process boundary is the only one the runner crosses; its
//! implementations live in `src/adapters/`.

pub mod process;
