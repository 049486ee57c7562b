//! Pure task model and the algorithms that run over it.
//!
//! Core modules must be free of I/O side effects. Steps, tasks and results
//! are immutable values; every update returns a new value.

pub mod async_action;
pub mod async_resolver;
pub mod error;
pub mod loader;
pub mod navigator;
pub mod result;
pub mod step;
pub mod task;
pub mod task_result;
pub mod transformer;
pub mod tree;
