//! I/O helpers for runner commands.

pub mod config;
pub mod registry;
pub mod resources;
pub mod result_store;
pub mod task_store;
