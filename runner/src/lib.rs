//! Task runner core for declarative research-study tasks.
//!
//! A task is a tree of steps (instructions, forms, active measurements,
//! sections) loaded from JSON. The crate resolves that tree into a navigable
//! [`core::task::Task`], walks it step by step and accumulates an immutable
//! [`core::task_result::TaskResult`]. The architecture enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (step tree, navigation, result
//!   history, transformer and async action resolution). No I/O.
//! - **[`io`]**: Side-effecting operations (resource directories, JSON
//!   decoding, schema checks, result persistence, config).
//!
//! Orchestration modules ([`run`], [`validate`], [`walk`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
pub mod walk;
