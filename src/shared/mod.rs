//! Shared modules used by both the CLI and the daemon
//!
//! Configuration types and the IPC client live here so both sides agree on
//! them.

pub mod config;
pub mod ipc;
