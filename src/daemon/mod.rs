//! Daemon module hosting the panel
//!
//! This module provides:
//! - Unix socket IPC with length-prefixed bincode frames
//! - The IPC server feeding commands into the command bridge
//! - Event streaming to the subscribed application listener
//! - Daemon lifecycle helpers (PID marker, shutdown)

pub mod ipc;
pub mod ipc_server;
pub mod server;
pub mod shared;

// Re-export commonly used types
pub use ipc_server::IpcServer;
pub use server::{check_daemon_process, is_process_running, write_pid_file, PanelDaemon};
pub use shared::{DaemonMessage, DaemonResponse, ErrorCode, ErrorReply, PanelStatus};
