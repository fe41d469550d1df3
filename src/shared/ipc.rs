//! IPC (Inter-Process Communication) client module
//!
//! This module provides a unified interface for talking to the panel daemon
//! via Unix domain sockets.

use crate::daemon::ipc::{read_frame, write_frame};
use crate::daemon::{DaemonMessage, DaemonResponse, PanelStatus};
use crate::errors::{AppError, AppResult};
use crate::panel::{BridgeEvent, MethodCall};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::net::UnixStream;
use tracing::debug;

/// Configuration for IPC client behavior
#[derive(Debug, Clone)]
pub struct IpcClientConfig {
    /// Maximum allowed response size in bytes
    pub max_response_size: usize,
}

impl Default for IpcClientConfig {
    fn default() -> Self {
        Self {
            max_response_size: 1024 * 1024, // 1MB default
        }
    }
}

impl IpcClientConfig {
    /// Create config for small responses (acknowledgements, events)
    pub fn small_response() -> Self {
        Self {
            max_response_size: 1024, // 1KB
        }
    }
}

/// Result of a method call that was accepted for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// The bridge completed the call without a value
    Completed,
    /// The bridge does not know the method and sent no completion
    Unanswered,
}

/// Unified IPC client for daemon communication
pub struct IpcClient {
    config: IpcClientConfig,
}

impl IpcClient {
    /// Create a new IPC client with default configuration
    pub fn new() -> Self {
        Self {
            config: IpcClientConfig::default(),
        }
    }

    /// Create a new IPC client with custom configuration
    pub fn with_config(config: IpcClientConfig) -> Self {
        Self { config }
    }

    /// Send a message and return the daemon's reply, or `None` when the
    /// daemon closed the connection without replying.
    pub async fn send_message(&self, socket_path: &Path, message: DaemonMessage) -> Result<Option<DaemonResponse>> {
        debug!("Sending IPC message to daemon at {}", socket_path.display());

        let mut stream = UnixStream::connect(socket_path)
            .await
            .context("Failed to connect to daemon socket")?;

        write_frame(&mut stream, &message).await?;

        debug!("Message sent, waiting for response");
        let response = read_frame(&mut stream, self.config.max_response_size).await?;

        debug!("Received response: {:?}", response);
        Ok(response)
    }

    /// Send a message that must be answered
    pub async fn send_daemon_message(&self, socket_path: &Path, message: DaemonMessage) -> Result<DaemonResponse> {
        self.send_message(socket_path, message)
            .await?
            .context("Daemon closed the connection without replying")
    }

    /// Invoke a method on the command bridge
    pub async fn invoke(&self, socket_path: &Path, call: MethodCall) -> AppResult<Reply> {
        let response = self
            .send_message(socket_path, DaemonMessage::Invoke(call))
            .await
            .map_err(|e| AppError::ipc(format!("{e:#}")))?;

        match response {
            None => Ok(Reply::Unanswered),
            Some(DaemonResponse::Ok) => Ok(Reply::Completed),
            Some(DaemonResponse::Error(reply)) => Err(reply.into()),
            Some(other) => Err(AppError::ipc(format!("Unexpected response to invoke: {other:?}"))),
        }
    }

    /// Attach as the daemon's event listener
    pub async fn subscribe(&self, socket_path: &Path) -> Result<RemoteSubscription> {
        let mut stream = UnixStream::connect(socket_path)
            .await
            .context("Failed to connect to daemon socket")?;

        write_frame(&mut stream, &DaemonMessage::Subscribe).await?;

        match read_frame(&mut stream, self.config.max_response_size).await? {
            Some(DaemonResponse::Subscribed { listener_id }) => {
                debug!("Subscribed as listener {}", listener_id);
                Ok(RemoteSubscription {
                    stream,
                    listener_id,
                    max_frame_size: self.config.max_response_size,
                })
            }
            other => Err(anyhow::anyhow!("Unexpected response to subscribe: {:?}", other)),
        }
    }
}

impl Default for IpcClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Open listener connection to the daemon
pub struct RemoteSubscription {
    stream: UnixStream,
    listener_id: u64,
    max_frame_size: usize,
}

impl RemoteSubscription {
    pub fn listener_id(&self) -> u64 {
        self.listener_id
    }

    /// Wait for the next event; `None` once the daemon closed the stream
    /// (shutdown, or a newer listener took over).
    pub async fn next_event(&mut self) -> Result<Option<BridgeEvent>> {
        match read_frame(&mut self.stream, self.max_frame_size).await? {
            None => Ok(None),
            Some(DaemonResponse::Event(event)) => Ok(Some(event)),
            Some(other) => Err(anyhow::anyhow!("Unexpected frame on event stream: {:?}", other)),
        }
    }
}

/// Convenience functions for common IPC operations
pub mod convenience {
    use super::*;

    /// Show or replace the panel notification
    pub async fn show_panel(socket_path: &Path, content: &str) -> AppResult<Reply> {
        let client = IpcClient::with_config(IpcClientConfig::small_response());
        client.invoke(socket_path, MethodCall::show(content)).await
    }

    /// Hide the panel notification
    pub async fn hide_panel(socket_path: &Path) -> AppResult<Reply> {
        let client = IpcClient::with_config(IpcClientConfig::small_response());
        client.invoke(socket_path, MethodCall::hide()).await
    }

    /// Deliver a simulated tap; returns whether a listener received it
    pub async fn simulate_tap(socket_path: &Path) -> Result<bool> {
        let client = IpcClient::with_config(IpcClientConfig::small_response());
        match client.send_daemon_message(socket_path, DaemonMessage::Wake).await? {
            DaemonResponse::Woke { delivered } => Ok(delivered),
            other => Err(anyhow::anyhow!("Unexpected response to wake: {:?}", other)),
        }
    }

    /// Get daemon status
    pub async fn get_daemon_status(socket_path: &Path) -> Result<PanelStatus> {
        let client = IpcClient::new();
        match client.send_daemon_message(socket_path, DaemonMessage::Status).await? {
            DaemonResponse::Status(status) => Ok(status),
            DaemonResponse::Error(reply) => Err(AppError::from(reply).into()),
            other => Err(anyhow::anyhow!("Unexpected response to status: {:?}", other)),
        }
    }

    /// Check that the daemon answers
    pub async fn ping_daemon(socket_path: &Path) -> Result<()> {
        let client = IpcClient::with_config(IpcClientConfig::small_response());
        client.send_daemon_message(socket_path, DaemonMessage::Ping).await?;
        Ok(())
    }

    /// Send shutdown signal to daemon
    pub async fn shutdown_daemon(socket_path: &Path) -> Result<DaemonResponse> {
        let client = IpcClient::with_config(IpcClientConfig::small_response());
        client.send_daemon_message(socket_path, DaemonMessage::Shutdown).await
    }
}
