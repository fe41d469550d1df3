//! Panel command handler
//!
//! Forwards show/hide calls and simulated taps to the running daemon and
//! streams `add` events back to the terminal.

use super::super::CliContext;
use anyhow::{Context, Result};
use notification_panel::panel::MethodCall;
use notification_panel::shared::ipc::convenience::{hide_panel, show_panel, simulate_tap};
use notification_panel::shared::ipc::{IpcClient, Reply};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Handler for panel operations
pub struct PanelHandler<'a> {
    context: &'a CliContext,
}

impl<'a> PanelHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    /// Show or replace the panel notification
    pub async fn handle_show(&self, content: &str) -> Result<()> {
        let socket_path = self.daemon_socket()?;
        let reply = show_panel(&socket_path, content).await?;
        self.report(reply, "Panel shown");
        Ok(())
    }

    /// Hide the panel notification
    pub async fn handle_hide(&self) -> Result<()> {
        let socket_path = self.daemon_socket()?;
        let reply = hide_panel(&socket_path).await?;
        self.report(reply, "Panel hidden");
        Ok(())
    }

    /// Send an arbitrary method call through the command bridge
    pub async fn handle_invoke(&self, method: String, arguments: Option<String>) -> Result<()> {
        let mut call = MethodCall::new(method);
        if let Some(raw) = arguments {
            let value: serde_json::Value =
                serde_json::from_str(&raw).context("Arguments must be valid JSON")?;
            call = call.with_arguments(value);
        }

        let socket_path = self.daemon_socket()?;
        let reply = IpcClient::new().invoke(&socket_path, call).await?;
        self.report(reply, "Call completed");
        Ok(())
    }

    /// Simulate the user tapping the panel's control
    pub async fn handle_tap(&self) -> Result<()> {
        let socket_path = self.daemon_socket()?;
        if simulate_tap(&socket_path).await? {
            println!("Tap delivered to listener");
        } else {
            println!("Tap dropped: no listener attached");
        }
        Ok(())
    }

    /// Attach as listener and print events until `count` is reached,
    /// the daemon closes the stream, or Ctrl+C
    pub async fn handle_listen(&self, count: Option<usize>) -> Result<()> {
        let socket_path = self.daemon_socket()?;
        let mut subscription = IpcClient::new().subscribe(&socket_path).await?;
        info!("Listening for panel events as listener {}", subscription.listener_id());

        let mut received = 0usize;
        while count.map_or(true, |limit| received < limit) {
            let event = tokio::select! {
                event = subscription.next_event() => event?,
                _ = tokio::signal::ctrl_c() => {
                    debug!("Interrupted, detaching listener");
                    break;
                }
            };

            match event {
                Some(event) => {
                    println!("{}", event);
                    received += 1;
                }
                None => {
                    warn!("Event stream closed by daemon");
                    break;
                }
            }
        }

        Ok(())
    }

    fn daemon_socket(&self) -> Result<PathBuf> {
        let socket_path = self.context.socket_path();
        if !socket_path.exists() {
            return Err(anyhow::anyhow!(
                "Daemon is not running (no socket at {}). Start it with 'notification-panel daemon start'",
                socket_path.display()
            ));
        }
        Ok(socket_path)
    }

    fn report(&self, reply: Reply, completed: &str) {
        match reply {
            Reply::Completed => println!("{}", completed),
            Reply::Unanswered => println!("No completion: method not handled by the bridge"),
        }
    }
}

super::traits::impl_context_handler!(PanelHandler<'a>);
