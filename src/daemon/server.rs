use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use super::ipc_server::IpcServer;
use crate::config::Config;
use crate::panel::{MethodCall, PanelContext};
use crate::surfaces::create_surface;

/// Long-running host for the panel context
pub struct PanelDaemon {
    context: Arc<PanelContext>,
    surface_name: String,
}

impl PanelDaemon {
    /// Build the panel context from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let surface_config = config.surface.clone();
        let context = PanelContext::new(config.channel.clone(), |wake| {
            create_surface(&surface_config, wake)
        })
        .context("Failed to create panel context")?;

        Ok(Self {
            context: Arc::new(context),
            surface_name: config.surface.backend.clone(),
        })
    }

    /// Host an already-built context
    pub fn from_context(context: Arc<PanelContext>, surface_name: impl Into<String>) -> Self {
        Self {
            context,
            surface_name: surface_name.into(),
        }
    }

    pub fn context(&self) -> Arc<PanelContext> {
        self.context.clone()
    }

    /// Serve IPC on `socket_path` until shutdown via IPC, Ctrl+C or SIGTERM
    pub async fn run(self, socket_path: PathBuf) -> Result<()> {
        let (shutdown_sender, shutdown_receiver) = flume::bounded::<()>(1);

        // Installed before the socket exists so `daemon stop`'s SIGTERM
        // fallback never hits the default handler.
        let mut terminate = signal(SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?;

        let ipc_server = IpcServer::new(
            &socket_path,
            self.context.clone(),
            self.surface_name.clone(),
            shutdown_sender,
        )?;

        let _socket_guard = scopeguard::guard(socket_path, |path| {
            if path.exists() {
                let _ = std::fs::remove_file(&path);
            }
        });

        info!("Panel daemon started");

        tokio::select! {
            result = ipc_server.run() => {
                if let Err(e) = result {
                    error!("IPC server error: {}", e);
                }
            }
            _ = shutdown_receiver.recv_async() => {
                info!("Received shutdown signal, stopping panel daemon");
            }
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Received Ctrl+C signal, stopping panel daemon"),
                    Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
                }
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, stopping panel daemon");
            }
        }

        // The notification is not meant to outlive its host.
        let context = self.context.clone();
        match tokio::task::spawn_blocking(move || context.bridge().handle(&MethodCall::hide())).await {
            Ok(Some(Err(e))) => warn!("Failed to clear panel on shutdown: {}", e),
            Err(e) => warn!("Shutdown cleanup task failed: {}", e),
            _ => {}
        }

        info!("Panel daemon stopped");
        Ok(())
    }
}

/// Check if a process is running by PID
pub fn is_process_running(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };

    // Signal 0 checks for existence without delivering anything.
    let result = unsafe { libc::kill(pid, 0) };
    result == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// Return the PID recorded in `pid_file` if that process is alive,
/// removing stale or unreadable markers.
pub fn check_daemon_process(pid_file: &Path) -> Result<Option<u32>> {
    if !pid_file.exists() {
        return Ok(None);
    }

    let pid_str = std::fs::read_to_string(pid_file)
        .context("Failed to read PID file")?;

    match pid_str.trim().parse::<u32>() {
        Ok(pid) if is_process_running(pid) => Ok(Some(pid)),
        _ => {
            if let Err(e) = std::fs::remove_file(pid_file) {
                warn!("Failed to remove stale PID file: {}", e);
            } else {
                info!("Removed stale PID file {}", pid_file.display());
            }
            Ok(None)
        }
    }
}

/// Write the current PID, returning a guard that removes the file on drop
pub fn write_pid_file(pid_file: &Path) -> Result<scopeguard::ScopeGuard<PathBuf, impl FnOnce(PathBuf)>> {
    if let Some(parent) = pid_file.parent() {
        std::fs::create_dir_all(parent).context("Failed to create PID directory")?;
    }
    std::fs::write(pid_file, std::process::id().to_string())
        .context("Failed to write PID file")?;

    Ok(scopeguard::guard(pid_file.to_path_buf(), |path| {
        let _ = std::fs::remove_file(path);
    }))
}
