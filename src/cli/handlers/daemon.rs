//! Daemon management handler
//!
//! This module handles all daemon-related commands including start, stop
//! and status checks.

use super::super::{CliContext, DaemonAction};
use anyhow::{Context, Result};
use notification_panel::daemon::{check_daemon_process, is_process_running, write_pid_file, PanelDaemon};
use notification_panel::shared::ipc::convenience::{get_daemon_status, ping_daemon, shutdown_daemon};
use std::process;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Set on the child process spawned by `daemon start --detach`
pub const DETACHED_ENV: &str = "NOTIFICATION_PANEL_DETACHED";

const STOP_TIMEOUT: Duration = Duration::from_secs(10);
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handler for daemon operations
pub struct DaemonHandler<'a> {
    context: &'a CliContext,
}

impl<'a> DaemonHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    /// Handle daemon management operations
    pub async fn handle_daemon(&self, action: DaemonAction) -> Result<()> {
        match action {
            DaemonAction::Start { detach } => {
                if detach {
                    self.start_daemon_detached().await
                } else {
                    self.start_daemon_foreground().await
                }
            }
            DaemonAction::Stop => self.handle_daemon_stop().await,
            DaemonAction::Status => self.handle_daemon_status().await,
        }
    }

    /// Handle daemon stop command
    pub async fn handle_daemon_stop(&self) -> Result<()> {
        let pid_file = self.context.pid_path();

        let Some(pid) = check_daemon_process(&pid_file)? else {
            println!("Daemon is not running");
            return Ok(());
        };

        match shutdown_daemon(&self.context.socket_path()).await {
            Ok(_) => {
                info!("Daemon stop signal sent via IPC");
                if wait_for_exit(pid, STOP_TIMEOUT).await {
                    println!("Daemon stopped successfully");
                } else {
                    println!("Warning: Daemon may still be running after stop signal");
                }
            }
            Err(e) => {
                error!("Failed to send IPC shutdown signal: {}", e);
                println!("Failed to send shutdown signal to daemon: {}", e);
                terminate(pid).await;
            }
        }

        if !is_process_running(pid) && pid_file.exists() {
            let _ = std::fs::remove_file(&pid_file);
        }

        Ok(())
    }

    /// Handle daemon status command
    pub async fn handle_daemon_status(&self) -> Result<()> {
        let Some(pid) = check_daemon_process(&self.context.pid_path())? else {
            println!("Daemon is not running");
            return Ok(());
        };

        match get_daemon_status(&self.context.socket_path()).await {
            Ok(status) => {
                println!("Daemon is running (PID: {})", pid);
                println!("  Surface: {}", status.surface);
                match (&status.title, status.shown_at) {
                    (Some(title), Some(shown_at)) if status.visible => {
                        println!("  Panel: visible \"{}\" (since {})", title, shown_at.format("%Y-%m-%d %H:%M:%S"));
                    }
                    _ => println!("  Panel: hidden"),
                }
                println!("  Channel registered: {}", status.channel_registered);
                println!("  Listener attached: {}", status.listener_attached);
                println!(
                    "  Events: {} delivered, {} dropped",
                    status.events_delivered, status.events_dropped
                );
                println!("  Uptime: {} seconds", status.uptime_secs);
            }
            Err(e) => {
                println!("Daemon is running (PID: {}) - IPC communication failed: {}", pid, e);
            }
        }

        Ok(())
    }

    /// Start daemon in detached (background) mode
    async fn start_daemon_detached(&self) -> Result<()> {
        println!("Starting daemon in detached mode...");
        self.ensure_not_running()?;

        let current_exe = std::env::current_exe()
            .context("Failed to get current executable path")?;

        // A fresh process avoids forking inside the tokio runtime.
        let mut command = process::Command::new(&current_exe);
        if let Some(home) = &self.context.home {
            command.arg("--home").arg(home);
        }
        let mut child = command
            .arg("daemon")
            .arg("start")
            .env(DETACHED_ENV, "1")
            .stdin(process::Stdio::null())
            .stdout(process::Stdio::null())
            .stderr(process::Stdio::null())
            .spawn()
            .context("Failed to spawn daemon process")?;

        let socket_path = self.context.socket_path();
        let start_time = Instant::now();
        while start_time.elapsed() < STARTUP_TIMEOUT {
            tokio::time::sleep(POLL_INTERVAL).await;

            if let Some(exit_status) = child.try_wait()? {
                return Err(anyhow::anyhow!("Daemon process exited immediately: {}", exit_status));
            }
            if socket_path.exists() && ping_daemon(&socket_path).await.is_ok() {
                println!("Daemon started successfully with PID: {}", child.id());
                return Ok(());
            }
        }

        warn!("Daemon did not answer within {:?}", STARTUP_TIMEOUT);
        println!("Daemon started with PID: {} but is not answering yet", child.id());
        Ok(())
    }

    /// Run the daemon in the current process until it is stopped
    async fn start_daemon_foreground(&self) -> Result<()> {
        let is_detached = std::env::var(DETACHED_ENV).is_ok();

        // The parent already checked before spawning us.
        if !is_detached {
            self.ensure_not_running()?;
            println!("Starting daemon in foreground...");
        } else {
            #[cfg(unix)]
            unsafe {
                if libc::setsid() == -1 {
                    return Err(anyhow::anyhow!("Failed to create new session"));
                }
            }
        }

        let socket_path = self.context.socket_path();
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create socket directory")?;
        }

        let _pid_guard = write_pid_file(&self.context.pid_path())?;
        info!("Daemon started with PID: {}", process::id());

        let daemon = PanelDaemon::new(self.context.config_manager.config())?;
        daemon.run(socket_path).await
    }

    fn ensure_not_running(&self) -> Result<()> {
        match check_daemon_process(&self.context.pid_path())? {
            Some(pid) => Err(anyhow::anyhow!(
                "Daemon is already running with PID: {}. Stop it first with 'notification-panel daemon stop'",
                pid
            )),
            None => {
                debug!("No existing daemon found, proceeding with startup");
                Ok(())
            }
        }
    }
}

/// Poll until `pid` exits; returns false on timeout
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start_time = Instant::now();
    while start_time.elapsed() < timeout {
        if !is_process_running(pid) {
            return true;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    !is_process_running(pid)
}

/// Fallback when the daemon does not answer over IPC
async fn terminate(pid: u32) {
    let Ok(raw_pid) = libc::pid_t::try_from(pid) else {
        return;
    };

    info!("Attempting to terminate daemon process {}", pid);
    if unsafe { libc::kill(raw_pid, libc::SIGTERM) } != 0 {
        error!("Failed to send SIGTERM: {}", std::io::Error::last_os_error());
        return;
    }

    if !wait_for_exit(pid, Duration::from_secs(2)).await {
        warn!("Process still running, sending SIGKILL");
        unsafe {
            libc::kill(raw_pid, libc::SIGKILL);
        }
    }
}

super::traits::impl_context_handler!(DaemonHandler<'a>);
