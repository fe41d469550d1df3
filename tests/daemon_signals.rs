//! Signal-driven daemon shutdown
//!
//! Kept in its own test binary: SIGTERM is process-wide and would stop every
//! daemon running in the same process.

mod common;

use common::RecordingSurface;
use notification_panel::daemon::PanelDaemon;
use notification_panel::panel::{ChannelSettings, PanelContext};
use notification_panel::shared::ipc::convenience::{ping_daemon, show_panel};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sigterm_hides_panel_and_removes_socket() {
    let temp_dir = TempDir::new().unwrap();
    let socket_path = temp_dir.path().join("daemon.sock");
    let surface = Arc::new(RecordingSurface::new());
    let context = Arc::new(PanelContext::with_surface(ChannelSettings::default(), surface.clone()));

    let handle = tokio::spawn(PanelDaemon::from_context(context, "recording").run(socket_path.clone()));

    let mut ready = false;
    for _ in 0..100 {
        if socket_path.exists() && ping_daemon(&socket_path).await.is_ok() {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(ready, "daemon socket never came up");

    show_panel(&socket_path, "Break in 5").await.unwrap();
    assert_eq!(surface.occupied_slots(), 1);

    let result = unsafe { libc::kill(libc::getpid(), libc::SIGTERM) };
    assert_eq!(result, 0);

    timeout(Duration::from_secs(5), handle)
        .await
        .expect("daemon should stop on SIGTERM")
        .unwrap()
        .unwrap();

    assert_eq!(surface.occupied_slots(), 0);
    assert!(!socket_path.exists());
}
