//! Common test utilities and helpers
//!
//! Shared by the integration suites: a recording render surface for
//! library-level tests and a CLI command builder bound to a temp home.

#![allow(dead_code)]

use assert_cmd::Command;
use notification_panel::panel::{
    ChannelDescriptor, NotificationRequest, RenderSurface, SlotId,
};
use notification_panel::{AppError, AppResult};
use predicates::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Render surface that records every call for later inspection
#[derive(Default)]
pub struct RecordingSurface {
    registrations: Mutex<Vec<ChannelDescriptor>>,
    slots: Mutex<HashMap<SlotId, NotificationRequest>>,
    displays: AtomicUsize,
    clears: AtomicUsize,
    fail_display: AtomicBool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `display` calls fail
    pub fn fail_displays(&self, fail: bool) {
        self.fail_display.store(fail, Ordering::SeqCst);
    }

    pub fn registrations(&self) -> Vec<ChannelDescriptor> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn shown(&self, slot: SlotId) -> Option<NotificationRequest> {
        self.slots.lock().unwrap().get(&slot).cloned()
    }

    pub fn occupied_slots(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn display_count(&self) -> usize {
        self.displays.load(Ordering::SeqCst)
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl RenderSurface for RecordingSurface {
    fn register_channel(&self, descriptor: &ChannelDescriptor) -> AppResult<()> {
        self.registrations.lock().unwrap().push(descriptor.clone());
        Ok(())
    }

    fn display(&self, slot: SlotId, request: &NotificationRequest) -> AppResult<()> {
        if self.fail_display.load(Ordering::SeqCst) {
            return Err(AppError::surface("display", "surface unavailable"));
        }
        self.displays.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().unwrap().insert(slot, request.clone());
        Ok(())
    }

    fn clear(&self, slot: SlotId) -> AppResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.slots.lock().unwrap().remove(&slot);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Test command builder for the notification-panel CLI
pub struct TestCommand {
    cmd: Command,
}

impl TestCommand {
    pub fn new() -> Self {
        let mut cmd = Command::cargo_bin("notification-panel")
            .expect("Failed to find notification-panel binary");
        cmd.env_remove("NOTIFICATION_PANEL_HOME");
        Self { cmd }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.cmd.arg(arg.as_ref());
        }
        self
    }

    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.cmd.arg(arg.as_ref());
        self
    }

    /// Execute and expect success
    pub fn expect_success(mut self) -> TestAssertion {
        TestAssertion {
            assert: self.cmd.assert().success(),
        }
    }

    /// Execute and expect failure
    pub fn expect_failure(mut self) -> TestAssertion {
        TestAssertion {
            assert: self.cmd.assert().failure(),
        }
    }
}

impl Default for TestCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Test assertion wrapper with convenient methods
pub struct TestAssertion {
    assert: assert_cmd::assert::Assert,
}

impl TestAssertion {
    pub fn stdout_contains<S: AsRef<str>>(self, text: S) -> Self {
        Self {
            assert: self.assert.stdout(predicate::str::contains(text.as_ref())),
        }
    }

    pub fn stderr_contains<S: AsRef<str>>(self, text: S) -> Self {
        Self {
            assert: self.assert.stderr(predicate::str::contains(text.as_ref())),
        }
    }

    pub fn done(self) -> assert_cmd::assert::Assert {
        self.assert
    }
}

/// Isolated base directory for config, socket and PID files
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> std::path::PathBuf {
        self.home().join("config.toml")
    }

    /// Create a command configured for this environment
    pub fn command(&self) -> TestCommand {
        TestCommand::new()
            .arg("--home")
            .arg(self.home().to_string_lossy())
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common test operations
pub mod helpers {
    use super::*;

    /// Test help command output
    pub fn test_help_contains(expected_text: &str) {
        TestCommand::new()
            .arg("--help")
            .expect_success()
            .stdout_contains(expected_text)
            .done();
    }

    /// Test version command output
    pub fn test_version_contains(expected_text: &str) {
        TestCommand::new()
            .arg("--version")
            .expect_success()
            .stdout_contains(expected_text)
            .done();
    }
}
