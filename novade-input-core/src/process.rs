//! Spawning helper processes (panels, backgrounds, autostart entries).

use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use crate::context::Core;
use crate::error::InputCoreError;

/// Runs `command` through `/bin/sh` fully detached from the compositor.
///
/// The shell backgrounds the command and exits right away; only that
/// immediate child is waited for, so the command is re-parented and never
/// becomes a zombie of the compositor.
pub fn spawn_detached(command: &str, wayland_display: Option<&str>) -> Result<(), InputCoreError> {
    let mut shell = Command::new("/bin/sh");
    shell
        .arg("-c")
        .arg(format!("{} &", command))
        .stdin(Stdio::null());
    if let Some(display) = wayland_display {
        shell.env("WAYLAND_DISPLAY", display);
    }

    let status = shell.status().map_err(|source| InputCoreError::Spawn {
        command: command.to_string(),
        source,
    })?;
    if !status.success() {
        warn!(command, ?status, "Shell exited with failure while spawning");
    }
    debug!(command, "Spawned detached");
    Ok(())
}

impl Core {
    /// Marks the compositor as up. The first call starts the configured
    /// autostart commands; later calls do nothing.
    pub fn wake(&mut self) {
        if self.woken {
            return;
        }
        self.woken = true;
        info!(count = self.config.session.autostart.len(), "Compositor woken, running autostart");
        let display = self.config.session.wayland_display.clone();
        for command in &self.config.session.autostart {
            if let Err(e) = spawn_detached(command, display.as_deref()) {
                warn!("Autostart entry failed: {}", e);
            }
        }
    }
}
