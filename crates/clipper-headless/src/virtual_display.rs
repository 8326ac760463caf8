//! Virtual-display acquisition for containerised environments (§4.1.2).

use clipper_config::VirtualDisplayConfig;
use clipper_types::{ClipperError, Result};
use rand::Rng;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Display numbers that collide with common defaults and are
/// therefore avoided when choosing a fresh one.
const COMMON_DISPLAY_NUMBERS: &[u32] = &[0, 1, 99];

const DISPLAY_RANGE: std::ops::RangeInclusive<u32> = 10..=199;

/// A running virtual display. Killed when dropped.
pub struct VirtualDisplayGuard {
    pub display: String,
    child: Child,
}

impl VirtualDisplayGuard {
    /// Acquire a virtual display if `config.enabled`; `Ok(None)` when
    /// virtual displays are turned off for this deployment.
    pub async fn acquire(config: &VirtualDisplayConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        if which(&config.server_binary).is_none() {
            return Err(ClipperError::Headless(format!(
                "virtual display server binary '{}' not found on PATH",
                config.server_binary
            )));
        }

        let number = pick_display_number();
        let display = format!(":{number}");

        let child = Command::new(&config.server_binary)
            .arg(&display)
            .arg("-screen")
            .arg("0")
            .arg("1920x1080x24")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipperError::Headless(format!("failed to spawn {}: {e}", config.server_binary)))?;

        if !Self::wait_for_socket(number, Duration::from_secs(5)).await {
            return Err(ClipperError::Headless(format!(
                "virtual display {display} did not become accessible"
            )));
        }

        Ok(Some(Self { display, child }))
    }

    async fn wait_for_socket(number: u32, timeout: Duration) -> bool {
        let socket_path = format!("/tmp/.X11-unix/X{number}");
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if Path::new(&socket_path).exists() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}

impl Drop for VirtualDisplayGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

/// Pick a display number biased away from the common values
/// `{0, 1, 99}`, re-rolling on collision.
fn pick_display_number() -> u32 {
    let mut rng = rand::thread_rng();
    loop {
        let candidate = rng.gen_range(DISPLAY_RANGE);
        if !COMMON_DISPLAY_NUMBERS.contains(&candidate) {
            return candidate;
        }
    }
}

fn which(binary: &str) -> Option<String> {
    let output = Command::new("which").arg(binary).output().ok()?;
    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    } else {
        None
    }
}
