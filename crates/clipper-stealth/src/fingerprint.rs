//! Anti-fingerprinting profile generation (§4.1.3). Produces the
//! randomised-but-plausible values injected into the page before
//! navigation; the actual JS injection lives in [`crate::evasion`].

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScreenMetrics {
    pub width: u32,
    pub height: u32,
}

/// Weighted-random realistic resolution: 1920x1080 is the common case,
/// with a handful of alternates and ±1-2px jitter so repeat runs don't
/// fingerprint as identical.
pub fn random_screen_metrics() -> ScreenMetrics {
    let mut rng = rand::thread_rng();
    // (width, height, weight)
    let pool: &[(u32, u32, u32)] = &[
        (1920, 1080, 60),
        (1366, 768, 15),
        (1536, 864, 10),
        (1440, 900, 8),
        (2560, 1440, 7),
    ];
    let total: u32 = pool.iter().map(|(_, _, w)| w).sum();
    let mut pick = rng.gen_range(0..total);
    let mut chosen = pool[0];
    for entry in pool {
        if pick < entry.2 {
            chosen = *entry;
            break;
        }
        pick -= entry.2;
    }
    let jitter_w: i32 = rng.gen_range(-2..=2);
    let jitter_h: i32 = rng.gen_range(-1..=1);
    ScreenMetrics {
        width: (chosen.0 as i32 + jitter_w).max(800) as u32,
        height: (chosen.1 as i32 + jitter_h).max(600) as u32,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebGlProfile {
    pub vendor: String,
    pub renderer: String,
}

pub fn random_webgl_profile() -> WebGlProfile {
    let mut rng = rand::thread_rng();
    let pool = [
        ("Google Inc. (NVIDIA)", "ANGLE (NVIDIA, NVIDIA GeForce RTX 3060 Direct3D11 vs_5_0 ps_5_0, D3D11)"),
        ("Google Inc. (Intel)", "ANGLE (Intel, Intel(R) UHD Graphics 630 Direct3D11 vs_5_0 ps_5_0, D3D11)"),
        ("Google Inc. (AMD)", "ANGLE (AMD, AMD Radeon RX 580 Series Direct3D11 vs_5_0 ps_5_0, D3D11)"),
        ("Mesa/X.org", "Mesa Intel(R) UHD Graphics 620 (KBL GT2)"),
    ];
    let (vendor, renderer) = pool.choose(&mut rng).unwrap();
    WebGlProfile {
        vendor: vendor.to_string(),
        renderer: renderer.to_string(),
    }
}

/// Canvas 2D per-pixel jitter amount, drawn from `[1e-4, 1e-3]` (§4.1.3).
pub fn random_canvas_noise() -> f64 {
    rand::thread_rng().gen_range(1e-4..1e-3)
}

/// AudioContext oscillator frequency jitter, drawn from `[0, audio_noise]`.
pub fn random_audio_noise(audio_noise: f64) -> f64 {
    if audio_noise <= 0.0 {
        0.0
    } else {
        rand::thread_rng().gen_range(0.0..audio_noise)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigatorOverrides {
    pub webdriver: bool,
    pub hardware_concurrency: u32,
    pub device_memory: u32,
    pub platform: String,
}

pub fn random_navigator_overrides(platform: &str) -> NavigatorOverrides {
    let mut rng = rand::thread_rng();
    let hw_pool = [4u32, 8, 12, 16];
    let mem_pool = [4u32, 8, 16, 32];
    NavigatorOverrides {
        webdriver: false,
        hardware_concurrency: *hw_pool.choose(&mut rng).unwrap(),
        device_memory: *mem_pool.choose(&mut rng).unwrap(),
        platform: platform.to_string(),
    }
}

/// Timezone pool for `Intl.DateTimeFormat` overrides.
pub fn random_timezone() -> &'static str {
    let pool = [
        "America/New_York",
        "America/Chicago",
        "America/Los_Angeles",
        "Europe/London",
        "Europe/Berlin",
    ];
    pool[rand::thread_rng().gen_range(0..pool.len())]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FingerprintProfile {
    pub screen: ScreenMetrics,
    pub webgl: WebGlProfile,
    pub canvas_noise: f64,
    pub audio_noise: f64,
    pub navigator: NavigatorOverrides,
    pub timezone: String,
}

impl FingerprintProfile {
    pub fn generate(platform: &str) -> Self {
        Self {
            screen: random_screen_metrics(),
            webgl: random_webgl_profile(),
            canvas_noise: random_canvas_noise(),
            audio_noise: random_audio_noise(1e-3),
            navigator: random_navigator_overrides(platform),
            timezone: random_timezone().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_metrics_are_realistic() {
        for _ in 0..50 {
            let m = random_screen_metrics();
            assert!(m.width >= 800 && m.width <= 2600);
            assert!(m.height >= 600 && m.height <= 1500);
        }
    }

    #[test]
    fn canvas_noise_within_spec_range() {
        for _ in 0..200 {
            let n = random_canvas_noise();
            assert!(n >= 1e-4 && n < 1e-3);
        }
    }

    #[test]
    fn audio_noise_bounded_by_config() {
        for _ in 0..200 {
            let n = random_audio_noise(5e-4);
            assert!((0.0..5e-4).contains(&n));
        }
    }

    #[test]
    fn hardware_concurrency_in_allowed_set() {
        for _ in 0..50 {
            let nav = random_navigator_overrides("Win32");
            assert!([4, 8, 12, 16].contains(&nav.hardware_concurrency));
            assert!([4, 8, 16, 32].contains(&nav.device_memory));
            assert!(!nav.webdriver);
        }
    }
}
