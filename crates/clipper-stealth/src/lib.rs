//! Anti-fingerprinting and header-rotation countermeasures (§4.1.3)
//! shared by the HTTP and headless fetch tiers.

pub mod evasion;
pub mod fingerprint;
pub mod user_agent;

pub use evasion::{render_init_script, StealthController};
pub use fingerprint::{FingerprintProfile, NavigatorOverrides, ScreenMetrics, WebGlProfile};
pub use user_agent::{Platform, UserAgentRotator};
