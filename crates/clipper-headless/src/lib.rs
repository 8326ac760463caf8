//! The headless-browser fetch tier (§4.1.2 singleton discipline,
//! §4.1.1 HTMX loader, §4.1.3 anti-fingerprinting injection).

pub mod htmx;
pub mod singleton;
pub mod tier;
pub mod virtual_display;

pub use singleton::BrowserSingleton;
pub use tier::HeadlessBrowserTier;
pub use virtual_display::VirtualDisplayGuard;
