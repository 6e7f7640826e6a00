//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Input latching and one-shot commands
//! - Visibility-driven pause
//! - Storage (LocalStorage on web, memory on native)

pub mod host;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use host::Host;
pub use time::now_ms;
