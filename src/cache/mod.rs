//! Rolling price cache and windowed price changes
//!
//! Provides:
//! - Per-symbol price series with 7-day retention
//! - Nearest-prior-sample percent change over any window
//! - JSON persistence, loaded at start and flushed once per cycle

pub mod types;
pub mod store;
pub mod window;
pub mod lifecycle;

pub use types::*;
pub use store::*;
pub use window::*;
pub use lifecycle::*;
