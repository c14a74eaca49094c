//! # frame-input-router - Cross-frame input event routing
//!
//! Routes mouse, wheel, touch and gesture events of a browser window to the
//! frames that compose it. Frames are rendered by separate processes, so
//! the router hit tests against compositor data, transforms events into the
//! target frame's coordinates and keeps per-event-class latches coherent as
//! frames come and go.
//!
//! ## Architecture
//!
//! - **input**: Event model and ack dispositions
//! - **view**: Frame view capability trait and the frame sink registry
//! - **hit_test**: Hit-test oracle and asynchronous target queries
//! - **gesture**: Touch sequence bookkeeping and the pinch state machine
//! - **router**: The router itself, one module per event class
//! - **diagnostics**: Anomaly counters
//! - **utils**: Shared error types

pub mod diagnostics;
pub mod gesture;
pub mod hit_test;
pub mod input;
pub mod router;
pub mod utils;
pub mod view;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use diagnostics::Diagnostics;
pub use hit_test::{EventSource, HitTarget, HitTestFlags, HitTestRegion, HitTester, QueryReply};
pub use input::{AckResult, InputEvent};
pub use router::{InputEventRouter, RouterConfig, TouchEmulator};
pub use utils::error::{Result, RouterError};
pub use view::{FrameSinkId, FrameViewRegistry, View, ViewObserver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
