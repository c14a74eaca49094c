//! Per-sequence gesture state
//!
//! The touchscreen pinch machine decides when diverted pinches need a
//! wrapping scroll sequence; the touch sequence and gesture target map track
//! which frame a touch sequence and the gestures it produces belong to.

mod pinch;
mod sequence;

pub use pinch::{PinchSignal, PinchState, TouchscreenPinchState};
pub use sequence::{GestureTargetMap, TouchSequence};
