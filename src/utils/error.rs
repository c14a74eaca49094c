//! Error types for the input event router

use thiserror::Error;

use crate::gesture::{PinchSignal, PinchState};
use crate::input::GestureDevice;
use crate::view::FrameSinkId;

/// Main error type for routing operations
///
/// Expected "no consumer" outcomes are not errors; they are reported to the
/// root view as [`AckResult::NoConsumerExists`](crate::input::AckResult).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouterError {
    /// A view was registered under an id that already has a live owner
    #[error("frame sink {0} is already registered")]
    AlreadyRegistered(FrameSinkId),
    /// The invalid frame sink id can never own a view
    #[error("cannot register a view under the invalid frame sink id")]
    InvalidFrameSinkId,
    /// Gesture events from this device are never routed through the router
    #[error("gesture device {0:?} cannot be routed")]
    UnsupportedGestureDevice(GestureDevice),
    /// The pinch state machine received a signal that is illegal in its state
    #[error("illegal pinch transition: {signal:?} in state {state:?}")]
    IllegalPinchTransition {
        state: PinchState,
        signal: PinchSignal,
    },
}

/// Convenience Result type for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouterError::AlreadyRegistered(FrameSinkId::new(3, 7));
        assert_eq!(err.to_string(), "frame sink 3:7 is already registered");

        let err = RouterError::IllegalPinchTransition {
            state: PinchState::None,
            signal: PinchSignal::StopPinch,
        };
        assert!(err.to_string().contains("StopPinch"));
    }
}
