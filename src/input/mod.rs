//! Input event model consumed and produced by the router
//!
//! Events arrive in root-view coordinates and leave in target-view
//! coordinates. Only the fields routing depends on are modelled.

mod ack;
mod events;

pub use ack::AckResult;
pub use events::{
    GestureDevice, GestureEvent, GestureKind, InertialPhase, InputEvent, Modifiers, MouseButton,
    MouseButtons, MouseEvent, MouseEventKind, ScrollData, ScrollUnits, TouchAction, TouchEvent,
    TouchEventKind, TouchPoint, TouchPointState, WheelEvent, WheelPhase,
};
