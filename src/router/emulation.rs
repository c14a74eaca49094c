//! Touch emulation hooks
//!
//! An emulation layer turns mouse input into touch input (devtools device
//! mode). It sees every system touch event and ack first, and feeds the
//! touches and gestures it synthesizes back through the router.

use std::rc::Rc;

#[cfg(test)]
use mockall::automock;

use super::{InputEventRouter, TouchEventSource};
use crate::input::{AckResult, GestureEvent, TouchEvent};
use crate::view::{FrameSinkId, View};

/// Touch emulation layer as seen by the router
#[cfg_attr(test, automock)]
pub trait TouchEmulator {
    fn enabled(&self) -> bool;

    /// Returns `true` if the emulator swallowed a system touch event
    fn handle_touch_event(&mut self, event: &TouchEvent) -> bool;

    /// Returns `true` if the ack belonged to an emulated touch and was
    /// consumed by the emulator
    fn handle_touch_event_ack(&mut self, event: &TouchEvent, result: AckResult) -> bool;

    fn on_view_destroyed(&mut self, view: FrameSinkId);
}

impl InputEventRouter {
    pub fn set_touch_emulator(&mut self, emulator: Box<dyn TouchEmulator>) {
        self.touch_emulator = Some(emulator);
    }

    pub fn take_touch_emulator(&mut self) -> Option<Box<dyn TouchEmulator>> {
        self.touch_emulator.take()
    }

    pub fn has_touch_emulator(&self) -> bool {
        self.touch_emulator.is_some()
    }

    pub(crate) fn touch_emulation_enabled(&self) -> bool {
        self.touch_emulator.as_ref().is_some_and(|e| e.enabled())
    }

    /// Dispatch a touch event synthesized by the emulator to `target`.
    ///
    /// The event is routed as if it arrived at the root the mouse last moved
    /// over, or at `target` when the mouse has not moved yet.
    pub fn forward_emulated_touch_event(&mut self, event: TouchEvent, target: &Rc<dyn View>) {
        let target_id = target.frame_sink_id();
        debug_assert!(self.registry.contains(target_id));
        let root_id = self.last_mouse_move_root.unwrap_or(target_id);
        self.last_emulated_event_root = Some(root_id);
        let Some(root) = self.registry.lookup(root_id) else {
            log::warn!("emulated touch for unregistered root {root_id} dropped");
            return;
        };

        self.touch_sequence.add_pressed(&event);
        let location = self.root_point_to_view(target, event.first_position());
        self.dispatch_touch_event(
            &root,
            Some(Rc::clone(target)),
            event,
            Some(location),
            TouchEventSource::Emulated,
        );
    }

    /// Dispatch a gesture synthesized by the emulator's gesture recognizer
    pub fn forward_emulated_gesture_event(&mut self, event: GestureEvent) {
        // The root may have gone away since the touch that produced this.
        let Some(root) = self.view(self.last_emulated_event_root) else {
            return;
        };
        let position = event.position;
        self.dispatch_touchscreen_gesture_event(&root, None, event, Some(position));
    }
}
