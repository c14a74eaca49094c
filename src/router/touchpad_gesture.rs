//! Touchpad gesture targeting
//!
//! Touchpad scrolls arrive as wheel events, so only pinches, double taps and
//! fling cancels start a gesture latch here. Flings follow the wheel latch.

use std::rc::Rc;

use kurbo::Point;

use super::InputEventRouter;
use crate::hit_test::{EventSource, TargetResult};
use crate::input::{AckResult, GestureEvent, GestureKind, InputEvent};
use crate::view::View;

impl InputEventRouter {
    pub(super) fn find_touchpad_gesture_target(
        &mut self,
        root: &Rc<dyn View>,
        event: &GestureEvent,
    ) -> TargetResult {
        match event.kind {
            GestureKind::PinchBegin | GestureKind::FlingCancel | GestureKind::DoubleTap => {
                self.find_view_at_location(root, event.position, EventSource::Mouse)
            }
            _ => TargetResult::use_latch(),
        }
    }

    pub(super) fn dispatch_touchpad_gesture_event(
        &mut self,
        root: &Rc<dyn View>,
        target: Option<Rc<dyn View>>,
        event: GestureEvent,
        location: Option<Point>,
    ) {
        match event.kind {
            GestureKind::FlingStart => {
                self.dispatch_touchpad_fling_start(root, event);
                return;
            }
            GestureKind::FlingCancel => {
                if let Some(fling_target) = self.view(self.last_fling_start_target) {
                    let mut routed = event;
                    routed.position = self.root_point_to_view(&fling_target, routed.position);
                    fling_target.dispatch(&InputEvent::Gesture(routed));
                } else if let Some(target) = target {
                    let mut routed = event;
                    routed.position = location.unwrap_or(routed.position);
                    target.dispatch(&InputEvent::Gesture(routed));
                } else {
                    root.on_ack(&InputEvent::Gesture(event), AckResult::NoConsumerExists);
                }
                return;
            }
            _ => {}
        }

        if let Some(target) = &target {
            self.touchpad_gesture_target = Some(target.frame_sink_id());
            self.cancel_scroll_bubbling_if_conflicting(target);
        }

        let Some(gesture_target) = self.view(self.touchpad_gesture_target) else {
            root.on_ack(&InputEvent::Gesture(event), AckResult::NoConsumerExists);
            return;
        };

        let kind = event.kind;
        let mut routed = event;
        routed.position =
            location.unwrap_or_else(|| self.root_point_to_view(&gesture_target, routed.position));
        gesture_target.dispatch(&InputEvent::Gesture(routed));

        if matches!(kind, GestureKind::PinchEnd | GestureKind::DoubleTap) {
            self.touchpad_gesture_target = None;
        }
    }

    /// Touchpad flings continue the scroll of the wheel latch
    fn dispatch_touchpad_fling_start(&mut self, root: &Rc<dyn View>, event: GestureEvent) {
        let Some(wheel_target) = self.view(self.wheel_target) else {
            root.on_ack(&InputEvent::Gesture(event), AckResult::NoConsumerExists);
            return;
        };
        let mut routed = event;
        if let Some(transform) =
            self.transform_between(root.frame_sink_id(), wheel_target.frame_sink_id())
        {
            routed.position = transform * routed.position;
        }
        wheel_target.dispatch(&InputEvent::Gesture(routed));
        self.last_fling_start_target = Some(wheel_target.frame_sink_id());
    }
}
