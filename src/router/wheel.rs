//! Mouse wheel targeting: one hit test per scroll, latched until it ends

use std::rc::Rc;

use kurbo::Point;

use super::InputEventRouter;
use crate::hit_test::{EventSource, TargetResult};
use crate::input::{AckResult, InputEvent, WheelEvent, WheelPhase};
use crate::view::View;

impl InputEventRouter {
    pub(super) fn find_wheel_target(&mut self, root: &Rc<dyn View>, event: &WheelEvent) -> TargetResult {
        if root.is_mouse_locked() {
            let Some(target) = self.view(root.mouse_lock_widget()) else {
                return TargetResult::none(true);
            };
            return match self.hit_tester.transform_point(
                root.frame_sink_id(),
                target.frame_sink_id(),
                event.position,
            ) {
                Some(location) => TargetResult::found(target, location, true),
                None => TargetResult::none(true),
            };
        }

        if event.phase == WheelPhase::Began {
            return self.find_view_at_location(root, event.position, EventSource::Mouse);
        }
        TargetResult::use_latch()
    }

    pub(super) fn dispatch_wheel_event(
        &mut self,
        root: &Rc<dyn View>,
        target: Option<Rc<dyn View>>,
        event: WheelEvent,
        location: Option<Point>,
    ) {
        let mut target = target;
        if !root.is_mouse_locked() {
            if event.phase == WheelPhase::Began {
                self.wheel_target = target.as_ref().map(|t| t.frame_sink_id());
            } else if let Some(latched) = self.view(self.wheel_target) {
                debug_assert!(target.is_none());
                target = Some(latched);
            } else if event.is_end() && self.bubbling.is_some() {
                // The latched view is gone and will never see this end, so
                // close the bubbled scroll here.
                self.cancel_scroll_bubbling();
            }
        }

        let Some(target) = target else {
            root.on_ack(&InputEvent::Wheel(event), AckResult::NoConsumerExists);
            return;
        };

        let mut routed = event.clone();
        routed.position =
            location.unwrap_or_else(|| self.root_point_to_view(&target, event.position));
        target.dispatch(&InputEvent::Wheel(routed));

        if event.is_end() {
            self.wheel_target = None;
        }
    }
}
