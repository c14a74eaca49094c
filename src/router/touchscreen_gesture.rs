//! Touchscreen gesture targeting and pinch diversion
//!
//! Gestures of a touch sequence go to the frame its touch start was sent
//! to, looked up in the gesture target map when the sequence's TapDown
//! arrives. Pinches are handled by the root, so a pinch over a child frame
//! that allows zooming is diverted there, wrapped in a synthetic scroll
//! sequence if the root is not already scrolling.

use std::rc::Rc;

use kurbo::{Point, Vec2};

use super::InputEventRouter;
use crate::gesture::PinchSignal;
use crate::hit_test::{EventSource, TargetResult};
use crate::input::{
    AckResult, GestureDevice, GestureEvent, GestureKind, InertialPhase, InputEvent, ScrollData,
    ScrollUnits, TouchAction,
};
use crate::view::{FrameSinkId, View};

impl InputEventRouter {
    pub(super) fn find_touchscreen_gesture_target(
        &mut self,
        root: &Rc<dyn View>,
        event: &GestureEvent,
    ) -> TargetResult {
        // Dispatch sends pinches to the root anyway.
        if event.kind.is_pinch() {
            return TargetResult::found(Rc::clone(root), event.position, true);
        }

        // No touch sequence behind it, so nothing is latched.
        if event.unique_touch_event_id == 0 {
            return self.find_view_at_location(root, event.position, EventSource::Touch);
        }

        TargetResult::use_latch()
    }

    pub(crate) fn dispatch_touchscreen_gesture_event(
        &mut self,
        root: &Rc<dyn View>,
        target: Option<Rc<dyn View>>,
        event: GestureEvent,
        location: Option<Point>,
    ) {
        if event.kind == GestureKind::PinchBegin {
            self.begin_touchscreen_pinch(root, &event);
        }

        if self.pinch.is_in_pinch() {
            root.dispatch(&InputEvent::Gesture(event.clone()));
            if event.kind == GestureKind::PinchEnd {
                let send_scroll_end = self.pinch.needs_wrapping_scroll_sequence();
                self.apply_pinch_signal(PinchSignal::StopPinch);
                if send_scroll_end {
                    self.send_gesture_scroll_end(root, &event);
                }
            }
            return;
        }

        if event.kind == GestureKind::FlingCancel {
            if let Some(fling_target) = self.view(self.last_fling_start_target) {
                fling_target.dispatch(&InputEvent::Gesture(event));
                return;
            }
        }

        let is_gesture_start = event.kind == GestureKind::TapDown;
        let mut target = target;
        let mut fallback_location = None;

        if event.unique_touch_event_id == 0 {
            debug_assert!(target.is_some(), "unsequenced gesture without a hit-test target");
            fallback_location = location;
        } else if is_gesture_start {
            match self.gesture_targets.take(event.unique_touch_event_id) {
                None => {
                    // Long-standing anomaly with no known cause: recover with
                    // a synchronous hit test, ignoring any need to query.
                    self.diagnostics.no_gesture_target += 1;
                    log::error!(
                        "gesture sequence start #{} detected with no target available",
                        event.unique_touch_event_id
                    );
                    let result =
                        self.find_view_at_location(root, event.position, EventSource::Touch);
                    target = result.view;
                    fallback_location = result.location;
                }
                Some(mapped) => {
                    target = self.view(mapped);
                    if let Some(target) = &target {
                        self.cancel_scroll_bubbling_if_conflicting(target);
                    }
                }
            }
        }

        if event.unique_touch_event_id == 0 || is_gesture_start {
            let moved_recently = if is_gesture_start {
                target.as_ref().is_some_and(|t| t.screen_rect_is_unstable())
            } else {
                self.touchscreen_gesture_target_moved_recently
            };
            self.set_touchscreen_gesture_target(
                target.as_ref().map(|t| t.frame_sink_id()),
                moved_recently,
            );
        }

        // An unregistered target would never report its destruction.
        let Some(gesture_target) = self.view(self.touchscreen_gesture_target) else {
            self.set_touchscreen_gesture_target(None, false);
            root.on_ack(&InputEvent::Gesture(event), AckResult::NoConsumerExists);
            return;
        };

        let mut routed = event.clone();
        if self.touchscreen_gesture_target_moved_recently {
            routed.target_frame_moved_recently = true;
        }
        routed.position = fallback_location
            .unwrap_or_else(|| self.root_point_to_view(&gesture_target, event.position));

        if self.events_being_flushed {
            gesture_target.force_set_touch_action_auto();
        }
        gesture_target.dispatch(&InputEvent::Gesture(routed));

        if event.kind == GestureKind::FlingStart {
            self.last_fling_start_target = Some(gesture_target.frame_sink_id());
        }
        // The user has lifted their last finger.
        if event.kind.ends_touchscreen_sequence() {
            self.set_touchscreen_gesture_target(None, false);
        }
    }

    fn begin_touchscreen_pinch(&mut self, root: &Rc<dyn View>, event: &GestureEvent) {
        if self.touchscreen_gesture_target == Some(root.frame_sink_id()) {
            self.apply_pinch_signal(PinchSignal::StartPinchInRoot);
            return;
        }
        // A child that forbids zooming keeps the pinch; its touch-action
        // filter drops it.
        if !self.is_pinch_allowed_in(self.touchscreen_gesture_target) {
            return;
        }

        // The root may not have assessed a touch-action for this sequence.
        root.force_set_touch_action_auto();
        if self.pinch.needs_wrapping_scroll_sequence() {
            self.send_gesture_scroll_begin(root, event);
        }
        self.apply_pinch_signal(PinchSignal::StartPinchInChild);
    }

    fn is_pinch_allowed_in(&self, target: Option<FrameSinkId>) -> bool {
        self.view(target)
            .and_then(|view| view.active_touch_action())
            .unwrap_or(TouchAction::empty())
            .contains(TouchAction::PINCH_ZOOM)
    }

    pub(super) fn set_touchscreen_gesture_target(
        &mut self,
        target: Option<FrameSinkId>,
        moved_recently: bool,
    ) {
        self.touchscreen_gesture_target = target;
        self.touchscreen_gesture_target_moved_recently = moved_recently;
    }

    /// Synthetic scroll begin opening a diverted pinch
    pub(super) fn send_gesture_scroll_begin(&self, view: &Rc<dyn View>, event: &GestureEvent) {
        debug_assert_eq!(event.kind, GestureKind::PinchBegin);
        debug_assert_eq!(event.device, GestureDevice::Touchscreen);
        let mut scroll_begin = event.with_kind(GestureKind::ScrollBegin);
        scroll_begin.scroll = ScrollData {
            delta: Vec2::ZERO,
            units: ScrollUnits::PrecisePixels,
            inertial_phase: InertialPhase::UnknownMomentum,
        };
        view.dispatch(&InputEvent::Gesture(scroll_begin));
    }

    /// Synthetic scroll end matching `event`, a scroll begin or pinch end
    pub(super) fn send_gesture_scroll_end(&self, view: &Rc<dyn View>, event: &GestureEvent) {
        let mut scroll_end = event.with_kind(GestureKind::ScrollEnd);
        scroll_end.scroll = match event.kind {
            GestureKind::ScrollBegin => ScrollData {
                delta: Vec2::ZERO,
                ..event.scroll
            },
            _ => {
                debug_assert_eq!(event.kind, GestureKind::PinchEnd);
                debug_assert_eq!(event.device, GestureDevice::Touchscreen);
                ScrollData::default()
            }
        };
        view.dispatch(&InputEvent::Gesture(scroll_end));
    }

    /// Bare synthetic scroll end for `device`
    pub(super) fn send_gesture_scroll_end_for_device(&self, view: &Rc<dyn View>, device: GestureDevice) {
        let scroll_end = GestureEvent::new(GestureKind::ScrollEnd, device, Point::ZERO);
        view.dispatch(&InputEvent::Gesture(scroll_end));
    }
}
