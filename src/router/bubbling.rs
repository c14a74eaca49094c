//! Scroll bubbling between frames
//!
//! A child frame that cannot consume a scroll resends it here to continue
//! in an ancestor. One chain is open at a time; it remembers the child that
//! started it (the origin) and the ancestor currently scrolling (the
//! target).

use std::rc::Rc;

use super::{InputEventRouter, ScrollBubbling};
use crate::gesture::PinchSignal;
use crate::input::{GestureDevice, GestureEvent, GestureKind, InputEvent};
use crate::view::{is_ancestor, View};

impl InputEventRouter {
    /// Continue an unconsumed scroll of `resending` in its ancestor `target`.
    ///
    /// `event` is a scroll begin, update or end in root coordinates. Returns
    /// whether the event was taken over; `false` tells the caller to drop it.
    pub fn bubble_scroll_event(
        &mut self,
        target: &Rc<dyn View>,
        resending: &Rc<dyn View>,
        event: &GestureEvent,
    ) -> bool {
        debug_assert!(event.kind.is_scroll());
        let target_id = target.frame_sink_id();
        let resending_id = resending.frame_sink_id();

        let bubbling_view = if event.kind == GestureKind::ScrollBegin {
            self.stopped_fling_for_bubbling = false;
            // A target busy with its own gestures would mix two scrolls.
            let busy = [
                self.touchscreen_gesture_target,
                self.touchpad_gesture_target,
                self.touch_sequence.target(),
            ];
            if busy.contains(&Some(target_id)) {
                return false;
            }

            let origin = match self.bubbling {
                // Only the current target may push the chain further up.
                Some(bubbling) if bubbling.target != resending_id => return false,
                Some(bubbling) => {
                    if let Some(previous) = self.registry.lookup(bubbling.target) {
                        let scroll_end = self.gesture_event_in_target(event, &previous);
                        self.send_gesture_scroll_end(&previous, &scroll_end);
                    }
                    bubbling.origin
                }
                None => Some(resending_id),
            };
            self.bubbling = Some(ScrollBubbling {
                target: target_id,
                origin,
                device: event.device,
            });
            Rc::clone(target)
        } else {
            // Acks can trail the end of a chain.
            let Some(bubbling) = self.bubbling else {
                return false;
            };
            // Scroll ends generated for intermediate targets stay there.
            if event.kind == GestureKind::ScrollEnd && bubbling.origin != Some(resending_id) {
                return true;
            }
            let Some(view) = self.registry.lookup(bubbling.target) else {
                self.bubbling = None;
                return false;
            };
            view
        };

        let bubbling_id = bubbling_view.frame_sink_id();
        if resending_id == bubbling_id {
            self.diagnostics.bubbled_to_same_view += 1;
            log::error!(
                "{:?} from view {resending_id} bubbled back to itself",
                event.kind
            );
            self.cancel_scroll_bubbling();
            return false;
        }

        let to_root =
            event.device == GestureDevice::Touchscreen && !bubbling_view.is_child_frame();
        if to_root {
            match event.kind {
                GestureKind::ScrollBegin => {
                    self.apply_pinch_signal(PinchSignal::StartBubblingToRoot);
                    // A diverted pinch already opened a scroll in the root.
                    if self.pinch.is_in_pinch() {
                        return true;
                    }
                }
                GestureKind::ScrollEnd => {
                    self.apply_pinch_signal(PinchSignal::StopBubblingToRoot)
                }
                _ => {}
            }
        }

        let routed = self.gesture_event_in_target(event, &bubbling_view);
        bubbling_view.dispatch(&InputEvent::Gesture(routed));

        if event.kind == GestureKind::ScrollEnd {
            self.bubbling = None;
        }
        true
    }

    /// Close the open bubbling chain, if any, with a scroll end to its target
    pub fn cancel_scroll_bubbling(&mut self) {
        let Some(bubbling) = self.bubbling.take() else {
            return;
        };
        let Some(view) = self.registry.lookup(bubbling.target) else {
            return;
        };
        log::debug!("cancelling scroll bubbling to {}", bubbling.target);
        self.send_gesture_scroll_end_for_device(&view, bubbling.device);
        if bubbling.device == GestureDevice::Touchscreen && !view.is_child_frame() {
            self.apply_pinch_signal(PinchSignal::StopBubblingToRoot);
        }
    }

    /// Cancel bubbling when `target` is about to start its own scroll
    /// between the chain's origin and its target
    pub fn cancel_scroll_bubbling_if_conflicting(&mut self, target: &Rc<dyn View>) {
        let Some(ScrollBubbling {
            target: bubbling_target,
            origin: Some(origin),
            ..
        }) = self.bubbling
        else {
            return;
        };
        let Some(origin) = self.registry.lookup(origin) else {
            return;
        };
        if is_ancestor(&origin, target.frame_sink_id(), Some(bubbling_target)) {
            self.cancel_scroll_bubbling();
        }
    }

    /// `view` is being detached from its parent; a chain started at or
    /// below it cannot continue
    pub fn will_detach_child_view(&mut self, view: &Rc<dyn View>) {
        let Some(ScrollBubbling {
            origin: Some(origin_id),
            ..
        }) = self.bubbling
        else {
            return;
        };
        let detaching = view.frame_sink_id();
        let affected = origin_id == detaching
            || self
                .registry
                .lookup(origin_id)
                .is_some_and(|origin| is_ancestor(&origin, detaching, None));
        if affected {
            self.cancel_scroll_bubbling();
        }
    }

    /// Stop the fling feeding the open bubbling chain; its scroll updates
    /// are no longer consumed by the bubbling target
    pub fn stop_fling(&mut self) {
        if self.bubbling.is_none() {
            return;
        }
        let Some(fling_target) = self.view(self.last_fling_start_target) else {
            return;
        };
        fling_target.stop_fling();
        self.stopped_fling_for_bubbling = true;
    }

    /// `event` (in root coordinates) moved into `view`'s coordinates
    fn gesture_event_in_target(&self, event: &GestureEvent, view: &Rc<dyn View>) -> GestureEvent {
        let mut routed = event.clone();
        routed.position = self.root_point_to_view(view, event.position);
        routed
    }
}
