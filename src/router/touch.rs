//! Touch targeting and ordered touch acks
//!
//! The first touch of a sequence is hit tested; every later touch goes to
//! the same target until the last finger lifts.

use std::collections::BTreeMap;
use std::rc::Rc;

use kurbo::{Affine, Point};

use super::{AckEntry, InputEventRouter, MarkAcked, TouchEventSource};
use crate::hit_test::{EventSource, TargetResult};
use crate::input::{AckResult, InputEvent, TouchEvent, TouchEventKind};
use crate::view::{FrameSinkId, View};

impl InputEventRouter {
    pub(super) fn find_touch_target(&mut self, root: &Rc<dyn View>, event: &TouchEvent) -> TargetResult {
        if !self.touch_sequence.begin_if_idle(event) {
            return TargetResult::use_latch();
        }
        self.find_view_at_location(root, event.first_position(), EventSource::Touch)
    }

    pub(super) fn dispatch_touch_event(
        &mut self,
        root: &Rc<dyn View>,
        target: Option<Rc<dyn View>>,
        event: TouchEvent,
        location: Option<Point>,
        source: TouchEventSource,
    ) {
        debug_assert_ne!(event.kind, TouchEventKind::ScrollStarted);
        let root_id = root.frame_sink_id();

        let is_sequence_start = self
            .touch_sequence
            .on_dispatch(&event, target.as_ref().map(|t| t.frame_sink_id()));
        if is_sequence_start {
            if let Some(target) = &target {
                self.gesture_targets
                    .insert(event.unique_touch_event_id, target.frame_sink_id());
            }
        }

        let latched_id = self.touch_sequence.target();
        let latched = self.view(latched_id);
        if let (Some(id), None) = (latched_id, &latched) {
            self.diagnostics.destroyed_touch_target += 1;
            log::error!("touch event routed to destroyed target {id}");
            debug_assert!(false, "touch target {id} is no longer registered");
            self.touch_sequence.clear_target();
        }

        let Some(touch_target) = latched else {
            let drained = self.ack_queue.enqueue_preacked(
                event,
                None,
                root_id,
                source,
                AckResult::NoConsumerExists,
            );
            self.forward_touch_acks(drained);
            return;
        };
        let target_id = touch_target.frame_sink_id();

        let transform = self.transform_between(root_id, target_id).unwrap_or_else(|| {
            // Without a full transform, translate by the first touch's
            // offset.
            let first = event.first_position();
            let in_target = location.unwrap_or_else(|| self.root_point_to_view(&touch_target, first));
            Affine::translate(in_target - first)
        });

        if is_sequence_start {
            self.cancel_scroll_bubbling_if_conflicting(&touch_target);
        }

        self.ack_queue
            .enqueue(event.clone(), Some(target_id), root_id, source);
        self.note_ack_queue_len();

        let mut routed = event;
        routed.transform_positions(transform);
        touch_target.dispatch(&InputEvent::Touch(routed));

        self.touch_sequence.end_if_released();
    }

    /// Ack from `target` for a touch event it was sent
    pub fn on_touch_event_ack(&mut self, event: &TouchEvent, result: AckResult, target: &Rc<dyn View>) {
        match self.ack_queue.mark_acked(event, result, target.frame_sink_id()) {
            MarkAcked::Queued(drained) => self.forward_touch_acks(drained),
            // Sent to the view without going through the router.
            MarkAcked::Bypassed => {
                log::warn!(
                    "ack for unqueued touch #{} from {}",
                    event.unique_touch_event_id,
                    target.frame_sink_id()
                );
                target.on_ack(&InputEvent::Touch(event.clone()), result);
            }
        }
    }

    /// Hand acked entries to their roots, unless the emulator claims them
    pub(super) fn forward_touch_acks(&mut self, entries: Vec<AckEntry>) {
        for entry in entries {
            let claimed = self
                .touch_emulator
                .as_mut()
                .is_some_and(|emulator| emulator.handle_touch_event_ack(&entry.event, entry.result));
            if claimed {
                continue;
            }
            match self.registry.lookup(entry.root) {
                Some(root) => root.on_ack(&InputEvent::Touch(entry.event), entry.result),
                None => log::debug!(
                    "dropping ack of touch #{} for unregistered root {}",
                    entry.event.unique_touch_event_id,
                    entry.root
                ),
            }
        }
    }

    fn note_ack_queue_len(&mut self) {
        let len = self.ack_queue.len();
        if self.diagnostics.record_ack_queue_len(len) && len > self.config.ack_queue_warn_threshold {
            log::warn!("touch ack queue grew to {len} entries");
        }
    }

    /// Stop waiting for acks of the touch events still queued for `root`,
    /// e.g. when its gesture recognizer is reset
    pub fn ignore_unacked_touch_events(&mut self, root: &Rc<dyn View>) {
        debug_assert!(!root.is_child_frame());
        let mut per_target: BTreeMap<FrameSinkId, Vec<u32>> = BTreeMap::new();
        for entry in self.ack_queue.entries_for_root(root.frame_sink_id()) {
            if let Some(target) = entry.target {
                per_target
                    .entry(target)
                    .or_default()
                    .push(entry.event.unique_touch_event_id);
            }
        }
        for (target, ids) in per_target {
            if let Some(view) = self.registry.lookup(target) {
                view.ignore_touch_event_acks(&ids);
            }
        }
    }

    /// A touch start (or first move) was consumed, so it will produce no
    /// gestures
    pub fn on_handled_touch_start_or_first_touch_move(&mut self, unique_touch_event_id: u32) {
        debug_assert_ne!(unique_touch_event_id, 0);
        self.gesture_targets.take(unique_touch_event_id);
    }
}
