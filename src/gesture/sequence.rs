//! Touch sequence and gesture target bookkeeping

use std::collections::HashMap;

use crate::input::{TouchEvent, TouchEventKind};
use crate::view::FrameSinkId;

/// The touch sequence currently in progress on a router
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchSequence {
    active_touches: u32,
    target: Option<FrameSinkId>,
}

impl TouchSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<FrameSinkId> {
        self.target
    }

    pub fn active_touches(&self) -> u32 {
        self.active_touches
    }

    /// Whether `event` opens a new sequence and has to be hit tested.
    ///
    /// Counts the event's pressed points when it does.
    pub fn begin_if_idle(&mut self, event: &TouchEvent) -> bool {
        if self.active_touches != 0 || event.kind != TouchEventKind::Start {
            return false;
        }
        self.active_touches += event.changed_touch_count();
        true
    }

    /// Count pressed points of a start that did not go through targeting
    pub fn add_pressed(&mut self, event: &TouchEvent) {
        if event.kind == TouchEventKind::Start {
            self.active_touches += event.changed_touch_count();
        }
    }

    /// Update the sequence for an event about to be dispatched to `target`.
    ///
    /// Returns `true` when this event latches the sequence's target.
    pub fn on_dispatch(&mut self, event: &TouchEvent, target: Option<FrameSinkId>) -> bool {
        let is_sequence_start = self.target.is_none() && target.is_some();
        if is_sequence_start {
            self.target = target;
        } else {
            self.add_pressed(event);
        }

        // The count may have been reset by a destroyed target in between.
        if matches!(event.kind, TouchEventKind::End | TouchEventKind::Cancel)
            && self.active_touches > 0
        {
            let released = event.changed_touch_count();
            debug_assert!(released <= self.active_touches);
            self.active_touches = self.active_touches.saturating_sub(released);
        }
        is_sequence_start
    }

    /// Release the latch once no touch is left down
    pub fn end_if_released(&mut self) {
        if self.active_touches == 0 {
            self.target = None;
        }
    }

    /// Drop the latch without touching the count
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Gesture target chosen for each touch sequence at its start, keyed by the
/// sequence's `unique_touch_event_id`.
///
/// `None` values are placeholders for targets destroyed before their
/// gestures arrived.
#[derive(Debug, Clone, Default)]
pub struct GestureTargetMap {
    targets: HashMap<u32, Option<FrameSinkId>>,
}

impl GestureTargetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unique_touch_event_id: u32, target: FrameSinkId) {
        let previous = self.targets.insert(unique_touch_event_id, Some(target));
        debug_assert!(
            previous.is_none(),
            "touch sequence {unique_touch_event_id} mapped twice"
        );
    }

    /// Take the entry of a sequence.
    ///
    /// The outer `None` means the sequence was never mapped; `Some(None)`
    /// means its target has been destroyed.
    pub fn take(&mut self, unique_touch_event_id: u32) -> Option<Option<FrameSinkId>> {
        self.targets.remove(&unique_touch_event_id)
    }

    pub fn contains(&self, unique_touch_event_id: u32) -> bool {
        self.targets.contains_key(&unique_touch_event_id)
    }

    /// Replace every mapping to `view` by a placeholder
    pub fn scrub(&mut self, view: FrameSinkId) {
        for target in self.targets.values_mut() {
            if *target == Some(view) {
                *target = None;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{TouchPoint, TouchPointState};
    use kurbo::Point;

    fn id(n: u32) -> FrameSinkId {
        FrameSinkId::new(n, 1)
    }

    fn second_finger_down(event_id: u32) -> TouchEvent {
        TouchEvent::new(
            TouchEventKind::Start,
            event_id,
            vec![
                TouchPoint::new(0, TouchPointState::Stationary, Point::ZERO),
                TouchPoint::new(1, TouchPointState::Pressed, Point::ZERO),
            ],
        )
    }

    #[test]
    fn test_multi_touch_keeps_target() {
        let mut sequence = TouchSequence::new();
        let start = TouchEvent::start(1, Point::ZERO);
        assert!(sequence.begin_if_idle(&start));
        assert!(sequence.on_dispatch(&start, Some(id(2))));
        assert_eq!(sequence.active_touches(), 1);

        let second = second_finger_down(2);
        assert!(!sequence.begin_if_idle(&second));
        assert!(!sequence.on_dispatch(&second, None));
        assert_eq!(sequence.active_touches(), 2);
        assert_eq!(sequence.target(), Some(id(2)));

        let mut lift = TouchEvent::end(3, Point::ZERO);
        sequence.on_dispatch(&lift, None);
        sequence.end_if_released();
        assert_eq!(sequence.target(), Some(id(2)));

        lift.unique_touch_event_id = 4;
        sequence.on_dispatch(&lift, None);
        sequence.end_if_released();
        assert_eq!(sequence.active_touches(), 0);
        assert_eq!(sequence.target(), None);
    }

    #[test]
    fn test_release_after_reset_does_not_underflow() {
        let mut sequence = TouchSequence::new();
        let start = TouchEvent::start(1, Point::ZERO);
        sequence.begin_if_idle(&start);
        sequence.on_dispatch(&start, Some(id(2)));
        sequence.reset();

        sequence.on_dispatch(&TouchEvent::end(2, Point::ZERO), None);
        assert_eq!(sequence.active_touches(), 0);
    }

    #[test]
    fn test_move_is_not_a_sequence_start() {
        let mut sequence = TouchSequence::new();
        assert!(!sequence.begin_if_idle(&TouchEvent::moved(1, Point::ZERO)));
        assert_eq!(sequence.active_touches(), 0);
    }

    #[test]
    fn test_gesture_map_scrub_keeps_sequence_ids() {
        let mut map = GestureTargetMap::new();
        map.insert(7, id(2));
        map.insert(8, id(3));
        map.scrub(id(2));

        assert_eq!(map.len(), 2);
        assert_eq!(map.take(7), Some(None));
        assert_eq!(map.take(8), Some(Some(id(3))));
        assert_eq!(map.take(9), None);
        assert!(map.is_empty());
    }
}
