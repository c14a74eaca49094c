//! Asynchronous target resolution
//!
//! When the compositor cannot decide which frame owns a point, the renderer
//! behind the candidate view has to be asked. Only one such query is in
//! flight per targeting sequence; later events of that sequence wait behind
//! it so they keep their order, while other sequences carry on.

use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use futures::future::{self, FutureExt, LocalBoxFuture};
use kurbo::Point;

use super::QueryReply;
use crate::input::{GestureDevice, InputEvent};
use crate::view::{FrameSinkId, View};

/// Independent event streams; ordering is only kept within one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetingSequence {
    Mouse,
    Wheel,
    Touch,
    TouchscreenGesture,
    TouchpadGesture,
}

impl TargetingSequence {
    pub const ALL: [TargetingSequence; 5] = [
        Self::Mouse,
        Self::Wheel,
        Self::Touch,
        Self::TouchscreenGesture,
        Self::TouchpadGesture,
    ];

    /// Sequence `event` belongs to; `None` for gestures from devices that
    /// are never hit tested.
    pub fn of(event: &InputEvent) -> Option<Self> {
        match event {
            InputEvent::Mouse(_) => Some(Self::Mouse),
            InputEvent::Wheel(_) => Some(Self::Wheel),
            InputEvent::Touch(_) => Some(Self::Touch),
            InputEvent::Gesture(gesture) => match gesture.device {
                GestureDevice::Touchscreen => Some(Self::TouchscreenGesture),
                GestureDevice::Touchpad => Some(Self::TouchpadGesture),
                _ => None,
            },
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A query that completed, ready for dispatch
pub struct ResolvedTarget {
    pub root: Weak<dyn View>,
    pub event: InputEvent,
    /// View the query was sent to
    pub asked: FrameSinkId,
    /// Event position in `asked`'s coordinates
    pub location: Point,
    /// `None` when `asked` claimed the point itself
    pub reply: Option<QueryReply>,
}

/// Event waiting behind an in-flight query
pub struct DeferredEvent {
    pub root: Weak<dyn View>,
    pub event: InputEvent,
}

/// A finished check of a synchronous hit-test result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub expected: FrameSinkId,
    pub actual: FrameSinkId,
}

struct PendingQuery {
    root: Weak<dyn View>,
    root_id: FrameSinkId,
    event: InputEvent,
    asked: FrameSinkId,
    location: Point,
    reply: LocalBoxFuture<'static, Option<QueryReply>>,
}

struct PendingVerification {
    root_id: FrameSinkId,
    expected: FrameSinkId,
    reply: LocalBoxFuture<'static, Option<QueryReply>>,
}

#[derive(Default)]
struct SequenceQueue {
    in_flight: Option<PendingQuery>,
    waiting: VecDeque<(FrameSinkId, DeferredEvent)>,
}

/// Per-sequence bookkeeping of asynchronous target queries
#[derive(Default)]
pub struct EventTargeter {
    queues: [SequenceQueue; 5],
    verifications: Vec<PendingVerification>,
}

impl EventTargeter {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, sequence: TargetingSequence) -> &SequenceQueue {
        &self.queues[sequence.index()]
    }

    fn queue_mut(&mut self, sequence: TargetingSequence) -> &mut SequenceQueue {
        &mut self.queues[sequence.index()]
    }

    /// Whether a new event of `sequence` has to wait
    pub fn is_blocked(&self, sequence: TargetingSequence) -> bool {
        let queue = self.queue(sequence);
        queue.in_flight.is_some() || !queue.waiting.is_empty()
    }

    pub fn has_query_in_flight(&self, sequence: TargetingSequence) -> bool {
        self.queue(sequence).in_flight.is_some()
    }

    /// Park `event` until the sequence's earlier events are dispatched
    pub fn defer(&mut self, sequence: TargetingSequence, root: &Rc<dyn View>, event: InputEvent) {
        log::debug!("deferring {} behind pending target query", event.name());
        self.queue_mut(sequence).waiting.push_back((
            root.frame_sink_id(),
            DeferredEvent {
                root: Rc::downgrade(root),
                event,
            },
        ));
    }

    /// Ask `view` which frame owns `location` (in `view`'s coordinates)
    pub fn begin_query(
        &mut self,
        sequence: TargetingSequence,
        root: &Rc<dyn View>,
        event: InputEvent,
        view: &Rc<dyn View>,
        location: Point,
    ) {
        debug_assert!(
            !self.has_query_in_flight(sequence),
            "second target query for {sequence:?}"
        );
        log::debug!(
            "querying view {} for the target of {}",
            view.frame_sink_id(),
            event.name()
        );
        self.queue_mut(sequence).in_flight = Some(PendingQuery {
            root: Rc::downgrade(root),
            root_id: root.frame_sink_id(),
            event,
            asked: view.frame_sink_id(),
            location,
            reply: view.query_target(location),
        });
    }

    /// Drive the sequence's in-flight query.
    ///
    /// `Ready(None)` means nothing is in flight.
    pub fn poll_query(
        &mut self,
        sequence: TargetingSequence,
        cx: &mut Context<'_>,
    ) -> Poll<Option<ResolvedTarget>> {
        let queue = self.queue_mut(sequence);
        let Some(pending) = queue.in_flight.as_mut() else {
            return Poll::Ready(None);
        };
        let reply = match pending.reply.poll_unpin(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(reply) => reply,
        };
        let Some(pending) = queue.in_flight.take() else {
            return Poll::Ready(None);
        };
        Poll::Ready(Some(ResolvedTarget {
            root: pending.root,
            event: pending.event,
            asked: pending.asked,
            location: pending.location,
            reply,
        }))
    }

    /// Next parked event, once no query of the sequence is in flight
    pub fn next_deferred(&mut self, sequence: TargetingSequence) -> Option<DeferredEvent> {
        let queue = self.queue_mut(sequence);
        if queue.in_flight.is_some() {
            return None;
        }
        queue.waiting.pop_front().map(|(_, deferred)| deferred)
    }

    /// Cross-check a synchronous result against the renderer of `root`
    pub fn verify(&mut self, root: &Rc<dyn View>, expected: FrameSinkId, point: Point) {
        self.verifications.push(PendingVerification {
            root_id: root.frame_sink_id(),
            expected,
            reply: root.query_target(point),
        });
    }

    /// Collect finished verifications
    pub fn poll_verifications(&mut self, cx: &mut Context<'_>) -> Vec<Verification> {
        let mut finished = Vec::new();
        self.verifications.retain_mut(|pending| match pending.reply.poll_unpin(cx) {
            Poll::Pending => true,
            Poll::Ready(reply) => {
                finished.push(Verification {
                    expected: pending.expected,
                    actual: reply.map_or(pending.root_id, |r| r.frame_sink_id),
                });
                false
            }
        });
        finished
    }

    /// Forget `id` as a root and as a query recipient.
    ///
    /// Events of a destroyed root are dropped. A query sent to a destroyed
    /// view resolves to the root at the event's root position.
    pub fn view_will_be_destroyed(&mut self, id: FrameSinkId) {
        for queue in &mut self.queues {
            if queue.in_flight.as_ref().is_some_and(|q| q.root_id == id) {
                queue.in_flight = None;
            }
            if let Some(pending) = queue.in_flight.as_mut().filter(|q| q.asked == id) {
                log::debug!("target query recipient {id} destroyed, falling back to root");
                pending.asked = pending.root_id;
                pending.location = pending.event.position();
                pending.reply = future::ready(None).boxed_local();
            }
            queue.waiting.retain(|(root_id, _)| *root_id != id);
        }
        self.verifications
            .retain(|v| v.root_id != id && v.expected != id);
    }

    /// Whether any event is waiting on a query
    pub fn has_events_pending_dispatch(&self) -> bool {
        self.queues
            .iter()
            .any(|q| q.in_flight.is_some() || !q.waiting.is_empty())
    }

    /// Number of events parked behind queries
    pub fn deferred_count(&self) -> usize {
        self.queues.iter().map(|q| q.waiting.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{GestureEvent, GestureKind, MouseEvent, WheelEvent, WheelPhase};
    use crate::testing::{TestView, sink};
    use futures::task::noop_waker_ref;
    use kurbo::Vec2;

    fn cx() -> Context<'static> {
        Context::from_waker(noop_waker_ref())
    }

    #[test]
    fn test_sequence_of_events() {
        let mouse: InputEvent = MouseEvent::moved(Point::ZERO).into();
        assert_eq!(TargetingSequence::of(&mouse), Some(TargetingSequence::Mouse));
        let wheel: InputEvent =
            WheelEvent::new(Point::ZERO, Vec2::ZERO, WheelPhase::Began).into();
        assert_eq!(TargetingSequence::of(&wheel), Some(TargetingSequence::Wheel));
        let autoscroll: InputEvent = GestureEvent::new(
            GestureKind::ScrollBegin,
            GestureDevice::SyntheticAutoscroll,
            Point::ZERO,
        )
        .into();
        assert_eq!(TargetingSequence::of(&autoscroll), None);
    }

    #[test]
    fn test_query_blocks_only_its_sequence() {
        let root: Rc<dyn View> = TestView::root(1);
        let mut targeter = EventTargeter::new();
        let event: InputEvent = MouseEvent::down(Point::new(5.0, 5.0)).into();
        targeter.begin_query(TargetingSequence::Mouse, &root, event, &root, Point::new(5.0, 5.0));

        assert!(targeter.is_blocked(TargetingSequence::Mouse));
        assert!(!targeter.is_blocked(TargetingSequence::Touch));
        assert!(targeter.has_events_pending_dispatch());

        let resolved = match targeter.poll_query(TargetingSequence::Mouse, &mut cx()) {
            Poll::Ready(Some(resolved)) => resolved,
            _ => panic!("default query resolves immediately"),
        };
        assert_eq!(resolved.asked, sink(1));
        assert!(resolved.reply.is_none());
        assert!(!targeter.has_events_pending_dispatch());
    }

    #[test]
    fn test_deferred_events_wait_for_query() {
        let root: Rc<dyn View> = TestView::root(1);
        let mut targeter = EventTargeter::new();
        let first: InputEvent = MouseEvent::down(Point::ZERO).into();
        let second: InputEvent = MouseEvent::up(Point::ZERO).into();
        targeter.begin_query(TargetingSequence::Mouse, &root, first, &root, Point::ZERO);
        targeter.defer(TargetingSequence::Mouse, &root, second.clone());

        assert!(targeter.next_deferred(TargetingSequence::Mouse).is_none());
        assert!(matches!(
            targeter.poll_query(TargetingSequence::Mouse, &mut cx()),
            Poll::Ready(Some(_))
        ));
        let deferred = targeter.next_deferred(TargetingSequence::Mouse).unwrap();
        assert_eq!(deferred.event, second);
        assert_eq!(targeter.deferred_count(), 0);
    }

    #[test]
    fn test_destroyed_root_drops_its_events() {
        let root: Rc<dyn View> = TestView::root(1);
        let mut targeter = EventTargeter::new();
        let event: InputEvent = MouseEvent::down(Point::ZERO).into();
        targeter.begin_query(TargetingSequence::Mouse, &root, event.clone(), &root, Point::ZERO);
        targeter.defer(TargetingSequence::Mouse, &root, event);

        targeter.view_will_be_destroyed(sink(1));
        assert!(!targeter.has_events_pending_dispatch());
    }
}
