//! Ordered touch acknowledgments
//!
//! Touch acks must reach the root view in the order the events were
//! dispatched, whatever order the targets answer in. Targets destroyed
//! mid-sequence never answer; their entries are acked on their behalf.

use std::collections::VecDeque;

use crate::input::{AckResult, TouchEvent};
use crate::view::FrameSinkId;

/// Whether a touch event came from a device or from touch emulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEventSource {
    System,
    Emulated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    NotAcked,
    Acked,
}

/// A dispatched touch event waiting for its ack to be forwarded
#[derive(Debug, Clone, PartialEq)]
pub struct AckEntry {
    pub event: TouchEvent,
    /// `None` when there was no target to dispatch to
    pub target: Option<FrameSinkId>,
    pub root: FrameSinkId,
    pub source: TouchEventSource,
    pub status: AckStatus,
    pub result: AckResult,
}

/// What [`TouchEventAckQueue::mark_acked`] did with an ack
#[derive(Debug, Clone, PartialEq)]
pub enum MarkAcked {
    /// The entry was found; these entries are now ready to forward
    Queued(Vec<AckEntry>),
    /// The event never went through the queue; ack its target directly
    Bypassed,
}

/// FIFO of outstanding touch acks
#[derive(Debug, Default)]
pub struct TouchEventAckQueue {
    entries: VecDeque<AckEntry>,
}

impl TouchEventAckQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry waiting for `target`'s ack
    pub fn enqueue(
        &mut self,
        event: TouchEvent,
        target: Option<FrameSinkId>,
        root: FrameSinkId,
        source: TouchEventSource,
    ) {
        self.entries.push_back(AckEntry {
            event,
            target,
            root,
            source,
            status: AckStatus::NotAcked,
            result: AckResult::Unknown,
        });
    }

    /// Append an entry that is already acked and drain.
    ///
    /// Used when there is no live target at dispatch time.
    pub fn enqueue_preacked(
        &mut self,
        event: TouchEvent,
        target: Option<FrameSinkId>,
        root: FrameSinkId,
        source: TouchEventSource,
        result: AckResult,
    ) -> Vec<AckEntry> {
        self.entries.push_back(AckEntry {
            event,
            target,
            root,
            source,
            status: AckStatus::Acked,
            result,
        });
        self.drain()
    }

    /// Record `target`'s ack of `event`, matched by `unique_touch_event_id`
    pub fn mark_acked(
        &mut self,
        event: &TouchEvent,
        result: AckResult,
        target: FrameSinkId,
    ) -> MarkAcked {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.event.unique_touch_event_id == event.unique_touch_event_id)
        else {
            return MarkAcked::Bypassed;
        };

        debug_assert_eq!(entry.status, AckStatus::NotAcked, "touch event acked twice");
        debug_assert_eq!(entry.target, Some(target), "ack from a view that was not the target");
        entry.event = event.clone();
        entry.status = AckStatus::Acked;
        entry.result = result;
        MarkAcked::Queued(self.drain())
    }

    /// Pop every acked entry at the head
    pub fn drain(&mut self) -> Vec<AckEntry> {
        let mut drained = Vec::new();
        while self
            .entries
            .front()
            .is_some_and(|e| e.status == AckStatus::Acked)
        {
            if let Some(entry) = self.entries.pop_front() {
                drained.push(entry);
            }
        }
        drained
    }

    /// Settle the queue after `view` is destroyed.
    ///
    /// Entries whose root is `view` are dropped, entries it was the target
    /// of are acked with [`AckResult::NoConsumerExists`].
    pub fn on_target_destroyed(&mut self, view: FrameSinkId) -> Vec<AckEntry> {
        self.entries.retain(|e| e.root != view);
        for entry in self.entries.iter_mut().filter(|e| e.target == Some(view)) {
            entry.status = AckStatus::Acked;
            entry.result = AckResult::NoConsumerExists;
        }
        self.drain()
    }

    /// Entries routed through `root`, oldest first
    pub fn entries_for_root(&self, root: FrameSinkId) -> impl Iterator<Item = &AckEntry> + '_ {
        self.entries.iter().filter(move |e| e.root == root)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
