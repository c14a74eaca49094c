//! Counters for routing anomalies
//!
//! Nothing here changes routing; the counters exist so embedders and tests
//! can observe protocol anomalies the router recovered from.

/// Anomaly counters of one router
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Touchscreen gesture sequences that started with no mapped target
    pub no_gesture_target: u64,
    /// Scroll bubbling attempts that targeted the resending view itself
    pub bubbled_to_same_view: u64,
    /// Touch events whose latched target was no longer registered
    pub destroyed_touch_target: u64,
    /// Synchronous hit-test results the renderer disagreed with
    pub hit_test_mismatches: u64,
    /// Pinch signals rejected by the pinch state machine
    pub illegal_pinch_transitions: u64,
    /// Longest the touch ack queue has been
    pub max_ack_queue_len: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current ack queue length, returning whether it is a new
    /// high-water mark
    pub fn record_ack_queue_len(&mut self, len: usize) -> bool {
        if len > self.max_ack_queue_len {
            self.max_ack_queue_len = len;
            return true;
        }
        false
    }

    /// Whether any anomaly was recorded
    pub fn has_anomalies(&self) -> bool {
        self.no_gesture_target
            + self.bubbled_to_same_view
            + self.destroyed_touch_target
            + self.hit_test_mismatches
            + self.illegal_pinch_transitions
            > 0
    }
}
