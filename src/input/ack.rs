//! Event acknowledgment results

/// Disposition of a dispatched event, reported back by its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AckResult {
    /// Not acknowledged yet
    #[default]
    Unknown,
    /// A handler consumed the event
    Consumed,
    /// Consumed, but unused scroll delta should bubble to an ancestor
    ConsumedShouldBubble,
    /// Delivered but not consumed
    NotConsumed,
    /// There was no view able to receive the event
    NoConsumerExists,
    /// Dropped by the target without being processed
    Ignored,
    /// Delivered asynchronously; the target will not ack further
    SetNonBlocking,
}

impl AckResult {
    /// Whether some handler took ownership of the event
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed | Self::ConsumedShouldBubble)
    }
}
