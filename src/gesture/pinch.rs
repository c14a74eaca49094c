//! Touchscreen pinch state machine

use std::fmt;

use crate::utils::{Result, RouterError};

/// Where an active touchscreen pinch and any root scroll bubbling stand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinchState {
    #[default]
    None,
    /// A child's scroll is bubbling to the root, no pinch
    ExistingBubblingToRoot,
    /// The root is the gesture target and is pinching itself
    PinchWithRootTarget,
    /// Pinch diverted to the root while a scroll already bubbles there
    PinchWhileBubblingToRoot,
    /// Pinch diverted to the root from a child's gesture
    PinchDuringChildGesture,
}

/// Inputs driving [`PinchState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchSignal {
    StartBubblingToRoot,
    StopBubblingToRoot,
    StartPinchInRoot,
    StartPinchInChild,
    StopPinch,
}

impl fmt::Display for PinchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for PinchSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl PinchState {
    /// Transition table; `None` for illegal transitions
    pub fn next(self, signal: PinchSignal) -> Option<PinchState> {
        use PinchSignal as S;
        use PinchState as P;
        match (self, signal) {
            (P::None, S::StartBubblingToRoot) => Some(P::ExistingBubblingToRoot),
            (P::PinchDuringChildGesture, S::StartBubblingToRoot) => {
                Some(P::PinchWhileBubblingToRoot)
            }
            (P::ExistingBubblingToRoot, S::StopBubblingToRoot) => Some(P::None),
            (P::None, S::StartPinchInRoot) => Some(P::PinchWithRootTarget),
            (P::None, S::StartPinchInChild) => Some(P::PinchDuringChildGesture),
            (P::ExistingBubblingToRoot, S::StartPinchInChild) => {
                Some(P::PinchWhileBubblingToRoot)
            }
            (P::PinchWithRootTarget, S::StopPinch) => Some(P::None),
            (P::PinchWhileBubblingToRoot, S::StopPinch) => Some(P::ExistingBubblingToRoot),
            (P::PinchDuringChildGesture, S::StopPinch) => Some(P::None),
            _ => None,
        }
    }
}

/// Pinch bookkeeping for one router
#[derive(Debug, Clone, Default)]
pub struct TouchscreenPinchState {
    state: PinchState,
}

impl TouchscreenPinchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PinchState {
        self.state
    }

    /// Whether gesture events must currently go to the root
    pub fn is_in_pinch(&self) -> bool {
        matches!(
            self.state,
            PinchState::PinchWithRootTarget
                | PinchState::PinchWhileBubblingToRoot
                | PinchState::PinchDuringChildGesture
        )
    }

    /// Whether a pinch diverted to the root needs a synthetic scroll
    /// begin/end pair around it
    pub fn needs_wrapping_scroll_sequence(&self) -> bool {
        matches!(
            self.state,
            PinchState::None | PinchState::PinchDuringChildGesture
        )
    }

    /// Apply `signal`. Illegal transitions leave the state untouched.
    pub fn apply(&mut self, signal: PinchSignal) -> Result<PinchState> {
        match self.state.next(signal) {
            Some(next) => {
                log::debug!("pinch state {} -> {} on {}", self.state, next, signal);
                self.state = next;
                Ok(next)
            }
            None => Err(RouterError::IllegalPinchTransition {
                state: self.state,
                signal,
            }),
        }
    }

    pub fn did_start_bubbling_to_root(&mut self) -> Result<PinchState> {
        self.apply(PinchSignal::StartBubblingToRoot)
    }

    pub fn did_stop_bubbling_to_root(&mut self) -> Result<PinchState> {
        self.apply(PinchSignal::StopBubblingToRoot)
    }

    pub fn did_start_pinch_in_root(&mut self) -> Result<PinchState> {
        self.apply(PinchSignal::StartPinchInRoot)
    }

    pub fn did_start_pinch_in_child(&mut self) -> Result<PinchState> {
        self.apply(PinchSignal::StartPinchInChild)
    }

    pub fn did_stop_pinch(&mut self) -> Result<PinchState> {
        self.apply(PinchSignal::StopPinch)
    }
}
