//! Input event types routed between frames
//!
//! Provides the mouse, wheel, touch and gesture events the router targets,
//! plus the small flag sets (buttons, touch-action) routing decisions read.

use bitflags::bitflags;
use kurbo::{Affine, Point, Vec2};

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    NoButton,
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

bitflags! {
    /// Buttons held down while a mouse event was generated
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 1 << 0;
        const MIDDLE = 1 << 1;
        const RIGHT = 1 << 2;
        const BACK = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

bitflags! {
    /// Touch-action permissions computed by a frame for the active touch
    /// sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TouchAction: u8 {
        const PAN_LEFT = 1 << 0;
        const PAN_RIGHT = 1 << 1;
        const PAN_UP = 1 << 2;
        const PAN_DOWN = 1 << 3;
        const PINCH_ZOOM = 1 << 4;
        const DOUBLE_TAP_ZOOM = 1 << 5;
        const PAN_X = Self::PAN_LEFT.bits() | Self::PAN_RIGHT.bits();
        const PAN_Y = Self::PAN_UP.bits() | Self::PAN_DOWN.bits();
        const PAN = Self::PAN_X.bits() | Self::PAN_Y.bits();
        const MANIPULATION = Self::PAN.bits() | Self::PINCH_ZOOM.bits();
        const AUTO = Self::MANIPULATION.bits() | Self::DOUBLE_TAP_ZOOM.bits();
    }
}

/// Keyboard modifier keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Mouse event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Up,
    Move,
    Enter,
    Leave,
    ContextMenu,
}

/// Mouse event data
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Position in the receiving view's coordinate space
    pub position: Point,
    pub button: MouseButton,
    pub buttons: MouseButtons,
    pub modifiers: Modifiers,
    pub click_count: u8,
}

impl MouseEvent {
    /// Create a mouse event with no buttons held
    pub fn new(kind: MouseEventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            button: MouseButton::NoButton,
            buttons: MouseButtons::empty(),
            modifiers: Modifiers::default(),
            click_count: 0,
        }
    }

    /// Create a left-button press
    pub fn down(position: Point) -> Self {
        Self {
            button: MouseButton::Left,
            buttons: MouseButtons::LEFT,
            click_count: 1,
            ..Self::new(MouseEventKind::Down, position)
        }
    }

    /// Create a left-button release
    pub fn up(position: Point) -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            ..Self::new(MouseEventKind::Up, position)
        }
    }

    /// Create a move with no buttons held
    pub fn moved(position: Point) -> Self {
        Self::new(MouseEventKind::Move, position)
    }

    /// Set the held buttons
    pub fn with_buttons(mut self, buttons: MouseButtons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Whether any mouse button is held
    pub fn is_button_down(&self) -> bool {
        !self.buttons.is_empty()
    }
}

/// Phase of a wheel or momentum scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelPhase {
    #[default]
    None,
    Began,
    Stationary,
    Changed,
    Ended,
    Cancelled,
    MayBegin,
}

/// Mouse wheel event data
#[derive(Debug, Clone, PartialEq)]
pub struct WheelEvent {
    pub position: Point,
    pub delta: Vec2,
    pub phase: WheelPhase,
    pub momentum_phase: WheelPhase,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    /// Create a wheel event in the given scroll phase
    pub fn new(position: Point, delta: Vec2, phase: WheelPhase) -> Self {
        Self {
            position,
            delta,
            phase,
            momentum_phase: WheelPhase::None,
            modifiers: Modifiers::default(),
        }
    }

    /// Set the momentum phase
    pub fn with_momentum_phase(mut self, phase: WheelPhase) -> Self {
        self.momentum_phase = phase;
        self
    }

    /// Whether this event ends the scroll or its momentum
    pub fn is_end(&self) -> bool {
        self.phase == WheelPhase::Ended || self.momentum_phase == WheelPhase::Ended
    }
}

/// Touch event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEventKind {
    Start,
    Move,
    End,
    Cancel,
    ScrollStarted,
}

/// State of an individual touch point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchPointState {
    #[default]
    Undefined,
    Released,
    Pressed,
    Moved,
    Stationary,
    Cancelled,
}

/// Touch point
#[derive(Debug, Clone, PartialEq)]
pub struct TouchPoint {
    pub id: u32,
    pub state: TouchPointState,
    pub position: Point,
    pub force: f32,
}

impl TouchPoint {
    /// Create a touch point
    pub fn new(id: u32, state: TouchPointState, position: Point) -> Self {
        Self {
            id,
            state,
            position,
            force: 1.0,
        }
    }
}

/// Touch event data
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub kind: TouchEventKind,
    pub touches: Vec<TouchPoint>,
    /// Identifies this event and, for a sequence start, the gestures it
    /// produces. Zero is never used by real touch events.
    pub unique_touch_event_id: u32,
    pub modifiers: Modifiers,
}

impl TouchEvent {
    /// Create a touch event with the given points
    pub fn new(kind: TouchEventKind, unique_touch_event_id: u32, touches: Vec<TouchPoint>) -> Self {
        Self {
            kind,
            touches,
            unique_touch_event_id,
            modifiers: Modifiers::default(),
        }
    }

    /// A single-finger press at `position`
    pub fn start(unique_touch_event_id: u32, position: Point) -> Self {
        Self::new(
            TouchEventKind::Start,
            unique_touch_event_id,
            vec![TouchPoint::new(0, TouchPointState::Pressed, position)],
        )
    }

    /// A single-finger move to `position`
    pub fn moved(unique_touch_event_id: u32, position: Point) -> Self {
        Self::new(
            TouchEventKind::Move,
            unique_touch_event_id,
            vec![TouchPoint::new(0, TouchPointState::Moved, position)],
        )
    }

    /// A single-finger release at `position`
    pub fn end(unique_touch_event_id: u32, position: Point) -> Self {
        Self::new(
            TouchEventKind::End,
            unique_touch_event_id,
            vec![TouchPoint::new(0, TouchPointState::Released, position)],
        )
    }

    /// Position of the first touch point, used for targeting
    pub fn first_position(&self) -> Point {
        self.touches.first().map(|t| t.position).unwrap_or(Point::ZERO)
    }

    /// Number of points whose state matches this event's kind.
    ///
    /// Only meaningful for start, end and cancel events; other kinds report
    /// zero.
    pub fn changed_touch_count(&self) -> u32 {
        let required = match self.kind {
            TouchEventKind::Start => TouchPointState::Pressed,
            TouchEventKind::End => TouchPointState::Released,
            TouchEventKind::Cancel => TouchPointState::Cancelled,
            TouchEventKind::Move | TouchEventKind::ScrollStarted => return 0,
        };
        self.touches.iter().filter(|t| t.state == required).count() as u32
    }

    /// Map every touch position through `transform`
    pub fn transform_positions(&mut self, transform: Affine) {
        for touch in &mut self.touches {
            touch.position = transform * touch.position;
        }
    }
}

/// Device that produced a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureDevice {
    Uninitialized,
    Touchpad,
    Touchscreen,
    SyntheticAutoscroll,
    Scrollbar,
}

/// Gesture event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    ScrollBegin,
    ScrollUpdate,
    ScrollEnd,
    FlingStart,
    FlingCancel,
    PinchBegin,
    PinchUpdate,
    PinchEnd,
    TapDown,
    ShowPress,
    Tap,
    TapUnconfirmed,
    TapCancel,
    LongPress,
    LongTap,
    DoubleTap,
    TwoFingerTap,
}

impl GestureKind {
    /// Pinch begin, update or end
    pub fn is_pinch(self) -> bool {
        matches!(self, Self::PinchBegin | Self::PinchUpdate | Self::PinchEnd)
    }

    /// Scroll begin, update or end
    pub fn is_scroll(self) -> bool {
        matches!(self, Self::ScrollBegin | Self::ScrollUpdate | Self::ScrollEnd)
    }

    /// Gestures after which the user has lifted their last finger
    pub fn ends_touchscreen_sequence(self) -> bool {
        matches!(
            self,
            Self::Tap
                | Self::LongTap
                | Self::DoubleTap
                | Self::TwoFingerTap
                | Self::ScrollEnd
                | Self::FlingStart
        )
    }
}

/// Units of scroll deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollUnits {
    #[default]
    PrecisePixels,
    Pixels,
    Lines,
    Pages,
}

/// Whether a scroll is user driven or inertial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InertialPhase {
    #[default]
    UnknownMomentum,
    NonMomentum,
    Momentum,
}

/// Scroll payload of scroll begin/update/end gestures
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollData {
    pub delta: Vec2,
    pub units: ScrollUnits,
    pub inertial_phase: InertialPhase,
}

/// Gesture event data
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub device: GestureDevice,
    pub position: Point,
    /// Id of the touch event that started this gesture's sequence, or zero
    /// for gestures with no underlying touch sequence
    pub unique_touch_event_id: u32,
    pub scroll: ScrollData,
    /// Route to the root view regardless of hit testing
    pub target_viewport: bool,
    /// Set when the target's screen rect recently moved
    pub target_frame_moved_recently: bool,
    pub modifiers: Modifiers,
}

impl GestureEvent {
    /// Create a gesture event
    pub fn new(kind: GestureKind, device: GestureDevice, position: Point) -> Self {
        Self {
            kind,
            device,
            position,
            unique_touch_event_id: 0,
            scroll: ScrollData::default(),
            target_viewport: false,
            target_frame_moved_recently: false,
            modifiers: Modifiers::default(),
        }
    }

    /// Create a touchscreen gesture belonging to a touch sequence
    pub fn touchscreen(kind: GestureKind, position: Point, unique_touch_event_id: u32) -> Self {
        Self {
            unique_touch_event_id,
            ..Self::new(kind, GestureDevice::Touchscreen, position)
        }
    }

    /// Create a touchpad gesture
    pub fn touchpad(kind: GestureKind, position: Point) -> Self {
        Self::new(kind, GestureDevice::Touchpad, position)
    }

    /// Copy of this event with a different kind, keeping position and device
    pub fn with_kind(&self, kind: GestureKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// Unified input event
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Mouse(MouseEvent),
    Wheel(WheelEvent),
    Touch(TouchEvent),
    Gesture(GestureEvent),
}

impl InputEvent {
    /// Short description for log output
    pub fn name(&self) -> String {
        match self {
            Self::Mouse(e) => format!("Mouse{:?}", e.kind),
            Self::Wheel(e) => format!("Wheel({:?})", e.phase),
            Self::Touch(e) => format!("Touch{:?}#{}", e.kind, e.unique_touch_event_id),
            Self::Gesture(e) => format!("Gesture{:?}({:?})", e.kind, e.device),
        }
    }

    /// Position used for targeting, in root coordinates
    pub fn position(&self) -> Point {
        match self {
            Self::Mouse(e) => e.position,
            Self::Wheel(e) => e.position,
            Self::Touch(e) => e.first_position(),
            Self::Gesture(e) => e.position,
        }
    }

    /// Borrow the mouse payload, if any
    pub fn as_mouse(&self) -> Option<&MouseEvent> {
        match self {
            Self::Mouse(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the touch payload, if any
    pub fn as_touch(&self) -> Option<&TouchEvent> {
        match self {
            Self::Touch(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the gesture payload, if any
    pub fn as_gesture(&self) -> Option<&GestureEvent> {
        match self {
            Self::Gesture(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MouseEvent> for InputEvent {
    fn from(event: MouseEvent) -> Self {
        Self::Mouse(event)
    }
}

impl From<WheelEvent> for InputEvent {
    fn from(event: WheelEvent) -> Self {
        Self::Wheel(event)
    }
}

impl From<TouchEvent> for InputEvent {
    fn from(event: TouchEvent) -> Self {
        Self::Touch(event)
    }
}

impl From<GestureEvent> for InputEvent {
    fn from(event: GestureEvent) -> Self {
        Self::Gesture(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_button_down() {
        let event = MouseEvent::down(Point::new(1.0, 2.0));
        assert!(event.is_button_down());
        assert!(!MouseEvent::up(Point::ZERO).is_button_down());
        let drag = MouseEvent::moved(Point::ZERO).with_buttons(MouseButtons::RIGHT);
        assert!(drag.is_button_down());
    }

    #[test]
    fn test_changed_touch_count() {
        let start = TouchEvent::start(1, Point::ZERO);
        assert_eq!(start.changed_touch_count(), 1);

        let second_finger = TouchEvent::new(
            TouchEventKind::Start,
            2,
            vec![
                TouchPoint::new(0, TouchPointState::Stationary, Point::ZERO),
                TouchPoint::new(1, TouchPointState::Pressed, Point::new(5.0, 5.0)),
            ],
        );
        assert_eq!(second_finger.changed_touch_count(), 1);

        let two_fingers = TouchEvent::new(
            TouchEventKind::Start,
            5,
            vec![
                TouchPoint::new(0, TouchPointState::Pressed, Point::ZERO),
                TouchPoint::new(1, TouchPointState::Pressed, Point::new(5.0, 5.0)),
            ],
        );
        assert_eq!(two_fingers.changed_touch_count(), 2);

        let cancel = TouchEvent::new(
            TouchEventKind::Cancel,
            3,
            vec![
                TouchPoint::new(0, TouchPointState::Cancelled, Point::ZERO),
                TouchPoint::new(1, TouchPointState::Cancelled, Point::ZERO),
            ],
        );
        assert_eq!(cancel.changed_touch_count(), 2);
        assert_eq!(TouchEvent::moved(4, Point::ZERO).changed_touch_count(), 0);
    }

    #[test]
    fn test_transform_positions() {
        let mut event = TouchEvent::start(1, Point::new(10.0, 10.0));
        event.transform_positions(Affine::translate((-4.0, -6.0)));
        assert_eq!(event.first_position(), Point::new(6.0, 4.0));
    }

    #[test]
    fn test_touch_action_flags() {
        assert!(TouchAction::AUTO.contains(TouchAction::PINCH_ZOOM));
        assert!(!TouchAction::PAN.contains(TouchAction::PINCH_ZOOM));
        assert!(TouchAction::MANIPULATION.contains(TouchAction::PAN_Y));
    }

    #[test]
    fn test_gesture_sequence_end_kinds() {
        assert!(GestureKind::Tap.ends_touchscreen_sequence());
        assert!(GestureKind::FlingStart.ends_touchscreen_sequence());
        assert!(!GestureKind::TapDown.ends_touchscreen_sequence());
        assert!(GestureKind::PinchUpdate.is_pinch());
    }

    #[test]
    fn test_wheel_end() {
        let ended = WheelEvent::new(Point::ZERO, Vec2::ZERO, WheelPhase::Ended);
        assert!(ended.is_end());
        let momentum_end = WheelEvent::new(Point::ZERO, Vec2::ZERO, WheelPhase::None)
            .with_momentum_phase(WheelPhase::Ended);
        assert!(momentum_end.is_end());
    }
}
