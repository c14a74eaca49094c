//! Cross-frame input event router
//!
//! One router serves the root views of a window. For every event it finds
//! the frame that should receive it, transforms the event into that frame's
//! coordinates and keeps the per-class latches (mouse capture, wheel,
//! touch, gesture and scroll bubbling targets) consistent while frames come
//! and go.
//!
//! Each event class lives in its own module as a `find_*_target` /
//! `dispatch_*` pair. Finding may need an asynchronous renderer query, see
//! [`EventTargeter`]; dispatching is always synchronous.

mod bubbling;
mod emulation;
mod mouse;
mod touch;
mod touch_ack_queue;
mod touchpad_gesture;
mod touchscreen_gesture;
mod wheel;

pub use emulation::TouchEmulator;
#[cfg(test)]
pub use emulation::MockTouchEmulator;
pub use touch_ack_queue::{AckEntry, AckStatus, MarkAcked, TouchEventAckQueue, TouchEventSource};

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use kurbo::{Affine, Point};

use crate::diagnostics::Diagnostics;
use crate::gesture::{GestureTargetMap, PinchSignal, PinchState, TouchSequence, TouchscreenPinchState};
use crate::hit_test::{
    self, EventSource, EventTargeter, HitTestFlags, HitTestRegion, HitTester, ResolvedTarget,
    TargetResult, TargetingSequence,
};
use crate::input::{AckResult, GestureDevice, InputEvent, MouseEventKind};
use crate::utils::{Result, RouterError};
use crate::view::{root_of, Cursor, FrameSinkId, FrameViewRegistry, MenuSource, View, ViewObserver};

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Cross-check synchronous hit-test results with the renderer
    pub verify_hit_test_results: bool,
    /// Touch ack queue length above which a warning is logged
    pub ack_queue_warn_threshold: usize,
    /// Capture the mouse on MouseDown while touch emulation is enabled
    pub touch_emulation_capture: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            verify_hit_test_results: false,
            ack_queue_warn_threshold: 64,
            touch_emulation_capture: true,
        }
    }
}

impl RouterConfig {
    pub fn with_verify_hit_test_results(mut self, verify: bool) -> Self {
        self.verify_hit_test_results = verify;
        self
    }

    pub fn with_ack_queue_warn_threshold(mut self, threshold: usize) -> Self {
        self.ack_queue_warn_threshold = threshold;
        self
    }

    pub fn with_touch_emulation_capture(mut self, capture: bool) -> Self {
        self.touch_emulation_capture = capture;
        self
    }
}

/// An open scroll bubbling chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScrollBubbling {
    target: FrameSinkId,
    /// Child whose unconsumed scroll started the chain
    origin: Option<FrameSinkId>,
    device: GestureDevice,
}

/// Routes input events of root views to the frames composing them
pub struct InputEventRouter {
    config: RouterConfig,
    hit_tester: Rc<dyn HitTester>,
    registry: FrameViewRegistry,
    observer: Weak<dyn ViewObserver>,
    targeter: EventTargeter,
    ack_queue: TouchEventAckQueue,
    touch_emulator: Option<Box<dyn TouchEmulator>>,
    diagnostics: Diagnostics,

    route_to_root_for_devtools: bool,
    mouse_capture_target: Option<FrameSinkId>,
    last_mouse_move_target: Option<FrameSinkId>,
    last_mouse_move_root: Option<FrameSinkId>,
    last_mouse_down_target: Option<FrameSinkId>,
    mouse_down_pre_transform: Option<Point>,
    mouse_down_post_transform: Option<Point>,

    wheel_target: Option<FrameSinkId>,

    touch_sequence: TouchSequence,
    gesture_targets: GestureTargetMap,
    last_emulated_event_root: Option<FrameSinkId>,

    touchscreen_gesture_target: Option<FrameSinkId>,
    touchscreen_gesture_target_moved_recently: bool,
    touchpad_gesture_target: Option<FrameSinkId>,
    last_fling_start_target: Option<FrameSinkId>,
    pinch: TouchscreenPinchState,
    bubbling: Option<ScrollBubbling>,
    stopped_fling_for_bubbling: bool,

    events_being_flushed: bool,
    last_device_scale_factor: f64,
}

impl InputEventRouter {
    /// Create a router that is not notified of view destruction.
    ///
    /// Views must then be removed with [`InputEventRouter::unregister`]
    /// before they go away. Use [`InputEventRouter::new_shared`] to have
    /// views report their destruction themselves.
    pub fn new(hit_tester: Rc<dyn HitTester>, config: RouterConfig) -> Self {
        let observer: Weak<dyn ViewObserver> = Weak::<RefCell<InputEventRouter>>::new();
        Self::with_observer(hit_tester, config, observer)
    }

    /// Create a router that observes the destruction of registered views
    pub fn new_shared(hit_tester: Rc<dyn HitTester>, config: RouterConfig) -> Rc<RefCell<Self>> {
        Rc::new_cyclic(|weak: &Weak<RefCell<InputEventRouter>>| {
            let observer: Weak<dyn ViewObserver> = weak.clone();
            RefCell::new(Self::with_observer(hit_tester, config, observer))
        })
    }

    fn with_observer(
        hit_tester: Rc<dyn HitTester>,
        config: RouterConfig,
        observer: Weak<dyn ViewObserver>,
    ) -> Self {
        Self {
            config,
            hit_tester,
            registry: FrameViewRegistry::new(),
            observer,
            targeter: EventTargeter::new(),
            ack_queue: TouchEventAckQueue::new(),
            touch_emulator: None,
            diagnostics: Diagnostics::new(),
            route_to_root_for_devtools: false,
            mouse_capture_target: None,
            last_mouse_move_target: None,
            last_mouse_move_root: None,
            last_mouse_down_target: None,
            mouse_down_pre_transform: None,
            mouse_down_post_transform: None,
            wheel_target: None,
            touch_sequence: TouchSequence::new(),
            gesture_targets: GestureTargetMap::new(),
            last_emulated_event_root: None,
            touchscreen_gesture_target: None,
            touchscreen_gesture_target_moved_recently: false,
            touchpad_gesture_target: None,
            last_fling_start_target: None,
            pinch: TouchscreenPinchState::new(),
            bubbling: None,
            stopped_fling_for_bubbling: false,
            events_being_flushed: false,
            last_device_scale_factor: 1.0,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    // Registration

    /// Make `view` routable as the owner of `id` and observe its destruction
    pub fn register(&mut self, id: FrameSinkId, view: &Rc<dyn View>) -> Result<()> {
        self.registry.register(id, view)?;
        view.add_observer(self.observer.clone());
        log::debug!("registered view {id}");
        Ok(())
    }

    /// Remove the owner of `id`, clearing every reference to it
    pub fn unregister(&mut self, id: FrameSinkId) {
        match self.registry.lookup(id) {
            Some(view) => self.on_view_destroyed(view.as_ref()),
            None if self.registry.contains(id) => self.handle_view_destroyed(id, None),
            None => {}
        }
    }

    pub fn is_registered(&self, id: FrameSinkId) -> bool {
        self.registry.lookup(id).is_some()
    }

    pub fn registry(&self) -> &FrameViewRegistry {
        &self.registry
    }

    pub(crate) fn view(&self, id: Option<FrameSinkId>) -> Option<Rc<dyn View>> {
        self.registry.lookup(id?)
    }

    /// Destruction notice of a registered view
    pub(crate) fn on_view_destroyed(&mut self, view: &dyn View) {
        view.remove_observer(&self.observer);
        let parent = view.parent_view().map(|p| p.frame_sink_id());
        self.handle_view_destroyed(view.frame_sink_id(), parent);
    }

    fn handle_view_destroyed(&mut self, id: FrameSinkId, parent: Option<FrameSinkId>) {
        log::debug!("view {id} destroyed");
        self.registry.remove(id);

        if let Some(emulator) = self.touch_emulator.as_mut() {
            emulator.on_view_destroyed(id);
        }

        if self.touch_sequence.target() == Some(id) {
            self.touch_sequence.reset();
        }
        let drained = self.ack_queue.on_target_destroyed(id);
        self.forward_touch_acks(drained);

        if self.wheel_target == Some(id) {
            self.wheel_target = None;
        }

        // Sequence ids stay mapped so their gestures resolve to no target.
        self.gesture_targets.scrub(id);

        if self.mouse_capture_target == Some(id) {
            self.mouse_capture_target = None;
        }
        if self.touchscreen_gesture_target == Some(id) {
            self.set_touchscreen_gesture_target(None, false);
        }
        if self.touchpad_gesture_target == Some(id) {
            self.touchpad_gesture_target = None;
        }

        // Nothing will send the chain's scroll end once its origin is gone.
        match self.bubbling {
            Some(bubbling) if bubbling.target == id => self.bubbling = None,
            Some(bubbling) if bubbling.origin == Some(id) => self.cancel_scroll_bubbling(),
            _ => {}
        }

        if self.last_mouse_move_target == Some(id) {
            let was_root = self.last_mouse_move_root == Some(id);
            self.last_mouse_move_target = if was_root { None } else { parent };
            if self.last_mouse_move_target.is_none() || was_root {
                self.last_mouse_move_root = None;
            }
        }

        if self.last_fling_start_target == Some(id) {
            self.last_fling_start_target = None;
        }
        if self.last_mouse_down_target == Some(id) {
            self.last_mouse_down_target = None;
        }

        self.targeter.view_will_be_destroyed(id);
    }

    // Routing

    /// Route `event`, given in `root`'s coordinates.
    ///
    /// The event is dispatched before this returns unless its target has to
    /// be queried; see [`InputEventRouter::poll_pending_targets`].
    pub fn route_event(&mut self, root: &Rc<dyn View>, event: impl Into<InputEvent>) -> Result<()> {
        let event = event.into();
        if let InputEvent::Gesture(gesture) = &event {
            if gesture.target_viewport {
                root.dispatch(&event);
                return Ok(());
            }
        }

        let Some(sequence) = TargetingSequence::of(&event) else {
            let device = event
                .as_gesture()
                .map_or(GestureDevice::Uninitialized, |g| g.device);
            return Err(RouterError::UnsupportedGestureDevice(device));
        };

        if self.targeter.is_blocked(sequence) {
            self.targeter.defer(sequence, root, event);
        } else {
            self.find_target_and_dispatch(root, event, sequence);
        }
        Ok(())
    }

    fn find_target_and_dispatch(
        &mut self,
        root: &Rc<dyn View>,
        event: InputEvent,
        sequence: TargetingSequence,
    ) {
        let result = self.find_target(root, &event);
        if result.should_query {
            if let (Some(view), Some(location)) = (result.view.as_ref(), result.location) {
                let view = Rc::clone(view);
                self.targeter.begin_query(sequence, root, event, &view, location);
                return;
            }
        }
        if result.should_verify {
            if let Some(expected) = result.target_id() {
                self.targeter.verify(root, expected, event.position());
            }
        }
        log::debug!("{} -> {:?}", event.name(), result.target_id());
        self.dispatch_event_to_target(root, result.view, event, result.location);
    }

    fn find_target(&mut self, root: &Rc<dyn View>, event: &InputEvent) -> TargetResult {
        match event {
            InputEvent::Mouse(mouse) => self.find_mouse_target(root, mouse),
            InputEvent::Wheel(wheel) => self.find_wheel_target(root, wheel),
            InputEvent::Touch(touch) => self.find_touch_target(root, touch),
            InputEvent::Gesture(gesture) => match gesture.device {
                GestureDevice::Touchscreen => self.find_touchscreen_gesture_target(root, gesture),
                GestureDevice::Touchpad => self.find_touchpad_gesture_target(root, gesture),
                _ => TargetResult::none(false),
            },
        }
    }

    fn dispatch_event_to_target(
        &mut self,
        root: &Rc<dyn View>,
        target: Option<Rc<dyn View>>,
        event: InputEvent,
        location: Option<Point>,
    ) {
        match event {
            InputEvent::Mouse(mouse) => {
                if let Some(target) = target.as_ref().filter(|_| mouse.kind == MouseEventKind::Down) {
                    self.mouse_down_post_transform = location;
                    self.last_mouse_down_target = Some(target.frame_sink_id());
                }
                self.dispatch_mouse_event(root, target, mouse, location);
            }
            InputEvent::Wheel(wheel) => self.dispatch_wheel_event(root, target, wheel, location),
            InputEvent::Touch(touch) => {
                let swallowed = self
                    .touch_emulator
                    .as_mut()
                    .is_some_and(|emulator| emulator.handle_touch_event(&touch));
                if swallowed {
                    // The emulator produces its own touch stream; the root
                    // only needs to hear that this one was consumed.
                    root.on_ack(&InputEvent::Touch(touch), AckResult::Consumed);
                    return;
                }
                self.dispatch_touch_event(root, target, touch, location, TouchEventSource::System);
            }
            InputEvent::Gesture(mut gesture) => {
                if target.as_ref().is_some_and(|t| t.screen_rect_is_unstable()) {
                    gesture.target_frame_moved_recently = true;
                }
                match gesture.device {
                    GestureDevice::Touchscreen => {
                        self.dispatch_touchscreen_gesture_event(root, target, gesture, location)
                    }
                    GestureDevice::Touchpad => {
                        self.dispatch_touchpad_gesture_event(root, target, gesture, location)
                    }
                    device => {
                        debug_assert!(false, "gesture device {device:?} is never targeted");
                    }
                }
            }
        }
    }

    /// Drive asynchronous target queries and dispatch the events waiting on
    /// them, in order per sequence.
    ///
    /// Returns `Ready` once no event is waiting on a query.
    pub fn poll_pending_targets(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        for sequence in TargetingSequence::ALL {
            loop {
                match self.targeter.poll_query(sequence, cx) {
                    Poll::Pending => break,
                    Poll::Ready(Some(resolved)) => self.dispatch_resolved(resolved),
                    Poll::Ready(None) => {}
                }
                while let Some(deferred) = self.targeter.next_deferred(sequence) {
                    if let Some(root) = deferred.root.upgrade() {
                        self.find_target_and_dispatch(&root, deferred.event, sequence);
                    }
                }
                if !self.targeter.has_query_in_flight(sequence) {
                    break;
                }
            }
        }

        for verification in self.targeter.poll_verifications(cx) {
            if verification.expected != verification.actual {
                self.diagnostics.hit_test_mismatches += 1;
                log::warn!(
                    "hit test picked {} but the renderer reports {}",
                    verification.expected,
                    verification.actual
                );
            }
        }

        if self.targeter.has_events_pending_dispatch() {
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }

    fn dispatch_resolved(&mut self, resolved: ResolvedTarget) {
        let Some(root) = resolved.root.upgrade() else {
            return;
        };
        let root_id = root.frame_sink_id();
        let replied = resolved.reply.and_then(|reply| {
            let view = self.registry.lookup(reply.frame_sink_id)?;
            let in_tree = root_of(&view).is_some_and(|r| r.frame_sink_id() == root_id);
            in_tree.then_some((view, reply.location))
        });
        let (target, location) = match replied {
            Some((view, location)) => (view, location),
            None => match self.registry.lookup(resolved.asked) {
                Some(view) => (view, resolved.location),
                None => (Rc::clone(&root), resolved.event.position()),
            },
        };
        log::debug!(
            "{} -> {} after query",
            resolved.event.name(),
            target.frame_sink_id()
        );
        self.dispatch_event_to_target(&root, Some(target), resolved.event, Some(location));
    }

    /// Whether events are waiting on asynchronous target queries
    pub fn has_events_pending_dispatch(&self) -> bool {
        self.targeter.has_events_pending_dispatch()
    }

    // Targeting helpers

    /// Hit test `point` (in `root`'s coordinates).
    ///
    /// Falls back to `root` itself when there is nothing else to hit, no
    /// hit-test data, or the hit surface is not a live part of `root`'s
    /// tree.
    pub(crate) fn find_view_at_location(
        &self,
        root: &Rc<dyn View>,
        point: Point,
        source: EventSource,
    ) -> TargetResult {
        if self.registry.len() <= 1 {
            return TargetResult::found(Rc::clone(root), point, false);
        }

        let root_id = root.frame_sink_id();
        let scale = root.device_scale_factor();
        debug_assert!(scale > 0.0);
        let Some(hit) = self
            .hit_tester
            .hit_test(root_id, hit_test::to_pixels(point, scale), source)
        else {
            return TargetResult::found(Rc::clone(root), point, false);
        };

        let should_query = hit.flags.contains(HitTestFlags::ASK);
        let should_verify = !should_query && self.config.verify_hit_test_results;
        let hit_view = self
            .registry
            .lookup(hit.frame_sink_id)
            .filter(|view| root_of(view).is_some_and(|r| r.frame_sink_id() == root_id));
        let (view, location) = match hit_view {
            Some(view) => (view, hit_test::to_dips(hit.location_in_target, scale)),
            None => (Rc::clone(root), point),
        };

        TargetResult {
            view: Some(view),
            should_query,
            location: Some(location),
            latched: false,
            should_verify,
        }
    }

    /// Synchronous hit test of `point` in `root`'s coordinates, returning the
    /// target and the point in its coordinates
    pub fn view_at_point(&self, root: &Rc<dyn View>, point: Point) -> Option<(Rc<dyn View>, Point)> {
        let result = self.find_view_at_location(root, point, EventSource::Mouse);
        Some((result.view?, result.location?))
    }

    fn transform_between(&self, from: FrameSinkId, to: FrameSinkId) -> Option<Affine> {
        if from == to {
            return Some(Affine::IDENTITY);
        }
        self.hit_tester.transform_to_view(from, to)
    }

    /// Map a point from the root of `view` into `view`, leaving it untouched
    /// if no transform is known
    pub(crate) fn root_point_to_view(&self, view: &Rc<dyn View>, point: Point) -> Point {
        root_of(view)
            .and_then(|root| {
                self.hit_tester
                    .transform_point(root.frame_sink_id(), view.frame_sink_id(), point)
            })
            .unwrap_or(point)
    }

    pub(crate) fn apply_pinch_signal(&mut self, signal: PinchSignal) {
        if let Err(err) = self.pinch.apply(signal) {
            self.diagnostics.illegal_pinch_transitions += 1;
            log::error!("{err}");
            debug_assert!(false, "{err}");
        }
    }

    // Miscellaneous operations

    pub fn set_route_to_root_for_devtools(&mut self, route_to_root: bool) {
        self.route_to_root_for_devtools = route_to_root;
    }

    /// While set, touchscreen gesture targets have their touch-action forced
    /// to auto before dispatch
    pub fn set_events_being_flushed(&mut self, flushed: bool) {
        self.events_being_flushed = flushed;
    }

    /// Explicit capture requested by a renderer; ignored while touch
    /// emulation is enabled
    pub fn set_mouse_capture_target(&mut self, target: &Rc<dyn View>, capture: bool) {
        if self.touch_emulation_enabled() {
            return;
        }
        let id = target.frame_sink_id();
        if capture {
            self.mouse_capture_target = Some(id);
        } else if self.mouse_capture_target == Some(id) {
            self.mouse_capture_target = None;
        }
    }

    /// Update the cursor of every registered view through the root the mouse
    /// last moved over
    pub fn set_cursor(&mut self, cursor: &Cursor) {
        let Some(root) = self.view(self.last_mouse_move_root) else {
            return;
        };
        self.last_device_scale_factor = root.device_scale_factor();
        for view in self.registry.views() {
            root.update_cursor(view.frame_sink_id(), cursor);
        }
    }

    /// Show a context menu in the view the mouse last moved over
    pub fn show_context_menu_at_point(&self, point: Point, source: MenuSource) {
        if let Some(view) = self.view(self.last_mouse_move_target) {
            view.show_context_menu_at_point(point, source);
        }
    }

    /// Forward updated hit-test regions to the views owning them
    pub fn on_hit_test_regions_updated(&self, regions: &[HitTestRegion]) {
        for region in regions {
            if let Some(view) = self.registry.lookup(region.frame_sink_id) {
                view.hit_test_region_updated(region);
            }
        }
    }

    // Accessors

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn registered_view_count(&self) -> usize {
        self.registry.len()
    }

    pub fn touch_ack_queue_len(&self) -> usize {
        self.ack_queue.len()
    }

    pub fn mouse_capture_target(&self) -> Option<FrameSinkId> {
        self.mouse_capture_target
    }

    pub fn last_mouse_move_target(&self) -> Option<FrameSinkId> {
        self.last_mouse_move_target
    }

    pub fn wheel_target(&self) -> Option<FrameSinkId> {
        self.wheel_target
    }

    pub fn touch_target(&self) -> Option<FrameSinkId> {
        self.touch_sequence.target()
    }

    pub fn active_touches(&self) -> u32 {
        self.touch_sequence.active_touches()
    }

    pub fn touchscreen_gesture_target(&self) -> Option<FrameSinkId> {
        self.touchscreen_gesture_target
    }

    pub fn touchpad_gesture_target(&self) -> Option<FrameSinkId> {
        self.touchpad_gesture_target
    }

    pub fn last_fling_start_target(&self) -> Option<FrameSinkId> {
        self.last_fling_start_target
    }

    pub fn bubbling_target(&self) -> Option<FrameSinkId> {
        self.bubbling.map(|b| b.target)
    }

    pub fn bubbling_origin(&self) -> Option<FrameSinkId> {
        self.bubbling.and_then(|b| b.origin)
    }

    pub fn pinch_state(&self) -> PinchState {
        self.pinch.state()
    }

    /// Whether the gesture target map has an entry for a touch sequence
    pub fn has_gesture_target_entry(&self, unique_touch_event_id: u32) -> bool {
        self.gesture_targets.contains(unique_touch_event_id)
    }

    /// Whether [`InputEventRouter::stop_fling`] stopped a fling since the
    /// last bubbled scroll begin
    pub fn stopped_fling_for_bubbling(&self) -> bool {
        self.stopped_fling_for_bubbling
    }

    pub fn last_device_scale_factor(&self) -> f64 {
        self.last_device_scale_factor
    }

    /// Whether every latch is clear of `id`
    pub fn is_unreferenced(&self, id: FrameSinkId) -> bool {
        let latches = [
            self.mouse_capture_target,
            self.last_mouse_down_target,
            self.wheel_target,
            self.touch_sequence.target(),
            self.touchscreen_gesture_target,
            self.touchpad_gesture_target,
            self.last_fling_start_target,
            self.bubbling_target(),
            self.bubbling_origin(),
        ];
        !latches.contains(&Some(id))
            && !self.registry.contains(id)
            && (self.last_mouse_move_target != Some(id))
    }
}

impl ViewObserver for RefCell<InputEventRouter> {
    fn on_view_destroying(&self, view: &dyn View) {
        match self.try_borrow_mut() {
            Ok(mut router) => router.on_view_destroyed(view),
            Err(_) => {
                log::error!(
                    "view {} destroyed while the router was busy",
                    view.frame_sink_id()
                );
                debug_assert!(false, "view destroyed re-entrantly during routing");
            }
        }
    }
}

impl Drop for InputEventRouter {
    fn drop(&mut self) {
        for view in self.registry.clear() {
            view.remove_observer(&self.observer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_test::HitTarget;
    use crate::input::{MouseEvent, TouchEvent};
    use crate::testing::{TestView, sink};

    /// Hit tester without data: everything lands on the root
    struct NoData;

    impl HitTester for NoData {
        fn hit_test(&self, _: FrameSinkId, _: Point, _: EventSource) -> Option<HitTarget> {
            None
        }

        fn transform_to_view(&self, _: FrameSinkId, _: FrameSinkId) -> Option<Affine> {
            None
        }
    }

    fn shared_router() -> Rc<RefCell<InputEventRouter>> {
        InputEventRouter::new_shared(Rc::new(NoData), RouterConfig::default())
    }

    #[test]
    fn test_config_builders() {
        let config = RouterConfig::default()
            .with_verify_hit_test_results(true)
            .with_ack_queue_warn_threshold(4)
            .with_touch_emulation_capture(false);
        assert!(config.verify_hit_test_results);
        assert_eq!(config.ack_queue_warn_threshold, 4);
        assert!(!config.touch_emulation_capture);
    }

    #[test]
    fn test_register_subscribes_observer() {
        let router = shared_router();
        let root = TestView::root(1);
        let dyn_root: Rc<dyn View> = root.clone();
        router.borrow_mut().register(sink(1), &dyn_root).unwrap();
        assert_eq!(root.observer_count(), 1);

        router.borrow_mut().unregister(sink(1));
        assert_eq!(root.observer_count(), 0);
        assert_eq!(router.borrow().registered_view_count(), 0);
    }

    #[test]
    fn test_dropped_view_is_unregistered() {
        let router = shared_router();
        let root: Rc<dyn View> = TestView::root(1);
        router.borrow_mut().register(sink(1), &root).unwrap();
        drop(root);
        assert_eq!(router.borrow().registered_view_count(), 0);
    }

    #[test]
    fn test_router_drop_removes_observers() {
        let router = shared_router();
        let root = TestView::root(1);
        let dyn_root: Rc<dyn View> = root.clone();
        router.borrow_mut().register(sink(1), &dyn_root).unwrap();
        drop(router);
        assert_eq!(root.observer_count(), 0);
    }

    #[test]
    fn test_single_view_routes_to_root_untransformed() {
        let router = shared_router();
        let root = TestView::root(1);
        let dyn_root: Rc<dyn View> = root.clone();
        router.borrow_mut().register(sink(1), &dyn_root).unwrap();

        let point = Point::new(12.0, 34.0);
        router
            .borrow_mut()
            .route_event(&dyn_root, TouchEvent::start(1, point))
            .unwrap();

        let events = root.events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].position(), point);
        assert_eq!(router.borrow().active_touches(), 1);
        assert_eq!(router.borrow().touch_target(), Some(sink(1)));
    }

    #[test]
    fn test_unsupported_gesture_device() {
        let router = shared_router();
        let root: Rc<dyn View> = TestView::root(1);
        let event = crate::input::GestureEvent::new(
            crate::input::GestureKind::ScrollBegin,
            GestureDevice::Scrollbar,
            Point::ZERO,
        );
        assert_eq!(
            router.borrow_mut().route_event(&root, event),
            Err(RouterError::UnsupportedGestureDevice(GestureDevice::Scrollbar))
        );
    }

    #[test]
    fn test_target_viewport_gesture_goes_to_root() {
        let router = shared_router();
        let root = TestView::root(1);
        let dyn_root: Rc<dyn View> = root.clone();
        let mut event = crate::input::GestureEvent::new(
            crate::input::GestureKind::ScrollBegin,
            GestureDevice::SyntheticAutoscroll,
            Point::ZERO,
        );
        event.target_viewport = true;
        router.borrow_mut().route_event(&dyn_root, event).unwrap();
        assert_eq!(root.events.borrow().len(), 1);
    }

    #[test]
    fn test_mouse_event_without_registration_reaches_root() {
        let mut router = InputEventRouter::new(Rc::new(NoData), RouterConfig::default());
        let root = TestView::root(1);
        let dyn_root: Rc<dyn View> = root.clone();
        router
            .route_event(&dyn_root, MouseEvent::moved(Point::new(1.0, 1.0)))
            .unwrap();
        assert_eq!(root.events.borrow().len(), 1);
        assert_eq!(router.last_mouse_move_target(), Some(sink(1)));
    }
}
