//! Shared fixtures for integration tests: recording views, a rect based hit
//! tester and a three level frame tree.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use kurbo::{Affine, Point, Rect, Vec2};

use frame_input_router::input::{AckResult, InputEvent, TouchAction};
use frame_input_router::view::{Cursor, MenuSource};
use frame_input_router::{
    EventSource, FrameSinkId, HitTarget, HitTestFlags, HitTester, InputEventRouter, QueryReply,
    RouterConfig, View, ViewObserver,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn sink(n: u32) -> FrameSinkId {
    FrameSinkId::new(n, 1)
}

/// View recording everything the router does to it
pub struct TestView {
    id: FrameSinkId,
    parent: RefCell<Option<Weak<TestView>>>,
    child_frame: bool,
    pub scale: Cell<f64>,
    pub touch_action: Cell<Option<TouchAction>>,
    pub mouse_locked: Cell<bool>,
    pub lock_widget: Cell<Option<FrameSinkId>>,
    pub unstable: Cell<bool>,
    pub defer_queries: Cell<bool>,
    pub events: RefCell<Vec<InputEvent>>,
    pub acks: RefCell<Vec<(InputEvent, AckResult)>>,
    pub forced_auto: Cell<u32>,
    pub stopped_flings: Cell<u32>,
    pub ignored_acks: RefCell<Vec<u32>>,
    pub cursor_updates: RefCell<Vec<(FrameSinkId, Cursor)>>,
    pub under_cursor: RefCell<Vec<FrameSinkId>>,
    pub context_menus: RefCell<Vec<(Point, MenuSource)>>,
    queries: RefCell<Vec<(Point, oneshot::Sender<Option<QueryReply>>)>>,
    observers: RefCell<Vec<Weak<dyn ViewObserver>>>,
}

impl TestView {
    fn build(n: u32, parent: Option<&Rc<TestView>>) -> Rc<TestView> {
        Rc::new(Self {
            id: sink(n),
            parent: RefCell::new(parent.map(Rc::downgrade)),
            child_frame: parent.is_some(),
            scale: Cell::new(1.0),
            touch_action: Cell::new(None),
            mouse_locked: Cell::new(false),
            lock_widget: Cell::new(None),
            unstable: Cell::new(false),
            defer_queries: Cell::new(false),
            events: RefCell::default(),
            acks: RefCell::default(),
            forced_auto: Cell::new(0),
            stopped_flings: Cell::new(0),
            ignored_acks: RefCell::default(),
            cursor_updates: RefCell::default(),
            under_cursor: RefCell::default(),
            context_menus: RefCell::default(),
            queries: RefCell::default(),
            observers: RefCell::default(),
        })
    }

    pub fn root(n: u32) -> Rc<TestView> {
        Self::build(n, None)
    }

    pub fn child(n: u32, parent: &Rc<TestView>) -> Rc<TestView> {
        Self::build(n, Some(parent))
    }

    pub fn as_dyn(self: &Rc<Self>) -> Rc<dyn View> {
        self.clone()
    }

    /// Detach from the parent, as when a frame connector goes away
    pub fn detach(&self) {
        *self.parent.borrow_mut() = None;
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn take_events(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events.borrow().iter().map(InputEvent::name).collect()
    }

    pub fn pending_queries(&self) -> usize {
        self.queries.borrow().len()
    }

    /// Answer the oldest outstanding target query
    pub fn answer_query(&self, reply: Option<QueryReply>) {
        let (_, sender) = self.queries.borrow_mut().remove(0);
        let _ = sender.send(reply);
    }
}

impl View for TestView {
    fn frame_sink_id(&self) -> FrameSinkId {
        self.id
    }

    fn parent_view(&self) -> Option<Rc<dyn View>> {
        let parent = self.parent.borrow().as_ref()?.upgrade()?;
        Some(parent)
    }

    fn is_child_frame(&self) -> bool {
        self.child_frame
    }

    fn dispatch(&self, event: &InputEvent) {
        self.events.borrow_mut().push(event.clone());
    }

    fn on_ack(&self, event: &InputEvent, result: AckResult) {
        self.acks.borrow_mut().push((event.clone(), result));
    }

    fn add_observer(&self, observer: Weak<dyn ViewObserver>) {
        self.observers.borrow_mut().push(observer);
    }

    fn remove_observer(&self, observer: &Weak<dyn ViewObserver>) {
        self.observers
            .borrow_mut()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    fn device_scale_factor(&self) -> f64 {
        self.scale.get()
    }

    fn is_mouse_locked(&self) -> bool {
        self.mouse_locked.get()
    }

    fn mouse_lock_widget(&self) -> Option<FrameSinkId> {
        self.lock_widget.get()
    }

    fn active_touch_action(&self) -> Option<TouchAction> {
        self.touch_action.get()
    }

    fn force_set_touch_action_auto(&self) {
        self.forced_auto.set(self.forced_auto.get() + 1);
    }

    fn screen_rect_is_unstable(&self) -> bool {
        self.unstable.get()
    }

    fn stop_fling(&self) {
        self.stopped_flings.set(self.stopped_flings.get() + 1);
    }

    fn ignore_touch_event_acks(&self, unique_touch_event_ids: &[u32]) {
        self.ignored_acks
            .borrow_mut()
            .extend_from_slice(unique_touch_event_ids);
    }

    fn query_target(&self, point: Point) -> LocalBoxFuture<'static, Option<QueryReply>> {
        if !self.defer_queries.get() {
            return future::ready(None).boxed_local();
        }
        let (sender, receiver) = oneshot::channel();
        self.queries.borrow_mut().push((point, sender));
        receiver.map(|reply| reply.ok().flatten()).boxed_local()
    }

    fn view_under_cursor_changed(&self, view: FrameSinkId) {
        self.under_cursor.borrow_mut().push(view);
    }

    fn update_cursor(&self, view: FrameSinkId, cursor: &Cursor) {
        self.cursor_updates.borrow_mut().push((view, cursor.clone()));
    }

    fn show_context_menu_at_point(&self, point: Point, source: MenuSource) {
        self.context_menus.borrow_mut().push((point, source));
    }
}

impl Drop for TestView {
    fn drop(&mut self) {
        let observers = std::mem::take(&mut *self.observers.borrow_mut());
        for observer in observers.iter().filter_map(Weak::upgrade) {
            observer.on_view_destroying(self);
        }
    }
}

struct Region {
    root: FrameSinkId,
    id: FrameSinkId,
    /// Bounds in root coordinates, physical pixels
    rect: Rect,
    flags: HitTestFlags,
}

/// Hit tester over axis-aligned rects; later regions are on top
#[derive(Default)]
pub struct TestHitTester {
    regions: RefCell<Vec<Region>>,
    pub hit_tests: Cell<usize>,
}

impl TestHitTester {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn add_region(&self, root: FrameSinkId, id: FrameSinkId, rect: Rect) {
        self.add_region_with_flags(root, id, rect, HitTestFlags::MINE);
    }

    pub fn add_region_with_flags(&self, root: FrameSinkId, id: FrameSinkId, rect: Rect, flags: HitTestFlags) {
        self.regions.borrow_mut().push(Region {
            root,
            id,
            rect,
            flags: flags | HitTestFlags::MOUSE | HitTestFlags::TOUCH,
        });
    }

    pub fn remove_region(&self, id: FrameSinkId) {
        self.regions.borrow_mut().retain(|r| r.id != id);
    }

    fn origin(&self, id: FrameSinkId) -> Option<Vec2> {
        let regions = self.regions.borrow();
        let region = regions.iter().find(|r| r.id == id)?;
        if region.root == id {
            return Some(Vec2::ZERO);
        }
        Some(region.rect.origin().to_vec2())
    }
}

impl HitTester for TestHitTester {
    fn hit_test(&self, root: FrameSinkId, point_px: Point, source: EventSource) -> Option<HitTarget> {
        self.hit_tests.set(self.hit_tests.get() + 1);
        let wanted = match source {
            EventSource::Mouse => HitTestFlags::MOUSE,
            EventSource::Touch => HitTestFlags::TOUCH,
        };
        let regions = self.regions.borrow();
        if !regions.iter().any(|r| r.root == root) {
            return None;
        }
        let hit = regions
            .iter()
            .rev()
            .filter(|r| r.root == root && r.flags.contains(wanted))
            .filter(|r| !r.flags.contains(HitTestFlags::IGNORE))
            .find(|r| r.rect.contains(point_px));
        Some(match hit {
            Some(region) => HitTarget {
                frame_sink_id: region.id,
                location_in_target: if region.id == root {
                    point_px
                } else {
                    point_px - region.rect.origin().to_vec2()
                },
                flags: region.flags,
            },
            None => HitTarget {
                frame_sink_id: FrameSinkId::INVALID,
                location_in_target: point_px,
                flags: HitTestFlags::empty(),
            },
        })
    }

    fn transform_to_view(&self, from: FrameSinkId, to: FrameSinkId) -> Option<Affine> {
        let from = self.origin(from)?;
        let to = self.origin(to)?;
        Some(Affine::translate(from - to))
    }
}

/// Root 1 (400x400) embedding child 2 at (100,100)-(300,300), which embeds
/// grandchild 3 at (150,150)-(200,200)
pub struct Frames {
    pub router: Rc<RefCell<InputEventRouter>>,
    pub hit_tester: Rc<TestHitTester>,
    pub root: Rc<TestView>,
    pub child: Rc<TestView>,
    pub grandchild: Rc<TestView>,
}

impl Frames {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        init_logger();
        let hit_tester = TestHitTester::new();
        let router = InputEventRouter::new_shared(hit_tester.clone(), config);

        let root = TestView::root(1);
        let child = TestView::child(2, &root);
        let grandchild = TestView::child(3, &child);
        hit_tester.add_region(sink(1), sink(1), Rect::new(0.0, 0.0, 400.0, 400.0));
        hit_tester.add_region(sink(1), sink(2), Rect::new(100.0, 100.0, 300.0, 300.0));
        hit_tester.add_region(sink(1), sink(3), Rect::new(150.0, 150.0, 200.0, 200.0));

        for view in [&root, &child, &grandchild] {
            router
                .borrow_mut()
                .register(view.frame_sink_id(), &view.as_dyn())
                .expect("fixture views register once");
        }

        Self {
            router,
            hit_tester,
            root,
            child,
            grandchild,
        }
    }

    pub fn root_dyn(&self) -> Rc<dyn View> {
        self.root.as_dyn()
    }

    /// Route `event` from the root
    pub fn route(&self, event: impl Into<InputEvent>) {
        self.router
            .borrow_mut()
            .route_event(&self.root_dyn(), event)
            .expect("routable event");
    }
}
