//! Minimal view fixture for unit tests

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::input::{AckResult, InputEvent};
use crate::view::{FrameSinkId, View, ViewObserver};

pub fn sink(n: u32) -> FrameSinkId {
    FrameSinkId::new(n, 1)
}

/// View that records what it receives
pub struct TestView {
    id: FrameSinkId,
    parent: Option<Weak<TestView>>,
    child_frame: bool,
    pub events: RefCell<Vec<InputEvent>>,
    pub acks: RefCell<Vec<(InputEvent, AckResult)>>,
    observers: RefCell<Vec<Weak<dyn ViewObserver>>>,
}

impl TestView {
    pub fn root(n: u32) -> Rc<TestView> {
        Rc::new(Self {
            id: sink(n),
            parent: None,
            child_frame: false,
            events: RefCell::default(),
            acks: RefCell::default(),
            observers: RefCell::default(),
        })
    }

    pub fn child(n: u32, parent: &Rc<TestView>) -> Rc<TestView> {
        Rc::new(Self {
            id: sink(n),
            parent: Some(Rc::downgrade(parent)),
            child_frame: true,
            events: RefCell::default(),
            acks: RefCell::default(),
            observers: RefCell::default(),
        })
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl View for TestView {
    fn frame_sink_id(&self) -> FrameSinkId {
        self.id
    }

    fn parent_view(&self) -> Option<Rc<dyn View>> {
        let parent = self.parent.as_ref()?.upgrade()?;
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
}

impl Drop for TestView {
    fn drop(&mut self) {
        let observers = std::mem::take(&mut *self.observers.borrow_mut());
        for observer in observers.iter().filter_map(Weak::upgrade) {
            observer.on_view_destroying(self);
        }
    }
}
