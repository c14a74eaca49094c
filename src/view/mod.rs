//! Views: the per-frame surfaces events are routed to
//!
//! Views are owned by their frame-tree infrastructure. The router keeps only
//! [`FrameSinkId`] handles and `Weak` references, resolved through the
//! [`FrameViewRegistry`] whenever a latched target is used.

mod registry;

pub use registry::FrameViewRegistry;

use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::{self, FutureExt, LocalBoxFuture};
use kurbo::Point;

use crate::hit_test::{HitTestRegion, QueryReply};
use crate::input::{AckResult, InputEvent, TouchAction};

/// Stable identifier of a view's compositor surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FrameSinkId {
    pub client_id: u32,
    pub sink_id: u32,
}

impl FrameSinkId {
    /// The id no view ever owns
    pub const INVALID: FrameSinkId = FrameSinkId {
        client_id: 0,
        sink_id: 0,
    };

    pub const fn new(client_id: u32, sink_id: u32) -> Self {
        Self { client_id, sink_id }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for FrameSinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.client_id, self.sink_id)
    }
}

/// Cursor shapes broadcast to views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    Pointer,
    Hand,
    Text,
    Wait,
    Move,
    Custom(u32),
}

/// What triggered a context menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSource {
    Mouse,
    Keyboard,
    Touch,
    LongPress,
}

/// Receives the destruction notice of views the router is registered with.
///
/// Views deliver the notice between router operations, never from inside a
/// `dispatch` call, and must not hold a borrow of their observer list while
/// notifying since the observer unsubscribes itself.
pub trait ViewObserver {
    fn on_view_destroying(&self, view: &dyn View);
}

/// Capability interface of a frame's view.
///
/// Only the first group of methods is required; the remaining ones cover
/// features (mouse lock, touch-action, cursors, async hit testing) a simple
/// view does not need.
pub trait View {
    /// Surface this view renders into
    fn frame_sink_id(&self) -> FrameSinkId;

    /// Embedding view, `None` for roots and for detached child frames
    fn parent_view(&self) -> Option<Rc<dyn View>>;

    /// Whether this view is embedded in another view
    fn is_child_frame(&self) -> bool;

    /// Deliver an event already transformed into this view's coordinates
    fn dispatch(&self, event: &InputEvent);

    /// Receive the disposition of an event this root view routed
    fn on_ack(&self, event: &InputEvent, result: AckResult);

    fn add_observer(&self, observer: Weak<dyn ViewObserver>);

    fn remove_observer(&self, observer: &Weak<dyn ViewObserver>);

    fn device_scale_factor(&self) -> f64 {
        1.0
    }

    fn is_mouse_locked(&self) -> bool {
        false
    }

    /// View holding the mouse lock, queried on root views
    fn mouse_lock_widget(&self) -> Option<FrameSinkId> {
        None
    }

    /// Touch-action assessed for the current touch sequence, if any
    fn active_touch_action(&self) -> Option<TouchAction> {
        None
    }

    fn force_set_touch_action_auto(&self) {}

    /// Whether the view's screen rect moved too recently to trust a tap
    fn screen_rect_is_unstable(&self) -> bool {
        false
    }

    /// Stop the fling this view is currently generating
    fn stop_fling(&self) {}

    /// Stop waiting for acks of the given touch events
    fn ignore_touch_event_acks(&self, _unique_touch_event_ids: &[u32]) {}

    /// Ask the renderer behind this view which frame owns `point`, given in
    /// this view's coordinates. Resolves to `None` when the view itself is
    /// the target.
    fn query_target(&self, _point: Point) -> LocalBoxFuture<'static, Option<QueryReply>> {
        future::ready(None).boxed_local()
    }

    /// Called on root views when the view under the cursor changed
    fn view_under_cursor_changed(&self, _view: FrameSinkId) {}

    /// Called on root views to update the cursor of a contained view
    fn update_cursor(&self, _view: FrameSinkId, _cursor: &Cursor) {}

    fn hit_test_region_updated(&self, _region: &HitTestRegion) {}

    fn show_context_menu_at_point(&self, _point: Point, _source: MenuSource) {}
}

/// Root of the tree `view` belongs to, or `None` if a child frame on the way
/// up is detached.
pub fn root_of(view: &Rc<dyn View>) -> Option<Rc<dyn View>> {
    let mut current = Rc::clone(view);
    while current.is_child_frame() {
        current = current.parent_view()?;
    }
    Some(current)
}

/// Whether `target` is a strict ancestor of `start`.
///
/// With `stay_within`, the walk stops (answering `false`) on reaching that
/// view.
pub fn is_ancestor(
    start: &Rc<dyn View>,
    target: FrameSinkId,
    stay_within: Option<FrameSinkId>,
) -> bool {
    let mut current = start.parent_view();
    while let Some(view) = current {
        let id = view.frame_sink_id();
        if id == target {
            return true;
        }
        if stay_within == Some(id) {
            return false;
        }
        current = if view.is_child_frame() {
            view.parent_view()
        } else {
            None
        };
    }
    false
}

/// `view` followed by its ancestors, ending at the root.
///
/// Returns `None` if the chain hits a detached child frame.
pub fn ancestor_chain(view: &Rc<dyn View>) -> Option<Vec<Rc<dyn View>>> {
    let mut chain = vec![Rc::clone(view)];
    let mut current = Rc::clone(view);
    while current.is_child_frame() {
        current = current.parent_view()?;
        chain.push(Rc::clone(&current));
    }
    Some(chain)
}
