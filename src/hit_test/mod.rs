//! Hit testing: which frame owns a point of a root view
//!
//! The compositor's hit-test data is reached through the [`HitTester`]
//! trait. Event-class specific targeting lives in the router; the
//! [`EventTargeter`] holds the asynchronous "ask the renderer" path.

mod targeter;

pub use targeter::{EventTargeter, ResolvedTarget, TargetingSequence};

use std::rc::Rc;

use bitflags::bitflags;
use kurbo::{Affine, Point, Rect};

use crate::view::{FrameSinkId, View};

/// Which hit-test tree to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    Mouse,
    Touch,
}

bitflags! {
    /// Flags attached to a hit-test region
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HitTestFlags: u16 {
        const MINE = 1 << 0;
        const CHILD_SURFACE = 1 << 1;
        const IGNORE = 1 << 2;
        const MOUSE = 1 << 3;
        const TOUCH = 1 << 4;
        /// The compositor data is not precise enough; the renderer owning
        /// the region must be asked.
        const ASK = 1 << 5;
    }
}

/// Answer of a synchronous hit test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTarget {
    /// Owner of the point; [`FrameSinkId::INVALID`] if nothing was hit
    pub frame_sink_id: FrameSinkId,
    /// Point in the target's space, in physical pixels
    pub location_in_target: Point,
    pub flags: HitTestFlags,
}

/// A hit-test region as published by the compositor
#[derive(Debug, Clone, PartialEq)]
pub struct HitTestRegion {
    pub frame_sink_id: FrameSinkId,
    pub flags: HitTestFlags,
    pub rect: Rect,
    /// Root to region transform
    pub transform: Affine,
}

/// Answer of an asynchronous renderer query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryReply {
    pub frame_sink_id: FrameSinkId,
    /// Point in the replying target's coordinates
    pub location: Point,
}

/// Compositor hit-test oracle.
///
/// Points passed to [`HitTester::hit_test`] are in physical pixels of the
/// root; transforms map device independent coordinates.
pub trait HitTester {
    /// Find the surface under `point_px`, starting from `root`.
    ///
    /// Returns `None` when there is no hit-test data for `root` yet.
    fn hit_test(&self, root: FrameSinkId, point_px: Point, source: EventSource)
    -> Option<HitTarget>;

    /// Transform from `from`'s coordinate space into `to`'s
    fn transform_to_view(&self, from: FrameSinkId, to: FrameSinkId) -> Option<Affine>;

    fn transform_point(&self, from: FrameSinkId, to: FrameSinkId, point: Point) -> Option<Point> {
        if from == to {
            return Some(point);
        }
        self.transform_to_view(from, to).map(|transform| transform * point)
    }
}

/// Outcome of the find-target phase
#[derive(Clone, Default)]
pub struct TargetResult {
    /// Target, or the view to query when `should_query` is set. `None`
    /// either means "no consumer" or, with `latched`, "use the latch".
    pub view: Option<Rc<dyn View>>,
    pub should_query: bool,
    /// Event position in the target's coordinates
    pub location: Option<Point>,
    /// The target came from a latch rather than a fresh hit test
    pub latched: bool,
    pub should_verify: bool,
}

impl TargetResult {
    /// Defer to whatever target the dispatch phase has latched
    pub fn use_latch() -> Self {
        Self {
            latched: true,
            ..Self::default()
        }
    }

    /// A resolved target with the event position in its coordinates
    pub fn found(view: Rc<dyn View>, location: Point, latched: bool) -> Self {
        Self {
            view: Some(view),
            location: Some(location),
            latched,
            ..Self::default()
        }
    }

    /// No view can take the event
    pub fn none(latched: bool) -> Self {
        Self {
            latched,
            ..Self::default()
        }
    }

    pub fn target_id(&self) -> Option<FrameSinkId> {
        self.view.as_ref().map(|view| view.frame_sink_id())
    }
}

impl std::fmt::Debug for TargetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetResult")
            .field("view", &self.target_id())
            .field("should_query", &self.should_query)
            .field("location", &self.location)
            .field("latched", &self.latched)
            .field("should_verify", &self.should_verify)
            .finish()
    }
}

/// Convert a point in device independent pixels to physical pixels
pub fn to_pixels(point: Point, device_scale_factor: f64) -> Point {
    Point::new(point.x * device_scale_factor, point.y * device_scale_factor)
}

/// Convert a point in physical pixels to device independent pixels
pub fn to_dips(point: Point, device_scale_factor: f64) -> Point {
    Point::new(point.x / device_scale_factor, point.y / device_scale_factor)
}
