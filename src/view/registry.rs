//! Frame view registry: maps frame sink ids to the live views owning them

use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::{FrameSinkId, View};
use crate::utils::{Result, RouterError};

/// Non-owning map from frame sink id to view
#[derive(Default)]
pub struct FrameViewRegistry {
    views: HashMap<FrameSinkId, Weak<dyn View>>,
}

impl FrameViewRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            views: HashMap::new(),
        }
    }

    /// Record `view` as the owner of `id`.
    ///
    /// At most one view may own an id at a time; registering a second one is
    /// a bug in the frame-tree bookkeeping.
    pub fn register(&mut self, id: FrameSinkId, view: &Rc<dyn View>) -> Result<()> {
        if !id.is_valid() {
            return Err(RouterError::InvalidFrameSinkId);
        }
        if self.views.contains_key(&id) {
            debug_assert!(false, "frame sink {id} registered twice");
            return Err(RouterError::AlreadyRegistered(id));
        }
        self.views.insert(id, Rc::downgrade(view));
        Ok(())
    }

    /// Forget the owner of `id`, returning it if it is still alive
    pub fn remove(&mut self, id: FrameSinkId) -> Option<Rc<dyn View>> {
        self.views.remove(&id).and_then(|weak| weak.upgrade())
    }

    /// Live view owning `id`.
    ///
    /// Unknown ids are expected: a hit test can name a surface whose view was
    /// destroyed before the embedder caught up.
    pub fn lookup(&self, id: FrameSinkId) -> Option<Rc<dyn View>> {
        let view = self.views.get(&id)?.upgrade()?;
        if view.frame_sink_id() != id {
            log::warn!(
                "registry entry {} is stale, view now owns {}",
                id,
                view.frame_sink_id()
            );
            return None;
        }
        Some(view)
    }

    /// Whether `id` has a registered owner, alive or not
    pub fn contains(&self, id: FrameSinkId) -> bool {
        self.views.contains_key(&id)
    }

    /// Number of registered ids
    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Live registered views, for broadcasts
    pub fn views(&self) -> impl Iterator<Item = Rc<dyn View>> + '_ {
        self.views.values().filter_map(Weak::upgrade)
    }

    /// Remove every entry, returning the views still alive
    pub fn clear(&mut self) -> Vec<Rc<dyn View>> {
        self.views
            .drain()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect()
    }
}
