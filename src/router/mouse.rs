//! Mouse targeting, capture and enter/leave synthesis

use std::rc::Rc;

use kurbo::Point;

use super::InputEventRouter;
use crate::hit_test::{EventSource, TargetResult};
use crate::input::{InputEvent, MouseEvent, MouseEventKind};
use crate::view::{ancestor_chain, FrameSinkId, View};

impl InputEventRouter {
    pub(super) fn find_mouse_target(
        &mut self,
        root: &Rc<dyn View>,
        event: &MouseEvent,
    ) -> TargetResult {
        let root_id = root.frame_sink_id();
        let mut target: Option<Rc<dyn View>> = None;
        let mut location = None;

        if self.route_to_root_for_devtools {
            target = Some(Rc::clone(root));
        }

        if target.is_none() && root.is_mouse_locked() {
            target = self.view(root.mouse_lock_widget());
        }

        // Capture only matters while dragging.
        if target.is_none() && (event.kind == MouseEventKind::Up || event.is_button_down()) {
            if let Some(capture) = self.view(self.mouse_capture_target) {
                // Reuse the MouseDown transform so the release lands exactly
                // where the press did.
                if event.kind == MouseEventKind::Up
                    && self.last_mouse_down_target == Some(capture.frame_sink_id())
                    && self.mouse_down_pre_transform == Some(event.position)
                {
                    location = self.mouse_down_post_transform;
                }
                target = Some(capture);
            }
        }

        let Some(target) = target else {
            let mut result = self.find_view_at_location(root, event.position, EventSource::Mouse);
            // Moves are too frequent to verify.
            if event.kind == MouseEventKind::Move {
                result.should_verify = false;
            }
            if event.kind == MouseEventKind::Down {
                self.mouse_down_pre_transform = Some(event.position);
            }
            return result;
        };

        let location = location.or_else(|| {
            self.hit_tester
                .transform_point(root_id, target.frame_sink_id(), event.position)
        });
        match location {
            Some(location) => TargetResult::found(target, location, true),
            None => TargetResult::none(true),
        }
    }

    pub(super) fn dispatch_mouse_event(
        &mut self,
        root: &Rc<dyn View>,
        target: Option<Rc<dyn View>>,
        event: MouseEvent,
        location: Option<Point>,
    ) {
        let Some(target) = target else {
            return;
        };
        let target_id = target.frame_sink_id();

        // Released implicitly so events arriving before the renderer releases
        // capture, or after a MouseUp lost outside the window, are hit tested.
        if event.kind == MouseEventKind::Up || !event.is_button_down() {
            self.mouse_capture_target = None;
        }

        if event.kind == MouseEventKind::Down
            && self.config.touch_emulation_capture
            && self.touch_emulation_enabled()
        {
            self.mouse_capture_target = Some(target_id);
        }

        debug_assert!(location.is_some(), "mouse target without a location");
        let mut routed = event.clone();
        routed.position = location.unwrap_or(event.position);

        if matches!(event.kind, MouseEventKind::Leave | MouseEventKind::Move)
            && self.last_mouse_move_target != Some(target_id)
            && !root.is_mouse_locked()
        {
            self.send_mouse_enter_or_leave_events(&event, &target, root);
            root.view_under_cursor_changed(target_id);
        }

        target.dispatch(&InputEvent::Mouse(routed));
    }

    /// Tell the views the cursor left and entered.
    ///
    /// The previous target and its ancestors below the lowest common
    /// ancestor get a MouseLeave, the common ancestor gets a MouseMove unless
    /// it is the new target, and the new target's ancestors below the common
    /// ancestor get a MouseMove. `event` is in root coordinates.
    fn send_mouse_enter_or_leave_events(
        &mut self,
        event: &MouseEvent,
        target: &Rc<dyn View>,
        root: &Rc<dyn View>,
    ) {
        let root_id = root.frame_sink_id();
        let target_id = target.frame_sink_id();

        // No common coordinate space with a target in another root.
        if self.last_mouse_move_root != Some(root_id) {
            self.last_mouse_move_target = None;
        }

        let Some(mut entered) = ancestor_chain(target) else {
            // Detached child frame.
            self.last_mouse_move_target = Some(target_id);
            self.last_mouse_move_root = Some(root_id);
            return;
        };
        if entered.last().map(|v| v.frame_sink_id()) != Some(root_id) {
            log::warn!("mouse target {target_id} is outside root {root_id}");
            return;
        }

        let mut exited = match self.view(self.last_mouse_move_target) {
            Some(last) => match ancestor_chain(&last) {
                Some(chain) => chain,
                None => {
                    self.last_mouse_move_target = Some(target_id);
                    self.last_mouse_move_root = Some(root_id);
                    return;
                }
            },
            None => Vec::new(),
        };

        let mut common_ancestor = None;
        while let (Some(e), Some(x)) = (entered.last(), exited.last()) {
            if e.frame_sink_id() != x.frame_sink_id() {
                break;
            }
            common_ancestor = entered.pop();
            exited.pop();
        }

        for view in &exited {
            self.send_synthetic_mouse_event(event, view, root_id, MouseEventKind::Leave);
        }
        if let Some(ancestor) = common_ancestor.filter(|a| a.frame_sink_id() != target_id) {
            self.send_synthetic_mouse_event(event, &ancestor, root_id, MouseEventKind::Move);
        }
        for view in entered.iter().filter(|v| v.frame_sink_id() != target_id) {
            self.send_synthetic_mouse_event(event, view, root_id, MouseEventKind::Move);
        }

        self.last_mouse_move_target = Some(target_id);
        self.last_mouse_move_root = Some(root_id);
    }

    fn send_synthetic_mouse_event(
        &self,
        event: &MouseEvent,
        view: &Rc<dyn View>,
        root_id: FrameSinkId,
        kind: MouseEventKind,
    ) {
        // A view with a brand new surface may not be transformable yet.
        let position = self
            .hit_tester
            .transform_point(root_id, view.frame_sink_id(), event.position)
            .unwrap_or(Point::ZERO);
        let synthetic = MouseEvent {
            kind,
            position,
            ..event.clone()
        };
        view.dispatch(&InputEvent::Mouse(synthetic));
    }
}
