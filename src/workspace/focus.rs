use super::Workspace;
use crate::backend::{SessionBackend, SessionId, ViewBackend, ViewId};
use crate::event::WorkspaceEvent;
use crate::geometry::{Direction, Side};
use crate::pane::{Pane, PaneId};

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    /// Make `view` the active view of the window without touching the
    /// widget side. With `record` the focus history is updated as well.
    fn focus_internal(&mut self, view: ViewId, record: bool) -> bool {
        let Some((pane, index)) = self.locate_view(view) else {
            return false;
        };
        let previous = self.active_view();
        let session = self.bindings.session_of(view);
        let Some(p) = self.panes.get_mut(&pane) else {
            return false;
        };
        let tab_changed = p.current != index;
        p.set_current(index);
        if let Some(tab) = p.tabs.get_mut(index) {
            tab.focused = Some(view);
        }
        p.focus_proxy = Some(view);
        self.active_pane = Some(pane);
        if record {
            self.history.touch(view);
        }
        if tab_changed {
            self.queue(WorkspaceEvent::CurrentTabChanged { pane, index });
        }
        if previous != Some(view) {
            self.queue(WorkspaceEvent::ActiveViewChanged {
                pane,
                view,
                session,
            });
        }
        true
    }

    /// Focus `view` and hand it keyboard input.
    pub(super) fn activate(&mut self, view: ViewId, record: bool) -> bool {
        if !self.focus_internal(view, record) {
            return false;
        }
        self.views.set_focus(view);
        true
    }

    /// Called by the host when a view received keyboard focus on its own,
    /// e.g. from a mouse click.
    pub fn view_focused(&mut self, view: ViewId) -> bool {
        let focused = self.focus_internal(view, true);
        self.flush();
        focused
    }

    pub fn focus_view(&mut self, view: ViewId) -> bool {
        let focused = self.activate(view, true);
        self.flush();
        focused
    }

    /// Focus the first view showing `session`.
    pub fn set_current_session(&mut self, session: SessionId) -> bool {
        match self.bindings.views_of(session).first() {
            Some(view) => self.focus_view(*view),
            None => false,
        }
    }

    /// Focus the current tab of `pane`.
    pub fn focus_pane(&mut self, pane: PaneId) -> bool {
        let Some(index) = self.panes.get(&pane).map(|p| p.current) else {
            return false;
        };
        self.set_current_tab(pane, index)
    }

    /// Focus the pane found just past the active pane's edge.
    pub fn focus_direction(&mut self, direction: Direction) -> bool {
        let Some(active) = self.active_pane else {
            return false;
        };
        let target = self.pane_tree.container_in_direction(
            active,
            direction,
            self.viewport,
            self.config.behavior.probe_offset,
        );
        match target {
            Some(pane) if pane != active => self.focus_pane(pane),
            _ => false,
        }
    }

    pub fn focus_next_pane(&mut self) -> bool {
        self.focus_pane_by_offset(1)
    }

    pub fn focus_previous_pane(&mut self) -> bool {
        self.focus_pane_by_offset(-1)
    }

    fn focus_pane_by_offset(&mut self, offset: isize) -> bool {
        let panes = self.pane_tree.panes();
        if panes.len() < 2 {
            return false;
        }
        let Some(current) = self
            .active_pane
            .and_then(|active| panes.iter().position(|p| *p == active))
        else {
            return false;
        };
        let len = panes.len() as isize;
        let next = (current as isize + offset).rem_euclid(len) as usize;
        self.focus_pane(panes[next])
    }

    pub fn next_tab(&mut self) -> bool {
        self.switch_tab_with(|pane| pane.next_tab())
    }

    pub fn previous_tab(&mut self) -> bool {
        self.switch_tab_with(|pane| pane.prev_tab())
    }

    pub fn last_tab(&mut self) -> bool {
        self.switch_tab_with(|pane| pane.last_tab())
    }

    fn switch_tab_with(&mut self, step: impl FnOnce(&mut Pane)) -> bool {
        let Some(pane) = self.active_pane else {
            return false;
        };
        let Some(mut scratch) = self.panes.get(&pane).cloned() else {
            return false;
        };
        step(&mut scratch);
        self.set_current_tab(pane, scratch.current)
    }

    /// Switch the active pane to tab `index`.
    pub fn switch_to_tab(&mut self, index: usize) -> bool {
        match self.active_pane {
            Some(pane) => self.set_current_tab(pane, index),
            None => false,
        }
    }

    /// Make tab `index` of `pane` current and focus the view it remembers.
    pub fn set_current_tab(&mut self, pane: PaneId, index: usize) -> bool {
        let Some(view) = self.tab_focus_target(pane, index) else {
            return false;
        };
        let focused = self.activate(view, true);
        self.flush();
        focused
    }

    /// Swap the active pane's current tab with its neighbour.
    pub fn move_active_tab(&mut self, side: Side) -> Option<usize> {
        let pane = self.active_pane?;
        let index = self.panes.get_mut(&pane)?.move_current_tab(side)?;
        self.queue(WorkspaceEvent::CurrentTabChanged { pane, index });
        self.queue(WorkspaceEvent::LayoutChanged);
        self.flush();
        Some(index)
    }

    /// Step through the focus history (the Ctrl+Tab gesture). The history
    /// keeps its order until [`Workspace::end_cycle`].
    pub fn cycle(&mut self, reverse: bool) -> Option<ViewId> {
        let view = self.history.cycle(reverse)?;
        self.activate(view, false);
        self.flush();
        Some(view)
    }

    /// Finish a cycling gesture, promoting the view it ended on.
    pub fn end_cycle(&mut self) -> Option<ViewId> {
        self.history.end_cycle()
    }

    /// Jump to the previously used view. While a cycling gesture is in
    /// progress the history and its cursor are left alone.
    pub fn toggle_alternate(&mut self) -> Option<ViewId> {
        let view = self.history.alternate()?;
        let record = !self.history.is_traversing();
        self.activate(view, record);
        self.flush();
        Some(view)
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::ViewId;
    use crate::event::WorkspaceEvent;
    use crate::geometry::{Direction, Side};
    use crate::layout::Orientation;
    use crate::workspace::tests::{drain, make_workspace, TestWorkspace};

    fn three_tabs() -> (TestWorkspace, Vec<ViewId>) {
        let (mut ws, _rx) = make_workspace();
        let views = (0..3).map(|_| ws.new_session(None, None).unwrap()).collect();
        (ws, views)
    }

    #[test]
    fn test_focusing_active_view_again_emits_nothing() {
        let (mut ws, mut rx) = make_workspace();
        let view = ws.new_session(None, None).unwrap();
        drain(&mut rx);
        assert!(ws.focus_view(view));
        assert!(ws.view_focused(view));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_focus_emits_single_active_change() {
        let (mut ws, mut rx) = make_workspace();
        let first = ws.new_session(None, None).unwrap();
        ws.new_session(None, None).unwrap();
        let pane = ws.active_pane().unwrap();
        drain(&mut rx);
        assert!(ws.focus_view(first));
        let session = ws.bindings().session_of(first);
        assert_eq!(
            drain(&mut rx),
            vec![
                WorkspaceEvent::CurrentTabChanged { pane, index: 0 },
                WorkspaceEvent::ActiveViewChanged {
                    pane,
                    view: first,
                    session
                },
            ]
        );
        assert_eq!(ws.views().focused(), Some(first));
        assert!(!ws.focus_view(ViewId(42)));
    }

    #[test]
    fn test_tab_navigation_wraps() {
        let (mut ws, views) = three_tabs();
        assert_eq!(ws.active_view(), Some(views[2]));
        assert!(ws.next_tab());
        assert_eq!(ws.active_view(), Some(views[0]));
        assert!(ws.previous_tab());
        assert_eq!(ws.active_view(), Some(views[2]));
        assert!(ws.switch_to_tab(1));
        assert_eq!(ws.active_view(), Some(views[1]));
        assert!(ws.last_tab());
        assert_eq!(ws.active_view(), Some(views[2]));
        assert!(!ws.switch_to_tab(7));
    }

    #[test]
    fn test_tab_remembers_focused_view() {
        let (mut ws, _rx) = make_workspace();
        ws.new_session(None, None).unwrap();
        let splitter = ws.splitter_of(ws.active_view().unwrap()).unwrap();
        let second = ws.new_session(None, None).unwrap();
        let pane = ws.active_pane().unwrap();
        let first = ws.views_in_tab(pane, 0)[0];
        // Pull the second tab's view into the first tab next to `first`.
        ws.move_view(second, splitter, 1).unwrap();
        ws.focus_view(second);
        ws.new_session(None, None).unwrap();
        assert!(ws.switch_to_tab(0));
        assert_eq!(ws.active_view(), Some(second));
        assert_ne!(ws.active_view(), Some(first));
    }

    #[test]
    fn test_move_active_tab() {
        let (mut ws, views) = three_tabs();
        let pane = ws.active_pane().unwrap();
        assert_eq!(ws.move_active_tab(Side::Second), None);
        assert_eq!(ws.move_active_tab(Side::First), Some(1));
        assert_eq!(ws.views_in_tab(pane, 1), vec![views[2]]);
        assert_eq!(ws.views_in_tab(pane, 2), vec![views[1]]);
        assert_eq!(ws.active_view(), Some(views[2]));
    }

    #[test]
    fn test_cycle_keeps_order_until_end() {
        let (mut ws, views) = three_tabs();
        assert_eq!(ws.history().entries(), &[views[2], views[1], views[0]]);
        assert_eq!(ws.cycle(false), Some(views[1]));
        assert_eq!(ws.active_view(), Some(views[1]));
        // The host reports the focus change it was asked for.
        ws.view_focused(views[1]);
        assert_eq!(ws.cycle(false), Some(views[0]));
        assert_eq!(ws.history().entries(), &[views[2], views[1], views[0]]);
        assert_eq!(ws.end_cycle(), Some(views[0]));
        assert_eq!(ws.history().entries(), &[views[0], views[2], views[1]]);
        assert!(!ws.history().is_traversing());
    }

    #[test]
    fn test_cycle_reverse_from_idle() {
        let (mut ws, views) = three_tabs();
        assert_eq!(ws.cycle(true), Some(views[0]));
        assert_eq!(ws.cycle(true), Some(views[1]));
        assert_eq!(ws.cycle(true), Some(views[2]));
    }

    #[test]
    fn test_click_during_cycle_keeps_order() {
        let (mut ws, views) = three_tabs();
        assert_eq!(ws.cycle(false), Some(views[1]));
        assert!(ws.view_focused(views[0]));
        assert_eq!(ws.active_view(), Some(views[0]));
        assert!(ws.history().is_traversing());
        assert_eq!(ws.history().entries(), &[views[2], views[1], views[0]]);
        assert_eq!(ws.end_cycle(), Some(views[1]));
        assert_eq!(ws.history().entries(), &[views[1], views[2], views[0]]);
    }

    #[test]
    fn test_toggle_alternate() {
        let (mut ws, views) = three_tabs();
        assert_eq!(ws.toggle_alternate(), Some(views[1]));
        assert_eq!(ws.history().entries(), &[views[1], views[2], views[0]]);
        assert_eq!(ws.toggle_alternate(), Some(views[2]));
        assert_eq!(ws.active_view(), Some(views[2]));
    }

    #[test]
    fn test_toggle_alternate_during_cycle_leaves_history() {
        let (mut ws, views) = three_tabs();
        ws.cycle(false);
        ws.cycle(false);
        assert_eq!(ws.toggle_alternate(), Some(views[1]));
        assert_eq!(ws.history().cursor(), Some(2));
        assert_eq!(ws.history().entries(), &[views[2], views[1], views[0]]);
    }

    #[test]
    fn test_focus_direction_and_pane_cycling() {
        let (mut ws, _rx) = make_workspace();
        let left = ws.new_session(None, None).unwrap();
        let right = ws.split(Orientation::Horizontal, false).unwrap();
        assert!(ws.focus_direction(Direction::Left));
        assert_eq!(ws.active_view(), Some(left));
        assert!(!ws.focus_direction(Direction::Left));
        assert!(!ws.focus_direction(Direction::Up));
        assert!(ws.focus_direction(Direction::Right));
        assert_eq!(ws.active_view(), Some(right));
        assert!(ws.focus_next_pane());
        assert_eq!(ws.active_view(), Some(left));
        assert!(ws.focus_previous_pane());
        assert_eq!(ws.active_view(), Some(right));
    }

    #[test]
    fn test_set_current_session() {
        let (mut ws, views) = three_tabs();
        let session = ws.bindings().session_of(views[0]).unwrap();
        assert!(ws.set_current_session(session));
        assert_eq!(ws.active_view(), Some(views[0]));
        assert_eq!(ws.current_session(), Some(session));
    }
}
