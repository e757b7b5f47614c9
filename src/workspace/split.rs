use std::path::PathBuf;

use super::Workspace;
use crate::backend::{SessionBackend, SessionId, SessionRequest, ViewBackend, ViewId};
use crate::error::LayoutError;
use crate::event::WorkspaceEvent;
use crate::layout::Orientation;
use crate::pane::{ConnectionState, PaneId};

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    /// Start a session in a new tab of the active pane (or of a new pane
    /// when the window has none yet).
    pub fn new_session(
        &mut self,
        profile: Option<&str>,
        working_directory: Option<PathBuf>,
    ) -> Result<ViewId, LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        let request = SessionRequest {
            profile: profile
                .map(str::to_string)
                .unwrap_or_else(|| self.config.behavior.default_profile.clone()),
            working_directory,
            container_context: None,
        };
        let session = self.sessions.create_session(&request);
        let view = self.create_view_for(session);
        self.sessions.run(session);
        let tab = self.single_view_tab(view);
        self.place_tab(tab);
        self.activate(view, true);
        log::info!("workspace {}: new session {session} in {view}", self.id);
        self.flush();
        Ok(view)
    }

    /// Request for a split session: profile, directory and container of the
    /// active session, subject to the behavior flags.
    fn inherited_request(&self) -> SessionRequest {
        let behavior = &self.config.behavior;
        let active = self.current_session();
        let profile = active
            .and_then(|s| self.sessions.profile(s))
            .unwrap_or_else(|| behavior.default_profile.clone());
        let working_directory = active
            .filter(|_| behavior.start_in_current_session_dir)
            .and_then(|s| self.sessions.working_directory(s));
        let container_context = active
            .filter(|_| behavior.inherit_container_context)
            .and_then(|s| self.sessions.container_context(s));
        SessionRequest {
            profile,
            working_directory,
            container_context,
        }
    }

    /// Open a new pane next to the active one.
    ///
    /// The new pane shows either a fresh session, or with `from_adjacent`
    /// the view taken out of the tab after the current one (its connection
    /// badge travels along, and that tab closes if it is left empty).
    pub fn split(&mut self, orientation: Orientation, from_adjacent: bool) -> Option<ViewId> {
        if self.closing {
            return None;
        }
        let Some(anchor) = self.active_pane.filter(|p| self.panes.contains_key(p)) else {
            log::debug!("split: no active pane");
            return None;
        };
        if from_adjacent {
            let next = self.panes.get(&anchor)?.current + 1;
            self.tab_focus_target(anchor, next)?;
        }
        // The pane goes in first so a rejected split leaves nothing behind.
        let pane = self.open_pane(Some(anchor), orientation)?;
        let taken = if from_adjacent {
            self.take_from_next_tab(anchor)
        } else {
            let request = self.inherited_request();
            let session = self.sessions.create_session(&request);
            let view = self.create_view_for(session);
            self.sessions.run(session);
            Some((view, None))
        };
        let Some((view, badge)) = taken else {
            self.settle_pane(pane);
            self.flush();
            return None;
        };
        let mut tab = self.single_view_tab(view);
        tab.meta.badge = badge;
        self.add_tab_to(pane, tab);
        log::debug!("split {anchor} {orientation:?} into {pane} showing {view}");
        self.activate(view, true);
        self.flush();
        Some(view)
    }

    fn take_from_next_tab(&mut self, pane: PaneId) -> Option<(ViewId, Option<ConnectionState>)> {
        let next = self.panes.get(&pane)?.current + 1;
        let view = self.tab_focus_target(pane, next)?;
        let badge = self.panes.get(&pane)?.tabs.get(next)?.meta.badge;
        let (_, root) = self.cut_view(view)?;
        self.settle_tab(pane, root);
        Some((view, badge))
    }

    /// Split horizontally when the active view is wider than it is tall.
    pub fn split_auto(&mut self, from_adjacent: bool) -> Option<ViewId> {
        let behavior = &self.config.behavior;
        let (columns, lines) = self
            .active_view()
            .and_then(|view| self.views.size(view))
            .unwrap_or((behavior.default_columns, behavior.default_lines));
        let orientation =
            if u32::from(columns) > u32::from(lines) * u32::from(behavior.cell_aspect) {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
        self.split(orientation, from_adjacent)
    }

    /// Focus `view`, then split next to its pane.
    pub fn create_split(&mut self, view: ViewId, orientation: Orientation) -> Option<ViewId> {
        if !self.activate(view, true) {
            return None;
        }
        self.split(orientation, false)
    }

    /// Ask the host to start a copy of the session shown in a tab.
    pub fn duplicate_session(&mut self, pane: PaneId, index: usize) -> Option<SessionId> {
        let view = self.tab_focus_target(pane, index)?;
        let session = self.bindings.session_of(view)?;
        self.queue(WorkspaceEvent::DuplicateSessionRequested { session });
        self.flush();
        Some(session)
    }

    /// Set the connection badge of every tab showing `session`.
    pub fn update_connection_state(&mut self, session: SessionId, state: Option<ConnectionState>) {
        for view in self.bindings.views_of(session) {
            let Some((pane, index)) = self.locate_view(view) else {
                continue;
            };
            if let Some(meta) = self.tab_meta_mut(pane, index) {
                meta.badge = state;
            }
        }
        self.queue(WorkspaceEvent::LayoutChanged);
        self.flush();
    }
}
