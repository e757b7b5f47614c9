use std::collections::HashMap;
use std::path::PathBuf;

use super::Workspace;
use crate::backend::{SessionBackend, SessionRequest, ViewBackend, ViewId};
use crate::codec::{PaneDoc, SessionDocument, SplitterDoc, TerminalDoc, WidgetDoc};
use crate::layout::{NodeId, NodeKind, Orientation};
use crate::pane::{PaneId, Tab};

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    /// Describe every pane, tab and view for a later
    /// [`Workspace::restore_sessions`].
    pub fn save_sessions(&self) -> SessionDocument {
        let order = self.pane_tree.panes();
        let panes: Vec<PaneDoc> = order
            .iter()
            .filter_map(|id| self.panes.get(id))
            .map(|pane| PaneDoc {
                tabs: pane
                    .tabs
                    .iter()
                    .filter_map(|tab| self.splitter_doc(tab.root))
                    .collect(),
                active: pane.current as i64,
            })
            .collect();
        let active_pane = self
            .active_pane
            .and_then(|active| order.iter().position(|id| *id == active))
            .unwrap_or(0);
        let (tabs, active) = panes
            .first()
            .map(|pane| (pane.tabs.clone(), pane.active))
            .unwrap_or_default();
        SessionDocument {
            panes,
            active_pane: active_pane as i64,
            orientation: self.pane_tree.orientation(),
            tabs,
            active,
            sessions: Vec::new(),
        }
    }

    /// Rebuild a saved window into this workspace. The richest form present
    /// wins: the multi-pane layout, then the single-pane tab list, then the
    /// flat session list; when none yields a view a default session is
    /// started. Entries that cannot be resolved are skipped.
    ///
    /// With `use_session_id` views attach to live sessions found by restore
    /// id; otherwise every terminal gets a fresh session. Returns the number
    /// of views created.
    pub fn restore_sessions(&mut self, doc: &SessionDocument, use_session_id: bool) -> usize {
        if self.closing {
            return 0;
        }
        let mut restored = self.restore_panes(doc, use_session_id);
        if restored == 0 && !doc.tabs.is_empty() {
            log::debug!("no usable pane layout, reading the tab list");
            restored = self.restore_tab_list(&doc.tabs, doc.active, use_session_id);
        }
        if restored == 0 && !doc.sessions.is_empty() {
            log::debug!("no usable tab list, reading the session list");
            restored = self.restore_session_list(&doc.sessions, doc.active);
        }
        if restored == 0 {
            log::info!("nothing to restore, starting a default session");
            if self.new_session(None, None).is_ok() {
                restored = 1;
            }
        }
        self.flush();
        restored
    }

    fn restore_panes(&mut self, doc: &SessionDocument, use_session_id: bool) -> usize {
        let mut restored = 0;
        let mut placed: HashMap<usize, PaneId> = HashMap::new();
        let mut reuse = self.active_pane.filter(|pane| self.panes.contains_key(pane));
        for (index, pane_doc) in doc.panes.iter().enumerate() {
            let roots: Vec<NodeId> = pane_doc
                .tabs
                .iter()
                .filter_map(|tab| self.build_tab(tab, use_session_id))
                .collect();
            if roots.is_empty() {
                log::debug!("pane {index} of the saved layout has no usable tab");
                continue;
            }
            restored += roots.iter().map(|root| self.splitters.leaves(*root).len()).sum::<usize>();
            let Some((pane, first)) = self.place_roots(reuse.take(), roots, doc.orientation) else {
                continue;
            };
            self.focus_saved_tab(pane, first, pane_doc.active);
            placed.insert(index, pane);
        }
        let active = usize::try_from(doc.active_pane)
            .ok()
            .and_then(|index| placed.get(&index).copied())
            .or_else(|| (0..doc.panes.len()).find_map(|index| placed.get(&index).copied()));
        if let Some(pane) = active {
            let current = self.panes.get(&pane).map_or(0, |p| p.current);
            if let Some(view) = self.tab_focus_target(pane, current) {
                self.activate(view, true);
            }
        }
        restored
    }

    fn restore_tab_list(&mut self, tabs: &[SplitterDoc], active: i64, use_session_id: bool) -> usize {
        let roots: Vec<NodeId> = tabs
            .iter()
            .filter_map(|tab| self.build_tab(tab, use_session_id))
            .collect();
        let restored = roots.iter().map(|root| self.splitters.leaves(*root).len()).sum();
        let target = self.active_pane.filter(|pane| self.panes.contains_key(pane));
        let orientation = self.pane_tree.orientation();
        if let Some((pane, first)) = self.place_roots(target, roots, orientation) {
            self.focus_saved_tab(pane, first, active);
        }
        restored
    }

    /// The oldest form: one tab per live session, `active` counting from 1.
    fn restore_session_list(&mut self, ids: &[i32], active: i64) -> usize {
        let mut focus = None;
        let mut restored = 0;
        for (position, restore_id) in ids.iter().enumerate() {
            let Some(session) = self.sessions.find_by_restore_id(*restore_id) else {
                log::warn!("unable to find session with restore id {restore_id}");
                continue;
            };
            let view = self.create_view_for(session);
            if !self.sessions.is_running(session) {
                self.sessions.run(session);
            }
            let tab = self.single_view_tab(view);
            self.place_tab(tab);
            restored += 1;
            if position as i64 + 1 == active {
                focus = Some(view);
            }
        }
        if let Some(view) = focus {
            self.activate(view, true);
        }
        restored
    }

    /// Put tab roots into `pane`, or into a new pane appended to the pane
    /// tree. Returns the pane and the index of the first tab placed.
    fn place_roots(
        &mut self,
        pane: Option<PaneId>,
        roots: Vec<NodeId>,
        orientation: Orientation,
    ) -> Option<(PaneId, usize)> {
        let mut roots = roots.into_iter();
        let (pane, first) = match pane {
            Some(pane) => {
                let first = self.add_tab_to(pane, Tab::new(roots.next()?))?;
                (pane, first)
            }
            None => (self.insert_pane(Tab::new(roots.next()?), None, orientation)?, 0),
        };
        for root in roots {
            self.add_tab_to(pane, Tab::new(root));
        }
        Some((pane, first))
    }

    /// Make the saved current tab (counted from `first`) current in `pane`.
    /// An out of range index leaves the last restored tab current.
    fn focus_saved_tab(&mut self, pane: PaneId, first: usize, active: i64) {
        let Some(count) = self.panes.get(&pane).map(|p| p.tab_count()) else {
            return;
        };
        let index = usize::try_from(active)
            .ok()
            .map(|active| first + active)
            .filter(|index| *index < count)
            .unwrap_or(count.saturating_sub(1));
        if let Some(view) = self.tab_focus_target(pane, index) {
            self.activate(view, true);
        }
    }

    /// Build a detached tab tree from a saved splitter. `None` when no
    /// terminal in it could be restored.
    fn build_tab(&mut self, doc: &SplitterDoc, use_session_id: bool) -> Option<NodeId> {
        let root = self.splitters.add_root(doc.orientation);
        self.build_children(root, doc, use_session_id);
        if self.splitters.leaves(root).is_empty() {
            self.splitters.remove_subtree(root);
            return None;
        }
        self.splitters.normalize_subtree(root);
        Some(root)
    }

    fn build_children(&mut self, parent: NodeId, doc: &SplitterDoc, use_session_id: bool) {
        for widget in &doc.widgets {
            match widget {
                WidgetDoc::Terminal(terminal) => {
                    if let Some(view) = self.restore_terminal(terminal, use_session_id) {
                        let leaf = self.splitters.add_leaf(view);
                        self.splitters.append(parent, leaf, doc.orientation);
                    }
                }
                WidgetDoc::Splitter(splitter) => {
                    let child = self.splitters.add_root(splitter.orientation);
                    self.build_children(child, splitter, use_session_id);
                    if self.splitters.leaves(child).is_empty() {
                        self.splitters.remove_subtree(child);
                    } else {
                        self.splitters.append(parent, child, doc.orientation);
                    }
                }
            }
        }
    }

    fn restore_terminal(&mut self, terminal: &TerminalDoc, use_session_id: bool) -> Option<ViewId> {
        let working_directory =
            (!terminal.working_directory.is_empty()).then(|| PathBuf::from(&terminal.working_directory));
        let session = if use_session_id {
            match self.sessions.find_by_restore_id(terminal.session_restore_id) {
                Some(session) => session,
                None => {
                    log::warn!(
                        "skipping terminal with unknown restore id {}",
                        terminal.session_restore_id
                    );
                    return None;
                }
            }
        } else {
            let request = SessionRequest {
                profile: self.config.behavior.default_profile.clone(),
                working_directory: working_directory.clone(),
                container_context: None,
            };
            self.sessions.create_session(&request)
        };
        let view = self.create_view_for(session);
        if terminal.columns > 0 && terminal.lines > 0 {
            self.views.set_size(view, terminal.columns, terminal.lines);
        }
        if let Some(dir) = working_directory {
            self.sessions.set_initial_working_directory(session, dir);
        }
        if !self.sessions.is_running(session) {
            self.sessions.run(session);
        }
        let command = terminal.command.as_str();
        if !command.is_empty() && self.sessions.program(session).as_deref() != Some(command) {
            self.sessions.run_command(session, command);
        }
        Some(view)
    }

    /// The active tab as a standalone layout.
    pub fn save_layout(&self) -> Option<SplitterDoc> {
        let pane = self.panes.get(&self.active_pane?)?;
        self.splitter_doc(pane.current_tab()?.root)
    }

    /// Open a saved tab layout as a new tab of the active pane, with fresh
    /// sessions. Returns the view that receives focus.
    pub fn load_layout(&mut self, doc: &SplitterDoc) -> Option<ViewId> {
        if self.closing {
            return None;
        }
        let root = self.build_tab(doc, false)?;
        let view = self.splitters.leaves(root).first().copied();
        self.place_tab(Tab::new(root));
        if let Some(view) = view {
            self.activate(view, true);
        }
        self.flush();
        view
    }

    fn splitter_doc(&self, node: NodeId) -> Option<SplitterDoc> {
        let split = self.splitters.split(node)?;
        Some(SplitterDoc {
            orientation: split.orientation,
            widgets: split
                .children
                .iter()
                .filter_map(|child| self.widget_doc(*child))
                .collect(),
        })
    }

    fn widget_doc(&self, node: NodeId) -> Option<WidgetDoc> {
        match self.splitters.kind(node)? {
            NodeKind::Leaf(view) => Some(WidgetDoc::Terminal(self.terminal_doc(*view))),
            NodeKind::Split(_) => self.splitter_doc(node).map(WidgetDoc::Splitter),
        }
    }

    fn terminal_doc(&self, view: ViewId) -> TerminalDoc {
        let behavior = &self.config.behavior;
        let session = self.bindings.session_of(view);
        let (columns, lines) = self
            .views
            .size(view)
            .unwrap_or((behavior.default_columns, behavior.default_lines));
        TerminalDoc {
            session_restore_id: session.map_or(0, |s| self.sessions.restore_id(s)),
            columns,
            lines,
            working_directory: session
                .and_then(|s| self.sessions.working_directory(s))
                .map(|dir| dir.display().to_string())
                .unwrap_or_default(),
            command: String::new(),
        }
    }
}
