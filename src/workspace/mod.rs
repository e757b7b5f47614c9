//! The orchestrator: panes, tabs, view splitters, the session binding table
//! and the focus history, behind a single mutation entry point.
//!
//! Every public operation finishes its tree surgery before any
//! [`WorkspaceEvent`] is sent, so a listener never observes a half-moved
//! node.

mod close;
mod detach;
mod focus;
mod moves;
mod persist;
mod resize;
mod split;

pub use detach::{DetachedLayout, DetachedNode};
pub use moves::LayoutItem;

use std::collections::HashMap;

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::backend::{SessionBackend, SessionId, ViewBackend, ViewId};
use crate::binding::Bindings;
use crate::config::Config;
use crate::error::LayoutError;
use crate::event::WorkspaceEvent;
use crate::history::FocusHistory;
use crate::layout::{NodeId, Orientation, Shape, SplitTree};
use crate::pane::{Pane, PaneId, Tab, TabMeta};
use crate::pane_tree::{PaneTree, Removal};

pub struct Workspace<S: SessionBackend, V: ViewBackend> {
    id: u32,
    sessions: S,
    views: V,
    config: Config,
    pane_tree: PaneTree,
    panes: HashMap<PaneId, Pane>,
    active_pane: Option<PaneId>,
    /// Every tab's splitter tree lives in this one arena.
    splitters: SplitTree<ViewId>,
    bindings: Bindings,
    history: FocusHistory,
    next_view_id: u32,
    viewport: Rect,
    closing: bool,
    pending: Vec<WorkspaceEvent>,
    event_tx: mpsc::UnboundedSender<WorkspaceEvent>,
}

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    /// An empty workspace. `id` tells workspaces of one process apart.
    pub fn new(
        id: u32,
        sessions: S,
        views: V,
        config: Config,
        event_tx: mpsc::UnboundedSender<WorkspaceEvent>,
    ) -> Self {
        let viewport = Rect::new(
            0,
            0,
            config.behavior.default_columns,
            config.behavior.default_lines,
        );
        Self {
            id,
            sessions,
            views,
            config,
            pane_tree: PaneTree::new(Orientation::Horizontal),
            panes: HashMap::new(),
            active_pane: None,
            splitters: SplitTree::new(),
            bindings: Bindings::new(),
            history: FocusHistory::new(),
            next_view_id: 1,
            viewport,
            closing: false,
            pending: Vec::new(),
            event_tx,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub fn sessions_mut(&mut self) -> &mut S {
        &mut self.sessions
    }

    pub fn views(&self) -> &V {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut V {
        &mut self.views
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pane_tree(&self) -> &PaneTree {
        &self.pane_tree
    }

    pub fn splitters(&self) -> &SplitTree<ViewId> {
        &self.splitters
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn history(&self) -> &FocusHistory {
        &self.history
    }

    pub fn pane(&self, pane: PaneId) -> Option<&Pane> {
        self.panes.get(&pane)
    }

    /// Panes in tree order.
    pub fn panes(&self) -> Vec<PaneId> {
        self.pane_tree.panes()
    }

    pub fn active_pane(&self) -> Option<PaneId> {
        self.active_pane
    }

    /// The view keyboard input goes to.
    pub fn active_view(&self) -> Option<ViewId> {
        self.active_pane
            .and_then(|pane| self.panes.get(&pane))
            .and_then(|pane| pane.focus_proxy)
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.active_view()
            .and_then(|view| self.bindings.session_of(view))
    }

    pub fn session_list(&self) -> Vec<SessionId> {
        self.bindings.sessions()
    }

    pub fn session_count(&self) -> usize {
        self.bindings.session_count()
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Area the pane tree is laid out in for directional navigation.
    pub fn set_viewport(&mut self, area: Rect) {
        self.viewport = area;
    }

    pub fn tab_root(&self, pane: PaneId, index: usize) -> Option<NodeId> {
        self.panes.get(&pane)?.tabs.get(index).map(|tab| tab.root)
    }

    pub fn tab_meta_mut(&mut self, pane: PaneId, index: usize) -> Option<&mut TabMeta> {
        self.panes
            .get_mut(&pane)?
            .tabs
            .get_mut(index)
            .map(|tab| &mut tab.meta)
    }

    pub fn views_in_tab(&self, pane: PaneId, index: usize) -> Vec<ViewId> {
        self.tab_root(pane, index)
            .map(|root| self.splitters.leaves(root))
            .unwrap_or_default()
    }

    /// Every view reachable from the pane tree, pane by pane and tab by tab.
    pub fn all_views(&self) -> Vec<ViewId> {
        self.pane_tree
            .panes()
            .iter()
            .filter_map(|pane| self.panes.get(pane))
            .flat_map(|pane| pane.tabs.iter())
            .flat_map(|tab| self.splitters.leaves(tab.root))
            .collect()
    }

    pub fn view_count(&self) -> usize {
        self.all_views().len()
    }

    /// Pane and tab index showing `view`.
    pub fn locate_view(&self, view: ViewId) -> Option<(PaneId, usize)> {
        let node = self.splitters.find_leaf(view)?;
        self.locate_root(self.splitters.top_level(node))
    }

    pub fn contains_view(&self, view: ViewId) -> bool {
        self.locate_view(view).is_some()
    }

    /// Splitter directly holding `view`.
    pub fn splitter_of(&self, view: ViewId) -> Option<NodeId> {
        let node = self.splitters.find_leaf(view)?;
        self.splitters.parent(node)
    }

    pub fn tab_shape(&self, pane: PaneId, index: usize) -> Option<Shape> {
        self.splitters.shape(self.tab_root(pane, index)?)
    }

    /// One line per tab, e.g. `H[v1|V[v2|v3]]`, in pane order.
    pub fn view_hierarchy(&self) -> Vec<String> {
        self.pane_tree
            .panes()
            .iter()
            .filter_map(|pane| self.panes.get(pane))
            .flat_map(|pane| pane.tabs.iter())
            .map(|tab| self.splitters.describe(tab.root, &|view: ViewId| view.to_string()))
            .collect()
    }

    /// Cross-checks the pane tree, the pane table, every tab tree, the
    /// binding table and the focus history against each other.
    pub fn is_well_formed(&self) -> bool {
        if !self.pane_tree.is_well_formed() {
            return false;
        }
        let ordered = self.pane_tree.panes();
        if ordered.len() != self.panes.len() || ordered.iter().any(|p| !self.panes.contains_key(p)) {
            return false;
        }
        let tabs_ok = self.panes.values().all(|pane| {
            !pane.tabs.is_empty()
                && pane.current < pane.tabs.len()
                && pane.tabs.iter().all(|tab| {
                    self.splitters.is_well_formed(tab.root)
                        && !self.splitters.leaves(tab.root).is_empty()
                })
        });
        let views = self.all_views();
        let bindings_ok = views.iter().all(|view| self.bindings.session_of(*view).is_some())
            && self.bindings.len() == views.len();
        let history_ok = self.history.entries().iter().all(|view| views.contains(view));
        tabs_ok && bindings_ok && history_ok
    }

    // -----------------------------------------------------------------------
    // Internal helpers shared by the operation modules
    // -----------------------------------------------------------------------

    fn queue(&mut self, event: WorkspaceEvent) {
        self.pending.push(event);
    }

    /// Deliver queued events. A dropped receiver is not an error.
    fn flush(&mut self) {
        for event in self.pending.drain(..) {
            let _ = self.event_tx.send(event);
        }
    }

    fn alloc_view(&mut self) -> ViewId {
        let view = ViewId(self.next_view_id);
        self.next_view_id += 1;
        self.views.create_view(view);
        self.history.push(view);
        view
    }

    fn create_view_for(&mut self, session: SessionId) -> ViewId {
        let view = self.alloc_view();
        self.bindings.bind(view, session);
        view
    }

    /// Unbind a view and forget it in the history without destroying it.
    fn release(&mut self, view: ViewId) {
        self.bindings.unbind(view);
        self.history.remove(view);
    }

    fn locate_root(&self, root: NodeId) -> Option<(PaneId, usize)> {
        self.panes
            .values()
            .find_map(|pane| pane.tab_index(root).map(|index| (pane.id, index)))
    }

    /// A splitter that belongs to some tab, with the pane and tab root it
    /// sits in.
    fn tab_splitter(&self, splitter: NodeId) -> Result<(PaneId, NodeId), LayoutError> {
        if !self.splitters.is_split(splitter) {
            return Err(LayoutError::UnknownSplitter);
        }
        let root = self.splitters.top_level(splitter);
        self.locate_root(root)
            .map(|(pane, _)| (pane, root))
            .ok_or(LayoutError::UnknownSplitter)
    }

    /// A fresh tab holding just `view`.
    fn single_view_tab(&mut self, view: ViewId) -> Tab {
        let root = self.splitters.add_root(Orientation::Horizontal);
        let leaf = self.splitters.add_leaf(view);
        self.splitters.append(root, leaf, Orientation::Horizontal);
        Tab::new(root)
    }

    /// View a tab hands focus to: the one last focused in it, else its first.
    fn tab_focus_target(&self, pane: PaneId, index: usize) -> Option<ViewId> {
        let tab = self.panes.get(&pane)?.tabs.get(index)?;
        let leaves = self.splitters.leaves(tab.root);
        tab.focused
            .filter(|view| leaves.contains(view))
            .or_else(|| leaves.first().copied())
    }

    fn add_tab_to(&mut self, pane: PaneId, tab: Tab) -> Option<usize> {
        let index = self.panes.get_mut(&pane)?.add_tab(tab);
        self.queue(WorkspaceEvent::TabAdded { pane, index });
        Some(index)
    }

    /// Put an empty pane into the pane tree next to `anchor`.
    fn open_pane(&mut self, anchor: Option<PaneId>, orientation: Orientation) -> Option<PaneId> {
        let id = PaneId::new_v4();
        if !self.pane_tree.add_pane(id, anchor, orientation) {
            return None;
        }
        self.panes.insert(id, Pane::new(id));
        self.queue(WorkspaceEvent::PaneAdded(id));
        Some(id)
    }

    /// Put a new pane holding `tab` into the pane tree next to `anchor`.
    fn insert_pane(&mut self, tab: Tab, anchor: Option<PaneId>, orientation: Orientation) -> Option<PaneId> {
        let id = self.open_pane(anchor, orientation)?;
        self.add_tab_to(id, tab)?;
        Some(id)
    }

    /// Add `tab` to the active pane, or to a new pane when there is none.
    fn place_tab(&mut self, tab: Tab) -> Option<PaneId> {
        let target = self
            .active_pane
            .filter(|pane| self.panes.contains_key(pane))
            .or_else(|| self.pane_tree.panes().first().copied());
        match target {
            Some(pane) => self.add_tab_to(pane, tab).map(|_| pane),
            None => {
                let orientation = self.pane_tree.orientation();
                self.insert_pane(tab, None, orientation)
            }
        }
    }

    /// Take the leaf of `view` out of its tab, unwrapping whatever splitter
    /// that leaves with a single child. Returns the pane and tab root it
    /// came from. Bindings, history and the view itself are untouched.
    fn cut_view(&mut self, view: ViewId) -> Option<(PaneId, NodeId)> {
        let node = self.splitters.find_leaf(view)?;
        let root = self.splitters.top_level(node);
        let (pane, index) = self.locate_root(root)?;
        if let Some(parent) = self.splitters.detach(node) {
            self.splitters.normalize(parent);
        }
        self.splitters.remove_subtree(node);
        if let Some(p) = self.panes.get_mut(&pane) {
            if p.focus_proxy == Some(view) {
                p.focus_proxy = None;
            }
            if let Some(tab) = p.tabs.get_mut(index) {
                if tab.focused == Some(view) {
                    tab.focused = None;
                }
            }
        }
        Some((pane, root))
    }

    /// Drop the tab rooted at `root` if it no longer shows any view, then
    /// the pane if it lost its last tab.
    fn settle_tab(&mut self, pane: PaneId, root: NodeId) {
        if !self.splitters.contains(root) || self.splitters.leaves(root).is_empty() {
            let removed = self.panes.get_mut(&pane).and_then(|p| {
                let index = p.tab_index(root)?;
                p.remove_tab(index).map(|_| index)
            });
            if let Some(index) = removed {
                self.splitters.remove_subtree(root);
                log::debug!("tab {index} of pane {pane} emptied and removed");
                self.queue(WorkspaceEvent::TabRemoved { pane, index });
            }
            self.settle_pane(pane);
        }
        self.refresh_focus_proxy(pane);
    }

    /// Take a whole tab out of `pane`, splitter tree included. The pane may
    /// be left empty; see [`Workspace::settle_pane`].
    fn take_tab(&mut self, pane: PaneId, index: usize) -> Option<Tab> {
        let p = self.panes.get_mut(&pane)?;
        let tab = p.remove_tab(index)?;
        let splitters = &self.splitters;
        let proxy_in_tab = p.focus_proxy.is_some_and(|view| {
            splitters
                .find_leaf(view)
                .is_some_and(|node| splitters.top_level(node) == tab.root)
        });
        if proxy_in_tab {
            p.focus_proxy = None;
        }
        self.queue(WorkspaceEvent::TabRemoved { pane, index });
        Some(tab)
    }

    /// Point an inactive pane that lost its focus proxy at its current tab.
    /// The active pane is refocused by the operation itself.
    fn refresh_focus_proxy(&mut self, pane: PaneId) {
        if self.active_pane == Some(pane) {
            return;
        }
        let Some(current) = self
            .panes
            .get(&pane)
            .filter(|p| p.focus_proxy.is_none())
            .map(|p| p.current)
        else {
            return;
        };
        let proxy = self.tab_focus_target(pane, current);
        if let Some(p) = self.panes.get_mut(&pane) {
            p.focus_proxy = proxy;
        }
    }

    /// Remove `pane` from the pane tree if it has no tabs left.
    fn settle_pane(&mut self, pane: PaneId) {
        if !self.panes.get(&pane).is_some_and(Pane::is_empty) {
            return;
        }
        match self.pane_tree.remove_pane(pane) {
            Removal::LastPane => {
                log::debug!("pane {pane} is empty but is the last pane; keeping it");
                return;
            }
            Removal::Removed | Removal::NotFound => {}
        }
        self.panes.remove(&pane);
        if self.active_pane == Some(pane) {
            self.active_pane = self.pane_tree.panes().first().copied();
        }
        log::debug!("pane {pane} removed");
        self.queue(WorkspaceEvent::PaneRemoved(pane));
    }
}
