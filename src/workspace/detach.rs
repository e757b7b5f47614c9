use super::Workspace;
use crate::backend::{SessionBackend, SessionHandoff, SessionId, SessionRequest, ViewBackend, ViewId};
use crate::error::LayoutError;
use crate::event::WorkspaceEvent;
use crate::layout::{NodeId, NodeKind, Orientation, Shape};
use crate::pane::{PaneId, Tab, TabMeta};

/// A subtree cut out of one workspace, ready to be adopted by another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetachedNode {
    View {
        view: ViewId,
        session: SessionHandoff,
    },
    Split {
        orientation: Orientation,
        sizes: Vec<u32>,
        children: Vec<DetachedNode>,
    },
}

impl DetachedNode {
    pub fn views(&self) -> Vec<ViewId> {
        match self {
            DetachedNode::View { view, .. } => vec![*view],
            DetachedNode::Split { children, .. } => {
                children.iter().flat_map(DetachedNode::views).collect()
            }
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            DetachedNode::View { .. } => Shape::Leaf,
            DetachedNode::Split {
                orientation,
                children,
                ..
            } => Shape::Split(*orientation, children.iter().map(DetachedNode::shape).collect()),
        }
    }

    fn bindings(&self, out: &mut Vec<(ViewId, SessionId)>) {
        match self {
            DetachedNode::View { view, session } => out.push((*view, session.origin)),
            DetachedNode::Split { children, .. } => {
                for child in children {
                    child.bindings(out);
                }
            }
        }
    }
}

/// A detached tab, or a single detached view wrapped as one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetachedLayout {
    pub root: DetachedNode,
    pub meta: TabMeta,
}

impl DetachedLayout {
    pub fn views(&self) -> Vec<ViewId> {
        self.root.views()
    }

    /// View to session pairs carried along with the layout, with the
    /// session ids of the workspace the layout was cut from.
    pub fn bindings(&self) -> Vec<(ViewId, SessionId)> {
        let mut out = Vec::new();
        self.root.bindings(&mut out);
        out
    }
}

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    fn handoff(&self, view: ViewId) -> Option<SessionHandoff> {
        let session = self.bindings.session_of(view)?;
        let profile = self
            .sessions
            .profile(session)
            .unwrap_or_else(|| self.config.behavior.default_profile.clone());
        Some(SessionHandoff {
            origin: session,
            restore_id: self.sessions.restore_id(session),
            request: SessionRequest {
                profile,
                working_directory: self.sessions.working_directory(session),
                container_context: self.sessions.container_context(session),
            },
            running: self.sessions.is_running(session),
        })
    }

    fn snapshot(&self, node: NodeId) -> Option<DetachedNode> {
        match self.splitters.kind(node)? {
            NodeKind::Leaf(view) => Some(DetachedNode::View {
                view: *view,
                session: self.handoff(*view)?,
            }),
            NodeKind::Split(split) => Some(DetachedNode::Split {
                orientation: split.orientation,
                sizes: split.sizes.clone(),
                children: split
                    .children
                    .iter()
                    .filter_map(|child| self.snapshot(*child))
                    .collect(),
            }),
        }
    }

    /// Cut one view out of this window. Its session keeps running and is
    /// handed over with the layout; the view itself is not destroyed.
    pub fn detach_view(&mut self, view: ViewId) -> Result<DetachedLayout, LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        let (pane, index) = self.locate_view(view).ok_or(LayoutError::UnknownView(view))?;
        if self.view_count() <= 1 {
            return Err(LayoutError::LastView);
        }
        let session = self.handoff(view).ok_or(LayoutError::UnknownView(view))?;
        let was_active = self.active_view() == Some(view);
        let badge = self.panes.get(&pane).and_then(|p| p.tabs.get(index)).and_then(|t| t.meta.badge);
        let layout = DetachedLayout {
            root: DetachedNode::View { view, session },
            meta: TabMeta {
                badge,
                ..TabMeta::default()
            },
        };
        if let Some((pane, root)) = self.cut_view(view) {
            self.release(view);
            self.settle_tab(pane, root);
            self.queue(WorkspaceEvent::LayoutChanged);
            if was_active {
                self.refocus(Some(root));
            }
        }
        log::debug!("detached {view} from pane {pane}");
        self.flush();
        Ok(layout)
    }

    /// Cut a whole tab out of this window, splitter tree and all.
    pub fn detach_tab(&mut self, pane: PaneId, index: usize) -> Result<DetachedLayout, LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        if !self.panes.contains_key(&pane) {
            return Err(LayoutError::UnknownPane(pane));
        }
        let root = self
            .tab_root(pane, index)
            .ok_or(LayoutError::UnknownTab { pane, index })?;
        let views = self.splitters.leaves(root);
        if views.len() >= self.view_count() {
            return Err(LayoutError::LastView);
        }
        let root_snapshot = self.snapshot(root).ok_or(LayoutError::UnknownTab { pane, index })?;
        let was_active = self.active_view().is_some_and(|view| views.contains(&view));
        let Some(tab) = self.take_tab(pane, index) else {
            return Err(LayoutError::UnknownTab { pane, index });
        };
        self.splitters.remove_subtree(root);
        for view in &views {
            self.release(*view);
        }
        self.settle_pane(pane);
        self.refresh_focus_proxy(pane);
        self.queue(WorkspaceEvent::LayoutChanged);
        if was_active {
            self.refocus(None);
        }
        log::debug!("detached tab {index} of pane {pane} with {} view(s)", views.len());
        self.flush();
        Ok(DetachedLayout {
            root: root_snapshot,
            meta: tab.meta,
        })
    }

    pub fn detach_active_view(&mut self) -> Result<DetachedLayout, LayoutError> {
        let view = self.active_view().ok_or(LayoutError::NoActivePane)?;
        self.detach_view(view)
    }

    pub fn detach_active_tab(&mut self) -> Result<DetachedLayout, LayoutError> {
        let pane = self.active_pane.ok_or(LayoutError::NoActivePane)?;
        let index = self
            .panes
            .get(&pane)
            .map(|p| p.current)
            .ok_or(LayoutError::NoActivePane)?;
        self.detach_tab(pane, index)
    }

    /// Take in a layout detached from another workspace as a new tab of the
    /// active pane. Its sessions are handed to this workspace's session
    /// backend and rebound under the ids it returns. View ids that would
    /// collide with ids already handed out here are replaced; the returned
    /// list holds the ids in use afterwards, in layout order.
    pub fn adopt(&mut self, layout: DetachedLayout) -> Result<Vec<ViewId>, LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        if layout.views().is_empty() {
            return Err(LayoutError::NothingToMove);
        }
        let orientation = match &layout.root {
            DetachedNode::Split { orientation, .. } => *orientation,
            DetachedNode::View { .. } => Orientation::Horizontal,
        };
        let root = self.splitters.add_root(orientation);
        let mut adopted = Vec::new();
        match &layout.root {
            DetachedNode::Split {
                sizes, children, ..
            } => {
                for child in children {
                    self.graft(root, child, &mut adopted);
                }
                self.splitters.set_sizes(root, sizes);
            }
            leaf => self.graft(root, leaf, &mut adopted),
        }
        self.splitters.normalize_subtree(root);

        let mut tab = Tab::new(root);
        tab.meta = layout.meta;
        self.place_tab(tab);
        if let Some(first) = adopted.first().copied() {
            self.activate(first, true);
        }
        self.queue(WorkspaceEvent::LayoutChanged);
        log::debug!("workspace {} adopted {} view(s)", self.id, adopted.len());
        self.flush();
        Ok(adopted)
    }

    fn graft(&mut self, parent: NodeId, node: &DetachedNode, adopted: &mut Vec<ViewId>) {
        let orientation = self
            .splitters
            .split(parent)
            .map_or(Orientation::Horizontal, |split| split.orientation);
        match node {
            DetachedNode::View { view, session } => {
                let view = self.claim_view_id(*view);
                self.views.adopt_view(view);
                self.history.push(view);
                let session = self.sessions.adopt_session(session);
                self.bindings.bind(view, session);
                let leaf = self.splitters.add_leaf(view);
                self.splitters.append(parent, leaf, orientation);
                adopted.push(view);
            }
            DetachedNode::Split {
                orientation: inner,
                sizes,
                children,
            } => {
                let split = self.splitters.add_root(*inner);
                for child in children {
                    self.graft(split, child, adopted);
                }
                self.splitters.set_sizes(split, sizes);
                self.splitters.append(parent, split, orientation);
            }
        }
    }

    /// Keep `view` when it is beyond every id handed out here, otherwise
    /// allocate a fresh one.
    fn claim_view_id(&mut self, view: ViewId) -> ViewId {
        if view.0 >= self.next_view_id {
            self.next_view_id = view.0.saturating_add(1);
            return view;
        }
        let fresh = ViewId(self.next_view_id);
        self.next_view_id += 1;
        fresh
    }
}
