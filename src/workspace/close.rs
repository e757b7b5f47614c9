use super::Workspace;
use crate::backend::{SessionBackend, SessionId, ViewBackend, ViewId};
use crate::error::LayoutError;
use crate::event::WorkspaceEvent;
use crate::layout::NodeId;

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    /// The session's process ended: drop every view showing it. When that
    /// would leave the window without views, only the empty signal is sent.
    pub fn session_finished(&mut self, session: SessionId) {
        if self.closing {
            return;
        }
        let views = self.bindings.views_of(session);
        if views.is_empty() {
            return;
        }
        log::debug!("session {session} finished, dropping {} view(s)", views.len());
        if views.len() >= self.view_count() {
            self.signal_empty();
            return;
        }
        for view in views {
            self.remove_view(view);
        }
        self.flush();
    }

    /// Close one view, and its session once no other view shows it.
    pub fn close_view(&mut self, view: ViewId) -> Result<(), LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        if !self.contains_view(view) {
            return Err(LayoutError::UnknownView(view));
        }
        let session = self.bindings.session_of(view);
        if self.view_count() == 1 {
            if let Some(session) = session {
                self.sessions.close(session);
            }
            self.signal_empty();
            return Ok(());
        }
        self.remove_view(view);
        if let Some(session) = session.filter(|s| !self.bindings.has_views(*s)) {
            self.sessions.close(session);
        }
        self.flush();
        Ok(())
    }

    pub fn close_active_view(&mut self) -> Result<(), LayoutError> {
        let view = self.active_view().ok_or(LayoutError::NoActivePane)?;
        self.close_view(view)
    }

    /// Close every session and tell the host the window is done.
    pub fn close_all(&mut self) {
        if self.closing {
            return;
        }
        for session in self.bindings.sessions() {
            self.sessions.close(session);
        }
        self.signal_empty();
    }

    /// Enter the closing state. `Empty` goes out at most once per workspace.
    fn signal_empty(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        log::info!("workspace {}: last view closed", self.id);
        self.queue(WorkspaceEvent::Empty);
        self.flush();
    }

    /// Tear a view out of the layout and destroy it.
    fn remove_view(&mut self, view: ViewId) {
        let was_active = self.active_view() == Some(view);
        let Some((pane, root)) = self.cut_view(view) else {
            return;
        };
        self.release(view);
        self.views.destroy_view(view);
        self.settle_tab(pane, root);
        self.queue(WorkspaceEvent::LayoutChanged);
        if was_active {
            self.refocus(Some(root));
        }
    }

    /// Pick a new active view after the old one went away: the most
    /// recently used view still in `former_root`, else the most recently
    /// used view anywhere.
    pub(super) fn refocus(&mut self, former_root: Option<NodeId>) {
        let former_pane = self.active_pane.take();
        let same_tab = former_root
            .filter(|root| self.splitters.contains(*root))
            .and_then(|root| {
                let leaves = self.splitters.leaves(root);
                self.history
                    .entries()
                    .iter()
                    .copied()
                    .find(|view| leaves.contains(view))
            });
        let target = same_tab
            .or_else(|| self.history.front())
            .or_else(|| self.all_views().first().copied());
        match target {
            Some(view) => {
                self.activate(view, true);
            }
            None => self.active_pane = self.pane_tree.panes().first().copied(),
        }
        if let Some(pane) = former_pane {
            self.refresh_focus_proxy(pane);
        }
    }
}
