use super::Workspace;
use crate::backend::{SessionBackend, ViewBackend, ViewId};
use crate::error::LayoutError;
use crate::event::WorkspaceEvent;
use crate::layout::NodeId;
use crate::pane::PaneId;

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    /// Grow the active pane by one resize step, taken evenly from its
    /// siblings.
    pub fn expand_active_pane(&mut self) -> bool {
        self.nudge_active_pane(i64::from(self.config.behavior.resize_step))
    }

    pub fn shrink_active_pane(&mut self) -> bool {
        self.nudge_active_pane(-i64::from(self.config.behavior.resize_step))
    }

    fn nudge_active_pane(&mut self, delta: i64) -> bool {
        let Some(pane) = self.active_pane else {
            return false;
        };
        if !self.pane_tree.nudge(pane, delta) {
            log::debug!("resize of pane {pane} by {delta} refused");
            return false;
        }
        self.queue(WorkspaceEvent::LayoutChanged);
        self.flush();
        true
    }

    pub fn equalize_all_panes(&mut self) {
        self.pane_tree.equalize();
        self.queue(WorkspaceEvent::LayoutChanged);
        self.flush();
    }

    /// Equal shares for every splitter of one tab.
    pub fn equalize_tab(&mut self, pane: PaneId, index: usize) -> Result<(), LayoutError> {
        let root = self
            .tab_root(pane, index)
            .ok_or(LayoutError::UnknownTab { pane, index })?;
        self.splitters.equalize(root);
        self.queue(WorkspaceEvent::LayoutChanged);
        self.flush();
        Ok(())
    }

    /// Resize the children of a view splitter to the given percentages.
    pub fn resize_splits(&mut self, splitter: NodeId, percentages: &[f64]) -> Result<(), LayoutError> {
        self.tab_splitter(splitter)?;
        self.splitters.set_percentages(splitter, percentages)?;
        self.queue(WorkspaceEvent::LayoutChanged);
        self.flush();
        Ok(())
    }

    pub fn split_proportions(&self, splitter: NodeId) -> Result<Vec<f64>, LayoutError> {
        self.tab_splitter(splitter)?;
        Ok(self.splitters.proportions(splitter))
    }

    /// Grow (`delta > 0`) or shrink one view inside its splitter, in extent
    /// units.
    pub fn nudge_view(&mut self, view: ViewId, delta: i64) -> Result<bool, LayoutError> {
        let node = self
            .splitters
            .find_leaf(view)
            .filter(|_| self.contains_view(view))
            .ok_or(LayoutError::UnknownView(view))?;
        let resized = self.splitters.nudge(node, delta);
        if resized {
            self.queue(WorkspaceEvent::LayoutChanged);
            self.flush();
        }
        Ok(resized)
    }
}
