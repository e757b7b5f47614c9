use crate::backend::{SessionId, ViewId};
use crate::pane::PaneId;

/// Notifications for whoever renders the workspace. Sent after the
/// operation that caused them has finished mutating state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkspaceEvent {
    PaneAdded(PaneId),
    PaneRemoved(PaneId),
    TabAdded { pane: PaneId, index: usize },
    TabRemoved { pane: PaneId, index: usize },
    CurrentTabChanged { pane: PaneId, index: usize },
    ActiveViewChanged {
        pane: PaneId,
        view: ViewId,
        session: Option<SessionId>,
    },
    /// Splits, sizes or tab contents changed.
    LayoutChanged,
    /// The last view is gone; the host window should close.
    Empty,
    /// The user asked for a copy of the session shown in a tab.
    DuplicateSessionRequested { session: SessionId },
}
