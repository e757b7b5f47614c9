use std::collections::HashMap;

use crate::backend::{SessionId, ViewId};

/// View to session table. Each live view has at most one entry.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    views: HashMap<ViewId, SessionId>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `view` to `session`, returning the session it was bound to before.
    pub fn bind(&mut self, view: ViewId, session: SessionId) -> Option<SessionId> {
        self.views.insert(view, session)
    }

    pub fn unbind(&mut self, view: ViewId) -> Option<SessionId> {
        self.views.remove(&view)
    }

    pub fn session_of(&self, view: ViewId) -> Option<SessionId> {
        self.views.get(&view).copied()
    }

    /// Views bound to `session`, lowest id first.
    pub fn views_of(&self, session: SessionId) -> Vec<ViewId> {
        let mut views: Vec<ViewId> = self
            .views
            .iter()
            .filter(|(_, bound)| **bound == session)
            .map(|(view, _)| *view)
            .collect();
        views.sort();
        views
    }

    pub fn has_views(&self, session: SessionId) -> bool {
        self.views.values().any(|bound| *bound == session)
    }

    /// Distinct sessions with at least one view, lowest id first.
    pub fn sessions(&self) -> Vec<SessionId> {
        let mut sessions: Vec<SessionId> = self.views.values().copied().collect();
        sessions.sort();
        sessions.dedup();
        sessions
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
