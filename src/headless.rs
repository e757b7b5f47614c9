//! In-memory backends with no processes and no widgets. The CLI drives
//! layouts through them and tests inspect what the workspace asked for.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::backend::{SessionBackend, SessionId, SessionRequest, ViewBackend, ViewId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessSession {
    pub restore_id: i32,
    pub profile: String,
    pub working_directory: Option<PathBuf>,
    pub container_context: Option<String>,
    pub program: String,
    /// Commands typed into the session, oldest first.
    pub commands: Vec<String>,
    pub running: bool,
    pub closed: bool,
}

#[derive(Clone, Debug)]
pub struct HeadlessSessions {
    sessions: BTreeMap<SessionId, HeadlessSession>,
    next_id: u32,
    program: String,
}

impl Default for HeadlessSessions {
    fn default() -> Self {
        Self::with_program("sh")
    }
}

impl HeadlessSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            sessions: BTreeMap::new(),
            next_id: 1,
            program: program.into(),
        }
    }

    pub fn get(&self, session: SessionId) -> Option<&HeadlessSession> {
        self.sessions.get(&session)
    }

    /// Sessions that have not been closed.
    pub fn live(&self) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|(_, session)| !session.closed)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionBackend for HeadlessSessions {
    fn create_session(&mut self, request: &SessionRequest) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(
            id,
            HeadlessSession {
                restore_id: id.0 as i32,
                profile: request.profile.clone(),
                working_directory: request.working_directory.clone(),
                container_context: request.container_context.clone(),
                program: self.program.clone(),
                commands: Vec::new(),
                running: false,
                closed: false,
            },
        );
        id
    }

    fn find_by_restore_id(&self, restore_id: i32) -> Option<SessionId> {
        self.sessions
            .iter()
            .find(|(_, session)| session.restore_id == restore_id && !session.closed)
            .map(|(id, _)| *id)
    }

    fn restore_id(&self, session: SessionId) -> i32 {
        self.sessions.get(&session).map_or(0, |s| s.restore_id)
    }

    fn profile(&self, session: SessionId) -> Option<String> {
        self.sessions.get(&session).map(|s| s.profile.clone())
    }

    fn working_directory(&self, session: SessionId) -> Option<PathBuf> {
        self.sessions.get(&session)?.working_directory.clone()
    }

    fn container_context(&self, session: SessionId) -> Option<String> {
        self.sessions.get(&session)?.container_context.clone()
    }

    fn program(&self, session: SessionId) -> Option<String> {
        self.sessions.get(&session).map(|s| s.program.clone())
    }

    fn set_initial_working_directory(&mut self, session: SessionId, dir: PathBuf) {
        if let Some(s) = self.sessions.get_mut(&session) {
            s.working_directory = Some(dir);
        }
    }

    fn run_command(&mut self, session: SessionId, command: &str) {
        if let Some(s) = self.sessions.get_mut(&session) {
            s.commands.push(command.to_string());
        }
    }

    fn is_running(&self, session: SessionId) -> bool {
        self.sessions.get(&session).is_some_and(|s| s.running)
    }

    fn run(&mut self, session: SessionId) {
        if let Some(s) = self.sessions.get_mut(&session) {
            if !s.closed {
                s.running = true;
            }
        }
    }

    fn close(&mut self, session: SessionId) {
        if let Some(s) = self.sessions.get_mut(&session) {
            s.running = false;
            s.closed = true;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadlessView {
    pub size: Option<(u16, u16)>,
    pub adopted: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HeadlessViews {
    views: BTreeMap<ViewId, HeadlessView>,
    focused: Option<ViewId>,
    destroyed: Vec<ViewId>,
}

impl HeadlessViews {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, view: ViewId) -> Option<&HeadlessView> {
        self.views.get(&view)
    }

    pub fn ids(&self) -> Vec<ViewId> {
        self.views.keys().copied().collect()
    }

    /// View that last received keyboard focus.
    pub fn focused(&self) -> Option<ViewId> {
        self.focused
    }

    /// Destroyed views, in order.
    pub fn destroyed(&self) -> &[ViewId] {
        &self.destroyed
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl ViewBackend for HeadlessViews {
    fn create_view(&mut self, view: ViewId) {
        self.views.entry(view).or_default();
    }

    fn destroy_view(&mut self, view: ViewId) {
        if self.views.remove(&view).is_some() {
            self.destroyed.push(view);
        }
        if self.focused == Some(view) {
            self.focused = None;
        }
    }

    fn set_focus(&mut self, view: ViewId) {
        if self.views.contains_key(&view) {
            self.focused = Some(view);
        }
    }

    fn set_size(&mut self, view: ViewId, columns: u16, lines: u16) {
        if let Some(v) = self.views.get_mut(&view) {
            v.size = Some((columns, lines));
        }
    }

    fn size(&self, view: ViewId) -> Option<(u16, u16)> {
        self.views.get(&view)?.size
    }

    fn adopt_view(&mut self, view: ViewId) {
        self.views.entry(view).or_default().adopted = true;
    }
}
