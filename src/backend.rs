use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity of one terminal surface. Allocated by the workspace and never
/// reused within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Identity of a running session, owned by the session backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// What a new session should look like.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionRequest {
    pub profile: String,
    pub working_directory: Option<PathBuf>,
    /// Opaque container (toolbox, distrobox, ...) the session should run in.
    pub container_context: Option<String>,
}

impl SessionRequest {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            ..Self::default()
        }
    }
}

/// Everything another backend needs to take over a session that travels
/// with a detached view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHandoff {
    /// Id in the backend the session comes from; meaningless elsewhere.
    pub origin: SessionId,
    pub restore_id: i32,
    pub request: SessionRequest,
    pub running: bool,
}

/// The process side: creates, finds and drives sessions.
pub trait SessionBackend {
    fn create_session(&mut self, request: &SessionRequest) -> SessionId;

    /// Look up a live session by the id it was saved under.
    fn find_by_restore_id(&self, restore_id: i32) -> Option<SessionId>;

    /// Id a session is saved under; stable while the session lives.
    fn restore_id(&self, session: SessionId) -> i32;

    fn profile(&self, session: SessionId) -> Option<String>;

    fn working_directory(&self, session: SessionId) -> Option<PathBuf>;

    fn container_context(&self, session: SessionId) -> Option<String>;

    /// Program the session was started with.
    fn program(&self, session: SessionId) -> Option<String>;

    fn set_initial_working_directory(&mut self, session: SessionId, dir: PathBuf);

    /// Type `command` into the session as if entered by the user.
    fn run_command(&mut self, session: SessionId, command: &str);

    fn is_running(&self, session: SessionId) -> bool;

    /// Start the session's process.
    fn run(&mut self, session: SessionId);

    fn close(&mut self, session: SessionId);

    /// Take over a session detached from another window and return the id
    /// it is known by here. Backends whose sessions outlive a single window
    /// should hand back the existing session instead of starting a new one.
    fn adopt_session(&mut self, handoff: &SessionHandoff) -> SessionId {
        let session = self.create_session(&handoff.request);
        if handoff.running {
            self.run(session);
        }
        session
    }
}

/// The widget side: creates and sizes terminal surfaces.
pub trait ViewBackend {
    fn create_view(&mut self, view: ViewId);

    fn destroy_view(&mut self, view: ViewId);

    fn set_focus(&mut self, view: ViewId);

    fn set_size(&mut self, view: ViewId, columns: u16, lines: u16);

    fn size(&self, view: ViewId) -> Option<(u16, u16)>;

    /// Take over a view that was detached from another workspace.
    fn adopt_view(&mut self, view: ViewId) {
        self.create_view(view);
    }
}
