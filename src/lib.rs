//! Pane, tab and split-view orchestration for terminal emulator windows.
//!
//! A window is a tree of panes; each pane holds tabs; each tab holds a tree
//! of view splitters whose leaves are terminal views bound to sessions.
//! [`Workspace`] owns all of it and keeps the trees, the binding table and
//! the focus history consistent across every structural operation.

pub mod backend;
pub mod binding;
pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod headless;
pub mod history;
pub mod layout;
pub mod pane;
pub mod pane_tree;
pub mod store;
pub mod workspace;

pub use backend::{SessionBackend, SessionHandoff, SessionId, SessionRequest, ViewBackend, ViewId};
pub use codec::{SessionDocument, SplitterDoc};
pub use config::Config;
pub use error::LayoutError;
pub use event::WorkspaceEvent;
pub use layout::{NodeId, Orientation};
pub use pane::PaneId;
pub use workspace::{DetachedLayout, DetachedNode, LayoutItem, Workspace};
