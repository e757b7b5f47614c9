use serde::{Deserialize, Serialize};

use crate::backend::ViewId;
use crate::geometry::Side;
use crate::layout::NodeId;

pub type PaneId = uuid::Uuid;

/// Remote connection status shown on a tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// Per-tab decoration that is not part of the split tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabMeta {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub badge: Option<ConnectionState>,
}

/// One tab: the handle of its top-level splitter plus decoration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub root: NodeId,
    pub meta: TabMeta,
    /// View that last had focus inside this tab.
    pub focused: Option<ViewId>,
}

impl Tab {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            meta: TabMeta::default(),
            focused: None,
        }
    }
}

/// A tab strip.
#[derive(Clone, Debug)]
pub struct Pane {
    pub id: PaneId,
    pub tabs: Vec<Tab>,
    pub current: usize,
    /// The view keyboard focus is forwarded to when the pane is focused.
    pub focus_proxy: Option<ViewId>,
}

impl Pane {
    pub fn new(id: PaneId) -> Self {
        Self {
            id,
            tabs: Vec::new(),
            current: 0,
            focus_proxy: None,
        }
    }

    pub fn current_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.current)
    }

    pub fn current_tab_mut(&mut self) -> Option<&mut Tab> {
        self.tabs.get_mut(self.current)
    }

    /// Append a tab and make it current.
    pub fn add_tab(&mut self, tab: Tab) -> usize {
        self.tabs.push(tab);
        self.current = self.tabs.len() - 1;
        self.current
    }

    /// Insert a tab at `index` (clamped) and make it current.
    pub fn insert_tab(&mut self, index: usize, tab: Tab) -> usize {
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, tab);
        self.current = index;
        index
    }

    /// Remove a tab. Unlike closing, this may empty the pane; the owner
    /// decides what an empty pane means.
    pub fn remove_tab(&mut self, idx: usize) -> Option<Tab> {
        if idx >= self.tabs.len() {
            return None;
        }
        let tab = self.tabs.remove(idx);
        if idx < self.current {
            self.current -= 1;
        }
        if self.current >= self.tabs.len() {
            self.current = self.tabs.len().saturating_sub(1);
        }
        Some(tab)
    }

    pub fn tab_index(&self, root: NodeId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.root == root)
    }

    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.current = (self.current + 1) % self.tabs.len();
        }
    }

    pub fn prev_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.current = self.current.checked_sub(1).unwrap_or(self.tabs.len() - 1);
        }
    }

    pub fn last_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.current = self.tabs.len() - 1;
        }
    }

    pub fn set_current(&mut self, idx: usize) -> bool {
        if idx < self.tabs.len() {
            self.current = idx;
            true
        } else {
            false
        }
    }

    /// Swap the current tab with its neighbour on `side`. Does not wrap.
    pub fn move_current_tab(&mut self, side: Side) -> Option<usize> {
        let target = match side {
            Side::First => self.current.checked_sub(1)?,
            Side::Second => self.current + 1,
        };
        if target >= self.tabs.len() {
            return None;
        }
        self.tabs.swap(self.current, target);
        self.current = target;
        Some(target)
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
