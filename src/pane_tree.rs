use ratatui::layout::Rect;

use crate::geometry::{self, Direction};
use crate::layout::{NodeId, Orientation, Shape, SplitTree};
use crate::pane::PaneId;

/// Outcome of [`PaneTree::remove_pane`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// The pane is the only one left. The tree is untouched and the caller
    /// decides whether the window goes away.
    LastPane,
    NotFound,
}

/// Splits between panes. The root is always a top-level splitter, so a
/// window with one pane is a root holding a single leaf.
#[derive(Clone, Debug)]
pub struct PaneTree {
    tree: SplitTree<PaneId>,
    root: NodeId,
}

impl PaneTree {
    pub fn new(orientation: Orientation) -> Self {
        let mut tree = SplitTree::new();
        let root = tree.add_root(orientation);
        Self { tree, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &SplitTree<PaneId> {
        &self.tree
    }

    /// Orientation of the outermost split.
    pub fn orientation(&self) -> Orientation {
        self.tree
            .split(self.root)
            .map_or(Orientation::Horizontal, |split| split.orientation)
    }

    /// Panes in tree order, left to right and top to bottom.
    pub fn panes(&self) -> Vec<PaneId> {
        self.tree.leaves(self.root)
    }

    pub fn len(&self) -> usize {
        self.panes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.children(self.root).is_empty()
    }

    pub fn contains(&self, pane: PaneId) -> bool {
        self.tree.find_leaf(pane).is_some()
    }

    /// Add `pane` next to `anchor`, or at the end of the outer split when no
    /// anchor is given. An anchor that is not in the tree makes this a no-op.
    pub fn add_pane(&mut self, pane: PaneId, anchor: Option<PaneId>, orientation: Orientation) -> bool {
        if self.contains(pane) {
            return false;
        }
        let anchor = match anchor {
            Some(anchor) => match self.tree.find_leaf(anchor) {
                Some(node) => Some(node),
                None => {
                    log::debug!("add_pane: anchor {anchor} is not in the tree");
                    return false;
                }
            },
            None => None,
        };
        let node = self.tree.add_leaf(pane);
        let added = match anchor {
            Some(anchor) => self.tree.add_beside(anchor, node, orientation),
            None => self.tree.append(self.root, node, orientation),
        };
        if !added {
            self.tree.remove_subtree(node);
        }
        added
    }

    /// Remove `pane`, unwrapping any splitter it leaves with a single child.
    pub fn remove_pane(&mut self, pane: PaneId) -> Removal {
        let Some(node) = self.tree.find_leaf(pane) else {
            return Removal::NotFound;
        };
        if self.len() == 1 {
            return Removal::LastPane;
        }
        if let Some(parent) = self.tree.detach(node) {
            self.tree.normalize(parent);
        }
        self.tree.remove_subtree(node);
        Removal::Removed
    }

    pub fn rects(&self, area: Rect) -> Vec<(PaneId, Rect)> {
        geometry::resolve(&self.tree, self.root, area)
    }

    pub fn container_in_direction(
        &self,
        pane: PaneId,
        direction: Direction,
        area: Rect,
        offset: u16,
    ) -> Option<PaneId> {
        geometry::leaf_in_direction(&self.tree, self.root, area, pane, direction, offset)
    }

    /// Give every pane split equal shares, recursively.
    pub fn equalize(&mut self) {
        self.tree.equalize(self.root);
    }

    /// Grow or shrink `pane` inside its own splitter.
    pub fn nudge(&mut self, pane: PaneId, delta: i64) -> bool {
        match self.tree.find_leaf(pane) {
            Some(node) => self.tree.nudge(node, delta),
            None => false,
        }
    }

    /// Percentages of the splitter directly holding `pane`.
    pub fn proportions_around(&self, pane: PaneId) -> Vec<f64> {
        self.tree
            .find_leaf(pane)
            .and_then(|node| self.tree.parent(node))
            .map(|parent| self.tree.proportions(parent))
            .unwrap_or_default()
    }

    pub fn shape(&self) -> Option<Shape> {
        self.tree.shape(self.root)
    }

    pub fn describe(&self) -> String {
        self.tree.describe(self.root, &|pane: PaneId| pane.to_string())
    }

    /// Minimality holds and no pane appears twice.
    pub fn is_well_formed(&self) -> bool {
        let mut panes = self.panes();
        let count = panes.len();
        panes.sort();
        panes.dedup();
        panes.len() == count && self.tree.is_well_formed(self.root)
    }
}
