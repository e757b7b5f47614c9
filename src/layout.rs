use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::error::LayoutError;

new_key_type! {
    /// Stable handle to a node of a [`SplitTree`].
    pub struct NodeId;
}

/// Extent handed to a splitter that has never been sized.
pub const DEFAULT_EXTENT: u32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Children are laid out left to right.
    Horizontal,
    /// Children are stacked top to bottom.
    Vertical,
}

impl Orientation {
    pub fn label(self) -> &'static str {
        match self {
            Orientation::Horizontal => "Horizontal",
            Orientation::Vertical => "Vertical",
        }
    }

    /// Anything other than the exact string "Horizontal" reads as vertical.
    pub fn from_label(label: &str) -> Self {
        if label == "Horizontal" {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    fn short(self) -> char {
        match self {
            Orientation::Horizontal => 'H',
            Orientation::Vertical => 'V',
        }
    }
}

/// An orientation-tagged group of siblings. `sizes[i]` is the share of the
/// splitter's extent given to `children[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    pub orientation: Orientation,
    pub children: Vec<NodeId>,
    pub sizes: Vec<u32>,
}

impl Split {
    fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            children: Vec::new(),
            sizes: Vec::new(),
        }
    }

    pub fn extent(&self) -> u32 {
        self.sizes.iter().sum()
    }

    fn extent_or_default(&self) -> u32 {
        match self.extent() {
            0 => DEFAULT_EXTENT,
            extent => extent,
        }
    }

    /// Divide `extent` evenly, giving the rounding remainder to the last child.
    fn spread(&mut self, extent: u32) {
        let n = self.children.len() as u32;
        self.sizes.clear();
        if n == 0 {
            return;
        }
        let each = extent / n;
        self.sizes = vec![each; n as usize];
        if let Some(last) = self.sizes.last_mut() {
            *last += extent - each * n;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind<L> {
    Leaf(L),
    Split(Split),
}

#[derive(Clone, Debug)]
struct Node<L> {
    parent: Option<NodeId>,
    kind: NodeKind<L>,
}

/// Orientation and nesting of a subtree with leaf identities erased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Shape {
    Leaf,
    Split(Orientation, Vec<Shape>),
}

/// Arena of split trees. Every node stores its parent handle; a node without
/// a parent is a top-level root. Several independent roots may share one
/// arena.
#[derive(Clone, Debug)]
pub struct SplitTree<L> {
    nodes: SlotMap<NodeId, Node<L>>,
}

impl<L> Default for SplitTree<L> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }
}

impl<L: Copy + PartialEq> SplitTree<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty top-level splitter.
    pub fn add_root(&mut self, orientation: Orientation) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            kind: NodeKind::Split(Split::new(orientation)),
        })
    }

    /// Create a detached leaf.
    pub fn add_leaf(&mut self, leaf: L) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            kind: NodeKind::Leaf(leaf),
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind<L>> {
        self.nodes.get(id).map(|node| &node.kind)
    }

    pub fn leaf(&self, id: NodeId) -> Option<L> {
        match self.kind(id)? {
            NodeKind::Leaf(leaf) => Some(*leaf),
            NodeKind::Split(_) => None,
        }
    }

    pub fn split(&self, id: NodeId) -> Option<&Split> {
        match self.kind(id)? {
            NodeKind::Split(split) => Some(split),
            NodeKind::Leaf(_) => None,
        }
    }

    fn split_mut(&mut self, id: NodeId) -> Option<&mut Split> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Split(split) => Some(split),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn is_split(&self, id: NodeId) -> bool {
        self.split(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = parent;
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.split(id).map_or(&[], |split| split.children.as_slice())
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// Walk parent links up to the node's top-level root.
    pub fn top_level(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// True when `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// All nodes under `id` (inclusive), in pre-order.
    pub fn walk(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            if let NodeKind::Split(split) = &node.kind {
                stack.extend(split.children.iter().rev());
            }
        }
        out
    }

    /// Leaf nodes under `id`, left to right.
    pub fn leaf_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id)
            .into_iter()
            .filter(|node| self.leaf(*node).is_some())
            .collect()
    }

    /// Leaf values under `id`, left to right.
    pub fn leaves(&self, id: NodeId) -> Vec<L> {
        self.walk(id)
            .into_iter()
            .filter_map(|node| self.leaf(node))
            .collect()
    }

    /// Splitter nodes under `id` (inclusive), in pre-order.
    pub fn splits(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id)
            .into_iter()
            .filter(|node| self.is_split(*node))
            .collect()
    }

    pub fn find_leaf(&self, leaf: L) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| matches!(&node.kind, NodeKind::Leaf(l) if *l == leaf))
            .map(|(id, _)| id)
    }

    /// Attach the detached `child` to `parent` at `index` (clamped to the
    /// child count) and share the parent's extent equally.
    ///
    /// Refuses attached children, non-splitter parents and anything that
    /// would make a node its own descendant.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> bool {
        if !self.contains(child)
            || self.parent(child).is_some()
            || child == parent
            || self.is_ancestor(child, parent)
        {
            return false;
        }
        let Some(split) = self.split_mut(parent) else {
            return false;
        };
        let extent = split.extent_or_default();
        let index = index.min(split.children.len());
        split.children.insert(index, child);
        split.spread(extent);
        self.set_parent(child, Some(parent));
        true
    }

    /// Place the detached `node` next to `anchor`.
    ///
    /// When the anchor's parent has a single child or already runs in
    /// `orientation`, the node becomes the anchor's next sibling and the
    /// parent is equalized. Otherwise a nested splitter takes over the
    /// anchor's slot, keeps its size, and holds anchor and node 50/50.
    pub fn add_beside(&mut self, anchor: NodeId, node: NodeId, orientation: Orientation) -> bool {
        if node == anchor
            || !self.contains(node)
            || self.parent(node).is_some()
            || self.is_ancestor(node, anchor)
        {
            return false;
        }
        let (Some(parent), Some(index)) = (self.parent(anchor), self.index_in_parent(anchor)) else {
            return false;
        };
        let Some(split) = self.split_mut(parent) else {
            return false;
        };
        if split.children.len() == 1 || split.orientation == orientation {
            split.orientation = orientation;
            return self.insert_child(parent, index + 1, node);
        }
        self.wrap(parent, index, node, orientation).is_some()
    }

    fn wrap(
        &mut self,
        parent: NodeId,
        index: usize,
        node: NodeId,
        orientation: Orientation,
    ) -> Option<NodeId> {
        let split = self.split(parent)?;
        let anchor = *split.children.get(index)?;
        let slot = split.sizes.get(index).copied().unwrap_or(0).max(2);
        let nested = self.nodes.insert(Node {
            parent: Some(parent),
            kind: NodeKind::Split(Split {
                orientation,
                children: vec![anchor, node],
                sizes: vec![slot / 2, slot - slot / 2],
            }),
        });
        if let Some(split) = self.split_mut(parent) {
            split.children[index] = nested;
            split.sizes[index] = slot;
        }
        self.set_parent(anchor, Some(nested));
        self.set_parent(node, Some(nested));
        Some(nested)
    }

    /// Append the detached `node` as the last child of `parent`. A parent
    /// with at most one child adopts `orientation` first.
    pub fn append(&mut self, parent: NodeId, node: NodeId, orientation: Orientation) -> bool {
        match self.split_mut(parent) {
            Some(split) if split.children.len() <= 1 => split.orientation = orientation,
            Some(_) => {}
            None => return false,
        }
        self.insert_child(parent, usize::MAX, node)
    }

    /// Cut `id` loose from its parent, handing its size to the remaining
    /// siblings in proportion to theirs. Returns the former parent.
    ///
    /// The parent is left as is; call [`SplitTree::normalize`] on it to
    /// restore minimality.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        if let Some(split) = self.split_mut(parent) {
            split.children.remove(index);
            let freed = split.sizes.remove(index);
            share(&mut split.sizes, freed);
        }
        self.set_parent(id, None);
        Some(parent)
    }

    /// Restore minimality from `start` upward: a nested splitter left empty
    /// is dropped, a nested splitter left with one child is replaced by that
    /// child, and a top-level splitter whose only child is a splitter absorbs
    /// it. A surviving child that runs in its new parent's orientation is
    /// spliced into that parent.
    pub fn normalize(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(id) = current.take() {
            let (count, first) = match self.split(id) {
                Some(split) => (split.children.len(), split.children.first().copied()),
                None => break,
            };
            match (self.parent(id), count, first) {
                (Some(parent), 0, _) => {
                    self.detach(id);
                    self.nodes.remove(id);
                    current = Some(parent);
                }
                (Some(parent), 1, Some(only)) => self.unwrap_into(parent, id, only),
                (None, 1, Some(only)) if self.is_split(only) => self.hoist(id, only),
                _ => {}
            }
        }
    }

    /// Normalize every splitter under `id`, innermost first.
    pub fn normalize_subtree(&mut self, id: NodeId) {
        let mut splits = self.splits(id);
        splits.reverse();
        for split in splits {
            if self.contains(split) {
                self.normalize(split);
            }
        }
    }

    fn unwrap_into(&mut self, parent: NodeId, id: NodeId, only: NodeId) {
        let Some(index) = self.index_in_parent(id) else {
            return;
        };
        let parent_orientation = self.split(parent).map(|split| split.orientation);
        if let Some(split) = self.split_mut(parent) {
            split.children[index] = only;
        }
        self.set_parent(only, Some(parent));
        self.nodes.remove(id);
        if self.split(only).map(|split| split.orientation) == parent_orientation {
            self.flatten(parent, index);
        }
    }

    fn flatten(&mut self, parent: NodeId, index: usize) {
        let Some(child) = self.children(parent).get(index).copied() else {
            return;
        };
        let Some(inner) = self.split(child).cloned() else {
            return;
        };
        let Some(slot) = self.split(parent).and_then(|split| split.sizes.get(index).copied()) else {
            return;
        };
        let sizes = scale(&inner.sizes, slot);
        for grandchild in &inner.children {
            self.set_parent(*grandchild, Some(parent));
        }
        if let Some(split) = self.split_mut(parent) {
            split.children.splice(index..=index, inner.children.iter().copied());
            split.sizes.splice(index..=index, sizes);
        }
        self.nodes.remove(child);
    }

    fn hoist(&mut self, root: NodeId, child: NodeId) {
        let Some(inner) = self.split(child).cloned() else {
            return;
        };
        let extent = self
            .split(root)
            .map_or(DEFAULT_EXTENT, |split| split.extent_or_default());
        for grandchild in &inner.children {
            self.set_parent(*grandchild, Some(root));
        }
        if let Some(split) = self.split_mut(root) {
            split.orientation = inner.orientation;
            split.sizes = scale(&inner.sizes, extent);
            split.children = inner.children;
        }
        self.nodes.remove(child);
    }

    /// Drop `id` and everything below it, returning the leaf values removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<L> {
        self.detach(id);
        let mut removed = Vec::new();
        for node in self.walk(id) {
            if let Some(Node {
                kind: NodeKind::Leaf(leaf),
                ..
            }) = self.nodes.remove(node)
            {
                removed.push(leaf);
            }
        }
        removed
    }

    /// Give every child of every splitter under `id` an equal share.
    pub fn equalize(&mut self, id: NodeId) {
        for split_id in self.splits(id) {
            if let Some(split) = self.split_mut(split_id) {
                let extent = split.extent_or_default();
                split.spread(extent);
            }
        }
    }

    /// Resize the children of `id` to the given percentages.
    ///
    /// Every value must be at least 1, there must be one value per child and
    /// the total must land in `99..=100` to absorb rounding.
    pub fn set_percentages(&mut self, id: NodeId, percentages: &[f64]) -> Result<(), LayoutError> {
        let sum: f64 = percentages.iter().sum();
        let split = self.split_mut(id).ok_or(LayoutError::UnknownSplitter)?;
        if percentages.len() != split.children.len()
            || percentages.iter().any(|p| !(*p >= 1.0))
            || !(99.0..=100.0).contains(&sum)
        {
            return Err(LayoutError::InvalidProportions { sum });
        }
        let extent = split.extent_or_default();
        let mut sizes: Vec<u32> = percentages
            .iter()
            .map(|p| (f64::from(extent) * p / 100.0) as u32)
            .collect();
        let assigned: u32 = sizes.iter().sum();
        if let Some(last) = sizes.last_mut() {
            *last += extent.saturating_sub(assigned);
        }
        split.sizes = sizes;
        Ok(())
    }

    /// Replace the raw sizes of `id`. Refused unless there is one non-zero
    /// size per child.
    pub fn set_sizes(&mut self, id: NodeId, sizes: &[u32]) -> bool {
        let Some(split) = self.split_mut(id) else {
            return false;
        };
        if sizes.len() != split.children.len() || sizes.contains(&0) {
            return false;
        }
        split.sizes = sizes.to_vec();
        true
    }

    /// Children sizes of `id` as percentages of its extent.
    pub fn proportions(&self, id: NodeId) -> Vec<f64> {
        let Some(split) = self.split(id) else {
            return Vec::new();
        };
        let total = split.extent();
        if total == 0 {
            return Vec::new();
        }
        split
            .sizes
            .iter()
            .map(|size| f64::from(*size) * 100.0 / f64::from(total))
            .collect()
    }

    /// Grow (`delta > 0`) or shrink the slot of `child`, moving the
    /// difference evenly to or from its siblings. Refused when the node has
    /// no sibling, when the per-sibling share rounds to zero, or when any
    /// slot would drop below 1.
    pub fn nudge(&mut self, child: NodeId, delta: i64) -> bool {
        let (Some(parent), Some(index)) = (self.parent(child), self.index_in_parent(child)) else {
            return false;
        };
        let Some(split) = self.split_mut(parent) else {
            return false;
        };
        let others = split.sizes.len() as i64 - 1;
        if others < 1 {
            return false;
        }
        let share = delta / others;
        if share == 0 {
            return false;
        }
        let mut sizes: Vec<i64> = split.sizes.iter().map(|size| i64::from(*size)).collect();
        for (i, size) in sizes.iter_mut().enumerate() {
            if i == index {
                *size += share * others;
            } else {
                *size -= share;
            }
        }
        if sizes.iter().any(|size| *size < 1 || *size > i64::from(u32::MAX)) {
            return false;
        }
        split.sizes = sizes.into_iter().map(|size| size as u32).collect();
        true
    }

    /// Checks parent links, size bookkeeping and minimality under `root`.
    pub fn is_well_formed(&self, root: NodeId) -> bool {
        if !self.contains(root) || self.parent(root).is_some() {
            return false;
        }
        self.walk(root).into_iter().all(|id| {
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            match &node.kind {
                NodeKind::Leaf(_) => true,
                NodeKind::Split(split) => {
                    split.children.len() == split.sizes.len()
                        && (node.parent.is_none() || split.children.len() >= 2)
                        && split.children.iter().all(|child| self.parent(*child) == Some(id))
                }
            }
        })
    }

    pub fn shape(&self, id: NodeId) -> Option<Shape> {
        match self.kind(id)? {
            NodeKind::Leaf(_) => Some(Shape::Leaf),
            NodeKind::Split(split) => Some(Shape::Split(
                split.orientation,
                split
                    .children
                    .iter()
                    .filter_map(|child| self.shape(*child))
                    .collect(),
            )),
        }
    }

    /// Compact textual form, e.g. `H[v1|V[v2|v3]]`.
    pub fn describe<F: Fn(L) -> String>(&self, id: NodeId, label: &F) -> String {
        match self.kind(id) {
            Some(NodeKind::Leaf(leaf)) => label(*leaf),
            Some(NodeKind::Split(split)) => {
                let inner: Vec<String> = split
                    .children
                    .iter()
                    .map(|child| self.describe(*child, label))
                    .collect();
                format!("{}[{}]", split.orientation.short(), inner.join("|"))
            }
            None => String::new(),
        }
    }
}

/// Spread `freed` over `sizes` in proportion to their current values.
fn share(sizes: &mut [u32], freed: u32) {
    if sizes.is_empty() || freed == 0 {
        return;
    }
    let total: u64 = sizes.iter().map(|size| u64::from(*size)).sum();
    let count = sizes.len() as u64;
    let mut given = 0u32;
    for size in sizes.iter_mut() {
        let extra = if total == 0 {
            u64::from(freed) / count
        } else {
            u64::from(freed) * u64::from(*size) / total
        } as u32;
        *size += extra;
        given += extra;
    }
    if let Some(last) = sizes.last_mut() {
        *last += freed - given;
    }
}

/// Rescale `sizes` so they sum to `target`, keeping their ratios.
fn scale(sizes: &[u32], target: u32) -> Vec<u32> {
    if sizes.is_empty() {
        return Vec::new();
    }
    let total: u64 = sizes.iter().map(|size| u64::from(*size)).sum();
    let count = sizes.len() as u64;
    let mut scaled: Vec<u32> = sizes
        .iter()
        .map(|size| {
            if total == 0 {
                (u64::from(target) / count) as u32
            } else {
                (u64::from(target) * u64::from(*size) / total) as u32
            }
        })
        .collect();
    let assigned: u32 = scaled.iter().sum();
    if let Some(last) = scaled.last_mut() {
        *last += target.saturating_sub(assigned);
    }
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tree = SplitTree<u32>;

    fn root_with(tree: &mut Tree, orientation: Orientation, leaves: &[u32]) -> (NodeId, Vec<NodeId>) {
        let root = tree.add_root(orientation);
        let nodes = leaves
            .iter()
            .map(|leaf| {
                let node = tree.add_leaf(*leaf);
                assert!(tree.append(root, node, orientation));
                node
            })
            .collect();
        (root, nodes)
    }

    fn label(leaf: u32) -> String {
        format!("v{leaf}")
    }

    #[test]
    fn test_append_equalizes() {
        let mut tree = Tree::new();
        let (root, _) = root_with(&mut tree, Orientation::Horizontal, &[1, 2, 3]);
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![333, 333, 334]));
        assert_eq!(tree.leaves(root), vec![1, 2, 3]);
        assert!(tree.is_well_formed(root));
    }

    #[test]
    fn test_add_beside_same_orientation_inserts_adjacent() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        let new = tree.add_leaf(3);
        assert!(tree.add_beside(nodes[0], new, Orientation::Horizontal));
        assert_eq!(tree.describe(root, &label), "H[v1|v3|v2]");
    }

    #[test]
    fn test_add_beside_single_child_adopts_orientation() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1]);
        let new = tree.add_leaf(2);
        assert!(tree.add_beside(nodes[0], new, Orientation::Vertical));
        assert_eq!(tree.describe(root, &label), "V[v1|v2]");
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![500, 500]));
    }

    #[test]
    fn test_add_beside_cross_orientation_wraps_and_keeps_slot() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        tree.set_percentages(root, &[30.0, 70.0]).unwrap();
        let new = tree.add_leaf(3);
        assert!(tree.add_beside(nodes[1], new, Orientation::Vertical));
        assert_eq!(tree.describe(root, &label), "H[v1|V[v2|v3]]");
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![300, 700]));
        let nested = tree.children(root)[1];
        assert_eq!(tree.split(nested).map(|s| s.sizes.clone()), Some(vec![350, 350]));
        assert!(tree.is_well_formed(root));
    }

    #[test]
    fn test_add_beside_rejects_attached_node() {
        let mut tree = Tree::new();
        let (_, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        assert!(!tree.add_beside(nodes[0], nodes[1], Orientation::Horizontal));
        assert!(!tree.add_beside(nodes[0], nodes[0], Orientation::Horizontal));
    }

    #[test]
    fn test_detach_gives_size_to_siblings() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2, 3]);
        tree.set_percentages(root, &[20.0, 30.0, 50.0]).unwrap();
        assert_eq!(tree.detach(nodes[1]), Some(root));
        let sizes = tree.split(root).map(|s| s.sizes.clone()).unwrap();
        assert_eq!(sizes.iter().sum::<u32>(), 1000);
        assert_eq!(sizes, vec![285, 715]);
        assert_eq!(tree.parent(nodes[1]), None);
    }

    #[test]
    fn test_normalize_unwraps_single_child() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        let new = tree.add_leaf(3);
        tree.add_beside(nodes[1], new, Orientation::Vertical);
        let nested = tree.parent(new).unwrap();
        tree.detach(new);
        tree.normalize(nested);
        assert!(!tree.contains(nested));
        assert_eq!(tree.describe(root, &label), "H[v1|v2]");
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![500, 500]));
        assert!(tree.is_well_formed(root));
    }

    #[test]
    fn test_normalize_flattens_same_orientation_survivor() {
        // H[v1 | V[v2 | H[v3|v4]]] -> removing v2 leaves H[v3|v4] which splices into the root
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        let v3 = tree.add_leaf(3);
        tree.add_beside(nodes[1], v3, Orientation::Vertical);
        let v4 = tree.add_leaf(4);
        tree.add_beside(v3, v4, Orientation::Horizontal);
        assert_eq!(tree.describe(root, &label), "H[v1|V[v2|H[v3|v4]]]");

        let parent = tree.detach(nodes[1]).unwrap();
        tree.normalize(parent);
        assert_eq!(tree.describe(root, &label), "H[v1|v3|v4]");
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![500, 250, 250]));
        assert!(tree.is_well_formed(root));
    }

    #[test]
    fn test_normalize_hoists_into_top_level() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        let v3 = tree.add_leaf(3);
        tree.add_beside(nodes[1], v3, Orientation::Vertical);
        let parent = tree.detach(nodes[0]).unwrap();
        tree.normalize(parent);
        assert_eq!(tree.describe(root, &label), "V[v2|v3]");
        assert!(tree.contains(root));
        assert!(tree.is_well_formed(root));
    }

    #[test]
    fn test_normalize_drops_empty_nested_chain() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1]);
        let nested = tree.add_root(Orientation::Vertical);
        assert!(tree.insert_child(root, 1, nested));
        tree.remove_subtree(nodes[0]);
        tree.normalize(nested);
        assert!(tree.children(root).is_empty());
        assert!(!tree.contains(nested));
    }

    #[test]
    fn test_top_level_single_leaf_child_survives() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        let parent = tree.detach(nodes[0]).unwrap();
        tree.normalize(parent);
        assert_eq!(tree.describe(root, &label), "H[v2]");
        assert!(tree.is_well_formed(root));
    }

    #[test]
    fn test_insert_child_rejects_cycle() {
        let mut tree = Tree::new();
        let (root, _) = root_with(&mut tree, Orientation::Horizontal, &[1]);
        let outer = tree.add_root(Orientation::Vertical);
        let a = tree.add_leaf(2);
        let b = tree.add_leaf(3);
        tree.append(outer, a, Orientation::Vertical);
        tree.append(outer, b, Orientation::Vertical);
        assert!(!tree.insert_child(outer, 0, outer));
        assert!(tree.insert_child(root, 1, outer));
        assert!(tree.is_ancestor(root, a));
        assert!(!tree.is_ancestor(a, root));
        assert_eq!(tree.top_level(a), root);
    }

    #[test]
    fn test_set_percentages_tolerance() {
        let mut tree = Tree::new();
        let (root, _) = root_with(&mut tree, Orientation::Horizontal, &[1, 2, 3]);
        assert!(tree.set_percentages(root, &[33.0, 33.0, 33.0]).is_ok());
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![330, 330, 340]));
        assert!(tree.set_percentages(root, &[30.0, 30.0, 40.0]).is_ok());
        assert!(matches!(
            tree.set_percentages(root, &[30.0, 30.0, 38.0]),
            Err(LayoutError::InvalidProportions { .. })
        ));
        assert!(tree.set_percentages(root, &[30.0, 30.0, 41.0]).is_err());
        assert!(tree.set_percentages(root, &[0.5, 49.5, 50.0]).is_err());
        assert!(tree.set_percentages(root, &[50.0, 50.0]).is_err());
        assert!(tree.set_percentages(root, &[f64::NAN, 50.0, 50.0]).is_err());
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![300, 300, 400]));
    }

    #[test]
    fn test_set_sizes() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        assert!(tree.set_sizes(root, &[700, 300]));
        assert!(!tree.set_sizes(root, &[700, 0]));
        assert!(!tree.set_sizes(root, &[1000]));
        assert!(!tree.set_sizes(nodes[0], &[1]));
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![700, 300]));
    }

    #[test]
    fn test_set_percentages_unknown_splitter() {
        let mut tree = Tree::new();
        let leaf = tree.add_leaf(1);
        assert_eq!(tree.set_percentages(leaf, &[100.0]), Err(LayoutError::UnknownSplitter));
    }

    #[test]
    fn test_proportions() {
        let mut tree = Tree::new();
        let (root, _) = root_with(&mut tree, Orientation::Vertical, &[1, 2]);
        tree.set_percentages(root, &[25.0, 75.0]).unwrap();
        assert_eq!(tree.proportions(root), vec![25.0, 75.0]);
    }

    #[test]
    fn test_nudge_shares_delta() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2, 3]);
        tree.set_percentages(root, &[30.0, 30.0, 40.0]).unwrap();
        assert!(tree.nudge(nodes[0], 10));
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![310, 295, 395]));
        assert!(tree.nudge(nodes[0], -10));
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![300, 300, 400]));
    }

    #[test]
    fn test_nudge_refuses_underflow_and_lone_child() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        assert!(!tree.nudge(nodes[0], 1000));
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![500, 500]));
        let (_, lone) = root_with(&mut tree, Orientation::Horizontal, &[9]);
        assert!(!tree.nudge(lone[0], 10));
    }

    #[test]
    fn test_equalize_deep() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        let v3 = tree.add_leaf(3);
        tree.add_beside(nodes[1], v3, Orientation::Vertical);
        tree.set_percentages(root, &[80.0, 20.0]).unwrap();
        let nested = tree.children(root)[1];
        tree.set_percentages(nested, &[10.0, 90.0]).unwrap();
        tree.equalize(root);
        assert_eq!(tree.split(root).map(|s| s.sizes.clone()), Some(vec![500, 500]));
        assert_eq!(tree.split(nested).map(|s| s.sizes.clone()), Some(vec![250, 250]));
    }

    #[test]
    fn test_remove_subtree_returns_leaves() {
        let mut tree = Tree::new();
        let (root, nodes) = root_with(&mut tree, Orientation::Horizontal, &[1, 2]);
        let v3 = tree.add_leaf(3);
        tree.add_beside(nodes[1], v3, Orientation::Vertical);
        let nested = tree.parent(v3).unwrap();
        assert_eq!(tree.remove_subtree(nested), vec![2, 3]);
        assert_eq!(tree.leaves(root), vec![1]);
        assert_eq!(tree.find_leaf(2), None);
        assert_eq!(tree.find_leaf(1), Some(nodes[0]));
    }

    #[test]
    fn test_shape_ignores_leaf_values() {
        let mut a = Tree::new();
        let (ra, _) = root_with(&mut a, Orientation::Vertical, &[1, 2]);
        let mut b = Tree::new();
        let (rb, _) = root_with(&mut b, Orientation::Vertical, &[7, 8]);
        assert_eq!(a.shape(ra), b.shape(rb));
        assert_eq!(
            a.shape(ra),
            Some(Shape::Split(Orientation::Vertical, vec![Shape::Leaf, Shape::Leaf]))
        );
    }

    #[test]
    fn test_orientation_labels() {
        assert_eq!(Orientation::from_label("Horizontal"), Orientation::Horizontal);
        assert_eq!(Orientation::from_label("Vertical"), Orientation::Vertical);
        assert_eq!(Orientation::from_label("horizontal"), Orientation::Vertical);
        assert_eq!(Orientation::Horizontal.label(), "Horizontal");
    }
}
