use ratatui::layout::{Constraint, Layout, Rect};

use crate::layout::{NodeId, NodeKind, Orientation, SplitTree};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// The splitter orientation this direction moves along.
    pub fn axis(self) -> Orientation {
        match self {
            Direction::Left | Direction::Right => Orientation::Horizontal,
            Direction::Up | Direction::Down => Orientation::Vertical,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Direction::Left | Direction::Up => Side::First,
            Direction::Right | Direction::Down => Side::Second,
        }
    }
}

/// Resolve the tree under `root` into a flat list of (leaf, Rect) pairs,
/// left to right and top to bottom.
pub fn resolve<L: Copy + PartialEq>(tree: &SplitTree<L>, root: NodeId, area: Rect) -> Vec<(L, Rect)> {
    let mut result = Vec::new();
    resolve_inner(tree, root, area, &mut result);
    result
}

fn resolve_inner<L: Copy + PartialEq>(
    tree: &SplitTree<L>,
    node: NodeId,
    area: Rect,
    result: &mut Vec<(L, Rect)>,
) {
    match tree.kind(node) {
        Some(NodeKind::Leaf(leaf)) => result.push((*leaf, area)),
        Some(NodeKind::Split(split)) => {
            if split.children.is_empty() {
                return;
            }
            let extent = split.extent().max(1);
            let constraints = split
                .sizes
                .iter()
                .map(|size| Constraint::Ratio(*size, extent));
            let chunks = match split.orientation {
                Orientation::Horizontal => Layout::horizontal(constraints).split(area),
                Orientation::Vertical => Layout::vertical(constraints).split(area),
            };
            for (child, chunk) in split.children.iter().zip(chunks.iter()) {
                resolve_inner(tree, *child, *chunk, result);
            }
        }
        None => {}
    }
}

fn hit(rect: Rect, x: i32, y: i32) -> bool {
    let (left, top) = (i32::from(rect.x), i32::from(rect.y));
    x >= left && x < left + i32::from(rect.width) && y >= top && y < top + i32::from(rect.height)
}

/// Find the leaf adjacent to `leaf` in `direction`.
///
/// Probes a point `offset` cells outside the leaf's edge, level with its
/// center, and returns whichever other leaf covers it. Probes that leave
/// `area` find nothing.
pub fn leaf_in_direction<L: Copy + PartialEq>(
    tree: &SplitTree<L>,
    root: NodeId,
    area: Rect,
    leaf: L,
    direction: Direction,
    offset: u16,
) -> Option<L> {
    let rects = resolve(tree, root, area);
    let rect = rects.iter().find(|(candidate, _)| *candidate == leaf)?.1;
    let offset = i32::from(offset.max(1));
    let (x, y, w, h) = (
        i32::from(rect.x),
        i32::from(rect.y),
        i32::from(rect.width),
        i32::from(rect.height),
    );
    let (center_x, center_y) = (x + w / 2, y + h / 2);
    let (probe_x, probe_y) = match (direction.axis(), direction.side()) {
        (Orientation::Horizontal, Side::First) => (x - offset, center_y),
        (Orientation::Horizontal, Side::Second) => (x + w - 1 + offset, center_y),
        (Orientation::Vertical, Side::First) => (center_x, y - offset),
        (Orientation::Vertical, Side::Second) => (center_x, y + h - 1 + offset),
    };
    if !hit(area, probe_x, probe_y) {
        return None;
    }
    rects
        .into_iter()
        .find(|(candidate, r)| *candidate != leaf && hit(*r, probe_x, probe_y))
        .map(|(candidate, _)| candidate)
}
