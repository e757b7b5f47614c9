use std::collections::HashSet;

use super::Workspace;
use crate::backend::{SessionBackend, ViewBackend, ViewId};
use crate::error::LayoutError;
use crate::event::WorkspaceEvent;
use crate::geometry::Direction;
use crate::layout::{NodeId, Orientation};
use crate::pane::PaneId;

/// One entry of the item list given to
/// [`Workspace::create_split_with_existing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutItem {
    View(ViewId),
    Splitter(NodeId),
}

impl<S: SessionBackend, V: ViewBackend> Workspace<S, V> {
    /// Move a view into `splitter` at `index`, possibly into another tab or
    /// pane. The splitter it leaves is unwrapped if needed.
    pub fn move_view(&mut self, view: ViewId, splitter: NodeId, index: usize) -> Result<(), LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        let node = self
            .splitters
            .find_leaf(view)
            .filter(|_| self.contains_view(view))
            .ok_or(LayoutError::UnknownView(view))?;
        self.tab_splitter(splitter)?;
        self.relocate(node, splitter, index);
        self.flush();
        Ok(())
    }

    /// Move a nested splitter, with everything under it, into `target`.
    pub fn move_splitter(&mut self, splitter: NodeId, target: NodeId, index: usize) -> Result<(), LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        self.tab_splitter(splitter)?;
        self.tab_splitter(target)?;
        if target == splitter || self.splitters.is_ancestor(splitter, target) {
            return Err(LayoutError::WouldCreateCycle);
        }
        if self.splitters.parent(splitter).is_none() {
            return Err(LayoutError::TopLevelSplitter);
        }
        self.relocate(splitter, target, index);
        self.flush();
        Ok(())
    }

    /// Group `items` under a new splitter placed in `target` at `index`. A
    /// single item is moved into `target` as is. Returns the node now
    /// sitting at that slot.
    ///
    /// Tab roots, `target`, its nested ancestors and its direct children
    /// cannot be items, nor can an item contain another.
    pub fn create_split_with_existing(
        &mut self,
        target: NodeId,
        items: &[LayoutItem],
        index: usize,
        orientation: Orientation,
    ) -> Result<NodeId, LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        self.tab_splitter(target)?;
        let nodes = self.resolve_items(items)?;

        let mut forbidden: HashSet<NodeId> = self.splitters.children(target).iter().copied().collect();
        let mut ancestor = Some(target);
        while let Some(id) = ancestor {
            forbidden.insert(id);
            ancestor = self.splitters.parent(id);
        }
        let unique: HashSet<NodeId> = nodes.iter().copied().collect();
        if unique.len() != nodes.len()
            || nodes.iter().any(|node| {
                forbidden.contains(node) || self.splitters.parent(*node).is_none()
            })
            || nodes.iter().any(|a| nodes.iter().any(|b| self.splitters.is_ancestor(*a, *b)))
        {
            return Err(LayoutError::InvalidItems);
        }

        if let [only] = nodes.as_slice() {
            self.relocate(*only, target, index);
            self.flush();
            return Ok(*only);
        }

        let target_root = self.splitters.top_level(target);
        let moved_views: Vec<ViewId> = nodes.iter().flat_map(|node| self.splitters.leaves(*node)).collect();
        let active = self.active_view().filter(|view| moved_views.contains(view));
        let mut sources = Vec::new();
        let mut old_parents = Vec::new();
        for node in &nodes {
            let root = self.splitters.top_level(*node);
            if root != target_root {
                if let Some((pane, _)) = self.locate_root(root) {
                    sources.push((pane, root));
                }
                let leaving = self.splitters.leaves(*node);
                self.clear_focus_for(&leaving);
            }
            if let Some(parent) = self.splitters.detach(*node) {
                old_parents.push(parent);
            }
        }

        let created = self.splitters.add_root(orientation);
        for node in &nodes {
            self.splitters.append(created, *node, orientation);
        }
        self.splitters.insert_child(target, index, created);
        for parent in old_parents {
            if self.splitters.contains(parent) {
                self.splitters.normalize(parent);
            }
        }
        sources.dedup();
        for (pane, root) in sources {
            self.settle_tab(pane, root);
        }
        self.queue(WorkspaceEvent::LayoutChanged);
        if let Some(view) = active {
            self.activate(view, true);
        }
        log::debug!("grouped {} item(s) under a new {orientation:?} splitter", nodes.len());
        self.flush();
        Ok(created)
    }

    fn resolve_items(&self, items: &[LayoutItem]) -> Result<Vec<NodeId>, LayoutError> {
        if items.is_empty() {
            return Err(LayoutError::InvalidItems);
        }
        items
            .iter()
            .map(|item| match item {
                LayoutItem::View(view) => self
                    .splitters
                    .find_leaf(*view)
                    .filter(|_| self.contains_view(*view))
                    .ok_or(LayoutError::UnknownView(*view)),
                LayoutItem::Splitter(splitter) => self.tab_splitter(*splitter).map(|_| *splitter),
            })
            .collect()
    }

    /// Move `node` into `target` at `index`. Both must have been validated.
    fn relocate(&mut self, node: NodeId, target: NodeId, index: usize) {
        let views = self.splitters.leaves(node);
        let active = self.active_view().filter(|view| views.contains(view));
        let old_root = self.splitters.top_level(node);
        let source = self.locate_root(old_root).map(|(pane, _)| pane);
        if old_root != self.splitters.top_level(target) {
            self.clear_focus_for(&views);
        }
        let old_parent = self.splitters.detach(node);
        if !self.splitters.insert_child(target, index, node) {
            log::warn!("relocate: insert into {target:?} refused");
        }
        if let Some(parent) = old_parent.filter(|p| *p != target && self.splitters.contains(*p)) {
            self.splitters.normalize(parent);
        }
        if let Some(pane) = source {
            self.settle_tab(pane, old_root);
        }
        self.queue(WorkspaceEvent::LayoutChanged);
        if let Some(view) = active {
            self.activate(view, true);
        }
    }

    /// Forget `views` as remembered focus of any tab or pane.
    fn clear_focus_for(&mut self, views: &[ViewId]) {
        for pane in self.panes.values_mut() {
            if pane.focus_proxy.is_some_and(|view| views.contains(&view)) {
                pane.focus_proxy = None;
            }
            for tab in &mut pane.tabs {
                if tab.focused.is_some_and(|view| views.contains(&view)) {
                    tab.focused = None;
                }
            }
        }
    }

    /// Drop a view onto the edge of `target`, giving it a pane of its own.
    pub fn drop_view_to_new_pane(
        &mut self,
        view: ViewId,
        target: PaneId,
        orientation: Orientation,
    ) -> Result<PaneId, LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        let (source, index) = self.locate_view(view).ok_or(LayoutError::UnknownView(view))?;
        if !self.pane_tree.contains(target) || !self.panes.contains_key(&target) {
            return Err(LayoutError::UnknownPane(target));
        }
        let alone = self.panes.get(&source).is_some_and(|p| p.tab_count() == 1)
            && self.views_in_tab(source, index).len() == 1;
        if source == target && alone {
            return Err(LayoutError::NothingToMove);
        }
        let badge = self.panes.get(&source).and_then(|p| p.tabs.get(index)).and_then(|t| t.meta.badge);
        let Some((source, root)) = self.cut_view(view) else {
            return Err(LayoutError::UnknownView(view));
        };
        let mut tab = self.single_view_tab(view);
        tab.meta.badge = badge;
        let pane = self.insert_pane(tab, Some(target), orientation);
        self.settle_tab(source, root);
        self.queue(WorkspaceEvent::LayoutChanged);
        let pane = pane.ok_or(LayoutError::UnknownPane(target))?;
        self.activate(view, true);
        self.refresh_focus_proxy(source);
        self.flush();
        Ok(pane)
    }

    /// Drop a whole tab onto the edge of `target`, giving it a pane of its own.
    pub fn drop_tab_to_new_pane(
        &mut self,
        source: PaneId,
        index: usize,
        target: PaneId,
        orientation: Orientation,
    ) -> Result<PaneId, LayoutError> {
        self.check_tab_move(source, index, target)?;
        if source == target && self.panes.get(&source).is_some_and(|p| p.tab_count() == 1) {
            return Err(LayoutError::NothingToMove);
        }
        let tab = self
            .take_tab(source, index)
            .ok_or(LayoutError::UnknownTab { pane: source, index })?;
        let pane = self.insert_pane(tab, Some(target), orientation);
        self.settle_pane(source);
        self.queue(WorkspaceEvent::LayoutChanged);
        let pane = pane.ok_or(LayoutError::UnknownPane(target))?;
        if let Some(view) = self.tab_focus_target(pane, 0) {
            self.activate(view, true);
        }
        self.refresh_focus_proxy(source);
        self.flush();
        Ok(pane)
    }

    /// Move a tab to the end of another pane's tab strip.
    pub fn move_tab_between_panes(
        &mut self,
        source: PaneId,
        index: usize,
        target: PaneId,
    ) -> Result<usize, LayoutError> {
        self.check_tab_move(source, index, target)?;
        if source == target {
            return Err(LayoutError::NothingToMove);
        }
        let tab = self
            .take_tab(source, index)
            .ok_or(LayoutError::UnknownTab { pane: source, index })?;
        let new_index = self
            .add_tab_to(target, tab)
            .ok_or(LayoutError::UnknownPane(target))?;
        self.settle_pane(source);
        self.queue(WorkspaceEvent::LayoutChanged);
        if let Some(view) = self.tab_focus_target(target, new_index) {
            self.activate(view, true);
        }
        self.refresh_focus_proxy(source);
        self.flush();
        Ok(new_index)
    }

    /// Move the active tab to the pane next to the active one in
    /// `direction`. The last tab of a pane stays put.
    pub fn move_active_tab_toward(&mut self, direction: Direction) -> Option<usize> {
        let source = self.active_pane?;
        let neighbor = self.pane_tree.container_in_direction(
            source,
            direction,
            self.viewport,
            self.config.behavior.probe_offset,
        )?;
        let pane = self.panes.get(&source)?;
        if pane.tab_count() <= 1 {
            return None;
        }
        let index = pane.current;
        self.move_tab_between_panes(source, index, neighbor).ok()
    }

    fn check_tab_move(&self, source: PaneId, index: usize, target: PaneId) -> Result<(), LayoutError> {
        if self.closing {
            return Err(LayoutError::Closing);
        }
        let pane = self.panes.get(&source).ok_or(LayoutError::UnknownPane(source))?;
        if index >= pane.tab_count() {
            return Err(LayoutError::UnknownTab { pane: source, index });
        }
        if !self.panes.contains_key(&target) || !self.pane_tree.contains(target) {
            return Err(LayoutError::UnknownPane(target));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::{drain, make_workspace, TestWorkspace};

    /// One tab holding `H[v1|v2|v3]`, plus a second tab with v4.
    fn three_in_a_row() -> (TestWorkspace, NodeId, Vec<ViewId>) {
        let (mut ws, _rx) = make_workspace();
        let first = ws.new_session(None, None).unwrap();
        let root = ws.splitter_of(first).unwrap();
        let mut views = vec![first];
        for slot in 1..3 {
            let view = ws.new_session(None, None).unwrap();
            ws.move_view(view, root, slot).unwrap();
            views.push(view);
        }
        views.push(ws.new_session(None, None).unwrap());
        (ws, root, views)
    }

    #[test]
    fn test_move_view_into_other_tab() {
        let (ws, root, views) = three_in_a_row();
        let pane = ws.active_pane().unwrap();
        assert_eq!(ws.views_in_tab(pane, 0), views[..3].to_vec());
        assert_eq!(ws.views_in_tab(pane, 1), vec![views[3]]);
        assert_eq!(ws.pane(pane).map(|p| p.tab_count()), Some(2));
        assert_eq!(ws.splitter_of(views[1]), Some(root));
        assert!(ws.is_well_formed());
    }

    #[test]
    fn test_move_view_reorders_within_splitter() {
        let (mut ws, root, views) = three_in_a_row();
        ws.move_view(views[0], root, 2).unwrap();
        let pane = ws.active_pane().unwrap();
        assert_eq!(ws.views_in_tab(pane, 0), vec![views[1], views[2], views[0]]);
    }

    #[test]
    fn test_moving_last_view_out_removes_tab() {
        let (mut ws, root, views) = three_in_a_row();
        let pane = ws.active_pane().unwrap();
        ws.move_view(views[3], root, 0).unwrap();
        assert_eq!(ws.pane(pane).map(|p| p.tab_count()), Some(1));
        assert_eq!(ws.active_view(), Some(views[3]));
        assert_eq!(ws.locate_view(views[3]), Some((pane, 0)));
        assert!(ws.is_well_formed());
    }

    #[test]
    fn test_create_split_with_existing_nests_items() {
        let (mut ws, root, views) = three_in_a_row();
        let created = ws
            .create_split_with_existing(
                root,
                &[LayoutItem::View(views[1]), LayoutItem::View(views[3])],
                1,
                Orientation::Vertical,
            )
            .unwrap_err();
        // views[1] is a direct child of the target.
        assert_eq!(created, LayoutError::InvalidItems);

        let (mut ws, root, views) = three_in_a_row();
        let pane = ws.active_pane().unwrap();
        let second_root = ws.tab_root(pane, 1).unwrap();
        ws.move_view(views[1], second_root, 1).unwrap();
        ws.move_view(views[2], second_root, 2).unwrap();
        let created = ws
            .create_split_with_existing(
                root,
                &[LayoutItem::View(views[1]), LayoutItem::View(views[2])],
                1,
                Orientation::Vertical,
            )
            .unwrap();
        assert_eq!(ws.view_hierarchy()[0], format!("H[{}|V[{}|{}]]", views[0], views[1], views[2]));
        assert_eq!(ws.splitter_of(views[2]), Some(created));
        assert!(ws.is_well_formed());
    }

    #[test]
    fn test_create_split_with_existing_rejects_bad_items() {
        let (mut ws, root, views) = three_in_a_row();
        let pane = ws.active_pane().unwrap();
        let second_root = ws.tab_root(pane, 1).unwrap();
        let before = ws.view_hierarchy();
        let cases: Vec<Vec<LayoutItem>> = vec![
            vec![],
            vec![LayoutItem::View(views[3]), LayoutItem::View(views[3])],
            vec![LayoutItem::Splitter(second_root)],
            vec![LayoutItem::Splitter(root)],
        ];
        for items in cases {
            assert_eq!(
                ws.create_split_with_existing(root, &items, 0, Orientation::Vertical),
                Err(LayoutError::InvalidItems)
            );
        }
        assert_eq!(
            ws.create_split_with_existing(root, &[LayoutItem::View(ViewId(99))], 0, Orientation::Vertical),
            Err(LayoutError::UnknownView(ViewId(99)))
        );
        assert_eq!(ws.view_hierarchy(), before);
    }

    #[test]
    fn test_move_splitter_errors() {
        // Build H[v1|v2|V[v3|v4]] in a single tab.
        let (mut ws, root, views) = three_in_a_row();
        let pane = ws.active_pane().unwrap();
        let second_root = ws.tab_root(pane, 1).unwrap();
        ws.move_view(views[2], second_root, 0).unwrap();
        let nested = ws
            .create_split_with_existing(
                root,
                &[LayoutItem::View(views[2]), LayoutItem::View(views[3])],
                2,
                Orientation::Vertical,
            )
            .unwrap();
        let before = ws.view_hierarchy();
        assert_eq!(before.len(), 1);

        assert_eq!(ws.move_splitter(nested, nested, 0), Err(LayoutError::WouldCreateCycle));
        assert_eq!(ws.move_splitter(root, nested, 0), Err(LayoutError::WouldCreateCycle));
        assert_eq!(ws.move_splitter(root, root, 0), Err(LayoutError::WouldCreateCycle));
        assert_eq!(ws.view_hierarchy(), before);

        let leaf = ws.splitters().find_leaf(views[0]).unwrap();
        assert_eq!(ws.move_splitter(leaf, nested, 0), Err(LayoutError::UnknownSplitter));

        ws.move_splitter(nested, root, 0).unwrap();
        assert_eq!(
            ws.view_hierarchy(),
            vec![format!("H[V[{}|{}]|{}|{}]", views[2], views[3], views[0], views[1])]
        );
        assert!(ws.is_well_formed());
    }

    #[test]
    fn test_top_level_splitter_cannot_move() {
        let (mut ws, root, _views) = three_in_a_row();
        let pane = ws.active_pane().unwrap();
        let second_root = ws.tab_root(pane, 1).unwrap();
        assert_eq!(ws.move_splitter(second_root, root, 0), Err(LayoutError::TopLevelSplitter));
    }

    #[test]
    fn test_drop_view_to_new_pane() {
        let (mut ws, _root, views) = three_in_a_row();
        let pane = ws.active_pane().unwrap();
        let new_pane = ws.drop_view_to_new_pane(views[1], pane, Orientation::Vertical).unwrap();
        assert_eq!(ws.panes(), vec![pane, new_pane]);
        assert_eq!(ws.views_in_tab(new_pane, 0), vec![views[1]]);
        assert_eq!(ws.active_view(), Some(views[1]));
        assert_eq!(ws.pane_tree().orientation(), Orientation::Vertical);
        assert!(ws.is_well_formed());
    }

    #[test]
    fn test_drop_only_view_on_own_pane_is_rejected() {
        let (mut ws, _rx) = make_workspace();
        let view = ws.new_session(None, None).unwrap();
        let pane = ws.active_pane().unwrap();
        assert_eq!(
            ws.drop_view_to_new_pane(view, pane, Orientation::Horizontal),
            Err(LayoutError::NothingToMove)
        );
        assert_eq!(
            ws.drop_tab_to_new_pane(pane, 0, pane, Orientation::Horizontal),
            Err(LayoutError::NothingToMove)
        );
        assert_eq!(ws.panes(), vec![pane]);
    }

    #[test]
    fn test_drop_tab_to_new_pane_moves_whole_tab() {
        let (mut ws, mut rx) = make_workspace();
        let first = ws.new_session(None, None).unwrap();
        let second = ws.new_session(None, None).unwrap();
        let pane = ws.active_pane().unwrap();
        drain(&mut rx);
        let new_pane = ws.drop_tab_to_new_pane(pane, 0, pane, Orientation::Horizontal).unwrap();
        assert_eq!(ws.views_in_tab(new_pane, 0), vec![first]);
        assert_eq!(ws.views_in_tab(pane, 0), vec![second]);
        assert_eq!(ws.active_view(), Some(first));
        let events = drain(&mut rx);
        assert!(events.contains(&WorkspaceEvent::TabRemoved { pane, index: 0 }));
        assert!(events.contains(&WorkspaceEvent::PaneAdded(new_pane)));
        assert!(ws.is_well_formed());
    }

    #[test]
    fn test_move_tab_between_panes_removes_empty_source() {
        let (mut ws, _rx) = make_workspace();
        let first = ws.new_session(None, None).unwrap();
        let left = ws.active_pane().unwrap();
        let second = ws.split(Orientation::Horizontal, false).unwrap();
        let right = ws.active_pane().unwrap();
        assert_eq!(ws.move_tab_between_panes(right, 0, right), Err(LayoutError::NothingToMove));
        assert_eq!(ws.move_tab_between_panes(right, 0, left), Ok(1));
        assert_eq!(ws.panes(), vec![left]);
        assert_eq!(ws.views_in_tab(left, 0), vec![first]);
        assert_eq!(ws.views_in_tab(left, 1), vec![second]);
        assert_eq!(ws.active_view(), Some(second));
        assert!(ws.is_well_formed());
    }

    #[test]
    fn test_move_active_tab_toward_neighbor() {
        let (mut ws, _rx) = make_workspace();
        ws.new_session(None, None).unwrap();
        let left = ws.active_pane().unwrap();
        ws.split(Orientation::Horizontal, false).unwrap();
        let right = ws.active_pane().unwrap();
        assert_eq!(ws.move_active_tab_toward(Direction::Left), None);
        let extra = ws.new_session(None, None).unwrap();
        assert_eq!(ws.move_active_tab_toward(Direction::Left), Some(1));
        assert_eq!(ws.locate_view(extra), Some((left, 1)));
        assert_eq!(ws.pane(right).map(|p| p.tab_count()), Some(1));
        assert_eq!(ws.active_pane(), Some(left));
    }
}
