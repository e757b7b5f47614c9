use crate::backend::ViewId;

/// Most-recently-used view list with a traversal cursor.
///
/// While a cycle gesture is running the cursor points at the view being
/// previewed and the list order is frozen; [`FocusHistory::end_cycle`]
/// promotes the previewed view to the front.
#[derive(Clone, Debug, Default)]
pub struct FocusHistory {
    entries: Vec<ViewId>,
    cursor: Option<usize>,
}

impl FocusHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ViewId] {
        &self.entries
    }

    pub fn front(&self) -> Option<ViewId> {
        self.entries.first().copied()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_traversing(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.entries.contains(&view)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a newly created view at the back of the list.
    pub fn push(&mut self, view: ViewId) {
        if !self.contains(view) {
            self.entries.push(view);
        }
    }

    /// Record that `view` gained focus by moving it to the front. Ignored
    /// while a traversal is running.
    pub fn touch(&mut self, view: ViewId) {
        if self.cursor.is_some() {
            return;
        }
        self.entries.retain(|entry| *entry != view);
        self.entries.insert(0, view);
    }

    /// Forget `view`, keeping the cursor on the same entry where possible.
    pub fn remove(&mut self, view: ViewId) {
        let Some(index) = self.entries.iter().position(|entry| *entry == view) else {
            return;
        };
        self.entries.remove(index);
        self.cursor = match self.cursor {
            _ if self.entries.len() <= 1 => None,
            Some(cursor) if index < cursor => Some(cursor - 1),
            Some(cursor) if cursor >= self.entries.len() => Some(self.entries.len() - 1),
            other => other,
        };
    }

    /// Advance the traversal and return the view to activate. The list is
    /// not reordered. Does nothing with fewer than two entries.
    pub fn cycle(&mut self, reverse: bool) -> Option<ViewId> {
        let len = self.entries.len();
        if len <= 1 {
            return None;
        }
        let next = match (self.cursor, reverse) {
            (None, false) => 1,
            (None, true) => len - 1,
            (Some(0), true) => len - 1,
            (Some(cursor), true) => cursor - 1,
            (Some(cursor), false) if cursor + 1 >= len => 0,
            (Some(cursor), false) => cursor + 1,
        };
        self.cursor = Some(next);
        self.entries.get(next).copied()
    }

    /// Finish the traversal, promoting its target to the front.
    pub fn end_cycle(&mut self) -> Option<ViewId> {
        let cursor = self.cursor.take()?;
        let view = self.entries.get(cursor).copied()?;
        self.entries.remove(cursor);
        self.entries.insert(0, view);
        Some(view)
    }

    /// The previously used view, independent of any traversal.
    pub fn alternate(&self) -> Option<ViewId> {
        self.entries.get(1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(ids: &[u32]) -> FocusHistory {
        let mut history = FocusHistory::new();
        for id in ids {
            history.push(ViewId(*id));
        }
        history
    }

    fn ids(history: &FocusHistory) -> Vec<u32> {
        history.entries().iter().map(|v| v.0).collect()
    }

    #[test]
    fn test_touch_moves_to_front() {
        let mut h = history(&[1, 2, 3]);
        h.touch(ViewId(3));
        assert_eq!(ids(&h), vec![3, 1, 2]);
        h.touch(ViewId(9));
        assert_eq!(ids(&h), vec![9, 3, 1, 2]);
    }

    #[test]
    fn test_push_ignores_duplicates() {
        let mut h = history(&[1, 2]);
        h.push(ViewId(1));
        assert_eq!(ids(&h), vec![1, 2]);
    }

    #[test]
    fn test_cycle_needs_two_entries() {
        let mut h = history(&[1]);
        assert_eq!(h.cycle(false), None);
        assert!(!h.is_traversing());
    }

    #[test]
    fn test_cycle_forward_wraps_without_reordering() {
        let mut h = history(&[1, 2, 3]);
        assert_eq!(h.cycle(false), Some(ViewId(2)));
        assert_eq!(h.cycle(false), Some(ViewId(3)));
        assert_eq!(h.cycle(false), Some(ViewId(1)));
        assert_eq!(ids(&h), vec![1, 2, 3]);
    }

    #[test]
    fn test_cycle_reverse_starts_at_last() {
        let mut h = history(&[1, 2, 3]);
        assert_eq!(h.cycle(true), Some(ViewId(3)));
        assert_eq!(h.cycle(true), Some(ViewId(2)));
        assert_eq!(h.cycle(true), Some(ViewId(1)));
        assert_eq!(h.cycle(true), Some(ViewId(3)));
    }

    #[test]
    fn test_cycle_then_reverse_returns_to_start() {
        let mut h = history(&[1, 2, 3, 4]);
        for _ in 0..5 {
            h.cycle(false);
            h.cycle(true);
        }
        assert_eq!(h.cursor(), Some(0));
        h.end_cycle();
        let mut fresh = history(&[1, 2, 3, 4]);
        assert_eq!(fresh.cycle(false), Some(ViewId(2)));
        assert_eq!(fresh.end_cycle(), Some(ViewId(2)));
        assert_eq!(fresh.cycle(true), Some(ViewId(4)));
    }

    #[test]
    fn test_end_cycle_promotes_target() {
        let mut h = history(&[1, 2, 3, 4]);
        h.cycle(false);
        h.cycle(false);
        assert_eq!(h.end_cycle(), Some(ViewId(3)));
        assert_eq!(ids(&h), vec![3, 1, 2, 4]);
        assert!(!h.is_traversing());
        assert_eq!(h.end_cycle(), None);
    }

    #[test]
    fn test_touch_target_during_cycle_is_ignored() {
        let mut h = history(&[1, 2, 3]);
        let target = h.cycle(false).unwrap();
        h.touch(target);
        assert_eq!(ids(&h), vec![1, 2, 3]);
        assert_eq!(h.cursor(), Some(1));
    }

    #[test]
    fn test_touch_other_view_during_cycle_is_ignored() {
        let mut h = history(&[1, 2, 3]);
        h.cycle(false);
        h.touch(ViewId(3));
        assert_eq!(ids(&h), vec![1, 2, 3]);
        assert_eq!(h.cursor(), Some(1));
        assert_eq!(h.end_cycle(), Some(ViewId(2)));
        assert_eq!(ids(&h), vec![2, 1, 3]);
    }

    #[test]
    fn test_remove_adjusts_cursor() {
        let mut h = history(&[1, 2, 3, 4]);
        h.cycle(false);
        h.cycle(false);
        h.remove(ViewId(1));
        assert_eq!(h.cursor(), Some(1));
        assert_eq!(h.end_cycle(), Some(ViewId(3)));

        let mut h = history(&[1, 2]);
        h.cycle(false);
        h.remove(ViewId(2));
        assert!(!h.is_traversing());
        assert_eq!(ids(&h), vec![1]);
    }

    #[test]
    fn test_alternate_ignores_cursor() {
        let mut h = history(&[1, 2, 3]);
        h.cycle(true);
        assert_eq!(h.alternate(), Some(ViewId(2)));
        assert_eq!(h.cursor(), Some(2));
        assert_eq!(history(&[1]).alternate(), None);
    }
}
