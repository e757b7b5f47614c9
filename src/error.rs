use thiserror::Error;

use crate::backend::ViewId;
use crate::pane::PaneId;

/// Why a structural operation was rejected.
///
/// Every rejection is decided before the tree is touched, so an `Err` always
/// means nothing changed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("no view with id {0}")]
    UnknownView(ViewId),

    #[error("splitter is not part of this workspace")]
    UnknownSplitter,

    #[error("no pane with id {0}")]
    UnknownPane(PaneId),

    #[error("pane {pane} has no tab at index {index}")]
    UnknownTab { pane: PaneId, index: usize },

    #[error("there is no active pane")]
    NoActivePane,

    #[error("a splitter cannot be moved into itself or one of its descendants")]
    WouldCreateCycle,

    #[error("top-level tab splitters cannot be moved into another splitter")]
    TopLevelSplitter,

    #[error("item list is empty, repeats an entry or names a forbidden node")]
    InvalidItems,

    #[error("percentages must each be at least 1, match the child count and sum to 99..=100 (got {sum})")]
    InvalidProportions { sum: f64 },

    #[error("the move would leave its own source empty")]
    NothingToMove,

    #[error("detaching would remove the last view of the window")]
    LastView,

    #[error("the workspace is closing")]
    Closing,
}
