//! Strata Core Layout Engine
//!
//! Platform-agnostic scrollable tiling layout core.
//!
//! Windows are arranged in columns on a strip that scrolls along one axis:
//! - each workspace is a tree of root → columns → windows
//! - the monitor acts as a viewport sliding over the strip
//! - sizes inside a column come from a weighted constraint solver
//! - every transition is a spring sampled at a caller supplied time
//!
//! The crate performs no I/O. Callers mutate the [`LayoutEngine`] and ask it
//! to [`compose`](LayoutEngine::compose) a monitor at a point in time.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod animation;
pub mod compose;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod interactive;
pub mod monitor;
pub mod solver;
pub mod swipe_tracker;
pub mod tree;
pub mod viewport;

pub use animation::{Spring, SpringConfig};
pub use compose::{Composition, HiddenSide};
pub use config::{Config, ConfigError, ConfigWarning};
pub use engine::{LayoutEngine, SyncResult};
pub use geometry::{Orientation, Point, Rect, Size};
pub use interactive::{HoverTarget, InsertIntent, ResizeEdges};
pub use monitor::{MonitorGeometry, MonitorId};
pub use tree::{ColumnWidth, DisplayMode, NodeId, SizingMode, WindowSizeConstraints};
pub use viewport::CenteringPolicy;

/// Stable identity of a window, owned by the window-tracking collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identity of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub u64);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Abstract navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Map a screen direction onto the layout axes of `orientation`.
    ///
    /// Returns `(along_strip, step)` where `along_strip` is true for movement
    /// between columns and `step` is -1 or +1.
    pub fn resolve(self, orientation: Orientation) -> (bool, isize) {
        match (orientation, self) {
            (Orientation::Horizontal, Direction::Left) => (true, -1),
            (Orientation::Horizontal, Direction::Right) => (true, 1),
            (Orientation::Horizontal, Direction::Up) => (false, -1),
            (Orientation::Horizontal, Direction::Down) => (false, 1),
            (Orientation::Vertical, Direction::Up) => (true, -1),
            (Orientation::Vertical, Direction::Down) => (true, 1),
            (Orientation::Vertical, Direction::Left) => (false, -1),
            (Orientation::Vertical, Direction::Right) => (false, 1),
        }
    }
}

/// Errors that can occur during layout operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Column index {0} is out of bounds (max: {1})")]
    ColumnOutOfBounds(usize, usize),

    #[error("Window {0} not found")]
    WindowNotFound(WindowHandle),

    #[error("Node {0:?} not found")]
    NodeNotFound(NodeId),

    #[error("Node {0:?} is not a {1}")]
    WrongNodeKind(NodeId, &'static str),

    #[error("Workspace {0} not found")]
    WorkspaceNotFound(WorkspaceId),

    #[error("Window {0} is already tracked")]
    DuplicateWindow(WindowHandle),

    #[error("Another interactive move or resize is active")]
    InteractionActive,

    #[error("Window {0} cannot be resized")]
    NotResizable(WindowHandle),

    #[error("Window {0} is fullscreen")]
    Fullscreen(WindowHandle),

    #[error("Layout invariant violated: {0}")]
    InvariantViolated(String),
}
