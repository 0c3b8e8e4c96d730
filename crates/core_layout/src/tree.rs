//! The layout tree.
//!
//! Every workspace is a three level tree: one root, an ordered list of
//! containers ("columns") under it, and an ordered list of windows inside each
//! container. Nodes live in a generational arena; parent links are plain ids
//! into the same arena, so a stale id simply fails to resolve.
//!
//! Invariants kept by every mutating operation:
//! - depth is exactly root → container → window;
//! - a workspace with windows has no empty containers;
//! - a workspace without windows has exactly one empty container.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::animation::Spring;
use crate::geometry::{Orientation, Size};
use crate::{LayoutError, WindowHandle, WorkspaceId};

new_key_type! {
    /// Identity of a node in the layout tree.
    pub struct NodeId;
}

/// Width of a column along the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnWidth {
    /// Proportion of the working area.
    Proportion(f64),
    /// Fixed size in points.
    Fixed(f64),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Proportion(0.5)
    }
}

/// How a container shows its windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Normal,
    /// All windows share one footprint; only the active one is shown.
    Tabbed,
}

/// Sizing mode of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    #[default]
    Normal,
    /// Fills the working area of the monitor.
    Maximized,
    /// Fills the whole screen.
    Fullscreen,
}

/// Size of a window across the scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightedSize {
    /// Share of the column's free space.
    Auto { weight: f64 },
    /// Explicit size in points.
    Fixed(f64),
}

impl Default for WeightedSize {
    fn default() -> Self {
        WeightedSize::Auto { weight: 1.0 }
    }
}

impl WeightedSize {
    pub fn weight(&self) -> Option<f64> {
        match self {
            WeightedSize::Auto { weight } => Some(*weight),
            WeightedSize::Fixed(_) => None,
        }
    }
}

/// Size limits reported by the application.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowSizeConstraints {
    pub min: Size,
    /// Zero on an axis means unbounded.
    pub max: Size,
    /// The window cannot be resized at all; its current size is required.
    pub is_fixed: bool,
}

impl WindowSizeConstraints {
    pub fn new(min: Size, max: Size) -> Self {
        Self {
            min,
            max,
            is_fixed: false,
        }
    }

    /// Constraints of a window that must keep exactly `size`.
    pub fn fixed(size: Size) -> Self {
        Self {
            min: size,
            max: size,
            is_fixed: true,
        }
    }

    /// `(min, max)` along the scroll axis.
    pub fn primary(&self, orientation: Orientation) -> (f64, f64) {
        (
            orientation.primary_size(self.min),
            orientation.primary_size(self.max),
        )
    }

    /// `(min, max)` across the scroll axis.
    pub fn secondary(&self, orientation: Orientation) -> (f64, f64) {
        (
            orientation.secondary_size(self.min),
            orientation.secondary_size(self.max),
        )
    }
}

/// Sizing state saved when a window enters fullscreen or maximized mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingRestore {
    pub sizing: SizingMode,
    pub size: WeightedSize,
}

/// Offset of a window from its laid-out position, animating back to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveAnimation {
    pub dx: Spring,
    pub dy: Spring,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootData {
    pub workspace: WorkspaceId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainerData {
    pub width: ColumnWidth,
    /// Span along the scroll axis from the last resolve.
    pub cached_span: Option<f64>,
    /// The cached span sits on a child's min or max bound.
    pub span_constrained: bool,
    pub display: DisplayMode,
    /// Index of the active (focused or shown) window.
    pub active_child: usize,
    /// Index into the preset widths when the width came from a preset.
    pub preset_index: Option<usize>,
    /// Width to return to when full width is toggled off.
    pub width_before_full: Option<ColumnWidth>,
    /// Animates the visible span from the previous width.
    pub width_animation: Option<Spring>,
}

impl ContainerData {
    pub fn new(width: ColumnWidth) -> Self {
        Self {
            width,
            cached_span: None,
            span_constrained: false,
            display: DisplayMode::Normal,
            active_child: 0,
            preset_index: None,
            width_before_full: None,
            width_animation: None,
        }
    }

    pub fn is_full_width(&self) -> bool {
        self.width_before_full.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowData {
    pub handle: WindowHandle,
    pub sizing: SizingMode,
    pub size: WeightedSize,
    pub constraints: WindowSizeConstraints,
    /// Span across the scroll axis from the last solve.
    pub resolved_span: Option<f64>,
    pub was_constrained: bool,
    pub restore: Option<SizingRestore>,
    pub move_animation: Option<MoveAnimation>,
    pub alpha_animation: Option<Spring>,
}

impl WindowData {
    pub fn new(handle: WindowHandle) -> Self {
        Self {
            handle,
            sizing: SizingMode::Normal,
            size: WeightedSize::default(),
            constraints: WindowSizeConstraints::default(),
            resolved_span: None,
            was_constrained: false,
            restore: None,
            move_animation: None,
            alpha_animation: None,
        }
    }

    pub fn is_resizable(&self) -> bool {
        !self.constraints.is_fixed && self.sizing != SizingMode::Fullscreen
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root(RootData),
    Container(ContainerData),
    Window(WindowData),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Where a window was detached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detached {
    pub workspace: WorkspaceId,
    pub column_index: usize,
    pub window_index: usize,
    /// The source column became empty and was removed.
    pub column_removed: bool,
}

/// Arena owning every node of every workspace.
#[derive(Debug, Default)]
pub struct LayoutTree {
    nodes: SlotMap<NodeId, Node>,
    roots: HashMap<WorkspaceId, NodeId>,
    windows: HashMap<WindowHandle, NodeId>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn container(&self, id: NodeId) -> Option<&ContainerData> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Container(data) => Some(data),
            _ => None,
        }
    }

    pub fn container_mut(&mut self, id: NodeId) -> Option<&mut ContainerData> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Container(data) => Some(data),
            _ => None,
        }
    }

    pub fn window(&self, id: NodeId) -> Option<&WindowData> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Window(data) => Some(data),
            _ => None,
        }
    }

    pub fn window_mut(&mut self, id: NodeId) -> Option<&mut WindowData> {
        match &mut self.nodes.get_mut(id)?.kind {
            NodeKind::Window(data) => Some(data),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn node_for_handle(&self, handle: WindowHandle) -> Option<NodeId> {
        self.windows.get(&handle).copied()
    }

    pub fn handles(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.windows.keys().copied()
    }

    /// Every node, for bulk updates of transient state.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node)> + '_ {
        self.nodes.iter_mut()
    }

    // ------------------------------------------------------------------
    // Workspaces
    // ------------------------------------------------------------------

    pub fn root(&self, workspace: WorkspaceId) -> Option<NodeId> {
        self.roots.get(&workspace).copied()
    }

    pub fn workspaces(&self) -> impl Iterator<Item = WorkspaceId> + '_ {
        self.roots.keys().copied()
    }

    /// Root of `workspace`, creating it with its placeholder column on first
    /// reference.
    pub fn ensure_workspace(&mut self, workspace: WorkspaceId, width: ColumnWidth) -> NodeId {
        if let Some(root) = self.root(workspace) {
            return root;
        }

        let root = self.nodes.insert(Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Root(RootData { workspace }),
        });
        let placeholder = self.nodes.insert(Node {
            parent: Some(root),
            children: Vec::new(),
            kind: NodeKind::Container(ContainerData::new(width)),
        });
        self.nodes[root].children.push(placeholder);
        self.roots.insert(workspace, root);
        root
    }

    /// Destroy a workspace and every node under it. Returns the handles of
    /// the windows that were still in it.
    pub fn remove_workspace(&mut self, workspace: WorkspaceId) -> Vec<WindowHandle> {
        let Some(root) = self.roots.remove(&workspace) else {
            return Vec::new();
        };

        let mut orphaned = Vec::new();
        let columns = self.children(root).to_vec();
        for column in columns {
            for window in self.children(column).to_vec() {
                if let Some(node) = self.nodes.remove(window) {
                    if let NodeKind::Window(data) = node.kind {
                        self.windows.remove(&data.handle);
                        orphaned.push(data.handle);
                    }
                }
            }
            self.nodes.remove(column);
        }
        self.nodes.remove(root);
        orphaned
    }

    /// Columns of a workspace, in order.
    pub fn columns(&self, workspace: WorkspaceId) -> &[NodeId] {
        self.root(workspace).map_or(&[], |root| self.children(root))
    }

    pub fn column_at(&self, workspace: WorkspaceId, index: usize) -> Option<NodeId> {
        self.columns(workspace).get(index).copied()
    }

    pub fn column_count(&self, workspace: WorkspaceId) -> usize {
        self.columns(workspace).len()
    }

    /// Every window of a workspace, column by column.
    pub fn windows_in(&self, workspace: WorkspaceId) -> Vec<NodeId> {
        self.columns(workspace)
            .iter()
            .flat_map(|&column| self.children(column).iter().copied())
            .collect()
    }

    pub fn window_count(&self, workspace: WorkspaceId) -> usize {
        self.columns(workspace)
            .iter()
            .map(|&column| self.children(column).len())
            .sum()
    }

    pub fn first_window(&self, workspace: WorkspaceId) -> Option<NodeId> {
        self.columns(workspace)
            .first()
            .and_then(|&column| self.children(column).first().copied())
    }

    /// Workspace that owns `id`, for any node kind.
    pub fn workspace_of(&self, id: NodeId) -> Option<WorkspaceId> {
        let mut current = id;
        loop {
            let node = self.nodes.get(current)?;
            match &node.kind {
                NodeKind::Root(data) => return Some(data.workspace),
                _ => current = node.parent?,
            }
        }
    }

    /// Container holding `window`.
    pub fn column_of(&self, window: NodeId) -> Option<NodeId> {
        self.window(window)?;
        self.parent(window)
    }

    /// Index of a node among its siblings.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// `(column index, window index)` of a window within its workspace.
    pub fn position(&self, window: NodeId) -> Option<(usize, usize)> {
        let column = self.column_of(window)?;
        Some((self.index_in_parent(column)?, self.index_in_parent(window)?))
    }

    /// The workspace has no windows and only its placeholder column.
    pub fn is_empty_workspace(&self, workspace: WorkspaceId) -> bool {
        self.window_count(workspace) == 0
    }

    // ------------------------------------------------------------------
    // Window insertion
    // ------------------------------------------------------------------

    fn new_window_node(&mut self, handle: WindowHandle) -> Result<NodeId, LayoutError> {
        if self.windows.contains_key(&handle) {
            return Err(LayoutError::DuplicateWindow(handle));
        }
        let id = self.nodes.insert(Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Window(WindowData::new(handle)),
        });
        self.windows.insert(handle, id);
        Ok(id)
    }

    /// Add a window as a new column at `index`. An empty workspace reuses its
    /// placeholder column instead.
    pub fn insert_window_as_column(
        &mut self,
        workspace: WorkspaceId,
        index: usize,
        handle: WindowHandle,
        width: ColumnWidth,
    ) -> Result<NodeId, LayoutError> {
        self.root(workspace)
            .ok_or(LayoutError::WorkspaceNotFound(workspace))?;
        let window = self.new_window_node(handle)?;
        self.attach_window_as_column(window, workspace, index, width)?;
        Ok(window)
    }

    /// Add a window to an existing column at `index` (clamped).
    pub fn insert_window_in_column(
        &mut self,
        column: NodeId,
        index: usize,
        handle: WindowHandle,
    ) -> Result<NodeId, LayoutError> {
        self.container(column)
            .ok_or(LayoutError::WrongNodeKind(column, "container"))?;
        let window = self.new_window_node(handle)?;
        self.attach_window(window, column, index)?;
        Ok(window)
    }

    /// Re-parent a detached window into `column` at `index` (clamped).
    pub fn attach_window(
        &mut self,
        window: NodeId,
        column: NodeId,
        index: usize,
    ) -> Result<(), LayoutError> {
        self.window(window)
            .ok_or(LayoutError::WrongNodeKind(window, "window"))?;
        self.container(column)
            .ok_or(LayoutError::WrongNodeKind(column, "container"))?;
        if self.parent(window).is_some() {
            return Err(LayoutError::InvariantViolated(
                "window is still attached".to_string(),
            ));
        }

        let children = &mut self.nodes[column].children;
        let index = index.min(children.len());
        children.insert(index, window);
        self.nodes[window].parent = Some(column);
        if let Some(data) = self.container_mut(column) {
            data.cached_span = None;
        }
        Ok(())
    }

    /// Re-parent a detached window as a new column at `index` (clamped).
    /// Returns the column.
    pub fn attach_window_as_column(
        &mut self,
        window: NodeId,
        workspace: WorkspaceId,
        index: usize,
        width: ColumnWidth,
    ) -> Result<NodeId, LayoutError> {
        let root = self
            .root(workspace)
            .ok_or(LayoutError::WorkspaceNotFound(workspace))?;

        let column = match self.placeholder(workspace) {
            Some(placeholder) => {
                if let Some(data) = self.container_mut(placeholder) {
                    *data = ContainerData::new(width);
                }
                placeholder
            }
            None => {
                let column = self.nodes.insert(Node {
                    parent: Some(root),
                    children: Vec::new(),
                    kind: NodeKind::Container(ContainerData::new(width)),
                });
                let children = &mut self.nodes[root].children;
                let index = index.min(children.len());
                children.insert(index, column);
                column
            }
        };

        self.attach_window(window, column, 0)?;
        Ok(column)
    }

    /// The lone empty column of a workspace without windows.
    fn placeholder(&self, workspace: WorkspaceId) -> Option<NodeId> {
        match self.columns(workspace) {
            [only] if self.children(*only).is_empty() => Some(*only),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Window removal
    // ------------------------------------------------------------------

    /// Take a window out of its column without destroying it. A column left
    /// empty is removed unless it is the last column of the workspace.
    pub fn detach_window(&mut self, window: NodeId) -> Result<Detached, LayoutError> {
        self.window(window)
            .ok_or(LayoutError::WrongNodeKind(window, "window"))?;
        let column = self
            .parent(window)
            .ok_or(LayoutError::NodeNotFound(window))?;
        let root = self.parent(column).ok_or(LayoutError::NodeNotFound(column))?;
        let workspace = self
            .workspace_of(root)
            .ok_or(LayoutError::NodeNotFound(root))?;
        let column_index = self
            .index_in_parent(column)
            .ok_or(LayoutError::NodeNotFound(column))?;
        let window_index = self
            .index_in_parent(window)
            .ok_or(LayoutError::NodeNotFound(window))?;

        self.nodes[column].children.remove(window_index);
        self.nodes[window].parent = None;

        let remaining = self.nodes[column].children.len();
        let mut column_removed = false;
        if remaining == 0 {
            if self.nodes[root].children.len() > 1 {
                self.nodes[root].children.remove(column_index);
                self.nodes.remove(column);
                column_removed = true;
            } else if let Some(data) = self.container_mut(column) {
                // Keep the placeholder, but forget per-column state.
                data.active_child = 0;
                data.display = DisplayMode::Normal;
                data.cached_span = None;
                data.width_animation = None;
            }
        } else if let Some(data) = self.container_mut(column) {
            if data.active_child > window_index || data.active_child >= remaining {
                data.active_child = data.active_child.saturating_sub(1);
            }
            data.cached_span = None;
        }

        Ok(Detached {
            workspace,
            column_index,
            window_index,
            column_removed,
        })
    }

    /// Remove a window from the tree and destroy its node.
    pub fn remove_window(&mut self, handle: WindowHandle) -> Result<Detached, LayoutError> {
        let window = self
            .node_for_handle(handle)
            .ok_or(LayoutError::WindowNotFound(handle))?;
        let detached = self.detach_window(window)?;
        self.nodes.remove(window);
        self.windows.remove(&handle);
        Ok(detached)
    }

    // ------------------------------------------------------------------
    // Reordering
    // ------------------------------------------------------------------

    /// Exchange the positions of two windows, in the same column or across
    /// columns and workspaces.
    pub fn swap_windows(&mut self, a: NodeId, b: NodeId) -> Result<(), LayoutError> {
        if a == b {
            return Ok(());
        }
        let column_a = self.column_of(a).ok_or(LayoutError::NodeNotFound(a))?;
        let column_b = self.column_of(b).ok_or(LayoutError::NodeNotFound(b))?;
        let index_a = self.index_in_parent(a).ok_or(LayoutError::NodeNotFound(a))?;
        let index_b = self.index_in_parent(b).ok_or(LayoutError::NodeNotFound(b))?;

        self.nodes[column_a].children[index_a] = b;
        self.nodes[column_b].children[index_b] = a;
        self.nodes[a].parent = Some(column_b);
        self.nodes[b].parent = Some(column_a);
        for column in [column_a, column_b] {
            if let Some(data) = self.container_mut(column) {
                data.cached_span = None;
            }
        }
        Ok(())
    }

    /// Exchange two columns of a workspace.
    pub fn swap_columns(
        &mut self,
        workspace: WorkspaceId,
        a: usize,
        b: usize,
    ) -> Result<(), LayoutError> {
        let root = self
            .root(workspace)
            .ok_or(LayoutError::WorkspaceNotFound(workspace))?;
        let len = self.nodes[root].children.len();
        for index in [a, b] {
            if index >= len {
                return Err(LayoutError::ColumnOutOfBounds(index, len.saturating_sub(1)));
            }
        }
        self.nodes[root].children.swap(a, b);
        Ok(())
    }

    /// Move a window within its column to `index` (clamped).
    pub fn reorder_window(&mut self, window: NodeId, index: usize) -> Result<(), LayoutError> {
        let column = self
            .column_of(window)
            .ok_or(LayoutError::NodeNotFound(window))?;
        let from = self
            .index_in_parent(window)
            .ok_or(LayoutError::NodeNotFound(window))?;
        let children = &mut self.nodes[column].children;
        let to = index.min(children.len() - 1);
        let id = children.remove(from);
        children.insert(to, id);
        if let Some(data) = self.container_mut(column) {
            if data.active_child == from {
                data.active_child = to;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Verify the structural invariants of every workspace.
    pub fn check_invariants(&self) -> Result<(), LayoutError> {
        let fail = |msg: String| Err(LayoutError::InvariantViolated(msg));

        for (&workspace, &root) in &self.roots {
            let Some(node) = self.nodes.get(root) else {
                return fail(format!("workspace {workspace} has a dangling root"));
            };
            if !matches!(node.kind, NodeKind::Root(_)) || node.parent.is_some() {
                return fail(format!("workspace {workspace} root is malformed"));
            }
            if node.children.is_empty() {
                return fail(format!("workspace {workspace} has no columns"));
            }

            let window_count = self.window_count(workspace);
            for &column in &node.children {
                let Some(column_node) = self.nodes.get(column) else {
                    return fail(format!("workspace {workspace} has a dangling column"));
                };
                if !matches!(column_node.kind, NodeKind::Container(_))
                    || column_node.parent != Some(root)
                {
                    return fail(format!("workspace {workspace} has a malformed column"));
                }
                if column_node.children.is_empty() && (window_count > 0 || node.children.len() > 1)
                {
                    return fail(format!("workspace {workspace} has a stray empty column"));
                }
                for &window in &column_node.children {
                    let Some(window_node) = self.nodes.get(window) else {
                        return fail(format!("workspace {workspace} has a dangling window"));
                    };
                    let NodeKind::Window(data) = &window_node.kind else {
                        return fail(format!("workspace {workspace} nests a non-window"));
                    };
                    if window_node.parent != Some(column) || !window_node.children.is_empty() {
                        return fail(format!("window {} is malformed", data.handle));
                    }
                    if self.windows.get(&data.handle) != Some(&window) {
                        return fail(format!("window {} is not indexed", data.handle));
                    }
                }
            }
        }
        Ok(())
    }
}
