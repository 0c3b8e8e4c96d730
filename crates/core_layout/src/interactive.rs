//! Interactive move and resize sessions.
//!
//! At most one session exists at a time; the engine keeps it in a single
//! `Option<Interaction>` slot. Sessions only record transient state until they
//! end. A move touches the tree only when it is committed; a resize edits the
//! column width and window weight live and puts them back on cancel.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compose::{Composition, HiddenSide};
use crate::geometry::{Orientation, Point, Rect};
use crate::tree::{ColumnWidth, LayoutTree, NodeId, SizingMode, WeightedSize};
use crate::{LayoutError, WindowHandle, WorkspaceId};

/// Share of a window's extent, at each end, that means "insert before/after"
/// rather than "swap".
const INSERT_ZONE: f64 = 0.25;

bitflags! {
    /// Edges grabbed by an interactive resize.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ResizeEdges: u8 {
        const LEFT = 1;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

impl ResizeEdges {
    /// Sign applied to pointer motion along the scroll axis, or `None` when no
    /// edge on that axis is grabbed.
    pub fn primary_sign(self, orientation: Orientation) -> Option<f64> {
        let (leading, trailing) = match orientation {
            Orientation::Horizontal => (ResizeEdges::LEFT, ResizeEdges::RIGHT),
            Orientation::Vertical => (ResizeEdges::TOP, ResizeEdges::BOTTOM),
        };
        Self::sign(self, leading, trailing)
    }

    /// Sign applied to pointer motion across the scroll axis.
    pub fn secondary_sign(self, orientation: Orientation) -> Option<f64> {
        let (leading, trailing) = match orientation {
            Orientation::Horizontal => (ResizeEdges::TOP, ResizeEdges::BOTTOM),
            Orientation::Vertical => (ResizeEdges::LEFT, ResizeEdges::RIGHT),
        };
        Self::sign(self, leading, trailing)
    }

    fn sign(self, leading: ResizeEdges, trailing: ResizeEdges) -> Option<f64> {
        if self.contains(trailing) {
            Some(1.0)
        } else if self.contains(leading) {
            Some(-1.0)
        } else {
            None
        }
    }
}

/// Where a dragged window would land relative to another window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertIntent {
    Before,
    After,
    Swap,
}

/// What the pointer is over during an interactive move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoverTarget {
    Window {
        target: WindowHandle,
        intent: InsertIntent,
    },
    /// Between two columns; dropping creates a new column at `insert_index`.
    ColumnGap { insert_index: usize },
    /// Past the first or last column.
    WorkspaceEdge { side: HiddenSide },
}

/// A window being dragged to a new position.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveMove {
    pub window: NodeId,
    pub handle: WindowHandle,
    pub workspace: WorkspaceId,
    pub origin_column: usize,
    pub origin_frame: Rect,
    pub start_pointer: Point,
    pub pointer: Point,
    /// The pointer travelled past the move threshold.
    pub started: bool,
    pub hover: Option<HoverTarget>,
}

impl InteractiveMove {
    pub fn new(
        tree: &LayoutTree,
        handle: WindowHandle,
        origin_frame: Rect,
        pointer: Point,
    ) -> Result<Self, LayoutError> {
        let window = tree
            .node_for_handle(handle)
            .ok_or(LayoutError::WindowNotFound(handle))?;
        let data = tree
            .window(window)
            .ok_or(LayoutError::WrongNodeKind(window, "window"))?;
        if data.sizing == SizingMode::Fullscreen {
            return Err(LayoutError::Fullscreen(handle));
        }
        let workspace = tree
            .workspace_of(window)
            .ok_or(LayoutError::NodeNotFound(window))?;
        let (origin_column, _) = tree
            .position(window)
            .ok_or(LayoutError::NodeNotFound(window))?;

        Ok(Self {
            window,
            handle,
            workspace,
            origin_column,
            origin_frame,
            start_pointer: pointer,
            pointer,
            started: false,
            hover: None,
        })
    }

    /// Where the dragged window is drawn.
    pub fn frame(&self) -> Rect {
        self.origin_frame.translated(
            self.pointer.x - self.start_pointer.x,
            self.pointer.y - self.start_pointer.y,
        )
    }

    /// Track the pointer. Hover targets are computed only once the pointer
    /// has moved past `threshold`.
    pub fn update(
        &mut self,
        pointer: Point,
        threshold: f64,
        composition: Option<&Composition>,
        tree: &LayoutTree,
        orientation: Orientation,
    ) -> Option<HoverTarget> {
        self.pointer = pointer;
        if !self.started {
            let dx = pointer.x - self.start_pointer.x;
            let dy = pointer.y - self.start_pointer.y;
            if dx.hypot(dy) < threshold {
                return None;
            }
            self.started = true;
            debug!(handle = %self.handle, "interactive move started");
        }

        self.hover = composition.and_then(|composition| {
            hit_test(composition, tree, self.workspace, self.handle, pointer, orientation)
        });
        self.hover
    }
}

/// Find what `pointer` is over, ignoring the dragged window itself.
pub fn hit_test(
    composition: &Composition,
    tree: &LayoutTree,
    workspace: WorkspaceId,
    dragged: WindowHandle,
    pointer: Point,
    orientation: Orientation,
) -> Option<HoverTarget> {
    for (handle, rect) in composition.topmost_first() {
        if handle == dragged || !rect.contains(pointer) {
            continue;
        }
        let in_workspace = tree
            .node_for_handle(handle)
            .and_then(|node| tree.workspace_of(node))
            == Some(workspace);
        if !in_workspace || composition.inactive_tabs.contains(&handle) {
            continue;
        }

        let start = orientation.secondary_origin(rect);
        let extent = orientation.secondary_extent(rect).max(1.0);
        let fraction = (orientation.secondary(pointer) - start) / extent;
        let intent = if fraction < INSERT_ZONE {
            InsertIntent::Before
        } else if fraction > 1.0 - INSERT_ZONE {
            InsertIntent::After
        } else {
            InsertIntent::Swap
        };
        return Some(HoverTarget::Window {
            target: handle,
            intent,
        });
    }

    let columns: Vec<_> = composition
        .columns
        .iter()
        .filter(|column| column.workspace == workspace)
        .collect();
    let (first, last) = (columns.first()?, columns.last()?);
    let along = orientation.primary(pointer);

    if along < orientation.primary_origin(&first.rect) {
        return Some(HoverTarget::WorkspaceEdge {
            side: HiddenSide::leading(orientation),
        });
    }
    if along >= orientation.primary_origin(&last.rect) + orientation.primary_extent(&last.rect) {
        return Some(HoverTarget::WorkspaceEdge {
            side: HiddenSide::trailing(orientation),
        });
    }

    for pair in columns.windows(2) {
        let end = orientation.primary_origin(&pair[0].rect) + orientation.primary_extent(&pair[0].rect);
        let next = orientation.primary_origin(&pair[1].rect);
        if along >= end && along < next {
            return Some(HoverTarget::ColumnGap {
                insert_index: pair[1].index,
            });
        }
    }
    None
}

/// Commit a move onto `target`. Returns `Ok(false)` when the drop is a no-op.
///
/// `max_windows_per_column` of 0 means unlimited; `default_width` is used for
/// columns created by the drop when the source column does not move whole.
pub fn commit_move(
    tree: &mut LayoutTree,
    window: NodeId,
    target: HoverTarget,
    max_windows_per_column: usize,
    default_width: ColumnWidth,
) -> Result<bool, LayoutError> {
    let workspace = tree
        .workspace_of(window)
        .ok_or(LayoutError::NodeNotFound(window))?;
    let source_column = tree
        .column_of(window)
        .ok_or(LayoutError::NodeNotFound(window))?;
    let source = tree
        .container(source_column)
        .ok_or(LayoutError::WrongNodeKind(source_column, "container"))?;
    let moves_whole_column = tree.children(source_column).len() == 1;
    let source_width = source.width;

    match target {
        HoverTarget::Window { target, intent } => {
            let other = tree
                .node_for_handle(target)
                .ok_or(LayoutError::WindowNotFound(target))?;
            if other == window {
                return Ok(false);
            }
            let target_column = tree
                .column_of(other)
                .ok_or(LayoutError::NodeNotFound(other))?;

            if intent == InsertIntent::Swap {
                swap_with_sizes(tree, window, other)?;
                return Ok(true);
            }

            if target_column != source_column
                && max_windows_per_column > 0
                && tree.children(target_column).len() >= max_windows_per_column
            {
                debug!(%target, "target column is full");
                return Ok(false);
            }

            tree.detach_window(window)?;
            let index = tree
                .index_in_parent(other)
                .ok_or(LayoutError::NodeNotFound(other))?;
            let index = match intent {
                InsertIntent::After => index + 1,
                _ => index,
            };
            tree.attach_window(window, target_column, index)?;
            if let Some(data) = tree.window_mut(window) {
                data.size = WeightedSize::default();
            }
            Ok(true)
        }
        HoverTarget::ColumnGap { insert_index } => {
            let width = if moves_whole_column {
                source_width
            } else {
                default_width
            };
            let detached = tree.detach_window(window)?;
            let index = if detached.column_removed && detached.column_index < insert_index {
                insert_index - 1
            } else {
                insert_index
            };
            tree.attach_window_as_column(window, workspace, index, width)?;
            if let Some(data) = tree.window_mut(window) {
                data.size = WeightedSize::default();
            }
            Ok(true)
        }
        HoverTarget::WorkspaceEdge { side } => {
            let width = if moves_whole_column {
                source_width
            } else {
                default_width
            };
            tree.detach_window(window)?;
            let index = if side.is_leading() {
                0
            } else {
                tree.column_count(workspace)
            };
            tree.attach_window_as_column(window, workspace, index, width)?;
            if let Some(data) = tree.window_mut(window) {
                data.size = WeightedSize::default();
            }
            Ok(true)
        }
    }
}

/// Swap two windows. Across columns the columns also trade widths and the
/// windows trade sizes, so each slot keeps its visual size.
fn swap_with_sizes(tree: &mut LayoutTree, a: NodeId, b: NodeId) -> Result<(), LayoutError> {
    let column_a = tree.column_of(a).ok_or(LayoutError::NodeNotFound(a))?;
    let column_b = tree.column_of(b).ok_or(LayoutError::NodeNotFound(b))?;
    tree.swap_windows(a, b)?;

    if column_a == column_b {
        return Ok(());
    }

    let size_a = tree.window(a).map(|w| w.size);
    let size_b = tree.window(b).map(|w| w.size);
    if let (Some(size_a), Some(size_b)) = (size_a, size_b) {
        if let Some(data) = tree.window_mut(a) {
            data.size = size_b;
        }
        if let Some(data) = tree.window_mut(b) {
            data.size = size_a;
        }
    }

    let width_a = tree.container(column_a).map(|c| (c.width, c.preset_index));
    let width_b = tree.container(column_b).map(|c| (c.width, c.preset_index));
    if let (Some((width_a, preset_a)), Some((width_b, preset_b))) = (width_a, width_b) {
        if let Some(data) = tree.container_mut(column_a) {
            data.width = width_b;
            data.preset_index = preset_b;
            data.cached_span = None;
        }
        if let Some(data) = tree.container_mut(column_b) {
            data.width = width_a;
            data.preset_index = preset_a;
            data.cached_span = None;
        }
    }
    Ok(())
}

/// Limits applied while resizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeLimits {
    /// Largest column span: the monitor extent minus the gap.
    pub max_span: f64,
    pub min_weight: f64,
    pub max_weight: f64,
}

/// A window or column being resized by dragging its edges.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveResize {
    pub window: NodeId,
    pub handle: WindowHandle,
    pub column: NodeId,
    pub edges: ResizeEdges,
    pub start_pointer: Point,
    pub original_width: ColumnWidth,
    pub original_preset: Option<usize>,
    pub original_full_width: Option<ColumnWidth>,
    pub original_span: f64,
    pub original_size: WeightedSize,
    /// Pointer travel that changes the window weight by one unit.
    pub pixels_per_weight: f64,
    /// Largest minimum span along the scroll axis among the column's windows.
    pub min_span: f64,
}

impl InteractiveResize {
    /// Capture the starting state. `original_span` is the column's current
    /// span and `secondary_available` the column's usable length across the
    /// scroll axis.
    pub fn new(
        tree: &LayoutTree,
        handle: WindowHandle,
        edges: ResizeEdges,
        pointer: Point,
        original_span: f64,
        secondary_available: f64,
        orientation: Orientation,
    ) -> Result<Self, LayoutError> {
        let window = tree
            .node_for_handle(handle)
            .ok_or(LayoutError::WindowNotFound(handle))?;
        let data = tree
            .window(window)
            .ok_or(LayoutError::WrongNodeKind(window, "window"))?;
        if !data.is_resizable() {
            return Err(LayoutError::NotResizable(handle));
        }
        let column = tree
            .column_of(window)
            .ok_or(LayoutError::NodeNotFound(window))?;
        let container = tree
            .container(column)
            .ok_or(LayoutError::WrongNodeKind(column, "container"))?;

        let siblings: Vec<_> = tree
            .children(column)
            .iter()
            .filter_map(|&child| tree.window(child))
            .collect();
        let min_span = siblings
            .iter()
            .map(|w| w.constraints.primary(orientation).0)
            .fold(0.0, f64::max);

        // Pixels per weight unit from the last solve; fall back to an even
        // split of the available length.
        let total_weight: f64 = siblings.iter().filter_map(|w| w.size.weight()).sum();
        let resolved: f64 = siblings
            .iter()
            .filter(|w| w.size.weight().is_some())
            .filter_map(|w| w.resolved_span)
            .sum();
        let pixels_per_weight = if total_weight <= 0.0 {
            secondary_available.max(1.0)
        } else if resolved > 0.0 {
            resolved / total_weight
        } else {
            secondary_available.max(1.0) / total_weight
        };

        Ok(Self {
            window,
            handle,
            column,
            edges,
            start_pointer: pointer,
            original_width: container.width,
            original_preset: container.preset_index,
            original_full_width: container.width_before_full,
            original_span,
            original_size: data.size,
            pixels_per_weight: pixels_per_weight.max(f64::EPSILON),
            min_span,
        })
    }

    fn original_weight(&self) -> f64 {
        match self.original_size {
            WeightedSize::Auto { weight } => weight,
            WeightedSize::Fixed(size) => size / self.pixels_per_weight,
        }
    }

    /// Apply the pointer position. Returns whether anything changed.
    pub fn update(
        &self,
        tree: &mut LayoutTree,
        pointer: Point,
        limits: ResizeLimits,
        orientation: Orientation,
    ) -> bool {
        let dx = pointer.x - self.start_pointer.x;
        let dy = pointer.y - self.start_pointer.y;
        let delta = Point::new(dx, dy);
        let mut changed = false;

        if let Some(sign) = self.edges.primary_sign(orientation) {
            let span = (self.original_span + sign * orientation.primary(delta))
                .min(limits.max_span)
                .max(self.min_span)
                .max(1.0);
            if let Some(data) = tree.container_mut(self.column) {
                data.width = ColumnWidth::Fixed(span);
                data.preset_index = None;
                data.width_before_full = None;
                data.width_animation = None;
                data.cached_span = None;
                changed = true;
            }
        }

        if let Some(sign) = self.edges.secondary_sign(orientation) {
            let weight_delta = sign * orientation.secondary(delta) / self.pixels_per_weight;
            let weight = (self.original_weight() + weight_delta)
                .min(limits.max_weight)
                .max(limits.min_weight);
            if let Some(data) = tree.window_mut(self.window) {
                data.size = WeightedSize::Auto { weight };
                changed = true;
            }
        }

        changed
    }

    /// Put back the captured width and size.
    pub fn restore(&self, tree: &mut LayoutTree) {
        if let Some(data) = tree.container_mut(self.column) {
            data.width = self.original_width;
            data.preset_index = self.original_preset;
            data.width_before_full = self.original_full_width;
            data.cached_span = None;
        }
        if let Some(data) = tree.window_mut(self.window) {
            data.size = self.original_size;
        }
    }
}

/// The single active interactive session.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Move(InteractiveMove),
    Resize(InteractiveResize),
}

impl Interaction {
    pub fn handle(&self) -> WindowHandle {
        match self {
            Interaction::Move(mv) => mv.handle,
            Interaction::Resize(resize) => resize.handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ColumnFrame;
    use crate::geometry::Size;
    use crate::tree::WindowSizeConstraints;

    const WS: WorkspaceId = WorkspaceId(1);

    fn tree_with(columns: &[&[u64]]) -> LayoutTree {
        let mut tree = LayoutTree::new();
        tree.ensure_workspace(WS, ColumnWidth::Fixed(400.0));
        for (i, column) in columns.iter().enumerate() {
            let first = tree
                .insert_window_as_column(WS, i, WindowHandle(column[0]), ColumnWidth::Fixed(400.0))
                .unwrap();
            let container = tree.column_of(first).unwrap();
            for (j, &handle) in column.iter().enumerate().skip(1) {
                tree.insert_window_in_column(container, j, WindowHandle(handle))
                    .unwrap();
            }
        }
        tree
    }

    fn handles_of(tree: &LayoutTree, column: usize) -> Vec<u64> {
        let column = tree.column_at(WS, column).unwrap();
        tree.children(column)
            .iter()
            .map(|&id| tree.window(id).unwrap().handle.0)
            .collect()
    }

    fn node(tree: &LayoutTree, handle: u64) -> NodeId {
        tree.node_for_handle(WindowHandle(handle)).unwrap()
    }

    fn two_column_composition() -> Composition {
        let mut out = Composition::default();
        out.frames.insert(WindowHandle(1), Rect::new(10.0, 10.0, 400.0, 580.0));
        out.frames.insert(WindowHandle(2), Rect::new(420.0, 10.0, 400.0, 580.0));
        out.stacking = vec![WindowHandle(1), WindowHandle(2)];
        for (index, x) in [(0, 10.0), (1, 420.0)] {
            out.columns.push(ColumnFrame {
                workspace: WS,
                index,
                rect: Rect::new(x, 10.0, 400.0, 580.0),
                visible: true,
            });
        }
        out
    }

    #[test]
    fn test_resize_edges_signs() {
        let edges = ResizeEdges::RIGHT | ResizeEdges::TOP;
        assert_eq!(edges.primary_sign(Orientation::Horizontal), Some(1.0));
        assert_eq!(edges.secondary_sign(Orientation::Horizontal), Some(-1.0));
        assert_eq!(ResizeEdges::LEFT.secondary_sign(Orientation::Horizontal), None);
        assert_eq!(ResizeEdges::LEFT.secondary_sign(Orientation::Vertical), Some(-1.0));
    }

    #[test]
    fn test_move_requires_threshold() {
        let tree = tree_with(&[&[1], &[2]]);
        let composition = two_column_composition();
        let mut mv = InteractiveMove::new(
            &tree,
            WindowHandle(1),
            Rect::new(10.0, 10.0, 400.0, 580.0),
            Point::new(100.0, 100.0),
        )
        .unwrap();

        let hover = mv.update(Point::new(103.0, 100.0), 8.0, Some(&composition), &tree, Orientation::Horizontal);
        assert_eq!(hover, None);
        assert!(!mv.started);

        let hover = mv.update(Point::new(600.0, 300.0), 8.0, Some(&composition), &tree, Orientation::Horizontal);
        assert_eq!(
            hover,
            Some(HoverTarget::Window {
                target: WindowHandle(2),
                intent: InsertIntent::Swap
            })
        );
        assert_eq!(mv.frame().x, 510.0);
    }

    #[test]
    fn test_hit_test_zones() {
        let tree = tree_with(&[&[1], &[2]]);
        let composition = two_column_composition();
        let hit = |x, y| {
            hit_test(&composition, &tree, WS, WindowHandle(1), Point::new(x, y), Orientation::Horizontal)
        };
        assert_eq!(
            hit(600.0, 20.0),
            Some(HoverTarget::Window { target: WindowHandle(2), intent: InsertIntent::Before })
        );
        assert_eq!(
            hit(600.0, 580.0),
            Some(HoverTarget::Window { target: WindowHandle(2), intent: InsertIntent::After })
        );
        assert_eq!(hit(415.0, 300.0), Some(HoverTarget::ColumnGap { insert_index: 1 }));
        assert_eq!(hit(5.0, 300.0), Some(HoverTarget::WorkspaceEdge { side: HiddenSide::Left }));
        assert_eq!(hit(900.0, 300.0), Some(HoverTarget::WorkspaceEdge { side: HiddenSide::Right }));
        // The dragged window itself is ignored.
        assert_eq!(hit(200.0, 300.0), None);
    }

    #[test]
    fn test_hit_test_prefers_topmost_window() {
        let tree = tree_with(&[&[1], &[2], &[3]]);
        let mut composition = two_column_composition();
        // Window 3 is sliding over window 2.
        composition.frames.insert(WindowHandle(3), Rect::new(500.0, 10.0, 400.0, 580.0));
        composition.stacking.push(WindowHandle(3));
        let hit = hit_test(
            &composition,
            &tree,
            WS,
            WindowHandle(1),
            Point::new(600.0, 300.0),
            Orientation::Horizontal,
        );
        assert_eq!(
            hit,
            Some(HoverTarget::Window { target: WindowHandle(3), intent: InsertIntent::Swap })
        );

        composition.stacking = vec![WindowHandle(3), WindowHandle(1), WindowHandle(2)];
        let hit = hit_test(
            &composition,
            &tree,
            WS,
            WindowHandle(1),
            Point::new(600.0, 300.0),
            Orientation::Horizontal,
        );
        assert_eq!(
            hit,
            Some(HoverTarget::Window { target: WindowHandle(2), intent: InsertIntent::Swap })
        );
    }

    #[test]
    fn test_move_rejects_fullscreen() {
        let mut tree = tree_with(&[&[1]]);
        let id = node(&tree, 1);
        tree.window_mut(id).unwrap().sizing = SizingMode::Fullscreen;
        let result = InteractiveMove::new(&tree, WindowHandle(1), Rect::default(), Point::default());
        assert_eq!(result.unwrap_err(), LayoutError::Fullscreen(WindowHandle(1)));
    }

    #[test]
    fn test_insert_after_moves_and_resets_weight() {
        let mut tree = tree_with(&[&[1, 2], &[3]]);
        let a = node(&tree, 1);
        tree.window_mut(a).unwrap().size = WeightedSize::Auto { weight: 2.5 };

        let target = HoverTarget::Window {
            target: WindowHandle(3),
            intent: InsertIntent::After,
        };
        assert!(commit_move(&mut tree, a, target, 0, ColumnWidth::Fixed(400.0)).unwrap());

        assert_eq!(handles_of(&tree, 0), vec![2]);
        assert_eq!(handles_of(&tree, 1), vec![3, 1]);
        assert_eq!(tree.window(a).unwrap().size, WeightedSize::Auto { weight: 1.0 });
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_respects_column_limit() {
        let mut tree = tree_with(&[&[1], &[2, 3]]);
        let a = node(&tree, 1);
        let target = HoverTarget::Window {
            target: WindowHandle(2),
            intent: InsertIntent::Before,
        };
        assert!(!commit_move(&mut tree, a, target, 2, ColumnWidth::Fixed(400.0)).unwrap());
        assert_eq!(handles_of(&tree, 0), vec![1]);
    }

    #[test]
    fn test_swap_across_columns_trades_sizes() {
        let mut tree = tree_with(&[&[1], &[2, 3]]);
        let c0 = tree.column_at(WS, 0).unwrap();
        tree.container_mut(c0).unwrap().width = ColumnWidth::Fixed(700.0);
        let a = node(&tree, 1);
        let b = node(&tree, 3);
        tree.window_mut(b).unwrap().size = WeightedSize::Auto { weight: 3.0 };

        let target = HoverTarget::Window {
            target: WindowHandle(3),
            intent: InsertIntent::Swap,
        };
        assert!(commit_move(&mut tree, a, target, 0, ColumnWidth::Fixed(400.0)).unwrap());

        assert_eq!(handles_of(&tree, 0), vec![3]);
        assert_eq!(handles_of(&tree, 1), vec![2, 1]);
        assert_eq!(tree.window(a).unwrap().size, WeightedSize::Auto { weight: 3.0 });
        let c1 = tree.column_at(WS, 1).unwrap();
        assert_eq!(tree.container(c0).unwrap().width, ColumnWidth::Fixed(400.0));
        assert_eq!(tree.container(c1).unwrap().width, ColumnWidth::Fixed(700.0));
    }

    #[test]
    fn test_drop_in_gap_creates_column() {
        let mut tree = tree_with(&[&[1, 2], &[3]]);
        let a = node(&tree, 2);
        let target = HoverTarget::ColumnGap { insert_index: 2 };
        assert!(commit_move(&mut tree, a, target, 0, ColumnWidth::Fixed(500.0)).unwrap());
        assert_eq!(tree.column_count(WS), 3);
        assert_eq!(handles_of(&tree, 2), vec![2]);
        let column = tree.column_at(WS, 2).unwrap();
        assert_eq!(tree.container(column).unwrap().width, ColumnWidth::Fixed(500.0));
    }

    #[test]
    fn test_whole_column_moves_to_edge_with_width() {
        let mut tree = tree_with(&[&[1], &[2], &[3]]);
        let c0 = tree.column_at(WS, 0).unwrap();
        tree.container_mut(c0).unwrap().width = ColumnWidth::Fixed(650.0);
        let a = node(&tree, 1);
        let target = HoverTarget::WorkspaceEdge {
            side: HiddenSide::Right,
        };
        assert!(commit_move(&mut tree, a, target, 0, ColumnWidth::Fixed(400.0)).unwrap());
        assert_eq!(tree.column_count(WS), 3);
        assert_eq!(handles_of(&tree, 2), vec![1]);
        let last = tree.column_at(WS, 2).unwrap();
        assert_eq!(tree.container(last).unwrap().width, ColumnWidth::Fixed(650.0));
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_resize_clamps_width() {
        let mut tree = tree_with(&[&[1]]);
        let id = node(&tree, 1);
        tree.window_mut(id).unwrap().constraints =
            WindowSizeConstraints::new(Size::new(300.0, 0.0), Size::ZERO);
        let resize = InteractiveResize::new(
            &tree,
            WindowHandle(1),
            ResizeEdges::RIGHT,
            Point::new(410.0, 300.0),
            400.0,
            580.0,
            Orientation::Horizontal,
        )
        .unwrap();
        let limits = ResizeLimits {
            max_span: 990.0,
            min_weight: 0.1,
            max_weight: 10.0,
        };
        let column = tree.column_at(WS, 0).unwrap();

        resize.update(&mut tree, Point::new(2000.0, 300.0), limits, Orientation::Horizontal);
        assert_eq!(tree.container(column).unwrap().width, ColumnWidth::Fixed(990.0));

        resize.update(&mut tree, Point::new(0.0, 300.0), limits, Orientation::Horizontal);
        assert_eq!(tree.container(column).unwrap().width, ColumnWidth::Fixed(300.0));

        resize.restore(&mut tree);
        assert_eq!(tree.container(column).unwrap().width, ColumnWidth::Fixed(400.0));
    }

    #[test]
    fn test_resize_weight_uses_pixels_per_weight() {
        let mut tree = tree_with(&[&[1, 2]]);
        for handle in [1, 2] {
            let id = node(&tree, handle);
            tree.window_mut(id).unwrap().resolved_span = Some(285.0);
        }
        let resize = InteractiveResize::new(
            &tree,
            WindowHandle(1),
            ResizeEdges::BOTTOM,
            Point::new(200.0, 295.0),
            400.0,
            580.0,
            Orientation::Horizontal,
        )
        .unwrap();
        assert_eq!(resize.pixels_per_weight, 285.0);

        let limits = ResizeLimits {
            max_span: 990.0,
            min_weight: 0.1,
            max_weight: 10.0,
        };
        resize.update(&mut tree, Point::new(200.0, 580.0), limits, Orientation::Horizontal);
        let a = node(&tree, 1);
        assert_eq!(tree.window(a).unwrap().size, WeightedSize::Auto { weight: 2.0 });

        resize.update(&mut tree, Point::new(200.0, -5000.0), limits, Orientation::Horizontal);
        assert_eq!(tree.window(a).unwrap().size, WeightedSize::Auto { weight: 0.1 });
    }

    #[test]
    fn test_resize_rejects_fixed_window() {
        let mut tree = tree_with(&[&[1]]);
        let id = node(&tree, 1);
        tree.window_mut(id).unwrap().constraints =
            WindowSizeConstraints::fixed(Size::new(400.0, 300.0));
        let result = InteractiveResize::new(
            &tree,
            WindowHandle(1),
            ResizeEdges::RIGHT,
            Point::default(),
            400.0,
            580.0,
            Orientation::Horizontal,
        );
        assert_eq!(result.unwrap_err(), LayoutError::NotResizable(WindowHandle(1)));
    }
}
