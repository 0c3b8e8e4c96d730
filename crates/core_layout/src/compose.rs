//! Composition of workspaces into window rectangles.
//!
//! The composer turns the tree, the viewport and the monitor geometry into
//! concrete frames at a point in time. It never changes tree topology; it
//! only refreshes the cached spans stored on containers and windows and
//! starts move animations for windows whose position was invalidated.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::animation::{Spring, SpringConfig};
use crate::config::LayoutConfig;
use crate::geometry::{Orientation, Point, Rect};
use crate::monitor::MonitorGeometry;
use crate::solver::{self, AxisItem};
use crate::tree::{
    ColumnWidth, DisplayMode, LayoutTree, MoveAnimation, NodeId, SizingMode, WeightedSize,
    WindowData,
};
use crate::viewport::{Strip, ViewportState};
use crate::{WindowHandle, WorkspaceId};

/// Movements below this many points are not animated.
const MOVE_EPSILON: f64 = 0.5;

/// Side of the viewport a hidden window is scrolled out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl HiddenSide {
    pub fn leading(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => HiddenSide::Left,
            Orientation::Vertical => HiddenSide::Top,
        }
    }

    pub fn trailing(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => HiddenSide::Right,
            Orientation::Vertical => HiddenSide::Bottom,
        }
    }

    pub fn is_leading(self) -> bool {
        matches!(self, HiddenSide::Left | HiddenSide::Top)
    }
}

/// Frame of a column as laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnFrame {
    pub workspace: WorkspaceId,
    pub index: usize,
    pub rect: Rect,
    pub visible: bool,
}

/// Output of one composition pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Rectangles of windows inside the viewport, rounded to physical pixels.
    pub frames: BTreeMap<WindowHandle, Rect>,
    /// Windows scrolled out of the viewport.
    pub hidden: BTreeMap<WindowHandle, HiddenSide>,
    /// Off-viewport rectangles of hidden windows, just past the nearest edge.
    pub parking: BTreeMap<WindowHandle, Rect>,
    /// Opacity of windows that are fading in.
    pub alphas: BTreeMap<WindowHandle, f64>,
    /// Background tabs of tabbed columns. They share the active tab's frame.
    pub inactive_tabs: BTreeSet<WindowHandle>,
    /// Windows whose size sits on one of their constraint bounds.
    pub constrained: BTreeSet<WindowHandle>,
    /// Column frames, for hit testing.
    pub columns: Vec<ColumnFrame>,
    /// Windows with a frame, bottom to top. Fullscreen and maximized windows
    /// sit above tiled ones and a dragged window above everything.
    pub stacking: Vec<WindowHandle>,
}

impl Composition {
    /// Framed windows from the topmost down.
    pub fn topmost_first(&self) -> impl Iterator<Item = (WindowHandle, &Rect)> + '_ {
        self.stacking
            .iter()
            .rev()
            .filter_map(|&handle| self.frames.get(&handle).map(|rect| (handle, rect)))
    }

    /// Column under `point` on the scroll axis.
    pub fn column_at(&self, workspace: WorkspaceId, point: Point) -> Option<&ColumnFrame> {
        self.columns
            .iter()
            .find(|column| column.workspace == workspace && column.rect.contains(point))
    }
}

/// Everything the composer reads besides the tree and the viewport.
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    pub layout: &'a LayoutConfig,
    pub geometry: &'a MonitorGeometry,
    pub at: Duration,
    /// Spring for windows whose position changed; `None` snaps.
    pub movement: Option<SpringConfig>,
    /// Horizontal displacement of the whole workspace (workspace switch).
    pub shift: f64,
    /// A window being dragged and where to draw it.
    pub dragged: Option<(WindowHandle, Rect)>,
}

/// Usable length of the working area along the scroll axis.
pub fn usable_extent(layout: &LayoutConfig, geometry: &MonitorGeometry) -> f64 {
    let extent = geometry.orientation().primary_extent(&geometry.working_area);
    (extent - 2.0 * layout.outer_gap).max(1.0)
}

/// Span of a column width on a monitor, before child constraints.
pub fn width_to_span(width: ColumnWidth, layout: &LayoutConfig, geometry: &MonitorGeometry) -> f64 {
    let usable = usable_extent(layout, geometry);
    match width {
        ColumnWidth::Proportion(p) => p * (usable + layout.gap) - layout.gap,
        ColumnWidth::Fixed(px) => px,
    }
}

/// Resolve the span of a column along the scroll axis.
///
/// Columns holding a fullscreen or maximized window take the full usable
/// extent. Otherwise the configured width is clamped into the range allowed
/// by the children. Returns `(span, was_constrained)`.
pub fn column_span(
    tree: &LayoutTree,
    column: NodeId,
    layout: &LayoutConfig,
    geometry: &MonitorGeometry,
) -> (f64, bool) {
    let Some(data) = tree.container(column) else {
        return (1.0, false);
    };
    let orientation = geometry.orientation();
    let usable = usable_extent(layout, geometry);

    let windows: Vec<&WindowData> = tree
        .children(column)
        .iter()
        .filter_map(|&child| tree.window(child))
        .collect();

    if windows.iter().any(|w| w.sizing != SizingMode::Normal) {
        return (usable, false);
    }

    let mut span = width_to_span(data.width, layout, geometry);
    if layout.max_visible_columns > 0 {
        let narrowest = (usable + layout.gap) / layout.max_visible_columns as f64 - layout.gap;
        span = span.max(narrowest);
    }

    let min = windows
        .iter()
        .map(|w| w.constraints.primary(orientation).0)
        .fold(0.0, f64::max);
    let max = windows
        .iter()
        .map(|w| w.constraints.primary(orientation).1)
        .filter(|max| *max > 0.0)
        .fold(f64::INFINITY, f64::min);
    let max = if max.is_finite() { max } else { 0.0 };

    let item = AxisItem::default().with_bounds(min, max).with_fixed(span);
    solver::solve(&[item], span.max(1.0), 0.0)
        .first()
        .map_or((span.max(1.0), false), |r| (r.size, r.was_constrained))
}

/// Cached span of a column, resolving it when the cache is empty.
pub fn target_span(
    tree: &LayoutTree,
    column: NodeId,
    layout: &LayoutConfig,
    geometry: &MonitorGeometry,
) -> f64 {
    match tree.container(column).and_then(|data| data.cached_span) {
        Some(span) => span,
        None => column_span(tree, column, layout, geometry).0,
    }
}

/// Span of a column as drawn at `at`, following a running width animation.
pub fn visible_span(
    tree: &LayoutTree,
    column: NodeId,
    layout: &LayoutConfig,
    geometry: &MonitorGeometry,
    at: Duration,
) -> f64 {
    match tree.container(column).and_then(|data| data.width_animation.as_ref()) {
        Some(spring) => spring.value(at).max(1.0),
        None => target_span(tree, column, layout, geometry),
    }
}

/// Strip of a workspace using the settled column spans.
pub fn target_strip(
    tree: &LayoutTree,
    workspace: WorkspaceId,
    layout: &LayoutConfig,
    geometry: &MonitorGeometry,
) -> Strip {
    let spans = tree
        .columns(workspace)
        .iter()
        .map(|&column| target_span(tree, column, layout, geometry))
        .collect();
    Strip::new(
        spans,
        layout.gap,
        layout.outer_gap,
        geometry.orientation().primary_extent(&geometry.working_area),
    )
}

fn axis_item(window: &WindowData, orientation: Orientation) -> AxisItem {
    let (min, max) = window.constraints.secondary(orientation);
    let item = match window.size {
        WeightedSize::Auto { weight } => AxisItem::weighted(weight),
        WeightedSize::Fixed(size) => AxisItem::default().with_fixed(size),
    }
    .with_bounds(min, max);
    if window.constraints.is_fixed {
        item.with_fixed(min)
    } else {
        item
    }
}

/// Position and length of each window of a column across the scroll axis.
struct WindowSlot {
    id: NodeId,
    start: f64,
    len: f64,
    was_constrained: bool,
}

fn layout_column(
    tree: &LayoutTree,
    column: NodeId,
    layout: &LayoutConfig,
    orientation: Orientation,
    start: f64,
    available: f64,
) -> Vec<WindowSlot> {
    let children = tree.children(column);
    let items: Vec<AxisItem> = children
        .iter()
        .filter_map(|&child| tree.window(child))
        .map(|window| axis_item(window, orientation))
        .collect();

    let tabbed = tree
        .container(column)
        .is_some_and(|data| data.display == DisplayMode::Tabbed);

    if tabbed {
        let indicator = layout.tab_indicator_size;
        let results = solver::solve_tabbed(&items, (available - indicator).max(1.0), None);
        return children
            .iter()
            .zip(results)
            .map(|(&id, result)| WindowSlot {
                id,
                start: start + indicator,
                len: result.size,
                was_constrained: result.was_constrained,
            })
            .collect();
    }

    let results = solver::solve(&items, available, layout.gap);
    let mut pos = start;
    children
        .iter()
        .zip(results)
        .map(|(&id, result)| {
            let slot = WindowSlot {
                id,
                start: pos,
                len: result.size,
                was_constrained: result.was_constrained,
            };
            pos += result.size + layout.gap;
            slot
        })
        .collect()
}

/// Compose one workspace into `out`.
///
/// `pending_moves` holds the previous on-screen origin of windows whose
/// position was invalidated; each consumed entry starts a move animation.
pub fn compose_workspace(
    tree: &mut LayoutTree,
    workspace: WorkspaceId,
    viewport: &ViewportState,
    ctx: &ComposeContext<'_>,
    pending_moves: &mut HashMap<WindowHandle, Point>,
    out: &mut Composition,
) {
    let layout = ctx.layout;
    let geometry = ctx.geometry;
    let orientation = geometry.orientation();
    let area = geometry.working_area;
    let at = ctx.at;

    let columns = tree.columns(workspace).to_vec();

    for &column in &columns {
        let cached = tree.container(column).and_then(|data| data.cached_span);
        if cached.is_none() {
            let (span, constrained) = column_span(tree, column, layout, geometry);
            if let Some(data) = tree.container_mut(column) {
                data.cached_span = Some(span);
                data.span_constrained = constrained;
            }
        }
    }

    let spans: Vec<f64> = columns
        .iter()
        .map(|&column| visible_span(tree, column, layout, geometry, at))
        .collect();
    let extent = orientation.primary_extent(&area);
    let strip = Strip::new(spans, layout.gap, layout.outer_gap, extent);
    let offset = viewport.current_offset(at);

    let primary_origin = orientation.primary_origin(&area);
    // Parked windows sit past both the working area and the monitor frame.
    let screen_start = primary_origin.min(orientation.primary_origin(&geometry.frame));
    let screen_end = (primary_origin + extent).max(
        orientation.primary_origin(&geometry.frame) + orientation.primary_extent(&geometry.frame),
    );
    let secondary_start = orientation.secondary_origin(&area) + layout.outer_gap;
    let secondary_available = (orientation.secondary_extent(&area) - 2.0 * layout.outer_gap).max(1.0);

    let mut raised = Vec::new();
    let mut dragged_on_top = None;

    for (index, &column) in columns.iter().enumerate() {
        let span = strip.span(index);
        let start = primary_origin + strip.position(index) + offset;
        let visible = strip.is_visible(index, offset);
        let hidden_side = if visible {
            None
        } else if start + span <= primary_origin {
            Some(HiddenSide::leading(orientation))
        } else {
            Some(HiddenSide::trailing(orientation))
        };

        let column_rect = orientation
            .rect(start, secondary_start, span, secondary_available)
            .translated(ctx.shift, 0.0);
        out.columns.push(ColumnFrame {
            workspace,
            index,
            rect: column_rect,
            visible,
        });

        let active_child = tree.container(column).map_or(0, |data| data.active_child);
        let tabbed = tree
            .container(column)
            .is_some_and(|data| data.display == DisplayMode::Tabbed);
        let slots = layout_column(
            tree,
            column,
            layout,
            orientation,
            secondary_start,
            secondary_available,
        );

        for (child_index, slot) in slots.into_iter().enumerate() {
            let Some(window) = tree.window_mut(slot.id) else {
                continue;
            };
            window.resolved_span = Some(slot.len);
            window.was_constrained = slot.was_constrained;
            let handle = window.handle;

            let laid_out = orientation.rect(start, slot.start, span, slot.len);
            let base = match window.sizing {
                SizingMode::Fullscreen => geometry.frame,
                SizingMode::Maximized => area,
                SizingMode::Normal => laid_out,
            };
            let rect = base.translated(ctx.shift, 0.0);

            if let Some(alpha) = &window.alpha_animation {
                out.alphas.insert(handle, alpha.value(at).clamp(0.0, 1.0));
            }
            if slot.was_constrained {
                out.constrained.insert(handle);
            }

            if let Some(side) = hidden_side {
                pending_moves.remove(&handle);
                let len = orientation.primary_extent(&base);
                let park_at = if side.is_leading() {
                    screen_start - len
                } else {
                    screen_end
                };
                let parked = orientation.shift(&rect, park_at - orientation.primary_origin(&base));
                out.hidden.insert(handle, side);
                out.parking.insert(handle, parked.round_to_physical(geometry.scale));
                continue;
            }

            if let Some(previous) = pending_moves.remove(&handle) {
                let dx = previous.x - rect.x;
                let dy = previous.y - rect.y;
                window.move_animation = match ctx.movement {
                    Some(config) if dx.abs() > MOVE_EPSILON || dy.abs() > MOVE_EPSILON => {
                        trace!(%handle, dx, dy, "window move animated");
                        Some(MoveAnimation {
                            dx: Spring::new(dx, 0.0, 0.0, at, config),
                            dy: Spring::new(dy, 0.0, 0.0, at, config),
                        })
                    }
                    _ => None,
                };
            }

            let mut rect = rect;
            if let Some(anim) = &window.move_animation {
                rect = rect.translated(anim.dx.value(at), anim.dy.value(at));
            }
            match ctx.dragged {
                Some((dragged, frame)) if dragged == handle => {
                    rect = frame;
                    dragged_on_top = Some(handle);
                }
                _ if window.sizing != SizingMode::Normal => raised.push(handle),
                _ => out.stacking.push(handle),
            }

            if tabbed && child_index != active_child {
                out.inactive_tabs.insert(handle);
            }
            out.frames.insert(handle, rect.round_to_physical(geometry.scale));
        }
    }

    out.stacking.extend(raised);
    out.stacking.extend(dragged_on_top);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::tree::WindowSizeConstraints;

    const WS: WorkspaceId = WorkspaceId(1);

    fn geometry() -> MonitorGeometry {
        MonitorGeometry {
            working_area: Rect::new(0.0, 0.0, 1000.0, 600.0),
            frame: Rect::new(0.0, 0.0, 1000.0, 640.0),
            scale: 1.0,
            orientation: Some(Orientation::Horizontal),
        }
    }

    fn layout() -> LayoutConfig {
        LayoutConfig {
            gap: 10.0,
            outer_gap: 10.0,
            default_column_width: ColumnWidth::Fixed(400.0),
            ..Default::default()
        }
    }

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

    fn compose(tree: &mut LayoutTree, viewport: &ViewportState) -> Composition {
        let layout = layout();
        let geometry = geometry();
        let ctx = ComposeContext {
            layout: &layout,
            geometry: &geometry,
            at: Duration::ZERO,
            movement: None,
            shift: 0.0,
            dragged: None,
        };
        let mut out = Composition::default();
        compose_workspace(tree, WS, viewport, &ctx, &mut HashMap::new(), &mut out);
        out
    }

    #[test]
    fn test_proportional_width_span() {
        let layout = layout();
        let geometry = geometry();
        // usable = 980; half of (980 + 10) - 10
        assert_eq!(
            width_to_span(ColumnWidth::Proportion(0.5), &layout, &geometry),
            485.0
        );
        assert_eq!(
            width_to_span(ColumnWidth::Proportion(1.0), &layout, &geometry),
            980.0
        );
    }

    #[test]
    fn test_columns_laid_out_left_to_right() {
        let mut tree = tree_with(&[&[1], &[2]]);
        let out = compose(&mut tree, &ViewportState::new());
        assert_eq!(out.frames[&WindowHandle(1)], Rect::new(10.0, 10.0, 400.0, 580.0));
        assert_eq!(out.frames[&WindowHandle(2)], Rect::new(420.0, 10.0, 400.0, 580.0));
        assert!(out.hidden.is_empty());
    }

    #[test]
    fn test_stacked_windows_share_height() {
        let mut tree = tree_with(&[&[1, 2, 3]]);
        let out = compose(&mut tree, &ViewportState::new());
        // (580 - 20) / 3 = 186.67, floored
        assert_eq!(out.frames[&WindowHandle(1)].height, 186.0);
        assert_eq!(out.frames[&WindowHandle(2)].y, 206.0);
        let node = tree.node_for_handle(WindowHandle(3)).unwrap();
        assert_eq!(tree.window(node).unwrap().resolved_span, Some(186.0));
    }

    #[test]
    fn test_offscreen_columns_are_hidden_and_parked() {
        let mut tree = tree_with(&[&[1], &[2], &[3], &[4]]);
        let mut viewport = ViewportState::new();
        viewport.animate_to(-830.0, Duration::ZERO, None);
        let out = compose(&mut tree, &viewport);

        assert_eq!(out.hidden.get(&WindowHandle(1)), Some(&HiddenSide::Left));
        assert_eq!(out.parking[&WindowHandle(1)].x, -400.0);
        assert!(out.frames.contains_key(&WindowHandle(3)));
        assert!(!out.frames.contains_key(&WindowHandle(1)));

        let mut viewport = ViewportState::new();
        viewport.animate_to(0.0, Duration::ZERO, None);
        let out = compose(&mut tree, &viewport);
        assert!(out.frames.contains_key(&WindowHandle(3)));
        assert_eq!(out.hidden.get(&WindowHandle(4)), Some(&HiddenSide::Right));
        assert_eq!(out.parking[&WindowHandle(4)].x, 1000.0);
    }

    fn assert_parked_outside(out: &Composition, frame: Rect) {
        for (handle, side) in &out.hidden {
            let parked = out.parking[handle];
            match side {
                HiddenSide::Left => assert!(parked.right() <= frame.x, "{handle} at {parked:?}"),
                HiddenSide::Right => assert!(parked.x >= frame.right(), "{handle} at {parked:?}"),
                HiddenSide::Top => assert!(parked.bottom() <= frame.y, "{handle} at {parked:?}"),
                HiddenSide::Bottom => assert!(parked.y >= frame.bottom(), "{handle} at {parked:?}"),
            }
        }
    }

    #[test]
    fn test_hidden_special_windows_park_off_screen() {
        let mut tree = tree_with(&[&[1], &[2], &[3], &[4]]);
        let first = tree.node_for_handle(WindowHandle(1)).unwrap();
        tree.window_mut(first).unwrap().sizing = SizingMode::Maximized;
        let last = tree.node_for_handle(WindowHandle(4)).unwrap();
        tree.window_mut(last).unwrap().sizing = SizingMode::Fullscreen;

        let out = compose(&mut tree, &ViewportState::new());
        assert_eq!(out.hidden.get(&WindowHandle(4)), Some(&HiddenSide::Right));
        assert_eq!(out.parking[&WindowHandle(4)].x, 1000.0);
        assert_eq!(out.parking[&WindowHandle(4)].width, 1000.0);
        assert_parked_outside(&out, geometry().frame);

        let mut viewport = ViewportState::new();
        viewport.animate_to(-3000.0, Duration::ZERO, None);
        let out = compose(&mut tree, &viewport);
        assert_eq!(out.hidden.get(&WindowHandle(1)), Some(&HiddenSide::Left));
        assert_eq!(out.parking[&WindowHandle(1)].right(), 0.0);
        assert_parked_outside(&out, geometry().frame);
    }

    #[test]
    fn test_special_windows_stack_above_tiled() {
        let mut tree = tree_with(&[&[1], &[2], &[3]]);
        let node = tree.node_for_handle(WindowHandle(1)).unwrap();
        tree.window_mut(node).unwrap().sizing = SizingMode::Maximized;
        let out = compose(&mut tree, &ViewportState::new());
        assert_eq!(out.stacking.last(), Some(&WindowHandle(1)));
        let top = out.topmost_first().next().map(|(handle, _)| handle);
        assert_eq!(top, Some(WindowHandle(1)));
    }

    #[test]
    fn test_tabbed_column_overlaps_tabs() {
        let mut tree = tree_with(&[&[1, 2]]);
        let column = tree.column_at(WS, 0).unwrap();
        tree.container_mut(column).unwrap().display = DisplayMode::Tabbed;
        let out = compose(&mut tree, &ViewportState::new());
        assert_eq!(out.frames[&WindowHandle(1)], out.frames[&WindowHandle(2)]);
        assert_eq!(out.frames[&WindowHandle(1)].y, 16.0);
        assert!(out.inactive_tabs.contains(&WindowHandle(2)));
        assert!(!out.inactive_tabs.contains(&WindowHandle(1)));
    }

    #[test]
    fn test_fullscreen_window_gets_screen_frame() {
        let mut tree = tree_with(&[&[1], &[2]]);
        let node = tree.node_for_handle(WindowHandle(2)).unwrap();
        tree.window_mut(node).unwrap().sizing = SizingMode::Fullscreen;
        let out = compose(&mut tree, &ViewportState::new());
        assert_eq!(out.frames[&WindowHandle(2)], geometry().frame);
    }

    #[test]
    fn test_min_width_widens_column() {
        let mut tree = tree_with(&[&[1]]);
        let node = tree.node_for_handle(WindowHandle(1)).unwrap();
        tree.window_mut(node).unwrap().constraints =
            WindowSizeConstraints::new(Size::new(550.0, 0.0), Size::ZERO);
        let column = tree.column_at(WS, 0).unwrap();
        let (span, constrained) = column_span(&tree, column, &layout(), &geometry());
        assert_eq!(span, 550.0);
        assert!(constrained);
    }

    #[test]
    fn test_max_visible_columns_widens_narrow_columns() {
        let tree = tree_with(&[&[1]]);
        let column = tree.column_at(WS, 0).unwrap();
        let layout = LayoutConfig {
            max_visible_columns: 2,
            ..layout()
        };
        let (span, _) = column_span(&tree, column, &layout, &geometry());
        assert_eq!(span, 485.0);
    }

    #[test]
    fn test_pending_move_starts_animation() {
        let mut tree = tree_with(&[&[1]]);
        let layout = layout();
        let geometry = geometry();
        let ctx = ComposeContext {
            layout: &layout,
            geometry: &geometry,
            at: Duration::ZERO,
            movement: Some(SpringConfig::default()),
            shift: 0.0,
            dragged: None,
        };
        let mut pending = HashMap::new();
        pending.insert(WindowHandle(1), Point::new(300.0, 10.0));
        let mut out = Composition::default();
        compose_workspace(&mut tree, WS, &ViewportState::new(), &ctx, &mut pending, &mut out);

        assert!(pending.is_empty());
        // Drawn at the previous position when the animation starts.
        assert_eq!(out.frames[&WindowHandle(1)].x, 300.0);
        let node = tree.node_for_handle(WindowHandle(1)).unwrap();
        assert!(tree.window(node).unwrap().move_animation.is_some());
    }

    #[test]
    fn test_vertical_orientation_transposes() {
        let mut tree = tree_with(&[&[1], &[2]]);
        let layout = layout();
        let geometry = MonitorGeometry {
            orientation: Some(Orientation::Vertical),
            working_area: Rect::new(0.0, 0.0, 600.0, 1000.0),
            ..geometry()
        };
        let ctx = ComposeContext {
            layout: &layout,
            geometry: &geometry,
            at: Duration::ZERO,
            movement: None,
            shift: 0.0,
            dragged: None,
        };
        let mut out = Composition::default();
        compose_workspace(&mut tree, WS, &ViewportState::new(), &ctx, &mut HashMap::new(), &mut out);
        assert_eq!(out.frames[&WindowHandle(1)], Rect::new(10.0, 10.0, 580.0, 400.0));
        assert_eq!(out.frames[&WindowHandle(2)], Rect::new(10.0, 420.0, 580.0, 400.0));
    }
}
