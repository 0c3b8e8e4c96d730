//! The layout engine.
//!
//! `LayoutEngine` owns the tree, the monitors with their workspaces and
//! viewports, the single interactive session slot and the last composition
//! of each monitor. Every mutation is a method; failures are logged at debug
//! level and reported as `false` / `None`.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::animation::{Spring, SpringConfig};
use crate::compose::{self, ComposeContext, Composition};
use crate::config::{AnimationKind, Config};
use crate::geometry::{Point, Rect};
use crate::interactive::{
    self, HoverTarget, Interaction, InteractiveMove, InteractiveResize, ResizeEdges, ResizeLimits,
};
use crate::monitor::{Monitor, MonitorGeometry, MonitorId};
use crate::tree::{
    ColumnWidth, ContainerData, DisplayMode, LayoutTree, NodeId, NodeKind, SizingMode,
    SizingRestore, WeightedSize, WindowSizeConstraints,
};
use crate::viewport::{Strip, ViewportState};
use crate::{Direction, LayoutError, WindowHandle, WorkspaceId};

/// Outcome of [`LayoutEngine::sync_windows`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub added: Vec<WindowHandle>,
    pub removed: Vec<WindowHandle>,
    /// Windows taken over from another workspace.
    #[serde(default)]
    pub moved: Vec<WindowHandle>,
    pub selected: Option<WindowHandle>,
}

/// Scrollable tiling layout engine.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: Config,
    tree: LayoutTree,
    monitors: Vec<Monitor>,
    focused_monitor: Option<MonitorId>,
    interaction: Option<Interaction>,
    compositions: HashMap<MonitorId, Composition>,
    /// Last drawn origin of windows whose layout position was invalidated.
    pending_moves: HashMap<WindowHandle, Point>,
}

impl LayoutEngine {
    /// Create an engine. Out-of-range config values are replaced and logged.
    pub fn new(mut config: Config) -> Self {
        log_config_warnings(&mut config);
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration. Cached spans are recomputed on next use.
    pub fn set_config(&mut self, mut config: Config) {
        log_config_warnings(&mut config);
        self.config = config;
        let workspaces: Vec<_> = self.tree.workspaces().collect();
        for workspace in workspaces {
            self.invalidate_workspace(workspace);
        }
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn monitor(&self, id: MonitorId) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.id == id)
    }

    pub fn viewport(&self, workspace: WorkspaceId) -> Option<&ViewportState> {
        self.monitors.iter().find_map(|m| m.viewport(workspace))
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    pub fn last_composition(&self, monitor: MonitorId) -> Option<&Composition> {
        self.compositions.get(&monitor)
    }

    /// Last composed frame of a window on any monitor.
    pub fn window_frame(&self, handle: WindowHandle) -> Option<Rect> {
        self.compositions
            .values()
            .find_map(|composition| composition.frames.get(&handle).copied())
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn spring(&self, kind: AnimationKind) -> Option<SpringConfig> {
        self.config.animations.spring(kind)
    }

    fn with_default_orientation(&self, mut geometry: MonitorGeometry) -> MonitorGeometry {
        geometry.orientation.get_or_insert(self.config.layout.orientation);
        geometry
    }

    fn monitor_of(&self, workspace: WorkspaceId) -> Option<&Monitor> {
        self.monitors.iter().find(|m| m.contains(workspace))
    }

    fn geometry_of(&self, workspace: WorkspaceId) -> MonitorGeometry {
        self.monitor_of(workspace)
            .map(|m| m.geometry)
            .unwrap_or_else(|| self.with_default_orientation(MonitorGeometry::default()))
    }

    fn viewport_mut(&mut self, workspace: WorkspaceId) -> Option<&mut ViewportState> {
        self.monitors
            .iter_mut()
            .find_map(|m| m.viewport_mut(workspace))
    }

    fn strip(&self, workspace: WorkspaceId) -> Strip {
        let geometry = self.geometry_of(workspace);
        compose::target_strip(&self.tree, workspace, &self.config.layout, &geometry)
    }

    fn invalidate_workspace(&mut self, workspace: WorkspaceId) {
        for column in self.tree.columns(workspace).to_vec() {
            if let Some(data) = self.tree.container_mut(column) {
                data.cached_span = None;
            }
        }
    }

    fn invalidate_column_of(&mut self, window: NodeId) {
        if let Some(column) = self.tree.column_of(window) {
            if let Some(data) = self.tree.container_mut(column) {
                data.cached_span = None;
            }
        }
    }

    /// Scroll the viewport of `workspace` so `column` is visible.
    fn reveal(&mut self, workspace: WorkspaceId, column: usize, from: Option<usize>, now: Duration) {
        let strip = self.strip(workspace);
        let policy = self.config.layout.centering;
        let spring = self.spring(AnimationKind::ViewOffset);
        if let Some(viewport) = self.viewport_mut(workspace) {
            viewport.ensure_container_visible(&strip, column, policy, from, now, spring);
        }
    }

    /// Shift the view so `column`, which sat at `old_index` in `before`, stays
    /// where it was drawn after columns around it were added or removed.
    fn keep_column_in_place(
        &mut self,
        workspace: WorkspaceId,
        column: NodeId,
        old_index: usize,
        before: &Strip,
    ) {
        let Some(new_index) = self.tree.columns(workspace).iter().position(|&c| c == column) else {
            return;
        };
        let after = self.strip(workspace);
        let delta = before.position(old_index) - after.position(new_index);
        if let Some(viewport) = self.viewport_mut(workspace) {
            viewport.active_column = new_index;
            if delta != 0.0 {
                viewport.offset.offset_by(delta);
            }
        }
    }

    /// Make `node` the selection of its workspace and scroll to it.
    fn select_node(
        &mut self,
        workspace: WorkspaceId,
        node: NodeId,
        from: Option<usize>,
        now: Duration,
    ) -> Option<WindowHandle> {
        let (column, index) = self.tree.position(node)?;
        let handle = self.tree.window(node)?.handle;
        if let Some(container) = self
            .tree
            .column_at(workspace, column)
            .and_then(|id| self.tree.container_mut(id))
        {
            container.active_child = index;
        }
        if let Some(viewport) = self.viewport_mut(workspace) {
            viewport.active_column = column;
            viewport.selected = Some(node);
        }
        self.reveal(workspace, column, from, now);
        Some(handle)
    }

    /// Selected window of a workspace, replacing a stale selection with the
    /// first window of the first column.
    fn selected_node(&mut self, workspace: WorkspaceId) -> Option<NodeId> {
        let current = self.viewport(workspace)?.selected;
        if let Some(node) = current {
            if self.tree.window(node).is_some() && self.tree.workspace_of(node) == Some(workspace) {
                return Some(node);
            }
        }

        let fallback = self.tree.first_window(workspace);
        if current.is_some() {
            debug!(%workspace, "stale selection replaced");
        }
        let position = fallback.and_then(|node| self.tree.position(node));
        if let Some(viewport) = self.viewport_mut(workspace) {
            viewport.selected = fallback;
            if let Some((column, _)) = position {
                viewport.active_column = column;
            }
        }
        fallback
    }

    /// Active child of the column at `index`.
    fn column_selection(&self, workspace: WorkspaceId, index: usize) -> Option<NodeId> {
        let column = self.tree.column_at(workspace, index)?;
        let active = self.tree.container(column)?.active_child;
        let children = self.tree.children(column);
        children
            .get(active)
            .or_else(|| children.last())
            .copied()
    }

    /// Remember where the windows of `workspace` were last drawn so the next
    /// composition animates them to their new place.
    fn record_positions(&mut self, workspace: WorkspaceId) {
        if self.spring(AnimationKind::WindowMovement).is_none() {
            return;
        }
        let Some(monitor) = self.monitor_of(workspace).map(|m| m.id) else {
            return;
        };
        let Some(composition) = self.compositions.get(&monitor) else {
            return;
        };
        for node in self.tree.windows_in(workspace) {
            if let Some(data) = self.tree.window(node) {
                if let Some(rect) = composition.frames.get(&data.handle) {
                    self.pending_moves
                        .insert(data.handle, Point::new(rect.x, rect.y));
                }
            }
        }
    }

    /// Visible span and its velocity, captured before a width change.
    fn width_snapshot(&self, workspace: WorkspaceId, column: NodeId, now: Duration) -> (f64, f64) {
        let geometry = self.geometry_of(workspace);
        let visible = compose::visible_span(&self.tree, column, &self.config.layout, &geometry, now);
        let velocity = self
            .tree
            .container(column)
            .and_then(|data| data.width_animation.as_ref())
            .map_or(0.0, |spring| spring.velocity(now));
        (visible, velocity)
    }

    /// Re-resolve a column span after its width changed and animate towards it.
    fn finish_width_change(
        &mut self,
        workspace: WorkspaceId,
        column: NodeId,
        (from, velocity): (f64, f64),
        now: Duration,
    ) {
        let geometry = self.geometry_of(workspace);
        let (span, constrained) =
            compose::column_span(&self.tree, column, &self.config.layout, &geometry);
        let spring = self.spring(AnimationKind::ColumnWidth);
        if let Some(data) = self.tree.container_mut(column) {
            data.cached_span = Some(span);
            data.span_constrained = constrained;
            data.width_animation = match spring {
                Some(config) if (from - span).abs() > 0.5 => {
                    Some(Spring::new(from, span, velocity, now, config))
                }
                _ => None,
            };
        }
    }

    /// Change the width of the selected column of the focused workspace.
    fn change_selected_width(
        &mut self,
        now: Duration,
        change: impl FnOnce(&mut ContainerData, f64),
    ) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            debug!("no focused workspace");
            return false;
        };
        let Some(node) = self.selected_node(workspace) else {
            debug!(%workspace, "no selected window");
            return false;
        };
        let Some(column) = self.tree.column_of(node) else {
            return false;
        };
        let geometry = self.geometry_of(workspace);
        let current = compose::target_span(&self.tree, column, &self.config.layout, &geometry);
        let snapshot = self.width_snapshot(workspace, column, now);
        let Some(data) = self.tree.container_mut(column) else {
            return false;
        };
        change(data, current);
        data.cached_span = None;
        self.finish_width_change(workspace, column, snapshot, now);

        if let Some((index, _)) = self.tree.position(node) {
            self.reveal(workspace, index, None, now);
        }
        true
    }

    // ------------------------------------------------------------------
    // Monitors and workspaces
    // ------------------------------------------------------------------

    pub fn add_monitor(&mut self, id: MonitorId, geometry: MonitorGeometry) -> bool {
        if self.monitor(id).is_some() {
            debug!(monitor = %id, "monitor already known");
            return false;
        }
        let geometry = self.with_default_orientation(geometry);
        self.monitors.push(Monitor::new(id, geometry));
        if self.focused_monitor.is_none() {
            self.focused_monitor = Some(id);
        }
        info!(monitor = %id, "monitor added");
        true
    }

    /// Update the geometry of a monitor. Viewports jump to keep their active
    /// column visible.
    pub fn set_monitor_geometry(&mut self, id: MonitorId, geometry: MonitorGeometry) -> bool {
        let geometry = self.with_default_orientation(geometry);
        let Some(monitor) = self.monitors.iter_mut().find(|m| m.id == id) else {
            debug!(monitor = %id, "unknown monitor");
            return false;
        };
        monitor.geometry = geometry;
        let workspaces = monitor.workspaces().to_vec();

        let policy = self.config.layout.centering;
        for workspace in workspaces {
            self.invalidate_workspace(workspace);
            let strip = self.strip(workspace);
            if let Some(viewport) = self.viewport_mut(workspace) {
                let column = viewport.active_column;
                viewport.ensure_container_visible(&strip, column, policy, None, Duration::ZERO, None);
            }
        }
        true
    }

    pub fn focus_monitor(&mut self, id: MonitorId) -> bool {
        if self.monitor(id).is_none() {
            debug!(monitor = %id, "unknown monitor");
            return false;
        }
        self.focused_monitor = Some(id);
        true
    }

    pub fn focused_monitor(&self) -> Option<MonitorId> {
        self.focused_monitor
    }

    /// Active workspace of the focused monitor.
    pub fn focused_workspace(&self) -> Option<WorkspaceId> {
        let id = self.focused_monitor?;
        self.monitor(id)?.active_workspace()
    }

    pub fn active_workspace(&self, monitor: MonitorId) -> Option<WorkspaceId> {
        self.monitor(monitor)?.active_workspace()
    }

    /// Create a workspace on `monitor`. Its root and placeholder column are
    /// created immediately.
    pub fn add_workspace(&mut self, monitor: MonitorId, workspace: WorkspaceId) -> bool {
        if self.monitor_of(workspace).is_some() {
            debug!(%workspace, "workspace already placed");
            return false;
        }
        let width = self.config.layout.default_column_width;
        let Some(target) = self.monitors.iter_mut().find(|m| m.id == monitor) else {
            debug!(%monitor, "unknown monitor");
            return false;
        };
        target.add_workspace(workspace);
        self.tree.ensure_workspace(workspace, width);
        info!(%workspace, %monitor, "workspace added");
        true
    }

    /// Destroy a workspace. Returns the windows that were still in it.
    pub fn remove_workspace(&mut self, workspace: WorkspaceId) -> Vec<WindowHandle> {
        let interaction_here = self.interaction.as_ref().is_some_and(|interaction| {
            self.tree
                .node_for_handle(interaction.handle())
                .and_then(|node| self.tree.workspace_of(node))
                == Some(workspace)
        });
        if interaction_here {
            self.cancel_interactive();
        }

        let orphaned = self.tree.remove_workspace(workspace);
        for handle in &orphaned {
            self.pending_moves.remove(handle);
        }
        for monitor in &mut self.monitors {
            monitor.remove_workspace(workspace);
        }
        info!(%workspace, windows = orphaned.len(), "workspace removed");
        orphaned
    }

    /// Switch `monitor` to its workspace at `index`.
    pub fn activate_workspace(&mut self, monitor: MonitorId, index: usize, now: Duration) -> bool {
        let spring = self.spring(AnimationKind::WorkspaceSwitch);
        match self.monitors.iter_mut().find(|m| m.id == monitor) {
            Some(target) => target.activate(index, now, spring),
            None => {
                debug!(%monitor, "unknown monitor");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Windows
    // ------------------------------------------------------------------

    /// Bring the windows of `workspace` in line with `windows`
    /// (`(handle, is_new)` pairs, in order).
    pub fn sync_windows(
        &mut self,
        workspace: WorkspaceId,
        windows: &[(WindowHandle, bool)],
        now: Duration,
    ) -> SyncResult {
        let mut result = SyncResult::default();
        if self.tree.root(workspace).is_none() {
            debug!(%workspace, "sync for unknown workspace");
            return result;
        }

        let wanted: HashSet<WindowHandle> = windows.iter().map(|(handle, _)| *handle).collect();
        let current: Vec<WindowHandle> = self
            .tree
            .windows_in(workspace)
            .into_iter()
            .filter_map(|node| self.tree.window(node).map(|data| data.handle))
            .collect();

        for handle in current {
            if !wanted.contains(&handle) {
                self.remove_window(handle, now);
                result.removed.push(handle);
            }
        }

        for &(handle, is_new) in windows {
            if let Some(node) = self.tree.node_for_handle(handle) {
                if self.tree.workspace_of(node) != Some(workspace) {
                    self.take_window(workspace, handle, node, now, &mut result);
                }
                continue;
            }
            if self.add_window(workspace, handle, is_new, now).is_some() {
                result.added.push(handle);
            }
        }

        result.selected = self.selected_window(workspace);
        result
    }

    /// Move a window reported by `workspace` out of the workspace that holds
    /// it. Constraints travel with the window.
    fn take_window(
        &mut self,
        workspace: WorkspaceId,
        handle: WindowHandle,
        node: NodeId,
        now: Duration,
        result: &mut SyncResult,
    ) {
        if self.viewport(workspace).is_none() {
            debug!(%workspace, %handle, "workspace is not on a monitor");
            return;
        }
        let constraints = self.tree.window(node).map(|data| data.constraints);
        let from = self.tree.workspace_of(node);
        self.remove_window(handle, now);
        if self.add_window(workspace, handle, false, now).is_some() {
            if let Some(constraints) = constraints {
                self.set_constraints(handle, constraints);
            }
            debug!(%handle, ?from, to = %workspace, "window moved between workspaces");
            result.moved.push(handle);
        }
    }

    /// Add a window as a new column after the active one and select it.
    pub fn add_window(
        &mut self,
        workspace: WorkspaceId,
        handle: WindowHandle,
        is_new: bool,
        now: Duration,
    ) -> Option<NodeId> {
        if self.viewport(workspace).is_none() {
            debug!(%workspace, %handle, "workspace is not on a monitor");
            return None;
        }
        let from = self.viewport(workspace).map(|vp| vp.active_column);
        let index = if self.tree.is_empty_workspace(workspace) {
            0
        } else {
            from.map_or(0, |active| active + 1)
        };

        self.record_positions(workspace);
        let width = self.config.layout.default_column_width;
        let node = match self
            .tree
            .insert_window_as_column(workspace, index, handle, width)
        {
            Ok(node) => node,
            Err(err) => {
                debug!(%workspace, %handle, %err, "cannot add window");
                return None;
            }
        };

        if is_new {
            if let Some(config) = self.spring(AnimationKind::WindowOpen) {
                if let Some(data) = self.tree.window_mut(node) {
                    data.alpha_animation = Some(Spring::new(0.0, 1.0, 0.0, now, config));
                }
            }
        }

        debug!(%workspace, %handle, index, "window added");
        self.select_node(workspace, node, from, now);
        Some(node)
    }

    /// Remove a window. Returns the window selected afterwards, if any.
    pub fn remove_window(&mut self, handle: WindowHandle, now: Duration) -> Option<WindowHandle> {
        let Some(node) = self.tree.node_for_handle(handle) else {
            debug!(%handle, "remove of unknown window");
            return None;
        };
        let workspace = self.tree.workspace_of(node)?;

        if self
            .interaction
            .as_ref()
            .is_some_and(|interaction| interaction.handle() == handle)
        {
            self.cancel_interactive();
        }

        let was_selected = self.selected_node(workspace) == Some(node);
        let strip = self.strip(workspace);
        self.record_positions(workspace);

        let detached = match self.tree.remove_window(handle) {
            Ok(detached) => detached,
            Err(err) => {
                debug!(%handle, %err, "cannot remove window");
                return None;
            }
        };
        self.pending_moves.remove(&handle);
        debug!(%workspace, %handle, column = detached.column_index, "window removed");

        let count = self.tree.column_count(workspace);
        let shift = strip.span(detached.column_index) + strip.gap();
        if let Some(viewport) = self.viewport_mut(workspace) {
            if detached.column_removed && detached.column_index < viewport.active_column {
                viewport.active_column -= 1;
                viewport.offset.offset_by(shift);
            }
            viewport.active_column = viewport.active_column.min(count.saturating_sub(1));
        }

        if self.tree.is_empty_workspace(workspace) {
            if let Some(viewport) = self.viewport_mut(workspace) {
                viewport.selected = None;
                viewport.active_column = 0;
                viewport.offset_before_fullscreen = None;
            }
            self.reveal(workspace, 0, None, now);
            return None;
        }

        if was_selected {
            let fallback = if detached.column_removed {
                let active = self.viewport(workspace).map_or(0, |vp| vp.active_column);
                self.column_selection(workspace, active)
            } else {
                self.column_selection(workspace, detached.column_index)
            };
            if let Some(fallback) = fallback {
                return self.select_node(workspace, fallback, None, now);
            }
        }

        let active = self.viewport(workspace).map_or(0, |vp| vp.active_column);
        self.reveal(workspace, active, None, now);
        self.selected_window(workspace)
    }

    /// Replace the size constraints of a window.
    pub fn set_constraints(&mut self, handle: WindowHandle, constraints: WindowSizeConstraints) -> bool {
        let Some(node) = self.tree.node_for_handle(handle) else {
            debug!(%handle, "constraints for unknown window");
            return false;
        };
        if let Some(data) = self.tree.window_mut(node) {
            data.constraints = constraints;
        }
        self.invalidate_column_of(node);
        true
    }

    /// Select a window by handle and scroll to it.
    pub fn select_window(&mut self, handle: WindowHandle, now: Duration) -> bool {
        let Some(node) = self.tree.node_for_handle(handle) else {
            debug!(%handle, "select of unknown window");
            return false;
        };
        let Some(workspace) = self.tree.workspace_of(node) else {
            return false;
        };
        let from = self.viewport(workspace).map(|vp| vp.active_column);
        self.select_node(workspace, node, from, now).is_some()
    }

    /// Selected window of a workspace.
    pub fn selected_window(&mut self, workspace: WorkspaceId) -> Option<WindowHandle> {
        let node = self.selected_node(workspace)?;
        self.tree.window(node).map(|data| data.handle)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Move the selection. Returns the newly selected window.
    pub fn focus(&mut self, direction: Direction, now: Duration) -> Option<WindowHandle> {
        let workspace = self.focused_workspace()?;
        let node = self.selected_node(workspace)?;
        let (column, index) = self.tree.position(node)?;
        let orientation = self.geometry_of(workspace).orientation();
        let (along, step) = direction.resolve(orientation);

        let target = if along {
            let count = self.tree.column_count(workspace);
            let Some(target) = step_index(column, step, count, self.config.layout.infinite_loop)
            else {
                debug!(?direction, "no column in that direction");
                return None;
            };
            self.column_selection(workspace, target)?
        } else {
            let column_id = self.tree.column_of(node)?;
            let count = self.tree.children(column_id).len();
            let Some(target) = step_index(index, step, count, false) else {
                debug!(?direction, "no window in that direction");
                return None;
            };
            *self.tree.children(column_id).get(target)?
        };

        self.select_node(workspace, target, Some(column), now)
    }

    /// Move the selected window in `direction`.
    ///
    /// Along the strip the window joins the neighbouring column, or leaves its
    /// column to form a new one when the neighbour is missing or full. Across
    /// the strip it swaps places with its neighbour in the column.
    pub fn move_window(&mut self, direction: Direction, now: Duration) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let Some(node) = self.selected_node(workspace) else {
            debug!(%workspace, "no selected window");
            return false;
        };
        let Some((column, index)) = self.tree.position(node) else {
            return false;
        };
        let Some(column_id) = self.tree.column_of(node) else {
            return false;
        };
        let orientation = self.geometry_of(workspace).orientation();
        let (along, step) = direction.resolve(orientation);
        let column_len = self.tree.children(column_id).len();

        let result: Result<(), LayoutError> = if along {
            let count = self.tree.column_count(workspace);
            let limit = self.config.layout.max_windows_per_column;
            let neighbour = step_index(column, step, count, false)
                .and_then(|target| self.tree.column_at(workspace, target))
                .filter(|&target| limit == 0 || self.tree.children(target).len() < limit);

            match neighbour {
                Some(target) => {
                    self.record_positions(workspace);
                    self.tree.detach_window(node).and_then(|_| {
                        self.tree.attach_window(node, target, usize::MAX)?;
                        if let Some(data) = self.tree.window_mut(node) {
                            data.size = WeightedSize::default();
                        }
                        Ok(())
                    })
                }
                None if column_len > 1 => {
                    self.record_positions(workspace);
                    let width = self.config.layout.default_column_width;
                    let insert_at = if step < 0 { column } else { column + 1 };
                    self.tree.detach_window(node).and_then(|_| {
                        self.tree
                            .attach_window_as_column(node, workspace, insert_at, width)
                            .map(|_| ())
                    })
                }
                None => {
                    debug!(?direction, "window cannot move further");
                    return false;
                }
            }
        } else {
            let Some(target) = step_index(index, step, column_len, false) else {
                debug!(?direction, "window is already at the end of its column");
                return false;
            };
            self.record_positions(workspace);
            self.tree.reorder_window(node, target)
        };

        if let Err(err) = result {
            debug!(%err, "move window failed");
            return false;
        }
        self.select_node(workspace, node, Some(column), now);
        true
    }

    /// Swap the selected column with its neighbour.
    pub fn move_column(&mut self, direction: Direction, now: Duration) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let Some(node) = self.selected_node(workspace) else {
            return false;
        };
        let Some((column, _)) = self.tree.position(node) else {
            return false;
        };
        let orientation = self.geometry_of(workspace).orientation();
        let (along, step) = direction.resolve(orientation);
        if !along {
            debug!(?direction, "columns only move along the strip");
            return false;
        }
        let count = self.tree.column_count(workspace);
        let Some(target) = step_index(column, step, count, false) else {
            debug!(?direction, "column is already at the end");
            return false;
        };

        self.record_positions(workspace);
        if let Err(err) = self.tree.swap_columns(workspace, column, target) {
            debug!(%err, "move column failed");
            return false;
        }
        self.select_node(workspace, node, Some(column), now);
        true
    }

    // ------------------------------------------------------------------
    // Sizing
    // ------------------------------------------------------------------

    pub fn toggle_fullscreen(&mut self, handle: WindowHandle, now: Duration) -> bool {
        self.toggle_sizing(handle, SizingMode::Fullscreen, now)
    }

    pub fn toggle_maximized(&mut self, handle: WindowHandle, now: Duration) -> bool {
        self.toggle_sizing(handle, SizingMode::Maximized, now)
    }

    fn toggle_sizing(&mut self, handle: WindowHandle, mode: SizingMode, now: Duration) -> bool {
        let Some(node) = self.tree.node_for_handle(handle) else {
            debug!(%handle, "sizing toggle for unknown window");
            return false;
        };
        let (Some(workspace), Some(column)) = (self.tree.workspace_of(node), self.tree.column_of(node))
        else {
            return false;
        };
        if self
            .interaction
            .as_ref()
            .is_some_and(|interaction| interaction.handle() == handle)
        {
            self.cancel_interactive();
        }

        let others_special = self.tree.windows_in(workspace).into_iter().any(|other| {
            other != node
                && self
                    .tree
                    .window(other)
                    .is_some_and(|data| data.sizing != SizingMode::Normal)
        });
        let snapshot = self.width_snapshot(workspace, column, now);

        let Some(data) = self.tree.window_mut(node) else {
            return false;
        };
        let leaving = data.sizing == mode;
        if leaving {
            let restore = data.restore.take().unwrap_or(SizingRestore {
                sizing: SizingMode::Normal,
                size: data.size,
            });
            data.sizing = restore.sizing;
            data.size = restore.size;
            if restore.sizing != SizingMode::Normal {
                data.restore = Some(SizingRestore {
                    sizing: SizingMode::Normal,
                    size: restore.size,
                });
            }
        } else {
            data.restore = Some(SizingRestore {
                sizing: data.sizing,
                size: data.size,
            });
            data.sizing = mode;
        }
        let now_special = data.sizing != SizingMode::Normal;
        debug!(%handle, ?mode, leaving, "sizing mode toggled");

        if let Some(container) = self.tree.container_mut(column) {
            container.cached_span = None;
        }
        self.finish_width_change(workspace, column, snapshot, now);

        if !leaving && !others_special {
            if let Some(viewport) = self.viewport_mut(workspace) {
                viewport.save_for_fullscreen();
            }
        }

        if leaving && !now_special && !others_special {
            let spring = self.spring(AnimationKind::ViewOffset);
            let restored = self
                .viewport_mut(workspace)
                .is_some_and(|viewport| viewport.restore_after_fullscreen(now, spring));
            if let Some((index, window_index)) = self.tree.position(node) {
                if let Some(container) = self.tree.container_mut(column) {
                    container.active_child = window_index;
                }
                if let Some(viewport) = self.viewport_mut(workspace) {
                    viewport.active_column = index;
                    viewport.selected = Some(node);
                }
                if !restored {
                    self.reveal(workspace, index, None, now);
                }
            }
            return true;
        }

        let from = self.viewport(workspace).map(|vp| vp.active_column);
        self.select_node(workspace, node, from, now);
        true
    }

    /// Toggle the tabbed display of column `column` of the focused workspace.
    pub fn toggle_tabbed(&mut self, column: usize, now: Duration) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let Some(column_id) = self.tree.column_at(workspace, column) else {
            let max = self.tree.column_count(workspace).saturating_sub(1);
            debug!(err = %LayoutError::ColumnOutOfBounds(column, max), "toggle tabbed");
            return false;
        };
        if self.tree.children(column_id).is_empty() {
            debug!("placeholder column cannot be tabbed");
            return false;
        }
        self.record_positions(workspace);
        if let Some(data) = self.tree.container_mut(column_id) {
            data.display = match data.display {
                DisplayMode::Normal => DisplayMode::Tabbed,
                DisplayMode::Tabbed => DisplayMode::Normal,
            };
            debug!(column, display = ?data.display, "column display toggled");
        }
        self.reveal(workspace, column, None, now);
        true
    }

    /// Step the selected column through the configured preset widths.
    pub fn cycle_column_width(&mut self, now: Duration) -> bool {
        let presets = self.config.layout.preset_column_widths.clone();
        if presets.is_empty() {
            debug!("no preset column widths");
            return false;
        }
        let layout = self.config.layout.clone();
        let geometry = self
            .focused_workspace()
            .map(|ws| self.geometry_of(ws))
            .unwrap_or_default();

        self.change_selected_width(now, |data, current| {
            let next = match data.preset_index {
                Some(index) => (index + 1) % presets.len(),
                None => presets
                    .iter()
                    .position(|&width| {
                        compose::width_to_span(width, &layout, &geometry) > current + 1.0
                    })
                    .unwrap_or(0),
            };
            data.width = presets[next];
            data.preset_index = Some(next);
            data.width_before_full = None;
        })
    }

    pub fn set_column_width(&mut self, width: ColumnWidth, now: Duration) -> bool {
        self.change_selected_width(now, |data, _| {
            data.width = width;
            data.preset_index = None;
            data.width_before_full = None;
        })
    }

    /// Grow or shrink the selected column by `delta` points.
    pub fn resize_column(&mut self, delta: f64, now: Duration) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let geometry = self.geometry_of(workspace);
        let orientation = geometry.orientation();
        let max_span = orientation.primary_extent(&geometry.working_area) - self.config.layout.gap;
        let min_span = self
            .selected_node(workspace)
            .and_then(|node| self.tree.column_of(node))
            .map(|column| {
                self.tree
                    .children(column)
                    .iter()
                    .filter_map(|&child| self.tree.window(child))
                    .map(|w| w.constraints.primary(orientation).0)
                    .fold(0.0, f64::max)
            })
            .unwrap_or(0.0);

        self.change_selected_width(now, |data, current| {
            let span = (current + delta).min(max_span).max(min_span).max(1.0);
            data.width = ColumnWidth::Fixed(span);
            data.preset_index = None;
            data.width_before_full = None;
        })
    }

    /// Expand the selected column to the full usable width, or restore it.
    pub fn toggle_full_width(&mut self, now: Duration) -> bool {
        self.change_selected_width(now, |data, _| match data.width_before_full.take() {
            Some(previous) => data.width = previous,
            None => {
                data.width_before_full = Some(data.width);
                data.width = ColumnWidth::Proportion(1.0);
                data.preset_index = None;
            }
        })
    }

    /// Reset every column of the focused workspace to the default width and
    /// every window to a neutral weight.
    pub fn balance(&mut self, now: Duration) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let width = self.config.layout.default_column_width;
        let columns = self.tree.columns(workspace).to_vec();
        self.record_positions(workspace);

        for column in columns {
            let snapshot = self.width_snapshot(workspace, column, now);
            for window in self.tree.children(column).to_vec() {
                if let Some(data) = self.tree.window_mut(window) {
                    data.size = WeightedSize::default();
                }
            }
            if let Some(data) = self.tree.container_mut(column) {
                data.width = width;
                data.preset_index = None;
                data.width_before_full = None;
                data.cached_span = None;
            }
            self.finish_width_change(workspace, column, snapshot, now);
        }

        let active = self.viewport(workspace).map_or(0, |vp| vp.active_column);
        self.reveal(workspace, active, None, now);
        true
    }

    // ------------------------------------------------------------------
    // Scrolling and gestures
    // ------------------------------------------------------------------

    /// Scroll the focused workspace immediately by `delta` points.
    pub fn scroll_by(&mut self, delta: f64, now: Duration) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let strip = self.strip(workspace);
        let policy = self.config.layout.centering;
        match self.viewport_mut(workspace) {
            Some(viewport) if !viewport.offset.is_gesture() => {
                viewport.scroll_by(&strip, delta, policy, now);
                true
            }
            _ => {
                debug!("scroll ignored during gesture");
                false
            }
        }
    }

    pub fn begin_gesture(&mut self, now: Duration, is_touchpad: bool) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let history = self.config.gestures.history();
        let rate = self.config.gestures.deceleration_rate;
        match self.viewport_mut(workspace) {
            Some(viewport) => {
                viewport.begin_gesture(now, is_touchpad, history, rate);
                true
            }
            None => false,
        }
    }

    /// Feed a gesture delta. Returns the new selection when it changed.
    pub fn update_gesture(&mut self, delta: f64, timestamp: Duration) -> Option<WindowHandle> {
        let workspace = self.focused_workspace()?;
        let strip = self.strip(workspace);
        let policy = self.config.layout.centering;
        let column = self
            .viewport_mut(workspace)?
            .update_gesture(&strip, delta, timestamp, policy)?;
        self.select_column_quietly(workspace, column)
    }

    /// Release a gesture. Returns the window selected at the landing column.
    pub fn end_gesture(&mut self, now: Duration) -> Option<WindowHandle> {
        let workspace = self.focused_workspace()?;
        let strip = self.strip(workspace);
        let policy = self.config.layout.centering;
        let spring = self.spring(AnimationKind::ViewOffset);
        let column = self
            .viewport_mut(workspace)?
            .end_gesture(&strip, policy, now, spring)?;
        self.select_column_quietly(workspace, column)
    }

    pub fn cancel_gesture(&mut self, now: Duration) -> bool {
        let Some(workspace) = self.focused_workspace() else {
            return false;
        };
        let strip = self.strip(workspace);
        let policy = self.config.layout.centering;
        let spring = self.spring(AnimationKind::ViewOffset);
        match self.viewport_mut(workspace) {
            Some(viewport) if viewport.offset.is_gesture() => {
                viewport.cancel_gesture(&strip, policy, now, spring);
                true
            }
            _ => false,
        }
    }

    /// Select the active window of `column` without touching the offset.
    fn select_column_quietly(&mut self, workspace: WorkspaceId, column: usize) -> Option<WindowHandle> {
        let node = self.column_selection(workspace, column)?;
        let handle = self.tree.window(node)?.handle;
        if let Some(viewport) = self.viewport_mut(workspace) {
            viewport.selected = Some(node);
        }
        Some(handle)
    }

    // ------------------------------------------------------------------
    // Interactive move and resize
    // ------------------------------------------------------------------

    pub fn begin_interactive_move(&mut self, handle: WindowHandle, pointer: Point) -> bool {
        if self.interaction.is_some() {
            debug!(%handle, err = %LayoutError::InteractionActive, "cannot begin move");
            return false;
        }
        let origin = self.window_frame(handle).unwrap_or_default();
        match InteractiveMove::new(&self.tree, handle, origin, pointer) {
            Ok(mv) => {
                self.interaction = Some(Interaction::Move(mv));
                true
            }
            Err(err) => {
                debug!(%handle, %err, "cannot begin move");
                false
            }
        }
    }

    /// Track the pointer of an interactive move. Returns the hover target.
    pub fn update_interactive_move(&mut self, pointer: Point) -> Option<HoverTarget> {
        let workspace = match &self.interaction {
            Some(Interaction::Move(mv)) => mv.workspace,
            _ => return None,
        };
        let monitor = self.monitor_of(workspace).map(|m| m.id);
        let orientation = self.geometry_of(workspace).orientation();
        let composition = monitor.and_then(|id| self.compositions.get(&id));
        let threshold = self.config.gestures.move_threshold;

        let Some(Interaction::Move(mv)) = &mut self.interaction else {
            return None;
        };
        mv.update(pointer, threshold, composition, &self.tree, orientation)
    }

    /// Drop the dragged window on its hover target.
    pub fn end_interactive_move(&mut self, now: Duration) -> bool {
        let mv = match self.interaction.take() {
            Some(Interaction::Move(mv)) => mv,
            other => {
                self.interaction = other;
                return false;
            }
        };
        let (true, Some(target)) = (mv.started, mv.hover) else {
            debug!(handle = %mv.handle, "move released without a target");
            return false;
        };

        self.record_positions(mv.workspace);
        let strip = self.strip(mv.workspace);
        let active = self.viewport(mv.workspace).map_or(0, |vp| vp.active_column);
        let anchor = self.tree.column_at(mv.workspace, active);
        let limit = self.config.layout.max_windows_per_column;
        let width = self.config.layout.default_column_width;
        match interactive::commit_move(&mut self.tree, mv.window, target, limit, width) {
            Ok(true) => {
                debug!(handle = %mv.handle, ?target, "interactive move committed");
                if let Some(anchor) = anchor {
                    self.keep_column_in_place(mv.workspace, anchor, active, &strip);
                }
                self.select_node(mv.workspace, mv.window, Some(mv.origin_column), now);
                true
            }
            Ok(false) => false,
            Err(err) => {
                debug!(handle = %mv.handle, %err, "interactive move failed");
                false
            }
        }
    }

    pub fn begin_interactive_resize(
        &mut self,
        handle: WindowHandle,
        edges: ResizeEdges,
        pointer: Point,
    ) -> bool {
        if self.interaction.is_some() {
            debug!(%handle, err = %LayoutError::InteractionActive, "cannot begin resize");
            return false;
        }
        let Some(workspace) = self
            .tree
            .node_for_handle(handle)
            .and_then(|node| self.tree.workspace_of(node))
        else {
            debug!(%handle, "resize of unknown window");
            return false;
        };
        let geometry = self.geometry_of(workspace);
        let layout = &self.config.layout;
        let orientation = geometry.orientation();
        let span = self
            .tree
            .node_for_handle(handle)
            .and_then(|node| self.tree.column_of(node))
            .map_or(0.0, |column| compose::target_span(&self.tree, column, layout, &geometry));
        let secondary = orientation.secondary_extent(&geometry.working_area) - 2.0 * layout.outer_gap;

        match InteractiveResize::new(&self.tree, handle, edges, pointer, span, secondary, orientation) {
            Ok(resize) => {
                debug!(%handle, ?edges, "interactive resize started");
                self.interaction = Some(Interaction::Resize(resize));
                true
            }
            Err(err) => {
                debug!(%handle, %err, "cannot begin resize");
                false
            }
        }
    }

    pub fn update_interactive_resize(&mut self, pointer: Point) -> bool {
        let Some(Interaction::Resize(resize)) = &self.interaction else {
            return false;
        };
        let geometry = self
            .tree
            .workspace_of(resize.window)
            .map(|ws| self.geometry_of(ws))
            .unwrap_or_default();
        let orientation = geometry.orientation();
        let limits = ResizeLimits {
            max_span: orientation.primary_extent(&geometry.working_area) - self.config.layout.gap,
            min_weight: self.config.layout.min_weight,
            max_weight: self.config.layout.max_weight,
        };
        resize.update(&mut self.tree, pointer, limits, orientation)
    }

    /// Finish a resize and center the viewport on the resized window.
    pub fn end_interactive_resize(&mut self, now: Duration) -> bool {
        let resize = match self.interaction.take() {
            Some(Interaction::Resize(resize)) => resize,
            other => {
                self.interaction = other;
                return false;
            }
        };
        let Some(workspace) = self.tree.workspace_of(resize.window) else {
            return false;
        };
        let Some((column, index)) = self.tree.position(resize.window) else {
            return false;
        };
        if let Some(container) = self.tree.container_mut(resize.column) {
            container.active_child = index;
        }

        let strip = self.strip(workspace);
        let policy = self.config.layout.centering;
        let spring = self.spring(AnimationKind::ViewOffset);
        if let Some(viewport) = self.viewport_mut(workspace) {
            viewport.active_column = column;
            viewport.selected = Some(resize.window);
            let target = strip.clamp(strip.centered_offset(column), policy);
            viewport.animate_to(target, now, spring);
        }
        debug!(handle = %resize.handle, "interactive resize finished");
        true
    }

    /// Abandon the active move or resize. Returns whether one was active.
    pub fn cancel_interactive(&mut self) -> bool {
        match self.interaction.take() {
            Some(Interaction::Resize(resize)) => {
                resize.restore(&mut self.tree);
                debug!(handle = %resize.handle, "interactive resize cancelled");
                true
            }
            Some(Interaction::Move(mv)) => {
                debug!(handle = %mv.handle, "interactive move cancelled");
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Output and time
    // ------------------------------------------------------------------

    /// Compose the frames of `monitor` at `now`.
    pub fn compose(&mut self, monitor: MonitorId, now: Duration) -> Option<Composition> {
        let movement = self.spring(AnimationKind::WindowMovement);
        let reduced_motion = self.config.animations.reduced_motion;
        let dragged = match &self.interaction {
            Some(Interaction::Move(mv)) if mv.started => Some((mv.handle, mv.frame())),
            _ => None,
        };

        let Some(target) = self.monitors.iter().find(|m| m.id == monitor) else {
            debug!(%monitor, "compose for unknown monitor");
            return None;
        };

        let mut out = Composition::default();
        for (workspace, shift) in target.visible_workspaces(now, reduced_motion) {
            let Some(viewport) = target.viewport(workspace) else {
                continue;
            };
            let ctx = ComposeContext {
                layout: &self.config.layout,
                geometry: &target.geometry,
                at: now,
                movement,
                shift,
                dragged,
            };
            compose::compose_workspace(
                &mut self.tree,
                workspace,
                viewport,
                &ctx,
                &mut self.pending_moves,
                &mut out,
            );
        }

        self.compositions.insert(monitor, out.clone());
        Some(out)
    }

    /// Settle finished animations. Returns whether anything still animates.
    pub fn tick(&mut self, now: Duration) -> bool {
        let mut animating = false;

        for monitor in &mut self.monitors {
            animating |= monitor.tick(now);
            for viewport in monitor.viewports_mut() {
                animating |= viewport.tick(now);
            }
        }

        for (_, node) in self.tree.nodes_mut() {
            match &mut node.kind {
                NodeKind::Container(data) => {
                    if let Some(spring) = &data.width_animation {
                        if spring.is_complete(now) {
                            data.width_animation = None;
                        } else {
                            animating = true;
                        }
                    }
                }
                NodeKind::Window(data) => {
                    if let Some(anim) = &data.move_animation {
                        if anim.dx.is_complete(now) && anim.dy.is_complete(now) {
                            data.move_animation = None;
                        } else {
                            animating = true;
                        }
                    }
                    if let Some(alpha) = &data.alpha_animation {
                        if alpha.is_complete(now) {
                            data.alpha_animation = None;
                        } else {
                            animating = true;
                        }
                    }
                }
                NodeKind::Root(_) => {}
            }
        }

        animating
    }
}

fn log_config_warnings(config: &mut Config) {
    for w in config.validate() {
        warn!("Config: {} - {}", w.field, w.message);
    }
}

/// Step `index` by `step` within `0..count`, wrapping when `wrap` is set.
fn step_index(index: usize, step: isize, count: usize, wrap: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let target = index as isize + step;
    if (0..count as isize).contains(&target) {
        Some(target as usize)
    } else if wrap {
        Some(target.rem_euclid(count as isize) as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const MON: MonitorId = MonitorId(1);
    const WS: WorkspaceId = WorkspaceId(10);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn geometry() -> MonitorGeometry {
        let frame = Rect::new(0.0, 0.0, 1000.0, 600.0);
        MonitorGeometry {
            working_area: frame,
            frame,
            scale: 1.0,
            orientation: Default::default(),
        }
    }

    fn static_config() -> Config {
        let mut config = Config::default();
        config.animations.enabled = false;
        config.layout.default_column_width = ColumnWidth::Fixed(400.0);
        config
    }

    fn engine_with(config: Config, windows: &[u64]) -> LayoutEngine {
        let mut engine = LayoutEngine::new(config);
        assert!(engine.add_monitor(MON, geometry()));
        assert!(engine.add_workspace(MON, WS));
        for &handle in windows {
            engine.add_window(WS, WindowHandle(handle), false, ms(0)).unwrap();
        }
        engine
    }

    fn handles(engine: &LayoutEngine) -> Vec<Vec<u64>> {
        engine
            .tree()
            .columns(WS)
            .iter()
            .map(|&column| {
                engine
                    .tree()
                    .children(column)
                    .iter()
                    .map(|&id| engine.tree().window(id).unwrap().handle.0)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_step_index() {
        assert_eq!(step_index(0, -1, 3, false), None);
        assert_eq!(step_index(0, -1, 3, true), Some(2));
        assert_eq!(step_index(2, 1, 3, true), Some(0));
        assert_eq!(step_index(1, 1, 3, false), Some(2));
        assert_eq!(step_index(0, 1, 0, true), None);
    }

    #[test]
    fn test_add_window_inserts_after_active() {
        let mut engine = engine_with(static_config(), &[1, 2, 3]);
        assert_eq!(handles(&engine), vec![vec![1], vec![2], vec![3]]);
        assert!(engine.select_window(WindowHandle(1), ms(0)));
        engine.add_window(WS, WindowHandle(4), false, ms(0)).unwrap();
        assert_eq!(handles(&engine), vec![vec![1], vec![4], vec![2], vec![3]]);
        assert_eq!(engine.selected_window(WS), Some(WindowHandle(4)));
    }

    #[test]
    fn test_add_duplicate_window_fails() {
        let mut engine = engine_with(static_config(), &[1]);
        assert!(engine.add_window(WS, WindowHandle(1), false, ms(0)).is_none());
        assert!(engine.add_window(WorkspaceId(99), WindowHandle(2), false, ms(0)).is_none());
    }

    #[test]
    fn test_focus_moves_between_columns_and_scrolls() {
        let mut engine = engine_with(static_config(), &[1, 2, 3]);
        engine.select_window(WindowHandle(1), ms(0));
        assert_eq!(engine.viewport(WS).unwrap().current_offset(ms(0)), 0.0);

        assert_eq!(engine.focus(Direction::Right, ms(0)), Some(WindowHandle(2)));
        assert_eq!(engine.focus(Direction::Right, ms(0)), Some(WindowHandle(3)));
        // Column 2 spans 830..1230; its end aligns with 990.
        assert_eq!(engine.viewport(WS).unwrap().current_offset(ms(0)), -240.0);
        assert_eq!(engine.focus(Direction::Right, ms(0)), None);
    }

    #[test]
    fn test_focus_wraps_with_infinite_loop() {
        let mut config = static_config();
        config.layout.infinite_loop = true;
        let mut engine = engine_with(config, &[1, 2, 3]);
        assert_eq!(engine.focus(Direction::Right, ms(0)), Some(WindowHandle(1)));
        assert_eq!(engine.focus(Direction::Left, ms(0)), Some(WindowHandle(3)));
    }

    #[test]
    fn test_move_window_into_neighbour_and_back_out() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        assert_eq!(engine.selected_window(WS), Some(WindowHandle(2)));

        assert!(engine.move_window(Direction::Left, ms(0)));
        assert_eq!(handles(&engine), vec![vec![1, 2]]);

        assert!(engine.focus(Direction::Up, ms(0)).is_some());
        assert_eq!(engine.selected_window(WS), Some(WindowHandle(1)));
        assert!(engine.move_window(Direction::Down, ms(0)));
        assert_eq!(handles(&engine), vec![vec![2, 1]]);

        assert!(engine.move_window(Direction::Right, ms(0)));
        assert_eq!(handles(&engine), vec![vec![2], vec![1]]);
        assert!(!engine.move_window(Direction::Right, ms(0)));
        engine.tree().check_invariants().unwrap();
    }

    #[test]
    fn test_move_window_respects_column_limit() {
        let mut config = static_config();
        config.layout.max_windows_per_column = 1;
        let mut engine = engine_with(config, &[1, 2]);
        assert!(!engine.move_window(Direction::Left, ms(0)));
        assert_eq!(handles(&engine), vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_move_column_swaps() {
        let mut engine = engine_with(static_config(), &[1, 2, 3]);
        assert!(engine.move_column(Direction::Left, ms(0)));
        assert_eq!(handles(&engine), vec![vec![1], vec![3], vec![2]]);
        assert_eq!(engine.viewport(WS).unwrap().active_column, 1);
        assert!(!engine.move_column(Direction::Up, ms(0)));
    }

    #[test]
    fn test_remove_selected_window_selects_neighbour() {
        let mut engine = engine_with(static_config(), &[1, 2, 3]);
        engine.select_window(WindowHandle(2), ms(0));
        assert_eq!(engine.remove_window(WindowHandle(2), ms(0)), Some(WindowHandle(3)));
        assert_eq!(engine.viewport(WS).unwrap().active_column, 1);
        assert_eq!(engine.remove_window(WindowHandle(99), ms(0)), None);
    }

    #[test]
    fn test_remove_column_left_of_active_keeps_view() {
        let mut engine = engine_with(static_config(), &[1, 2, 3, 4]);
        let before = engine.viewport(WS).unwrap().current_offset(ms(0));
        engine.remove_window(WindowHandle(1), ms(0));
        let viewport = engine.viewport(WS).unwrap();
        assert_eq!(viewport.active_column, 2);
        // Content shifted left by one column; the offset compensates, then
        // the view is clamped to the shorter strip.
        assert!(viewport.current_offset(ms(0)) >= before);
        assert_eq!(engine.selected_window(WS), Some(WindowHandle(4)));
    }

    #[test]
    fn test_remove_last_window_keeps_placeholder() {
        let mut engine = engine_with(static_config(), &[1]);
        assert_eq!(engine.remove_window(WindowHandle(1), ms(0)), None);
        assert_eq!(engine.tree().column_count(WS), 1);
        assert_eq!(engine.tree().window_count(WS), 0);
        assert_eq!(engine.selected_window(WS), None);
    }

    #[test]
    fn test_stale_selection_is_replaced() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        let node = engine.tree().node_for_handle(WindowHandle(1)).unwrap();
        engine.tree.remove_window(WindowHandle(1)).unwrap();
        engine.viewport_mut(WS).unwrap().selected = Some(node);
        assert_eq!(engine.selected_window(WS), Some(WindowHandle(2)));
    }

    #[test]
    fn test_sync_windows_diffs() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        let result = engine.sync_windows(
            WS,
            &[(WindowHandle(2), false), (WindowHandle(3), true)],
            ms(0),
        );
        assert_eq!(result.removed, vec![WindowHandle(1)]);
        assert_eq!(result.added, vec![WindowHandle(3)]);
        assert_eq!(result.selected, Some(WindowHandle(3)));
    }

    #[test]
    fn test_fullscreen_toggle_is_exact() {
        let mut engine = engine_with(static_config(), &[1, 2, 3]);
        let node = engine.tree().node_for_handle(WindowHandle(2)).unwrap();
        engine.tree.window_mut(node).unwrap().size = WeightedSize::Auto { weight: 1.7 };
        engine.select_window(WindowHandle(2), ms(0));
        let offset = engine.viewport(WS).unwrap().current_offset(ms(0));

        assert!(engine.toggle_fullscreen(WindowHandle(2), ms(0)));
        let data = engine.tree().window(node).unwrap();
        assert_eq!(data.sizing, SizingMode::Fullscreen);

        assert!(engine.toggle_fullscreen(WindowHandle(2), ms(0)));
        let data = engine.tree().window(node).unwrap();
        assert_eq!(data.sizing, SizingMode::Normal);
        assert_eq!(data.size, WeightedSize::Auto { weight: 1.7 });
        assert_eq!(data.restore, None);
        assert_eq!(engine.viewport(WS).unwrap().current_offset(ms(0)), offset);
    }

    #[test]
    fn test_fullscreen_over_maximized_returns_to_maximized() {
        let mut engine = engine_with(static_config(), &[1]);
        let node = engine.tree().node_for_handle(WindowHandle(1)).unwrap();
        assert!(engine.toggle_maximized(WindowHandle(1), ms(0)));
        assert!(engine.toggle_fullscreen(WindowHandle(1), ms(0)));
        assert!(engine.toggle_fullscreen(WindowHandle(1), ms(0)));
        assert_eq!(engine.tree().window(node).unwrap().sizing, SizingMode::Maximized);
        assert!(engine.toggle_maximized(WindowHandle(1), ms(0)));
        assert_eq!(engine.tree().window(node).unwrap().sizing, SizingMode::Normal);
    }

    #[test]
    fn test_cycle_and_full_width() {
        let mut config = static_config();
        config.layout.preset_column_widths =
            vec![ColumnWidth::Fixed(300.0), ColumnWidth::Fixed(600.0)];
        let mut engine = engine_with(config, &[1]);
        let column = engine.tree().column_at(WS, 0).unwrap();

        // 400 is between the presets; the next larger one is picked.
        assert!(engine.cycle_column_width(ms(0)));
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(600.0));
        assert!(engine.cycle_column_width(ms(0)));
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(300.0));

        assert!(engine.toggle_full_width(ms(0)));
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Proportion(1.0));
        assert!(engine.toggle_full_width(ms(0)));
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(300.0));
    }

    #[test]
    fn test_resize_column_clamps() {
        let mut engine = engine_with(static_config(), &[1]);
        let column = engine.tree().column_at(WS, 0).unwrap();
        assert!(engine.resize_column(5000.0, ms(0)));
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(990.0));
        assert!(engine.resize_column(-5000.0, ms(0)));
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(1.0));
    }

    #[test]
    fn test_width_change_animates() {
        let mut config = Config::default();
        config.layout.default_column_width = ColumnWidth::Fixed(400.0);
        let mut engine = engine_with(config, &[1]);
        engine.tick(ms(10_000));
        assert!(engine.set_column_width(ColumnWidth::Fixed(800.0), ms(10_000)));
        let column = engine.tree().column_at(WS, 0).unwrap();
        assert!(engine.tree().container(column).unwrap().width_animation.is_some());
        assert!(engine.tick(ms(10_010)));
        assert!(!engine.tick(ms(20_000)));
        assert!(engine.tree().container(column).unwrap().width_animation.is_none());
    }

    #[test]
    fn test_balance_resets_widths_and_weights() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        engine.set_column_width(ColumnWidth::Fixed(700.0), ms(0));
        let node = engine.tree().node_for_handle(WindowHandle(1)).unwrap();
        engine.tree.window_mut(node).unwrap().size = WeightedSize::Auto { weight: 3.0 };
        assert!(engine.balance(ms(0)));
        for &column in engine.tree().columns(WS) {
            assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(400.0));
        }
        assert_eq!(engine.tree().window(node).unwrap().size, WeightedSize::default());
    }

    #[test]
    fn test_toggle_tabbed() {
        let mut engine = engine_with(static_config(), &[1]);
        let column = engine.tree().column_at(WS, 0).unwrap();
        assert!(engine.toggle_tabbed(0, ms(0)));
        assert_eq!(engine.tree().container(column).unwrap().display, DisplayMode::Tabbed);
        assert!(!engine.toggle_tabbed(3, ms(0)));
    }

    #[test]
    fn test_scroll_by_clamps() {
        let mut engine = engine_with(static_config(), &[1, 2, 3]);
        assert!(engine.scroll_by(-10_000.0, ms(0)));
        assert_eq!(engine.viewport(WS).unwrap().current_offset(ms(0)), -240.0);
        assert!(engine.scroll_by(10_000.0, ms(0)));
        assert_eq!(engine.viewport(WS).unwrap().current_offset(ms(0)), 0.0);
    }

    #[test]
    fn test_gesture_selects_landing_column() {
        let mut engine = engine_with(static_config(), &[1, 2, 3, 4]);
        engine.select_window(WindowHandle(1), ms(0));
        assert!(engine.begin_gesture(ms(0), true));
        let mut changed = None;
        for i in 1..=6 {
            if let Some(handle) = engine.update_gesture(-80.0, ms(i * 10)) {
                changed = Some(handle);
            }
        }
        assert_eq!(changed, Some(WindowHandle(2)));
        let landed = engine.end_gesture(ms(70)).unwrap();
        let viewport = engine.viewport(WS).unwrap();
        assert_eq!(engine.tree().column_at(WS, viewport.active_column).map(|c| engine.tree().children(c)[0]),
            engine.tree().node_for_handle(landed));
        assert!(!engine.cancel_gesture(ms(80)));
    }

    #[test]
    fn test_only_one_interaction_at_a_time() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        assert!(engine.begin_interactive_move(WindowHandle(1), Point::new(100.0, 100.0)));
        assert!(!engine.begin_interactive_resize(WindowHandle(2), ResizeEdges::RIGHT, Point::default()));
        assert!(!engine.begin_interactive_move(WindowHandle(2), Point::default()));
        assert!(engine.cancel_interactive());
        assert!(!engine.cancel_interactive());
    }

    #[test]
    fn test_interactive_resize_cancel_restores() {
        let mut engine = engine_with(static_config(), &[1]);
        let column = engine.tree().column_at(WS, 0).unwrap();
        assert!(engine.begin_interactive_resize(WindowHandle(1), ResizeEdges::RIGHT, Point::new(410.0, 300.0)));
        assert!(engine.update_interactive_resize(Point::new(510.0, 300.0)));
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(500.0));
        assert!(engine.cancel_interactive());
        assert_eq!(engine.tree().container(column).unwrap().width, ColumnWidth::Fixed(400.0));
    }

    #[test]
    fn test_interactive_move_commits_on_release() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        engine.compose(MON, ms(0)).unwrap();
        assert!(engine.begin_interactive_move(WindowHandle(1), Point::new(200.0, 300.0)));
        let hover = engine.update_interactive_move(Point::new(600.0, 300.0));
        assert_eq!(
            hover,
            Some(HoverTarget::Window {
                target: WindowHandle(2),
                intent: crate::interactive::InsertIntent::Swap,
            })
        );
        assert!(engine.end_interactive_move(ms(0)));
        assert_eq!(handles(&engine), vec![vec![2], vec![1]]);
        assert!(engine.interaction().is_none());
    }

    #[test]
    fn test_drag_out_of_column_left_of_active_keeps_view() {
        let mut config = Config::default();
        config.layout.default_column_width = ColumnWidth::Fixed(400.0);
        let mut engine = engine_with(config, &[1, 2, 3]);
        engine.tick(ms(10_000));
        let out = engine.compose(MON, ms(10_000)).unwrap();
        assert_eq!(out.frames[&WindowHandle(3)].x, 590.0);

        assert!(engine.begin_interactive_move(WindowHandle(1), Point::new(100.0, 300.0)));
        let hover = engine.update_interactive_move(Point::new(800.0, 560.0));
        assert_eq!(
            hover,
            Some(HoverTarget::Window {
                target: WindowHandle(3),
                intent: crate::interactive::InsertIntent::After,
            })
        );
        assert!(engine.end_interactive_move(ms(10_000)));
        assert_eq!(handles(&engine), vec![vec![2], vec![3, 1]]);

        // Column [3] lost its left neighbour but is still drawn where it was.
        let out = engine.compose(MON, ms(10_000)).unwrap();
        assert_eq!(out.frames[&WindowHandle(3)].x, 590.0);
        assert_eq!(engine.viewport(WS).unwrap().active_column, 1);

        engine.tick(ms(20_000));
        let out = engine.compose(MON, ms(20_000)).unwrap();
        assert_eq!(out.frames[&WindowHandle(3)].x, 420.0);
    }

    #[test]
    fn test_drag_insert_after_joins_column_and_resets_weight() {
        let mut engine = engine_with(static_config(), &[1, 2, 3]);
        engine.select_window(WindowHandle(2), ms(0));
        assert!(engine.move_window(Direction::Left, ms(0)));
        assert_eq!(handles(&engine), vec![vec![1, 2], vec![3]]);
        let a = engine.tree().node_for_handle(WindowHandle(1)).unwrap();
        engine.tree.window_mut(a).unwrap().size = WeightedSize::Auto { weight: 2.5 };

        engine.compose(MON, ms(0)).unwrap();
        assert!(engine.begin_interactive_move(WindowHandle(1), Point::new(200.0, 150.0)));
        assert_eq!(
            engine.update_interactive_move(Point::new(600.0, 560.0)),
            Some(HoverTarget::Window {
                target: WindowHandle(3),
                intent: crate::interactive::InsertIntent::After,
            })
        );
        assert!(engine.end_interactive_move(ms(0)));

        assert_eq!(handles(&engine), vec![vec![2], vec![3, 1]]);
        assert_eq!(
            engine.tree().window(a).unwrap().size,
            WeightedSize::Auto { weight: 1.0 }
        );
        assert_eq!(engine.selected_window(WS), Some(WindowHandle(1)));
        engine.tree().check_invariants().unwrap();
    }

    #[test]
    fn test_gesture_release_continues_in_scroll_direction() {
        let mut config = static_config();
        config.layout.centering = crate::viewport::CenteringPolicy::OnOverflow;
        config.layout.default_column_width = ColumnWidth::Fixed(300.0);
        let mut engine = engine_with(config, &[1, 2, 3, 4]);
        engine.select_window(WindowHandle(1), ms(0));
        assert_eq!(engine.viewport(WS).unwrap().current_offset(ms(0)), 0.0);

        assert!(engine.begin_gesture(ms(0), true));
        for i in 1..=6 {
            engine.update_gesture(-60.0, ms(i * 10));
        }
        // The scroll bound -250 is the nearest snap of column 1, but columns
        // 2 and 3 are fully visible there too.
        assert_eq!(engine.end_gesture(ms(70)), Some(WindowHandle(4)));
        let viewport = engine.viewport(WS).unwrap();
        assert_eq!(viewport.active_column, 3);
        assert_eq!(viewport.current_offset(ms(70)), -250.0);
    }

    #[test]
    fn test_sync_takes_window_from_other_workspace() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        let other = WorkspaceId(11);
        assert!(engine.add_workspace(MON, other));
        let constraints = WindowSizeConstraints::new(
            crate::geometry::Size::new(300.0, 100.0),
            crate::geometry::Size::ZERO,
        );
        assert!(engine.set_constraints(WindowHandle(1), constraints));

        let result = engine.sync_windows(other, &[(WindowHandle(1), false)], ms(0));
        assert_eq!(result.moved, vec![WindowHandle(1)]);
        assert!(result.added.is_empty());
        assert_eq!(result.selected, Some(WindowHandle(1)));

        let node = engine.tree().node_for_handle(WindowHandle(1)).unwrap();
        assert_eq!(engine.tree().workspace_of(node), Some(other));
        assert_eq!(engine.tree().window(node).unwrap().constraints, constraints);
        assert_eq!(handles(&engine), vec![vec![2]]);

        let again = engine.sync_windows(other, &[(WindowHandle(1), false)], ms(0));
        assert!(again.moved.is_empty());
    }

    #[test]
    fn test_new_engine_replaces_invalid_weight_limits() {
        let mut config = static_config();
        config.layout.min_weight = f64::NAN;
        config.layout.max_weight = f64::INFINITY;
        let mut engine = engine_with(config, &[1]);
        let layout = &engine.config().layout;
        assert!(layout.min_weight.is_finite() && layout.min_weight > 0.0);
        assert!(layout.max_weight.is_finite() && layout.max_weight >= layout.min_weight);

        assert!(engine.begin_interactive_resize(WindowHandle(1), ResizeEdges::BOTTOM, Point::new(200.0, 590.0)));
        assert!(engine.update_interactive_resize(Point::new(200.0, 100.0)));
        assert!(engine.end_interactive_resize(ms(0)));
    }

    #[test]
    fn test_workspace_switch_composes_both() {
        let mut config = Config::default();
        config.layout.default_column_width = ColumnWidth::Fixed(400.0);
        let mut engine = engine_with(config, &[1]);
        let other = WorkspaceId(11);
        assert!(engine.add_workspace(MON, other));
        engine.add_window(other, WindowHandle(2), false, ms(0)).unwrap();

        assert!(engine.activate_workspace(MON, 1, ms(0)));
        let out = engine.compose(MON, ms(50)).unwrap();
        assert!(out.frames.contains_key(&WindowHandle(1)));
        assert!(out.frames.contains_key(&WindowHandle(2)));

        engine.tick(ms(10_000));
        let out = engine.compose(MON, ms(10_000)).unwrap();
        assert!(!out.frames.contains_key(&WindowHandle(1)));
        assert_eq!(out.frames[&WindowHandle(2)].x, 10.0);
    }

    #[test]
    fn test_new_window_fades_in() {
        let mut engine = engine_with(Config::default(), &[]);
        engine.add_window(WS, WindowHandle(1), true, ms(0)).unwrap();
        let out = engine.compose(MON, ms(0)).unwrap();
        assert_eq!(out.alphas.get(&WindowHandle(1)), Some(&0.0));
        engine.tick(ms(10_000));
        let out = engine.compose(MON, ms(10_000)).unwrap();
        assert!(out.alphas.is_empty());
    }

    #[test]
    fn test_remove_workspace_returns_orphans() {
        let mut engine = engine_with(static_config(), &[1, 2]);
        let mut orphaned = engine.remove_workspace(WS);
        orphaned.sort();
        assert_eq!(orphaned, vec![WindowHandle(1), WindowHandle(2)]);
        assert!(engine.tree().root(WS).is_none());
        assert!(engine.monitor(MON).unwrap().workspaces().is_empty());
    }
}
