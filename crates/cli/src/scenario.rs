//! Scripted scenarios.
//!
//! A scenario is a JSON document holding a list of timed operations. Each
//! operation is applied to a [`LayoutEngine`] in order and its result is
//! recorded, so a scenario file doubles as a reproducible layout trace.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use strata_core_layout::engine::SyncResult;
use strata_core_layout::{
    ColumnWidth, Composition, Direction, HoverTarget, LayoutEngine, MonitorGeometry, MonitorId,
    Point, ResizeEdges, WindowHandle, WindowSizeConstraints, WorkspaceId,
};

/// A scripted list of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub steps: Vec<Step>,
}

/// One operation and the time it happens at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the scenario.
    #[serde(default)]
    pub at_ms: u64,
    #[serde(flatten)]
    pub op: Operation,
}

/// A window reported by `sync_windows`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub handle: WindowHandle,
    #[serde(default)]
    pub is_new: bool,
}

/// Operations a scenario can apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    AddMonitor {
        monitor: MonitorId,
        #[serde(default)]
        geometry: MonitorGeometry,
    },
    SetMonitorGeometry {
        monitor: MonitorId,
        geometry: MonitorGeometry,
    },
    FocusMonitor {
        monitor: MonitorId,
    },
    AddWorkspace {
        monitor: MonitorId,
        workspace: WorkspaceId,
    },
    RemoveWorkspace {
        workspace: WorkspaceId,
    },
    ActivateWorkspace {
        monitor: MonitorId,
        index: usize,
    },

    SyncWindows {
        workspace: WorkspaceId,
        windows: Vec<WindowEntry>,
    },
    AddWindow {
        workspace: WorkspaceId,
        handle: WindowHandle,
        #[serde(default)]
        is_new: bool,
    },
    RemoveWindow {
        handle: WindowHandle,
    },
    SetConstraints {
        handle: WindowHandle,
        constraints: WindowSizeConstraints,
    },
    SelectWindow {
        handle: WindowHandle,
    },

    Focus {
        direction: Direction,
    },
    MoveWindow {
        direction: Direction,
    },
    MoveColumn {
        direction: Direction,
    },

    ToggleFullscreen {
        handle: WindowHandle,
    },
    ToggleMaximized {
        handle: WindowHandle,
    },
    ToggleTabbed {
        column: usize,
    },
    CycleColumnWidth,
    SetColumnWidth {
        width: ColumnWidth,
    },
    ResizeColumn {
        delta: f64,
    },
    ToggleFullWidth,
    Balance,

    ScrollBy {
        delta: f64,
    },
    BeginGesture {
        #[serde(default = "default_true")]
        is_touchpad: bool,
    },
    UpdateGesture {
        delta: f64,
    },
    EndGesture,
    CancelGesture,

    BeginMove {
        handle: WindowHandle,
        pointer: Point,
    },
    UpdateMove {
        pointer: Point,
    },
    EndMove,
    BeginResize {
        handle: WindowHandle,
        edges: ResizeEdges,
        pointer: Point,
    },
    UpdateResize {
        pointer: Point,
    },
    EndResize,
    CancelInteractive,

    Tick,
    Compose {
        monitor: MonitorId,
    },
}

fn default_true() -> bool {
    true
}

/// What an operation returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied(bool),
    Selected(Option<WindowHandle>),
    Hover(Option<HoverTarget>),
    Synced(SyncResult),
    Orphaned(Vec<WindowHandle>),
    Animating(bool),
    Composed(Option<Composition>),
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub at_ms: u64,
    pub outcome: Outcome,
}

impl Scenario {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse scenario")
    }

    /// Apply every step to `engine`.
    pub fn run(&self, engine: &mut LayoutEngine) -> Vec<StepReport> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let outcome = apply(engine, &step.op, Duration::from_millis(step.at_ms));
                tracing::debug!(index, at_ms = step.at_ms, ?outcome, "step applied");
                StepReport {
                    index,
                    at_ms: step.at_ms,
                    outcome,
                }
            })
            .collect()
    }
}

fn apply(engine: &mut LayoutEngine, op: &Operation, now: Duration) -> Outcome {
    use Operation::*;
    use Outcome::*;

    match *op {
        AddMonitor { monitor, geometry } => Applied(engine.add_monitor(monitor, geometry)),
        SetMonitorGeometry { monitor, geometry } => {
            Applied(engine.set_monitor_geometry(monitor, geometry))
        }
        FocusMonitor { monitor } => Applied(engine.focus_monitor(monitor)),
        AddWorkspace { monitor, workspace } => Applied(engine.add_workspace(monitor, workspace)),
        RemoveWorkspace { workspace } => Orphaned(engine.remove_workspace(workspace)),
        ActivateWorkspace { monitor, index } => {
            Applied(engine.activate_workspace(monitor, index, now))
        }

        SyncWindows {
            workspace,
            ref windows,
        } => {
            let windows: Vec<_> = windows.iter().map(|w| (w.handle, w.is_new)).collect();
            Synced(engine.sync_windows(workspace, &windows, now))
        }
        AddWindow {
            workspace,
            handle,
            is_new,
        } => Applied(engine.add_window(workspace, handle, is_new, now).is_some()),
        RemoveWindow { handle } => Selected(engine.remove_window(handle, now)),
        SetConstraints {
            handle,
            constraints,
        } => Applied(engine.set_constraints(handle, constraints)),
        SelectWindow { handle } => Applied(engine.select_window(handle, now)),

        Focus { direction } => Selected(engine.focus(direction, now)),
        MoveWindow { direction } => Applied(engine.move_window(direction, now)),
        MoveColumn { direction } => Applied(engine.move_column(direction, now)),

        ToggleFullscreen { handle } => Applied(engine.toggle_fullscreen(handle, now)),
        ToggleMaximized { handle } => Applied(engine.toggle_maximized(handle, now)),
        ToggleTabbed { column } => Applied(engine.toggle_tabbed(column, now)),
        CycleColumnWidth => Applied(engine.cycle_column_width(now)),
        SetColumnWidth { width } => Applied(engine.set_column_width(width, now)),
        ResizeColumn { delta } => Applied(engine.resize_column(delta, now)),
        ToggleFullWidth => Applied(engine.toggle_full_width(now)),
        Balance => Applied(engine.balance(now)),

        ScrollBy { delta } => Applied(engine.scroll_by(delta, now)),
        BeginGesture { is_touchpad } => Applied(engine.begin_gesture(now, is_touchpad)),
        UpdateGesture { delta } => Selected(engine.update_gesture(delta, now)),
        EndGesture => Selected(engine.end_gesture(now)),
        CancelGesture => Applied(engine.cancel_gesture(now)),

        BeginMove { handle, pointer } => Applied(engine.begin_interactive_move(handle, pointer)),
        UpdateMove { pointer } => Hover(engine.update_interactive_move(pointer)),
        EndMove => Applied(engine.end_interactive_move(now)),
        BeginResize {
            handle,
            edges,
            pointer,
        } => Applied(engine.begin_interactive_resize(handle, edges, pointer)),
        UpdateResize { pointer } => Applied(engine.update_interactive_resize(pointer)),
        EndResize => Applied(engine.end_interactive_resize(now)),
        CancelInteractive => Applied(engine.cancel_interactive()),

        Tick => Animating(engine.tick(now)),
        Compose { monitor } => Composed(engine.compose(monitor, now)),
    }
}
