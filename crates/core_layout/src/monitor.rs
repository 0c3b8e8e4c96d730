//! Monitors and their workspaces.
//!
//! A monitor shows one workspace at a time out of an ordered list. Switching
//! animates a fractional "index" so neighbouring workspaces slide in and out.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::{Spring, SpringConfig};
use crate::geometry::{Orientation, Rect};
use crate::viewport::ViewportState;
use crate::WorkspaceId;

/// Fraction of the monitor width a workspace switch travels under reduced
/// motion.
pub const REDUCED_MOTION_SWITCH_SCALE: f64 = 0.2;

/// Identity of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorId(pub u64);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry reported by the display collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorGeometry {
    /// Usable area without OS chrome.
    pub working_area: Rect,
    /// Full screen rectangle.
    pub frame: Rect,
    /// Backing scale factor.
    pub scale: f64,
    /// Scroll axis. `None` takes `[layout] orientation` from the config.
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

impl MonitorGeometry {
    pub fn orientation(&self) -> Orientation {
        self.orientation.unwrap_or_default()
    }
}

impl Default for MonitorGeometry {
    fn default() -> Self {
        let frame = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        Self {
            working_area: frame,
            frame,
            scale: 1.0,
            orientation: None,
        }
    }
}

/// A monitor and the workspaces it hosts.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub id: MonitorId,
    pub geometry: MonitorGeometry,
    workspaces: Vec<WorkspaceId>,
    active: usize,
    /// Animated workspace index while switching.
    switch: Option<Spring>,
    viewports: HashMap<WorkspaceId, ViewportState>,
}

impl Monitor {
    pub fn new(id: MonitorId, geometry: MonitorGeometry) -> Self {
        Self {
            id,
            geometry,
            workspaces: Vec::new(),
            active: 0,
            switch: None,
            viewports: HashMap::new(),
        }
    }

    pub fn workspaces(&self) -> &[WorkspaceId] {
        &self.workspaces
    }

    pub fn contains(&self, workspace: WorkspaceId) -> bool {
        self.workspaces.contains(&workspace)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_workspace(&self) -> Option<WorkspaceId> {
        self.workspaces.get(self.active).copied()
    }

    pub fn viewport(&self, workspace: WorkspaceId) -> Option<&ViewportState> {
        self.viewports.get(&workspace)
    }

    pub fn viewport_mut(&mut self, workspace: WorkspaceId) -> Option<&mut ViewportState> {
        self.viewports.get_mut(&workspace)
    }

    pub fn viewports_mut(&mut self) -> impl Iterator<Item = &mut ViewportState> + '_ {
        self.viewports.values_mut()
    }

    /// Append a workspace. Returns false if it is already here.
    pub fn add_workspace(&mut self, workspace: WorkspaceId) -> bool {
        if self.contains(workspace) {
            return false;
        }
        self.workspaces.push(workspace);
        self.viewports.insert(workspace, ViewportState::new());
        true
    }

    /// Drop a workspace and its viewport state.
    pub fn remove_workspace(&mut self, workspace: WorkspaceId) -> Option<ViewportState> {
        let index = self.workspaces.iter().position(|&ws| ws == workspace)?;
        self.workspaces.remove(index);

        if index < self.active {
            self.active -= 1;
            if let Some(spring) = &mut self.switch {
                spring.offset_by(-1.0);
            }
        } else if index == self.active && self.active >= self.workspaces.len() {
            self.active = self.workspaces.len().saturating_sub(1);
            self.switch = None;
        }

        self.viewports.remove(&workspace)
    }

    /// Index of the active workspace as currently animated.
    pub fn animated_index(&self, at: Duration) -> f64 {
        match &self.switch {
            Some(spring) => spring.value(at),
            None => self.active as f64,
        }
    }

    pub fn is_switching(&self) -> bool {
        self.switch.is_some()
    }

    /// Make workspace `index` active. Returns false for an invalid index.
    pub fn activate(&mut self, index: usize, at: Duration, spring: Option<SpringConfig>) -> bool {
        if index >= self.workspaces.len() {
            debug!(monitor = %self.id, index, "workspace index out of range");
            return false;
        }
        if index == self.active {
            return true;
        }

        let from = self.animated_index(at);
        self.active = index;
        self.switch = match (spring, &self.switch) {
            (None, _) => None,
            (Some(_), Some(running)) => Some(running.retarget(at, index as f64)),
            (Some(config), None) => Some(Spring::new(from, index as f64, 0.0, at, config)),
        };
        debug!(monitor = %self.id, index, "workspace activated");
        true
    }

    /// Horizontal displacement of the workspace at `index` relative to the
    /// monitor.
    pub fn workspace_offset(&self, index: usize, at: Duration, reduced_motion: bool) -> f64 {
        let scale = if reduced_motion {
            REDUCED_MOTION_SWITCH_SCALE
        } else {
            1.0
        };
        (index as f64 - self.animated_index(at)) * self.geometry.frame.width * scale
    }

    /// Workspaces that are on screen at `at`, with their horizontal offset.
    pub fn visible_workspaces(&self, at: Duration, reduced_motion: bool) -> Vec<(WorkspaceId, f64)> {
        if self.switch.is_none() {
            return self
                .active_workspace()
                .map(|ws| vec![(ws, 0.0)])
                .unwrap_or_default();
        }

        let animated = self.animated_index(at);
        self.workspaces
            .iter()
            .enumerate()
            .filter(|(i, _)| (*i as f64 - animated).abs() < 1.0 || *i == self.active)
            .map(|(i, &ws)| (ws, self.workspace_offset(i, at, reduced_motion)))
            .collect()
    }

    /// Settle a finished switch. Returns whether it is still running.
    pub fn tick(&mut self, at: Duration) -> bool {
        match &self.switch {
            Some(spring) if spring.is_complete(at) => {
                self.switch = None;
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}
