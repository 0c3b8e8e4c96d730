//! Viewport state and navigation.
//!
//! The viewport is the visible window onto the strip of columns. Its offset is
//! the translation added to strip coordinates, so scrolling towards later
//! columns makes the offset more negative. The offset is either static, a
//! running spring, or driven by a live gesture.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::animation::{Spring, SpringConfig};
use crate::swipe_tracker::SwipeTracker;
use crate::tree::NodeId;

/// Differences below this are treated as "already there".
const OFFSET_EPSILON: f64 = 0.5;

/// When the viewport centers the focused column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenteringPolicy {
    /// Scroll just enough to reveal the column.
    #[default]
    Never,
    /// Always center the focused column.
    Always,
    /// Center only columns that do not fit in the viewport.
    OnOverflow,
}

/// Column spans laid out along the scroll axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Strip {
    spans: Vec<f64>,
    positions: Vec<f64>,
    gap: f64,
    padding: f64,
    viewport: f64,
}

impl Strip {
    /// `padding` is the outer gap before the first and after the last column;
    /// `viewport` is the length of the visible area along the scroll axis.
    pub fn new(spans: Vec<f64>, gap: f64, padding: f64, viewport: f64) -> Self {
        let mut positions = Vec::with_capacity(spans.len());
        let mut pos = padding;
        for span in &spans {
            positions.push(pos);
            pos += span + gap;
        }
        Self {
            spans,
            positions,
            gap,
            padding,
            viewport,
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, index: usize) -> f64 {
        self.spans.get(index).copied().unwrap_or(0.0)
    }

    /// Start of a column in strip coordinates.
    pub fn position(&self, index: usize) -> f64 {
        self.positions.get(index).copied().unwrap_or(self.padding)
    }

    pub fn gap(&self) -> f64 {
        self.gap
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    /// Length of the whole strip including outer padding.
    pub fn total(&self) -> f64 {
        if self.spans.is_empty() {
            return 0.0;
        }
        let spans: f64 = self.spans.iter().sum();
        spans + self.gap * (self.spans.len() as f64 - 1.0) + self.padding * 2.0
    }

    /// Mean distance between the starts of consecutive columns.
    pub fn average_step(&self) -> f64 {
        if self.spans.is_empty() {
            return 0.0;
        }
        let spans: f64 = self.spans.iter().sum();
        spans / self.spans.len() as f64 + self.gap
    }

    /// Offset that centers column `index`.
    pub fn centered_offset(&self, index: usize) -> f64 {
        self.viewport / 2.0 - (self.position(index) + self.span(index) / 2.0)
    }

    /// Offset that centers the whole strip.
    pub fn centered_row_offset(&self) -> f64 {
        (self.viewport - self.total()) / 2.0
    }

    /// Offset that puts the start of column `index` at the padding.
    pub fn leading_offset(&self, index: usize) -> f64 {
        self.padding - self.position(index)
    }

    /// Offset that puts the end of column `index` at the far padding.
    pub fn trailing_offset(&self, index: usize) -> f64 {
        self.viewport - self.padding - (self.position(index) + self.span(index))
    }

    /// The column cannot fit between the paddings.
    pub fn overflows(&self, index: usize) -> bool {
        self.span(index) > self.viewport - self.padding * 2.0
    }

    /// Range of valid offsets under `policy`, as `(lowest, highest)`.
    pub fn bounds(&self, policy: CenteringPolicy) -> (f64, f64) {
        if self.spans.is_empty() {
            return (0.0, 0.0);
        }
        match policy {
            CenteringPolicy::Always => {
                if self.total() <= self.viewport {
                    let row = self.centered_row_offset();
                    (row, row)
                } else {
                    (
                        self.centered_offset(self.spans.len() - 1),
                        self.centered_offset(0),
                    )
                }
            }
            CenteringPolicy::Never | CenteringPolicy::OnOverflow => {
                ((self.viewport - self.total()).min(0.0), 0.0)
            }
        }
    }

    pub fn clamp(&self, offset: f64, policy: CenteringPolicy) -> f64 {
        let (lo, hi) = self.bounds(policy);
        offset.max(lo).min(hi)
    }

    /// The column lies completely between the paddings at `offset`.
    pub fn is_fully_visible(&self, index: usize, offset: f64) -> bool {
        if index >= self.spans.len() {
            return false;
        }
        let start = self.position(index) + offset;
        let end = start + self.span(index);
        start >= self.padding - OFFSET_EPSILON
            && end <= self.viewport - self.padding + OFFSET_EPSILON
    }

    /// The column overlaps the viewport at `offset`.
    pub fn is_visible(&self, index: usize, offset: f64) -> bool {
        if index >= self.spans.len() {
            return false;
        }
        let start = self.position(index) + offset;
        let end = start + self.span(index);
        end > 0.0 && start < self.viewport
    }
}

/// A candidate landing offset for a released gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub column: usize,
    pub offset: f64,
}

/// Offset that makes column `index` visible under `policy`, moving as little
/// as possible from `current`. `from` is the previously active column.
pub fn visible_offset(
    strip: &Strip,
    index: usize,
    policy: CenteringPolicy,
    from: Option<usize>,
    current: f64,
) -> f64 {
    if strip.is_empty() {
        return 0.0;
    }
    let index = index.min(strip.len() - 1);

    let target = match policy {
        CenteringPolicy::Always => {
            if strip.total() <= strip.viewport() {
                strip.centered_row_offset()
            } else {
                strip.centered_offset(index)
            }
        }
        CenteringPolicy::OnOverflow if strip.overflows(index) => strip.centered_offset(index),
        CenteringPolicy::OnOverflow if !strip.is_fully_visible(index, current) => match from {
            // Keep scrolling the way the focus moved.
            Some(from) if from < index => strip.trailing_offset(index),
            Some(from) if from > index => strip.leading_offset(index),
            _ => reveal_offset(strip, index, current),
        },
        CenteringPolicy::OnOverflow | CenteringPolicy::Never => reveal_offset(strip, index, current),
    };

    strip.clamp(target, policy)
}

/// Smallest change of `current` that shows the column between the paddings.
fn reveal_offset(strip: &Strip, index: usize, current: f64) -> f64 {
    if strip.overflows(index) {
        return strip.leading_offset(index);
    }
    let start = strip.position(index) + current;
    let end = start + strip.span(index);
    if start < strip.padding() {
        strip.leading_offset(index)
    } else if end > strip.viewport() - strip.padding() {
        strip.trailing_offset(index)
    } else {
        current
    }
}

/// Landing candidates for a released gesture, clamped to the scroll bounds.
pub fn snap_points(strip: &Strip, policy: CenteringPolicy) -> Vec<Snap> {
    let mut snaps = Vec::new();
    if strip.is_empty() {
        return snaps;
    }

    match policy {
        CenteringPolicy::Always => {
            if strip.total() <= strip.viewport() {
                let offset = strip.centered_row_offset();
                snaps.extend((0..strip.len()).map(|column| Snap { column, offset }));
            } else {
                snaps.extend((0..strip.len()).map(|column| Snap {
                    column,
                    offset: strip.centered_offset(column),
                }));
            }
        }
        CenteringPolicy::Never | CenteringPolicy::OnOverflow => {
            for column in 0..strip.len() {
                if policy == CenteringPolicy::OnOverflow && strip.overflows(column) {
                    snaps.push(Snap {
                        column,
                        offset: strip.clamp(strip.centered_offset(column), policy),
                    });
                    continue;
                }
                snaps.push(Snap {
                    column,
                    offset: strip.clamp(strip.leading_offset(column), policy),
                });
                snaps.push(Snap {
                    column,
                    offset: strip.clamp(strip.trailing_offset(column), policy),
                });
            }
        }
    }
    snaps
}

/// Pick the landing point for a gesture projected to end at `projected`.
///
/// The nearest snap point wins. Equidistant points resolve towards the
/// direction of `velocity` (a negative velocity scrolls towards later
/// columns); at zero velocity the earlier column wins. Outside of
/// always-center, the chosen column is then advanced in the direction of
/// motion while the next column is also fully visible at the landing offset.
pub fn choose_snap(
    strip: &Strip,
    policy: CenteringPolicy,
    projected: f64,
    velocity: f64,
) -> Option<Snap> {
    let snaps = snap_points(strip, policy);

    let mut best: Option<Snap> = None;
    for snap in snaps {
        let Some(current) = best else {
            best = Some(snap);
            continue;
        };
        let distance = (snap.offset - projected).abs();
        let best_distance = (current.offset - projected).abs();
        if distance < best_distance - f64::EPSILON {
            best = Some(snap);
        } else if (distance - best_distance).abs() <= f64::EPSILON {
            let prefer = if velocity < 0.0 {
                snap.offset < current.offset
            } else if velocity > 0.0 {
                snap.offset > current.offset
            } else {
                snap.column < current.column
            };
            if prefer {
                best = Some(snap);
            }
        }
    }

    let mut snap = best?;

    if policy == CenteringPolicy::Always && strip.total() <= strip.viewport() {
        // Every candidate shares one offset: select the column nearest the center.
        let center = strip.viewport() / 2.0;
        let distance = |i: usize| {
            (strip.position(i) + strip.span(i) / 2.0 + snap.offset - center).abs()
        };
        snap.column = (0..strip.len())
            .min_by(|&a, &b| distance(a).total_cmp(&distance(b)))
            .unwrap_or(0);
        return Some(snap);
    }

    if policy != CenteringPolicy::Always {
        if velocity < 0.0 {
            while snap.column + 1 < strip.len() && strip.is_fully_visible(snap.column + 1, snap.offset)
            {
                snap.column += 1;
            }
        } else if velocity > 0.0 {
            while snap.column > 0 && strip.is_fully_visible(snap.column - 1, snap.offset) {
                snap.column -= 1;
            }
        }
    }

    Some(snap)
}

/// Live gesture driving the offset.
#[derive(Debug, Clone)]
pub struct ViewGesture {
    pub tracker: SwipeTracker,
    /// Added to the tracker position to get the offset; absorbs clamping.
    pub delta_from_tracker: f64,
    pub is_touchpad: bool,
}

impl ViewGesture {
    pub fn current(&self) -> f64 {
        self.tracker.pos() + self.delta_from_tracker
    }
}

/// The three representations of a viewport offset.
#[derive(Debug, Clone)]
pub enum ViewOffset {
    Static(f64),
    Animating(Spring),
    Gesture(ViewGesture),
}

impl Default for ViewOffset {
    fn default() -> Self {
        ViewOffset::Static(0.0)
    }
}

impl ViewOffset {
    pub fn value(&self, at: Duration) -> f64 {
        match self {
            ViewOffset::Static(v) => *v,
            ViewOffset::Animating(spring) => spring.value(at),
            ViewOffset::Gesture(gesture) => gesture.current(),
        }
    }

    /// Where the offset will settle.
    pub fn target(&self) -> f64 {
        match self {
            ViewOffset::Static(v) => *v,
            ViewOffset::Animating(spring) => spring.to(),
            ViewOffset::Gesture(gesture) => gesture.current(),
        }
    }

    pub fn velocity(&self, at: Duration) -> f64 {
        match self {
            ViewOffset::Static(_) => 0.0,
            ViewOffset::Animating(spring) => spring.velocity(at),
            ViewOffset::Gesture(gesture) => gesture.tracker.velocity(),
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, ViewOffset::Animating(_))
    }

    pub fn is_gesture(&self) -> bool {
        matches!(self, ViewOffset::Gesture(_))
    }

    /// Shift the offset without a visible jump relative to the content.
    pub fn offset_by(&mut self, delta: f64) {
        match self {
            ViewOffset::Static(v) => *v += delta,
            ViewOffset::Animating(spring) => spring.offset_by(delta),
            ViewOffset::Gesture(gesture) => gesture.delta_from_tracker += delta,
        }
    }
}

/// Per-workspace viewport bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ViewportState {
    pub active_column: usize,
    pub offset: ViewOffset,
    /// Scroll distance accumulated during a gesture that has not yet turned
    /// into a selection change.
    pub selection_progress: f64,
    /// Offset to restore when the last fullscreen or maximized window leaves
    /// that mode.
    pub offset_before_fullscreen: Option<f64>,
    /// Selected window; re-validated against the tree before use.
    pub selected: Option<NodeId>,
}

impl ViewportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_offset(&self, at: Duration) -> f64 {
        self.offset.value(at)
    }

    /// Move the offset to `target`, animating when `spring` is given.
    ///
    /// A running spring is re-aimed keeping its velocity. A live gesture is
    /// replaced.
    pub fn animate_to(&mut self, target: f64, at: Duration, spring: Option<SpringConfig>) {
        let current = self.offset.value(at);
        let Some(config) = spring else {
            self.offset = ViewOffset::Static(target);
            return;
        };

        self.offset = match &self.offset {
            ViewOffset::Animating(running) => {
                if (running.to() - target).abs() < f64::EPSILON {
                    return;
                }
                ViewOffset::Animating(running.retarget(at, target))
            }
            ViewOffset::Static(_) if (current - target).abs() < OFFSET_EPSILON => {
                ViewOffset::Static(target)
            }
            other => {
                let velocity = other.velocity(at);
                ViewOffset::Animating(Spring::new(current, target, velocity, at, config))
            }
        };
    }

    /// Scroll so that column `index` is visible under `policy`.
    pub fn ensure_container_visible(
        &mut self,
        strip: &Strip,
        index: usize,
        policy: CenteringPolicy,
        from: Option<usize>,
        at: Duration,
        spring: Option<SpringConfig>,
    ) {
        // Compute against where the view is heading, not where it is now, so
        // repeated navigation during an animation does not undershoot.
        let current = self.offset.target();
        let target = visible_offset(strip, index, policy, from, current);
        trace!(index, target, "ensure column visible");
        self.animate_to(target, at, spring);
    }

    /// Immediate scroll by `delta`, clamped to the strip.
    pub fn scroll_by(&mut self, strip: &Strip, delta: f64, policy: CenteringPolicy, at: Duration) {
        let target = strip.clamp(self.offset.value(at) + delta, policy);
        self.offset = ViewOffset::Static(target);
    }

    pub fn begin_gesture(
        &mut self,
        at: Duration,
        is_touchpad: bool,
        history: Duration,
        deceleration_rate: f64,
    ) {
        let current = self.offset.value(at);
        self.offset = ViewOffset::Gesture(ViewGesture {
            tracker: SwipeTracker::new(history, deceleration_rate),
            delta_from_tracker: current,
            is_touchpad,
        });
        self.selection_progress = 0.0;
    }

    /// Feed a gesture sample. Returns the new active column when the
    /// accumulated distance crossed a column boundary.
    pub fn update_gesture(
        &mut self,
        strip: &Strip,
        delta: f64,
        timestamp: Duration,
        policy: CenteringPolicy,
    ) -> Option<usize> {
        let ViewOffset::Gesture(gesture) = &mut self.offset else {
            return None;
        };

        let before = gesture.current();
        gesture.tracker.push(delta, timestamp);
        let raw = gesture.current();
        let clamped = strip.clamp(raw, policy);
        gesture.delta_from_tracker += clamped - raw;
        let applied = clamped - before;

        if strip.is_empty() {
            return None;
        }

        // Negative offset movement reveals later columns.
        self.selection_progress -= applied;
        let step = strip.average_step();
        if step <= 0.0 {
            return None;
        }

        let previous = self.active_column;
        while self.selection_progress >= step && self.active_column + 1 < strip.len() {
            self.selection_progress -= step;
            self.active_column += 1;
        }
        while self.selection_progress <= -step && self.active_column > 0 {
            self.selection_progress += step;
            self.active_column -= 1;
        }
        // Progress past either end cannot turn into a selection change.
        self.selection_progress = self.selection_progress.clamp(-step, step);

        (self.active_column != previous).then_some(self.active_column)
    }

    /// Release a gesture: pick the snap target from the projected position
    /// and spring towards it. Returns the column that became active.
    pub fn end_gesture(
        &mut self,
        strip: &Strip,
        policy: CenteringPolicy,
        at: Duration,
        spring: Option<SpringConfig>,
    ) -> Option<usize> {
        let ViewOffset::Gesture(gesture) = &self.offset else {
            return None;
        };

        let current = gesture.current();
        let velocity = gesture.tracker.velocity();
        let projected =
            strip.clamp(gesture.tracker.projected_end_pos() + gesture.delta_from_tracker, policy);

        let Some(snap) = choose_snap(strip, policy, projected, velocity) else {
            self.offset = ViewOffset::Static(0.0);
            self.selection_progress = 0.0;
            return None;
        };

        debug!(
            column = snap.column,
            offset = snap.offset,
            projected,
            velocity,
            "gesture snapped"
        );

        self.active_column = snap.column;
        self.selection_progress = 0.0;
        self.offset = match spring {
            Some(config) => {
                ViewOffset::Animating(Spring::new(current, snap.offset, velocity, at, config))
            }
            None => ViewOffset::Static(snap.offset),
        };
        Some(snap.column)
    }

    /// Abandon a gesture and return to the active column.
    pub fn cancel_gesture(
        &mut self,
        strip: &Strip,
        policy: CenteringPolicy,
        at: Duration,
        spring: Option<SpringConfig>,
    ) {
        if !self.offset.is_gesture() {
            return;
        }
        let current = self.offset.value(at);
        let target = visible_offset(strip, self.active_column, policy, None, current);
        self.selection_progress = 0.0;
        self.animate_to(target, at, spring);
    }

    /// Remember the offset before a window of this workspace goes fullscreen.
    pub fn save_for_fullscreen(&mut self) {
        if self.offset_before_fullscreen.is_none() {
            self.offset_before_fullscreen = Some(self.offset.target());
        }
    }

    /// Return to the offset saved by [`save_for_fullscreen`](Self::save_for_fullscreen).
    pub fn restore_after_fullscreen(&mut self, at: Duration, spring: Option<SpringConfig>) -> bool {
        match self.offset_before_fullscreen.take() {
            Some(offset) => {
                self.animate_to(offset, at, spring);
                true
            }
            None => false,
        }
    }

    /// Settle a finished spring into a static offset. Returns whether the
    /// offset is still moving.
    pub fn tick(&mut self, at: Duration) -> bool {
        match &self.offset {
            ViewOffset::Animating(spring) if spring.is_complete(at) => {
                self.offset = ViewOffset::Static(spring.to());
                false
            }
            ViewOffset::Animating(_) | ViewOffset::Gesture(_) => true,
            ViewOffset::Static(_) => false,
        }
    }
}
