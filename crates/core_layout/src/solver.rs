//! Axis solver.
//!
//! Distributes the space available along one axis among weighted items that
//! carry minimum, maximum and fixed sizes. The same solver sizes windows
//! inside a column (secondary axis) and columns along the strip (primary axis).
//!
//! The algorithm:
//! 1. Items with a fixed value, or whose constraints leave no freedom
//!    (`min >= max`), are pinned to their clamped value.
//! 2. The remaining space is divided among the free items by weight.
//! 3. A free item whose share falls below its minimum is pinned at the
//!    minimum and the division is repeated. Each round pins at least one item,
//!    so at most `n + 1` rounds run.
//! 4. Items above their maximum are clamped and the excess is handed to the
//!    items that are not sitting on a bound.
//! 5. Results are floored to whole units and never drop below 1.

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing a result against its bounds.
const BOUND_EPSILON: f64 = 0.5;

/// One item on the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisItem {
    /// Relative share of free space. Non-positive weights are treated as 0.
    pub weight: f64,
    /// Minimum size; 0 means no minimum.
    pub min: f64,
    /// Maximum size; 0 means unbounded.
    pub max: f64,
    /// Explicit size requested by the user or the application.
    pub fixed: Option<f64>,
}

impl Default for AxisItem {
    fn default() -> Self {
        Self {
            weight: 1.0,
            min: 0.0,
            max: 0.0,
            fixed: None,
        }
    }
}

impl AxisItem {
    pub fn weighted(weight: f64) -> Self {
        Self {
            weight,
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = min.max(0.0);
        self.max = max.max(0.0);
        self
    }

    pub fn with_fixed(mut self, fixed: f64) -> Self {
        self.fixed = Some(fixed);
        self
    }

    fn upper(&self) -> f64 {
        if self.max > 0.0 {
            self.max.max(self.min)
        } else {
            f64::INFINITY
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.upper())
    }

    /// Constraints leave exactly one admissible size.
    fn is_rigid(&self) -> bool {
        self.max > 0.0 && self.min >= self.max
    }
}

/// Resolved size of one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisResult {
    pub size: f64,
    /// The size sits on the item's minimum or maximum bound.
    pub was_constrained: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Free,
    Pinned(f64),
}

/// Solve sizes for `items` sharing `available` space with `gap` between
/// consecutive items.
pub fn solve(items: &[AxisItem], available: f64, gap: f64) -> Vec<AxisResult> {
    if items.is_empty() {
        return Vec::new();
    }

    let gaps = gap.max(0.0) * (items.len() as f64 - 1.0);
    let space = if available.is_finite() {
        (available - gaps).max(0.0)
    } else {
        0.0
    };

    let mut slots: Vec<Slot> = items
        .iter()
        .map(|item| match item.fixed {
            Some(value) if value.is_finite() => Slot::Pinned(item.clamp(value)),
            _ if item.is_rigid() => Slot::Pinned(item.max.max(item.min)),
            _ => Slot::Free,
        })
        .collect();

    let mut sizes = vec![0.0; items.len()];

    // Proportional division with minimum pinning.
    for _ in 0..=items.len() {
        let pinned_total: f64 = slots
            .iter()
            .map(|slot| match slot {
                Slot::Pinned(v) => *v,
                Slot::Free => 0.0,
            })
            .sum();
        let free = space - pinned_total;
        let shares = proportional_shares(items, &slots, free);

        let mut pinned_any = false;
        for (i, share) in shares.iter().enumerate() {
            if let Some(share) = share {
                if *share < items[i].min {
                    slots[i] = Slot::Pinned(items[i].min);
                    pinned_any = true;
                } else {
                    sizes[i] = *share;
                }
            }
        }

        if !pinned_any {
            break;
        }
    }

    for (i, slot) in slots.iter().enumerate() {
        if let Slot::Pinned(v) = slot {
            sizes[i] = *v;
        }
    }

    redistribute_excess(items, &slots, &mut sizes);

    sizes
        .iter()
        .zip(items)
        .map(|(&size, item)| {
            let size = size.floor().max(item.min).max(1.0);
            AxisResult {
                size,
                was_constrained: sits_on_bound(item, size),
            }
        })
        .collect()
}

/// Solve sizes for a tabbed container.
///
/// All tabs share one footprint: the available space (or `fixed` when set)
/// clamped into the tightest range allowed by every item.
pub fn solve_tabbed(items: &[AxisItem], available: f64, fixed: Option<f64>) -> Vec<AxisResult> {
    if items.is_empty() {
        return Vec::new();
    }

    let lower = items.iter().map(|item| item.min).fold(0.0, f64::max);
    let upper = items
        .iter()
        .filter(|item| item.max > 0.0)
        .map(|item| item.max)
        .fold(f64::INFINITY, f64::min)
        .max(lower);

    let base = fixed.unwrap_or(available).max(0.0);
    let shared = base.clamp(lower, upper).floor().max(lower).max(1.0);
    let was_constrained = (lower > 0.0 && (shared - lower).abs() < BOUND_EPSILON)
        || (upper.is_finite() && (shared - upper).abs() < BOUND_EPSILON);

    vec![
        AxisResult {
            size: shared,
            was_constrained,
        };
        items.len()
    ]
}

/// Weighted shares of `free` for every free slot; `None` for pinned slots.
fn proportional_shares(items: &[AxisItem], slots: &[Slot], free: f64) -> Vec<Option<f64>> {
    let free_count = slots.iter().filter(|s| **s == Slot::Free).count();
    let total_weight: f64 = items
        .iter()
        .zip(slots)
        .filter(|(_, slot)| **slot == Slot::Free)
        .map(|(item, _)| item.weight.max(0.0))
        .sum();

    items
        .iter()
        .zip(slots)
        .map(|(item, slot)| match slot {
            Slot::Pinned(_) => None,
            Slot::Free if total_weight > 0.0 => Some(free * item.weight.max(0.0) / total_weight),
            Slot::Free => Some(free / free_count as f64),
        })
        .collect()
}

/// Clamp free items to their maximum and hand the excess to free items that
/// are not on a bound yet.
fn redistribute_excess(items: &[AxisItem], slots: &[Slot], sizes: &mut [f64]) {
    let mut at_bound: Vec<bool> = slots.iter().map(|s| *s != Slot::Free).collect();

    for _ in 0..=items.len() {
        let mut excess = 0.0;
        for (i, item) in items.iter().enumerate() {
            if at_bound[i] {
                continue;
            }
            let upper = item.upper();
            if sizes[i] > upper {
                excess += sizes[i] - upper;
                sizes[i] = upper;
                at_bound[i] = true;
            }
        }

        if excess <= 0.0 {
            return;
        }

        let receivers: Vec<usize> = (0..items.len()).filter(|&i| !at_bound[i]).collect();
        if receivers.is_empty() {
            return;
        }
        let weight: f64 = receivers.iter().map(|&i| items[i].weight.max(0.0)).sum();
        for &i in &receivers {
            let share = if weight > 0.0 {
                excess * items[i].weight.max(0.0) / weight
            } else {
                excess / receivers.len() as f64
            };
            sizes[i] += share;
        }
    }
}

fn sits_on_bound(item: &AxisItem, size: f64) -> bool {
    let on_min = item.min > 0.0 && (size - item.min).abs() < BOUND_EPSILON;
    let on_max = item.max > 0.0 && (size - item.max).abs() < BOUND_EPSILON;
    on_min || on_max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(results: &[AxisResult]) -> Vec<f64> {
        results.iter().map(|r| r.size).collect()
    }

    #[test]
    fn test_three_equal_windows() {
        let items = vec![AxisItem::default(); 3];
        let results = solve(&items, 300.0, 10.0);
        assert_eq!(sizes(&results), vec![93.0, 93.0, 93.0]);
        assert!(results.iter().all(|r| !r.was_constrained));
    }

    #[test]
    fn test_oversubscribed_minimums() {
        let items = vec![AxisItem::weighted(1.0).with_bounds(50.0, 0.0); 2];
        let results = solve(&items, 60.0, 10.0);
        assert_eq!(sizes(&results), vec![50.0, 50.0]);
        assert!(results.iter().all(|r| r.was_constrained));
    }

    #[test]
    fn test_weights_split_proportionally() {
        let items = vec![AxisItem::weighted(1.0), AxisItem::weighted(3.0)];
        let results = solve(&items, 410.0, 10.0);
        assert_eq!(sizes(&results), vec![100.0, 300.0]);
    }

    #[test]
    fn test_min_pins_and_rest_share_remainder() {
        let items = vec![
            AxisItem::weighted(1.0).with_bounds(200.0, 0.0),
            AxisItem::weighted(1.0),
            AxisItem::weighted(1.0),
        ];
        let results = solve(&items, 300.0, 0.0);
        assert_eq!(sizes(&results), vec![200.0, 50.0, 50.0]);
        assert!(results[0].was_constrained);
        assert!(!results[1].was_constrained);
    }

    #[test]
    fn test_max_clamps_and_redistributes() {
        let items = vec![
            AxisItem::weighted(1.0).with_bounds(0.0, 100.0),
            AxisItem::weighted(1.0),
        ];
        let results = solve(&items, 400.0, 0.0);
        assert_eq!(sizes(&results), vec![100.0, 300.0]);
        assert!(results[0].was_constrained);
        assert!(!results[1].was_constrained);
    }

    #[test]
    fn test_fixed_item_is_pinned_and_clamped() {
        let items = vec![
            AxisItem::weighted(1.0).with_bounds(0.0, 150.0).with_fixed(500.0),
            AxisItem::weighted(1.0),
        ];
        let results = solve(&items, 400.0, 0.0);
        assert_eq!(sizes(&results), vec![150.0, 250.0]);
    }

    #[test]
    fn test_rigid_constraint_is_pinned() {
        let items = vec![
            AxisItem::weighted(5.0).with_bounds(120.0, 120.0),
            AxisItem::weighted(1.0),
        ];
        let results = solve(&items, 500.0, 20.0);
        assert_eq!(sizes(&results), vec![120.0, 360.0]);
    }

    #[test]
    fn test_zero_weights_divide_evenly() {
        let items = vec![AxisItem::weighted(0.0); 2];
        let results = solve(&items, 200.0, 0.0);
        assert_eq!(sizes(&results), vec![100.0, 100.0]);
    }

    #[test]
    fn test_degenerate_space_floors_at_one() {
        let items = vec![AxisItem::default(); 3];
        let results = solve(&items, -50.0, 10.0);
        assert_eq!(sizes(&results), vec![1.0, 1.0, 1.0]);

        let results = solve(&items, f64::NAN, 10.0);
        assert!(results.iter().all(|r| r.size == 1.0));
    }

    #[test]
    fn test_conservation_without_max_clamp() {
        let items = vec![
            AxisItem::weighted(1.0),
            AxisItem::weighted(2.5),
            AxisItem::weighted(0.5).with_bounds(40.0, 0.0),
            AxisItem::weighted(1.0),
        ];
        let available = 997.0;
        let gap = 7.0;
        let results = solve(&items, available, gap);
        let total: f64 = results.iter().map(|r| r.size).sum::<f64>() + gap * 3.0;
        // Flooring loses less than one unit per item.
        assert!(total <= available);
        assert!(available - total < items.len() as f64);
    }

    #[test]
    fn test_bounds_hold_for_many_shapes() {
        for available in [0.0, 10.0, 99.0, 250.0, 1000.0, 4321.0] {
            for gap in [0.0, 8.0, 16.0] {
                let items = vec![
                    AxisItem::weighted(1.0).with_bounds(30.0, 200.0),
                    AxisItem::weighted(2.0).with_bounds(60.0, 0.0),
                    AxisItem::weighted(0.5).with_bounds(0.0, 80.0),
                ];
                let results = solve(&items, available, gap);
                for (item, result) in items.iter().zip(&results) {
                    assert!(result.size >= item.min, "{available} {gap} {result:?}");
                    if item.max > 0.0 {
                        assert!(result.size <= item.max, "{available} {gap} {result:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_tabbed_shares_one_footprint() {
        let items = vec![
            AxisItem::weighted(1.0).with_bounds(100.0, 0.0),
            AxisItem::weighted(3.0).with_bounds(200.0, 700.0),
        ];
        let results = solve_tabbed(&items, 900.0, None);
        assert_eq!(sizes(&results), vec![700.0, 700.0]);
        assert!(results.iter().all(|r| r.was_constrained));

        let results = solve_tabbed(&items, 900.0, Some(400.0));
        assert_eq!(sizes(&results), vec![400.0, 400.0]);
        assert!(results.iter().all(|r| !r.was_constrained));

        let results = solve_tabbed(&items, 50.0, None);
        assert_eq!(sizes(&results), vec![200.0, 200.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(solve(&[], 100.0, 10.0).is_empty());
        assert!(solve_tabbed(&[], 100.0, None).is_empty());
    }
}
