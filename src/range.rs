use serde::Deserialize;
use serde::Serialize;

/// Component of a [Range].
///
/// Can be an interval, a stepped interval, or an individual value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RangeItem {
    /// Interval (inclusive).
    Interval(f64, f64),
    /// Exact value.
    Value(f64),
    /// Interval (inclusive) that only accepts `min + n * step`.
    Step(f64, f64, f64),
}

impl RangeItem {
    fn contains(&self, value: f64) -> bool {
        match *self {
            RangeItem::Interval(a, b) => a <= value && value <= b,
            RangeItem::Value(v) => (v - value).abs() <= f64::EPSILON,
            RangeItem::Step(min, max, step) => {
                if value < min || value > max {
                    return false;
                }
                let n = ((value - min) / step).round();
                (min + n * step - value).abs() <= f64::EPSILON * value.abs().max(1.0)
            }
        }
    }

    fn closest(&self, value: f64) -> f64 {
        match *self {
            RangeItem::Interval(a, b) => value.clamp(a, b),
            RangeItem::Value(v) => v,
            RangeItem::Step(min, max, step) => {
                let clamped = value.clamp(min, max);
                let v = min + ((clamped - min) / step).round() * step;
                if v > max {
                    v - step
                } else {
                    v
                }
            }
        }
    }
}

/// Set of admissible values, e.g., the tuning range of a VFO or the granularity of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    items: Vec<RangeItem>,
}

impl Range {
    /// Create a [`Range`] from [`RangeItems`](RangeItem).
    pub fn new(items: Vec<RangeItem>) -> Self {
        Self { items }
    }
    /// Single inclusive interval.
    pub fn interval(min: f64, max: f64) -> Self {
        Self::new(vec![RangeItem::Interval(min, max)])
    }
    /// Check if the [`Range`] contains the `value`.
    pub fn contains(&self, value: f64) -> bool {
        self.items.iter().any(|i| i.contains(value))
    }
    /// Returns the value in [`Range`] that is closest to the given `value` or `None`, if the
    /// [`Range`] is empty.
    pub fn closest(&self, value: f64) -> Option<f64> {
        if self.contains(value) {
            return Some(value);
        }
        self.items
            .iter()
            .map(|i| i.closest(value))
            .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
    }
    /// Smallest and largest admissible value.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.items
            .iter()
            .map(|i| match *i {
                RangeItem::Interval(a, b) | RangeItem::Step(a, b, _) => (a, b),
                RangeItem::Value(v) => (v, v),
            })
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
    }
    /// Merges two [`Ranges`](Range).
    pub fn merge(&mut self, mut r: Range) {
        self.items.append(&mut r.items)
    }
}
