//! Timeline scaling and layout.
//!
//! Turns a set of `(label, year)` entries into a vertically scaled layout:
//! a total height, one pixel offset per entry, and tick markers at a
//! range-dependent interval. The layout is a pure function of the entries
//! and [`LayoutConstants`], and is re-derived from scratch on every change.
//!
//! Pixels here are abstract layout units; the timeline widget projects them
//! onto terminal rows.

use crate::models::TimelineEntry;

/// Default pixels per year
pub const DEFAULT_SCALE_FACTOR: f64 = 0.1;
/// Default minimum pixels reserved per entry
pub const DEFAULT_MIN_GAP: f64 = 50.0;

/// Layout tuning, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstants {
    /// Pixels per year
    pub scale_factor: f64,
    /// Minimum pixels between adjacent entries
    pub min_gap: f64,
}

impl Default for LayoutConstants {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_gap: DEFAULT_MIN_GAP,
        }
    }
}

/// Axis tick at a round year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMarker {
    pub year: i64,
    pub position: f64,
}

/// An entry with its vertical offset from the top of the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedEntry {
    pub entry: TimelineEntry,
    /// Index of the entry in the input slice (insertion order)
    pub source_index: usize,
    pub position: f64,
}

/// Result of one layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineLayout {
    pub min_year: i64,
    pub max_year: i64,
    pub range: i64,
    /// Total rendered height in pixels
    pub height: f64,
    /// Years between ticks
    pub interval: i64,
    pub ticks: Vec<ScaleMarker>,
    /// Entries sorted by year ascending, ties in insertion order
    pub entries: Vec<PositionedEntry>,
}

impl TimelineLayout {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index into `entries` of the entry that came from `source_index`
    pub fn sorted_index_of(&self, source_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|p| p.source_index == source_index)
    }
}

/// Tick spacing for a year range.
///
/// Thresholds are exclusive: a range of exactly 10000 gets 1000, not 2000.
pub fn calculate_scale_interval(range: i64) -> i64 {
    match range {
        r if r > 10_000 => 2000,
        r if r > 5_000 => 1000,
        r if r > 2_000 => 500,
        r if r > 1_000 => 200,
        r if r > 500 => 100,
        _ => 50,
    }
}

/// A zero range anchors everything at the top.
fn normalized_position(year: i64, min_year: i64, range: i64, height: f64) -> f64 {
    if range == 0 {
        return 0.0;
    }
    (year - min_year) as f64 / range as f64 * height
}

/// First multiple of `interval` that is >= `min_year`
fn first_tick(min_year: i64, interval: i64) -> i64 {
    let aligned = min_year.div_euclid(interval) * interval;
    if aligned < min_year {
        aligned + interval
    } else {
        aligned
    }
}

/// Lay out `entries` on a vertical axis.
///
/// An empty input yields an empty layout. Never fails.
pub fn compute_layout(entries: &[TimelineEntry], constants: &LayoutConstants) -> TimelineLayout {
    if entries.is_empty() {
        return TimelineLayout::default();
    }

    let mut order: Vec<usize> = (0..entries.len()).collect();
    // stable: equal years keep insertion order
    order.sort_by_key(|&i| entries[i].year);

    let min_year = i64::from(entries[order[0]].year);
    let max_year = i64::from(entries[order[order.len() - 1]].year);
    let range = max_year - min_year;

    let height = (range as f64 * constants.scale_factor)
        .max(entries.len() as f64 * constants.min_gap);

    let interval = calculate_scale_interval(range);
    let mut ticks = Vec::new();
    let mut year = first_tick(min_year, interval);
    while year <= max_year {
        ticks.push(ScaleMarker {
            year,
            position: normalized_position(year, min_year, range, height),
        });
        year += interval;
    }

    let positioned = order
        .into_iter()
        .map(|i| {
            let entry = entries[i].clone();
            let position = normalized_position(i64::from(entry.year), min_year, range, height);
            PositionedEntry {
                entry,
                source_index: i,
                position,
            }
        })
        .collect();

    TimelineLayout {
        min_year,
        max_year,
        range,
        height,
        interval,
        ticks,
        entries: positioned,
    }
}
