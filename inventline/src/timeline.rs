//! Timeline widget for the invention axis.
//!
//! `TimelineState` owns the entry set and the layout derived from it;
//! every change re-runs [`compute_layout`]. `TimelineWidget` projects the
//! layout's pixel offsets onto terminal rows and draws:
//! - a vertical axis with tick labels at round years
//! - one colored bullet per invention, in year order
//! - the current selection with an animated marker

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::layout::{compute_layout, LayoutConstants, PositionedEntry, ScaleMarker, TimelineLayout};
use crate::models::{format_year, TimelineEntry};
use crate::theme::{colors, entry_color, styles};

/// Default layout pixels per terminal row (a 50px gap is two rows)
pub const DEFAULT_PIXELS_PER_ROW: f64 = 25.0;

/// Width of the tick label column, axis glyph included
const AXIS_WIDTH: u16 = 12;

const AXIS_LINE: char = '│';
const AXIS_TICK: char = '┼';
const TICK_RULE: char = '╌';
const ENTRY_BULLET: char = '●';
const SPARKLE_CHARS: [char; 4] = ['✦', '✧', '⋆', '★'];

/// What occupies a projected row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowItem {
    Tick(ScaleMarker),
    /// Index into the layout's sorted entries
    Entry(usize),
}

/// A layout element placed on a terminal row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedRow {
    pub row: usize,
    pub item: RowItem,
}

/// Project a layout onto terminal rows.
///
/// Entries that would land on an occupied row are pushed down to the next
/// free one, so row order always follows year order. Ticks that collide
/// with an earlier tick are dropped.
pub fn project_rows(layout: &TimelineLayout, pixels_per_row: f64) -> Vec<ProjectedRow> {
    let to_row = |position: f64| (position / pixels_per_row).floor().max(0.0) as usize;
    let mut rows = Vec::with_capacity(layout.ticks.len() + layout.entries.len());

    let mut last_tick_row = None;
    for tick in &layout.ticks {
        let row = to_row(tick.position);
        if last_tick_row == Some(row) {
            continue;
        }
        last_tick_row = Some(row);
        rows.push(ProjectedRow {
            row,
            item: RowItem::Tick(*tick),
        });
    }

    let mut next_free = 0usize;
    for (index, positioned) in layout.entries.iter().enumerate() {
        let row = to_row(positioned.position).max(next_free);
        next_free = row + 1;
        rows.push(ProjectedRow {
            row,
            item: RowItem::Entry(index),
        });
    }

    rows
}

/// Timeline widget state
#[derive(Debug, Clone)]
pub struct TimelineState {
    /// Entries in insertion order
    entries: Vec<TimelineEntry>,
    constants: LayoutConstants,
    layout: TimelineLayout,
    rows: Vec<ProjectedRow>,
    pixels_per_row: f64,
    /// Selected index into the sorted layout entries
    pub selected: Option<usize>,
    /// First visible row
    pub scroll_offset: usize,
    /// Rows available to the timeline body, updated from the terminal size
    pub viewport_rows: usize,
    /// Animation frame counter for effects
    pub animation_frame: u64,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new(LayoutConstants::default(), DEFAULT_PIXELS_PER_ROW)
    }
}

impl TimelineState {
    pub fn new(constants: LayoutConstants, pixels_per_row: f64) -> Self {
        Self {
            entries: Vec::new(),
            constants,
            layout: TimelineLayout::default(),
            rows: Vec::new(),
            pixels_per_row,
            selected: None,
            scroll_offset: 0,
            viewport_rows: 20,
            animation_frame: 0,
        }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn layout(&self) -> &TimelineLayout {
        &self.layout
    }

    pub fn rows(&self) -> &[ProjectedRow] {
        &self.rows
    }

    pub fn constants(&self) -> &LayoutConstants {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total projected rows, including the trailing tick area
    pub fn total_rows(&self) -> usize {
        if self.layout.is_empty() {
            return 0;
        }
        let by_height = (self.layout.height / self.pixels_per_row).floor() as usize;
        let by_rows = self.rows.iter().map(|r| r.row).max().unwrap_or(0);
        by_height.max(by_rows) + 1
    }

    /// Append an entry, re-derive the layout and select the new entry
    pub fn push(&mut self, entry: TimelineEntry) {
        self.entries.push(entry);
        self.relayout();
        let source = self.entries.len() - 1;
        self.selected = self.layout.sorted_index_of(source);
        self.ensure_selected_visible();
    }

    /// Append several entries with a single relayout; selection is unchanged
    pub fn extend(&mut self, entries: impl IntoIterator<Item = TimelineEntry>) {
        self.entries.extend(entries);
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = compute_layout(&self.entries, &self.constants);
        self.rows = project_rows(&self.layout, self.pixels_per_row);
    }

    /// Currently selected entry with its position
    pub fn selected_entry(&self) -> Option<&PositionedEntry> {
        self.layout.entries.get(self.selected?)
    }

    /// Row of a sorted entry
    pub fn entry_row(&self, index: usize) -> Option<usize> {
        self.rows.iter().find_map(|r| match r.item {
            RowItem::Entry(i) if i == index => Some(r.row),
            _ => None,
        })
    }

    /// Move selection up
    pub fn select_previous(&mut self) {
        let total = self.layout.entries.len();
        if total == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i > 0 => i - 1,
            Some(_) => total - 1,
            None => 0,
        });
        self.ensure_selected_visible();
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        let total = self.layout.entries.len();
        if total == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i < total - 1 => i + 1,
            Some(_) => 0,
            None => 0,
        });
        self.ensure_selected_visible();
    }

    pub fn select_first(&mut self) {
        if !self.layout.is_empty() {
            self.selected = Some(0);
        }
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        if let Some(last) = self.layout.entries.len().checked_sub(1) {
            self.selected = Some(last);
            self.ensure_selected_visible();
        }
    }

    /// Scroll towards earlier years
    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// Scroll towards later years
    pub fn scroll_down(&mut self, amount: usize) {
        let max_offset = self.total_rows().saturating_sub(self.viewport_rows.max(1));
        self.scroll_offset = (self.scroll_offset + amount).min(max_offset);
    }

    /// Adjust scroll so the selected entry's row is inside the viewport
    pub fn ensure_selected_visible(&mut self) {
        let Some(row) = self.selected.and_then(|i| self.entry_row(i)) else {
            return;
        };
        let viewport = self.viewport_rows.max(1);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + viewport {
            self.scroll_offset = row + 1 - viewport;
        }
    }

    /// Advance animation frame
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }
}

/// Vertical timeline widget
pub struct TimelineWidget<'a> {
    state: &'a TimelineState,
    title: &'a str,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(state: &'a TimelineState) -> Self {
        Self {
            state,
            title: " ✦ Invention Timeline ",
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    fn render_axis(&self, area: Rect, buf: &mut Buffer) {
        let axis_x = area.x + AXIS_WIDTH - 1;
        let visible_rows = self.state.total_rows().saturating_sub(self.state.scroll_offset);
        for y in 0..area.height.min(visible_rows as u16) {
            buf[(axis_x, area.y + y)]
                .set_char(AXIS_LINE)
                .set_style(styles::border());
        }
    }

    fn render_tick(&self, area: Rect, buf: &mut Buffer, y: u16, tick: &ScaleMarker) {
        let label = format_year_wide(tick.year);
        let label_width = AXIS_WIDTH.saturating_sub(2) as usize;
        let text = format!("{:>width$}", label, width = label_width);
        buf.set_stringn(area.x, y, &text, label_width, styles::text_dim());

        let axis_x = area.x + AXIS_WIDTH - 1;
        buf[(axis_x, y)]
            .set_char(AXIS_TICK)
            .set_style(Style::default().fg(colors::BORDER));

        // Faint rule across the body, drawn first so entries overwrite it
        let rule_start = axis_x + 1;
        for x in rule_start..area.x + area.width {
            buf[(x, y)]
                .set_char(TICK_RULE)
                .set_style(Style::default().fg(colors::BORDER_DIM));
        }
    }

    fn render_entry(&self, area: Rect, buf: &mut Buffer, y: u16, index: usize) {
        let Some(positioned) = self.state.layout().entries.get(index) else {
            return;
        };
        let is_selected = self.state.selected == Some(index);
        let color = entry_color(positioned.source_index);
        let axis_x = area.x + AXIS_WIDTH - 1;

        let bullet = if is_selected {
            let sparkle_idx = (self.state.animation_frame / 4) as usize % SPARKLE_CHARS.len();
            SPARKLE_CHARS[sparkle_idx]
        } else {
            ENTRY_BULLET
        };
        buf[(axis_x, y)].set_char(bullet).set_style(
            Style::default()
                .fg(if is_selected { colors::YELLOW } else { color })
                .add_modifier(Modifier::BOLD),
        );

        let body_x = axis_x + 2;
        let body_width = (area.x + area.width).saturating_sub(body_x) as usize;
        if body_width == 0 {
            return;
        }

        // clear any tick rule under the text
        for x in axis_x + 1..area.x + area.width {
            buf[(x, y)].set_char(' ').set_style(Style::default());
        }

        let label = positioned.entry.display_label();
        let date = positioned.entry.display_date();
        let label_style = if is_selected {
            Style::default()
                .fg(colors::BG_DARK)
                .bg(color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors::FG_PRIMARY)
        };

        let (x, _) = buf.set_stringn(body_x, y, format!(" {} ", label), body_width, label_style);
        let used = (x - body_x) as usize;
        if used + 2 < body_width {
            buf.set_stringn(
                x + 1,
                y,
                &date,
                body_width - used - 1,
                Style::default().fg(color),
            );
        }
    }
}

/// Tick label, padded so BCE and CE labels line up
fn format_year_wide(year: i64) -> String {
    match i32::try_from(year) {
        Ok(year) => format_year(year),
        Err(_) if year < 0 => format!("{} BCE", year.unsigned_abs()),
        Err(_) => format!("{} CE", year),
    }
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .title_style(
                Style::default()
                    .fg(colors::PURPLE)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(styles::border())
            .style(Style::default().bg(colors::BG_DARK));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < AXIS_WIDTH + 4 || inner.height < 1 {
            return;
        }

        if self.state.is_empty() {
            let hint = "Type an invention below and press Enter";
            let x = inner.x + inner.width.saturating_sub(hint.len() as u16) / 2;
            let y = inner.y + inner.height / 2;
            buf.set_stringn(x, y, hint, inner.width as usize, styles::text_hint());
            return;
        }

        self.render_axis(inner, buf);

        let offset = self.state.scroll_offset;
        let visible = offset..offset + inner.height as usize;

        // ticks first, entries on top
        for projected in self.state.rows() {
            if let RowItem::Tick(tick) = &projected.item {
                if visible.contains(&projected.row) {
                    let y = inner.y + (projected.row - offset) as u16;
                    self.render_tick(inner, buf, y, tick);
                }
            }
        }
        for projected in self.state.rows() {
            if let RowItem::Entry(index) = projected.item {
                if visible.contains(&projected.row) {
                    let y = inner.y + (projected.row - offset) as u16;
                    self.render_entry(inner, buf, y, index);
                }
            }
        }

        // Scroll hints in the borders
        if offset > 0 {
            buf.set_string(area.x + area.width - 4, area.y, "▲ k", styles::text_hint());
        }
        if self.state.total_rows() > offset + inner.height as usize {
            buf.set_string(
                area.x + area.width - 4,
                area.y + area.height - 1,
                "▼ j",
                styles::text_hint(),
            );
        }
    }
}

/// One-line summary under the timeline
pub struct TimelineStatusWidget<'a> {
    state: &'a TimelineState,
}

impl<'a> TimelineStatusWidget<'a> {
    pub fn new(state: &'a TimelineState) -> Self {
        Self { state }
    }
}

impl Widget for TimelineStatusWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let layout = self.state.layout();
        let count = format!("{} inventions", self.state.len());
        let span = if layout.is_empty() {
            "span -".to_string()
        } else {
            format!("span {} yrs", layout.range)
        };
        let ticks = if layout.is_empty() {
            "ticks -".to_string()
        } else {
            format!("ticks every {} yrs", layout.interval)
        };
        let selected = self
            .state
            .selected
            .map(|i| format!("▸ #{}", i + 1))
            .unwrap_or_else(|| "▸ none".to_string());

        let status = format!("{}  {}  {}  {}", count, span, ticks, selected);
        buf.set_stringn(
            area.x,
            area.y,
            &status,
            area.width as usize,
            Style::default().fg(colors::FG_DIM),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn state_with(entries: &[(&str, i32)]) -> TimelineState {
        let mut state = TimelineState::default();
        for (label, year) in entries {
            state.push(TimelineEntry::new(*label, *year));
        }
        state
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_push_selects_new_entry() {
        let mut state = state_with(&[("internet", 1969), ("wheel", -3500)]);
        assert_eq!(state.selected, Some(0));

        state.push(TimelineEntry::new("printing press", 1440));
        assert_eq!(state.selected, Some(1));
        assert_eq!(state.selected_entry().unwrap().entry.label, "printing press");
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_project_rows_keeps_year_order() {
        // all three collapse into the first rows by position; nudging separates them
        let layout = compute_layout(
            &[
                TimelineEntry::new("a", 1900),
                TimelineEntry::new("b", 1900),
                TimelineEntry::new("c", 1901),
            ],
            &LayoutConstants::default(),
        );
        let rows = project_rows(&layout, 100.0);
        let entry_rows: Vec<usize> = rows
            .iter()
            .filter_map(|r| match r.item {
                RowItem::Entry(_) => Some(r.row),
                _ => None,
            })
            .collect();
        assert_eq!(entry_rows, vec![0, 1, 2]);
    }

    #[test]
    fn test_project_rows_drops_colliding_ticks() {
        let layout = compute_layout(
            &[TimelineEntry::new("a", 0), TimelineEntry::new("b", 400)],
            &LayoutConstants::default(),
        );
        // 9 ticks over 100px; at 25px per row most share a row
        let rows = project_rows(&layout, 25.0);
        let tick_rows: Vec<usize> = rows
            .iter()
            .filter_map(|r| match r.item {
                RowItem::Tick(_) => Some(r.row),
                _ => None,
            })
            .collect();
        let mut deduped = tick_rows.clone();
        deduped.dedup();
        assert_eq!(tick_rows, deduped);
        assert_eq!(tick_rows.first(), Some(&0));
    }

    #[test]
    fn test_selection_wraps() {
        let mut state = state_with(&[("wheel", -3500), ("radio", 1895)]);
        state.select_first();
        state.select_previous();
        assert_eq!(state.selected, Some(1));
        state.select_next();
        assert_eq!(state.selected, Some(0));

        let mut empty = TimelineState::default();
        empty.select_next();
        assert_eq!(empty.selected, None);
    }

    #[test]
    fn test_selected_entry_scrolled_into_view() {
        let mut state = state_with(&[("wheel", -3500), ("internet", 1969)]);
        state.viewport_rows = 5;
        state.select_first();
        assert_eq!(state.scroll_offset, 0);

        state.select_last();
        let row = state.entry_row(1).unwrap();
        assert!(row >= state.scroll_offset && row < state.scroll_offset + 5);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut state = state_with(&[("wheel", -3500), ("internet", 1969)]);
        state.viewport_rows = 5;
        state.scroll_up(10);
        assert_eq!(state.scroll_offset, 0);
        state.scroll_down(10_000);
        assert_eq!(state.scroll_offset, state.total_rows() - 5);
    }

    #[test]
    fn test_widget_renders_entries_and_ticks() {
        let mut state = state_with(&[
            ("wheel", -3500),
            ("printing press", 1440),
            ("internet", 1969),
        ]);
        state.select_first();
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(TimelineWidget::new(&state), frame.area()))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Wheel"));
        assert!(text.contains("3500 BCE"));
        assert!(text.contains("3000 BCE"));
        assert!(text.contains("0 CE"));
        assert!(text.find("Wheel").unwrap() < text.find("Printing press").unwrap());
        assert!(text.find("Printing press").unwrap() < text.find("Internet").unwrap());
    }

    #[test]
    fn test_widget_empty_state() {
        let state = TimelineState::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(TimelineWidget::new(&state), frame.area()))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Type an invention"));
    }

    #[test]
    fn test_widget_tiny_area_does_not_panic() {
        let state = state_with(&[("wheel", -3500)]);
        let mut terminal = Terminal::new(TestBackend::new(8, 3)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(TimelineWidget::new(&state), frame.area()))
            .unwrap();
    }
}
