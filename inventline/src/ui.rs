//! UI rendering module.
//!
//! Composes the frame: header, timeline with its details panel, the input
//! bar, the system log, and overlays (notice popup, help).

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, LogLevel};
use crate::models::format_year;
use crate::theme::{colors, styles};
use crate::timeline::{TimelineStatusWidget, TimelineWidget};

const HEADER_ROWS: u16 = 3;
const INPUT_ROWS: u16 = 3;
const LOG_ROWS: u16 = 6;
const STATUS_ROWS: u16 = 1;

/// Rows of the frame not available to the timeline body
pub const TIMELINE_CHROME_ROWS: u16 = HEADER_ROWS + INPUT_ROWS + LOG_ROWS + STATUS_ROWS + 2;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Fill background with theme color
    let bg_block = Block::default().style(Style::default().bg(colors::BG_DARK));
    frame.render_widget(bg_block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS),
            Constraint::Min(6),
            Constraint::Length(INPUT_ROWS),
            Constraint::Length(LOG_ROWS),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_logs(frame, app, chunks[3]);

    if app.notice.is_some() {
        render_notice(frame, app, area);
    }

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let status_style = if app.in_flight {
        styles::warning()
    } else {
        styles::text_dim()
    };

    let header = Paragraph::new(Line::from(Span::styled(app.status_text(), status_style))).block(
        Block::default()
            .title(" Inventline ")
            .title_style(styles::title())
            .borders(Borders::ALL)
            .border_style(styles::border())
            .style(Style::default().bg(colors::BG_MEDIUM)),
    );

    frame.render_widget(header, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(STATUS_ROWS)])
        .split(columns[0]);

    let title = if app.focus == Focus::Timeline {
        " ✦ Invention Timeline [nav] "
    } else {
        " ✦ Invention Timeline "
    };
    frame.render_widget(TimelineWidget::new(&app.timeline).title(title), left[0]);
    frame.render_widget(TimelineStatusWidget::new(&app.timeline), left[1]);

    render_entry_details(frame, app, columns[1]);
}

fn render_entry_details(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_accent())
        .borders(Borders::ALL)
        .border_style(styles::border())
        .style(Style::default().bg(colors::BG_MEDIUM));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = app.timeline.layout();
    let Some(selected) = app.timeline.selected_entry() else {
        let msg = vec![
            Line::from("Nothing selected"),
            Line::from(""),
            Line::from(Span::styled(
                "Add an invention, then use Up/Down",
                styles::text_dim(),
            )),
        ];
        frame.render_widget(
            Paragraph::new(msg)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    };

    let index = app.timeline.selected.unwrap_or(0);
    let year = i64::from(selected.entry.year);
    let since_earliest = year - layout.min_year;

    let mut lines = vec![
        Line::from(Span::styled(
            selected.entry.display_label(),
            Style::default()
                .fg(colors::FG_PRIMARY)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )),
        Line::from(Span::styled(selected.entry.display_date(), styles::info())),
        Line::from(""),
        Line::from(vec![
            Span::raw("Order:    "),
            Span::styled(
                format!("{} of {}", index + 1, layout.entries.len()),
                styles::text(),
            ),
        ]),
        Line::from(vec![
            Span::raw("Added:    "),
            Span::styled(format!("#{}", selected.source_index + 1), styles::text()),
        ]),
        Line::from(vec![
            Span::raw("Offset:   "),
            Span::styled(
                format!("{:.0} / {:.0} px", selected.position, layout.height),
                styles::text(),
            ),
        ]),
        Line::from(vec![
            Span::raw("Since 1st:"),
            Span::styled(format!(" {} yrs", since_earliest), styles::text()),
        ]),
        Line::from(""),
    ];

    let neighbour = |offset: isize| -> Option<Line<'static>> {
        let i = index.checked_add_signed(offset)?;
        let other = layout.entries.get(i)?;
        let gap = (i64::from(other.entry.year) - year).abs();
        let label = if offset < 0 { "Before:   " } else { "After:    " };
        Some(Line::from(vec![
            Span::raw(label),
            Span::styled(other.entry.display_label(), styles::text()),
            Span::styled(format!(" ({} yrs)", gap), styles::text_dim()),
        ]))
    };
    lines.extend(neighbour(-1));
    lines.extend(neighbour(1));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "Axis {} → {}",
            format_year(layout.min_year as i32),
            format_year(layout.max_year as i32)
        ),
        styles::text_hint(),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "{} px/yr, min gap {} px",
            app.timeline.constants().scale_factor,
            app.timeline.constants().min_gap
        ),
        styles::text_hint(),
    )));

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        inner.inner(ratatui::layout::Margin::new(1, 0)),
    );
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Input;

    let title = match app.busy_indicator() {
        Some(spinner) => format!(" {} Looking up... ", spinner),
        None => " Add invention (Enter) ".to_string(),
    };

    let (style, border) = if app.in_flight {
        (styles::input_busy(), styles::border_dim())
    } else if focused {
        (styles::input_focused(), styles::border_focused())
    } else {
        (styles::text_dim(), styles::border())
    };

    let cursor = if focused && !app.in_flight { "█" } else { "" };
    let text = if app.input.is_empty() && !focused {
        Line::from(Span::styled(" press Tab to type", styles::text_hint()))
    } else {
        Line::from(Span::raw(format!(" {}{}", app.input, cursor)))
    };

    let input = Paragraph::new(text).style(style).block(
        Block::default()
            .title(title)
            .title_style(if app.in_flight {
                styles::warning()
            } else {
                styles::title()
            })
            .borders(Borders::ALL)
            .border_style(border),
    );

    frame.render_widget(input, area);
}

/// Render the log area
fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take(area.height.saturating_sub(2) as usize)
        .map(|entry| {
            let (prefix, color) = level_marker(entry.level);

            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.timestamp.format("%H:%M:%S ").to_string(),
                    styles::text_hint(),
                ),
                Span::styled(format!("[{}] ", prefix), Style::default().fg(color)),
                Span::styled(entry.message.as_str(), styles::text_dim()),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" System Log ")
            .title_style(Style::default().fg(colors::FG_DIM))
            .borders(Borders::ALL)
            .border_style(styles::border_dim())
            .style(Style::default().bg(colors::BG_DARK)),
    );

    frame.render_widget(list, area);
}

fn level_marker(level: LogLevel) -> (&'static str, Color) {
    match level {
        LogLevel::Info => ("i", colors::BLUE),
        LogLevel::Success => ("+", colors::GREEN),
        LogLevel::Warning => ("!", colors::YELLOW),
        LogLevel::Error => ("x", colors::RED),
    }
}

/// Render the notice popup
fn render_notice(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = &app.notice else {
        return;
    };

    let popup_area = centered_rect(52, 7, area);
    frame.render_widget(Clear, popup_area);

    let (_, accent) = level_marker(notice.level);

    let block = Block::default()
        .title(format!(" {} ", notice.title))
        .title_style(
            Style::default()
                .fg(Color::White)
                .bg(accent)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(colors::BG_NOTICE));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = Paragraph::new(notice.message.as_str())
        .style(styles::text())
        .wrap(Wrap { trim: true });
    frame.render_widget(text, inner);

    // Dismiss hint
    let hint = Paragraph::new("Press ESC or ENTER to dismiss")
        .style(styles::text_hint())
        .alignment(Alignment::Center);

    let hint_area = Rect::new(
        popup_area.x,
        popup_area.y + popup_area.height.saturating_sub(1),
        popup_area.width,
        1,
    );
    frame.render_widget(hint, hint_area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(56, 20, area);
    frame.render_widget(Clear, popup_area);

    let section = |name: &'static str| {
        Line::from(Span::styled(
            name,
            Style::default()
                .fg(colors::PURPLE)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let binding = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<16}", keys), Style::default().fg(colors::BLUE)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(colors::BLUE)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Input"),
        binding("Type text", "Name an invention"),
        binding("Enter", "Look up its year and add it"),
        binding("Esc / Tab", "Switch to timeline navigation"),
        Line::from(""),
        section("Timeline"),
        binding("j/k or Up/Down", "Select next / previous"),
        binding("g/G or Home/End", "First / last invention"),
        binding("PgUp/PgDn", "Scroll a page"),
        binding("Tab / Enter / i", "Back to input"),
        Line::from(""),
        section("General"),
        binding("F1 / ?", "Toggle this help"),
        binding("q", "Quit (timeline focus)"),
        binding("Ctrl+C", "Quit"),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .title_style(styles::title())
                .borders(Borders::ALL)
                .border_style(styles::border())
                .style(Style::default().bg(colors::BG_MEDIUM)),
        )
        .style(styles::text());

    frame.render_widget(paragraph, popup_area);
}

/// Helper to create a centered rectangle
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
