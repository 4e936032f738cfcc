//! Kanagawa Dragon theme module.
//!
//! A low-contrast, warm, dark palette. Inventions get their own bright
//! rotating colors so neighbouring entries stay distinguishable.

use ratatui::style::Color;

/// Kanagawa Dragon color palette
pub mod colors {
    use super::Color;

    // === Background Colors ===
    /// Dragon Black - Primary background
    pub const BG_DARK: Color = Color::Rgb(0x18, 0x16, 0x16);
    /// Panels and bars
    pub const BG_MEDIUM: Color = Color::Rgb(0x1D, 0x1C, 0x19);
    /// Focused input background
    pub const BG_HIGHLIGHT: Color = Color::Rgb(0x28, 0x27, 0x27);
    /// Notice popup background
    pub const BG_NOTICE: Color = Color::Rgb(0x2A, 0x18, 0x18);

    // === Foreground Colors ===
    /// Old White - Primary text color
    pub const FG_PRIMARY: Color = Color::Rgb(0xC5, 0xC9, 0xC5);
    /// Secondary information
    pub const FG_DIM: Color = Color::Rgb(0x72, 0x71, 0x69);
    /// Hints and placeholders
    pub const FG_HINT: Color = Color::Rgb(0x54, 0x54, 0x54);

    // === Accent Colors ===
    pub const RED: Color = Color::Rgb(0xC4, 0x74, 0x6E);
    pub const GREEN: Color = Color::Rgb(0x8A, 0x9A, 0x7B);
    pub const YELLOW: Color = Color::Rgb(0xC4, 0xB2, 0x8A);
    pub const BLUE: Color = Color::Rgb(0x8B, 0xA4, 0xB0);
    pub const PURPLE: Color = Color::Rgb(0x95, 0x7F, 0xB8);

    // === UI Element Colors ===
    /// Wall Gray - borders and the timeline axis
    pub const BORDER: Color = Color::Rgb(0x72, 0x71, 0x69);
    /// Tick rules and separators
    pub const BORDER_DIM: Color = Color::Rgb(0x3A, 0x3A, 0x3A);
    /// Focused input border
    pub const BORDER_ACCENT: Color = Color::Rgb(0x8B, 0xA4, 0xB0);
}

/// Bullet colors for timeline entries, cycled by insertion order
pub const ENTRY_COLORS: &[Color] = &[
    Color::Rgb(0x7A, 0xA2, 0xF7), // blue
    Color::Rgb(0x9E, 0xCE, 0x6A), // green
    Color::Rgb(0xE0, 0xAF, 0x68), // gold
    Color::Rgb(0xBB, 0x9A, 0xF7), // purple
    Color::Rgb(0xFF, 0x9E, 0x64), // orange
    Color::Rgb(0xF7, 0x76, 0x8E), // pink
    Color::Rgb(0x73, 0xDA, 0xCA), // teal
    Color::Rgb(0xC0, 0xCA, 0xF5), // lavender
];

/// Color for the entry inserted at `index`
pub fn entry_color(index: usize) -> Color {
    ENTRY_COLORS[index % ENTRY_COLORS.len()]
}

/// Semantic styling helpers
pub mod styles {
    use super::colors;
    use ratatui::style::{Modifier, Style};

    pub fn text() -> Style {
        Style::default().fg(colors::FG_PRIMARY)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn text_hint() -> Style {
        Style::default().fg(colors::FG_HINT)
    }

    pub fn warning() -> Style {
        Style::default().fg(colors::YELLOW)
    }

    pub fn info() -> Style {
        Style::default().fg(colors::BLUE)
    }

    pub fn border() -> Style {
        Style::default().fg(colors::BORDER)
    }

    pub fn border_dim() -> Style {
        Style::default().fg(colors::BORDER_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(colors::BORDER_ACCENT)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title_accent() -> Style {
        Style::default()
            .fg(colors::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    /// Input field while accepting text
    pub fn input_focused() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .bg(colors::BG_HIGHLIGHT)
    }

    /// Input field while a lookup is running
    pub fn input_busy() -> Style {
        Style::default().fg(colors::FG_DIM).bg(colors::BG_MEDIUM)
    }
}
