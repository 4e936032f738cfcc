//! Application state and event handling.
//!
//! `App` is the single state object for the session: the input field, the
//! timeline entries, notices, and the system log. Key events come in through
//! [`App::handle_key`] and may produce a [`LookupCommand`] for the worker;
//! lookup results come back through [`App::handle_lookup_message`].
//!
//! Only one lookup may be outstanding. The `in_flight` flag is set when a
//! lookup command is issued and cleared when its result arrives, whatever
//! the outcome.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::SubmitError;
use crate::lookup::{LookupCommand, LookupMessage};
use crate::models::{format_year, reference_entries, TimelineEntry};
use crate::timeline::TimelineState;

/// Notice shown when the lookup has no answer
pub const NOT_FOUND_MESSAGE: &str = "Sorry, we couldn't find reliable information for this item";

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Lowercase and trim raw input into a timeline label
pub fn normalize_input(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Which pane receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Typing into the input bar (default)
    #[default]
    Input,
    /// Navigating the timeline
    Timeline,
}

impl Focus {
    pub fn toggle(&self) -> Self {
        match self {
            Focus::Input => Focus::Timeline,
            Focus::Timeline => Focus::Input,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Focus::Input => "Input",
            Focus::Timeline => "Timeline",
        }
    }
}

/// Severity of a log entry or notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Log entry for the system log panel
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub level: LogLevel,
}

impl LogEntry {
    fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
            level,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

/// User-facing popup notice
#[derive(Debug, Clone)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub level: LogLevel,
    /// When the notice was shown
    pub shown_at: Instant,
    /// Auto-dismiss duration (None for manual dismiss)
    pub auto_dismiss: Option<Duration>,
}

impl Notice {
    pub fn new(level: LogLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level,
            shown_at: Instant::now(),
            auto_dismiss: Some(Duration::from_secs(5)),
        }
    }

    pub fn should_dismiss(&self) -> bool {
        self.auto_dismiss
            .map_or(false, |duration| self.shown_at.elapsed() > duration)
    }
}

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Pane receiving key presses
    pub focus: Focus,

    /// Raw text in the input bar
    pub input: String,

    /// A lookup has been issued and its result has not arrived yet
    pub in_flight: bool,

    /// Entries, layout, selection and scroll
    pub timeline: TimelineState,

    /// Current notice popup (if any)
    pub notice: Option<Notice>,

    /// Log messages
    pub logs: Vec<LogEntry>,
    /// Maximum number of log entries to keep
    max_logs: usize,

    /// Name of the lookup backend, for the header
    pub backend_name: String,

    /// Frame counter for animations
    pub frame_count: u64,

    /// Show help overlay
    pub show_help: bool,
}

impl App {
    /// Create a new application around an (optionally pre-filled) timeline
    pub fn new(timeline: TimelineState, backend_name: impl Into<String>) -> Self {
        let backend_name = backend_name.into();
        let mut app = Self {
            should_quit: false,
            focus: Focus::Input,
            input: String::new(),
            in_flight: false,
            timeline,
            notice: None,
            logs: Vec::new(),
            max_logs: 100,
            backend_name,
            frame_count: 0,
            show_help: false,
        };

        app.log(LogEntry::info(format!(
            "Inventline ready, looking up years via the {} backend",
            app.backend_name
        )));
        app
    }

    /// Add the built-in reference inventions to the timeline
    pub fn seed_reference(&mut self) {
        let entries = reference_entries();
        let count = entries.len();
        self.timeline.extend(entries);
        self.timeline.select_first();
        self.log(LogEntry::info(format!("Seeded {} reference inventions", count)));
    }

    /// Add a log entry
    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.logs.len() > self.max_logs {
            self.logs.remove(0);
        }
    }

    /// Show a notice popup and record it in the log
    pub fn show_notice(&mut self, level: LogLevel, title: impl Into<String>, message: impl Into<String>) {
        let notice = Notice::new(level, title, message);
        self.log(LogEntry::new(level, format!("{}: {}", notice.title, notice.message)));
        self.notice = Some(notice);
    }

    /// Dismiss the current notice
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Validate the input and start a lookup.
    ///
    /// Rejected while another lookup is in flight or when the normalized
    /// input is empty; neither case issues a command.
    pub fn submit(&mut self) -> Result<LookupCommand, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::InFlight);
        }

        let label = normalize_input(&self.input);
        if label.is_empty() {
            return Err(SubmitError::Empty);
        }

        self.in_flight = true;
        tracing::debug!(label = %label, "submitting lookup");
        self.log(LogEntry::info(format!("Looking up \"{}\"...", label)));
        Ok(LookupCommand::Lookup(label))
    }

    /// Apply a finished lookup
    pub fn handle_lookup_message(&mut self, message: LookupMessage) {
        match message {
            LookupMessage::Resolved { label, year } => {
                self.in_flight = false;
                match year {
                    Some(year) => {
                        let entry = TimelineEntry::new(label, year);
                        self.log(LogEntry::success(format!(
                            "Added {} ({})",
                            entry.display_label(),
                            format_year(year)
                        )));
                        self.timeline.push(entry);
                        self.input.clear();
                    }
                    None => {
                        tracing::info!(label = %label, "no year found");
                        self.show_notice(LogLevel::Warning, "Not Found", NOT_FOUND_MESSAGE);
                    }
                }
            }
        }
    }

    /// The worker is gone and `cmd` was never delivered.
    ///
    /// A lost lookup ends like a failed one so the input is usable again.
    pub fn handle_dispatch_failure(&mut self, cmd: LookupCommand) {
        if let LookupCommand::Lookup(label) = cmd {
            self.in_flight = false;
            tracing::error!(label = %label, "lookup worker unavailable");
            self.log(LogEntry::error(format!(
                "Lookup worker unavailable, \"{}\" was not looked up",
                label
            )));
            self.show_notice(LogLevel::Warning, "Not Found", NOT_FOUND_MESSAGE);
        }
    }

    /// Handle key events and return an optional worker command
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<LookupCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(LookupCommand::Shutdown);
        }

        // Handle notice dismissal
        if self.notice.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.dismiss_notice();
            }
            return None;
        }

        // Handle help overlay
        if self.show_help {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Enter
            ) {
                self.show_help = false;
            }
            return None;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::Timeline => self.handle_timeline_key(key),
        }
    }

    /// Keys while typing
    fn handle_input_key(&mut self, key: KeyEvent) -> Option<LookupCommand> {
        match key.code {
            KeyCode::Enter => return self.handle_submit(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => {
                self.focus = Focus::Timeline;
            }
            KeyCode::Tab => {
                self.focus = self.focus.toggle();
            }
            KeyCode::F(1) => {
                self.show_help = true;
            }
            KeyCode::Up => self.timeline.select_previous(),
            KeyCode::Down => self.timeline.select_next(),
            KeyCode::PageUp => self.timeline.scroll_up(self.page_size()),
            KeyCode::PageDown => self.timeline.scroll_down(self.page_size()),
            _ => {}
        }
        None
    }

    /// Keys while navigating the timeline
    fn handle_timeline_key(&mut self, key: KeyEvent) -> Option<LookupCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return Some(LookupCommand::Shutdown);
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.show_help = true;
            }
            KeyCode::Tab => {
                self.focus = self.focus.toggle();
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                self.focus = Focus::Input;
            }
            KeyCode::Char('j') | KeyCode::Down => self.timeline.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.timeline.select_previous(),
            KeyCode::Char('g') | KeyCode::Home => self.timeline.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.timeline.select_last(),
            KeyCode::PageUp => self.timeline.scroll_up(self.page_size()),
            KeyCode::PageDown => self.timeline.scroll_down(self.page_size()),
            _ => {}
        }
        None
    }

    fn handle_submit(&mut self) -> Option<LookupCommand> {
        match self.submit() {
            Ok(cmd) => Some(cmd),
            Err(err @ SubmitError::Empty) => {
                self.show_notice(LogLevel::Error, "Invalid Input", err.to_string());
                None
            }
            Err(err @ SubmitError::InFlight) => {
                self.log(LogEntry::warning(err.to_string()));
                None
            }
        }
    }

    fn page_size(&self) -> usize {
        self.timeline.viewport_rows.saturating_sub(1).max(1)
    }

    /// Busy spinner frame, or `None` when idle
    pub fn busy_indicator(&self) -> Option<char> {
        self.in_flight
            .then(|| SPINNER[(self.frame_count / 3) as usize % SPINNER.len()])
    }

    /// Update animations (called every frame)
    pub fn tick(&mut self, timeline_rows: u16) {
        self.frame_count = self.frame_count.wrapping_add(1);
        self.timeline.tick();
        self.timeline.viewport_rows = timeline_rows as usize;

        if self.notice.as_ref().is_some_and(Notice::should_dismiss) {
            self.notice = None;
        }
    }

    /// Get the status bar text
    pub fn status_text(&self) -> String {
        let state = if self.in_flight { "Looking up..." } else { "Ready" };
        format!(
            "{} | {} | focus: {} | Tab: Switch | F1: Help | Ctrl+C: Quit",
            self.backend_name,
            state,
            self.focus.name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(TimelineState::default(), "local")
    }

    fn press(app: &mut App, code: KeyCode) -> Option<LookupCommand> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_normalize_input() {
        assert_eq!(normalize_input("  Printing Press \n"), "printing press");
        assert_eq!(normalize_input("   "), "");
    }

    #[test]
    fn test_blank_submission_is_rejected() {
        let mut app = app();
        app.input = "  ".to_string();

        assert_eq!(app.submit(), Err(SubmitError::Empty));
        assert!(!app.in_flight);

        let cmd = press(&mut app, KeyCode::Enter);
        assert!(cmd.is_none());
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.message, "Please enter an item");
        assert!(!app.in_flight);
    }

    #[test]
    fn test_submit_issues_normalized_lookup() {
        let mut app = app();
        type_text(&mut app, "  Printing Press ");

        let cmd = press(&mut app, KeyCode::Enter);
        assert_eq!(cmd, Some(LookupCommand::Lookup("printing press".to_string())));
        assert!(app.in_flight);
        assert!(app.busy_indicator().is_some());
    }

    #[test]
    fn test_second_submit_blocked_while_in_flight() {
        let mut app = app();
        app.input = "wheel".to_string();
        assert!(app.submit().is_ok());

        assert_eq!(app.submit(), Err(SubmitError::InFlight));
        assert!(press(&mut app, KeyCode::Enter).is_none());
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_successful_lookup_adds_entry() {
        let mut app = app();
        app.input = "Internet".to_string();
        let _ = app.submit().unwrap();

        app.handle_lookup_message(LookupMessage::Resolved {
            label: "internet".to_string(),
            year: Some(1969),
        });

        assert!(!app.in_flight);
        assert!(app.input.is_empty());
        assert_eq!(app.timeline.entries(), &[TimelineEntry::new("internet", 1969)]);
        assert!(app.notice.is_none());
        assert_eq!(app.busy_indicator(), None);
    }

    #[test]
    fn test_unknown_lookup_leaves_timeline_unchanged() {
        let mut app = app();
        app.timeline.push(TimelineEntry::new("wheel", -3500));
        let before = app.timeline.layout().clone();

        app.input = "flux capacitor".to_string();
        let _ = app.submit().unwrap();
        app.handle_lookup_message(LookupMessage::Resolved {
            label: "flux capacitor".to_string(),
            year: None,
        });

        assert!(!app.in_flight);
        assert_eq!(app.timeline.len(), 1);
        assert_eq!(app.timeline.layout(), &before);
        assert_eq!(app.input, "flux capacitor");
        assert_eq!(app.notice.as_ref().unwrap().message, NOT_FOUND_MESSAGE);
    }

    #[test]
    fn test_scenario_orders_entries() {
        let mut app = app();
        for (label, year) in [("wheel", -3500), ("internet", 1969), ("printing press", 1440)] {
            app.input = label.to_string();
            let _ = app.submit().unwrap();
            app.handle_lookup_message(LookupMessage::Resolved {
                label: label.to_string(),
                year: Some(year),
            });
        }

        let layout = app.timeline.layout();
        let dates: Vec<String> = layout.entries.iter().map(|p| p.entry.display_date()).collect();
        assert_eq!(dates, vec!["3500 BCE", "1440 CE", "1969 CE"]);
        assert_eq!(layout.interval, 1000);
    }

    #[tokio::test]
    async fn test_dead_worker_releases_submission() {
        let mut app = app();
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::channel(1);
        drop(cmd_rx);

        type_text(&mut app, "wheel");
        let cmd = press(&mut app, KeyCode::Enter).unwrap();
        let err = cmd_tx.send(cmd).await.unwrap_err();
        app.handle_dispatch_failure(err.0);

        assert!(!app.in_flight);
        assert_eq!(app.input, "wheel");
        assert_eq!(app.notice.as_ref().unwrap().message, NOT_FOUND_MESSAGE);
        assert!(app.logs.iter().any(|l| l.level == LogLevel::Error));

        press(&mut app, KeyCode::Esc);
        assert_eq!(
            press(&mut app, KeyCode::Enter),
            Some(LookupCommand::Lookup("wheel".to_string()))
        );
    }

    #[test]
    fn test_dispatch_failure_ignores_shutdown() {
        let mut app = app();
        app.handle_dispatch_failure(LookupCommand::Shutdown);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_notice_swallows_keys_until_dismissed() {
        let mut app = app();
        app.show_notice(LogLevel::Error, "Invalid Input", "Please enter an item");

        press(&mut app, KeyCode::Char('x'));
        assert!(app.input.is_empty());

        press(&mut app, KeyCode::Esc);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_focus_and_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.input, "q");
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Timeline);

        assert_eq!(press(&mut app, KeyCode::Char('q')), Some(LookupCommand::Shutdown));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_input() {
        let mut app = app();
        let cmd = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(cmd, Some(LookupCommand::Shutdown));
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_seed_reference() {
        let mut app = app();
        app.seed_reference();
        assert_eq!(app.timeline.len(), 14);
        let first = app.timeline.selected_entry().unwrap();
        assert_eq!(first.entry.label, "wheel");
    }

    #[test]
    fn test_log_is_bounded() {
        let mut app = app();
        for i in 0..250 {
            app.log(LogEntry::info(format!("line {}", i)));
        }
        assert_eq!(app.logs.len(), 100);
        assert_eq!(app.logs.last().unwrap().message, "line 249");
    }
}
