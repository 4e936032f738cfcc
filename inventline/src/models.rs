//! Domain models for the invention timeline.
//!
//! `TimelineEntry` is the one record the timeline is built from. The wire
//! DTOs below match the two lookup backends: the local `/api/invention-date`
//! endpoint and the generative-language `generateContent` API.

use serde::{Deserialize, Serialize};

/// A single invention placed on the timeline.
///
/// `year` is signed: negative is BCE, zero and positive are CE. Labels are
/// not unique; duplicates render as separate entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub label: String,
    pub year: i32,
}

impl TimelineEntry {
    pub fn new(label: impl Into<String>, year: i32) -> Self {
        Self {
            label: label.into(),
            year,
        }
    }

    /// Label with its first character uppercased
    pub fn display_label(&self) -> String {
        display_label(&self.label)
    }

    /// Date string such as `3500 BCE` or `1440 CE`
    pub fn display_date(&self) -> String {
        format_year(self.year)
    }
}

/// Format a signed year as `"{abs} BCE"` or `"{year} CE"`.
pub fn format_year(year: i32) -> String {
    if year < 0 {
        format!("{} BCE", year.unsigned_abs())
    } else {
        format!("{} CE", year)
    }
}

/// Uppercase the first character, leave the rest untouched.
pub fn display_label(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Built-in invention → year table.
///
/// Seed and fixture data only. The live lookup never consults it.
pub const REFERENCE_INVENTIONS: &[(&str, i32)] = &[
    ("mobile phone", 1973),
    ("telephone", 1876),
    ("steam engine", 1712),
    ("wheel", -3500),
    ("internet", 1969),
    ("television", 1927),
    ("computer", 1936),
    ("printing press", 1440),
    ("electricity", 1752),
    ("automobile", 1886),
    ("airplane", 1903),
    ("radio", 1895),
    ("penicillin", 1928),
    ("light bulb", 1879),
];

/// Reference dataset as timeline entries, in table order
pub fn reference_entries() -> Vec<TimelineEntry> {
    REFERENCE_INVENTIONS
        .iter()
        .map(|(label, year)| TimelineEntry::new(*label, *year))
        .collect()
}

// ============================================
// Local endpoint DTOs
// ============================================

/// Request body for `POST /api/invention-date`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRequest {
    pub item: String,
}

/// Response body from `/api/invention-date`.
///
/// Success carries `year`; failures carry `error` with a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearResponse {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================
// Generative-language API DTOs
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Single-turn request with one text part
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.into()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}
