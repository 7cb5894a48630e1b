use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// `chapter-<row>` where `<row>` is the data-row position in the sheet.
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub writer: String,
    pub content: String,
    /// Zero-based position in display order.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub chapter_id: String,
    pub chapter_title: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Stored under `thakur_reading_state` in the same camelCase shape the web reader writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingState {
    #[serde(default)]
    pub current_chapter_id: Option<String>,
    #[serde(default)]
    pub bookmarks: Vec<String>,
    #[serde(default)]
    pub progress: BTreeMap<String, f32>,
    /// Newest first.
    #[serde(default)]
    pub quotes: Vec<Quote>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Sepia,
    Light,
    Dark,
    Soft,
}

pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 48;
pub const DEFAULT_FONT_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default)]
    pub mode: ThemeMode,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_remember_scroll")]
    pub remember_scroll: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            mode: ThemeMode::default(),
            font_size: DEFAULT_FONT_SIZE,
            remember_scroll: true,
        }
    }
}

fn default_font_size() -> u32 {
    DEFAULT_FONT_SIZE
}

fn default_remember_scroll() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    /// Sheet id inside the published spreadsheet.
    pub gid: String,
}
