//! Reader session: the loaded chapters plus everything the reader persists.

use crate::formats::{
    Chapter, MAX_FONT_SIZE, MIN_FONT_SIZE, Quote, ReadingState, Theme, ThemeMode,
};

pub const FONT_STEP: u32 = 2;

#[derive(Debug, Clone)]
pub struct ReaderSession {
    chapters: Vec<Chapter>,
    active: Option<usize>,
    state: ReadingState,
    theme: Theme,
}

impl ReaderSession {
    /// Restores the active chapter from `state.current_chapter_id` when it still exists.
    pub fn open(chapters: Vec<Chapter>, state: ReadingState, theme: Theme) -> Self {
        let active = if chapters.is_empty() {
            None
        } else {
            let restored = state
                .current_chapter_id
                .as_deref()
                .and_then(|id| chapters.iter().position(|c| c.id == id));
            if restored.is_none() && state.current_chapter_id.is_some() {
                tracing::debug!(
                    chapter_id = state.current_chapter_id.as_deref(),
                    "saved chapter not found; starting at the first chapter"
                );
            }
            Some(restored.unwrap_or(0))
        };

        let mut session = Self {
            chapters,
            active,
            state,
            theme,
        };
        session.sync_current_chapter();
        session
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn state(&self) -> &ReadingState {
        &self.state
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn current(&self) -> Option<&Chapter> {
        self.active.and_then(|idx| self.chapters.get(idx))
    }

    pub fn is_first(&self) -> bool {
        self.active == Some(0)
    }

    pub fn is_last(&self) -> bool {
        matches!(self.active, Some(idx) if idx + 1 == self.chapters.len())
    }

    /// Position of the active chapter in the book, in percent.
    pub fn progress_percent(&self) -> f32 {
        match self.active {
            Some(idx) if !self.chapters.is_empty() => {
                (idx + 1) as f32 / self.chapters.len() as f32 * 100.0
            }
            _ => 0.0,
        }
    }

    /// Chapter by id, or by 1-based number.
    pub fn find(&self, reference: &str) -> Option<&Chapter> {
        find_chapter(&self.chapters, reference)
    }

    pub fn go_to(&mut self, index: usize) -> anyhow::Result<&Chapter> {
        if index >= self.chapters.len() {
            anyhow::bail!(
                "chapter index out of range: {index} (chapters: {})",
                self.chapters.len()
            );
        }
        self.active = Some(index);
        self.sync_current_chapter();
        Ok(&self.chapters[index])
    }

    pub fn open_chapter(&mut self, reference: &str) -> anyhow::Result<&Chapter> {
        let index = find_position(&self.chapters, reference)
            .ok_or_else(|| anyhow::anyhow!("chapter not found: {reference}"))?;
        self.go_to(index)
    }

    pub fn next(&mut self) -> Option<&Chapter> {
        let idx = self.active?;
        if idx + 1 >= self.chapters.len() {
            return None;
        }
        self.go_to(idx + 1).ok()
    }

    pub fn previous(&mut self) -> Option<&Chapter> {
        let idx = self.active?.checked_sub(1)?;
        self.go_to(idx).ok()
    }

    pub fn is_bookmarked(&self, chapter_id: &str) -> bool {
        self.state.bookmarks.iter().any(|id| id == chapter_id)
    }

    /// Adds or removes the bookmark; returns whether the chapter is bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, chapter_id: &str) -> bool {
        if self.is_bookmarked(chapter_id) {
            self.state.bookmarks.retain(|id| id != chapter_id);
            false
        } else {
            self.state.bookmarks.push(chapter_id.to_owned());
            true
        }
    }

    /// Bookmarked chapters that exist in the loaded book, in display order.
    pub fn bookmarked_chapters(&self) -> Vec<&Chapter> {
        self.chapters
            .iter()
            .filter(|c| self.is_bookmarked(&c.id))
            .collect()
    }

    pub fn set_progress(&mut self, chapter_id: &str, fraction: f32) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.state.progress.insert(chapter_id.to_owned(), fraction);
    }

    pub fn progress(&self, chapter_id: &str) -> f32 {
        self.state.progress.get(chapter_id).copied().unwrap_or(0.0)
    }

    /// Where to scroll when reopening a chapter.
    pub fn resume_progress(&self, chapter_id: &str) -> f32 {
        if self.theme.remember_scroll {
            self.progress(chapter_id)
        } else {
            0.0
        }
    }

    /// Saves a quote from the active chapter, newest first.
    pub fn save_quote(&mut self, text: &str, timestamp_ms: i64) -> anyhow::Result<&Quote> {
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("quote text is empty");
        }
        let chapter = self
            .current()
            .ok_or_else(|| anyhow::anyhow!("no chapter is open"))?;

        let id = self.unused_quote_id(timestamp_ms);
        let quote = Quote {
            id,
            text: text.to_owned(),
            chapter_id: chapter.id.clone(),
            chapter_title: chapter.title.clone(),
            timestamp: timestamp_ms,
        };
        self.state.quotes.insert(0, quote);
        Ok(&self.state.quotes[0])
    }

    /// `quote-<millis>`, suffixed `-2`, `-3`, ... when a quote with that id already exists.
    fn unused_quote_id(&self, timestamp_ms: i64) -> String {
        let base = format!("quote-{timestamp_ms}");
        let taken = |id: &str| self.state.quotes.iter().any(|q| q.id == id);
        if !taken(&base) {
            return base;
        }
        let mut n = 2;
        loop {
            let id = format!("{base}-{n}");
            if !taken(&id) {
                return id;
            }
            n += 1;
        }
    }

    pub fn remove_quote(&mut self, quote_id: &str) -> bool {
        let before = self.state.quotes.len();
        self.state.quotes.retain(|q| q.id != quote_id);
        self.state.quotes.len() != before
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.state.quotes
    }

    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.theme.mode = mode;
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.theme.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    pub fn increase_font(&mut self) {
        self.set_font_size(self.theme.font_size.saturating_add(FONT_STEP));
    }

    pub fn decrease_font(&mut self) {
        self.set_font_size(self.theme.font_size.saturating_sub(FONT_STEP));
    }

    pub fn set_remember_scroll(&mut self, remember: bool) {
        self.theme.remember_scroll = remember;
    }

    /// The persisted state and theme, ready for saving.
    pub fn into_parts(self) -> (ReadingState, Theme) {
        (self.state, self.theme)
    }

    fn sync_current_chapter(&mut self) {
        if let Some(chapter) = self.current() {
            let id = chapter.id.clone();
            self.state.current_chapter_id = Some(id);
        }
    }
}

pub fn find_chapter<'a>(chapters: &'a [Chapter], reference: &str) -> Option<&'a Chapter> {
    find_position(chapters, reference).map(|idx| &chapters[idx])
}

/// Position of the chapter with this id, else of the 1-based chapter number.
fn find_position(chapters: &[Chapter], reference: &str) -> Option<usize> {
    let reference = reference.trim();
    if let Some(idx) = chapters.iter().position(|c| c.id == reference) {
        return Some(idx);
    }
    let number = reference.parse::<usize>().ok()?;
    let idx = number.checked_sub(1)?;
    (idx < chapters.len()).then_some(idx)
}
