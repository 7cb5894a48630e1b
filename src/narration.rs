use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::formats::Chapter;

/// What to play for a chapter's "listen" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum NarrationSource {
    Prerecorded { path: PathBuf },
    Synthesized { text: String },
    Unavailable,
}

pub fn audio_path(audio_dir: &Path, lang: &str, chapter: &Chapter) -> PathBuf {
    audio_dir.join(lang).join(format!("{}.mp3", chapter.id))
}

/// Prefers a recorded file at `<audio_dir>/<lang>/<chapter id>.mp3`.
pub fn resolve(audio_dir: Option<&Path>, lang: &str, chapter: &Chapter) -> NarrationSource {
    if let Some(audio_dir) = audio_dir {
        let path = audio_path(audio_dir, lang, chapter);
        if path.is_file() {
            return NarrationSource::Prerecorded { path };
        }
        tracing::debug!(path = %path.display(), "no recorded narration");
    }

    let text = narration_text(chapter);
    if text.is_empty() {
        NarrationSource::Unavailable
    } else {
        NarrationSource::Synthesized { text }
    }
}

/// `"<title>. <body>"` with markup removed; notes are not read aloud.
pub fn narration_text(chapter: &Chapter) -> String {
    let rendered = crate::markup::render(&chapter.content);
    let body = rendered
        .body
        .iter()
        .map(|node| node.plain_text())
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let title = chapter.title.trim();
    match (title.is_empty(), body.is_empty()) {
        (true, true) => String::new(),
        (false, true) => title.to_owned(),
        (true, false) => body,
        (false, false) => format!("{title}. {body}"),
    }
}
