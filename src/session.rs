//! `state` subcommands: load the persisted reader state, apply one change, save it back.

use std::path::PathBuf;

use anyhow::Context as _;
use serde_json::json;

use crate::cli::{QuoteCommand, StateArgs, StateCommand, ThemeArgs};
use crate::reader::ReaderSession;
use crate::state::{LocalFsStateStore, READING_STATE_KEY, StateStore, THEME_KEY};

pub const STATE_DIR_ENV: &str = "AMRITO_STATE_DIR";
pub const DEFAULT_STATE_DIR: &str = ".amrito";

pub fn state_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        std::env::var_os(STATE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
}

pub async fn run(args: StateArgs) -> anyhow::Result<()> {
    let store = LocalFsStateStore::new(state_dir(args.state_dir));
    tracing::debug!(dir = %store.base_dir().display(), "using state dir");

    let chapters = crate::output::read_chapters(&args.chapters)?;
    let state = crate::state::load_reading_state(&store).await;
    let theme = crate::state::load_theme(&store).await;
    let mut session = ReaderSession::open(chapters, state, theme);

    let (report, dirty) = apply(&mut session, args.command)?;
    if dirty {
        save(&store, session).await?;
    }

    let mut out = serde_json::to_string_pretty(&report).context("serialize state report")?;
    out.push('\n');
    crate::output::write_text(None, &out, false)
}

/// Applies one command; returns what to print and whether anything changed.
pub fn apply(
    session: &mut ReaderSession,
    command: StateCommand,
) -> anyhow::Result<(serde_json::Value, bool)> {
    let result = match command {
        StateCommand::Show => (show(session), false),
        StateCommand::Open { chapter } => {
            session.open_chapter(&chapter)?;
            (show(session), true)
        }
        StateCommand::Bookmark { chapter } => {
            let id = chapter_id(session, &chapter)?;
            let bookmarked = session.toggle_bookmark(&id);
            (json!({ "chapterId": id, "bookmarked": bookmarked }), true)
        }
        StateCommand::Progress { chapter, fraction } => {
            let id = chapter_id(session, &chapter)?;
            session.set_progress(&id, fraction);
            let progress = session.progress(&id);
            (json!({ "chapterId": id, "progress": progress }), true)
        }
        StateCommand::Bookmarks => {
            let bookmarks = session
                .bookmarked_chapters()
                .into_iter()
                .map(|c| json!({ "id": c.id, "number": c.index + 1, "title": c.title }))
                .collect::<Vec<_>>();
            (json!(bookmarks), false)
        }
        StateCommand::Quote { command } => apply_quote(session, command)?,
        StateCommand::Theme(args) => {
            let changed = apply_theme(session, &args);
            (json!(session.theme()), changed)
        }
    };
    Ok(result)
}

fn apply_quote(
    session: &mut ReaderSession,
    command: QuoteCommand,
) -> anyhow::Result<(serde_json::Value, bool)> {
    match command {
        QuoteCommand::Add { text, chapter } => {
            if let Some(chapter) = chapter {
                session.open_chapter(&chapter)?;
            }
            let now = chrono::Utc::now().timestamp_millis();
            let quote = session.save_quote(&text, now)?;
            Ok((json!(quote), true))
        }
        QuoteCommand::Remove { id } => {
            if !session.remove_quote(&id) {
                anyhow::bail!("quote not found: {id}");
            }
            Ok((json!({ "removed": id }), true))
        }
        QuoteCommand::List => Ok((json!(session.quotes()), false)),
    }
}

fn apply_theme(session: &mut ReaderSession, args: &ThemeArgs) -> bool {
    let before = session.theme().clone();
    if let Some(mode) = args.mode {
        session.set_mode(mode);
    }
    if let Some(size) = args.font_size {
        session.set_font_size(size);
    }
    if args.larger {
        session.increase_font();
    }
    if args.smaller {
        session.decrease_font();
    }
    if let Some(remember) = args.remember_scroll {
        session.set_remember_scroll(remember);
    }
    *session.theme() != before
}

fn show(session: &ReaderSession) -> serde_json::Value {
    let current = session.current().map(|c| {
        json!({
            "id": c.id,
            "number": c.index + 1,
            "title": c.title,
            "isFirst": session.is_first(),
            "isLast": session.is_last(),
            "resumeProgress": session.resume_progress(&c.id),
        })
    });
    json!({
        "chapters": session.chapters().len(),
        "current": current,
        "progressPercent": session.progress_percent(),
        "state": session.state(),
        "theme": session.theme(),
    })
}

fn chapter_id(session: &ReaderSession, reference: &str) -> anyhow::Result<String> {
    session
        .find(reference)
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow::anyhow!("chapter not found: {reference}"))
}

async fn save(store: &dyn StateStore, session: ReaderSession) -> anyhow::Result<()> {
    let (state, theme) = session.into_parts();
    crate::state::save(store, READING_STATE_KEY, &state)
        .await
        .context("save reading state")?;
    crate::state::save(store, THEME_KEY, &theme)
        .await
        .context("save theme")?;
    Ok(())
}
