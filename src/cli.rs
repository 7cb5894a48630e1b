use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use crate::formats::ThemeMode;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the configured languages and their sheet ids.
    Languages(LanguagesArgs),
    /// Download a language's sheet and write its chapters as JSON.
    Fetch(FetchArgs),
    /// Read a local CSV export and write its chapters as JSON.
    Parse(ParseArgs),
    /// Render one chapter's content.
    Render(RenderArgs),
    /// Write the whole book as a single HTML page or an EPUB.
    Export(ExportArgs),
    /// Resolve what to play for a chapter's narration.
    Narration(NarrationArgs),
    /// Reading position, bookmarks, quotes and theme.
    State(StateArgs),
}

#[derive(Debug, Args)]
pub struct LanguagesArgs {
    /// YAML file overriding the spreadsheet base URL and language table.
    #[arg(long)]
    pub sources: Option<PathBuf>,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("sheet").required(true).args(["lang", "gid", "url"])))]
pub struct FetchArgs {
    /// Language code from the language table (e.g. `bn`).
    #[arg(long)]
    pub lang: Option<String>,

    /// Sheet id inside the configured spreadsheet.
    #[arg(long)]
    pub gid: Option<String>,

    /// Full CSV export URL (must be http/https).
    #[arg(long)]
    pub url: Option<String>,

    /// Output file for `chapters.json` (default: stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// YAML file overriding the spreadsheet base URL and language table.
    #[arg(long)]
    pub sources: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// CSV export of a chapter sheet.
    #[arg(long)]
    pub input: PathBuf,

    /// Output file for `chapters.json` (default: stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Json,
    Html,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Chapters JSON (created by `fetch` or `parse`).
    #[arg(long)]
    pub chapters: PathBuf,

    /// Chapter id (`chapter-7`) or 1-based chapter number.
    #[arg(long)]
    pub chapter: String,

    #[arg(long, value_enum, default_value_t = RenderFormat::Json)]
    pub format: RenderFormat,

    /// Language of the chapter text.
    #[arg(long, default_value = "bn")]
    pub lang: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Html,
    Epub,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Chapters JSON (created by `fetch` or `parse`).
    #[arg(long)]
    pub chapters: PathBuf,

    /// Output file path.
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, value_enum)]
    pub format: ExportFormat,

    /// Book title.
    #[arg(long, default_value = "Amrito")]
    pub title: String,

    /// Language of the chapter text.
    #[arg(long, default_value = "bn")]
    pub lang: String,

    /// Directory holding the files named by image directives.
    #[arg(long)]
    pub images: Option<PathBuf>,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct NarrationArgs {
    /// Chapters JSON (created by `fetch` or `parse`).
    #[arg(long)]
    pub chapters: PathBuf,

    /// Chapter id (`chapter-7`) or 1-based chapter number.
    #[arg(long)]
    pub chapter: String,

    /// Language code; selects `<audio-dir>/<lang>/`.
    #[arg(long)]
    pub lang: String,

    /// Directory of recorded narration.
    #[arg(long)]
    pub audio_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct StateArgs {
    /// State directory (default: `$AMRITO_STATE_DIR` or `.amrito`).
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Chapters JSON (created by `fetch` or `parse`).
    #[arg(long)]
    pub chapters: PathBuf,

    #[command(subcommand)]
    pub command: StateCommand,
}

#[derive(Debug, Subcommand)]
pub enum StateCommand {
    /// Print the current chapter, saved state and theme.
    Show,
    /// Make a chapter the current one.
    Open { chapter: String },
    /// Toggle the bookmark on a chapter.
    Bookmark { chapter: String },
    /// Record the scroll position (0.0 to 1.0) within a chapter.
    Progress { chapter: String, fraction: f32 },
    /// List bookmarked chapters.
    Bookmarks,
    Quote {
        #[command(subcommand)]
        command: QuoteCommand,
    },
    /// Change reading preferences.
    Theme(ThemeArgs),
}

#[derive(Debug, Subcommand)]
pub enum QuoteCommand {
    /// Save a passage from the current (or given) chapter.
    Add {
        #[arg(long)]
        text: String,

        /// Open this chapter first.
        #[arg(long)]
        chapter: Option<String>,
    },
    Remove { id: String },
    List,
}

#[derive(Debug, Args)]
pub struct ThemeArgs {
    #[arg(long, value_enum)]
    pub mode: Option<ThemeMode>,

    /// Font size in px (clamped to 12..=48).
    #[arg(long)]
    pub font_size: Option<u32>,

    /// One step larger.
    #[arg(long, default_value_t = false, conflicts_with = "smaller")]
    pub larger: bool,

    /// One step smaller.
    #[arg(long, default_value_t = false)]
    pub smaller: bool,

    #[arg(long)]
    pub remember_scroll: Option<bool>,
}
