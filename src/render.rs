use anyhow::Context as _;

use crate::cli::{NarrationArgs, RenderArgs, RenderFormat};
use crate::formats::Chapter;
use crate::html::HtmlOptions;

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let chapters = crate::output::read_chapters(&args.chapters)?;
    let chapter = lookup(&chapters, &args.chapter)?;

    let out = match args.format {
        RenderFormat::Json => {
            let rendered = crate::markup::render(&chapter.content);
            let mut json =
                serde_json::to_string_pretty(&rendered).context("serialize rendered chapter")?;
            json.push('\n');
            json
        }
        RenderFormat::Html => {
            let section = crate::html::render_chapter_section(chapter, &HtmlOptions::default());
            format!(
                "<article lang=\"{}\">\n{section}</article>\n",
                crate::html::escape(&args.lang)
            )
        }
    };
    crate::output::write_text(None, &out, false)
}

pub fn narration(args: NarrationArgs) -> anyhow::Result<()> {
    let chapters = crate::output::read_chapters(&args.chapters)?;
    let chapter = lookup(&chapters, &args.chapter)?;

    let source = crate::narration::resolve(args.audio_dir.as_deref(), &args.lang, chapter);
    let mut json = serde_json::to_string_pretty(&source).context("serialize narration")?;
    json.push('\n');
    crate::output::write_text(None, &json, false)
}

fn lookup<'a>(chapters: &'a [Chapter], reference: &str) -> anyhow::Result<&'a Chapter> {
    crate::reader::find_chapter(chapters, reference).ok_or_else(|| {
        anyhow::anyhow!(
            "chapter not found: {reference} (chapters: {})",
            chapters.len()
        )
    })
}
