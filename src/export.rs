use crate::cli::{ExportArgs, ExportFormat};
use crate::epub::EpubOptions;
use crate::formats::Theme;
use crate::html::HtmlOptions;

pub fn run(args: ExportArgs) -> anyhow::Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!("export output already exists: {}", args.out.display());
    }

    let chapters = crate::output::read_chapters(&args.chapters)?;
    if chapters.is_empty() {
        anyhow::bail!("no chapters to export: {}", args.chapters.display());
    }

    match args.format {
        ExportFormat::Html => export_html(&args, &chapters)?,
        ExportFormat::Epub => {
            let options = EpubOptions {
                force: args.force,
                title: args.title.clone(),
                lang: args.lang.clone(),
                theme: Theme::default(),
                images_dir: args.images.clone(),
            };
            crate::epub::create_from_chapters(&chapters, &args.out, &options)?;
        }
    }

    Ok(())
}

fn export_html(args: &ExportArgs, chapters: &[crate::formats::Chapter]) -> anyhow::Result<()> {
    let image_prefix = match &args.images {
        Some(dir) => format!("{}/", dir.display().to_string().trim_end_matches('/')),
        None => HtmlOptions::default().image_prefix,
    };
    let html = crate::html::render_book(
        &args.title,
        &args.lang,
        chapters,
        &Theme::default(),
        &HtmlOptions { image_prefix },
    );

    crate::output::write_text(Some(&args.out), &html, args.force)?;
    tracing::info!(
        out = %args.out.display(),
        chapters = chapters.len(),
        "wrote html"
    );
    Ok(())
}
