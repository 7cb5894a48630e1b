use anyhow::Context as _;

use crate::cli::{FetchArgs, LanguagesArgs, ParseArgs};
use crate::config::{SheetConfig, SheetSelector};

pub fn languages(args: LanguagesArgs) -> anyhow::Result<()> {
    let config = SheetConfig::load(args.sources.as_deref())?;
    let mut out = String::new();
    for lang in &config.languages {
        out.push_str(&format!("{}\t{}\t{}\n", lang.code, lang.name, lang.gid));
    }
    crate::output::write_text(None, &out, false)
}

pub async fn run(args: FetchArgs) -> anyhow::Result<()> {
    let config = SheetConfig::load(args.sources.as_deref())?;
    let selector = match (&args.lang, &args.gid, &args.url) {
        (Some(code), _, _) => SheetSelector::Gid(config.language(code)?.gid.clone()),
        (None, Some(gid), _) => SheetSelector::Gid(gid.clone()),
        (None, None, Some(url)) => SheetSelector::Url(url.clone()),
        (None, None, None) => anyhow::bail!("one of --lang, --gid or --url is required"),
    };
    let url = selector.resolve(&config)?;
    tracing::info!(url = %url, "fetching chapters");

    let client = crate::ingest::http_client()?;
    let chapters = crate::ingest::fetch_chapters(&client, &url).await;
    crate::output::write_chapters(args.out.as_deref(), &chapters, args.force)
}

pub fn parse(args: ParseArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("read csv: {}", args.input.display()))?;
    let chapters = crate::ingest::chapters_from_csv(&text);
    tracing::info!(chapters = chapters.len(), "parsed chapters");
    crate::output::write_chapters(args.out.as_deref(), &chapters, args.force)
}
