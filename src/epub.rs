//! EPUB 3 export: one XHTML document per chapter, a nav document, and the bundled images.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use zip::write::SimpleFileOptions;

use crate::formats::{Chapter, Theme};
use crate::html::{HtmlOptions, escape};
use crate::markup::ContentNode;

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

#[derive(Debug, Clone)]
pub struct EpubOptions {
    pub force: bool,
    pub title: String,
    /// BCP-47 tag for the package metadata and every XHTML document.
    pub lang: String,
    pub theme: Theme,
    /// Directory holding the files named by `{{image:...}}` directives.
    pub images_dir: Option<PathBuf>,
}

pub fn create_from_chapters(
    chapters: &[Chapter],
    out_path: &Path,
    options: &EpubOptions,
) -> anyhow::Result<()> {
    if chapters.is_empty() {
        anyhow::bail!("no chapters to export");
    }
    if out_path.exists() && !options.force {
        anyhow::bail!("epub output already exists: {}", out_path.display());
    }

    let lang = match options.lang.trim() {
        "" => "und",
        lang => lang,
    };
    let images = referenced_images(chapters, options.images_dir.as_deref());
    let package = Package {
        title: &options.title,
        lang,
        chapters,
        images: &images,
    };

    let file = crate::output::open_output(out_path, options.force)?;
    let mut zip = zip::ZipWriter::new(file);

    // `mimetype` must be the first entry and stored uncompressed.
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    zip.start_file("mimetype", stored)
        .context("epub start_file mimetype")?;
    zip.write_all(b"application/epub+zip")
        .context("epub write mimetype")?;

    let deflated = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let mut entry = |name: &str, bytes: &[u8]| -> anyhow::Result<()> {
        zip.start_file(name, deflated)
            .with_context(|| format!("epub start_file {name}"))?;
        zip.write_all(bytes)
            .with_context(|| format!("epub write {name}"))
    };

    entry("META-INF/container.xml", CONTAINER_XML.as_bytes())?;
    entry("OEBPS/content.opf", package.content_opf().as_bytes())?;
    entry("OEBPS/nav.xhtml", package.nav_xhtml().as_bytes())?;
    entry(
        "OEBPS/style.css",
        crate::html::theme_css(&options.theme).as_bytes(),
    )?;

    let html_options = HtmlOptions {
        image_prefix: "images/".to_owned(),
    };
    for chapter in chapters {
        let section = crate::html::render_chapter_section(chapter, &html_options);
        let page = xhtml_document(&chapter.title, lang, "", &section);
        entry(&format!("OEBPS/{}.xhtml", chapter.id), page.as_bytes())?;
    }

    for image in &images {
        let bytes = std::fs::read(&image.path)
            .with_context(|| format!("read image: {}", image.path.display()))?;
        entry(&format!("OEBPS/images/{}", image.name), &bytes)?;
    }

    zip.finish().context("epub finish zip")?;
    tracing::info!(
        out = %out_path.display(),
        chapters = chapters.len(),
        images = images.len(),
        "wrote epub"
    );
    Ok(())
}

#[derive(Debug)]
struct Image {
    name: String,
    path: PathBuf,
}

struct Package<'a> {
    title: &'a str,
    lang: &'a str,
    chapters: &'a [Chapter],
    images: &'a [Image],
}

impl Package<'_> {
    fn content_opf(&self) -> String {
        let modified = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let mut manifest = String::new();
        let mut spine = String::new();
        for ch in self.chapters {
            let id = escape(&ch.id);
            let _ = writeln!(
                manifest,
                r#"    <item id="{id}" href="{id}.xhtml" media-type="application/xhtml+xml" />"#
            );
            let _ = writeln!(spine, r#"    <itemref idref="{id}" />"#);
        }
        for (idx, image) in self.images.iter().enumerate() {
            let _ = writeln!(
                manifest,
                r#"    <item id="image-{}" href="images/{}" media-type="{}" />"#,
                idx + 1,
                escape(&image.name),
                media_type(&image.name)
            );
        }

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="bookid" version="3.0" xml:lang="{lang}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="bookid">urn:uuid:{uuid}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>{lang}</dc:language>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav" />
    <item id="css" href="style.css" media-type="text/css" />
{manifest}  </manifest>
  <spine>
{spine}  </spine>
</package>
"#,
            lang = escape(self.lang),
            uuid = uuid::Uuid::new_v4(),
            title = escape(self.title),
        )
    }

    fn nav_xhtml(&self) -> String {
        let mut body = format!(
            "<h1>{}</h1>\n<nav epub:type=\"toc\" id=\"toc\">\n  <ol>\n",
            escape(self.title)
        );
        for ch in self.chapters {
            let _ = writeln!(
                body,
                "    <li><a href=\"{}.xhtml\">{}</a></li>",
                escape(&ch.id),
                escape(&ch.title)
            );
        }
        body.push_str("  </ol>\n</nav>\n");
        xhtml_document(
            self.title,
            self.lang,
            " xmlns:epub=\"http://www.idpf.org/2007/ops\"",
            &body,
        )
    }
}

/// Image files referenced by any chapter that exist under `images_dir`.
fn referenced_images(chapters: &[Chapter], images_dir: Option<&Path>) -> Vec<Image> {
    let mut referenced = BTreeSet::new();
    for chapter in chapters {
        let rendered = crate::markup::render(&chapter.content);
        for node in rendered.body.iter().chain(&rendered.notes) {
            if let ContentNode::Image { filename, .. } = node
                && !filename.is_empty()
            {
                referenced.insert(filename.clone());
            }
        }
    }

    let Some(images_dir) = images_dir else {
        if !referenced.is_empty() {
            tracing::warn!(
                images = referenced.len(),
                "chapters reference images but no images directory was given"
            );
        }
        return Vec::new();
    };

    referenced
        .into_iter()
        .filter_map(|name| {
            if name.contains(['/', '\\']) || name == ".." {
                tracing::warn!(%name, "skipping image outside images directory");
                return None;
            }
            let path = images_dir.join(&name);
            if !path.is_file() {
                tracing::warn!(path = %path.display(), "referenced image not found");
                return None;
            }
            Some(Image { name, path })
        })
        .collect()
}

fn media_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn xhtml_document(title: &str, lang: &str, extra_ns: &str, body: &str) -> String {
    let lang = escape(lang);
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml"{extra_ns} lang="{lang}" xml:lang="{lang}">
<head>
  <title>{title}</title>
  <meta charset="utf-8" />
  <link rel="stylesheet" type="text/css" href="style.css" />
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body.trim_end(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, index: usize, content: &str) -> Chapter {
        Chapter {
            id: id.to_owned(),
            title: format!("Title {index}"),
            subtitle: String::new(),
            writer: String::new(),
            content: content.to_owned(),
            index,
        }
    }

    fn package<'a>(chapters: &'a [Chapter], images: &'a [Image]) -> Package<'a> {
        Package {
            title: "Book & Notes",
            lang: "bn",
            chapters,
            images,
        }
    }

    #[test]
    fn content_opf_spine_follows_display_order() {
        let chapters = vec![chapter("chapter-3", 0, "a"), chapter("chapter-1", 1, "b")];
        let images = vec![Image {
            name: "lotus.JPG".to_owned(),
            path: PathBuf::from("lotus.JPG"),
        }];
        let opf = package(&chapters, &images).content_opf();

        let first = opf.find("<itemref idref=\"chapter-3\"").unwrap();
        let second = opf.find("<itemref idref=\"chapter-1\"").unwrap();
        assert!(first < second);
        assert!(opf.contains("<dc:language>bn</dc:language>"));
        assert!(opf.contains("<dc:title>Book &amp; Notes</dc:title>"));
        assert!(opf.contains(r#"href="images/lotus.JPG" media-type="image/jpeg""#));
    }

    #[test]
    fn nav_lists_chapters_in_order() {
        let chapters = vec![chapter("chapter-3", 0, "a"), chapter("chapter-1", 1, "b")];
        let nav = package(&chapters, &[]).nav_xhtml();

        assert!(nav.contains(r#"xmlns:epub="http://www.idpf.org/2007/ops" lang="bn""#));
        let first = nav.find(r#"<a href="chapter-3.xhtml">Title 0</a>"#).unwrap();
        let second = nav.find(r#"<a href="chapter-1.xhtml">Title 1</a>"#).unwrap();
        assert!(first < second);
    }

    #[test]
    fn only_existing_referenced_images_are_collected() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        std::fs::write(dir.path().join("pic.webp"), b"RIFF")?;
        let chapters = vec![chapter(
            "chapter-0",
            0,
            "{{image:pic.webp|Caption}}\n{{image:missing.png}}\n{{image:../secret.png}}",
        )];

        let images = referenced_images(&chapters, Some(dir.path()));
        let names = images.iter().map(|i| i.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["pic.webp"]);
        assert!(referenced_images(&chapters, None).is_empty());
        Ok(())
    }

    #[test]
    fn existing_output_needs_force() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let out = dir.path().join("book.epub");
        let chapters = vec![chapter("chapter-0", 0, "text")];
        let mut options = EpubOptions {
            force: false,
            title: "Book".to_owned(),
            lang: String::new(),
            theme: Theme::default(),
            images_dir: None,
        };

        create_from_chapters(&chapters, &out, &options)?;
        let err = create_from_chapters(&chapters, &out, &options).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        options.force = true;
        create_from_chapters(&chapters, &out, &options)?;

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&out)?)?;
        assert_eq!(archive.by_index(0)?.name(), "mimetype");
        assert!(archive.by_name("OEBPS/toc.ncx").is_err());
        Ok(())
    }
}
