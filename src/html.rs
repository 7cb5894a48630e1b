//! HTML output for rendered chapters.
//!
//! Emits XHTML-compatible markup (void elements self-closed) so the same
//! fragments go into both the standalone HTML book and EPUB documents.

use crate::formats::{Chapter, Theme, ThemeMode};
use crate::markup::{ContentNode, Inline, RenderedChapter};

pub const NOTES_LABEL: &str = "নোটস (Notes)";

#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Prefix joined with an image directive's filename to build `src`.
    pub image_prefix: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            image_prefix: "images/".to_owned(),
        }
    }
}

pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

pub fn render_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape(text)),
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                out.push_str(&render_inlines(children));
                out.push_str("</em>");
            }
            Inline::Strong(children) => {
                out.push_str("<strong>");
                out.push_str(&render_inlines(children));
                out.push_str("</strong>");
            }
        }
    }
    out
}

/// Body and notes of one chapter; notes go into a trailing `<aside>`.
pub fn render_fragment(rendered: &RenderedChapter, options: &HtmlOptions) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"chapter-body\">\n");
    render_nodes(&rendered.body, options, &mut out);
    out.push_str("</div>\n");

    if !rendered.notes.is_empty() {
        out.push_str("<aside class=\"translator-notes\">\n");
        out.push_str(&format!(
            "<p class=\"notes-label\">{}</p>\n",
            escape(NOTES_LABEL)
        ));
        render_nodes(&rendered.notes, options, &mut out);
        out.push_str("</aside>\n");
    }
    out
}

fn render_nodes(nodes: &[ContentNode], options: &HtmlOptions, out: &mut String) {
    let mut in_list = false;
    for node in nodes {
        let is_list_item = matches!(node, ContentNode::ListItem { .. });
        if in_list && !is_list_item {
            out.push_str("</ul>\n");
            in_list = false;
        }

        match node {
            ContentNode::Heading { level, text } => {
                let level = (*level).clamp(1, 3);
                out.push_str(&format!("<h{level}>{}</h{level}>\n", escape(text)));
            }
            ContentNode::Blockquote { inlines } => {
                out.push_str(&format!(
                    "<blockquote>{}</blockquote>\n",
                    render_inlines(inlines)
                ));
            }
            ContentNode::ListItem { inlines } => {
                if !in_list {
                    out.push_str("<ul>\n");
                    in_list = true;
                }
                out.push_str(&format!("<li>{}</li>\n", render_inlines(inlines)));
            }
            ContentNode::Image { filename, caption } => {
                if filename.is_empty() {
                    continue;
                }
                let src = format!("{}{filename}", options.image_prefix);
                let alt = caption.as_deref().unwrap_or("Illustration");
                out.push_str("<figure>\n");
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\" />\n",
                    escape(&src),
                    escape(alt)
                ));
                if let Some(caption) = caption {
                    out.push_str(&format!("<figcaption>{}</figcaption>\n", escape(caption)));
                }
                out.push_str("</figure>\n");
            }
            ContentNode::Paragraph {
                inlines,
                is_first,
                is_note,
            } => {
                let class = match (is_first, is_note) {
                    (true, _) => " class=\"dropcap\"",
                    (false, true) => " class=\"note\"",
                    (false, false) => "",
                };
                out.push_str(&format!("<p{class}>{}</p>\n", render_inlines(inlines)));
            }
        }
    }
    if in_list {
        out.push_str("</ul>\n");
    }
}

/// `<section>` for one chapter, anchored by its id.
pub fn render_chapter_section(chapter: &Chapter, options: &HtmlOptions) -> String {
    let rendered = crate::markup::render(&chapter.content);

    let mut out = String::new();
    out.push_str(&format!(
        "<section class=\"chapter\" id=\"{}\">\n",
        escape(&chapter.id)
    ));
    out.push_str("<header>\n");
    out.push_str(&format!(
        "<p class=\"chapter-number\">{}</p>\n",
        chapter.index + 1
    ));
    out.push_str(&format!(
        "<h1 class=\"chapter-title\">{}</h1>\n",
        escape(&chapter.title)
    ));
    if !chapter.subtitle.is_empty() {
        out.push_str(&format!(
            "<p class=\"chapter-subtitle\">{}</p>\n",
            escape(&chapter.subtitle)
        ));
    }
    out.push_str("</header>\n");
    out.push_str(&render_fragment(&rendered, options));
    out.push_str("</section>\n");
    out
}

pub fn theme_css(theme: &Theme) -> String {
    let (background, foreground, accent) = match theme.mode {
        ThemeMode::Sepia => ("#f4ecd8", "#5b4636", "#92400e"),
        ThemeMode::Light => ("#ffffff", "#1c1917", "#b45309"),
        ThemeMode::Dark => ("#121416", "#cbd5e1", "#f59e0b"),
        ThemeMode::Soft => ("#f5f5f0", "#44403c", "#a16207"),
    };

    format!(
        r#"body {{ background: {background}; color: {foreground}; font-family: 'Tiro Bangla', serif; font-size: {font_size}px; line-height: 1.7; max-width: 42em; margin: 0 auto; padding: 1.5em; }}
h1, h2, h3 {{ color: {accent}; }}
blockquote {{ margin: 2em 0; padding: 0.5em 1.2em; border-left: 4px solid {accent}; font-style: italic; }}
figure {{ margin: 2.5em 0; text-align: center; }}
figure img {{ max-width: 100%; max-height: 500px; }}
figcaption {{ font-size: 0.8em; font-style: italic; opacity: 0.8; }}
p.dropcap::first-letter {{ float: left; font-size: 3.2em; line-height: 0.9; padding-right: 0.08em; color: {accent}; }}
aside.translator-notes {{ margin-top: 4em; padding: 1.5em 2em; border: 1px dashed {accent}; border-radius: 1.5em; font-size: 0.75em; }}
aside.translator-notes p.note {{ font-style: italic; }}
p.notes-label {{ text-transform: uppercase; letter-spacing: 0.2em; font-weight: bold; color: {accent}; }}
.chapter-number {{ text-align: center; opacity: 0.6; }}
.chapter-subtitle {{ text-align: center; font-style: italic; }}
nav.toc ol {{ padding-left: 1.2em; }}
"#,
        font_size = theme.font_size,
    )
}

/// Whole book as one HTML page: table of contents then every chapter in order.
pub fn render_book(
    title: &str,
    lang: &str,
    chapters: &[Chapter],
    theme: &Theme,
    options: &HtmlOptions,
) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n");
    out.push_str(&format!("<html lang=\"{}\">\n", escape(lang)));
    out.push_str("<head>\n");
    out.push_str("<meta charset=\"utf-8\" />\n");
    out.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n",
    );
    out.push_str(&format!("<title>{}</title>\n", escape(title)));
    out.push_str("<style>\n");
    out.push_str(&theme_css(theme));
    out.push_str("</style>\n");
    out.push_str("</head>\n");
    out.push_str("<body>\n");
    out.push_str(&format!("<h1 class=\"book-title\">{}</h1>\n", escape(title)));

    out.push_str("<nav class=\"toc\">\n<ol>\n");
    for chapter in chapters {
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a></li>\n",
            escape(&chapter.id),
            escape(&chapter.title)
        ));
    }
    out.push_str("</ol>\n</nav>\n");

    for chapter in chapters {
        out.push_str(&render_chapter_section(chapter, options));
    }

    out.push_str("</body>\n");
    out.push_str("</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::render;

    #[test]
    fn inline_markup_is_escaped_and_nested() {
        let inlines = crate::markup::parse_inline("a < b **x *y*** & c");
        let html = render_inlines(&inlines);
        assert!(html.starts_with("a &lt; b <strong>x "));
        assert!(html.contains("&amp; c"));
    }

    #[test]
    fn italic_around_bold_nests_the_tags() {
        let inlines = crate::markup::parse_inline("*a **b** c*");
        assert_eq!(render_inlines(&inlines), "<em>a <strong>b</strong> c</em>");
    }

    #[test]
    fn consecutive_list_items_share_one_list() {
        let html = render_fragment(&render("- a\n- b\nAfter\n- c"), &HtmlOptions::default());
        assert_eq!(html.matches("<ul>").count(), 2);
        assert_eq!(html.matches("</ul>").count(), 2);
        assert!(html.contains("<li>a</li>\n<li>b</li>\n</ul>\n<p class=\"dropcap\">After</p>"));
    }

    #[test]
    fn notes_render_in_an_aside() {
        let html = render_fragment(
            &render("Body\nTranslator's Note\nExplained"),
            &HtmlOptions::default(),
        );
        let aside = html.find("<aside").unwrap();
        assert!(html[..aside].contains("<p class=\"dropcap\">Body</p>"));
        assert!(html[aside..].contains("<p class=\"note\">Explained</p>"));
        assert!(html[aside..].contains(NOTES_LABEL));
    }

    #[test]
    fn images_use_prefix_and_caption() {
        let options = HtmlOptions {
            image_prefix: "/images/".to_owned(),
        };
        let html = render_fragment(&render("{{image:pic.webp|A \"caption\"}}"), &options);
        assert!(html.contains("<img src=\"/images/pic.webp\" alt=\"A &quot;caption&quot;\" />"));
        assert!(html.contains("<figcaption>A &quot;caption&quot;</figcaption>"));
    }

    #[test]
    fn book_lists_chapters_in_display_order() {
        let chapters = vec![
            Chapter {
                id: "chapter-4".to_owned(),
                title: "Dawn".to_owned(),
                subtitle: String::new(),
                writer: "1".to_owned(),
                content: "First".to_owned(),
                index: 0,
            },
            Chapter {
                id: "chapter-0".to_owned(),
                title: "Dusk".to_owned(),
                subtitle: "1920".to_owned(),
                writer: "2".to_owned(),
                content: "Second".to_owned(),
                index: 1,
            },
        ];
        let html = render_book(
            "Book",
            "en",
            &chapters,
            &Theme::default(),
            &HtmlOptions::default(),
        );
        let dawn = html.find("id=\"chapter-4\"").unwrap();
        let dusk = html.find("id=\"chapter-0\"").unwrap();
        assert!(dawn < dusk);
        assert!(html.contains("<p class=\"chapter-subtitle\">1920</p>"));
        assert!(html.contains("font-size: 20px"));
    }
}
