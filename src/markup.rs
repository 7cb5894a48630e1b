//! Lightweight chapter markup.
//!
//! Chapter bodies are plain lines with a handful of conventions: `#`/`##`/`###`
//! headings, `> ` quotes, `- `/`* ` list items, `{{image:file|caption}}`
//! illustrations and `**bold**`/`*italic*` emphasis. A trailing translator's
//! notes section starts at the first line mentioning one of [`NOTE_KEYWORDS`].

use serde::{Deserialize, Serialize};

/// Markers that open the translator's notes, in every published language.
pub const NOTE_KEYWORDS: &[&str] = &[
    "Translator's Note",
    "Translator's Notes",
    "Translators Note",
    "Translator’s Note",
    "Translator’s Notes",
    "অনুবাদকের নোট",
    "অনুবাদকের কথা",
    "অনুবাদকের মন্তব্য",
    "अनुवादक की टिप्पणी",
    "अनुवादक का नोट",
    "অনুবাদকৰ টোকা",
    "অনুবাদকৰ কথা",
    "ଅନୁବାଦକଙ୍କ ଟିପ୍ପଣୀ",
    "ଅନୁବାଦକଙ୍କ କଥା",
];

const IMAGE_OPEN: &str = "{{image:";
const IMAGE_CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    /// Bold span; may contain italic spans but never another bold span.
    Strong(Vec<Inline>),
    /// Italic span; may wrap whole bold spans.
    Emphasis(Vec<Inline>),
}

impl Inline {
    fn push_plain_text(&self, out: &mut String) {
        match self {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(children) | Inline::Emphasis(children) => {
                for child in children {
                    child.push_plain_text(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentNode {
    Heading {
        level: u8,
        text: String,
    },
    Blockquote {
        inlines: Vec<Inline>,
    },
    ListItem {
        inlines: Vec<Inline>,
    },
    Image {
        filename: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Paragraph {
        inlines: Vec<Inline>,
        /// First paragraph of the body; drawn with a drop cap.
        is_first: bool,
        is_note: bool,
    },
}

impl ContentNode {
    /// Text without markup, as it would be read aloud.
    pub fn plain_text(&self) -> String {
        match self {
            ContentNode::Heading { text, .. } => text.clone(),
            ContentNode::Image { caption, .. } => caption.clone().unwrap_or_default(),
            ContentNode::Blockquote { inlines }
            | ContentNode::ListItem { inlines }
            | ContentNode::Paragraph { inlines, .. } => plain_text(inlines),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedChapter {
    pub body: Vec<ContentNode>,
    pub notes: Vec<ContentNode>,
}

pub fn render(content: &str) -> RenderedChapter {
    let lines = content
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    let notes_start = notes_start(&lines).unwrap_or(lines.len());
    let (body_lines, note_lines) = lines.split_at(notes_start);

    let mut first_paragraph_pending = true;
    let body = body_lines
        .iter()
        .map(|line| classify_line(line, false, &mut first_paragraph_pending))
        .collect();
    let notes = note_lines
        .iter()
        .map(|line| classify_line(line, true, &mut first_paragraph_pending))
        .collect();

    RenderedChapter { body, notes }
}

/// Index of the first line that opens the translator's notes.
pub fn notes_start(lines: &[&str]) -> Option<usize> {
    let keywords = NOTE_KEYWORDS
        .iter()
        .map(|kw| kw.to_lowercase())
        .collect::<Vec<_>>();

    lines.iter().position(|line| {
        let line = line.to_lowercase();
        keywords.iter().any(|kw| line.contains(kw.as_str()))
    })
}

fn classify_line(line: &str, is_note: bool, first_paragraph_pending: &mut bool) -> ContentNode {
    if let Some(text) = line.strip_prefix("### ") {
        return heading(3, text);
    }
    if let Some(text) = line.strip_prefix("## ") {
        return heading(2, text);
    }
    if let Some(text) = line.strip_prefix("# ") {
        return heading(1, text);
    }
    if let Some(text) = line.strip_prefix("> ") {
        return ContentNode::Blockquote {
            inlines: parse_inline(text),
        };
    }
    if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return ContentNode::ListItem {
            inlines: parse_inline(text),
        };
    }
    if let Some(node) = parse_image_directive(line) {
        return node;
    }

    let is_first = !is_note && std::mem::take(first_paragraph_pending);
    ContentNode::Paragraph {
        inlines: parse_inline(line),
        is_first,
        is_note,
    }
}

fn heading(level: u8, text: &str) -> ContentNode {
    ContentNode::Heading {
        level,
        text: text.to_owned(),
    }
}

/// `{{image:file.webp|Caption}}` at the start of a line; anything after `}}` is ignored.
pub fn parse_image_directive(line: &str) -> Option<ContentNode> {
    let rest = line.strip_prefix(IMAGE_OPEN)?;
    let directive = &rest[..rest.find(IMAGE_CLOSE)?];

    let mut parts = directive.split('|');
    let filename = parts.next().unwrap_or_default().trim().to_owned();
    let caption = parts
        .next()
        .map(str::trim)
        .filter(|caption| !caption.is_empty())
        .map(str::to_owned);

    Some(ContentNode::Image { filename, caption })
}

/// Bold spans first, then italic spans over the result.
///
/// An italic span may enclose whole bold spans (`*a **b** c*`). One whose
/// closing delimiter would land inside a bold span leaves its opener literal.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let pieces = split_delimited(text, &["**", "__"]);
    parse_italic(&pieces)
}

fn parse_italic(pieces: &[Segment<'_>]) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut plain = String::new();
    let mut idx = 0usize;
    let mut cursor = 0usize;

    while idx < pieces.len() {
        let text = match pieces[idx] {
            Segment::Wrapped(inner) => {
                flush_text(&mut plain, &mut inlines);
                inlines.push(strong(inner));
                idx += 1;
                cursor = 0;
                continue;
            }
            Segment::Plain(text) => text,
        };
        if cursor >= text.len() {
            idx += 1;
            cursor = 0;
            continue;
        }

        let rest = &text[cursor..];
        let span = ["*", "_"]
            .iter()
            .filter(|&&delim| rest.starts_with(delim))
            .find_map(|&delim| italic_span(pieces, idx, cursor + delim.len(), delim));

        match span {
            Some(span) => {
                flush_text(&mut plain, &mut inlines);
                inlines.push(Inline::Emphasis(span.children));
                idx = span.end_piece;
                cursor = span.end_cursor;
            }
            None => {
                let ch_len = rest.chars().next().map_or(1, char::len_utf8);
                plain.push_str(&rest[..ch_len]);
                cursor += ch_len;
            }
        }
    }
    flush_text(&mut plain, &mut inlines);
    inlines
}

struct ItalicSpan {
    children: Vec<Inline>,
    /// Piece and byte offset just past the closing delimiter.
    end_piece: usize,
    end_cursor: usize,
}

/// Finds the closing `delim` for an opener ending at `pieces[idx]`, byte `start`.
///
/// Bold spans are stepped over whole; a bold span containing `delim` is where
/// the leftmost close would fall, so the span is rejected there.
fn italic_span(
    pieces: &[Segment<'_>],
    idx: usize,
    start: usize,
    delim: &str,
) -> Option<ItalicSpan> {
    let mut children = Vec::new();
    let mut piece = idx;
    let mut from = start;

    while let Some(segment) = pieces.get(piece) {
        match *segment {
            Segment::Plain(text) => {
                let tail = &text[from..];
                if let Some(close) = tail.find(delim) {
                    let content = &tail[..close];
                    if content.contains(['\n', '\r']) {
                        return None;
                    }
                    if !content.is_empty() {
                        children.push(Inline::Text(content.to_owned()));
                    }
                    return Some(ItalicSpan {
                        children,
                        end_piece: piece,
                        end_cursor: from + close + delim.len(),
                    });
                }
                if tail.contains(['\n', '\r']) {
                    return None;
                }
                if !tail.is_empty() {
                    children.push(Inline::Text(tail.to_owned()));
                }
            }
            Segment::Wrapped(inner) => {
                if inner.contains(delim) || inner.contains(['\n', '\r']) {
                    return None;
                }
                children.push(strong(inner));
            }
        }
        piece += 1;
        from = 0;
    }
    None
}

fn strong(inner: &str) -> Inline {
    Inline::Strong(parse_italic(&[Segment::Plain(inner)]))
}

fn flush_text(plain: &mut String, inlines: &mut Vec<Inline>) {
    if !plain.is_empty() {
        inlines.push(Inline::Text(std::mem::take(plain)));
    }
}

pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.push_plain_text(&mut out);
    }
    out
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Plain(&'a str),
    Wrapped(&'a str),
}

/// Leftmost, non-greedy `<d>...<d>` matching. Delimiters are tried in order at
/// each position and a span never crosses a line break.
fn split_delimited<'a>(text: &'a str, delimiters: &[&str]) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut plain_start = 0usize;
    let mut cursor = 0usize;

    while cursor < text.len() {
        let rest = &text[cursor..];
        let found = delimiters.iter().find_map(|&delim| {
            let inner = rest.strip_prefix(delim)?;
            let close = inner.find(delim)?;
            let content = &inner[..close];
            if content.contains(['\n', '\r']) {
                return None;
            }
            Some((delim.len(), content))
        });

        match found {
            Some((delim_len, content)) => {
                if plain_start < cursor {
                    segments.push(Segment::Plain(&text[plain_start..cursor]));
                }
                segments.push(Segment::Wrapped(content));
                cursor += delim_len * 2 + content.len();
                plain_start = cursor;
            }
            None => {
                cursor += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if plain_start < text.len() {
        segments.push(Segment::Plain(&text[plain_start..]));
    }
    segments
}
