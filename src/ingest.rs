//! Chapter ingestion: CSV export -> ordered chapters.

use std::cmp::Ordering;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::csv::Row;
use crate::formats::Chapter;

pub const UNTITLED: &str = "Untitled";

/// One spreadsheet data row with positional columns resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChapterRow {
    pub position: usize,
    pub title: String,
    pub subtitle: String,
    pub writer: String,
    pub content: String,
    pub sort_order: SortOrder,
}

impl RawChapterRow {
    pub fn from_row(position: usize, row: &[String]) -> Self {
        let column = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or_default();

        let title = match column(0) {
            "" => UNTITLED.to_owned(),
            title => title.to_owned(),
        };
        let writer = row.get(2).map(String::as_str).unwrap_or_default();

        Self {
            position,
            title,
            subtitle: column(1).to_owned(),
            writer: column(2).to_owned(),
            content: column(3).to_owned(),
            sort_order: sort_order(writer, position),
        }
    }

    fn into_chapter(self, index: usize) -> Chapter {
        Chapter {
            id: format!("chapter-{}", self.position),
            title: self.title,
            subtitle: self.subtitle,
            writer: self.writer,
            content: self.content,
            index,
        }
    }
}

/// A non-negative integer of any length, kept as its digits without leading zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder(String);

impl SortOrder {
    fn from_digits(digits: &str) -> Self {
        Self(digits.trim_start_matches('0').to_owned())
    }
}

impl Ord for SortOrder {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for SortOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Digits of the sort token read as one number, or the row position when there are none.
pub fn sort_order(token: &str, position: usize) -> SortOrder {
    let digits = token
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    if digits.is_empty() {
        return SortOrder::from_digits(&position.to_string());
    }
    SortOrder::from_digits(&digits)
}

/// Maps parsed rows (header included) to chapters in display order.
pub fn chapters_from_rows(rows: &[Row]) -> Vec<Chapter> {
    let mut candidates = rows
        .iter()
        .skip(1)
        .enumerate()
        .map(|(position, row)| RawChapterRow::from_row(position, row))
        .filter(|row| !row.content.is_empty())
        .collect::<Vec<_>>();

    candidates.sort_by(|a, b| a.sort_order.cmp(&b.sort_order));

    candidates
        .into_iter()
        .enumerate()
        .map(|(index, row)| row.into_chapter(index))
        .collect()
}

pub fn chapters_from_csv(text: &str) -> Vec<Chapter> {
    let rows = crate::csv::parse(text);
    chapters_from_rows(&rows)
}

pub fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .context("build sheet http client")
}

/// Fetches the CSV export. Any failure is logged and yields no chapters.
pub async fn fetch_chapters(client: &reqwest::Client, url: &Url) -> Vec<Chapter> {
    match try_fetch_chapters(client, url).await {
        Ok(chapters) => {
            tracing::info!(url = %url, chapters = chapters.len(), "fetched chapters");
            chapters
        }
        Err(err) => {
            tracing::error!(url = %url, err = %format!("{err:#}"), "fetch chapters failed");
            Vec::new()
        }
    }
}

pub async fn try_fetch_chapters(
    client: &reqwest::Client,
    url: &Url,
) -> anyhow::Result<Vec<Chapter>> {
    let response = client
        .get(url.clone())
        .header(
            USER_AGENT,
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
        )
        .header(ACCEPT, "text/csv,text/plain;q=0.9,*/*;q=0.8")
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("sheet export responded with {status}");
    }

    let text = response.text().await.context("read sheet export body")?;
    tracing::debug!(bytes = text.len(), "downloaded sheet export");
    Ok(chapters_from_csv(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|f| (*f).to_owned()).collect()
    }

    fn header() -> Row {
        row(&["name", "date", "writer", "data"])
    }

    fn key(n: u64) -> SortOrder {
        SortOrder::from_digits(&n.to_string())
    }

    #[test]
    fn sort_tokens_use_digits_or_fall_back_to_position() {
        assert_eq!(sort_order("3", 0), key(3));
        assert_eq!(sort_order("1", 1), key(1));
        assert_eq!(sort_order("2x", 2), key(2));
        assert_eq!(sort_order("abc", 3), key(3));
        assert_eq!(sort_order("Ch. 1-2", 9), key(12));
        assert_eq!(sort_order("007", 0), key(7));
        assert_eq!(sort_order("0", 5), sort_order("", 0));
    }

    #[test]
    fn oversized_sort_tokens_keep_numeric_order() {
        let smaller = sort_order("99999999999999999999998", 0);
        let larger = sort_order("99999999999999999999999", 1);
        let longer = sort_order("100000000000000000000000", 2);
        assert!(key(u64::MAX) < smaller);
        assert!(smaller < larger);
        assert!(larger < longer);

        let rows = vec![
            header(),
            row(&["Longer", "", "100000000000000000000000", "a"]),
            row(&["Larger", "", "99999999999999999999999", "b"]),
            row(&["Smaller", "", "99999999999999999999998", "c"]),
            row(&["Small", "", "4", "d"]),
        ];
        let titles = chapters_from_rows(&rows)
            .into_iter()
            .map(|c| c.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Small", "Smaller", "Larger", "Longer"]);
    }

    #[test]
    fn chapters_are_sorted_by_token_and_keep_row_ids() {
        let rows = vec![
            header(),
            row(&["Three", "", "3", "c"]),
            row(&["One", "", "1", "a"]),
            row(&["Two", "", "2x", "b"]),
            row(&["Fallback", "", "abc", "d"]),
        ];

        let chapters = chapters_from_rows(&rows);
        let summary = chapters
            .iter()
            .map(|c| (c.title.as_str(), c.id.as_str(), c.index))
            .collect::<Vec<_>>();
        // "abc" falls back to position 3, which ties with "3" and sorts after it.
        assert_eq!(
            summary,
            vec![
                ("One", "chapter-1", 0),
                ("Two", "chapter-2", 1),
                ("Three", "chapter-0", 2),
                ("Fallback", "chapter-3", 3),
            ]
        );
    }

    #[test]
    fn equal_sort_orders_keep_row_order() {
        let rows = vec![
            header(),
            row(&["B", "", "5", "x"]),
            row(&["A", "", "5", "y"]),
        ];
        let titles = chapters_from_rows(&rows)
            .into_iter()
            .map(|c| c.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn rows_without_content_are_dropped_before_indexing() {
        let rows = vec![
            header(),
            row(&["Empty", "", "1", "   "]),
            row(&["Kept", "", "2", "body"]),
        ];
        let chapters = chapters_from_rows(&rows);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].id, "chapter-1");
        assert_eq!(chapters[0].index, 0);
    }

    #[test]
    fn missing_columns_use_defaults() {
        let rows = vec![header(), row(&["", "  sub  ", " 7 ", " text "]), row(&["Short"])];
        let chapters = chapters_from_rows(&rows);
        assert_eq!(chapters.len(), 1);
        let chapter = &chapters[0];
        assert_eq!(chapter.title, UNTITLED);
        assert_eq!(chapter.subtitle, "sub");
        assert_eq!(chapter.writer, "7");
        assert_eq!(chapter.content, "text");
    }

    #[test]
    fn header_only_or_garbage_yields_no_chapters() {
        assert!(chapters_from_csv("").is_empty());
        assert!(chapters_from_csv("name,date,writer,data\n").is_empty());
        assert!(chapters_from_csv("\"unterminated").is_empty());
    }

    #[test]
    fn multiline_quoted_content_survives_ingestion() {
        let csv = "name,date,writer,data\n\
                   First,,1,\"Para one.\n\nPara \"\"two\"\", with comma.\"\n";
        let chapters = chapters_from_csv(csv);
        assert_eq!(chapters.len(), 1);
        assert_eq!(
            chapters[0].content,
            "Para one.\n\nPara \"two\", with comma."
        );
    }
}
