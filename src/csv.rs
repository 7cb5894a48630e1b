//! Quote-aware CSV reader for the published spreadsheet export.
//!
//! Quoted fields may contain commas, doubled quotes and line breaks. Rows whose
//! fields are all blank are skipped, except for a trailing row without a final
//! line terminator, which is always kept when it has any content at all.

pub type Row = Vec<String>;

pub fn parse(text: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut row: Row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                let finished = std::mem::take(&mut row);
                if finished.iter().any(|f| !f.trim().is_empty()) {
                    rows.push(finished);
                }
            }
            _ => field.push(ch),
        }
    }

    if !row.is_empty() || !field.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Encodes one row, quoting fields that contain a delimiter, quote or line break.
pub fn encode_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|field| {
            if field.contains([',', '"', '\n', '\r']) {
                format!("\"{}\"", field.replace('"', "\"\""))
            } else {
                (*field).to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
