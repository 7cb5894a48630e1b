use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::formats::Chapter;

/// Writes to `out`, or stdout when no path is given.
pub fn write_text(out: Option<&Path>, contents: &str, force: bool) -> anyhow::Result<()> {
    let Some(out) = out else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(contents.as_bytes())
            .context("write stdout")?;
        stdout.flush().context("flush stdout")?;
        return Ok(());
    };

    let mut file = open_output(out, force)?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write output: {}", out.display()))?;
    file.flush()
        .with_context(|| format!("flush output: {}", out.display()))?;
    Ok(())
}

/// Opens `out` for writing, creating parent dirs. Refuses to replace an existing file unless `force`.
pub fn open_output(out: &Path, force: bool) -> anyhow::Result<File> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options
        .open(out)
        .with_context(|| format!("open output: {}", out.display()))
}

pub fn write_chapters(out: Option<&Path>, chapters: &[Chapter], force: bool) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(chapters).context("serialize chapters json")?;
    json.push('\n');
    write_text(out, &json, force)
}

pub fn read_chapters(path: &Path) -> anyhow::Result<Vec<Chapter>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read chapters: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parse chapters: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_output_requires_force() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let out = dir.path().join("nested/chapters.json");

        write_chapters(Some(&out), &[], false)?;
        assert!(write_chapters(Some(&out), &[], false).is_err());
        write_chapters(Some(&out), &[], true)?;
        assert!(read_chapters(&out)?.is_empty());
        Ok(())
    }
}
