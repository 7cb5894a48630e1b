use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::formats::Language;

pub const DEFAULT_SHEET_BASE_URL: &str = "https://docs.google.com/spreadsheets/d/1b6pmIChESpeLzmdGseWYCSXoTisvQhRnrRv5nnLsiqU/export?format=csv";

/// Where chapters come from: the published spreadsheet and its per-language sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<Language>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            languages: default_languages(),
        }
    }
}

impl SheetConfig {
    /// Defaults, then the optional YAML file, then `AMRITO_SHEET_BASE_URL`.
    pub fn load(sources: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match sources {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .with_context(|| format!("read sources: {}", path.display()))?;
                serde_yaml::from_str::<SheetConfig>(&yaml)
                    .with_context(|| format!("parse sources: {}", path.display()))?
            }
            None => SheetConfig::default(),
        };

        if let Ok(base_url) = std::env::var("AMRITO_SHEET_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url.trim().to_owned();
        }

        if config.languages.is_empty() {
            anyhow::bail!("sources must list at least one language");
        }
        Ok(config)
    }

    pub fn language(&self, code: &str) -> anyhow::Result<&Language> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| {
                let known = self
                    .languages
                    .iter()
                    .map(|l| l.code.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                anyhow::anyhow!("unknown language: {code} (known: {known})")
            })
    }

    /// Export URL for one sheet of the spreadsheet.
    pub fn sheet_url(&self, gid: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("parse sheet base url: {}", self.base_url))?;
        url.query_pairs_mut().append_pair("gid", gid);
        Ok(url)
    }
}

/// Picks the CSV export to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Gid(String),
    Url(String),
}

impl SheetSelector {
    pub fn resolve(&self, config: &SheetConfig) -> anyhow::Result<Url> {
        match self {
            SheetSelector::Gid(gid) => config.sheet_url(gid),
            SheetSelector::Url(raw) => {
                let url = Url::parse(raw).with_context(|| format!("parse sheet url: {raw}"))?;
                if url.scheme() != "http" && url.scheme() != "https" {
                    anyhow::bail!("sheet url must be http/https: {url}");
                }
                Ok(url)
            }
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_SHEET_BASE_URL.to_owned()
}

fn default_languages() -> Vec<Language> {
    [
        ("bn", "বাংলা", "573962383"),
        ("en", "English", "1711803682"),
        ("hi", "हिन्दी", "1209961589"),
        ("as", "অসমীয়া", "54556265"),
        ("or", "ଓଡ଼ିଆ", "1435471202"),
    ]
    .into_iter()
    .map(|(code, name, gid)| Language {
        code: code.to_owned(),
        name: name.to_owned(),
        gid: gid.to_owned(),
    })
    .collect()
}
