//! Reference dataset: known traffic origins mapped to a content category.
//!
//! The on-disk format is a flat JSON object,
//! `{ "facebook.com": "SOURCE_CATEGORY_SOCIAL", ... }`. Entries whose value is
//! not a known category are skipped with a warning. Loading is fail-soft:
//! [`DatasetLoader::load`] logs the problem and hands back an empty dataset so
//! classification keeps running on pattern rules alone.

use crate::core::text::{normalize, strip_www};
use crate::domain::model::Category;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Dataset shipped inside the binary.
pub const BUNDLED_DATASET: &str = include_str!("../../data/source_category_map.json");

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Bundled,
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// `http(s)://` locations are fetched, anything else is read from disk.
    pub fn from_location(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DatasetSource::Url(location.to_string())
        } else {
            DatasetSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Bundled => f.write_str("bundled dataset"),
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    // 保留檔案中的順序，供建議清單使用
    entries: Vec<(String, Category)>,
    index: HashMap<String, usize>,
}

impl ReferenceDataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_DATASET, "bundled dataset")
    }

    /// Build from `(key, category)` pairs; a repeated key keeps its first
    /// position and takes the last category.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Category)>,
        K: AsRef<str>,
    {
        let mut dataset = Self::default();
        for (key, category) in entries {
            dataset.insert(key.as_ref(), category);
        }
        dataset
    }

    pub fn from_json_str(content: &str, source_name: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let object = value.as_object().ok_or_else(|| EtlError::DatasetError {
            source_name: source_name.to_string(),
            message: "expected a JSON object at the top level".to_string(),
        })?;

        let mut dataset = Self::default();
        for (key, raw) in object {
            let category = match raw.as_str().map(str::parse::<Category>) {
                Some(Ok(category)) => category,
                Some(Err(reason)) => {
                    tracing::warn!(
                        "Skipping dataset entry '{}' from {}: {}",
                        key,
                        source_name,
                        reason
                    );
                    continue;
                }
                None => {
                    tracing::warn!(
                        "Skipping dataset entry '{}' from {}: value is not a string",
                        key,
                        source_name
                    );
                    continue;
                }
            };
            dataset.insert(key, category);
        }

        Ok(dataset)
    }

    fn insert(&mut self, key: &str, category: Category) {
        let key = normalize(key);
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = category,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, category));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact lookup of an already-normalized key.
    pub fn get(&self, key: &str) -> Option<Category> {
        self.index.get(key).map(|&position| self.entries[position].1)
    }

    /// Category of a raw source value, falling back to the `www.`-stripped form.
    pub fn category_of(&self, source: &str) -> Option<Category> {
        let source = normalize(source);
        if source.is_empty() {
            return None;
        }
        self.get(&source).or_else(|| self.get(strip_www(&source)))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Category)> {
        self.entries.iter().map(|(key, category)| (key.as_str(), *category))
    }

    /// Keys of one category in dataset order.
    pub fn keys_in_category(&self, category: Category) -> Vec<&str> {
        self.entries()
            .filter(|(_, c)| *c == category)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.iter().map(|(key, _)| key.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn count_by_category(&self) -> HashMap<Category, usize> {
        let mut counts = HashMap::new();
        for (_, category) in &self.entries {
            *counts.entry(*category).or_insert(0) += 1;
        }
        counts
    }
}

pub struct DatasetLoader {
    client: Client,
}

impl DatasetLoader {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Load and surface any failure to the caller.
    pub async fn try_load(&self, source: &DatasetSource) -> Result<ReferenceDataset> {
        let name = source.to_string();
        let dataset = match source {
            DatasetSource::Bundled => ReferenceDataset::bundled()?,
            DatasetSource::File(path) => {
                tracing::debug!("Reading reference dataset from {}", path.display());
                let content = tokio::fs::read_to_string(path).await?;
                ReferenceDataset::from_json_str(&content, &name)?
            }
            DatasetSource::Url(url) => {
                tracing::debug!("Fetching reference dataset from {}", url);
                let response = self.client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(EtlError::DatasetError {
                        source_name: name,
                        message: format!("HTTP error status {}", status),
                    });
                }
                let content = response.text().await?;
                ReferenceDataset::from_json_str(&content, &name)?
            }
        };

        tracing::info!(
            "Reference dataset loaded from {} ({} entries)",
            name,
            dataset.len()
        );
        Ok(dataset)
    }

    /// Fail-soft load: any error degrades to an empty dataset.
    pub async fn load(&self, source: &DatasetSource) -> ReferenceDataset {
        match self.try_load(source).await {
            Ok(dataset) => dataset,
            Err(e) => {
                tracing::warn!(
                    "Could not load reference dataset from {}: {}. Site matching is disabled, classification uses pattern rules only",
                    source,
                    e
                );
                ReferenceDataset::empty()
            }
        }
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn load_reference_dataset(source: &DatasetSource) -> ReferenceDataset {
    DatasetLoader::new().load(source).await
}
