//! Runtime configuration: source table locations and review API settings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Where the source tables live.
///
/// Stored as a JSON object on disk; omitted keys fall back to the default
/// data directory layout:
/// ```json
/// {
///   "books": "data/updated_books.csv",
///   "authors": "data/classified_authors.csv",
///   "author_books": "data/author_books.csv",
///   "isbn_map": "data/asin_best_book_id.csv",
///   "restrict_isbn_map": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub books: PathBuf,
    pub authors: PathBuf,
    pub author_books: PathBuf,
    pub isbn_map: PathBuf,
    /// Keep only identifier rows that point at a book in `books`.
    pub restrict_isbn_map: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            books: PathBuf::from("data/updated_books.csv"),
            authors: PathBuf::from("data/classified_authors.csv"),
            author_books: PathBuf::from("data/author_books.csv"),
            isbn_map: PathBuf::from("data/asin_best_book_id.csv"),
            restrict_isbn_map: true,
        }
    }
}

impl DataConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading data config '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing data config '{path}'"))?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

pub const DEFAULT_BASE_URL: &str = "https://www.goodreads.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Review API settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodreadsConfig {
    pub api_key: String,
    pub base_url: String,
    /// Upper bound on a single page request.
    pub timeout: Duration,
}

impl GoodreadsConfig {
    /// Reads `GOODREADS_API_KEY` (required), `GOODREADS_BASE_URL` and
    /// `GOODREADS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("GOODREADS_API_KEY").context("GOODREADS_API_KEY must be set")?;
        let base_url = lookup("GOODREADS_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = match lookup("GOODREADS_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("GOODREADS_TIMEOUT_SECS is not a number: {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;
    use std::fs;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_goodreads_config_defaults() {
        let config = GoodreadsConfig::from_lookup(lookup(&[("GOODREADS_API_KEY", "k")])).unwrap();

        assert_eq!(config.api_key, "k");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_goodreads_config_overrides() {
        let config = GoodreadsConfig::from_lookup(lookup(&[
            ("GOODREADS_API_KEY", "k"),
            ("GOODREADS_BASE_URL", "http://localhost:8080/"),
            ("GOODREADS_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_goodreads_config_requires_key() {
        assert!(GoodreadsConfig::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn test_goodreads_config_rejects_bad_timeout() {
        let result = GoodreadsConfig::from_lookup(lookup(&[
            ("GOODREADS_API_KEY", "k"),
            ("GOODREADS_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_data_config_partial_file_uses_defaults() {
        let path = format!("{}/reading_diversity_test_config.json", env::temp_dir().display());
        fs::write(&path, r#"{"books": "/tmp/books.csv", "restrict_isbn_map": false}"#).unwrap();

        let config = DataConfig::load(&path).unwrap();

        assert_eq!(config.books, PathBuf::from("/tmp/books.csv"));
        assert_eq!(config.authors, DataConfig::default().authors);
        assert!(!config.restrict_isbn_map);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_data_config_load_or_default() {
        assert_eq!(DataConfig::load_or_default(None).unwrap(), DataConfig::default());
    }
}
