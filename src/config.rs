use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::formats::DEFAULT_PLACEHOLDER_IMAGE;

pub const DEFAULT_RESOLVER_URL: &str = "http://127.0.0.1:3000/api/scrape";
pub const DEFAULT_DATA_DIR: &str = ".linkcart";
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub data_dir: PathBuf,
    pub resolver_endpoint: Url,
    pub resolve_timeout: Duration,
    pub placeholder_image: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            resolver_endpoint: Url::parse(DEFAULT_RESOLVER_URL)
                .expect("default resolver url is valid"),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_owned(),
        }
    }
}

impl CatalogConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = non_empty(lookup("LINKCART_DATA_DIR")) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = non_empty(lookup("LINKCART_RESOLVER_URL")) {
            config.resolver_endpoint = parse_endpoint(&raw)
                .with_context(|| format!("invalid LINKCART_RESOLVER_URL={raw:?}"))?;
        }
        if let Some(raw) = non_empty(lookup("LINKCART_RESOLVE_TIMEOUT_MS")) {
            let millis: u64 = raw
                .parse()
                .with_context(|| format!("invalid LINKCART_RESOLVE_TIMEOUT_MS={raw:?}"))?;
            if millis == 0 {
                anyhow::bail!("LINKCART_RESOLVE_TIMEOUT_MS must be positive");
            }
            config.resolve_timeout = Duration::from_millis(millis);
        }
        if let Some(image) = non_empty(lookup("LINKCART_PLACEHOLDER_IMAGE")) {
            config.placeholder_image = image;
        }

        Ok(config)
    }
}

pub fn parse_endpoint(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).context("parse url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("resolver url must be http/https: {url}");
    }
    Ok(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_keys_use_defaults() {
        let config = CatalogConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.resolver_endpoint.as_str(), DEFAULT_RESOLVER_URL);
        assert_eq!(config.resolve_timeout, DEFAULT_RESOLVE_TIMEOUT);
        assert_eq!(config.placeholder_image, DEFAULT_PLACEHOLDER_IMAGE);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CatalogConfig::from_lookup(lookup(&[
            ("LINKCART_DATA_DIR", "/tmp/cart"),
            ("LINKCART_RESOLVER_URL", " https://scrape.example/api "),
            ("LINKCART_RESOLVE_TIMEOUT_MS", "250"),
            ("LINKCART_PLACEHOLDER_IMAGE", "http://img/ph"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cart"));
        assert_eq!(config.resolver_endpoint.as_str(), "https://scrape.example/api");
        assert_eq!(config.resolve_timeout, Duration::from_millis(250));
        assert_eq!(config.placeholder_image, "http://img/ph");
    }

    #[test]
    fn blank_values_are_ignored() {
        let config =
            CatalogConfig::from_lookup(lookup(&[("LINKCART_DATA_DIR", "  ")])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = CatalogConfig::from_lookup(lookup(&[("LINKCART_RESOLVE_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("LINKCART_RESOLVE_TIMEOUT_MS"));

        let err = CatalogConfig::from_lookup(lookup(&[("LINKCART_RESOLVER_URL", "ftp://x/")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("must be http/https"));

        assert!(
            CatalogConfig::from_lookup(lookup(&[("LINKCART_RESOLVE_TIMEOUT_MS", "0")])).is_err()
        );
    }
}
