use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::catalog::{CatalogManager, Query};
use crate::error::CatalogError;
use crate::formats::ProductRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    Ru,
    Tj,
    En,
    Cn,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::Tj => "tj",
            Self::En => "en",
            Self::Cn => "cn",
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Self::Ru),
            "tj" => Ok(Self::Tj),
            "en" => Ok(Self::En),
            "cn" => Ok(Self::Cn),
            other => anyhow::bail!("unsupported language: {other}. expected one of: ru, tj, en, cn"),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Presentation-side state around a shared [`CatalogManager`].
///
/// Delete requests arrive as positions in the currently visible (filtered)
/// list; the session forwards its own search term so the manager can map them.
pub struct CatalogSession {
    manager: Arc<CatalogManager>,
    search_term: String,
    language: Language,
}

impl CatalogSession {
    pub fn new(manager: Arc<CatalogManager>) -> Self {
        Self {
            manager,
            search_term: String::new(),
            language: Language::default(),
        }
    }

    pub fn manager(&self) -> &Arc<CatalogManager> {
        &self.manager
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn visible(&self) -> Query {
        self.manager.query(&self.search_term)
    }

    /// Stores `link` exactly as submitted; blank input adds nothing.
    pub async fn on_add_link_submitted(&self, link: &str) -> Option<ProductRecord> {
        self.manager.add_product(link).await
    }

    pub async fn on_delete_requested(
        &self,
        visible_index: usize,
    ) -> Result<ProductRecord, CatalogError> {
        self.manager
            .remove_visible(&self.search_term, visible_index)
            .await
    }

    pub fn on_search_term_changed(&mut self, term: &str) {
        self.search_term = term.to_owned();
    }

    pub fn on_language_changed(&mut self, code: &str) -> anyhow::Result<()> {
        self.language = code.parse()?;
        tracing::debug!(language = %self.language, "language changed");
        Ok(())
    }
}
