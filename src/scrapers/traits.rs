use crate::error::FetchError;
use crate::scrapers::types::SearchParams;
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

/// Which mechanism retrieved a payload. Field mapping in the extractor depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Html,
    Gateway,
    Zyte,
    Browser,
}

impl FetchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            FetchStrategy::Html => "html",
            FetchStrategy::Gateway => "gateway",
            FetchStrategy::Zyte => "zyte",
            FetchStrategy::Browser => "browser",
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FetchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(FetchStrategy::Html),
            "gateway" | "api" => Ok(FetchStrategy::Gateway),
            "zyte" => Ok(FetchStrategy::Zyte),
            "browser" => Ok(FetchStrategy::Browser),
            other => Err(format!("unknown fetch strategy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Html,
    Json,
}

/// Raw page or API body exactly as a strategy received it
#[derive(Debug, Clone)]
pub struct RawPayload {
    pub strategy: FetchStrategy,
    pub kind: PayloadKind,
    pub body: String,
    pub source_url: String,
}

impl RawPayload {
    pub fn html(strategy: FetchStrategy, source_url: impl Into<String>, body: String) -> Self {
        Self {
            strategy,
            kind: PayloadKind::Html,
            body,
            source_url: source_url.into(),
        }
    }

    pub fn json(strategy: FetchStrategy, source_url: impl Into<String>, body: String) -> Self {
        Self {
            strategy,
            kind: PayloadKind::Json,
            body,
            source_url: source_url.into(),
        }
    }

    /// Empty bodies are a fetch failure, never an empty result.
    pub fn ensure_not_empty(self) -> Result<Self, FetchError> {
        if self.body.trim().is_empty() {
            Err(FetchError::EmptyPayload)
        } else {
            Ok(self)
        }
    }
}

/// Common trait for all fetch strategies.
/// The site's defenses change often; each way of getting past them lives behind this.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve the raw search results for the query
    async fn fetch(&self, params: &SearchParams) -> Result<RawPayload, FetchError>;

    fn strategy(&self) -> FetchStrategy;
}
