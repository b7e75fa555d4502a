//! Capability seams for the external classifier and the web search.
//!
//! The resolver only sees these traits; the CLI plugs in a subprocess and
//! an HTTP scraper, tests plug in the fakes from [`crate::mock`].

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Why a provider call produced nothing usable. Never fatal for a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider failed: {0}")]
    Failed(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// A text completion tool: one free-text prompt in, plain text out
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError>;
}

/// Short text snippets about a merchant from a web search
#[async_trait]
pub trait SnippetSearch: Send + Sync {
    async fn snippets(&self, merchant: &str) -> Result<Vec<String>, ProviderError>;
}
