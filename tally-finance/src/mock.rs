//! Deterministic providers for tests and dry runs.
//!
//! They record every call so tests can assert how often the classifier was
//! consulted.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::providers::{CompletionProvider, ProviderError, SnippetSearch};

type Responder = Box<dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync>;

/// Completion provider answering through a closure
pub struct ScriptedCompletion {
    responder: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `answer`
    pub fn constant(answer: &str) -> Self {
        let answer = answer.to_string();
        Self::new(move |_| Ok(answer.clone()))
    }

    /// Always fails as if the tool were not installed
    pub fn unavailable() -> Self {
        Self::new(|_| Err(ProviderError::Unavailable("mock".into())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        (self.responder)(prompt)
    }
}

/// Search returning fixed snippets for merchants containing a keyword
#[derive(Default)]
pub struct StaticSearch {
    entries: Vec<(String, Vec<String>)>,
    fail: bool,
    calls: AtomicUsize,
}

impl StaticSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A search backend that always errors
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, keyword: &str, snippets: &[&str]) -> Self {
        self.entries.push((
            keyword.to_lowercase(),
            snippets.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnippetSearch for StaticSearch {
    async fn snippets(&self, merchant: &str) -> Result<Vec<String>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::Http("mock search down".into()));
        }
        let merchant = merchant.to_lowercase();
        Ok(self
            .entries
            .iter()
            .find(|(k, _)| merchant.contains(k))
            .map(|(_, s)| s.clone())
            .unwrap_or_default())
    }
}
