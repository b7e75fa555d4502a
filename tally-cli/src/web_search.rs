//! Merchant lookup against the DuckDuckGo HTML endpoint

use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tally_finance::{ProviderError, SnippetSearch};

use crate::config::SearchSection;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

pub fn snippet_regex() -> Result<Regex, regex::Error> {
    Regex::new(r#"class="result__snippet"[^>]*>([^<]+)<"#)
}

pub struct DuckDuckGo {
    client: reqwest::Client,
    endpoint: String,
    max_snippets: usize,
    snippet_re: Regex,
}

impl DuckDuckGo {
    pub fn new(section: &SearchSection) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(section.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        let snippet_re = snippet_regex().map_err(|e| ProviderError::Failed(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: section.endpoint.clone(),
            max_snippets: section.max_snippets,
            snippet_re,
        })
    }
}

#[async_trait]
impl SnippetSearch for DuckDuckGo {
    async fn snippets(&self, merchant: &str) -> Result<Vec<String>, ProviderError> {
        let query = format!("{merchant} business store company");
        let html = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ProviderError::Http(e.to_string()))?
            .text()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;
        Ok(extract_snippets(&self.snippet_re, &html, self.max_snippets))
    }
}

/// Pull result snippets out of a search results page
pub fn extract_snippets(re: &Regex, html: &str, max: usize) -> Vec<String> {
    re.captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| unescape(m.as_str().trim()))
        .filter(|s| !s.is_empty())
        .take(max)
        .collect()
}

fn unescape(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
