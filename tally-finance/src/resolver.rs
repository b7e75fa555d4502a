//! Category resolution pipeline.
//!
//! Each distinct description walks an explicit state machine:
//!
//! ```text
//! Unresolved -> RuleMatched                       (rule table)
//!            -> AiResolved | Sentinel             (batch prompt, then one prompt each)
//! Sentinel   -> WebRetried | Sentinel             (re-ask with web snippets)
//! ```
//!
//! Records whose export already carries a category are remapped first
//! (`Remapped`) and skip the chain entirely. Results are memoized per
//! description for the lifetime of the [`Resolver`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tally_core::{TransactionRecord, Vocabulary, UNCATEGORIZED};
use tracing::{debug, info, warn};

use crate::category_rules::RuleSet;
use crate::matching::{clean_enumerated_line, match_category};
use crate::prompts;
use crate::providers::{CompletionProvider, ProviderError, SnippetSearch};
use crate::taxonomy;

/// Where a description currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Unresolved,
    Remapped(String),
    RuleMatched(String),
    AiResolved(String),
    WebRetried(String),
    Sentinel,
}

impl Resolution {
    pub fn category(&self) -> &str {
        match self {
            Resolution::Remapped(c)
            | Resolution::RuleMatched(c)
            | Resolution::AiResolved(c)
            | Resolution::WebRetried(c) => c,
            Resolution::Unresolved | Resolution::Sentinel => UNCATEGORIZED,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved)
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Resolution::Sentinel)
    }

    /// Classifier answer -> state, treating the sentinel as "still unknown"
    fn from_answer(category: String, wrap: fn(String) -> Resolution) -> Resolution {
        if category == UNCATEGORIZED {
            Resolution::Sentinel
        } else {
            wrap(category)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Ask the completion provider about descriptions no rule matched
    pub ai: bool,
    /// Retry sentinel answers with web snippets (only together with `ai`)
    pub web_search: bool,
    pub batch_timeout: Duration,
    pub item_timeout: Duration,
    /// Snippet context is cut to this many characters
    pub max_context_chars: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            ai: false,
            web_search: false,
            batch_timeout: Duration::from_secs(60),
            item_timeout: Duration::from_secs(30),
            max_context_chars: 500,
        }
    }
}

/// Per-record tally of how categories were reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub remapped: usize,
    pub rule_matched: usize,
    pub ai_resolved: usize,
    pub web_retried: usize,
    pub defaulted: usize,
    pub uncategorized: usize,
}

pub struct Resolver {
    vocabulary: Vocabulary,
    rules: RuleSet,
    default_category: Option<String>,
    completion: Option<Arc<dyn CompletionProvider>>,
    search: Option<Arc<dyn SnippetSearch>>,
    settings: ResolverSettings,
    memo: HashMap<String, Resolution>,
}

impl Resolver {
    pub fn new(vocabulary: Vocabulary, rules: RuleSet) -> Self {
        Self {
            vocabulary,
            rules,
            default_category: None,
            completion: None,
            search: None,
            settings: ResolverSettings::default(),
            memo: HashMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_completion(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.completion = Some(provider);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SnippetSearch>) -> Self {
        self.search = Some(search);
        self
    }

    /// Category for records still at the sentinel once the chain is done.
    /// Ignored unless it belongs to the vocabulary.
    pub fn with_default_category(mut self, category: Option<String>) -> Self {
        self.default_category = category.filter(|c| c != UNCATEGORIZED);
        self
    }

    /// True when a classifier is attached and AI resolution is on
    pub fn uses_classifier(&self) -> bool {
        self.settings.ai && self.completion.is_some()
    }

    /// True when web retries can actually run
    pub fn uses_search(&self) -> bool {
        self.uses_classifier() && self.settings.web_search && self.search.is_some()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Memoized state of a description, if it has been resolved
    pub fn resolution(&self, description: &str) -> Option<&Resolution> {
        self.memo.get(description)
    }

    /// Step 1: remap a category the bank export already assigned
    pub fn remap(&self, category: &str, subcategory: &str) -> Resolution {
        match taxonomy::remap(category, subcategory, &self.vocabulary) {
            Some(c) => Resolution::Remapped(c),
            None => Resolution::Sentinel,
        }
    }

    /// Step 2: ordered rule table
    pub fn apply_rules(&self, description: &str) -> Resolution {
        match self.rules.first_match(description, &self.vocabulary) {
            Some(rule) => Resolution::RuleMatched(rule.category.clone()),
            None => Resolution::Unresolved,
        }
    }

    /// Resolve every description not seen before. Duplicates are collapsed
    /// and previously resolved descriptions never reach a provider again.
    pub async fn resolve_descriptions<S: AsRef<str>>(&mut self, descriptions: &[S]) {
        let mut seen = HashSet::new();
        let mut states: Vec<(String, Resolution)> = Vec::new();
        for d in descriptions {
            let d = d.as_ref();
            if self.memo.contains_key(d) || !seen.insert(d) {
                continue;
            }
            states.push((d.to_string(), self.apply_rules(d)));
        }
        if states.is_empty() {
            return;
        }

        if self.settings.ai {
            if let Some(provider) = self.completion.clone() {
                let reachable = self.classify_batch(&*provider, &mut states).await
                    && self.classify_individually(&*provider, &mut states).await;

                if !reachable {
                    warn!("Classifier unavailable, unmatched merchants stay Uncategorized");
                } else if self.settings.web_search {
                    if let Some(search) = self.search.clone() {
                        self.retry_with_search(&*provider, &*search, &mut states)
                            .await;
                    }
                }
            } else {
                warn!("AI classification requested but no classifier is configured");
            }
        }

        for (desc, state) in states {
            let state = if state.is_unresolved() {
                Resolution::Sentinel
            } else {
                state
            };
            self.memo.insert(desc, state);
        }
    }

    /// Step 3a: a single prompt for every unresolved description.
    /// Returns false when the classifier is not installed at all.
    async fn classify_batch(
        &self,
        provider: &dyn CompletionProvider,
        states: &mut [(String, Resolution)],
    ) -> bool {
        let pending: Vec<usize> = states
            .iter()
            .enumerate()
            .filter(|(_, (_, s))| s.is_unresolved())
            .map(|(i, _)| i)
            .collect();
        if pending.len() < 2 {
            return true;
        }

        info!(count = pending.len(), "Categorizing unknown merchants in one batch");
        let descriptions: Vec<&str> = pending.iter().map(|&i| states[i].0.as_str()).collect();
        let prompt = prompts::batch_prompt(&descriptions, &self.vocabulary);

        let answer = match provider.complete(&prompt, self.settings.batch_timeout).await {
            Ok(a) => a,
            Err(ProviderError::Unavailable(_)) => return false,
            Err(e) => {
                warn!(error = %e, "Batch classification failed, falling back to individual prompts");
                return true;
            }
        };

        for (&i, line) in pending.iter().zip(answer.trim().lines()) {
            let category = match_category(clean_enumerated_line(line), &self.vocabulary);
            debug!(merchant = %states[i].0, category = %category, "batch");
            states[i].1 = Resolution::from_answer(category, Resolution::AiResolved);
        }
        true
    }

    /// Step 3b: one prompt per description the batch did not cover.
    /// Stops at the first `Unavailable`; the rest end up as the sentinel.
    async fn classify_individually(
        &self,
        provider: &dyn CompletionProvider,
        states: &mut [(String, Resolution)],
    ) -> bool {
        for (desc, state) in states.iter_mut().filter(|(_, s)| s.is_unresolved()) {
            let prompt = prompts::single_prompt(desc, &self.vocabulary);
            *state = match provider.complete(&prompt, self.settings.item_timeout).await {
                Ok(answer) => {
                    let category = match_category(&answer, &self.vocabulary);
                    debug!(merchant = %desc, category = %category, "single");
                    Resolution::from_answer(category, Resolution::AiResolved)
                }
                Err(ProviderError::Unavailable(tool)) => {
                    debug!(tool = %tool, "Classifier not installed");
                    *state = Resolution::Sentinel;
                    return false;
                }
                Err(e) => {
                    debug!(merchant = %desc, error = %e, "Classification failed");
                    Resolution::Sentinel
                }
            };
        }
        true
    }

    /// Step 5: re-ask about sentinel answers with web snippets as context
    async fn retry_with_search(
        &self,
        provider: &dyn CompletionProvider,
        search: &dyn SnippetSearch,
        states: &mut [(String, Resolution)],
    ) {
        let retry = states.iter().filter(|(_, s)| s.is_sentinel()).count();
        if retry == 0 {
            return;
        }
        info!(count = retry, "Retrying uncategorized merchants with web search");

        for (desc, state) in states.iter_mut().filter(|(_, s)| s.is_sentinel()) {
            let snippets = match search.snippets(desc).await {
                Ok(s) if !s.is_empty() => s,
                Ok(_) => {
                    debug!(merchant = %desc, "No web results");
                    continue;
                }
                Err(e) => {
                    debug!(merchant = %desc, error = %e, "Web search failed");
                    continue;
                }
            };

            let context: String = snippets
                .join(" | ")
                .chars()
                .take(self.settings.max_context_chars)
                .collect();
            let prompt = prompts::web_context_prompt(desc, &context, &self.vocabulary);

            match provider.complete(&prompt, self.settings.item_timeout).await {
                Ok(answer) => {
                    let category = match_category(&answer, &self.vocabulary);
                    debug!(merchant = %desc, category = %category, "web retry");
                    *state = Resolution::from_answer(category, Resolution::WebRetried);
                }
                Err(e) => debug!(merchant = %desc, error = %e, "Web-assisted classification failed"),
            }
        }
    }

    /// Resolve and assign a final category to every record
    pub async fn resolve_records(&mut self, records: &mut [TransactionRecord]) -> ResolveStats {
        let mut stats = ResolveStats::default();
        let mut remapped = vec![false; records.len()];

        for (record, done) in records.iter_mut().zip(remapped.iter_mut()) {
            if let Some((category, sub)) = &record.source_category {
                if let Resolution::Remapped(c) = self.remap(category, sub) {
                    record.category = c;
                    *done = true;
                    stats.remapped += 1;
                }
            }
        }

        let pending: Vec<&str> = records
            .iter()
            .zip(&remapped)
            .filter(|(_, done)| !**done)
            .map(|(r, _)| r.description.as_str())
            .collect();
        self.resolve_descriptions(&pending).await;

        let default = self
            .default_category
            .as_deref()
            .filter(|c| self.vocabulary.contains(c));

        for (record, done) in records.iter_mut().zip(&remapped) {
            if *done {
                continue;
            }
            let state = self
                .memo
                .get(&record.description)
                .cloned()
                .unwrap_or(Resolution::Sentinel);
            match &state {
                Resolution::RuleMatched(_) => stats.rule_matched += 1,
                Resolution::AiResolved(_) => stats.ai_resolved += 1,
                Resolution::WebRetried(_) => stats.web_retried += 1,
                _ => {}
            }
            record.category = state.category().to_string();

            if record.category == UNCATEGORIZED {
                if let Some(d) = default {
                    record.category = d.to_string();
                    stats.defaulted += 1;
                } else {
                    stats.uncategorized += 1;
                }
            }
        }

        stats
    }
}
