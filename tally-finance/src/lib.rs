//! tally-finance: category resolution pipeline, aggregation and report writing

pub mod aggregate;
pub mod category_rules;
pub mod error;
pub mod matching;
pub mod mock;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod resolver;
pub mod taxonomy;

pub use aggregate::Aggregator;
pub use category_rules::{CategoriesConfig, Rule, RuleSet};
pub use error::{FinanceError, Result};
pub use matching::{clean_enumerated_line, match_category};
pub use providers::{CompletionProvider, ProviderError, SnippetSearch};
pub use resolver::{Resolution, ResolveStats, Resolver, ResolverSettings};
