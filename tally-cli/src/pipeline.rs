use anyhow::{bail, Context, Result};
use std::str::FromStr;
use std::sync::Arc;
use tally_core::Vocabulary;
use tally_finance::{Aggregator, CategoriesConfig, Resolver, ResolverSettings, RuleSet};
use tally_ingest::{read_statement, FormatId};
use tracing::{debug, info, warn};

use crate::afm_cli::AfmCli;
use crate::config::{load_config, Config};
use crate::output::{write_outputs, JsonTarget};
use crate::remote_categories::fetch_categories;
use crate::state::default_config_path;
use crate::summary::{print_summary, RunInfo};
use crate::web_search::DuckDuckGo;
use crate::Cli;

/// Where the active vocabulary came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularySource {
    Remote,
    CategoriesFile,
    Builtin,
}

impl VocabularySource {
    pub fn label(self) -> &'static str {
        match self {
            VocabularySource::Remote => "server",
            VocabularySource::CategoriesFile => "categories file",
            VocabularySource::Builtin => "built-in",
        }
    }
}

/// Remote list, then the categories file, then the built-in list
pub fn choose_vocabulary(
    remote: Option<Vec<String>>,
    categories: Option<&CategoriesConfig>,
) -> (Vocabulary, VocabularySource) {
    if let Some(names) = remote.filter(|n| !n.is_empty()) {
        return (Vocabulary::from_names(names), VocabularySource::Remote);
    }
    if let Some(v) = categories.and_then(CategoriesConfig::vocabulary) {
        return (v, VocabularySource::CategoriesFile);
    }
    (Vocabulary::builtin(), VocabularySource::Builtin)
}

fn load_settings(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("Config not found: {}", path.display());
            }
            load_config(path)
        }
        None => match default_config_path() {
            Ok(path) => load_config(&path),
            Err(e) => {
                debug!(error = %e, "No home directory, using default config");
                Ok(Config::default())
            }
        },
    }
}

async fn remote_vocabulary(cli: &Cli, config: &Config) -> Option<Vec<String>> {
    if !cli.fetch_categories {
        return None;
    }
    let Some(url) = cli.server.clone().or_else(|| config.categories.server_url.clone()) else {
        warn!("--fetch-categories given but no server URL configured (use --server)");
        return None;
    };
    match fetch_categories(&url, &config.categories).await {
        Ok(names) => {
            info!(count = names.len(), server = %url, "Fetched categories");
            Some(names)
        }
        Err(e) => {
            warn!(error = %e, "Could not fetch categories from server, falling back");
            None
        }
    }
}

fn build_resolver(
    cli: &Cli,
    config: &Config,
    vocabulary: Vocabulary,
    categories: Option<&CategoriesConfig>,
) -> Result<Resolver> {
    if cli.web_search && !cli.ai {
        warn!("--web-search only applies together with --ai, ignoring");
    }

    // A missing classifier disables AI and web search together: snippets
    // would be fetched for a prompt that can never be answered.
    let classifier = if cli.ai {
        let afm = AfmCli::from_config(&config.classifier, cli.model.as_deref());
        if afm.is_available() {
            Some(afm)
        } else {
            warn!(
                command = afm.command(),
                "Classifier not found on PATH, unmatched merchants stay Uncategorized"
            );
            None
        }
    } else {
        None
    };

    let rules = categories.map_or_else(RuleSet::builtin, CategoriesConfig::rule_set);
    let settings = ResolverSettings {
        ai: classifier.is_some(),
        web_search: classifier.is_some() && cli.web_search,
        batch_timeout: config.classifier.batch_timeout(),
        item_timeout: config.classifier.item_timeout(),
        ..Default::default()
    };
    let web_search = settings.web_search;

    let mut resolver = Resolver::new(vocabulary, rules)
        .with_settings(settings)
        .with_default_category(categories.and_then(|c| c.default_category.clone()));

    if let Some(afm) = classifier {
        resolver = resolver.with_completion(Arc::new(afm));
        if web_search {
            let search = DuckDuckGo::new(&config.search).context("set up web search")?;
            resolver = resolver.with_search(Arc::new(search));
        }
    }

    Ok(resolver)
}

pub async fn run(cli: &Cli) -> Result<()> {
    if !cli.file.exists() {
        bail!("Statement not found: {}", cli.file.display());
    }

    let config = load_settings(cli)?;

    let format = cli
        .format
        .as_deref()
        .map(FormatId::from_str)
        .transpose()?;

    let categories = match &cli.categories {
        Some(path) => Some(
            CategoriesConfig::load(path)
                .with_context(|| format!("reading categories {}", path.display()))?,
        ),
        None => None,
    };

    let remote = remote_vocabulary(cli, &config).await;
    let (vocabulary, source) = choose_vocabulary(remote, categories.as_ref());
    debug!(count = vocabulary.len(), source = source.label(), "Vocabulary");

    let statement = read_statement(&cli.file, format)
        .with_context(|| format!("parsing {}", cli.file.display()))?;
    info!(
        format = %statement.format,
        rows = statement.records.len(),
        skipped = statement.skipped,
        "Parsed statement"
    );

    let mut resolver = build_resolver(cli, &config, vocabulary, categories.as_ref())?;
    let vocabulary_size = resolver.vocabulary().len();

    let mut records = statement.records;
    let parsed = records.len();
    let stats = resolver.resolve_records(&mut records).await;
    debug!(?stats, "Resolution finished");

    let report = Aggregator::fold(records, !cli.keep_transfers);

    let target = JsonTarget::resolve(&cli.file, cli.output.as_deref());
    let written = write_outputs(&report, &cli.file, &target, cli.csv)?;

    if target != JsonTarget::Stdout {
        print_summary(
            &report,
            &RunInfo {
                input: cli.file.clone(),
                format: statement.format,
                vocabulary_source: source,
                vocabulary_size,
                parsed,
                skipped: statement.skipped,
                stats,
                json: written.json,
                csv: written.csv,
            },
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tally").chain(args.iter().copied())).unwrap()
    }

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("fixtures")
            .join(name)
    }

    /// Empty config file so the user's ~/.tally never leaks into a test
    fn empty_config(dir: &Path) -> String {
        let path = dir.join("config.toml");
        fs::write(&path, "").unwrap();
        path.display().to_string()
    }

    fn config_with_command(command: &str) -> Config {
        let mut config = Config::default();
        config.classifier.command = command.to_string();
        config.classifier.args.clear();
        config
    }

    #[test]
    fn test_missing_classifier_disables_ai_and_search() {
        let cli = parse(&["statement.csv", "--ai", "--web-search"]);
        let config = config_with_command("tally-no-such-classifier");
        let resolver = build_resolver(&cli, &config, Vocabulary::builtin(), None).unwrap();
        assert!(!resolver.uses_classifier());
        assert!(!resolver.uses_search());
    }

    #[cfg(unix)]
    #[test]
    fn test_available_classifier_wires_search() {
        let cli = parse(&["statement.csv", "--ai", "--web-search"]);
        let config = config_with_command("echo");
        let resolver = build_resolver(&cli, &config, Vocabulary::builtin(), None).unwrap();
        assert!(resolver.uses_classifier());
        assert!(resolver.uses_search());

        let cli = parse(&["statement.csv", "--web-search"]);
        let resolver = build_resolver(&cli, &config, Vocabulary::builtin(), None).unwrap();
        assert!(!resolver.uses_classifier());
        assert!(!resolver.uses_search());
    }

    #[tokio::test]
    async fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("nope.csv").display().to_string();
        let err = run(&parse(&[input.as_str()])).await.unwrap_err();
        assert!(err.to_string().contains("Statement not found"));
    }

    #[tokio::test]
    async fn test_unknown_format_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = empty_config(dir.path());
        let input = fixture("commbank.csv").display().to_string();
        let out = dir.path().join("out.json").display().to_string();

        let args = [
            input.as_str(),
            "--config",
            config.as_str(),
            "-f",
            "westpac",
            "-o",
            out.as_str(),
        ];
        let err = run(&parse(&args)).await.unwrap_err();
        assert!(format!("{err:#}").contains("westpac"));
        assert!(!Path::new(&out).exists());
    }

    #[tokio::test]
    async fn test_unreadable_categories_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = empty_config(dir.path());
        let input = fixture("commbank.csv").display().to_string();
        let missing = dir.path().join("categories.json").display().to_string();
        let out = dir.path().join("out.json").display().to_string();

        let args = [
            input.as_str(),
            "--config",
            config.as_str(),
            "-c",
            missing.as_str(),
            "-o",
            out.as_str(),
        ];
        let err = run(&parse(&args)).await.unwrap_err();
        assert!(format!("{err:#}").contains("reading categories"));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let broken = broken.display().to_string();
        let args = [
            input.as_str(),
            "--config",
            config.as_str(),
            "-c",
            broken.as_str(),
            "-o",
            out.as_str(),
        ];
        assert!(run(&parse(&args)).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = fixture("commbank.csv").display().to_string();
        let config = dir.path().join("none.toml").display().to_string();
        let args = [input.as_str(), "--config", config.as_str()];
        let err = run(&parse(&args)).await.unwrap_err();
        assert!(err.to_string().contains("Config not found"));
    }

    #[tokio::test]
    async fn test_undetectable_format_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = empty_config(dir.path());
        let input = dir.path().join("odd.csv");
        fs::write(&input, "Posted,Memo,Value\n2024-01-01,x,1\n").unwrap();
        let input = input.display().to_string();

        let args = [input.as_str(), "--config", config.as_str()];
        assert!(run(&parse(&args)).await.is_err());
        assert!(!dir.path().join("odd.json").exists());
    }

    #[tokio::test]
    async fn test_run_writes_report_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = empty_config(dir.path());
        let input = fixture("commbank.csv").display().to_string();
        let out = dir.path().join("report.json");
        let out_arg = out.display().to_string();

        let args = [
            input.as_str(),
            "--config",
            config.as_str(),
            "-o",
            out_arg.as_str(),
            "--csv",
        ];
        run(&parse(&args)).await.unwrap();

        let json = fs::read_to_string(&out).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["expenses"][0]["category"], "Groceries");
        assert!(!json.contains("WOOLWORTHS 1234 SYDNEY"));

        let csv = fs::read_to_string(dir.path().join("commbank.import.csv")).unwrap();
        assert!(csv.starts_with("date,amount,category\n2024-02-01,45.00,Groceries\n"));
    }

    #[test]
    fn test_remote_wins() {
        let file = CategoriesConfig::from_json(r#"{ "categories": ["Rent"] }"#).unwrap();
        let (v, source) = choose_vocabulary(Some(vec!["Coffee".into()]), Some(&file));
        assert_eq!(source, VocabularySource::Remote);
        assert!(v.contains("Coffee"));
        assert!(!v.contains("Rent"));
        assert!(v.contains("Uncategorized"));
    }

    #[test]
    fn test_fallback_chain() {
        let file = CategoriesConfig::from_json(r#"{ "categories": ["Rent"] }"#).unwrap();
        let (v, source) = choose_vocabulary(Some(vec![]), Some(&file));
        assert_eq!(source, VocabularySource::CategoriesFile);
        assert!(v.contains("Rent"));

        let rules_only = CategoriesConfig::from_json(r#"{ "rules": [] }"#).unwrap();
        let (v, source) = choose_vocabulary(None, Some(&rules_only));
        assert_eq!(source, VocabularySource::Builtin);
        assert_eq!(v, Vocabulary::builtin());

        let (_, source) = choose_vocabulary(None, None);
        assert_eq!(source, VocabularySource::Builtin);
    }
}
