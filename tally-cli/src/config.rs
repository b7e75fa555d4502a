use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierSection,
    pub categories: CategoriesSection,
    pub search: SearchSection,
}

/// External completion command used by `--ai`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub command: String,
    /// Passed before the prompt
    pub args: Vec<String>,
    pub model_flag: String,
    pub model: Option<String>,
    pub batch_timeout_secs: u64,
    pub item_timeout_secs: u64,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            command: "afm".to_string(),
            args: vec!["-s".to_string()],
            model_flag: "-m".to_string(),
            model: None,
            batch_timeout_secs: 60,
            item_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteProtocol {
    #[default]
    Rest,
    JsonRpc,
}

/// Remote category list for `--fetch-categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesSection {
    pub server_url: Option<String>,
    pub protocol: RemoteProtocol,
    /// Tool name for the json-rpc `tools/call` request
    pub rpc_tool: String,
    pub timeout_secs: u64,
}

impl Default for CategoriesSection {
    fn default() -> Self {
        Self {
            server_url: None,
            protocol: RemoteProtocol::Rest,
            rpc_tool: "get_categories".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub endpoint: String,
    pub max_snippets: usize,
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            max_snippets: 3,
            timeout_secs: 10,
        }
    }
}

impl ClassifierSection {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.item_timeout_secs)
    }
}

/// Missing file means defaults; a file that exists must parse.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}
