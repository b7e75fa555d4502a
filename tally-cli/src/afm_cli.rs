//! Classifier backed by a local completion command (`afm -s <prompt>` by default).
//!
//! One process per prompt; stdout is the answer. The child is killed if the
//! timeout fires.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tally_finance::{CompletionProvider, ProviderError};
use tokio::process::Command;

use crate::config::ClassifierSection;

#[derive(Debug, Clone)]
pub struct AfmCli {
    command: String,
    args: Vec<String>,
}

impl AfmCli {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Build from config; `model` (from `--model` or the config) becomes
    /// `<model_flag> <model>` ahead of the prompt.
    pub fn from_config(section: &ClassifierSection, model: Option<&str>) -> Self {
        let mut args = section.args.clone();
        if let Some(m) = model.or(section.model.as_deref()) {
            args.push(section.model_flag.clone());
            args.push(m.to_string());
        }
        Self::new(section.command.clone(), args)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.command).is_ok()
    }
}

#[async_trait]
impl CompletionProvider for AfmCli {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        if !self.is_available() {
            return Err(ProviderError::Unavailable(self.command.clone()));
        }

        let child = Command::new(&self.command)
            .args(&self.args)
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProviderError::Failed(format!("spawning {}: {e}", self.command)))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(res) => res.map_err(|e| ProviderError::Failed(e.to_string()))?,
            Err(_) => return Err(ProviderError::Timeout(timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::Failed(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_model_flag_from_config() {
        let section = ClassifierSection {
            model: Some("base".into()),
            ..Default::default()
        };
        let cli = AfmCli::from_config(&section, None);
        assert_eq!(cli.args, vec!["-s", "-m", "base"]);

        let cli = AfmCli::from_config(&section, Some("large"));
        assert_eq!(cli.args, vec!["-s", "-m", "large"]);

        let cli = AfmCli::from_config(&ClassifierSection::default(), None);
        assert_eq!(cli.args, vec!["-s"]);
    }

    #[tokio::test]
    async fn test_prompt_is_last_argument() {
        let cli = AfmCli::new("echo", vec!["-n".into()]);
        let out = cli.complete("Groceries", Duration::from_secs(5)).await.unwrap();
        assert_eq!(out, "Groceries");
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let cli = AfmCli::new("tally-no-such-classifier", vec![]);
        assert!(!cli.is_available());
        let err = cli.complete("x", Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_nonzero_exit_fails() {
        let cli = AfmCli::new("false", vec![]);
        let err = cli.complete("x", Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, ProviderError::Failed(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let cli = AfmCli::new("sleep", vec![]);
        let err = cli.complete("5", Duration::from_millis(100)).await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout(Duration::from_millis(100)));
    }
}
