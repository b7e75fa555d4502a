//! Fetch the category vocabulary from a budgeting server.
//!
//! Two wire styles: a plain REST `GET` returning `{"categories": [...]}`,
//! and a JSON-RPC 2.0 `tools/call` whose text content embeds the same
//! payload.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::{CategoriesSection, RemoteProtocol};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryItem {
    Name(String),
    Object { name: String },
}

#[derive(Debug, Deserialize)]
struct CategoryList {
    #[serde(default)]
    categories: Vec<CategoryItem>,
}

impl CategoryList {
    fn into_names(self) -> Vec<String> {
        self.categories
            .into_iter()
            .map(|c| match c {
                CategoryItem::Name(n) | CategoryItem::Object { name: n } => n,
            })
            .filter(|n| !n.trim().is_empty())
            .collect()
    }
}

pub async fn fetch_categories(server_url: &str, section: &CategoriesSection) -> Result<Vec<String>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(section.timeout_secs))
        .build()
        .context("build HTTP client")?;

    let body: Value = match section.protocol {
        RemoteProtocol::Rest => client
            .get(server_url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("GET {server_url}"))?
            .json()
            .await
            .context("decode category list")?,
        RemoteProtocol::JsonRpc => client
            .post(server_url)
            .header(ACCEPT, "application/json")
            .json(&rpc_request(&section.rpc_tool))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("POST {server_url}"))?
            .json()
            .await
            .context("decode JSON-RPC response")?,
    };

    let names = match section.protocol {
        RemoteProtocol::Rest => parse_rest(body)?,
        RemoteProtocol::JsonRpc => parse_rpc(&body)?,
    };
    if names.is_empty() {
        bail!("server returned an empty category list");
    }
    Ok(names)
}

pub fn rpc_request(tool: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": tool, "arguments": {} }
    })
}

pub fn parse_rest(body: Value) -> Result<Vec<String>> {
    let list: CategoryList = serde_json::from_value(body).context("unexpected category payload")?;
    Ok(list.into_names())
}

/// `result.content[*].text` (type `text`) holds the REST payload as a string
pub fn parse_rpc(body: &Value) -> Result<Vec<String>> {
    if let Some(err) = body.get("error") {
        bail!("JSON-RPC error: {err}");
    }
    let content = body
        .pointer("/result/content")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("JSON-RPC response has no result.content"))?;

    for item in content {
        if item.get("type").and_then(Value::as_str) != Some("text") {
            continue;
        }
        let Some(text) = item.get("text").and_then(Value::as_str) else {
            continue;
        };
        if let Ok(list) = serde_json::from_str::<CategoryList>(text) {
            let names = list.into_names();
            if !names.is_empty() {
                return Ok(names);
            }
        }
    }
    bail!("JSON-RPC response carried no category list")
}
