//! Web search tool — stub that returns mock search results.
//!
//! In production this would call a real search API. The stub returns
//! plausible, deterministic results so the decision-dispatch loop and
//! the content re-narration path can be exercised without network access.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sidekick_core::error::ToolError;
use sidekick_core::tool::{ParamKind, ParamSpec, Tool, ToolSpec};

pub struct WebSearchTool;

#[derive(Serialize, Clone)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "web_search",
            "Search the web for information. Returns result titles, URLs, and snippets.",
            vec![
                ParamSpec::required("query", ParamKind::String, "The search query"),
                ParamSpec::optional(
                    "num_results",
                    ParamKind::Integer,
                    "Number of results to return (default 3)",
                ),
            ],
        )
    }

    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        let query = arguments["query"].as_str().unwrap_or_default();
        let count = arguments["num_results"].as_u64().unwrap_or(3).min(5) as usize;
        let results = mock_results(query, count);
        let mut lines = Vec::with_capacity(results.len());
        for r in &results {
            lines.push(format!("{}\n{}\n{}", r.title, r.url, r.snippet));
        }
        Ok(lines.join("\n\n"))
    }
}

fn mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    if q.contains("rust") {
        let curated = vec![
            SearchResult {
                title: "The Rust Programming Language".into(),
                url: "https://doc.rust-lang.org/book/".into(),
                snippet: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            },
            SearchResult {
                title: "Rust by Example".into(),
                url: "https://doc.rust-lang.org/rust-by-example/".into(),
                snippet: "Runnable examples that illustrate Rust concepts and standard library usage.".into(),
            },
            SearchResult {
                title: "crates.io: Rust Package Registry".into(),
                url: "https://crates.io/".into(),
                snippet: "The Rust community's crate registry.".into(),
            },
        ];
        return curated.into_iter().take(count).collect();
    }

    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {query}", i + 1),
            url: format!(
                "https://example.com/search?q={}&p={}",
                query.replace(' ', "+"),
                i + 1
            ),
            snippet: format!("Mock search result for the query '{query}'."),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn search_returns_results() {
        let output = WebSearchTool
            .call(json!({"query": "rust programming"}))
            .await
            .unwrap();
        assert!(output.contains("Rust"));
        assert!(output.contains("https://"));
    }

    #[tokio::test]
    async fn respects_num_results() {
        let output = WebSearchTool
            .call(json!({"query": "anything else", "num_results": 2}))
            .await
            .unwrap();
        assert_eq!(output.matches("https://example.com").count(), 2);
    }
}
