//! Text-generation agent configuration.

use serde::Deserialize;

/// OpenAI-compatible chat completions endpoint used by the catalog builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Pause between consecutive agent calls.
    pub request_delay_ms: u64,
    /// Cities queried when no queries are given on the command line.
    pub cities: Vec<String>,
    /// Output file for the merged catalog.
    pub output_path: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
            request_delay_ms: 2000,
            cities: vec!["Princeton, NJ".to_string()],
            output_path: "restaurants.json".to_string(),
        }
    }
}
