//! Restaurant catalog builder.
//!
//! Asks a text agent for restaurants in each queried city, recovers the JSON
//! list from its answer and merges everything into one catalog keyed by
//! restaurant name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::model::CatalogEntry;

mod agent;
mod extract;

pub use agent::{AgentError, HttpTextAgent, TextAgent};
pub use extract::extract_json_array;

/// Strict-schema prompt asking for restaurants in `city`.
pub fn restaurant_prompt(city: &str) -> String {
    format!(
        r#"Find restaurants in {city}.

You MUST return your response as ONLY a JSON list (an array of objects).
Do NOT include any text, greetings, apologies, or markdown ```json``` ticks before or after the JSON list.

The JSON format for EACH restaurant object in the list MUST be:
{{
  "restaurant": "The Restaurant's Name",
  "address": "123 Main St, {city} 08540",
  "coordinates": {{
    "lat": 40.1234,
    "lon": -74.5678
  }},
  "menus": {{
    "Dinner": [{{"name": "Sample Item 1", "unitPrice": 14.5}}, {{"name": "Sample Item 2", "unitPrice": 9.75}}],
    "Lunch": [{{"name": "Sample Item 1", "unitPrice": 11.0}}],
    "Drinks": [{{"name": "Sample Item 1", "unitPrice": 3.25}}]
  }}
}}

- Prices are in US dollars.
- If you cannot find coordinates, return "coordinates": null.
- If you cannot find menu items, return "menus": null.
- If you cannot find any restaurants, return an empty list: []
- Try to find at least 15-20 restaurants in {city}"#
    )
}

/// Decode agent output into catalog entries, skipping malformed items.
pub fn parse_entries(values: Vec<Value>) -> Vec<CatalogEntry> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<CatalogEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping malformed catalog entry");
                None
            }
        })
        .collect()
}

/// Merge catalog batches by restaurant name.
///
/// A later entry replaces an earlier one with the same name but keeps the
/// earlier position. Entries with blank names are dropped.
pub fn merge_catalogs<I>(batches: I) -> Vec<CatalogEntry>
where
    I: IntoIterator<Item = Vec<CatalogEntry>>,
{
    let mut merged: Vec<CatalogEntry> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in batches.into_iter().flatten() {
        if entry.restaurant.trim().is_empty() {
            continue;
        }
        match positions.get(&entry.restaurant) {
            Some(&i) => merged[i] = entry,
            None => {
                positions.insert(entry.restaurant.clone(), merged.len());
                merged.push(entry);
            }
        }
    }

    merged
}

/// Runs catalog queries through an agent, one at a time.
pub struct CatalogBuilder {
    agent: Arc<dyn TextAgent>,
    delay: Duration,
}

impl CatalogBuilder {
    pub fn new(agent: Arc<dyn TextAgent>, delay: Duration) -> Self {
        Self { agent, delay }
    }

    /// Query every city and merge the results.
    ///
    /// A failed agent call counts as an empty answer. The builder pauses
    /// between calls but not after the last one.
    pub async fn build(&self, queries: &[String]) -> Vec<CatalogEntry> {
        let mut batches = Vec::with_capacity(queries.len());

        for (i, city) in queries.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            info!(%city, "querying agent for restaurants");
            let text = match self.agent.complete(&restaurant_prompt(city)).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(%city, error = %e, "agent call failed");
                    "[]".to_string()
                }
            };

            let entries = parse_entries(extract_json_array(&text));
            if entries.is_empty() {
                warn!(%city, "no restaurants parsed");
            } else {
                info!(%city, count = entries.len(), "parsed restaurants");
            }
            batches.push(entries);
        }

        let merged = merge_catalogs(batches);
        info!(total = merged.len(), "catalog built");
        merged
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Instant;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::model::MenuItem;

    /// Replays canned answers and records the prompts it saw.
    #[derive(Default)]
    struct ScriptedAgent {
        answers: Mutex<VecDeque<Result<String, AgentError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedAgent {
        fn new(answers: Vec<Result<String, AgentError>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
                prompts: Mutex::default(),
            })
        }
    }

    #[async_trait]
    impl TextAgent for ScriptedAgent {
        async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
            self.prompts.lock().await.push(prompt.to_string());
            self.answers
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok("[]".to_string()))
        }
    }

    fn entry(name: &str, address: &str) -> CatalogEntry {
        CatalogEntry {
            restaurant: name.to_string(),
            address: address.to_string(),
            ..Default::default()
        }
    }

    fn cities(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_prompt_names_city_and_schema() {
        let prompt = restaurant_prompt("Princeton, NJ");
        assert!(prompt.contains("restaurants in Princeton, NJ"));
        assert!(prompt.contains("\"unitPrice\""));
        assert!(prompt.contains("return an empty list: []"));
    }

    #[test]
    fn test_merge_last_write_wins_in_first_seen_order() {
        let merged = merge_catalogs(vec![
            vec![entry("A", "old"), entry("B", "b")],
            vec![entry("", "nameless"), entry("  ", "blank"), entry("A", "new"), entry("C", "c")],
        ]);

        let names: Vec<_> = merged.iter().map(|e| e.restaurant.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(merged[0].address, "new");
    }

    #[test]
    fn test_parse_entries_skips_malformed() {
        let values = vec![
            serde_json::json!({"restaurant": "Ok", "address": "1 Main St"}),
            serde_json::json!("just a string"),
            serde_json::json!({"restaurant": ["not", "a", "name"]}),
        ];
        let entries = parse_entries(values);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].restaurant, "Ok");
    }

    #[test]
    fn test_parse_entries_keeps_oddly_shaped_restaurants() {
        let values = vec![
            serde_json::json!({
                "restaurant": "Good",
                "menus": {"Dinner": [{"name": "Falafel Sandwich", "unitPrice": 7.76}]}
            }),
            serde_json::json!({
                "restaurant": "OddDrinks",
                "address": null,
                "coordinates": {"lat": null, "lon": null},
                "menus": {
                    "Dinner": [{"name": "Chicken Kebob Plate", "unitPrice": 16.78}],
                    "Drinks": "not available"
                }
            }),
            serde_json::json!({"restaurant": "NoMenu", "menus": []}),
        ];

        let entries = parse_entries(values);
        let names: Vec<_> = entries.iter().map(|e| e.restaurant.as_str()).collect();
        assert_eq!(names, vec!["Good", "OddDrinks", "NoMenu"]);

        let odd = &entries[1];
        assert!(odd.coordinates.is_none());
        assert_eq!(
            odd.menu_items().filter_map(MenuItem::priced).collect::<Vec<_>>(),
            vec![("Chicken Kebob Plate", 16.78)]
        );
        assert!(entries[2].menus.is_none());
    }

    #[tokio::test]
    async fn test_build_merges_across_cities() {
        let agent = ScriptedAgent::new(vec![
            Ok(r#"[{"restaurant": "Mamoun's", "address": "20 Witherspoon St"}]"#.to_string()),
            Ok(r#"Here: [{"restaurant": "Mamoun's", "address": "moved"}, {"restaurant": "Tacoria", "address": "110 Nassau St"}]"#.to_string()),
        ]);
        let builder = CatalogBuilder::new(agent.clone(), Duration::ZERO);

        let catalog = builder.build(&cities(&["Princeton, NJ", "Trenton, NJ"])).await;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].restaurant, "Mamoun's");
        assert_eq!(catalog[0].address, "moved");
        assert_eq!(catalog[1].restaurant, "Tacoria");

        let prompts = agent.prompts.lock().await;
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Trenton, NJ"));
    }

    #[tokio::test]
    async fn test_build_tolerates_agent_failure() {
        let agent = ScriptedAgent::new(vec![
            Err(AgentError::EmptyResponse),
            Ok(r#"{"restaurant": "Solo", "address": "1 Main St"}"#.to_string()),
        ]);
        let builder = CatalogBuilder::new(agent, Duration::ZERO);

        let catalog = builder.build(&cities(&["A", "B"])).await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].restaurant, "Solo");
    }

    #[tokio::test]
    async fn test_build_delays_only_between_calls() {
        let agent = ScriptedAgent::new(Vec::new());
        let builder = CatalogBuilder::new(agent, Duration::from_millis(50));

        let started = Instant::now();
        assert!(builder.build(&cities(&["only"])).await.is_empty());
        assert!(started.elapsed() < Duration::from_millis(50));

        let started = Instant::now();
        builder.build(&cities(&["one", "two", "three"])).await;
        assert!(started.elapsed() >= Duration::from_millis(100));
    }
}
