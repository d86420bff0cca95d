//! Bootstrap utilities for restaurant-stats binaries.
//!
//! Shared initialization code for the server and batch tools.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LOG_ENV_VAR;

/// Initialize tracing with the RESTAURANT_STATS_LOG environment variable.
///
/// Defaults to "info" level if RESTAURANT_STATS_LOG is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Find a `--config <path>` / `-c <path>` / `--config=<path>` argument.
pub fn parse_config_path<I, S>(args: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == "--config" || arg == "-c" {
            return args.next().map(|p| p.as_ref().to_string());
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Arguments that are neither the program name nor a config flag.
pub fn positional_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut positional = Vec::new();
    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == "--config" || arg == "-c" {
            args.next();
        } else if !arg.starts_with("--config=") {
            positional.push(arg.to_string());
        }
    }
    positional
}

/// Errors reading or writing the pipeline's JSON artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Read a JSON artifact (catalog or orders file).
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ArtifactError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
        path: display,
        source,
    })
}

/// Write a JSON artifact, pretty-printed.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), ArtifactError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let text = serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Json {
        path: display.clone(),
        source,
    })?;
    std::fs::write(path, text + "\n").map_err(|source| ArtifactError::Io {
        path: display,
        source,
    })
}

/// Run an async connect/ping closure with exponential backoff.
///
/// # Arguments
/// * `service_name` - Human-readable name for logging (e.g., "mongodb")
/// * `max_retries` - Retries after the first attempt
/// * `connect` - Async function that attempts to establish a connection
///
/// # Returns
/// The connected value on success, or the last error after max retries.
pub async fn connect_with_retry<T, E, F, Fut>(
    service_name: &str,
    max_retries: usize,
    mut connect: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let backoff = ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(max_retries)
        .with_jitter()
        .build();

    let mut delays = backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match connect().await {
            Ok(value) => {
                info!(service = service_name, attempt, "connected");
                return Ok(value);
            }
            Err(e) => match delays.next() {
                Some(delay) => {
                    warn!(
                        service = service_name,
                        attempt,
                        error = %e,
                        retry_in = ?delay,
                        "connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    error!(service = service_name, attempts = attempt, error = %e, "giving up on connection");
                    return Err(e);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_path_forms() {
        assert_eq!(
            parse_config_path(["bin", "--config", "a.yaml"]),
            Some("a.yaml".to_string())
        );
        assert_eq!(parse_config_path(["bin", "-c", "b.yaml"]), Some("b.yaml".to_string()));
        assert_eq!(
            parse_config_path(["bin", "--config=c.yaml"]),
            Some("c.yaml".to_string())
        );
        assert_eq!(parse_config_path(["bin", "--config"]), None);
        assert_eq!(parse_config_path(["bin"]), None);
    }

    #[test]
    fn test_positional_args_skip_config() {
        assert_eq!(
            positional_args(["bin", "-c", "a.yaml", "Princeton, NJ", "--config=b.yaml", "Trenton, NJ"]),
            vec!["Princeton, NJ".to_string(), "Trenton, NJ".to_string()]
        );
        assert!(positional_args(["bin"]).is_empty());
    }

    #[test]
    fn test_json_artifact_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");

        write_json(&path, &vec![serde_json::json!({"url": "https://x/orders/1"})]).unwrap();
        let back: Vec<serde_json::Value> = read_json(&path).unwrap();
        assert_eq!(back[0]["url"], "https://x/orders/1");

        std::fs::write(&path, "not json").unwrap();
        let err = read_json::<Vec<serde_json::Value>>(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Json { .. }));

        let err = read_json::<Vec<serde_json::Value>>(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[tokio::test]
    async fn test_connect_with_retry_recovers() {
        let mut calls = 0;
        let result: Result<u32, String> = connect_with_retry("test", 3, || {
            calls += 1;
            let current = calls;
            async move {
                if current < 2 {
                    Err("refused".to_string())
                } else {
                    Ok(current)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(2));
    }

    #[tokio::test]
    async fn test_connect_with_retry_gives_up() {
        let mut calls = 0;
        let result: Result<(), String> = connect_with_retry("test", 1, || {
            calls += 1;
            async { Err("refused".to_string()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
