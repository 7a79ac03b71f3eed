//! Configuration for agentflow
//!
//! Typed settings are read from `AF_*` environment variables. An optional
//! environment file can seed those variables first: the path named by
//! `AF_ENV_FILE` wins, then `/etc/agentflow/environment` (system-wide), then
//! a local `.env` (development). Variables already present in the process
//! environment are never overridden.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

/// Seed the process environment from the first usable environment file.
///
/// Returns the path that was applied, or None if no candidate exists.
pub fn load_environment() -> Option<PathBuf> {
    candidate_paths()
        .into_iter()
        .find_map(|path| apply_env_file(&path))
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(custom) = env::var("AF_ENV_FILE") {
        paths.push(PathBuf::from(custom));
    }
    paths.push(PathBuf::from("/etc/agentflow/environment"));
    paths.push(PathBuf::from(".env"));
    paths
}

/// Apply one environment file, setting only variables that are not already
/// present. Returns None when the file is missing or unreadable so the next
/// candidate can be tried.
fn apply_env_file(path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        return None;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable environment file");
            return None;
        }
    };

    let mut applied = 0;
    for line in content.lines() {
        let Some((key, value)) = split_assignment(line) else {
            continue;
        };
        if env::var_os(&key).is_none() {
            env::set_var(&key, &value);
            applied += 1;
        } else {
            debug!(key = %key, "Keeping existing value");
        }
    }

    info!(path = %path.display(), applied, "Applied environment file");
    Some(path.to_path_buf())
}

/// Split one `KEY=VALUE` line, trimming whitespace and surrounding quotes.
/// Comments, blank lines, and lines without an assignment yield None.
fn split_assignment(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Some((key.to_string(), value.to_string()))
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_millis(key: &str, default: u64) -> Duration {
    let millis = env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default);
    Duration::from_millis(millis)
}

/// Settings for the execution status tracker
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Interval between status polls
    pub poll_interval: Duration,
    /// Capacity of the tracker event channel
    pub event_capacity: usize,
}

impl TrackerConfig {
    /// Read tracker settings from `AF_*` environment variables.
    pub fn from_env() -> Self {
        let capacity = env::var("AF_TRACKER_EVENT_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(256);
        Self {
            poll_interval: env_millis("AF_POLL_INTERVAL_MS", 2000),
            event_capacity: capacity,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            event_capacity: 256,
        }
    }
}

/// Settings for the workflow runner client
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Base URL of the backend runner
    pub base_url: String,
    /// Request timeout
    pub request_timeout: Duration,
}

impl RunnerConfig {
    /// Read runner settings from `AF_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("AF_RUNNER_URL", "http://127.0.0.1:8080"),
            request_timeout: env_millis("AF_RUNNER_TIMEOUT_MS", 30_000),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_millis(30_000),
        }
    }
}
