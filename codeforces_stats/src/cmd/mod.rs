pub mod complete;
pub mod contests;
pub mod handle;
pub mod leaderboard;
pub mod problems;
pub mod profile;

use anyhow::{Context, Result};
use clap::ValueEnum;
use codeforces_stats_libs::codeforces::{
    client::StandaloneCodeforcesClient, query::ApiCredentials, DEFAULT_API_URL,
};
use codeforces_stats_libs::filter::HandleParameter;
use codeforces_stats_libs::storage::{FileStore, PreferenceStore};
use codeforces_stats_libs::VerificationPolicy;
use serde::Serialize;
use std::{env, fmt, path::PathBuf, sync::Arc, time::Duration};
use validator::Validate;

const DEFAULT_STATE_FILE: &str = ".codeforces_stats.json";
const DEFAULT_REQUEST_INTERVAL_MS: u64 = 2000;

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub fn connect() -> Result<StandaloneCodeforcesClient> {
    let api_url = env::var("CODEFORCES_API_URL").unwrap_or_else(|_| {
        tracing::debug!(
            "CODEFORCES_API_URL environment variable is not set. Default value `{}` will be used.",
            DEFAULT_API_URL
        );
        String::from(DEFAULT_API_URL)
    });

    let credentials = match (
        env::var("CODEFORCES_API_KEY"),
        env::var("CODEFORCES_API_SECRET"),
    ) {
        (Ok(key), Ok(secret)) => Some(ApiCredentials::new(key, secret)),
        (Err(_), Err(_)) => None,
        _ => {
            let message = "CODEFORCES_API_KEY and CODEFORCES_API_SECRET must be set together";
            tracing::error!(message);
            anyhow::bail!(message)
        }
    };

    let client = StandaloneCodeforcesClient::new(&api_url, credentials).with_context(|| {
        let message = format!("couldn't create Codeforces API client for {}", api_url);
        tracing::error!(message);
        message
    })?;
    tracing::info!(
        "Connect to {} ({})",
        api_url,
        if client.is_signed() { "signed" } else { "anonymous" }
    );

    Ok(client)
}

pub fn open_state() -> Result<Arc<FileStore>> {
    let path = env::var("CODEFORCES_STATE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE));

    let store = FileStore::open(&path).with_context(|| {
        let message = format!("couldn't open state file {}", path.display());
        tracing::error!(message);
        message
    })?;

    Ok(Arc::new(store))
}

pub fn request_interval() -> Duration {
    let millis = match env::var("CODEFORCES_REQUEST_INTERVAL_MS") {
        Ok(value) => value.parse::<u64>().unwrap_or_else(|_| {
            tracing::warn!(
                "invalid CODEFORCES_REQUEST_INTERVAL_MS `{}`. Default value {} will be used.",
                value,
                DEFAULT_REQUEST_INTERVAL_MS
            );
            DEFAULT_REQUEST_INTERVAL_MS
        }),
        Err(_) => DEFAULT_REQUEST_INTERVAL_MS,
    };
    Duration::from_millis(millis)
}

pub fn verification_policy() -> VerificationPolicy {
    match env::var("CODEFORCES_OWNER_HANDLE") {
        Ok(owner) if !owner.trim().is_empty() => {
            VerificationPolicy::default().with_owner(owner.trim())
        }
        _ => VerificationPolicy::default(),
    }
}

pub fn validate_handle(handle: &str) -> Result<()> {
    HandleParameter::new(handle).validate().with_context(|| {
        let message = format!("`{}` is not a valid handle", handle);
        tracing::error!(message);
        message
    })
}

/// The handle given on the command line, else the selected one.
pub fn resolve_handle(handle: Option<String>) -> Result<String> {
    let handle = match handle {
        Some(handle) => handle,
        None => {
            let preferences = PreferenceStore::new(open_state()?)?;
            match preferences.selected_handle() {
                Some(handle) => {
                    tracing::info!("Use selected handle {}", handle);
                    handle
                }
                None => {
                    let message =
                        "no handle given and none selected. run `codeforces_stats handle set <HANDLE>` first";
                    tracing::error!(message);
                    anyhow::bail!(message)
                }
            }
        }
    };
    validate_handle(&handle)?;
    Ok(handle)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}
