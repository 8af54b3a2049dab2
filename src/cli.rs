//! Command-line interface parsing for the NPS site explorer
//!
//! This module handles parsing of CLI arguments using clap and resolves them
//! into a `StartupConfig`. The MapQuest API key comes from `--api-key` or the
//! `MAPQUEST_API_KEY` environment variable and is never echoed back.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::cache::{DEFAULT_CACHE_FILE, DEFAULT_REQUEST_DELAY};
use crate::data::{NPS_BASE_URL, PLACES_ENDPOINT};

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// A URL flag does not hold an absolute http(s) URL
    #[error("Invalid URL for --{flag}: '{value}'")]
    InvalidUrl { flag: &'static str, value: String },
}

/// NPS site explorer - browse national park sites by state and find places nearby
#[derive(Parser, Debug)]
#[command(name = "npsite")]
#[command(about = "Browse National Park Service sites by state and find places nearby")]
#[command(version)]
pub struct Cli {
    /// MapQuest API key used for nearby-place searches
    #[arg(long, env = "MAPQUEST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// JSON file holding cached responses
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CACHE_FILE)]
    pub cache_file: PathBuf,

    /// Base URL of the National Park Service site
    #[arg(long, value_name = "URL", default_value = NPS_BASE_URL)]
    pub base_url: String,

    /// MapQuest radius search endpoint
    #[arg(long, value_name = "URL", default_value = PLACES_ENDPOINT)]
    pub places_endpoint: String,

    /// Pause before each uncached request, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_REQUEST_DELAY.as_millis() as u64)]
    pub delay_ms: u64,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// MapQuest API key, if one was supplied and non-blank
    pub api_key: Option<String>,
    /// Location of the response cache file
    pub cache_file: PathBuf,
    /// Base URL of the National Park Service site
    pub base_url: String,
    /// MapQuest radius search endpoint
    pub places_endpoint: String,
    /// Pause before each uncached request
    pub request_delay: Duration,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            base_url: NPS_BASE_URL.to_string(),
            places_endpoint: PLACES_ENDPOINT.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }
}

/// Checks that `value` is an absolute http(s) URL
///
/// # Returns
/// * `Ok(())` if the URL parses with an http or https scheme
/// * `Err(CliError::InvalidUrl)` otherwise
pub fn validate_url(flag: &'static str, value: &str) -> Result<(), CliError> {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(CliError::InvalidUrl {
            flag,
            value: value.to_string(),
        }),
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if a URL flag is not a valid http(s) URL
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        validate_url("base-url", &cli.base_url)?;
        validate_url("places-endpoint", &cli.places_endpoint)?;

        let api_key = cli
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(StartupConfig {
            api_key,
            cache_file: cli.cache_file.clone(),
            base_url: cli.base_url.clone(),
            places_endpoint: cli.places_endpoint.clone(),
            request_delay: Duration::from_millis(cli.delay_ms),
        })
    }
}
