//! Integration tests for the npsite binary
//!
//! Tests argument handling and drives a complete session through stdin
//! against a pre-seeded cache file, so no request reaches the network.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const INDEX_PAGE: &str = r#"<html><body>
<ul class="dropdown-menu SearchBar-keywordSearch" role="menu">
  <li><a href="/state/mi/index.htm">Michigan</a></li>
  <li><a href="/state/wy/index.htm">Wyoming</a></li>
</ul>
</body></html>"#;

const MICHIGAN_PAGE: &str = r#"<html><body>
<ul id="list_parks">
  <li class="clearfix"><h3><a href="/isro/">Isle Royale</a></h3></li>
</ul>
</body></html>"#;

const ISRO_PAGE: &str = r#"<html><body>
<div class="Hero-titleContainer clearfix">
  <a href="/isro/" class="Hero-title">Isle Royale</a>
  <span class="Hero-designation">National Park</span>
</div>
<span itemprop="addressLocality">Houghton</span>,
<span itemprop="addressRegion">MI</span>
<span itemprop="postalCode">49931</span>
<span itemprop="telephone">(906) 482-0984</span>
</body></html>"#;

const PLACES_RESPONSE: &str = r#"{"searchResults": [
  {"name": "Keweenaw Coffee Works", "fields": {
    "group_sic_code_name_ext": "Coffee Shops", "address": "1 Main St", "city": "Houghton"
  }}
]}"#;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> Output {
    run_cli_with_input(args, "")
}

/// Helper to run the CLI with given args, feeding `input` on stdin
fn run_cli_with_input(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_npsite"))
        .args(args)
        .env_remove("MAPQUEST_API_KEY")
        .env("RUST_LOG", "npsite=info")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute npsite");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for npsite")
}

/// Writes a cache file holding every page the Michigan session needs
fn seed_cache(path: &Path) {
    let mut cache = HashMap::new();
    cache.insert("https://www.nps.gov/index.htm", INDEX_PAGE);
    cache.insert("https://www.nps.gov/state/mi/index.htm", MICHIGAN_PAGE);
    cache.insert("https://www.nps.gov/isro/index.htm", ISRO_PAGE);
    cache.insert(
        concat!(
            "https://www.mapquestapi.com/search/v2/radius",
            "?origin=49931&radius=10&maxMatches=10&ambiguities=ignore&outFormat=json"
        ),
        PLACES_RESPONSE,
    );
    std::fs::write(path, serde_json::to_string(&cache).unwrap()).expect("Failed to seed cache");
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("npsite"), "Help should mention npsite");
    assert!(stdout.contains("--cache-file"), "Help should mention --cache-file");
    assert!(stdout.contains("--api-key"), "Help should mention --api-key");
}

#[test]
fn test_help_does_not_reveal_api_key() {
    let output = Command::new(env!("CARGO_BIN_EXE_npsite"))
        .arg("--help")
        .env("MAPQUEST_API_KEY", "SUPERSECRET")
        .output()
        .expect("Failed to execute npsite");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("SUPERSECRET"));
}

#[test]
fn test_invalid_base_url_prints_error_and_exits() {
    let output = run_cli(&["--base-url", "not a url"]);
    assert!(!output.status.success(), "Expected invalid URL to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid URL"),
        "Should print error message about the URL: {}",
        stderr
    );
}

#[test]
fn test_session_exit_with_cached_index() {
    let temp_dir = TempDir::new().unwrap();
    let cache_file = temp_dir.path().join("cache.json");
    seed_cache(&cache_file);

    let output = run_cli_with_input(
        &["--cache-file", cache_file.to_str().unwrap(), "--delay-ms", "0"],
        "exit\n",
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Enter a state name"));
}

#[test]
fn test_full_session_from_cache() {
    let temp_dir = TempDir::new().unwrap();
    let cache_file = temp_dir.path().join("cache.json");
    seed_cache(&cache_file);

    let output = run_cli_with_input(
        &[
            "--cache-file",
            cache_file.to_str().unwrap(),
            "--delay-ms",
            "0",
            "--api-key",
            "TESTKEY",
        ],
        "Atlantis\nmichigan\n5\n1\nback\nexit\n",
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[Error] Enter proper state name"));
    assert!(stdout.contains("List of national sites in michigan"));
    assert!(stdout.contains("[1] Isle Royale (National Park): Houghton, MI 49931"));
    assert!(stdout.contains("[Error] Invalid input"));
    assert!(stdout.contains("Places near Isle Royale"));
    assert!(stdout.contains("- Keweenaw Coffee Works (Coffee Shops): 1 Main St, Houghton"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("using cache"), "Cache hits should be logged: {}", stderr);
    assert!(!stderr.contains("TESTKEY"), "API key must not be logged");
}

#[test]
fn test_missing_api_key_fails_on_first_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let cache_file = temp_dir.path().join("cache.json");
    seed_cache(&cache_file);

    let output = run_cli_with_input(
        &["--cache-file", cache_file.to_str().unwrap(), "--delay-ms", "0"],
        "michigan\n1\n",
    );

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[1] Isle Royale"), "Sites list before the failure");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key"), "{}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use npsite::cli::{Cli, StartupConfig};

    #[test]
    fn test_startup_config_from_cli_defaults() {
        let cli = Cli::parse_from(["npsite", "--api-key", "abc"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.base_url, "https://www.nps.gov");
        assert_eq!(config.api_key.as_deref(), Some("abc"));
    }

    #[test]
    fn test_startup_config_from_cli_invalid_endpoint() {
        let cli = Cli::parse_from(["npsite", "--places-endpoint", "mapquest"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_err());
    }
}
