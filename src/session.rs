//! Interactive session for browsing sites
//!
//! A line-oriented loop: pick a state, pick a site from the numbered list,
//! see places near it. Input and output are generic so tests can script a
//! whole session. Mistyped input is answered with a re-prompt; anything that
//! goes wrong in the fetch/extract core ends the session with an error.

use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheStore, CachedFetcher, HttpTransport, Transport};
use crate::cli::StartupConfig;
use crate::data::{
    DirectoryError, NpsDirectory, PlacesClient, PlacesError, SiteRecord, StateDirectory,
};

const STATE_PROMPT: &str = "Enter a state name (e.g. Michigan, michigan) or \"exit\"";
const SITE_PROMPT: &str = "Choose the number for detail search or \"exit\" or \"back\"";

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading input or writing output failed
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// NPS pages could not be fetched or read
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Nearby places could not be looked up
    #[error(transparent)]
    Places(#[from] PlacesError),
}

/// What the user asked for at the state prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateCommand {
    Exit,
    /// Normalized (trimmed, lowercased) state name
    State(String),
}

/// What the user asked for at the site prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteCommand {
    Exit,
    Back,
    /// Zero-based index into the site list
    Select(usize),
    Invalid,
}

/// Interprets a line typed at the state prompt
pub fn parse_state_input(line: &str) -> StateCommand {
    let name = line.trim().to_lowercase();
    if name == "exit" {
        StateCommand::Exit
    } else {
        StateCommand::State(name)
    }
}

/// Interprets a line typed at the site prompt
///
/// # Arguments
/// * `line` - Raw input line
/// * `site_count` - Number of sites in the current listing
///
/// # Returns
/// `Select(i)` with a zero-based index for `1..=site_count`, `Invalid` for
/// anything that is not a command or an in-range number.
pub fn parse_site_input(line: &str, site_count: usize) -> SiteCommand {
    match line.trim() {
        "exit" => SiteCommand::Exit,
        "back" => SiteCommand::Back,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=site_count).contains(&n) => SiteCommand::Select(n - 1),
            _ => SiteCommand::Invalid,
        },
    }
}

/// Where the site menu hands control back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Back,
    Exit,
}

/// Writes a prompt and reads one line; `None` at end of input
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    text: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}\n: ", text)?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line))
}

/// A browsing session over one cached fetcher
pub struct Session<T = HttpTransport> {
    fetcher: CachedFetcher<T>,
    directory: NpsDirectory,
    places: PlacesClient,
}

impl Session<HttpTransport> {
    /// Builds a network-backed session from the startup configuration
    pub fn from_config(config: &StartupConfig) -> Self {
        let fetcher = CachedFetcher::new(HttpTransport::new(), CacheStore::new(&config.cache_file))
            .with_delay(config.request_delay);
        Self::new(
            fetcher,
            NpsDirectory::new(config.base_url.as_str()),
            PlacesClient::with_endpoint(config.places_endpoint.as_str(), config.api_key.clone()),
        )
    }
}

impl<T: Transport> Session<T> {
    pub fn new(fetcher: CachedFetcher<T>, directory: NpsDirectory, places: PlacesClient) -> Self {
        Self {
            fetcher,
            directory,
            places,
        }
    }

    /// Runs the session until the user exits or input ends
    ///
    /// # Returns
    /// * `Ok(())` on `exit` or end of input
    /// * `Err(SessionError)` if a page, the places API, or the terminal fails
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut out: W,
    ) -> Result<(), SessionError> {
        let states = self.directory.states(&mut self.fetcher).await?;

        loop {
            let Some(line) = prompt(&mut input, &mut out, STATE_PROMPT)? else {
                return Ok(());
            };

            let state = match parse_state_input(&line) {
                StateCommand::Exit => return Ok(()),
                StateCommand::State(name) => name,
            };

            if self.browse_state(&states, &state, &mut input, &mut out).await? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Lists one state's sites and serves the site menu
    async fn browse_state<R: BufRead, W: Write>(
        &mut self,
        states: &StateDirectory,
        state: &str,
        input: &mut R,
        out: &mut W,
    ) -> Result<Flow, SessionError> {
        let Some(state_url) = states.get(state) else {
            writeln!(out, "[Error] Enter proper state name\n")?;
            return Ok(Flow::Back);
        };

        let sites = self.directory.sites_for_state(&mut self.fetcher, state_url).await?;
        let rule = write_site_list(out, state, &sites)?;

        loop {
            writeln!(out, "{}", rule)?;
            let Some(line) = prompt(input, out, SITE_PROMPT)? else {
                return Ok(Flow::Exit);
            };

            match parse_site_input(&line, sites.len()) {
                SiteCommand::Exit => return Ok(Flow::Exit),
                SiteCommand::Back => return Ok(Flow::Back),
                SiteCommand::Invalid => writeln!(out, "[Error] Invalid input\n")?,
                SiteCommand::Select(index) => {
                    let site = &sites[index];
                    debug!(site = %site.name, "looking up nearby places");
                    let places = self.places.nearby(&mut self.fetcher, site).await?;

                    writeln!(out, "{}", rule)?;
                    writeln!(out, "Places near {}", site.name)?;
                    writeln!(out, "{}", rule)?;
                    for place in &places.search_results {
                        writeln!(out, "{}", place.summary())?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }
}

/// Prints the numbered site list and returns the horizontal rule used
/// around it
fn write_site_list<W: Write>(out: &mut W, state: &str, sites: &[SiteRecord]) -> io::Result<String> {
    let title = format!("List of national sites in {}", state);
    let rule = "-".repeat(title.len());

    writeln!(out, "{}", rule)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", rule)?;
    for (i, site) in sites.iter().enumerate() {
        writeln!(out, "[{}] {}", i + 1, site.info())?;
    }
    writeln!(out)?;

    Ok(rule)
}
