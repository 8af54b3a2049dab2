//! State directory and per-state site listings
//!
//! Reads the nps.gov index page for the state selector, and a state page for
//! its ordered list of park detail URLs. `NpsDirectory` ties both to the
//! cached fetcher and the site extractor.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use super::document::{Document, ExtractError, Query};
use super::site::extract_site;
use super::SiteRecord;
use crate::cache::{CachedFetcher, FetchError, Transport};

/// Base URL of the National Park Service site
pub const NPS_BASE_URL: &str = "https://www.nps.gov";

/// Lowercase state name to state page URL
pub type StateDirectory = BTreeMap<String, String>;

/// Errors that can occur while walking the NPS pages
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A page could not be fetched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A page did not have the expected structure
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Builds the state directory from the index page markup
///
/// Each link in the state selector menu becomes
/// `lowercased link text -> base_url + href`. Later duplicates replace
/// earlier ones.
pub fn list_states(markup: &str, base_url: &str) -> Result<StateDirectory, ExtractError> {
    let doc = Document::parse(markup);
    let menu = doc.require(
        &Query::class("ul", "dropdown-menu SearchBar-keywordSearch"),
        "state menu",
    )?;

    let mut states = StateDirectory::new();
    for link in menu.find_all(&Query::tag("a"))? {
        let href = link.attr("href").ok_or(ExtractError::MissingField("state link"))?;
        states.insert(
            link.text().to_lowercase(),
            format!("{}{}", base_url.trim_end_matches('/'), href.trim()),
        );
    }

    Ok(states)
}

/// Lists the detail page URLs on a state page, in document order
///
/// Each `li.clearfix` entry of `ul#list_parks` yields
/// `base_url + <h3 link href> + "index.htm"`.
pub fn list_sites(markup: &str, base_url: &str) -> Result<Vec<String>, ExtractError> {
    let doc = Document::parse(markup);
    let list = doc.require(&Query::id("ul", "list_parks"), "park list")?;

    list.find_all(&Query::class("li", "clearfix"))?
        .iter()
        .map(|item| -> Result<String, ExtractError> {
            let link = item
                .require(&Query::tag("h3"), "park heading")?
                .require(&Query::tag("a"), "park link")?;
            let href = link.attr("href").ok_or(ExtractError::MissingField("park link"))?;
            Ok(format!(
                "{}{}index.htm",
                base_url.trim_end_matches('/'),
                href.trim()
            ))
        })
        .collect()
}

/// Walks nps.gov pages through a cached fetcher
#[derive(Debug, Clone)]
pub struct NpsDirectory {
    base_url: String,
}

impl Default for NpsDirectory {
    fn default() -> Self {
        Self::new(NPS_BASE_URL)
    }
}

impl NpsDirectory {
    /// Creates a directory rooted at `base_url` (e.g. "https://www.nps.gov")
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// URL of the index page carrying the state selector
    pub fn index_url(&self) -> String {
        format!("{}/index.htm", self.base_url)
    }

    /// Fetches the index page and builds the state directory
    pub async fn states<T: Transport>(
        &self,
        fetcher: &mut CachedFetcher<T>,
    ) -> Result<StateDirectory, DirectoryError> {
        let markup = fetcher.fetch(&self.index_url()).await?;
        let states = list_states(&markup, &self.base_url)?;
        debug!(count = states.len(), "built state directory");
        Ok(states)
    }

    /// Fetches a state page and every site on it, in listing order
    ///
    /// One request per site, issued sequentially.
    ///
    /// # Arguments
    /// * `fetcher` - Cached fetcher used for every page
    /// * `state_url` - URL of the state page, as found in the directory
    ///
    /// # Returns
    /// * `Ok(Vec<SiteRecord>)` - Sites in the order the state page lists them
    /// * `Err(DirectoryError)` - On the first fetch or extraction failure
    pub async fn sites_for_state<T: Transport>(
        &self,
        fetcher: &mut CachedFetcher<T>,
        state_url: &str,
    ) -> Result<Vec<SiteRecord>, DirectoryError> {
        let markup = fetcher.fetch(state_url).await?;
        let site_urls = list_sites(&markup, &self.base_url)?;

        let mut sites = Vec::with_capacity(site_urls.len());
        for url in &site_urls {
            let page = fetcher.fetch(url).await?;
            sites.push(extract_site(&page)?);
        }

        debug!(state_url, count = sites.len(), "loaded sites for state");
        Ok(sites)
    }
}

/// Renders an index page whose state menu links to the given paths
#[cfg(test)]
pub(crate) fn index_page(states: &[(&str, &str)]) -> String {
    let items: String = states
        .iter()
        .map(|(name, href)| format!(r#"<li><a href="{}">{}</a></li>"#, href, name))
        .collect();
    format!(
        r#"<html><body>
        <ul class="dropdown-menu">
          <li><a href="/decoy/">Decoy</a></li>
        </ul>
        <ul class="dropdown-menu SearchBar-keywordSearch" role="menu">{}</ul>
        </body></html>"#,
        items
    )
}

/// Renders a state page listing parks under the given hrefs
#[cfg(test)]
pub(crate) fn state_page(hrefs: &[&str]) -> String {
    let items: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<li class="clearfix" id="asset">
                     <h2>National Park</h2>
                     <h3><a href="{}">Park</a></h3>
                     <h4>Somewhere, XX</h4>
                   </li>"#,
                href
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="parkListResultsArea">
<ul id="list_parks">{}</ul>
</div></body></html>"#,
        items
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, ScriptedTransport};
    use crate::data::site::detail_page;
    use std::time::Duration;
    use tempfile::TempDir;

    const BASE: &str = "https://www.nps.gov";

    #[test]
    fn test_list_states_lowercases_and_absolutizes() {
        let page = index_page(&[("Michigan", "/state/mi/index.htm")]);

        let states = list_states(&page, BASE).unwrap();

        let mut expected = StateDirectory::new();
        expected.insert(
            "michigan".to_string(),
            "https://www.nps.gov/state/mi/index.htm".to_string(),
        );
        assert_eq!(states, expected);
    }

    #[test]
    fn test_list_states_ignores_other_menus() {
        let page = index_page(&[
            ("Michigan", "/state/mi/index.htm"),
            ("Wyoming", "/state/wy/index.htm"),
        ]);

        let states = list_states(&page, BASE).unwrap();

        assert_eq!(states.len(), 2);
        assert!(!states.contains_key("decoy"));
        assert_eq!(states["wyoming"], "https://www.nps.gov/state/wy/index.htm");
    }

    #[test]
    fn test_list_states_last_duplicate_wins() {
        let page = index_page(&[("Michigan", "/first/"), ("MICHIGAN", "/second/")]);

        let states = list_states(&page, BASE).unwrap();

        assert_eq!(states.len(), 1);
        assert_eq!(states["michigan"], "https://www.nps.gov/second/");
    }

    #[test]
    fn test_list_states_without_menu_fails() {
        let result = list_states("<html><body></body></html>", BASE);
        assert_eq!(result, Err(ExtractError::MissingField("state menu")));
    }

    #[test]
    fn test_list_sites_preserves_document_order() {
        let page = state_page(&["/c/", "/a/", "/b/"]);

        let urls = list_sites(&page, BASE).unwrap();

        assert_eq!(
            urls,
            vec![
                "https://www.nps.gov/c/index.htm",
                "https://www.nps.gov/a/index.htm",
                "https://www.nps.gov/b/index.htm",
            ]
        );
    }

    #[test]
    fn test_list_sites_trims_href() {
        let page = state_page(&[" /isro/ "]);
        let urls = list_sites(&page, BASE).unwrap();
        assert_eq!(urls, vec!["https://www.nps.gov/isro/index.htm"]);
    }

    #[test]
    fn test_list_sites_empty_list() {
        let page = state_page(&[]);
        assert!(list_sites(&page, BASE).unwrap().is_empty());
    }

    #[test]
    fn test_list_sites_without_list_fails() {
        let result = list_sites("<html></html>", BASE);
        assert_eq!(result, Err(ExtractError::MissingField("park list")));
    }

    #[test]
    fn test_directory_urls_ignore_trailing_slash() {
        let directory = NpsDirectory::new("https://www.nps.gov/");
        assert_eq!(directory.index_url(), "https://www.nps.gov/index.htm");
        assert_eq!(NpsDirectory::default().index_url(), "https://www.nps.gov/index.htm");
    }

    #[tokio::test]
    async fn test_sites_for_state_fetches_in_listing_order() {
        let transport = ScriptedTransport::new()
            .with_page(
                "https://www.nps.gov/state/mi/index.htm",
                &state_page(&["/slbe/", "/isro/"]),
            )
            .with_page(
                "https://www.nps.gov/slbe/index.htm",
                &detail_page(
                    "National Lakeshore",
                    "Sleeping Bear Dunes",
                    "Empire",
                    "MI",
                    "49630",
                    Some("(231) 326-4700"),
                ),
            )
            .with_page(
                "https://www.nps.gov/isro/index.htm",
                &detail_page(
                    "National Park",
                    "Isle Royale",
                    "Houghton",
                    "MI",
                    "49931",
                    Some("(906) 482-0984"),
                ),
            );
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("c.json"));
        let mut fetcher = CachedFetcher::new(transport, store).with_delay(Duration::ZERO);
        let directory = NpsDirectory::new(BASE);

        let sites = directory
            .sites_for_state(&mut fetcher, "https://www.nps.gov/state/mi/index.htm")
            .await
            .unwrap();

        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Sleeping Bear Dunes", "Isle Royale"]);
        assert_eq!(
            fetcher.transport().requests(),
            vec![
                "https://www.nps.gov/state/mi/index.htm",
                "https://www.nps.gov/slbe/index.htm",
                "https://www.nps.gov/isro/index.htm",
            ]
        );
    }

    #[tokio::test]
    async fn test_sites_for_state_propagates_extraction_failure() {
        let transport = ScriptedTransport::new()
            .with_page("https://www.nps.gov/state/mi/index.htm", &state_page(&["/isro/"]))
            .with_page("https://www.nps.gov/isro/index.htm", "<html>redesigned</html>");
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("c.json"));
        let mut fetcher = CachedFetcher::new(transport, store).with_delay(Duration::ZERO);

        let result = NpsDirectory::new(BASE)
            .sites_for_state(&mut fetcher, "https://www.nps.gov/state/mi/index.htm")
            .await;

        assert!(matches!(
            result,
            Err(DirectoryError::Extract(ExtractError::MissingField(_)))
        ));
    }

    #[tokio::test]
    async fn test_states_fetches_index_page() {
        let transport = ScriptedTransport::new().with_page(
            "https://www.nps.gov/index.htm",
            &index_page(&[("Michigan", "/state/mi/index.htm")]),
        );
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("c.json"));
        let mut fetcher = CachedFetcher::new(transport, store).with_delay(Duration::ZERO);

        let states = NpsDirectory::new(BASE).states(&mut fetcher).await.unwrap();

        assert_eq!(
            states.get("michigan").map(String::as_str),
            Some("https://www.nps.gov/state/mi/index.htm")
        );
    }
}
