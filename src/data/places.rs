//! MapQuest radius search client
//!
//! Looks up businesses near a site's postal code. Requests go through the
//! cached fetcher; the API key is added to the request URL only, never to
//! the cache key or the log.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::SiteRecord;
use crate::cache::{CachedFetcher, FetchError, Transport};

/// Base URL for the MapQuest radius search API
pub const PLACES_ENDPOINT: &str = "https://www.mapquestapi.com/search/v2/radius";

/// Search radius around the origin, in miles
const SEARCH_RADIUS: &str = "10";

/// Maximum number of places returned per search
const MAX_MATCHES: &str = "10";

/// Errors that can occur when looking up nearby places
#[derive(Debug, Error)]
pub enum PlacesError {
    /// No API key was configured
    #[error("MapQuest API key not found. Set MAPQUEST_API_KEY or pass --api-key.")]
    MissingApiKey,

    /// Endpoint could not be turned into a request URL
    #[error("Invalid places endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// Request failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Failed to parse JSON response
    #[error("Failed to parse places response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Radius search response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyPlaces {
    /// Matches in the order the API ranks them; absent when nothing matched
    #[serde(rename = "searchResults", default)]
    pub search_results: Vec<Place>,
}

/// A single business returned by the search
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub fields: PlaceFields,
}

/// Optional details of a place
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceFields {
    /// Business category
    #[serde(rename = "group_sic_code_name_ext", default)]
    pub category: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Trimmed value, or `fallback` when absent or blank
fn or_fallback<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

impl Place {
    pub fn category(&self) -> &str {
        or_fallback(&self.fields.category, "no category")
    }

    pub fn address(&self) -> &str {
        or_fallback(&self.fields.address, "no address")
    }

    pub fn city(&self) -> &str {
        or_fallback(&self.fields.city, "no city")
    }

    /// Listing line: `- <name> (<category>): <address>, <city>`
    pub fn summary(&self) -> String {
        format!(
            "- {} ({}): {}, {}",
            self.name.trim(),
            self.category(),
            self.address(),
            self.city()
        )
    }
}

/// Client for the radius search API
#[derive(Debug, Clone)]
pub struct PlacesClient {
    endpoint: String,
    api_key: Option<String>,
}

impl PlacesClient {
    /// Creates a client for the default endpoint
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoint(PLACES_ENDPOINT, api_key)
    }

    /// Creates a client for a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Query URL for `site` without the API key; used as the cache key
    pub fn cache_key(&self, site: &SiteRecord) -> Result<Url, PlacesError> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("origin", site.postal_code.as_str()),
                ("radius", SEARCH_RADIUS),
                ("maxMatches", MAX_MATCHES),
                ("ambiguities", "ignore"),
                ("outFormat", "json"),
            ],
        )?;
        Ok(url)
    }

    /// Full request URL for `site`, including the API key
    pub fn query_url(&self, site: &SiteRecord) -> Result<Url, PlacesError> {
        let api_key = self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)?;
        let mut url = self.cache_key(site)?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }

    /// Fetches places near the site's postal code
    ///
    /// # Returns
    /// * `Ok(NearbyPlaces)` - Parsed search results
    /// * `Err(PlacesError::MissingApiKey)` - Before any I/O, if no key is set
    /// * `Err(PlacesError)` - If the request or JSON parsing fails
    pub async fn nearby<T: Transport>(
        &self,
        fetcher: &mut CachedFetcher<T>,
        site: &SiteRecord,
    ) -> Result<NearbyPlaces, PlacesError> {
        let url = self.query_url(site)?;
        let key = self.cache_key(site)?;

        let body = fetcher.fetch_keyed(key.as_str(), url.as_str()).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
