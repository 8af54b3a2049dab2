//! Core data models for the NPS site explorer
//!
//! This module contains the site record scraped from nps.gov detail pages,
//! the extractors that produce it, and the nearby-places client.

pub mod document;
pub mod places;
pub mod site;
pub mod states;

pub use document::{Document, ExtractError, Node, Query};
pub use places::{
    NearbyPlaces, Place, PlaceFields, PlacesClient, PlacesError, PLACES_ENDPOINT,
};
pub use site::extract_site;
pub use states::{
    list_sites, list_states, DirectoryError, NpsDirectory, StateDirectory, NPS_BASE_URL,
};

use serde::{Deserialize, Serialize};

/// A National Park Service site
///
/// Built in one step from a single detail page; every field is present,
/// possibly as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Designation such as "National Park"; some sites have none
    pub category: String,
    /// Display name, e.g. "Isle Royale"
    pub name: String,
    /// "<locality>, <region>", e.g. "Houghton, MI"
    pub address: String,
    /// Postal code as printed, e.g. "49931" or "82190-0168"
    pub postal_code: String,
    /// Phone number as printed, not normalized
    pub phone: String,
}

impl SiteRecord {
    /// One-line description used in site listings
    ///
    /// Format: `<name> (<category>): <address> <postal code>`
    pub fn info(&self) -> String {
        format!(
            "{} ({}): {} {}",
            self.name, self.category, self.address, self.postal_code
        )
    }
}
