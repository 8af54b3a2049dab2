//! Site detail page extraction
//!
//! Turns an nps.gov park detail page into a `SiteRecord`. The page is assumed
//! well formed: every marker must be present, and a missing one is reported
//! as `ExtractError::MissingField` rather than defaulted.

use super::document::{Document, ExtractError, Query};
use super::SiteRecord;

/// Extracts a `SiteRecord` from a site detail page
///
/// # Arguments
/// * `markup` - Full HTML of the detail page
///
/// # Returns
/// * `Ok(SiteRecord)` - All five fields, trimmed
/// * `Err(ExtractError::MissingField)` - If any marker is absent
pub fn extract_site(markup: &str) -> Result<SiteRecord, ExtractError> {
    let doc = Document::parse(markup);

    let category = doc
        .require(&Query::class("span", "Hero-designation"), "category")?
        .text();
    let name = doc
        .require(&Query::class("div", "Hero-titleContainer clearfix"), "name")?
        .require(&Query::tag("a"), "name")?
        .text();

    let locality = doc
        .require(&Query::attr("span", "itemprop", "addressLocality"), "address locality")?
        .text();
    let region = doc
        .require(&Query::attr("span", "itemprop", "addressRegion"), "address region")?
        .text();
    let postal_code = doc
        .require(&Query::attr("span", "itemprop", "postalCode"), "postal code")?
        .text();
    let phone = doc
        .require(&Query::attr("span", "itemprop", "telephone"), "telephone")?
        .text();

    Ok(SiteRecord {
        category,
        name,
        address: format!("{}, {}", locality, region),
        postal_code,
        phone,
    })
}

/// Renders a minimal detail page with the markers `extract_site` reads
#[cfg(test)]
pub(crate) fn detail_page(
    category: &str,
    name: &str,
    locality: &str,
    region: &str,
    postal: &str,
    phone: Option<&str>,
) -> String {
    let phone = phone
        .map(|p| format!(r#"<span itemprop="telephone" class="tel"> {} </span>"#, p))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <div class="Hero-titleContainer clearfix">
          <a href="/" class="Hero-title">
            {name}
          </a>
          <div class="Hero-designationContainer">
            <span class="Hero-designation">{category}</span>
            <span class="Hero-location">{region}</span>
          </div>
        </div>
        <div class="vcard">
          <p class="adr" itemprop="address">
            <span itemprop="streetAddress">800 East Lakeshore Drive</span>
            <span itemprop="addressLocality">{locality}</span>,
            <span itemprop="addressRegion" class="region">  {region} </span>
            <span itemprop="postalCode" class="postal-code">{postal} </span>
          </p>
          {phone}
        </div>
        </body></html>"#
    )
}
