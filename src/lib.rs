//! NPS Site Explorer Library
//!
//! Scrapes nps.gov for the sites in each state, caches every response on
//! disk, and looks up places near a site through the MapQuest search API.

pub mod cache;
pub mod cli;
pub mod data;
pub mod session;
