//! Cartography: sitemap parsing and the fetch/scan crawler that walks it.

pub mod crawler;
pub mod sitemap;
