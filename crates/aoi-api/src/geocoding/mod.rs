// Nominatim-compatible geocoding endpoints: forward search and reverse lookup.

pub mod client;
pub mod models;
