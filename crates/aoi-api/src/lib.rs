// aoi-api: Async Rust client for Nominatim-compatible geocoding services.

pub mod error;
pub mod geocoding;
pub mod transport;

pub use error::Error;
pub use geocoding::client::{GeocoderConfig, GeocodingClient, SearchOptions};
pub use geocoding::models::Place;
pub use transport::TransportConfig;
