// Geocoding HTTP client
//
// Wraps `reqwest::Client` with Nominatim URL construction, query
// parameter defaults, and status/body decoding. The engine only ever
// sees typed `Place` values or an `Error`.

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::geocoding::models::{Place, ReverseResponse};
use crate::transport::TransportConfig;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Query parameters applied to every forward search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of results.
    pub limit: u32,
    /// ISO 3166-1 alpha-2 codes restricting the search. Empty = worldwide.
    pub country_codes: Vec<String>,
    /// Ask for the structured `address` breakdown.
    pub address_details: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            country_codes: vec!["de".into()],
            address_details: true,
        }
    }
}

/// Everything needed to build a [`GeocodingClient`].
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: Url,
    pub options: SearchOptions,
    pub transport: TransportConfig,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default geocoder URL is valid"),
            options: SearchOptions::default(),
            transport: TransportConfig::default(),
        }
    }
}

/// HTTP client for a Nominatim-compatible geocoder.
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: Url,
    options: SearchOptions,
    /// Reported in `Error::Timeout`; 0 when the caller built the client.
    timeout_secs: u64,
}

impl GeocodingClient {
    /// Create a client from a [`GeocoderConfig`].
    pub fn new(config: &GeocoderConfig) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(config.base_url.clone()),
            options: config.options.clone(),
            timeout_secs: config.transport.timeout.as_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and default options.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = normalize_base(Url::parse(base_url)?);
        Ok(Self {
            http,
            base_url,
            options: SearchOptions::default(),
            timeout_secs: 0,
        })
    }

    /// Replace the search options.
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// The geocoder base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The active search options.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Forward search: free-text query to a ranked list of places.
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, Error> {
        let mut url = self.base_url.join("search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query)
                .append_pair("format", "json")
                .append_pair("limit", &self.options.limit.to_string())
                .append_pair(
                    "addressdetails",
                    if self.options.address_details { "1" } else { "0" },
                );
            if !self.options.country_codes.is_empty() {
                pairs.append_pair("countrycodes", &self.options.country_codes.join(","));
            }
        }
        self.get_json(url).await
    }

    /// Reverse lookup: the place at a position, or `None` if the geocoder
    /// has nothing there.
    pub async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<Place>, Error> {
        let mut url = self.base_url.join("reverse")?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lng.to_string())
            .append_pair("format", "json");

        match self.get_json::<ReverseResponse>(url).await? {
            ReverseResponse::Place(place) => Ok(Some(*place)),
            ReverseResponse::NotFound { error } => {
                debug!(%error, "reverse lookup found nothing");
                Ok(None)
            }
        }
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = resp.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1);
            return Err(Error::RateLimited { retry_after_secs });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: body.trim().chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// `Url::join` drops the last path segment unless it ends with `/`, which
/// would turn `https://host/nominatim` + `search` into `https://host/search`.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
