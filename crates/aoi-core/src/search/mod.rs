// ── Location search ──
//
// One logical query/result slice. Each `search` call takes a token from a
// monotonically increasing counter; a response is applied only if its
// token is still the newest, so overlapping lookups resolve last-call-wins.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use aoi_api::GeocodingClient;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::convert::search_results;
use crate::error::CoreError;
use crate::model::{SearchResult, SearchState};
use crate::stream::StateStream;

/// Anything that can turn free text into places.
pub trait Geocoder: Send + Sync {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, CoreError>> + Send;
}

impl Geocoder for GeocodingClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        let places = GeocodingClient::search(self, query).await?;
        Ok(search_results(places))
    }
}

pub struct SearchSession<G> {
    geocoder: G,
    state: watch::Sender<SearchState>,
    generation: AtomicU64,
}

impl<G: Geocoder> SearchSession<G> {
    pub fn new(geocoder: G) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            geocoder,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Run one lookup and publish its results.
    ///
    /// A blank query clears the results without contacting the geocoder.
    /// Failures are logged and leave an empty result list. Returns `false`
    /// if a later `search` or `clear` superseded this call.
    pub async fn search(&self, query: &str) -> bool {
        let token = self.next_token();
        let trimmed = query.trim();

        if trimmed.is_empty() {
            self.state.send_modify(|s| {
                s.query = query.to_owned();
                s.results.clear();
                s.is_searching = false;
            });
            return true;
        }

        self.state.send_modify(|s| {
            s.query = query.to_owned();
            s.is_searching = true;
        });
        debug!(query = trimmed, token, "search started");

        let results = match self.geocoder.search(trimmed).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query = trimmed, error = %e, "search failed");
                Vec::new()
            }
        };

        let count = results.len();
        let applied = self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != token {
                return false;
            }
            s.results = results;
            s.is_searching = false;
            true
        });

        if applied {
            debug!(query = trimmed, count, "search completed");
        } else {
            debug!(query = trimmed, token, "stale search response discarded");
        }
        applied
    }

    /// Reset to idle and invalidate any lookup in flight.
    pub fn clear(&self) {
        self.next_token();
        self.state.send_replace(SearchState::default());
    }

    // ── Read accessors ───────────────────────────────────────────────

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.state.borrow().results.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.state.borrow().is_searching
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn subscribe(&self) -> StateStream<SearchState> {
        StateStream::new(self.state.subscribe())
    }

    fn next_token(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::model::LatLng;

    /// Answers `"slow"` after 100ms and everything else after 10ms,
    /// with one result named after the query.
    #[derive(Default)]
    struct FakeGeocoder {
        calls: AtomicUsize,
        fail: bool,
    }

    impl Geocoder for FakeGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = if query == "slow" { 100 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if self.fail {
                return Err(CoreError::Geocoder {
                    message: "HTTP 503: down".into(),
                    status: Some(503),
                });
            }
            Ok(vec![SearchResult {
                place_id: 1,
                display_name: query.to_owned(),
                location: LatLng::new(51.0, 7.0),
                bounds: None,
                class: None,
                kind: None,
                importance: None,
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn applies_results_and_clears_flag() {
        let session = SearchSession::new(FakeGeocoder::default());
        assert!(session.search("Dortmund").await);
        let state = session.state();
        assert_eq!(state.query, "Dortmund");
        assert!(!state.is_searching);
        assert_eq!(state.results[0].display_name, "Dortmund");
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_skips_geocoder() {
        let session = SearchSession::new(FakeGeocoder::default());
        session.search("Essen").await;
        assert!(session.search("   ").await);
        assert!(session.results().is_empty());
        assert!(!session.is_searching());
        assert_eq!(session.geocoder().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_yields_empty_results() {
        let session = SearchSession::new(FakeGeocoder {
            fail: true,
            ..FakeGeocoder::default()
        });
        assert!(session.search("Bochum").await);
        assert!(session.results().is_empty());
        assert!(!session.is_searching());
    }

    #[tokio::test(start_paused = true)]
    async fn last_call_wins() {
        let session = SearchSession::new(FakeGeocoder::default());
        let (slow, fast) = tokio::join!(session.search("slow"), session.search("fast"));

        assert!(!slow);
        assert!(fast);
        let state = session.state();
        assert_eq!(state.query, "fast");
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].display_name, "fast");
        assert!(!state.is_searching);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_invalidates_in_flight_lookup() {
        let session = SearchSession::new(FakeGeocoder::default());
        let (applied, ()) = tokio::join!(session.search("slow"), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            session.clear();
        });

        assert!(!applied);
        assert_eq!(session.state(), SearchState::default());
    }
}
