//! Catalog integration: read-only track search over a Spotify-style Web API.
//!
//! Access uses the client-credentials flow; the token is cached in memory
//! and refreshed transparently. The only capability exposed is track
//! search — the pipeline never writes anything upstream.
//!
//! The [`CatalogSearch`] trait is the seam the pipeline depends on, so
//! tests can drive it with an in-memory backend.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::config::CatalogConfig;

/// Request timeout for catalog calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Safety margin subtracted from a token's advertised lifetime.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(10);

/// The search endpoint accepts limits in this window.
const API_LIMIT_RANGE: (usize, usize) = (1, 50);

/// Errors from the catalog collaborator. All variants are fatal to the
/// request that hit them; an empty result set is not an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Credentials are missing or were rejected by the token endpoint.
    #[error("catalog auth failed: {0}")]
    Auth(String),
    /// The catalog could not be reached or answered with an error status.
    #[error("catalog request failed: {0}")]
    Upstream(String),
    /// The catalog answered with a payload we could not understand.
    #[error("unexpected catalog response: {0}")]
    Malformed(String),
}

/// One raw search result from the catalog, before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    /// Release date as reported upstream, usually "YYYY-MM-DD" or "YYYY".
    pub release_date: Option<String>,
    pub popularity: Option<u32>,
    pub duration_ms: Option<u64>,
    pub uri: String,
}

impl Candidate {
    /// Release year parsed from the leading four characters of the release
    /// date, if they form a number.
    #[must_use]
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.as_deref()?.get(..4)?.parse().ok()
    }

    /// Artists joined for display ("A, B").
    #[must_use]
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// Read-only search seam between the pipeline and the catalog backend.
pub trait CatalogSearch {
    /// Search tracks by free-text query. May return fewer than `limit`
    /// results, or none; candidate IDs within one call are unique.
    fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, CatalogError>;
}

struct TokenInfo {
    access_token: String,
    expires_at: Instant,
}

impl TokenInfo {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Blocking HTTP client for the catalog Web API.
pub struct CatalogClient {
    http: reqwest::blocking::Client,
    cfg: CatalogConfig,
    token: Mutex<Option<TokenInfo>>,
}

impl CatalogClient {
    pub fn new(cfg: CatalogConfig) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Upstream(e.to_string()))?;
        Ok(Self {
            http,
            cfg,
            token: Mutex::new(None),
        })
    }

    fn access_token(&self) -> Result<String, CatalogError> {
        if self.cfg.client_id.is_empty() || self.cfg.client_secret.is_empty() {
            return Err(CatalogError::Auth(
                "catalog client ID/secret are missing; set MOODQUEUE_CLIENT_ID and MOODQUEUE_CLIENT_SECRET".to_string(),
            ));
        }

        let mut cached = self.token.lock().unwrap();
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                debug!("Using cached catalog access token");
                return Ok(token.access_token.clone());
            }
        }

        info!("Requesting new catalog access token (client credentials)");
        let response = self
            .http
            .post(&self.cfg.token_url)
            .basic_auth(&self.cfg.client_id, Some(&self.cfg.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .map_err(|e| CatalogError::Auth(format!("token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(CatalogError::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let payload: TokenResponse = response
            .json()
            .map_err(|e| CatalogError::Malformed(format!("token response: {e}")))?;
        let lifetime = Duration::from_secs(payload.expires_in.unwrap_or(3600));
        info!("Catalog access token obtained (expires in {}s)", lifetime.as_secs());

        let access_token = payload.access_token;
        *cached = Some(TokenInfo {
            access_token: access_token.clone(),
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        });
        Ok(access_token)
    }

    fn invalidate_token(&self) {
        *self.token.lock().unwrap() = None;
    }

    fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::blocking::Response, CatalogError> {
        let token = self.access_token()?;
        self.http
            .get(url)
            .query(params)
            .bearer_auth(token)
            .send()
            .map_err(|e| CatalogError::Upstream(e.to_string()))
    }
}

impl CatalogSearch for CatalogClient {
    fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, CatalogError> {
        info!("Searching catalog tracks: query={query:?}, limit={limit}");
        let limit = limit.clamp(API_LIMIT_RANGE.0, API_LIMIT_RANGE.1);
        let url = format!("{}/search", self.cfg.api_base_url);
        let params = [
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", limit.to_string()),
        ];

        let mut response = self.get(&url, &params)?;
        if response.status().as_u16() == 401 {
            // Stale token; refresh once and retry.
            warn!("Catalog search returned 401, retrying with a fresh token");
            self.invalidate_token();
            response = self.get(&url, &params)?;
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(CatalogError::Upstream(format!("search returned {status}: {body}")));
        }

        let payload: SearchResponse = response
            .json()
            .map_err(|e| CatalogError::Malformed(format!("search response: {e}")))?;
        let items = payload.tracks.map(|page| page.items).unwrap_or_default();
        debug!("Catalog search returned {} raw items", items.len());

        Ok(dedup_candidates(items.into_iter().map(Candidate::from).collect()))
    }
}

/// Drop repeated candidate IDs, keeping the first occurrence. Candidates
/// with no ID at all are kept as-is.
fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| candidate.id.is_empty() || seen.insert(candidate.id.clone()))
        .collect()
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    album: Option<AlbumRef>,
    popularity: Option<u32>,
    duration_ms: Option<u64>,
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: Option<String>,
    release_date: Option<String>,
}

impl From<TrackItem> for Candidate {
    fn from(item: TrackItem) -> Self {
        let id = item.id.unwrap_or_default();
        let uri = item.uri.unwrap_or_else(|| format!("spotify:track:{id}"));
        let album = item
            .album
            .as_ref()
            .and_then(|album| album.name.clone())
            .unwrap_or_default();
        let release_date = item.album.and_then(|album| album.release_date);
        Self {
            id,
            name: item.name.unwrap_or_else(|| "<unknown>".to_string()),
            artists: item.artists.into_iter().filter_map(|artist| artist.name).collect(),
            album,
            release_date,
            popularity: item.popularity,
            duration_ms: item.duration_ms,
            uri,
        }
    }
}
