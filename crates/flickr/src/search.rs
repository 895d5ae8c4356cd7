//! `flickr.photos.search` request parameters and response parsing
//!
//! Request: a bounding-box search returning the medium image URL per photo.
//!
//! Response shape:
//!
//! ```json
//! { "stat": "ok",
//!   "photos": { "pages": 3, "photo": [ { "id": "1", "title": "t", "url_m": "https://..." } ] } }
//! ```
//!
//! A `stat` other than `"ok"` is a provider error; `code` and `message` are
//! surfaced when present.

use crate::error::{SearchError, SearchResult};
use pinpix_geo::BoundingBox;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Search method name
pub const SEARCH_METHOD: &str = "flickr.photos.search";

/// `extras` value selecting the medium-size image URL
pub const MEDIUM_URL_EXTRA: &str = "url_m";

/// Response format, structured JSON without a callback wrapper
pub const RESPONSE_FORMAT: &str = "json";

/// `stat` value of a successful response
pub const OK_STATUS: &str = "ok";

/// A photo record with every field the album needs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedPhoto {
    /// Provider photo id
    pub id: String,
    /// Photo title, may be empty
    pub title: String,
    /// Medium-size image URL
    pub remote_url: String,
}

/// One successful page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total number of pages the provider reports for this search
    pub total_pages: u32,
    /// Photos in provider order; empty is a valid result
    pub photos: Vec<ParsedPhoto>,
}

/// Query parameters for a single search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Provider API key
    pub api_key: String,
    /// Search area
    pub bbox: BoundingBox,
    /// Results per page, omitted when `None`
    pub per_page: Option<u32>,
    /// 1-based page number
    pub page: u32,
}

impl SearchParams {
    /// Render as `(name, value)` pairs in a stable order.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("method", SEARCH_METHOD.to_string()),
            ("api_key", self.api_key.clone()),
            ("bbox", self.bbox.to_query()),
            ("safe_search", "1".to_string()),
            ("extras", MEDIUM_URL_EXTRA.to_string()),
            ("format", RESPONSE_FORMAT.to_string()),
            ("nojsoncallback", "1".to_string()),
        ];
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs
    }
}

// ============================================================================
// Response schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    stat: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotosEnvelope {
    photos: PhotosBody,
}

#[derive(Debug, Deserialize)]
struct PhotosBody {
    pages: u32,
    // Elements are decoded one by one so a stray non-object drops only itself
    photo: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    #[serde(default, deserialize_with = "string_or_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    title: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    url_m: Option<String>,
}

impl RawPhoto {
    fn into_parsed(self) -> Option<ParsedPhoto> {
        Some(ParsedPhoto {
            id: self.id?,
            title: self.title?,
            remote_url: self.url_m?,
        })
    }
}

/// Wrong-typed fields count as missing so one bad record only drops itself.
fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Parse a search response body.
///
/// Records that are not objects, or that miss `id`, `title` or `url_m`, are
/// dropped; the rest keep the provider's order.
pub fn parse_search_response(body: &[u8]) -> SearchResult<SearchPage> {
    let status: StatusEnvelope = serde_json::from_slice(body)
        .map_err(|e| SearchError::malformed(format!("body is not a JSON object: {e}")))?;

    match status.stat.as_deref() {
        Some(OK_STATUS) => {}
        Some(other) => {
            return Err(SearchError::Provider {
                code: status.code.as_ref().and_then(provider_code),
                message: status.message.unwrap_or_else(|| format!("stat={other}")),
            });
        }
        None => return Err(SearchError::malformed("missing \"stat\" field")),
    }

    let envelope: PhotosEnvelope = serde_json::from_slice(body)
        .map_err(|e| SearchError::malformed(format!("unexpected \"photos\" shape: {e}")))?;

    let raw_count = envelope.photos.photo.len();
    let photos: Vec<ParsedPhoto> = envelope
        .photos
        .photo
        .into_iter()
        .filter_map(|value| serde_json::from_value::<RawPhoto>(value).ok())
        .filter_map(RawPhoto::into_parsed)
        .collect();

    if photos.len() < raw_count {
        debug!(
            dropped = raw_count - photos.len(),
            kept = photos.len(),
            "Dropped unusable photo records"
        );
    }

    Ok(SearchPage {
        total_pages: envelope.photos.pages,
        photos,
    })
}

// The provider sends numeric codes, tolerate them as strings too.
fn provider_code(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
