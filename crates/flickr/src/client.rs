//! Flickr search client
//!
//! Each call is an independent request/response: the client keeps no state
//! between calls beyond its connection pool, performs no retries and caches
//! nothing.

use crate::config::ClientConfig;
use crate::error::{SearchError, SearchResult};
use crate::search::{parse_search_response, SearchPage, SearchParams};
use pinpix_geo::{BoundingBox, Coordinate};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, Url};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Error bodies longer than this are cut before landing in an error
const MAX_ERROR_BODY_CHARS: usize = 512;

/// A source of geo photo search results.
///
/// [`FlickrClient`] is the production implementation; the album is generic
/// over this so it can be driven without a network.
pub trait PhotoSearch: Send + Sync {
    /// Fetch one page of photos around `coordinate`.
    fn search(
        &self,
        coordinate: Coordinate,
        page: u32,
    ) -> impl Future<Output = SearchResult<SearchPage>> + Send;
}

/// Flickr REST client
///
/// Cheap to clone; clones share the connection pool and configuration.
#[derive(Clone)]
pub struct FlickrClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl FlickrClient {
    /// Create a new client with configuration from environment
    pub fn new() -> SearchResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> SearchResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pinpix/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(SearchError::Transport)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Validate inputs and build the query for a search, without sending it
    pub fn search_params(&self, coordinate: &Coordinate, page: u32) -> SearchResult<SearchParams> {
        if page == 0 {
            return Err(SearchError::InvalidPage(page));
        }
        coordinate.validate()?;

        Ok(SearchParams {
            api_key: self.config.api_key.clone(),
            bbox: BoundingBox::around(coordinate),
            per_page: self.config.per_page,
            page,
        })
    }

    /// Search for photos around a coordinate.
    ///
    /// Invalid coordinates and page numbers fail before any network traffic.
    #[instrument(skip(self), fields(request_id))]
    pub async fn search(&self, coordinate: Coordinate, page: u32) -> SearchResult<SearchPage> {
        let params = self.search_params(&coordinate, page)?;

        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let request = self
            .inner
            .get(&self.config.base_url)
            .query(&params.to_query_pairs());

        let start = Instant::now();
        let body = Self::execute(&request_id, request).await?;
        let result = parse_search_response(&body);

        match &result {
            Ok(found) => debug!(
                bbox = %params.bbox,
                total_pages = found.total_pages,
                photos = found.photos.len(),
                elapsed_ms = start.elapsed().as_millis(),
                "Search succeeded"
            ),
            Err(e) => warn!(error = %e, "Search response rejected"),
        }

        result
    }

    /// Download the image bytes behind a photo's remote URL
    #[instrument(skip(self), fields(request_id))]
    pub async fn download_image(&self, url: &str) -> SearchResult<Vec<u8>> {
        let url = Url::parse(url)
            .map_err(|e| SearchError::malformed(format!("invalid photo URL {url:?}: {e}")))?;

        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let bytes = Self::execute(&request_id, self.inner.get(url)).await?;
        if bytes.is_empty() {
            return Err(SearchError::malformed("image response had an empty body"));
        }

        debug!(bytes = bytes.len(), "Image downloaded");
        Ok(bytes)
    }

    /// Send a request once and return the body of a 2xx response
    async fn execute(request_id: &str, request: RequestBuilder) -> SearchResult<Vec<u8>> {
        let response = request.header(X_REQUEST_ID, request_id).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(request_id = %request_id, status = status.as_u16(), "Request failed");
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl PhotoSearch for FlickrClient {
    fn search(
        &self,
        coordinate: Coordinate,
        page: u32,
    ) -> impl Future<Output = SearchResult<SearchPage>> + Send {
        FlickrClient::search(self, coordinate, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve a single HTTP response and hand back the raw request text.
    async fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/services/rest"), handle)
    }

    fn client_for(base_url: &str) -> FlickrClient {
        let config = ClientConfig::default()
            .with_api_key("test-key")
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(5));
        FlickrClient::with_config(config).unwrap()
    }

    fn page_body(pages: u32, count: usize) -> String {
        let photos: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("{}", 900 + i),
                    "title": format!("Bay view {i}"),
                    "url_m": format!("https://live.staticflickr.com/1/{i}_m.jpg")
                })
            })
            .collect();
        json!({ "stat": "ok", "photos": { "pages": pages, "photo": photos } }).to_string()
    }

    #[test]
    fn test_client_creation() {
        assert!(FlickrClient::with_config(ClientConfig::default().with_api_key("k")).is_ok());
        assert!(FlickrClient::with_config(ClientConfig::default()).is_err());
    }

    #[test]
    fn test_search_params() {
        let client = client_for("http://127.0.0.1:9/rest");
        let params = client
            .search_params(&Coordinate::new(37.7749, -122.4194), 1)
            .unwrap();

        assert_eq!(params.bbox.to_query(), "-123.4194,36.7749,-121.4194,38.7749");
        assert_eq!(params.per_page, Some(21));
        assert_eq!(params.api_key, "test-key");
    }

    #[tokio::test]
    async fn test_invalid_input_never_hits_network() {
        // Nothing listens on the discard port; a request would surface as Transport
        let client = client_for("http://127.0.0.1:9/rest");

        let err = client.search(Coordinate::new(90.0, 0.0), 1).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidCoordinate(_)));

        let err = client.search(Coordinate::new(0.0, 0.0), 0).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidPage(0)));
    }

    #[tokio::test]
    async fn test_search_san_francisco() {
        let (url, server) = serve_once("200 OK", page_body(3, 21)).await;
        let client = client_for(&url);

        let page = client
            .search(Coordinate::new(37.7749, -122.4194), 1)
            .await
            .unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.photos.len(), 21);

        let request = server.await.unwrap();
        let request_line = request.lines().next().unwrap();
        assert!(request_line.starts_with("GET /services/rest?"));
        assert!(request_line.contains("method=flickr.photos.search"));
        assert!(request_line.contains("api_key=test-key"));
        assert!(request_line.contains("bbox=-123.4194%2C36.7749%2C-121.4194%2C38.7749"));
        assert!(request_line.contains("safe_search=1"));
        assert!(request_line.contains("extras=url_m"));
        assert!(request_line.contains("format=json"));
        assert!(request_line.contains("nojsoncallback=1"));
        assert!(request_line.contains("per_page=21"));
        assert!(request_line.contains("&page=1"));
        assert!(request.to_lowercase().contains("x-request-id:"));
    }

    #[tokio::test]
    async fn test_identical_searches_match() {
        let body = page_body(2, 7);
        let (url_a, _a) = serve_once("200 OK", body.clone()).await;
        let (url_b, _b) = serve_once("200 OK", body).await;
        let coordinate = Coordinate::new(48.8566, 2.3522);

        let first = client_for(&url_a).search(coordinate, 2).await.unwrap();
        let second = client_for(&url_b).search(coordinate, 2).await.unwrap();
        assert_eq!(first.photos, second.photos);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (url, _server) = serve_once("503 Service Unavailable", "busy".to_string()).await;
        let err = client_for(&url)
            .search(Coordinate::new(0.0, 0.0), 1)
            .await
            .unwrap_err();

        match &err {
            SearchError::Status { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let body = json!({ "stat": "fail", "code": 100, "message": "Invalid API Key" }).to_string();
        let (url, _server) = serve_once("200 OK", body).await;

        let err = client_for(&url)
            .search(Coordinate::new(0.0, 0.0), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (url, _server) = serve_once("200 OK", "<html>oops</html>".to_string()).await;

        let err = client_for(&url)
            .search(Coordinate::new(0.0, 0.0), 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = client_for("http://127.0.0.1:1/rest");
        let err = client.search(Coordinate::new(0.0, 0.0), 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_download_image() {
        let (url, _server) = serve_once("200 OK", "JPEGDATA".to_string()).await;
        let client = client_for("http://127.0.0.1:9/rest");

        let bytes = client.download_image(&url).await.unwrap();
        assert_eq!(bytes, b"JPEGDATA");

        let err = client.download_image("not a url").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_search_through_trait() {
        async fn via_trait<S: PhotoSearch>(search: &S) -> SearchResult<SearchPage> {
            search.search(Coordinate::new(95.0, 0.0), 1).await
        }

        let client = client_for("http://127.0.0.1:9/rest");
        assert!(matches!(
            tokio_test::block_on(via_trait(&client)),
            Err(SearchError::InvalidCoordinate(_))
        ));
    }
}
