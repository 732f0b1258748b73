//! HTTP transport against the backend's `v0` view endpoint.

use std::time::Duration;

use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::{BoxFuture, Transport, TransportError};
use crate::query::QueryModel;
use crate::view::View;

/// Default backend API root.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/api";

/// Path of the view resource, relative to the API root.
pub const VIEW_PATH: &str = "v0/";

/// Default timeout for a single view request in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Real transport implementation using reqwest.
///
/// Issues `GET <endpoint>/v0/?<query>` and decodes the JSON body into a
/// [`View`]. The request is raced against the cancellation token, so a
/// superseded request is dropped (and its connection aborted) as soon as
/// the token fires.
pub struct HttpTransport {
    client: reqwest::Client,
    view_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a new HttpTransport with the default timeout.
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HttpTransport with a custom timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base = format!("{}/{}", endpoint.trim_end_matches('/'), VIEW_PATH);
        let view_url = Url::parse(&base).map_err(|e| TransportError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            view_url,
            timeout,
        })
    }

    /// The request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the full request URL for a query.
    pub fn view_url(&self, query: &QueryModel) -> Url {
        let mut url = self.view_url.clone();
        let pairs = query.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else {
            TransportError::Network(e.to_string())
        }
    }

    async fn request(&self, query: &QueryModel) -> Result<View, TransportError> {
        let url = self.view_url(query);
        debug!(url = %url, "Requesting view");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl Transport for HttpTransport {
    fn fetch_view<'a>(
        &'a self,
        query: &'a QueryModel,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<View, TransportError>> {
        Box::pin(async move {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => Err(TransportError::Cancelled),
                result = self.request(query) => result,
            }
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};

    fn sample_view(name: &str) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "time": "2023-08-30T18:00:00Z",
            "bearingDeg": 45.0,
            "center": [-119.2065, 40.7864],
            "zoom": 12.8,
            "type": "FeatureCollection",
            "features": [],
            "refs": [],
            "log": []
        })
    }

    /// Serve `router` on an ephemeral local port, returning the API root.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    #[test]
    fn test_view_url_without_params() {
        let transport = HttpTransport::new("http://localhost:8000/api").unwrap();
        let url = transport.view_url(&QueryModel::new());
        assert_eq!(url.as_str(), "http://localhost:8000/api/v0/");
    }

    #[test]
    fn test_view_url_trailing_slash_endpoint() {
        let transport = HttpTransport::new("http://localhost:8000/api/").unwrap();
        let url = transport.view_url(&QueryModel::new().with_zoom(5.0));
        assert_eq!(url.as_str(), "http://localhost:8000/api/v0/?zoom=5");
    }

    #[test]
    fn test_view_url_encodes_params() {
        let transport = HttpTransport::new(DEFAULT_ENDPOINT).unwrap();
        let query = QueryModel::new().with_zoom(6.0).with_feature("aprs/w6abc");
        let url = transport.view_url(&query);
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v0/?zoom=6&feature=aprs%2Fw6abc"
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = HttpTransport::new("not a url");
        match result {
            Err(TransportError::InvalidEndpoint { url, .. }) => assert_eq!(url, "not a url"),
            _ => panic!("Expected InvalidEndpoint error"),
        }
    }

    #[tokio::test]
    async fn test_fetch_success_decodes_view() {
        let router = Router::new().route(
            "/api/v0/",
            get(|| async { Json(sample_view("Black Rock City 2023")) }),
        );
        let transport = HttpTransport::new(&serve(router).await).unwrap();

        let view = transport
            .fetch_view(&QueryModel::new(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(view.name, "Black Rock City 2023");
        assert!(view.map.is_some());
    }

    #[tokio::test]
    async fn test_fetch_forwards_zoom_param() {
        let router = Router::new().route(
            "/api/v0/",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let zoom = params.get("zoom").cloned().unwrap_or_default();
                Json(sample_view(&format!("zoom {}", zoom)))
            }),
        );
        let transport = HttpTransport::new(&serve(router).await).unwrap();

        let view = transport
            .fetch_view(&QueryModel::new().with_zoom(7.0), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(view.name, "zoom 7");
    }

    #[tokio::test]
    async fn test_fetch_http_error_carries_status_and_body() {
        let router = Router::new().route(
            "/api/v0/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database on fire") }),
        );
        let transport = HttpTransport::new(&serve(router).await).unwrap();

        let result = transport
            .fetch_view(&QueryModel::new(), CancellationToken::new())
            .await;
        match result {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "database on fire");
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let router = Router::new().route("/api/v0/", get(|| async { "{not json" }));
        let transport = HttpTransport::new(&serve(router).await).unwrap();

        let result = transport
            .fetch_view(&QueryModel::new(), CancellationToken::new())
            .await;
        assert!(matches!(result, Err(TransportError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&format!("http://{}/api", addr)).unwrap();
        let result = transport
            .fetch_view(&QueryModel::new(), CancellationToken::new())
            .await;
        assert!(matches!(result, Err(TransportError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_cancelled() {
        let router = Router::new().route(
            "/api/v0/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Json(sample_view("too late"))
            }),
        );
        let transport = HttpTransport::new(&serve(router).await).unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = transport.fetch_view(&QueryModel::new(), cancel).await;
        assert_eq!(result, Err(TransportError::Cancelled));
    }

    #[tokio::test]
    async fn test_fetch_already_cancelled_token() {
        let transport = HttpTransport::new(DEFAULT_ENDPOINT).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = transport.fetch_view(&QueryModel::new(), cancel).await;
        assert_eq!(result, Err(TransportError::Cancelled));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let router = Router::new().route(
            "/api/v0/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(sample_view("too late"))
            }),
        );
        let endpoint = serve(router).await;
        let transport = HttpTransport::with_timeout(&endpoint, Duration::from_millis(100)).unwrap();

        let result = transport
            .fetch_view(&QueryModel::new(), CancellationToken::new())
            .await;
        assert_eq!(
            result,
            Err(TransportError::Timeout(Duration::from_millis(100)))
        );
    }
}
