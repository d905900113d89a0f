use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::models::{ApiConfig, ErrorBody};

const EXPORT_CONTENT_TYPE: &str = "application/xml";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Could not reach the route service: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("The route service did not answer in time.")]
    Timeout,

    #[error("Route or segment not found. Please check the numbers and try again.")]
    NotFound,

    #[error("Server error ({status}): {detail}")]
    Status { status: u16, detail: String },

    #[error("The server returned an error ({status}).")]
    Unreadable { status: u16 },
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent())
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build configured HTTP client, using defaults");
                Client::new()
            });

        Self { client }
    }

    /// Fetch one route export. Any non-success status is an error; the body
    /// of a success response is returned as-is, empty or not.
    pub async fn fetch_route(&self, url: &Url) -> Result<Bytes> {
        debug!(%url, "requesting route export");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, EXPORT_CONTENT_TYPE)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let error = describe_failure(response).await;
            warn!(%url, status = status.as_u16(), error = %error, "route export request failed");
            return Err(error);
        }

        let body = response.bytes().await.map_err(classify)?;
        info!(%url, status = status.as_u16(), bytes = body.len(), "route export received");
        Ok(body)
    }
}

fn classify(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::RequestError(error)
    }
}

/// Turn a non-success response into an error, reading the body for details
/// unless the status alone says enough.
async fn describe_failure(response: Response) -> ApiError {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound;
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("json"));

    let detail = if is_json {
        response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_description)
    } else {
        response
            .text()
            .await
            .ok()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    };

    match detail {
        Some(detail) => ApiError::Status {
            status: status.as_u16(),
            detail,
        },
        None => ApiError::Unreadable {
            status: status.as_u16(),
        },
    }
}

fn user_agent() -> String {
    format!("route-gpx-downloader/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: String::new(),
            timeout: Duration::from_secs(5),
        })
    }

    fn url(server: &mockito::ServerGuard, path: &str) -> Url {
        Url::parse(&format!("{}{}", server.url(), path)).unwrap()
    }

    #[tokio::test]
    async fn success_returns_body_and_sends_accept_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/route/hiking/51/part/2")
            .match_header("accept", "application/xml")
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body("<gpx></gpx>")
            .create_async()
            .await;

        let body = client()
            .fetch_route(&url(&server, "/route/hiking/51/part/2"))
            .await
            .unwrap();

        assert_eq!(&body[..], b"<gpx></gpx>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_success_body_is_not_an_error_here() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/route/cycling/9")
            .with_status(200)
            .create_async()
            .await;

        let body = client()
            .fetch_route(&url(&server, "/route/cycling/9"))
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn not_found_ignores_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/route/hiking/999")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Route not found or SchweizMobil returned no coordinates"}"#)
            .create_async()
            .await;

        let err = client()
            .fetch_route(&url(&server, "/route/hiking/999"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(
            err.to_string(),
            "Route or segment not found. Please check the numbers and try again."
        );
    }

    #[tokio::test]
    async fn json_error_detail_is_reported_with_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/route/hiking/1")
            .with_status(502)
            .with_header("content-type", "application/json; charset=utf-8")
            .with_body(r#"{"detail": "Upstream unavailable"}"#)
            .create_async()
            .await;

        let err = client()
            .fetch_route(&url(&server, "/route/hiking/1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Server error (502): Upstream unavailable");
    }

    #[tokio::test]
    async fn json_error_message_field_is_used() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/route/hiking/1")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Bad route type"}"#)
            .create_async()
            .await;

        let err = client()
            .fetch_route(&url(&server, "/route/hiking/1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Server error (400): Bad route type");
    }

    #[tokio::test]
    async fn text_error_body_is_reported_with_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/route/cycling/2")
            .with_status(500)
            .with_header("content-type", "text/plain")
            .with_body("Internal Server Error\n")
            .create_async()
            .await;

        let err = client()
            .fetch_route(&url(&server, "/route/cycling/2"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Server error (500): Internal Server Error");
    }

    #[tokio::test]
    async fn malformed_json_error_falls_back_to_generic_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/route/cycling/2")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body("{not json")
            .create_async()
            .await;

        let err = client()
            .fetch_route(&url(&server, "/route/cycling/2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unreadable { status: 503 }));
        assert_eq!(err.to_string(), "The server returned an error (503).");
    }

    #[tokio::test]
    async fn silent_service_is_a_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = ApiClient::new(&ApiConfig {
            base_url: String::new(),
            timeout: Duration::from_secs(1),
        });
        let url = Url::parse(&format!("http://{addr}/route/hiking/1")).unwrap();
        let err = client.fetch_route(&url).await.unwrap_err();

        assert!(matches!(err, ApiError::Timeout));
        assert_eq!(err.to_string(), "The route service did not answer in time.");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/route/hiking/1")).unwrap();
        let err = client().fetch_route(&url).await.unwrap_err();
        assert!(matches!(err, ApiError::RequestError(_)));
        assert!(err.to_string().starts_with("Could not reach the route service"));
    }
}
