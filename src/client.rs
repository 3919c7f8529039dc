use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::debug;

use crate::model::{RecommendRequest, RecommendResponse};

const RECOMMEND_PATH: &str = "recommend";
// Amount of an error body kept for diagnostics.
const BODY_EXCERPT_LEN: usize = 200;

#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(&self, prompt: &str) -> Result<RecommendResponse, TransportError>;
}

pub struct HttpRecommendationClient {
    client: reqwest::Client,
    recommend_url: Url,
}

impl HttpRecommendationClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            recommend_url: recommend_url(&endpoint)?,
        })
    }
}

/// Join the recommend path onto the endpoint, keeping any base path.
fn recommend_url(endpoint: &Url) -> Result<Url, TransportError> {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(RECOMMEND_PATH)
        .map_err(|e| TransportError::Setup(format!("invalid endpoint {}: {}", endpoint, e)))
}

#[async_trait]
impl RecommendationService for HttpRecommendationClient {
    async fn recommend(&self, prompt: &str) -> Result<RecommendResponse, TransportError> {
        debug!(url = %self.recommend_url, "Requesting recommendations");

        let body = RecommendRequest {
            prompt: prompt.to_string(),
        };

        let response = self
            .client
            .post(self.recommend_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(TransportError::from_reqwest)?;

        if !status.is_success() {
            let excerpt: String = String::from_utf8_lossy(&bytes)
                .chars()
                .take(BODY_EXCERPT_LEN)
                .collect();
            return Err(TransportError::Status(status, excerpt));
        }

        let parsed: RecommendResponse =
            serde_json::from_slice(&bytes).map_err(TransportError::Decode)?;

        debug!(
            status = status.as_u16(),
            count = parsed.movies.as_ref().map_or(0, |m| m.len()),
            "Received recommendations"
        );

        Ok(parsed)
    }
}

/// Failure to obtain a well-formed answer from the service. The details
/// are for logs only.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client setup failed: {0}")]
    Setup(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(reqwest::Error),
    #[error("Service returned {0}: {1}")]
    Status(StatusCode, String),
    #[error("Malformed response body: {0}")]
    Decode(serde_json::Error),
}

impl TransportError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    async fn serve(app: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn client(endpoint: Url) -> HttpRecommendationClient {
        HttpRecommendationClient::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_recommend_url_keeps_base_path() {
        let url = recommend_url(&Url::parse("http://localhost:8000").unwrap()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/recommend");

        let url = recommend_url(&Url::parse("https://example.com/api").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/recommend");

        let url = recommend_url(&Url::parse("https://example.com/api/").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/recommend");
    }

    #[tokio::test]
    async fn test_posts_prompt_and_decodes_movies() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let seen_in_handler = seen.clone();
        let app = Router::new().route(
            "/recommend",
            post(move |Json(req): Json<RecommendRequest>| {
                let seen = seen_in_handler.clone();
                async move {
                    seen.lock().unwrap().push(req.prompt);
                    Json(serde_json::json!({
                        "movies": [{"id": 1, "title": "Mad Max", "year": "2015", "poster_url": "", "overview": "...", "genres": ["Action"]}]
                    }))
                }
            }),
        );
        let endpoint = serve(app).await;

        let response = client(endpoint)
            .recommend("feeling adventurous, want action")
            .await
            .unwrap();

        assert_eq!(response.movies.map(|m| m.len()), Some(1));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["feeling adventurous, want action".to_string()]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let app = Router::new().route(
            "/recommend",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );
        let endpoint = serve(app).await;

        let err = client(endpoint).recommend("anything").await.unwrap_err();
        match err {
            TransportError::Status(status, body) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "upstream exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport_error() {
        let app = Router::new().route("/recommend", post(|| async { "not json" }));
        let endpoint = serve(app).await;

        let err = client(endpoint).recommend("anything").await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = Url::parse(&format!("http://{}", addr)).unwrap();
        let err = client(endpoint).recommend("anything").await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            "/recommend",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(serde_json::json!({"movies": []}))
            }),
        );
        let endpoint = serve(app).await;

        let client = HttpRecommendationClient::new(endpoint, Duration::from_millis(100)).unwrap();
        let err = client.recommend("anything").await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }
}
