//! Analysis service client.
//!
//! Provides:
//! - `AnalysisTransport` - the seam the coordinator calls through
//! - `AnalysisClient` - reqwest implementation for `POST /analyze` and `GET /health`
//! - Response interpretation shared by every transport

use crate::config::ClientConfig;
use crate::error::LensError;
use crate::models::{AnalysisRequest, AnalysisResult, HealthStatus};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Instant;

/// Endpoint path for analysis submissions.
pub const ANALYZE_PATH: &str = "analyze";

/// Endpoint path for the health check.
pub const HEALTH_PATH: &str = "health";

/// Outbound boundary to the analysis service.
///
/// One call per submission; implementations must not retry.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Submit a request and return the parsed result.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, LensError>;

    /// Transport name for logging.
    fn name(&self) -> &'static str;
}

/// HTTP client for the analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl AnalysisClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, LensError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("lens/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| LensError::transport_with_source("Failed to build HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Query the service health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, LensError> {
        let url = self.config.endpoint(HEALTH_PATH);
        tracing::debug!(url = %url, "Checking service health");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error = LensError::service(status.as_u16(), extract_detail(&body));
            tracing::warn!(error = %error, "Health check failed");
            return Err(error);
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl AnalysisTransport for AnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, LensError> {
        let url = self.config.endpoint(ANALYZE_PATH);
        let start = Instant::now();

        tracing::debug!(url = %url, db_type = %request.db_type, "Sending analysis request");
        tracing::trace!(query = %request.query_preview(50), "Analysis request body");

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(
            status = status.as_u16(),
            body_len = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis response received"
        );

        parse_analysis_response(status, &body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Error body shape; only a string `detail` is honored.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Pull the `detail` string out of an error body, if there is one.
///
/// Non-JSON bodies, bodies without `detail`, and non-string details
/// (such as validation error lists) all yield `None`.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) => Some(detail),
        _ => None,
    }
}

/// Interpret an `/analyze` response.
///
/// Any 2xx status must carry a complete result body; a body that does not
/// match is treated as a failure, like a non-2xx status.
pub fn parse_analysis_response(
    status: StatusCode,
    body: &[u8],
) -> Result<AnalysisResult, LensError> {
    if !status.is_success() {
        return Err(LensError::service(status.as_u16(), extract_detail(body)));
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(status = status.as_u16(), error = %e, "Malformed analysis result");
        LensError::malformed_with_source("Success response does not match the result contract", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dialect, QueryDraft};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer one HTTP request with a canned response and return the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..n]);
                if request_complete(&received) {
                    break;
                }
            }

            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8(received).unwrap()
        });

        (base_url, handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let Some(head_end) = received.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&received[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|len| len.trim().parse::<usize>().ok())
            .unwrap_or(0);
        received.len() >= head_end + 4 + content_length
    }

    fn split_request(raw: &str) -> (&str, serde_json::Value) {
        let (head, body) = raw.split_once("\r\n\r\n").unwrap();
        let request_line = head.lines().next().unwrap();
        let body = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(body).unwrap()
        };
        (request_line, body)
    }

    fn client_for(base_url: &str) -> AnalysisClient {
        AnalysisClient::new(ClientConfig::default().with_base_url(base_url).unwrap()).unwrap()
    }

    fn sample_request() -> AnalysisRequest {
        QueryDraft::new("SELECT * FROM users", Dialect::Mysql).to_request()
    }

    #[tokio::test]
    async fn test_analyze_posts_request_and_parses_result() {
        let (base_url, server) = serve_once(
            "HTTP/1.1 200 OK",
            concat!(
                r#"{"analysis_time_ms":4.5,"readability_score":70,"#,
                r#""optimization_suggestions":[{"type":"index_missing"}],"#,
                r#""security_issues":["SELECT *"]}"#
            ),
        )
        .await;

        let request = sample_request();
        let result = client_for(&base_url).analyze(&request).await.unwrap();
        assert_eq!(result.issue_count(), 1);
        assert_eq!(result.security_issues, vec!["SELECT *".to_string()]);

        let raw = server.await.unwrap();
        let (request_line, body) = split_request(&raw);
        assert_eq!(request_line, "POST /analyze HTTP/1.1");
        assert_eq!(
            body,
            json!({ "query": "SELECT * FROM users", "db_type": "mysql", "focus": "performance" })
        );
    }

    #[tokio::test]
    async fn test_analyze_surfaces_service_detail() {
        let (base_url, server) =
            serve_once("HTTP/1.1 500 Internal Server Error", r#"{"detail":"syntax error"}"#).await;

        let err = client_for(&base_url).analyze(&sample_request()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.failure_message(), "syntax error");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_analyze_unparsable_error_body() {
        let (base_url, server) =
            serve_once("HTTP/1.1 500 Internal Server Error", "<html>upstream down</html>").await;

        let err = client_for(&base_url).analyze(&sample_request()).await.unwrap_err();
        assert!(matches!(err, LensError::Service { status: 500, detail: None }));
        assert_eq!(err.failure_message(), "Analysis failed");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_health_gets_health_endpoint() {
        let (base_url, server) =
            serve_once("HTTP/1.1 200 OK", r#"{"status":"healthy","service":"analyzer"}"#).await;

        let health = client_for(&base_url).health().await.unwrap();
        assert!(health.is_healthy());

        let raw = server.await.unwrap();
        assert_eq!(split_request(&raw).0, "GET /health HTTP/1.1");
    }

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_error_with_detail() {
        let err = parse_analysis_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &body(json!({ "detail": "syntax error" })),
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.failure_message(), "syntax error");
    }

    #[test]
    fn test_error_without_parsable_body() {
        let err =
            parse_analysis_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>")
                .unwrap_err();
        assert_eq!(err.failure_message(), "Analysis failed");

        let err = parse_analysis_response(StatusCode::BAD_GATEWAY, b"").unwrap_err();
        assert_eq!(err.failure_message(), "Analysis failed");
    }

    #[test]
    fn test_non_string_detail_falls_back() {
        let validation =
            body(json!({ "detail": [{ "loc": ["body", "query"], "msg": "field required" }] }));
        assert_eq!(extract_detail(&validation), None);

        let err = parse_analysis_response(StatusCode::UNPROCESSABLE_ENTITY, &validation)
            .unwrap_err();
        assert_eq!(err.failure_message(), "Analysis failed");
    }

    #[test]
    fn test_bad_request_detail() {
        let err = parse_analysis_response(
            StatusCode::BAD_REQUEST,
            &body(json!({ "detail": "Query too short" })),
        )
        .unwrap_err();
        assert_eq!(err.failure_message(), "Query too short");
    }

    #[test]
    fn test_success() {
        let result = parse_analysis_response(
            StatusCode::OK,
            &body(json!({
                "analysis_time_ms": 12.345,
                "readability_score": 87.6,
                "optimization_suggestions": [{ "type": "a" }, { "type": "b" }],
                "optimized_query": null,
                "execution_plan": null,
                "security_issues": []
            })),
        )
        .unwrap();
        assert_eq!(result.issue_count(), 2);
        assert_eq!(result.analysis_time_ms, 12.345);
    }

    #[test]
    fn test_success_status_other_than_200() {
        let result = parse_analysis_response(
            StatusCode::ACCEPTED,
            &body(json!({
                "analysis_time_ms": 1.0,
                "readability_score": 1.0,
                "optimization_suggestions": [],
                "security_issues": []
            })),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_malformed_success() {
        let err = parse_analysis_response(
            StatusCode::OK,
            &body(json!({ "readability_score": 80, "optimization_suggestions": [] })),
        )
        .unwrap_err();
        assert!(matches!(err, LensError::MalformedResponse { .. }));
        assert_eq!(err.failure_message(), "Analysis failed");

        let err = parse_analysis_response(StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, LensError::MalformedResponse { .. }));
    }

    #[test]
    fn test_client_uses_configured_endpoint() {
        let config = ClientConfig::default().with_base_url("http://analyzer:8080").unwrap();
        let client = AnalysisClient::new(config).unwrap();
        assert_eq!(client.config().endpoint(ANALYZE_PATH), "http://analyzer:8080/analyze");
        assert_eq!(client.name(), "http");
    }
}
