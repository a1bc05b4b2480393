//! One-shot HTTP GET used to check that a running service answers.

use std::time::Duration;

use reqwest::Client;

pub const DEFAULT_PROBE_URL: &str = "http://localhost:3000/models";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub status: u16,
    pub body: String,
}

impl std::fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Status Code: {}", self.status)?;
        write!(f, "Response Body: {}", self.body)
    }
}

/// Any HTTP status counts as an answer; only transport failures are errors.
pub async fn probe(url: &str, timeout: Duration) -> Result<ProbeReport, reqwest::Error> {
    let client = Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    tracing::debug!("Probe {} answered {}", url, status);
    Ok(ProbeReport { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_prints_status_and_body() {
        let report = ProbeReport {
            status: 200,
            body: "[\"handbook\"]".to_string(),
        };
        assert_eq!(
            report.to_string(),
            "Status Code: 200\nResponse Body: [\"handbook\"]"
        );
    }

    #[tokio::test]
    async fn answers_from_a_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/models", axum::routing::get(|| async { "[]" }));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let report = probe(&format!("http://{}/models", addr), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(report.status, 200);
        assert_eq!(report.body, "[]");
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let result = probe("http://127.0.0.1:9/models", Duration::from_secs(1)).await;
        assert!(result.is_err());
    }
}
