//! API client for the WhistleChain server

use anyhow::{Context, Result};
use reqwest::{Client as ReqwestClient, Response, StatusCode, Url};
use tracing::debug;
use whistle_core::{Report, ReportSubmission, SubmissionReceipt};

pub struct Client {
    http: ReqwestClient,
    base_url: String,
}

impl Client {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: ReqwestClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn submit(&self, submission: &ReportSubmission) -> Result<SubmissionReceipt> {
        let url = format!("{}/report", self.base_url);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(submission)
            .send()
            .await
            .context("Failed to send report")?;

        let response = check(response, "Submission failed").await?;
        response
            .json()
            .await
            .context("Failed to parse submission response")
    }

    pub async fn list(&self) -> Result<Vec<Report>> {
        let url = format!("{}/reports", self.base_url);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch reports")?;

        let response = check(response, "Listing reports failed").await?;
        response.json().await.context("Failed to parse reports")
    }

    pub async fn get(&self, id: &str) -> Result<Option<Report>> {
        let url = self.report_url(id)?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to fetch report")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check(response, "Fetching report failed").await?;
        let report = response.json().await.context("Failed to parse report")?;
        Ok(Some(report))
    }

    /// `{base}/report/{id}` with the ID percent-encoded as one path segment
    fn report_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid server URL {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Server URL {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .push("report")
            .push(id);
        Ok(url)
    }
}

/// Turn a non-2xx response into an error carrying the server's message
async fn check(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let error: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    anyhow::bail!(
        "{} ({}): {}",
        what,
        status,
        error["error"].as_str().unwrap_or("Unknown error")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = Client::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_report_url_encodes_id() {
        let client = Client::new("http://localhost:3000");
        let url = client.report_url("a/b?c#d").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/report/a%2Fb%3Fc%23d");

        let url = client.report_url("../reports").unwrap();
        assert_eq!(url.path(), "/report/..%2Freports");
    }

    #[test]
    fn test_report_url_keeps_base_path() {
        let client = Client::new("http://localhost:3000/api/");
        let url = client.report_url("abc").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/report/abc");
    }

    #[test]
    fn test_report_url_rejects_bad_base() {
        assert!(Client::new("not a url").report_url("abc").is_err());
        assert!(Client::new("mailto:someone@example.com").report_url("abc").is_err());
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        // Take a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = Client::new(&format!("http://127.0.0.1:{}", port));
        let result = tokio_test::block_on(client.list());
        assert!(result.is_err());
    }
}
