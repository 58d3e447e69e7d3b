//! bio.tools REST API client: paginated tool listings, login, deletion.

use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::types::{Credentials, Tool};

/// bio.tools API client.
#[derive(Debug, Clone)]
pub struct BiotoolsClient {
    base_url: String,
    page_delay: std::time::Duration,
    http: reqwest::Client,
}

// -- Response types ---------------------------------------------------------

/// One page of the paginated tool listing.
#[derive(Debug, Deserialize)]
struct ToolListPage {
    #[serde(default)]
    next: Option<String>,
    list: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    key: String,
}

/// Outcome of a single delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The registry confirmed the deletion.
    Deleted,
    /// The entry was already gone (404); treated as success.
    AlreadyGone,
}

impl BiotoolsClient {
    /// Create a new client against the given API base URL.
    pub fn new(base_url: &str, page_delay_ms: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            page_delay: std::time::Duration::from_millis(page_delay_ms),
            http: reqwest::Client::new(),
        }
    }

    /// Build the listing URL, optionally filtered to a collection.
    fn listing_url(&self, collection_id: Option<&str>) -> String {
        match collection_id {
            Some(id) => format!(
                "{}/t/?collectionID=%22{}%22&format=json",
                self.base_url,
                urlencoding::encode(id)
            ),
            None => format!("{}/t/?format=json", self.base_url),
        }
    }

    /// Fetch all tool records, following pagination cursors.
    ///
    /// A fixed pacing delay is slept between page requests to respect the
    /// registry's rate limit. Any non-success HTTP status aborts the run.
    pub async fn fetch_tools(&self, collection_id: Option<&str>) -> Result<Vec<Tool>> {
        let base_url = self.listing_url(collection_id);
        let mut tools: Vec<Tool> = Vec::new();

        let mut page = self.fetch_page(&base_url).await?;
        tools.extend(page.list);

        while let Some(next) = page.next {
            tokio::time::sleep(self.page_delay).await;
            let url = format!("{}&{}", base_url, next_page_query(&next));
            page = self.fetch_page(&url).await?;
            tools.extend(page.list);
        }

        info!("Fetched {} tool records", tools.len());
        Ok(tools)
    }

    async fn fetch_page(&self, url: &str) -> Result<ToolListPage> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .context("Tool listing request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Tool listing failed ({}): {}", status, body);
        }

        resp.json().await.context("Failed to parse tool listing page")
    }

    /// Log in and return the API token.
    ///
    /// A 400 response means the credentials were rejected.
    pub async fn login(&self, credentials: &Credentials) -> Result<String> {
        let resp = self
            .http
            .post(format!("{}/rest-auth/login/", self.base_url))
            .json(credentials)
            .send()
            .await
            .context("Login request failed")?;

        let status = resp.status();
        if status == StatusCode::BAD_REQUEST {
            bail!("Authentication rejected; please verify the login credentials");
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Login failed ({}): {}", status, body);
        }

        let body: LoginResponse = resp.json().await.context("Failed to parse login response")?;
        Ok(body.key)
    }

    /// Delete a single tool entry. 404 counts as already deleted.
    pub async fn delete_tool(&self, token: &str, tool_id: &str) -> Result<DeleteOutcome> {
        let resp = self
            .http
            .delete(format!("{}/tool/{}/", self.base_url, tool_id))
            .header("Authorization", format!("Token {}", token))
            .send()
            .await
            .context("Delete request failed")?;

        let status = resp.status();
        match classify_delete_status(status) {
            Some(outcome) => Ok(outcome),
            None => {
                let body = resp.text().await.unwrap_or_default();
                bail!("Delete of '{}' failed ({}): {}", tool_id, status, body);
            }
        }
    }
}

/// Console line for one item of a bulk deletion run.
///
/// Failures get a line like every other outcome; the caller logs it and
/// moves on to the next ID, so one bad item never aborts the run.
pub fn delete_report_line(
    idx: usize,
    total: usize,
    tool_id: &str,
    result: &Result<DeleteOutcome>,
) -> String {
    match result {
        Ok(DeleteOutcome::Deleted) => {
            format!("Deleted tool {}/{}: 'biotools:{}'", idx + 1, total, tool_id)
        }
        Ok(DeleteOutcome::AlreadyGone) => format!(
            "Tool {}/{}: 'biotools:{}' has already been deleted or does not exist.",
            idx + 1,
            total,
            tool_id
        ),
        Err(e) => format!("ERROR: {:#}", e),
    }
}

/// Strip the leading `?` from a pagination cursor like `?page=2`.
fn next_page_query(next: &str) -> &str {
    next.strip_prefix('?').unwrap_or(next)
}

/// Map a delete response status to an outcome; `None` means a hard error.
fn classify_delete_status(status: StatusCode) -> Option<DeleteOutcome> {
    if status == StatusCode::NOT_FOUND {
        Some(DeleteOutcome::AlreadyGone)
    } else if status.is_success() {
        Some(DeleteOutcome::Deleted)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_escapes_collection_id() {
        let client = BiotoolsClient::new("https://bio.tools/api/", 0);
        assert_eq!(
            client.listing_url(Some("Rare Disease")),
            "https://bio.tools/api/t/?collectionID=%22Rare%20Disease%22&format=json"
        );
        assert_eq!(
            client.listing_url(None),
            "https://bio.tools/api/t/?format=json"
        );
    }

    #[test]
    fn pagination_cursor_drops_question_mark() {
        assert_eq!(next_page_query("?page=2"), "page=2");
        assert_eq!(next_page_query("page=3"), "page=3");
    }

    #[test]
    fn delete_status_classification() {
        assert_eq!(
            classify_delete_status(StatusCode::NO_CONTENT),
            Some(DeleteOutcome::Deleted)
        );
        assert_eq!(
            classify_delete_status(StatusCode::OK),
            Some(DeleteOutcome::Deleted)
        );
        assert_eq!(
            classify_delete_status(StatusCode::NOT_FOUND),
            Some(DeleteOutcome::AlreadyGone)
        );
        assert_eq!(classify_delete_status(StatusCode::FORBIDDEN), None);
        assert_eq!(classify_delete_status(StatusCode::INTERNAL_SERVER_ERROR), None);
    }

    #[test]
    fn bulk_delete_reports_every_item() {
        let results: Vec<(&str, Result<DeleteOutcome>)> = vec![
            ("comet", Ok(DeleteOutcome::Deleted)),
            ("ghost", Ok(DeleteOutcome::AlreadyGone)),
            ("maxquant", Ok(DeleteOutcome::Deleted)),
        ];
        let lines: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(idx, (id, result))| delete_report_line(idx, results.len(), id, result))
            .collect();

        // A not-found in the middle still reports success-or-already-deleted
        // for all three entries.
        assert_eq!(
            lines,
            vec![
                "Deleted tool 1/3: 'biotools:comet'",
                "Tool 2/3: 'biotools:ghost' has already been deleted or does not exist.",
                "Deleted tool 3/3: 'biotools:maxquant'",
            ]
        );
    }

    #[test]
    fn failed_delete_still_yields_a_report_line() {
        let results: Vec<(&str, Result<DeleteOutcome>)> = vec![
            ("comet", Ok(DeleteOutcome::Deleted)),
            (
                "locked",
                Err(anyhow::anyhow!("Delete of 'locked' failed (403 Forbidden)")),
            ),
            ("maxquant", Ok(DeleteOutcome::AlreadyGone)),
        ];
        let lines: Vec<String> = results
            .iter()
            .enumerate()
            .map(|(idx, (id, result))| delete_report_line(idx, results.len(), id, result))
            .collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("ERROR:"));
        assert!(lines[1].contains("locked"));
        assert!(lines[2].contains("already been deleted"));
    }

    #[test]
    fn empty_collection_id_still_quotes() {
        let client = BiotoolsClient::new("https://bio.tools/api", 0);
        assert_eq!(
            client.listing_url(Some("")),
            "https://bio.tools/api/t/?collectionID=%22%22&format=json"
        );
    }
}
