//! Client for the OpenAPI Company search endpoint
//!
//! The client holds a base endpoint (production or sandbox), installs the
//! bearer credential as a default header, and reuses one HTTP session for
//! every paginated call of an invocation. A shared validation step maps HTTP
//! status codes and the API's logical `success` flag to typed errors.

use crate::error::{Error, Result};
use crate::pagination::RecordCursor;
use crate::types::SearchParams;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Production host of the Company API
pub const PRODUCTION_BASE_URL: &str = "https://company.openapi.com";

/// Sandbox host (test credentials, canned data)
pub const SANDBOX_BASE_URL: &str = "https://test.company.openapi.com";

/// Path of the Italian company search endpoint
const SEARCH_PATH: &str = "/IT-search";

/// Per-request network timeout
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Thin wrapper around the OpenAPI Company API for Italian businesses
pub struct CompanyClient {
    base_url: Url,
    http: reqwest::Client,
}

impl CompanyClient {
    /// Create a client against the production or sandbox host.
    ///
    /// # Errors
    /// Returns an error if the token is empty or the HTTP client cannot be
    /// created.
    pub fn new(token: &str, sandbox: bool) -> Result<Self> {
        let base_url = if sandbox {
            SANDBOX_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        };
        Self::with_base_url(token, base_url)
    }

    /// Create a client against an arbitrary base URL.
    ///
    /// Used by tests and self-hosted API gateways; [`CompanyClient::new`] is
    /// the normal entry point.
    ///
    /// # Errors
    /// Returns an error if the token is empty, the base URL does not parse,
    /// or the HTTP client cannot be created.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::InvalidInput(
                "a valid OpenAPI bearer token must be provided".to_string(),
            ));
        }

        let base_url = Url::parse(base_url)?;

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            Error::InvalidInput("bearer token contains invalid header characters".to_string())
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("ateco-extractor/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { base_url, http })
    }

    /// Fetch one page of search results and return the decoded body.
    ///
    /// # Errors
    /// Returns the mapped platform error for non-success responses.
    pub async fn search_page(&self, params: &SearchParams, skip: u64) -> Result<Value> {
        self.get(params.query(skip)).await
    }

    /// Begin a paginated search, returning a cursor over the matching
    /// records.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the page size is zero.
    pub fn search(&self, params: SearchParams, max_records: Option<u64>) -> Result<RecordCursor<'_>> {
        RecordCursor::new(self, params, max_records)
    }

    /// Return the number of records matching the filters, without consuming
    /// credits.
    ///
    /// Issues a single request with `dryRun=1` and page size 1 and reads the
    /// `metadata.total` field of the response.
    ///
    /// # Errors
    /// Returns [`Error::UnexpectedResponse`] if the total field is absent or
    /// non-numeric.
    pub async fn dry_run_count(
        &self,
        province: &str,
        ateco_code: &str,
        activity_status: Option<&str>,
    ) -> Result<u64> {
        let mut params = SearchParams::new(province, ateco_code)?;
        params.data_enrichment.clear();
        params.limit = 1;
        params.activity_status = activity_status.map(str::to_string);
        params.dry_run = true;

        let payload = self.get(params.query(0)).await?;
        let total = match payload.pointer("/metadata/total") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) if s.chars().all(|c| c.is_ascii_digit()) => s.parse().ok(),
            _ => None,
        };

        total.ok_or_else(|| {
            Error::UnexpectedResponse(
                "dry run response did not include 'metadata.total'".to_string(),
            )
        })
    }

    /// One GET against the search endpoint with shared response validation.
    async fn get(&self, query: Vec<(&'static str, String)>) -> Result<Value> {
        let url = self.base_url.join(SEARCH_PATH)?;
        debug!(%url, "requesting search endpoint");

        let response = self.http.get(url).query(&query).send().await?;

        let status = response.status();
        match status.as_u16() {
            401 => {
                return Err(Error::Authentication("check your bearer token".to_string()));
            }
            402 => {
                return Err(Error::PaymentRequired(
                    "insufficient credits on the OpenAPI account".to_string(),
                ));
            }
            422 => {
                return Err(Error::Validation(
                    "the server rejected the request parameters".to_string(),
                ));
            }
            _ => {}
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                status.to_string()
            } else {
                body
            };
            return Err(Error::Api(format!("OpenAPI request failed: {detail}")));
        }

        let payload: Value = response.json().await?;
        if !payload
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(Error::Api(format!("OpenAPI reported an error: {message}")));
        }

        Ok(payload)
    }
}
