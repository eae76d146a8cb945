// client.rs
use crate::progress::ProgressSink;
use crate::source::source_error::excerpt;
use crate::source::{ListingQuery, Page, RawListing, SourceError};
use rand::Rng;
use reqwest::blocking::{Client, Response};
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

const USER_AGENT: &str = concat!("deal_scout/", env!("CARGO_PKG_VERSION"));
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Client-credentials pair exchanged for a bearer token before every run.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub token_url: String,
    pub api_base: String,
    pub credentials: Credentials,
    pub max_pages: usize,
    pub timeout: Duration,
    /// Attempts per request when the connection itself fails.
    /// HTTP error statuses are never retried.
    pub transport_attempts: u32,
    pub backoff: Duration,
}

impl SourceSettings {
    pub fn new(token_url: String, api_base: String, credentials: Credentials) -> Self {
        Self {
            token_url,
            api_base,
            credentials,
            max_pages: 500,
            timeout: Duration::from_secs(60),
            transport_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

pub struct ListingSource {
    client: Client,
    settings: SourceSettings,
}

impl ListingSource {
    pub fn new(settings: SourceSettings) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, settings })
    }

    /// Exchanges the client credentials for a bearer token.
    /// Any non-success status is fatal for the run.
    pub fn request_token(&self) -> Result<BearerToken, SourceError> {
        let creds = &self.settings.credentials;
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("scope", creds.scope.as_str()),
        ];

        let resp = self.send_with_retry("token", || {
            self.client
                .post(&self.settings.token_url)
                .header(ACCEPT, "application/json")
                .form(&form)
                .send()
        })?;

        let status = resp.status();
        let text = resp.text()?;

        if !status.is_success() {
            return Err(SourceError::Auth {
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        let json: Value =
            serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()))?;

        json.get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(BearerToken::new)
            .ok_or(SourceError::MissingAccessToken)
    }

    /// Fetches every page of `query` and returns the records in arrival order.
    pub fn fetch_all(
        &self,
        token: &BearerToken,
        query: &ListingQuery,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<RawListing>, SourceError> {
        let mut listings = Vec::new();

        self.fetch_all_paginated(token, query, |page| {
            listings.extend(page.value);
            progress.report(listings.len(), page.count.map(|c| c as usize));
            Ok(())
        })?;

        Ok(listings)
    }

    /// Walks the continuation links until the catalog stops sending one.
    pub fn fetch_all_paginated<F>(
        &self,
        token: &BearerToken,
        query: &ListingQuery,
        mut on_page: F,
    ) -> Result<usize, SourceError>
    where
        F: FnMut(Page) -> Result<(), SourceError>,
    {
        let mut next = Some(query.to_url(&self.settings.api_base)?.to_string());
        let mut seen = HashSet::new();
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages >= self.settings.max_pages {
                return Err(SourceError::PageLimit(self.settings.max_pages));
            }
            if !seen.insert(url.clone()) {
                return Err(SourceError::PaginationLoop(url));
            }

            let start = Instant::now();
            let page = self.fetch_page(token, &url)?;
            pages += 1;

            tracing::debug!(
                page = pages,
                records = page.value.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "page fetched"
            );

            next = page.next_link.clone().filter(|link| !link.trim().is_empty());
            on_page(page)?;
        }

        Ok(pages)
    }

    fn fetch_page(&self, token: &BearerToken, url: &str) -> Result<Page, SourceError> {
        let resp = self.send_with_retry("page", || {
            self.client
                .get(url)
                .bearer_auth(token.secret())
                .header(ACCEPT, "application/json")
                .send()
        })?;

        let status = resp.status();
        let text = resp.text()?;

        if !status.is_success() {
            return Err(SourceError::Fetch {
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| SourceError::Decode(e.to_string()))
    }

    fn send_with_retry<F>(&self, what: &str, send: F) -> Result<Response, SourceError>
    where
        F: Fn() -> reqwest::Result<Response>,
    {
        let attempts = self.settings.transport_attempts.max(1);
        let mut attempt = 1;

        loop {
            match send() {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < attempts => {
                    tracing::warn!(
                        request = what,
                        attempt,
                        error = %e,
                        "request failed, retrying"
                    );

                    let base = retry_delay(self.settings.backoff, attempt);
                    let jitter_ms = base.as_millis() as u64 / 2;
                    let jitter = rand::thread_rng().gen_range(0..=jitter_ms);
                    std::thread::sleep(base + Duration::from_millis(jitter));
                    attempt += 1;
                }
                Err(e) => return Err(SourceError::Transport(e)),
            }
        }
    }
}

/// Doubles `base` per failed attempt, never above [`MAX_BACKOFF`].
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF)
}
