use crate::core::config::BrowserConfig;
use crate::dom::{Clickable, Document};
use crate::errors::{BrowserError, Result};
use crate::types::{Exchange, Method};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::navigation::{build_client, fetch, PendingRequest};

/// A cookie-bearing HTTP session that behaves like a user clicking through
/// server-rendered pages.
///
/// Holds exactly one current page. Every navigation replaces it; the
/// [`Document`] values handed back to callers are independent snapshots.
pub struct Browser {
    client: Client,
    config: BrowserConfig,
    exchange: Option<Exchange>,
    document: Option<Document>,
    requests_sent: u64,
}

impl Browser {
    pub fn new(config: BrowserConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            config,
            exchange: None,
            document: None,
            requests_sent: 0,
        })
    }

    /// GET `url`, following redirects up to the configured limit.
    ///
    /// `url` may be relative to the current page.
    pub async fn navigate(&mut self, url: &str) -> Result<Document> {
        let max = self.config.max_redirects;
        self.navigate_with_limit(url, max).await
    }

    pub async fn navigate_with_limit(
        &mut self,
        url: &str,
        max_redirects: u32,
    ) -> Result<Document> {
        let url = self.resolve(url)?;
        self.request(Method::Get, url, Vec::new(), max_redirects).await
    }

    /// POST `fields` URL-encoded to `url`. Later calls go back to GET.
    pub async fn post(&mut self, url: &str, fields: &[(&str, &str)]) -> Result<Document> {
        let url = self.resolve(url)?;
        let fields = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let max = self.config.max_redirects;
        self.request(Method::Post, url, fields, max).await
    }

    /// Set the value the named control of the current page will submit with.
    /// No network I/O.
    pub fn enter(&mut self, field_name: &str, value: &str) -> Result<()> {
        let document = self
            .document
            .as_mut()
            .ok_or_else(|| BrowserError::ElementNotFound(field_name.to_string()))?;
        document.set_value(field_name, value).map_err(|e| {
            debug!(field = field_name, "enter: no such control");
            e
        })
    }

    /// Click the submit control, link or linked text labelled `text`.
    ///
    /// Returns `Ok(None)` without any I/O when nothing on the page matches,
    /// so scripts can probe for optional steps.
    pub async fn click(&mut self, text: &str) -> Result<Option<Document>> {
        let Some(document) = self.document.as_ref() else {
            debug!(text, "click: no current page");
            return Ok(None);
        };

        let (method, url, fields) = match document.clickable(text) {
            Some(Clickable::Submit(submit)) => match document.submission(&submit) {
                Some(submission) => submission.into_request(),
                None => {
                    debug!(text, "click: submit control outside of any form");
                    return Ok(None);
                }
            },
            Some(Clickable::Link(link)) => {
                let href = link.attribute("href").unwrap_or_default();
                match Url::parse(&href) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => {
                        (Method::Get, url, Vec::new())
                    }
                    _ => {
                        debug!(text, href = %href, "click: link is not navigable");
                        return Ok(None);
                    }
                }
            }
            None => {
                debug!(text, "click: nothing to click");
                return Ok(None);
            }
        };

        let max = self.config.max_redirects;
        self.request(method, url, fields, max).await.map(Some)
    }

    async fn request(
        &mut self,
        method: Method,
        url: Url,
        fields: Vec<(String, String)>,
        max_redirects: u32,
    ) -> Result<Document> {
        let referrer = self.exchange.as_ref().map(|e| e.final_url.clone());
        let pending = PendingRequest {
            method,
            url: url.clone(),
            fields,
            referrer: referrer.clone(),
        };

        let started_at = chrono::Utc::now();
        let clock = std::time::Instant::now();

        match fetch(
            &self.client,
            &self.config,
            pending,
            max_redirects,
            &mut self.requests_sent,
        )
        .await
        {
            Ok(exchange) => {
                debug!(
                    url = %exchange.final_url,
                    status = exchange.status,
                    redirects = exchange.redirects,
                    elapsed_ms = exchange.elapsed.as_millis() as u64,
                    "page loaded"
                );
                let document = Document::parse(&exchange.body, exchange.final_url.clone())
                    .unwrap_or_else(|_| Document::empty(exchange.final_url.clone()));
                self.exchange = Some(exchange);
                self.document = Some(document.clone());
                Ok(document)
            }
            Err(BrowserError::Http(err)) => {
                // The request went out; what is left is an unusable page
                warn!(%url, error = %err, "request failed");
                let document = Document::empty(url.clone());
                self.exchange = Some(Exchange::failed(
                    url,
                    method,
                    referrer,
                    started_at,
                    clock.elapsed(),
                ));
                self.document = Some(document);
                Err(BrowserError::Http(err))
            }
            Err(err) => {
                warn!(%url, error = %err, "navigation abandoned, keeping current page");
                Err(err)
            }
        }
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        match &self.document {
            Some(document) => Ok(document.base_url().join(url.trim())?),
            None => Ok(Url::parse(url.trim())?),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Current page, if any navigation produced one.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn exchange(&self) -> Option<&Exchange> {
        self.exchange.as_ref()
    }

    pub fn body(&self) -> &str {
        self.exchange.as_ref().map(|e| e.body.as_str()).unwrap_or("")
    }

    pub fn url(&self) -> Option<&Url> {
        self.exchange.as_ref().map(|e| &e.final_url)
    }

    pub fn status(&self) -> Option<u16> {
        self.exchange.as_ref().map(|e| e.status)
    }

    pub fn headers(&self) -> Option<&HashMap<String, String>> {
        self.exchange.as_ref().map(|e| &e.headers)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.exchange.as_ref().map(|e| e.elapsed)
    }

    /// HTTP requests sent over the lifetime of this browser, each redirect
    /// hop counted separately.
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }
}
