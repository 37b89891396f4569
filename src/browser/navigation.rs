use crate::core::config::BrowserConfig;
use crate::errors::{BrowserError, Result};
use crate::types::{Exchange, Method};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, LOCATION, REFERER};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Build the session client: persistent cookie jar, certificate validation,
/// no automatic redirects (they are followed by [`fetch`]).
pub fn build_client(config: &BrowserConfig) -> Result<Client> {
    let client = Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_millis(config.timeout_ms))
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .build()?;
    Ok(client)
}

/// One outgoing request as the browser wants to make it.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub method: Method,
    pub url: Url,
    pub fields: Vec<(String, String)>,
    pub referrer: Option<Url>,
}

/// Perform `request`, following up to `max_redirects` redirects.
///
/// 301/302/303 continue as a body-less GET; 307/308 replay method and body.
/// `sent` is bumped once per HTTP request, redirect hops included.
pub async fn fetch(
    client: &Client,
    config: &BrowserConfig,
    request: PendingRequest,
    max_redirects: u32,
    sent: &mut u64,
) -> Result<Exchange> {
    let started_at = chrono::Utc::now();
    let clock = Instant::now();

    let PendingRequest {
        mut method,
        url,
        mut fields,
        referrer,
    } = request;
    let mut current = url.clone();
    let mut redirects = 0u32;

    loop {
        let mut builder = client
            .request(method.into(), current.clone())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, config.accept_language.as_str());
        if let Some(referrer) = &referrer {
            builder = builder.header(REFERER, referrer.as_str());
        }
        if method == Method::Post {
            builder = builder.form(&fields);
        }

        *sent += 1;
        let response = builder.send().await?;
        let status = response.status();
        debug!(%status, url = %current, ?method, "response received");

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let (true, Some(location)) = (status.is_redirection(), location) {
            if redirects >= max_redirects {
                return Err(BrowserError::TooManyRedirects {
                    url: url.to_string(),
                    max: max_redirects,
                });
            }
            redirects += 1;
            current = current.join(location.trim())?;
            if !matches!(
                status,
                StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT
            ) {
                method = Method::Get;
                fields.clear();
            }
            continue;
        }

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_ascii_lowercase(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        let final_url = response.url().clone();
        let body = response.text().await?;

        return Ok(Exchange {
            url,
            final_url,
            referrer,
            method,
            status: status.as_u16(),
            headers,
            body,
            started_at,
            elapsed: clock.elapsed(),
            redirects,
        });
    }
}
