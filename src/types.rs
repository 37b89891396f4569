use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Value of a `<form method>` attribute; anything but POST means GET.
    pub fn from_form_attribute(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("post") {
            Method::Post
        } else {
            Method::Get
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// One completed request/response cycle, redirects included.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub url: Url,
    pub final_url: Url,
    pub referrer: Option<Url>,
    pub method: Method,
    pub status: u16,
    /// Lowercased header names; the last occurrence of a repeated header wins.
    pub headers: HashMap<String, String>,
    pub body: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub redirects: u32,
}

impl Exchange {
    /// Stand-in for an exchange that never produced a response.
    pub fn failed(
        url: Url,
        method: Method,
        referrer: Option<Url>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            final_url: url.clone(),
            url,
            referrer,
            method,
            status: 0,
            headers: HashMap::new(),
            body: String::new(),
            started_at,
            elapsed,
            redirects: 0,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
