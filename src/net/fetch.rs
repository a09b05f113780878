use std::time::Duration;

use url::Url;

use crate::error::{DataError, Result};

/// Result of fetching a URL
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub body: Vec<u8>,
    pub url: String,
    pub status: u16,
    pub content_type: String,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Shared blocking client. `None` keeps reqwest's default timeout.
pub fn client(timeout: Option<Duration>) -> Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::Client::builder()
        .user_agent(concat!("sampler-atlas/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(10));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

pub fn parse_url(url_str: &str) -> Result<Url> {
    Url::parse(url_str).map_err(|e| DataError::InvalidUrl {
        url: url_str.to_string(),
        reason: e.to_string(),
    })
}

/// Fetch a URL (blocking). Non-2xx statuses are returned, not raised.
pub fn fetch_url(client: &reqwest::blocking::Client, url: &Url) -> Result<FetchResult> {
    let response = client
        .get(url.as_str())
        .header("Accept", "application/json,image/*;q=0.9,*/*;q=0.8")
        .send()?;

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();
    let final_url = response.url().to_string();
    let body = response.bytes()?.to_vec();

    Ok(FetchResult {
        body,
        url: final_url,
        status,
        content_type,
    })
}

/// Fetch and parse a JSON document; non-2xx is an error.
pub fn fetch_json(client: &reqwest::blocking::Client, url: &Url) -> Result<serde_json::Value> {
    let result = fetch_url(client, url)?;
    if !result.is_success() {
        return Err(DataError::Status {
            url: result.url,
            status: result.status,
        });
    }
    result.json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_reports_input() {
        match parse_url("not a url") {
            Err(DataError::InvalidUrl { url, .. }) => assert_eq!(url, "not a url"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(parse_url("https://example.org/data/tree.json").is_ok());
    }

    #[test]
    fn test_result_helpers() {
        let r = FetchResult {
            body: br#"{"a": 1}"#.to_vec(),
            url: "https://example.org".into(),
            status: 200,
            content_type: "application/json".into(),
        };
        assert!(r.is_success());
        assert_eq!(r.json().unwrap()["a"], 1);
        let bad = FetchResult { status: 404, ..r };
        assert!(!bad.is_success());
    }
}
