// ABOUTME: Fetcher: retrieves a site's HTML over HTTP and decodes it into a single-line document.
// ABOUTME: Handles URL validation, status and size limits, and charset detection.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::ScrapeError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub accept_error_status: bool,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body and join its lines without separators.
    pub fn document(&self) -> String {
        join_lines(&decode_body(&self.body, self.content_type.as_deref()))
    }
}

/// Concatenate every line of `text`, dropping `\n`, `\r\n` and lone `\r` terminators.
fn join_lines(text: &str) -> String {
    text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        if let Some(charset) = part.trim().strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

/// Check that `site` is an absolute http(s) URL.
pub fn validate_site(site: &str) -> Result<url::Url, ScrapeError> {
    if site.is_empty() {
        return Err(ScrapeError::invalid_url(
            site,
            "Fetch",
            Some(anyhow::anyhow!("empty URL")),
        ));
    }

    let parsed = url::Url::parse(site).map_err(|e| {
        ScrapeError::invalid_url(site, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(ScrapeError::invalid_url(
            site,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        )),
    }
}

/// Fetch the resource at `site`.
pub async fn fetch(
    client: &reqwest::Client,
    site: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ScrapeError> {
    let url = validate_site(site)?;

    let mut request = client.get(url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request.send().await.map_err(|e| {
        ScrapeError::network(site, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
    })?;

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ScrapeError::network(
                site,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status();
    if !status.is_success() && !opts.accept_error_status {
        return Err(ScrapeError::network(
            site,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        ScrapeError::network(
            site,
            "Fetch",
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ScrapeError::network(
            site,
            "Fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    Ok(FetchResult {
        status: status.as_u16(),
        url: site.to_string(),
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_joins_lines() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/page");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html>\r\n<body>\n<h1>Hi</h1>\n</body>\n</html>\n");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/page"), &FetchOptions::default()).await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.status, 200);
        assert_eq!(result.document(), "<html><body><h1>Hi</h1></body></html>");
    }

    #[tokio::test]
    async fn test_fetch_error_status_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/missing"), &FetchOptions::default()).await;
        mock.assert();

        let err = result.expect_err("should fail on 404");
        assert!(err.is_network());
        assert!(err.reason().contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_error_status_accepted() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("<p>gone</p>");
        });

        let client = create_test_client();
        let opts = FetchOptions {
            accept_error_status: true,
            ..Default::default()
        };

        let result = fetch(&client, &server.url("/missing"), &opts).await;
        mock.assert();

        let result = result.expect("fetch should succeed with accept_error_status");
        assert_eq!(result.status, 404);
        assert_eq!(result.document(), "<p>gone</p>");
    }

    #[tokio::test]
    async fn test_fetch_sends_custom_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/h").header("x-token", "abc");
            then.status(200).body("ok");
        });

        let client = create_test_client();
        let mut opts = FetchOptions::default();
        opts.headers.insert("x-token".to_string(), "abc".to_string());

        let result = fetch(&client, &server.url("/h"), &opts).await;
        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_makes_no_request() {
        let client = create_test_client();
        let opts = FetchOptions::default();

        let err = fetch(&client, "not a url", &opts).await.unwrap_err();
        assert!(err.is_invalid_url());

        let err = fetch(&client, "", &opts).await.unwrap_err();
        assert!(err.is_invalid_url());

        let err = fetch(&client, "ftp://example.com/file", &opts)
            .await
            .unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_network_error() {
        // Bind then drop a listener so the port is closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = create_test_client();
        let url = format!("http://127.0.0.1:{}/", port);
        let err = fetch(&client, &url, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_decode_iso_8859_1_with_chardetng() {
        let iso_bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_body(iso_bytes, None), "café");
    }

    #[test]
    fn test_decode_uses_declared_charset() {
        let iso_bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(
            decode_body(iso_bytes, Some("text/html; charset=ISO-8859-1")),
            "café"
        );
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn test_join_lines() {
        assert_eq!(join_lines("a\nb\r\nc"), "abc");
        assert_eq!(join_lines("old\rmac\rendings\r"), "oldmacendings");
        assert_eq!(join_lines("single"), "single");
        assert_eq!(join_lines(""), "");
    }
}
