//! Response model shared by the network and the cache.

use bytes::Bytes;
pub use http::StatusCode;

/// A response returned by the network or read back from a cache generation.
///
/// The body is reference counted, so cloning a response to write it into a
/// cache while returning the original is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    /// Create a new response.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Create a `200 OK` response.
    pub fn ok_with(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace all headers.
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Check if the response was successful (2xx status).
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Get a header value (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_ok() {
        assert!(Response::new(StatusCode::OK, "").ok());
        assert!(Response::new(StatusCode::NO_CONTENT, "").ok());
        assert!(!Response::new(StatusCode::NOT_FOUND, "").ok());
        assert!(!Response::new(StatusCode::INTERNAL_SERVER_ERROR, "").ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = Response::ok_with("body").with_header("content-type", "text/css");
        assert_eq!(resp.header("Content-Type"), Some("text/css"));
        assert_eq!(resp.content_type(), Some("text/css"));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn test_text() {
        let resp = Response::ok_with("<html></html>");
        assert_eq!(resp.text().unwrap(), "<html></html>");

        let binary = Response::ok_with(vec![0xff, 0xfe]);
        assert!(binary.text().is_err());
    }

    #[test]
    fn test_clone_shares_body() {
        let resp = Response::ok_with(vec![1u8; 64]);
        let copy = resp.clone();
        assert_eq!(resp, copy);
        assert_eq!(resp.body().as_ptr(), copy.body().as_ptr());
    }
}
