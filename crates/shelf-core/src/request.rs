//! Intercepted request model.

use std::fmt;

pub use http::Method;
use url::Url;

/// Errors raised while building a request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("invalid request url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// What the requested resource will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestDestination {
    /// A top-level document (page load).
    Document,
    /// An `<img>` or CSS image.
    Image,
    /// A stylesheet.
    Style,
    /// A script.
    Script,
    /// A web font.
    Font,
    /// The web app manifest.
    Manifest,
    /// Anything else (`fetch()` calls, XHR).
    #[default]
    Empty,
}

impl RequestDestination {
    /// Parse a destination name as used on the command line.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "document" => Some(Self::Document),
            "image" => Some(Self::Image),
            "style" => Some(Self::Style),
            "script" => Some(Self::Script),
            "font" => Some(Self::Font),
            "manifest" => Some(Self::Manifest),
            "" | "empty" => Some(Self::Empty),
            _ => None,
        }
    }
}

impl fmt::Display for RequestDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Image => write!(f, "image"),
            Self::Style => write!(f, "style"),
            Self::Script => write!(f, "script"),
            Self::Font => write!(f, "font"),
            Self::Manifest => write!(f, "manifest"),
            Self::Empty => write!(f, ""),
        }
    }
}

/// Request mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level navigation.
    Navigate,
    /// Opaque cross-origin.
    NoCors,
    /// CORS request.
    #[default]
    Cors,
}

/// A request as seen by the worker's fetch handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    destination: RequestDestination,
    mode: RequestMode,
}

impl Request {
    /// Create a GET request for a URL.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            destination: RequestDestination::Empty,
            mode: RequestMode::Cors,
        }
    }

    /// Create a page navigation request.
    pub fn navigate(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            destination: RequestDestination::Document,
            mode: RequestMode::Navigate,
        }
    }

    /// Create an image request.
    pub fn image(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            destination: RequestDestination::Image,
            mode: RequestMode::NoCors,
        }
    }

    /// Parse `reference` relative to `base` and create a GET request.
    pub fn resolve(base: &Url, reference: &str) -> Result<Self, RequestError> {
        let url = base.join(reference).map_err(|source| RequestError::InvalidUrl {
            url: reference.to_string(),
            source,
        })?;
        Ok(Self::get(url))
    }

    /// Set the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the destination.
    pub fn with_destination(mut self, destination: RequestDestination) -> Self {
        self.destination = destination;
        self
    }

    /// Set the mode.
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn destination(&self) -> RequestDestination {
        self.destination
    }

    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Whether this request loads a top-level document.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate || self.destination == RequestDestination::Document
    }

    /// Cache identity: method plus URL without fragment.
    pub fn cache_key(&self) -> String {
        let mut url = self.url.clone();
        url.set_fragment(None);
        format!("{} {}", self.method, url)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://stories.example/app/").unwrap()
    }

    #[test]
    fn test_resolve_relative_reference() {
        let req = Request::resolve(&base(), "./index.html").unwrap();
        assert_eq!(req.url().as_str(), "https://stories.example/app/index.html");
        assert_eq!(req.method(), &Method::GET);
    }

    #[test]
    fn test_resolve_invalid_url() {
        let err = Request::resolve(&base(), "http://[::1").unwrap_err();
        assert!(err.to_string().contains("http://[::1"));
    }

    #[test]
    fn test_navigation_detection() {
        let url = base().join("index.html").unwrap();
        assert!(Request::navigate(url.clone()).is_navigation());
        assert!(Request::get(url.clone())
            .with_destination(RequestDestination::Document)
            .is_navigation());
        assert!(!Request::image(url).is_navigation());
    }

    #[test]
    fn test_cache_key_drops_fragment() {
        let a = Request::resolve(&base(), "styles.css#top").unwrap();
        let b = Request::resolve(&base(), "styles.css").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(b.cache_key(), "GET https://stories.example/app/styles.css");
    }

    #[test]
    fn test_destination_parse() {
        assert_eq!(RequestDestination::parse("Image"), Some(RequestDestination::Image));
        assert_eq!(RequestDestination::parse(""), Some(RequestDestination::Empty));
        assert_eq!(RequestDestination::parse("audio"), None);
    }
}
