//! Fallback content for requests the network cannot answer.

use shelf_cache::{PLACEHOLDER_IMAGE, SHELL_DOCUMENT};
use shelf_core::{Request, RequestDestination};

/// What to serve when both cache and network miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The cached shell document.
    ShellDocument,
    /// The cached placeholder image.
    PlaceholderImage,
    /// Nothing; the network failure propagates.
    None,
}

impl Fallback {
    /// Fallback for a catalog resource: only navigations get the shell.
    pub fn for_precached(request: &Request) -> Self {
        if request.is_navigation() {
            Self::ShellDocument
        } else {
            Self::None
        }
    }

    /// Fallback for a runtime request: shell for navigations, placeholder for
    /// images, nothing otherwise.
    pub fn for_runtime(request: &Request) -> Self {
        if request.is_navigation() {
            Self::ShellDocument
        } else if request.destination() == RequestDestination::Image {
            Self::PlaceholderImage
        } else {
            Self::None
        }
    }

    /// Catalog path of the fallback resource.
    pub fn path(&self) -> Option<&'static str> {
        match self {
            Self::ShellDocument => Some(SHELL_DOCUMENT),
            Self::PlaceholderImage => Some(PLACEHOLDER_IMAGE),
            Self::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn url(path: &str) -> Url {
        Url::parse("https://stories.example/").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_precached_fallback() {
        assert_eq!(
            Fallback::for_precached(&Request::navigate(url("index.html"))),
            Fallback::ShellDocument
        );
        assert_eq!(
            Fallback::for_precached(&Request::image(url("assets/images/s1.jpg"))),
            Fallback::None
        );
    }

    #[test]
    fn test_runtime_fallback() {
        assert_eq!(
            Fallback::for_runtime(&Request::navigate(url("about"))),
            Fallback::ShellDocument
        );
        assert_eq!(
            Fallback::for_runtime(&Request::image(url("photo.png"))),
            Fallback::PlaceholderImage
        );
        assert_eq!(
            Fallback::for_runtime(&Request::get(url("api/data.json"))),
            Fallback::None
        );
    }

    #[test]
    fn test_paths() {
        assert_eq!(Fallback::ShellDocument.path(), Some("./index.html"));
        assert_eq!(
            Fallback::PlaceholderImage.path(),
            Some("./assets/images/placeholder.svg")
        );
        assert_eq!(Fallback::None.path(), None);
    }
}
