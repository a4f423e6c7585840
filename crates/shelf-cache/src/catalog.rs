//! The resources that must be available offline.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Path of the shell document, the universal offline fallback for navigations.
pub const SHELL_DOCUMENT: &str = "./index.html";

/// Path of the placeholder image served for images that cannot be loaded.
pub const PLACEHOLDER_IMAGE: &str = "./assets/images/placeholder.svg";

/// External font stylesheet.
pub const FONT_STYLESHEET: &str = "https://fonts.googleapis.com/css2?family=Vazirmatn:wght@400;500;600;700&family=Readex+Pro:wght@400;500;600&family=Cairo+Play:wght@400;500;600;700&display=swap";

/// Logical role of a catalog resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceRole {
    /// The app shell document.
    Shell,
    /// A stylesheet.
    Stylesheet,
    /// Application script.
    Script,
    /// Story data and the web manifest.
    Data,
    /// App icon.
    Icon,
    /// External font stylesheet.
    Font,
    /// Story cover or placeholder image.
    Image,
}

impl ResourceRole {
    /// Parse a role name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "shell" => Some(Self::Shell),
            "stylesheet" => Some(Self::Stylesheet),
            "script" => Some(Self::Script),
            "data" => Some(Self::Data),
            "icon" => Some(Self::Icon),
            "font" => Some(Self::Font),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shell => write!(f, "shell"),
            Self::Stylesheet => write!(f, "stylesheet"),
            Self::Script => write!(f, "script"),
            Self::Data => write!(f, "data"),
            Self::Icon => write!(f, "icon"),
            Self::Font => write!(f, "font"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// Resources of the story reader, in precache order.
const STORY_READER_RESOURCES: &[(&str, ResourceRole)] = &[
    ("./", ResourceRole::Shell),
    (SHELL_DOCUMENT, ResourceRole::Shell),
    ("./styles.css", ResourceRole::Stylesheet),
    ("./app.js", ResourceRole::Script),
    ("./data/stories.js", ResourceRole::Data),
    ("./manifest.webmanifest", ResourceRole::Data),
    ("./assets/images/s1.jpg", ResourceRole::Image),
    ("./assets/images/s2.jpg", ResourceRole::Image),
    ("./assets/images/s3.jpg", ResourceRole::Image),
    ("./assets/images/s4.jpg", ResourceRole::Image),
    ("./assets/images/s5.jpg", ResourceRole::Image),
    ("./assets/images/s6.jpg", ResourceRole::Image),
    ("./assets/images/s7.jpg", ResourceRole::Image),
    ("./assets/images/s8.jpg", ResourceRole::Image),
    ("./assets/images/s9.jpg", ResourceRole::Image),
    ("./assets/images/s10.jpg", ResourceRole::Image),
    ("./assets/images/s11.jpg", ResourceRole::Image),
    ("./assets/images/s12.jpg", ResourceRole::Image),
    ("./assets/images/s13.jpg", ResourceRole::Image),
    ("./assets/images/s14.jpg", ResourceRole::Image),
    ("./assets/images/s15.jpg", ResourceRole::Image),
    ("./assets/images/s16.jpg", ResourceRole::Image),
    ("./assets/images/s17.jpg", ResourceRole::Image),
    ("./assets/images/s18.jpg", ResourceRole::Image),
    ("./assets/images/s19.jpg", ResourceRole::Image),
    ("./assets/images/s20.jpg", ResourceRole::Image),
    (PLACEHOLDER_IMAGE, ResourceRole::Image),
    ("./assets/icons/icon-72.png", ResourceRole::Icon),
    ("./assets/icons/icon-96.png", ResourceRole::Icon),
    ("./assets/icons/icon-128.png", ResourceRole::Icon),
    ("./assets/icons/icon-144.png", ResourceRole::Icon),
    ("./assets/icons/icon-152.png", ResourceRole::Icon),
    ("./assets/icons/icon-192.png", ResourceRole::Icon),
    ("./assets/icons/icon-384.png", ResourceRole::Icon),
    ("./assets/icons/icon-512.png", ResourceRole::Icon),
    ("./assets/icons/maskable-icon-192.png", ResourceRole::Icon),
    ("./assets/icons/maskable-icon-512.png", ResourceRole::Icon),
    (FONT_STYLESHEET, ResourceRole::Font),
];

/// A single must-have resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    /// Path or URL as declared.
    pub path: String,
    /// Logical role.
    pub role: ResourceRole,
}

impl ResourceEntry {
    /// Create a resource entry.
    pub fn new(path: impl Into<String>, role: ResourceRole) -> Self {
        Self {
            path: path.into(),
            role,
        }
    }
}

/// The fixed, ordered set of resources precached for one deployed version.
///
/// Membership and role lookups use normalized-path equality, never substring
/// containment: `./assets/images/s1.jpg` does not match
/// `./assets/images/s10.jpg`.
#[derive(Debug, Clone)]
pub struct Catalog {
    scope: Url,
    entries: Vec<ResourceEntry>,
    index: HashMap<String, ResourceRole>,
}

impl Catalog {
    /// Create a catalog of entries under an app scope.
    ///
    /// Entries that normalize to an already declared resource are dropped.
    pub fn new(scope: Url, entries: Vec<ResourceEntry>) -> Self {
        let scope = directory_scope(scope);
        let mut index = HashMap::with_capacity(entries.len());
        let mut kept = Vec::with_capacity(entries.len());

        for entry in entries {
            let key = normalize_reference(&scope, &entry.path);
            if !index.contains_key(&key) {
                index.insert(key, entry.role);
                kept.push(entry);
            }
        }

        Self {
            scope,
            entries: kept,
            index,
        }
    }

    /// The story reader's catalog.
    pub fn story_reader(scope: Url) -> Self {
        let entries = STORY_READER_RESOURCES
            .iter()
            .map(|(path, role)| ResourceEntry::new(*path, *role))
            .collect();
        Self::new(scope, entries)
    }

    /// The scope catalog paths resolve against.
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// All entries, in declaration order.
    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    /// Entries with a given role.
    pub fn with_role(&self, role: ResourceRole) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.iter().filter(move |e| e.role == role)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether a reference (relative path or absolute URL) is a catalog resource.
    pub fn is_precached(&self, reference: &str) -> bool {
        self.index.contains_key(&normalize_reference(&self.scope, reference))
    }

    /// Check whether a URL is a catalog resource.
    pub fn is_precached_url(&self, url: &Url) -> bool {
        self.index.contains_key(&normalize_url(&self.scope, url))
    }

    /// Role of the resource a URL refers to.
    pub fn role_of(&self, url: &Url) -> Option<ResourceRole> {
        self.index.get(&normalize_url(&self.scope, url)).copied()
    }

    /// Resolve an entry path to an absolute URL.
    pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        self.scope.join(path)
    }
}

/// Normalize a URL to its catalog key.
///
/// URLs under `scope` become scope-relative paths with leading `./` and `/`
/// markers removed; the scope root is the empty path. Other URLs keep their
/// absolute form. Fragments are dropped; queries are kept.
pub fn normalize_url(scope: &Url, url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    match url.as_str().strip_prefix(scope.as_str()) {
        Some(rest) => strip_relative_markers(rest).to_string(),
        None => url.to_string(),
    }
}

/// Normalize a relative reference or absolute URL to its catalog key.
pub fn normalize_reference(scope: &Url, reference: &str) -> String {
    if let Ok(url) = Url::parse(reference) {
        return normalize_url(scope, &url);
    }

    let path = reference.split('#').next().unwrap_or_default();
    strip_relative_markers(path).to_string()
}

fn strip_relative_markers(mut path: &str) -> &str {
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            return path;
        }
    }
}

fn directory_scope(mut scope: Url) -> Url {
    if !scope.path().ends_with('/') {
        let path = format!("{}/", scope.path());
        scope.set_path(&path);
    }
    scope.set_query(None);
    scope.set_fragment(None);
    scope
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("https://stories.example/").unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::story_reader(scope())
    }

    #[test]
    fn test_story_reader_catalog_contents() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 38);
        assert_eq!(catalog.entries()[0].path, "./");
        assert_eq!(catalog.entries()[1].path, SHELL_DOCUMENT);
        assert_eq!(catalog.entries().last().unwrap().path, FONT_STYLESHEET);
        assert_eq!(catalog.with_role(ResourceRole::Icon).count(), 10);
        assert_eq!(catalog.with_role(ResourceRole::Image).count(), 21);
        assert_eq!(catalog.with_role(ResourceRole::Shell).count(), 2);
    }

    #[test]
    fn test_relative_markers_match_same_entry() {
        let catalog = catalog();
        assert!(catalog.is_precached("./index.html"));
        assert!(catalog.is_precached("/index.html"));
        assert!(catalog.is_precached("index.html"));
        assert!(catalog.is_precached("https://stories.example/index.html"));
        assert!(catalog.is_precached("https://stories.example/index.html#intro"));
    }

    #[test]
    fn test_root_matches_shell() {
        let catalog = catalog();
        assert!(catalog.is_precached("/"));
        assert!(catalog.is_precached("https://stories.example/"));
        assert_eq!(
            catalog.role_of(&scope()),
            Some(ResourceRole::Shell)
        );
    }

    #[test]
    fn test_numeric_suffix_does_not_cross_match() {
        let catalog = Catalog::new(
            scope(),
            vec![ResourceEntry::new("./assets/images/s1.jpg", ResourceRole::Image)],
        );
        assert!(catalog.is_precached("/assets/images/s1.jpg"));
        assert!(!catalog.is_precached("/assets/images/s10.jpg"));
        assert!(!catalog.is_precached("/assets/images/s1.jpg.bak"));
        assert!(!catalog.is_precached("/s1.jpg"));
    }

    #[test]
    fn test_external_font_matches_exactly() {
        let catalog = catalog();
        assert!(catalog.is_precached(FONT_STYLESHEET));
        assert!(!catalog.is_precached("https://fonts.googleapis.com/css2?family=Vazirmatn"));
        let url = Url::parse(FONT_STYLESHEET).unwrap();
        assert_eq!(catalog.role_of(&url), Some(ResourceRole::Font));
    }

    #[test]
    fn test_unknown_resource() {
        let catalog = catalog();
        assert!(!catalog.is_precached("/assets/images/s21.jpg"));
        assert!(!catalog.is_precached("https://cdn.example/photo.png"));
        let url = scope().join("missing.css").unwrap();
        assert!(!catalog.is_precached_url(&url));
        assert_eq!(catalog.role_of(&url), None);
    }

    #[test]
    fn test_nested_scope() {
        let scope = Url::parse("https://host.example/reader").unwrap();
        let catalog = Catalog::story_reader(scope);
        assert_eq!(catalog.scope().as_str(), "https://host.example/reader/");

        let url = Url::parse("https://host.example/reader/styles.css").unwrap();
        assert!(catalog.is_precached_url(&url));

        let outside = Url::parse("https://host.example/styles.css").unwrap();
        assert!(!catalog.is_precached_url(&outside));
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let catalog = Catalog::new(
            scope(),
            vec![
                ResourceEntry::new("./app.js", ResourceRole::Script),
                ResourceEntry::new("/app.js", ResourceRole::Script),
            ],
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_role_of_uses_first_declaration() {
        let catalog = Catalog::new(
            scope(),
            vec![
                ResourceEntry::new("./data/stories.js", ResourceRole::Data),
                ResourceEntry::new("/data/stories.js", ResourceRole::Script),
            ],
        );
        let url = scope().join("data/stories.js#v2").unwrap();
        assert_eq!(catalog.role_of(&url), Some(ResourceRole::Data));
        assert_eq!(catalog.role_of(&scope().join("data/other.js").unwrap()), None);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(ResourceRole::parse("Icon"), Some(ResourceRole::Icon));
        assert_eq!(ResourceRole::parse("video"), None);
        assert_eq!(ResourceRole::Stylesheet.to_string(), "stylesheet");
    }
}
