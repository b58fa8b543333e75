//! Request path classification.
//!
//! # Rules (first match wins)
//! 1. Contains `/templates/` → `TemplateAsset`
//! 2. Ends in an allowlisted file extension → `StaticAsset`
//! 3. Starts with `/api/static/` → `ApiStatic`
//! 4. Anything else → `Other`
//!
//! # Design Decisions
//! - Case-sensitive matching, no normalization
//! - Callers pass the path component only; query strings are not stripped
//! - Pure function of the path string

use std::fmt;

/// File extensions served as long-lived static assets.
pub const STATIC_EXTENSIONS: &[&str] = &[
    "css", "js", "json", "xml", "txt", "pdf", "docx", "xlsx", "pptx", "zip", "rar", "gz", "mp4", "mp3",
    "wav", "ogg",
];

const API_STATIC_PREFIX: &str = "/api/static/";
const TEMPLATES_SEGMENT: &str = "/templates/";

/// Caching category of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathClass {
    StaticAsset,
    ApiStatic,
    TemplateAsset,
    Other,
}

impl PathClass {
    /// Classify a request path.
    pub fn classify(path: &str) -> Self {
        if path.contains(TEMPLATES_SEGMENT) {
            PathClass::TemplateAsset
        } else if has_static_extension(path) {
            PathClass::StaticAsset
        } else if path.starts_with(API_STATIC_PREFIX) {
            PathClass::ApiStatic
        } else {
            PathClass::Other
        }
    }

    /// Whether assets of this class never change under the same URL.
    pub fn is_immutable(self) -> bool {
        !matches!(self, PathClass::Other)
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            PathClass::StaticAsset => "static_asset",
            PathClass::ApiStatic => "api_static",
            PathClass::TemplateAsset => "template_asset",
            PathClass::Other => "other",
        }
    }
}

impl fmt::Display for PathClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn has_static_extension(path: &str) -> bool {
    STATIC_EXTENSIONS.iter().any(|ext| {
        path.strip_suffix(ext)
            .map(|rest| rest.ends_with('.'))
            .unwrap_or(false)
    })
}
