//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers the design API hands out. Each type
//! rejects empty values so that an empty string can never be mistaken for a
//! real file or node.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Design file key newtype wrapper
///
/// The key is the opaque identifier segment of a file URL, e.g. the
/// `aBcD1234` in `https://www.figma.com/design/aBcD1234/Landing-Page`.
///
/// # Examples
///
/// ```
/// use design_export::domain::ids::FileKey;
/// use std::str::FromStr;
///
/// let key = FileKey::from_str("aBcD1234").unwrap();
/// assert_eq!(key.as_str(), "aBcD1234");
///
/// let from_url = FileKey::from_url_or_key("https://www.figma.com/design/aBcD1234/Landing").unwrap();
/// assert_eq!(from_url, key);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileKey(String);

impl FileKey {
    /// Creates a new FileKey from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(FileKey)` if the key is non-empty and contains only
    /// characters that are safe inside a URL path segment.
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err("File key cannot be empty".to_string());
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!(
                "Invalid file key '{trimmed}': only ASCII letters, digits, '-' and '_' are allowed"
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Accepts either a bare key or a share URL of the form
    /// `https://<host>/{file|design|proto}/<key>/...`
    pub fn from_url_or_key(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if !input.starts_with("http://") && !input.starts_with("https://") {
            return Self::new(input);
        }

        let parsed = url::Url::parse(input).map_err(|e| format!("Invalid file URL: {e}"))?;
        let mut segments = parsed
            .path_segments()
            .ok_or_else(|| format!("File URL has no path: {input}"))?;

        while let Some(segment) = segments.next() {
            if matches!(segment, "file" | "design" | "proto") {
                if let Some(key) = segments.next() {
                    return Self::new(key);
                }
            }
        }

        Err(format!("Could not find a file key in URL: {input}"))
    }

    /// Returns the file key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Node identifier newtype wrapper
///
/// Unique within one design file and stable across requests to that file.
/// Typically of the form `12:345`, but the format is treated as opaque.
///
/// Deserialization goes through [`NodeId::new`], so a document containing a
/// node with an empty id is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new NodeId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Node ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the node ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NodeId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
