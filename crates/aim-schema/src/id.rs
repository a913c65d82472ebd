//! Artifact identifiers: the `owner/project` key of every tracked entry.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing an [`ArtifactId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier is empty or only whitespace.
    #[error("artifact id is empty")]
    Empty,

    /// The identifier is not of the form `owner/project`.
    #[error("artifact id '{0}' must look like 'owner/project'")]
    Shape(String),

    /// One of the two segments contains characters a repository name cannot.
    #[error("artifact id '{id}' has an invalid segment '{segment}'")]
    InvalidSegment {
        /// The full identifier as given.
        id: String,
        /// The offending segment.
        segment: String,
    },
}

/// Stable identifier of a tracked artifact: the `owner/project` path of its
/// release source.
///
/// Ordering and hashing follow the underlying string, so the registry can be
/// keyed by `ArtifactId` and still be queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Parse and validate an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdError`] if the input is empty, does not contain exactly one
    /// `/`, or either segment holds anything other than ASCII alphanumerics,
    /// `-`, `_` or `.` (a lone `.` or `..` is also rejected).
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IdError::Empty);
        }

        let mut segments = raw.split('/');
        let (Some(owner), Some(project), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(IdError::Shape(raw.to_string()));
        };

        for segment in [owner, project] {
            if !is_valid_segment(segment) {
                return Err(IdError::InvalidSegment {
                    id: raw.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self(raw.to_string()))
    }

    /// The identifier as given, e.g. `"acme/tool"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The owner segment.
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or("", |(owner, _)| owner)
    }

    /// The project segment.
    pub fn project(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, project)| project)
    }

    /// Filesystem-safe form used for default names: `acme/tool` -> `acme_tool`.
    pub fn sanitized(&self) -> String {
        self.0.replace('/', "_")
    }

    /// Default file name of the installed artifact: `acme_tool.AppImage`.
    pub fn default_file_name(&self) -> String {
        format!("{}.{}", self.sanitized(), crate::ARTIFACT_EXTENSION)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.0
    }
}

impl Borrow<str> for ArtifactId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ArtifactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = ArtifactId::parse("acme/tool").unwrap();
        assert_eq!(id.owner(), "acme");
        assert_eq!(id.project(), "tool");
        assert_eq!(id.to_string(), "acme/tool");

        let dotted = ArtifactId::parse("  probonopd/go-appimage.v2 ").unwrap();
        assert_eq!(dotted.as_str(), "probonopd/go-appimage.v2");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(ArtifactId::parse(""), Err(IdError::Empty));
        assert!(matches!(ArtifactId::parse("tool"), Err(IdError::Shape(_))));
        assert!(matches!(ArtifactId::parse("a/b/c"), Err(IdError::Shape(_))));
        assert!(matches!(
            ArtifactId::parse("acme/"),
            Err(IdError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ArtifactId::parse("../tool"),
            Err(IdError::InvalidSegment { .. })
        ));
        assert!(matches!(
            ArtifactId::parse("acme/my tool"),
            Err(IdError::InvalidSegment { .. })
        ));
    }

    #[test]
    fn test_default_names() {
        let id = ArtifactId::parse("acme/tool").unwrap();
        assert_eq!(id.sanitized(), "acme_tool");
        assert_eq!(id.default_file_name(), "acme_tool.AppImage");
    }

    #[test]
    fn test_serde_validates() {
        let id: ArtifactId = serde_json::from_str("\"acme/tool\"").unwrap();
        assert_eq!(id.as_str(), "acme/tool");
        assert!(serde_json::from_str::<ArtifactId>("\"not-an-id\"").is_err());
    }
}
