//! Maven coordinates and the project identity that gets embedded next to them.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The separator between parts of the short coordinate form
pub const COORDINATE_SEPARATOR: char = ':';

/// The `(groupId, artifactId, version)` triple of a maven project.
///
/// Only emptiness is checked. The group and artifact ids are used verbatim as path segments,
/// so callers are responsible for giving filesystem safe values.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Coordinates {
    group_id: String,
    artifact_id: String,
    version: String,
}

impl Coordinates {
    /// Create new coordinates
    ///
    /// # Error
    /// Errors if any of the parts are empty.
    ///
    /// # Example
    /// ```
    /// # use pomprops_core::Coordinates;
    /// let coords = Coordinates::new("com.example", "widget", "1.0").unwrap();
    /// assert_eq!(coords.artifact_id(), "widget");
    /// assert!(Coordinates::new("", "widget", "1.0").is_err());
    /// ```
    pub fn new(
        group_id: impl AsRef<str>,
        artifact_id: impl AsRef<str>,
        version: impl AsRef<str>,
    ) -> Result<Self, InvalidCoordinates> {
        let group_id = non_empty("groupId", group_id.as_ref())?;
        let artifact_id = non_empty("artifactId", artifact_id.as_ref())?;
        let version = non_empty("version", version.as_ref())?;
        Ok(Self {
            group_id,
            artifact_id,
            version,
        })
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

fn non_empty(part: &'static str, value: &str) -> Result<String, InvalidCoordinates> {
    if value.is_empty() {
        Err(InvalidCoordinates::EmptyPart(part))
    } else {
        Ok(value.to_string())
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{COORDINATE_SEPARATOR}{}{COORDINATE_SEPARATOR}{}",
            self.group_id, self.artifact_id, self.version
        )
    }
}

impl FromStr for Coordinates {
    type Err = InvalidCoordinates;

    /// Parses the `groupId:artifactId:version` form.
    ///
    /// # Example
    /// ```
    /// # use pomprops_core::Coordinates;
    /// let coords: Coordinates = "com.example:widget:1.0".parse().unwrap();
    /// assert_eq!(coords.group_id(), "com.example");
    /// assert!("com.example:widget".parse::<Coordinates>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(COORDINATE_SEPARATOR).collect();
        match parts.as_slice() {
            [group, artifact, version] => Coordinates::new(group, artifact, version),
            _ => Err(InvalidCoordinates::Malformed(s.to_string())),
        }
    }
}

/// Coordinates could not be created
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum InvalidCoordinates {
    #[error("{0} can not be empty")]
    EmptyPart(&'static str),
    #[error("Invalid coordinates {0:?} (expected groupId:artifactId:version)")]
    Malformed(String),
}

/// The identity of the project that owns the output folder.
///
/// These end up in `pom.properties` as `m2e.projectName` and `m2e.projectLocation`, which are
/// not part of what maven writes but are kept for tools that read them back.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProjectMetadata {
    name: String,
    location: PathBuf,
}

impl ProjectMetadata {
    pub fn new(name: impl AsRef<str>, location: impl AsRef<Path>) -> Self {
        Self {
            name: name.as_ref().to_string(),
            location: location.as_ref().to_path_buf(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// The location as native path text
    pub fn location_string(&self) -> String {
        self.location.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_parse() {
        let coords = Coordinates::new("org.apache.maven", "maven-archiver", "3.6.0").unwrap();
        let as_string = coords.to_string();
        assert_eq!(as_string, "org.apache.maven:maven-archiver:3.6.0");
        assert_eq!(as_string.parse::<Coordinates>().unwrap(), coords);
    }

    #[test]
    fn empty_parts_rejected() {
        assert_eq!(
            Coordinates::new("g", "", "1"),
            Err(InvalidCoordinates::EmptyPart("artifactId"))
        );
        assert_eq!(
            "g:a:".parse::<Coordinates>(),
            Err(InvalidCoordinates::EmptyPart("version"))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            InvalidCoordinates::EmptyPart("groupId").to_string(),
            "groupId can not be empty"
        );
        assert_eq!(
            "g:a".parse::<Coordinates>().unwrap_err().to_string(),
            "Invalid coordinates \"g:a\" (expected groupId:artifactId:version)"
        );
    }

    #[test]
    fn too_many_parts_rejected() {
        assert!(matches!(
            "g:a:jar:1.0".parse::<Coordinates>(),
            Err(InvalidCoordinates::Malformed(_))
        ));
    }

    #[test]
    fn no_format_validation() {
        let coords = Coordinates::new("weird group", "a=b", "1.0-SNAPSHOT").unwrap();
        assert_eq!(coords.group_id(), "weird group");
        assert_eq!(coords.artifact_id(), "a=b");
    }
}
