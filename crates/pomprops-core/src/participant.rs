//! The hook a build orchestrator calls once per build pass.

use crate::coordinates::{Coordinates, ProjectMetadata};
use crate::error::{WriteError, WriteResult};
use crate::resources::ResourceTree;
use crate::writer::{MaterializedArtifacts, PomArtifactWriter};
use std::fs::File;
use std::path::PathBuf;

/// What kind of build pass triggered the hook
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Default,
    clap::ValueEnum,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuildKind {
    #[default]
    Full,
    Incremental,
    Auto,
    Clean,
}

impl BuildKind {
    /// Whether a pass of this kind regenerates the files
    pub fn materializes(&self) -> bool {
        !matches!(self, BuildKind::Clean)
    }
}

/// Everything needed to materialize the files of one project
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub coordinates: Coordinates,
    pub project: ProjectMetadata,
    pub output_root: PathBuf,
    /// The project descriptor that's copied into `pom.xml`
    pub descriptor: PathBuf,
}

/// Runs for a build pass of the given kind.
///
/// Every pass other than [`BuildKind::Clean`] regenerates both files, whether or not anything
/// changed. A clean pass does nothing and returns `None`, generated files are never deleted.
pub fn on_build<R: ResourceTree>(
    writer: &PomArtifactWriter<R>,
    kind: BuildKind,
    request: &BuildRequest,
) -> WriteResult<Option<MaterializedArtifacts>> {
    if !kind.materializes() {
        debug!("{} build of {} has nothing to do", kind, request.coordinates);
        return Ok(None);
    }

    debug!("{} build of {}", kind, request.coordinates);
    let descriptor = File::open(&request.descriptor).map_err(|source| WriteError::StreamRead {
        path: Some(request.descriptor.clone()),
        source,
    })?;

    writer
        .materialize(
            &request.coordinates,
            &request.output_root,
            &request.project,
            descriptor,
        )
        .map_err(|error| match error {
            WriteError::StreamRead { path: None, source } => WriteError::StreamRead {
                path: Some(request.descriptor.clone()),
                source,
            },
            other => other,
        })
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::InMemoryResourceTree;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn request(temp_dir: &TempDir) -> BuildRequest {
        let descriptor = temp_dir.path().join("pom.xml");
        std::fs::write(&descriptor, "<project/>").unwrap();
        BuildRequest {
            coordinates: Coordinates::new("com.example", "widget", "1.0").unwrap(),
            project: ProjectMetadata::new("Widget", temp_dir.path()),
            output_root: PathBuf::from("/out"),
            descriptor,
        }
    }

    #[test]
    fn parse_build_kind() {
        assert_eq!(BuildKind::from_str("incremental").unwrap(), BuildKind::Incremental);
        assert_eq!(BuildKind::Auto.to_string(), "auto");
        assert!(BuildKind::from_str("partial").is_err());
    }

    #[test]
    fn every_non_clean_pass_materializes() {
        let temp_dir = TempDir::new().unwrap();
        let request = request(&temp_dir);
        let writer = PomArtifactWriter::new(InMemoryResourceTree::new());

        for kind in [BuildKind::Full, BuildKind::Incremental, BuildKind::Auto] {
            let written = on_build(&writer, kind, &request).unwrap();
            assert!(written.is_some(), "{kind} build should materialize");
        }
        assert_eq!(
            writer
                .resources()
                .read("/out/META-INF/maven/com.example/widget/pom.xml")
                .unwrap(),
            b"<project/>"
        );
    }

    #[test]
    fn clean_pass_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let request = request(&temp_dir);
        let writer = PomArtifactWriter::new(InMemoryResourceTree::new());

        assert!(on_build(&writer, BuildKind::Clean, &request)
            .unwrap()
            .is_none());
        assert!(writer.resources().files().is_empty());
    }

    #[test]
    fn missing_descriptor_is_a_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut request = request(&temp_dir);
        request.descriptor = temp_dir.path().join("missing.xml");
        let writer = PomArtifactWriter::new(InMemoryResourceTree::new());

        match on_build(&writer, BuildKind::Full, &request) {
            Err(WriteError::StreamRead { path, .. }) => {
                assert_eq!(path, Some(request.descriptor.clone()))
            }
            other => panic!("expected a stream read error, got {:?}", other),
        }
        assert!(writer.resources().files().is_empty());
    }
}
