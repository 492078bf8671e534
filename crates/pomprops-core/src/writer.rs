//! Materializes `pom.properties` and `pom.xml` into an output folder.
//!
//! This is the same pair of files the maven archiver puts into every jar it packages, under
//! `META-INF/maven/${groupId}/${artifactId}`.

use crate::coordinates::{Coordinates, ProjectMetadata};
use crate::error::{GeneratedFile, WriteError, WriteResult};
use crate::properties::{Properties, StoreOptions};
use crate::resources::{LocalFileSystem, ResourceTree};
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// The comment written at the top of `pom.properties`
pub const GENERATED_BY_M2E: &str = "Generated by m2e";

/// The folder, relative to the output root, that all coordinate folders are placed in
pub const MAVEN_METADATA_FOLDER: &str = "META-INF/maven";

pub const GROUP_ID_KEY: &str = "groupId";
pub const ARTIFACT_ID_KEY: &str = "artifactId";
pub const VERSION_KEY: &str = "version";
pub const PROJECT_NAME_KEY: &str = "m2e.projectName";
pub const PROJECT_LOCATION_KEY: &str = "m2e.projectLocation";

/// Gets the folder that generated files are written to.
///
/// The group and artifact ids are used as single path segments without any escaping.
///
/// # Example
/// ```
/// # use std::path::Path;
/// # use pomprops_core::Coordinates;
/// # use pomprops_core::writer::destination_folder;
/// let coords = Coordinates::new("com.example", "widget", "1.0").unwrap();
/// assert_eq!(
///     destination_folder("/build/out", &coords),
///     Path::new("/build/out/META-INF/maven/com.example/widget")
/// );
/// ```
pub fn destination_folder(output_root: impl AsRef<Path>, coordinates: &Coordinates) -> PathBuf {
    output_root
        .as_ref()
        .join(MAVEN_METADATA_FOLDER)
        .join(coordinates.group_id())
        .join(coordinates.artifact_id())
}

/// The properties that get written into `pom.properties`, in the order they're written.
pub fn generated_properties(coordinates: &Coordinates, project: &ProjectMetadata) -> Properties {
    let mut properties = Properties::new();
    properties.insert(GROUP_ID_KEY, coordinates.group_id());
    properties.insert(ARTIFACT_ID_KEY, coordinates.artifact_id());
    properties.insert(VERSION_KEY, coordinates.version());
    properties.insert(PROJECT_NAME_KEY, project.name());
    properties.insert(PROJECT_LOCATION_KEY, project.location_string());
    properties
}

/// Options for how `pom.properties` is written
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// The leading comment
    pub comment: String,
    /// Whether a date comment is written after the leading comment. Output is not repeatable
    /// when this is set.
    pub timestamp: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            comment: GENERATED_BY_M2E.to_string(),
            timestamp: false,
        }
    }
}

/// Whether a file was newly created or an existing one was replaced
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Upsert {
    Created,
    Replaced,
}

/// A single generated file that was written
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WrittenFile {
    pub file: GeneratedFile,
    pub path: PathBuf,
    pub upsert: Upsert,
    pub bytes: u64,
}

/// The result of a successful materialization
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MaterializedArtifacts {
    pub folder: PathBuf,
    pub pom_properties: WrittenFile,
    pub pom_xml: WrittenFile,
}

/// Writes `pom.properties` and `pom.xml` through some resource tree.
#[derive(Debug, Default)]
pub struct PomArtifactWriter<R: ResourceTree = LocalFileSystem> {
    resources: R,
    options: WriterOptions,
}

impl<R: ResourceTree> PomArtifactWriter<R> {
    pub fn new(resources: R) -> Self {
        Self::with_options(resources, WriterOptions::default())
    }

    pub fn with_options(resources: R, options: WriterOptions) -> Self {
        Self { resources, options }
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Makes sure the destination folder exists, then creates or replaces `pom.properties` and
    /// `pom.xml` within it.
    ///
    /// The descriptor is copied verbatim into `pom.xml`, and is dropped when this returns no
    /// matter the outcome. Nothing else in the destination folder is touched.
    ///
    /// # Error
    /// - [`WriteError::FolderCreation`] if the destination folder couldn't be created. Nothing is
    ///   written.
    /// - [`WriteError::Serialization`] if the properties couldn't be serialized.
    /// - [`WriteError::FileWrite`] if either file couldn't be written. If `pom.properties` fails,
    ///   `pom.xml` is not attempted.
    /// - [`WriteError::StreamRead`] if the descriptor couldn't be read.
    pub fn materialize<D: Read>(
        &self,
        coordinates: &Coordinates,
        output_root: impl AsRef<Path>,
        project: &ProjectMetadata,
        descriptor: D,
    ) -> WriteResult<MaterializedArtifacts> {
        let folder = destination_folder(output_root, coordinates);
        debug!("ensuring {:?} exists", folder);
        self.resources
            .create_folder_recursive(&folder)
            .map_err(|source| WriteError::FolderCreation {
                path: folder.clone(),
                source,
            })?;

        let buffer = self.serialize(&generated_properties(coordinates, project))?;
        let pom_properties = self.upsert(
            GeneratedFile::PomProperties,
            &folder,
            &mut buffer.as_slice(),
        )?;

        let mut descriptor = TrackedRead::new(descriptor);
        let pom_xml = self
            .upsert(GeneratedFile::PomXml, &folder, &mut descriptor)
            .map_err(|error| match error {
                WriteError::FileWrite { source, .. } if descriptor.failed() => {
                    WriteError::StreamRead { path: None, source }
                }
                other => other,
            })?;

        Ok(MaterializedArtifacts {
            folder,
            pom_properties,
            pom_xml,
        })
    }

    fn serialize(&self, properties: &Properties) -> WriteResult<Vec<u8>> {
        let options = StoreOptions {
            comment: Some(self.options.comment.clone()),
            timestamp: self.options.timestamp.then(OffsetDateTime::now_utc),
        };
        let mut buffer = vec![];
        properties
            .store_with(&mut buffer, &options)
            .map_err(|source| WriteError::Serialization { source })?;
        Ok(buffer)
    }

    fn upsert(
        &self,
        file: GeneratedFile,
        folder: &Path,
        contents: &mut dyn Read,
    ) -> WriteResult<WrittenFile> {
        let path = folder.join(file.file_name());
        let upsert = if self.resources.exists(&path) {
            Upsert::Replaced
        } else {
            Upsert::Created
        };
        let bytes = self
            .resources
            .create_or_replace_file(&path, contents)
            .map_err(|source| WriteError::FileWrite {
                file,
                path: path.clone(),
                source,
            })?;
        info!("{} {} ({} bytes)", upsert, path.display(), bytes);
        Ok(WrittenFile {
            file,
            path,
            upsert,
            bytes,
        })
    }
}

/// Remembers whether an error came from the wrapped reader, so read failures can be told apart
/// from write failures after a copy.
struct TrackedRead<R> {
    inner: R,
    failed: bool,
}

impl<R: Read> TrackedRead<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    fn failed(&self) -> bool {
        self.failed
    }
}

impl<R: Read> Read for TrackedRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.inner.read(buf);
        if let Err(e) = &result {
            if e.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::InMemoryResourceTree;

    fn widget() -> (Coordinates, ProjectMetadata) {
        (
            Coordinates::new("com.example", "widget", "1.0").unwrap(),
            ProjectMetadata::new("Widget", "/home/dev/widget"),
        )
    }

    #[test]
    fn properties_in_order() {
        let (coords, project) = widget();
        let properties = generated_properties(&coords, &project);
        assert_eq!(
            properties.iter().collect::<Vec<_>>(),
            [
                ("groupId", "com.example"),
                ("artifactId", "widget"),
                ("version", "1.0"),
                ("m2e.projectName", "Widget"),
                ("m2e.projectLocation", "/home/dev/widget"),
            ]
        );
    }

    #[test]
    fn destination_uses_segments_verbatim() {
        let coords = Coordinates::new("org.group", "artifact.with.dots", "1").unwrap();
        assert_eq!(
            destination_folder("out", &coords),
            Path::new("out/META-INF/maven/org.group/artifact.with.dots")
        );
    }

    #[test]
    fn reports_created_then_replaced() {
        let (coords, project) = widget();
        let writer = PomArtifactWriter::new(InMemoryResourceTree::new());

        let first = writer
            .materialize(&coords, "/build/out", &project, &b"<project/>"[..])
            .unwrap();
        assert_eq!(first.pom_properties.upsert, Upsert::Created);
        assert_eq!(first.pom_xml.upsert, Upsert::Created);
        assert_eq!(first.pom_xml.bytes, 10);

        let second = writer
            .materialize(&coords, "/build/out", &project, &b"<project/>"[..])
            .unwrap();
        assert_eq!(second.pom_properties.upsert, Upsert::Replaced);
        assert_eq!(second.pom_xml.upsert, Upsert::Replaced);
    }

    #[test]
    fn custom_comment() {
        let (coords, project) = widget();
        let writer = PomArtifactWriter::with_options(
            InMemoryResourceTree::new(),
            WriterOptions {
                comment: "Generated by pomprops".to_string(),
                timestamp: false,
            },
        );
        let written = writer
            .materialize(&coords, "/out", &project, io::empty())
            .unwrap();
        let contents = writer.resources().read(&written.pom_properties.path).unwrap();
        assert!(String::from_utf8(contents)
            .unwrap()
            .starts_with("#Generated by pomprops\ngroupId=com.example\n"));
    }

    #[test]
    fn timestamp_adds_date_line() {
        let (coords, project) = widget();
        let writer = PomArtifactWriter::with_options(
            InMemoryResourceTree::new(),
            WriterOptions {
                timestamp: true,
                ..Default::default()
            },
        );
        let written = writer
            .materialize(&coords, "/out", &project, io::empty())
            .unwrap();
        let contents =
            String::from_utf8(writer.resources().read(&written.pom_properties.path).unwrap())
                .unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "#Generated by m2e");
        assert!(lines[1].starts_with('#') && lines[1].contains("UTC"));
        assert_eq!(lines[2], "groupId=com.example");
    }
}
