//! Errors produced while materializing the generated files

use std::io;
use std::path::PathBuf;

/// The files that get generated into the destination folder
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum_macros::Display, strum_macros::AsRefStr)]
pub enum GeneratedFile {
    #[strum(serialize = "pom.properties")]
    PomProperties,
    #[strum(serialize = "pom.xml")]
    PomXml,
}

impl GeneratedFile {
    /// The file name of the generated file
    pub fn file_name(&self) -> &str {
        self.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Couldn't create folder {path:?}")]
    FolderCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Couldn't serialize pom.properties")]
    Serialization {
        #[source]
        source: io::Error,
    },
    #[error("Couldn't write {file} to {path:?}")]
    FileWrite {
        file: GeneratedFile,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Couldn't read project descriptor{}", describe_path(.path))]
    StreamRead {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    /// The generated file this error happened for, if any
    pub fn file(&self) -> Option<GeneratedFile> {
        match self {
            WriteError::FileWrite { file, .. } => Some(*file),
            WriteError::Serialization { .. } => Some(GeneratedFile::PomProperties),
            WriteError::StreamRead { .. } => Some(GeneratedFile::PomXml),
            WriteError::FolderCreation { .. } => None,
        }
    }
}

fn describe_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" {:?}", p))
        .unwrap_or_default()
}

pub type WriteResult<T> = Result<T, WriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_file_names() {
        assert_eq!(GeneratedFile::PomProperties.file_name(), "pom.properties");
        assert_eq!(GeneratedFile::PomXml.to_string(), "pom.xml");
    }

    #[test]
    fn errors_name_their_file() {
        let error = WriteError::FileWrite {
            file: GeneratedFile::PomXml,
            path: PathBuf::from("out/pom.xml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(error.file(), Some(GeneratedFile::PomXml));
        assert_eq!(error.to_string(), "Couldn't write pom.xml to \"out/pom.xml\"");

        let error = WriteError::StreamRead {
            path: None,
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        };
        assert_eq!(error.to_string(), "Couldn't read project descriptor");
    }
}
