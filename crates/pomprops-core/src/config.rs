//! Configuration, read from a toml file and merged with command line values.
//!
//! ```toml
//! group-id = "com.example"
//! artifact-id = "widget"
//! version = "1.0"
//! output-root = "target/classes"
//! pom = "pom.xml"
//! ```

use crate::coordinates::{Coordinates, InvalidCoordinates, ProjectMetadata};
use crate::participant::BuildRequest;
use crate::writer::WriterOptions;
use merge::Merge;
use std::io;
use std::path::{Path, PathBuf};

/// All values are optional so that partial configurations can be merged together. The first
/// configuration to set a value wins.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Merge)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PomPropsConfig {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    /// Defaults to the artifact id
    pub project_name: Option<String>,
    /// Defaults to the folder containing the pom
    pub project_location: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub pom: Option<PathBuf>,
    pub comment: Option<String>,
    pub timestamp: Option<bool>,
    pub atomic: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Couldn't read config file {0:?}")]
    Io(PathBuf, #[source] io::Error),
    #[error("Invalid config file {0:?}")]
    Toml(PathBuf, #[source] toml::de::Error),
    #[error("No {0} was given")]
    Missing(&'static str),
    #[error(transparent)]
    InvalidCoordinates(#[from] InvalidCoordinates),
}

impl PomPropsConfig {
    /// Loads a configuration file. Relative paths within it are resolved against the folder the
    /// file is in.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config = Self::parse(&text).map_err(|e| ConfigError::Toml(path.to_path_buf(), e))?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        debug!("loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Parses a configuration without resolving any paths
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn rebase(&mut self, base: &Path) {
        for path in [
            &mut self.project_location,
            &mut self.output_root,
            &mut self.pom,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Turns this into a complete configuration.
    ///
    /// # Error
    /// Errors if the coordinates, output root or pom are missing, or if the coordinates are
    /// invalid.
    pub fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let coordinates = Coordinates::new(
            self.group_id.ok_or(ConfigError::Missing("group id"))?,
            self.artifact_id.ok_or(ConfigError::Missing("artifact id"))?,
            self.version.ok_or(ConfigError::Missing("version"))?,
        )?;
        let output_root = self.output_root.ok_or(ConfigError::Missing("output root"))?;
        let pom = self.pom.ok_or(ConfigError::Missing("pom"))?;

        let name = self
            .project_name
            .unwrap_or_else(|| coordinates.artifact_id().to_string());
        let location = match self.project_location {
            Some(location) => absolute(location),
            None => absolute(
                pom.parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."))
                    .to_path_buf(),
            ),
        };

        let mut writer = WriterOptions::default();
        if let Some(comment) = self.comment {
            writer.comment = comment;
        }
        writer.timestamp = self.timestamp.unwrap_or(false);

        Ok(ResolvedConfig {
            request: BuildRequest {
                coordinates,
                project: ProjectMetadata::new(name, location),
                output_root,
                descriptor: pom,
            },
            writer,
            atomic: self.atomic.unwrap_or(false),
        })
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::fs::canonicalize(&path)
        .or_else(|_| std::env::current_dir().map(|cwd| cwd.join(&path)))
        .unwrap_or(path)
}

/// A complete configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub request: BuildRequest,
    pub writer: WriterOptions,
    pub atomic: bool,
}
