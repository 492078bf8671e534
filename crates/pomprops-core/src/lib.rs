//! The core of pomprops.
//!
//! Generates the `pom.properties` and `pom.xml` pair that the maven archiver embeds under
//! `META-INF/maven/${groupId}/${artifactId}` into an output folder, so output produced outside
//! of a command line maven build looks like what maven would have packaged.

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde;

pub mod config;
pub mod coordinates;
pub mod error;
pub mod logging;
pub mod participant;
pub mod properties;
pub mod resources;
pub mod writer;

pub use coordinates::{Coordinates, ProjectMetadata};
pub use error::{GeneratedFile, WriteError, WriteResult};
pub use participant::{on_build, BuildKind, BuildRequest};
pub use properties::Properties;
pub use resources::{InMemoryResourceTree, LocalFileSystem, ResourceTree};
pub use writer::{MaterializedArtifacts, PomArtifactWriter, WriterOptions};

pub mod prelude {
    pub use super::coordinates::*;
    pub use super::error::*;
    pub use super::participant::*;
    pub use super::resources::ResourceTree;
    pub use super::writer::*;
}
