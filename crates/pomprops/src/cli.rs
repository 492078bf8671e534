use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use merge::Merge;

use pomprops_core::config::{ConfigError, PomPropsConfig};
use pomprops_core::logging::LoggingOpts;
use pomprops_core::{BuildKind, Coordinates};

/// Writes the `pom.properties` and `pom.xml` that maven's archiver embeds into packaged
/// artifacts, into an output folder at `META-INF/maven/<groupId>/<artifactId>`.
#[derive(Debug, Parser, Clone)]
#[clap(name = "pomprops")]
#[clap(version, author)]
#[clap(before_help = format!("{} v{}", clap::crate_name!(), clap::crate_version!()))]
#[clap(term_width = 80)]
pub struct PomPropsArgs {
    /// Log level to run in.
    #[clap(flatten)]
    pub logging: LoggingOpts,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Create or replace pom.properties and pom.xml in the output folder
    Materialize(MaterializeArgs),
    /// Print the entries of a pom.properties file
    Inspect(InspectArgs),
}

#[derive(Debug, Args, Clone)]
pub struct MaterializeArgs {
    /// Read settings from a toml file. Values given on the command line take precedence.
    #[clap(short = 'F', long)]
    pub config: Option<PathBuf>,

    /// The project coordinates, as groupId:artifactId:version
    #[clap(short = 'c', long)]
    pub coordinates: Option<Coordinates>,

    /// The project name. Defaults to the artifact id.
    #[clap(long)]
    pub project_name: Option<String>,

    /// The project location. Defaults to the folder containing the pom.
    #[clap(long)]
    pub project_location: Option<PathBuf>,

    /// The root of the build output
    #[clap(short = 'o', long)]
    pub output_root: Option<PathBuf>,

    /// The project descriptor that's copied into pom.xml
    #[clap(short = 'p', long)]
    pub pom: Option<PathBuf>,

    /// The comment at the top of pom.properties
    #[clap(long)]
    pub comment: Option<String>,

    /// Add a date comment to pom.properties
    #[clap(long, overrides_with = "no_timestamp")]
    pub timestamp: bool,

    /// Leave out the date comment, even if the config file asks for it
    #[clap(long, overrides_with = "timestamp")]
    pub no_timestamp: bool,

    /// Write files through a temporary file and rename them into place
    #[clap(long, overrides_with = "no_atomic")]
    pub atomic: bool,

    /// Write files in place, even if the config file asks for atomic writes
    #[clap(long, overrides_with = "atomic")]
    pub no_atomic: bool,

    /// The kind of build pass this is run for
    #[clap(long, value_enum, default_value_t = BuildKind::Full)]
    pub build_kind: BuildKind,
}

#[derive(Debug, Args, Clone)]
pub struct InspectArgs {
    /// The pom.properties file to read
    #[clap(value_name = "FILE")]
    pub file: PathBuf,
}

impl PomPropsArgs {
    /// Simulate creating the args from the command line
    pub fn try_command_line<S: AsRef<str>>(cmd: S) -> Result<Self, clap::Error> {
        Self::try_parse_from(
            std::iter::once("pomprops").chain(cmd.as_ref().split_whitespace()),
        )
    }

    /// Create the args from the surrounding environment.
    pub fn from_env() -> Self {
        match Self::try_parse_from(std::env::args_os()) {
            Ok(args) => args,
            Err(e) => {
                e.exit();
            }
        }
    }
}

impl MaterializeArgs {
    /// The configuration given on the command line, merged with the configuration file if one
    /// was given.
    pub fn config(&self) -> Result<PomPropsConfig, ConfigError> {
        let mut config = PomPropsConfig {
            group_id: self.coordinates.as_ref().map(|c| c.group_id().to_string()),
            artifact_id: self.coordinates.as_ref().map(|c| c.artifact_id().to_string()),
            version: self.coordinates.as_ref().map(|c| c.version().to_string()),
            project_name: self.project_name.clone(),
            project_location: self.project_location.clone(),
            output_root: self.output_root.clone(),
            pom: self.pom.clone(),
            comment: self.comment.clone(),
            timestamp: switch(self.timestamp, self.no_timestamp),
            atomic: switch(self.atomic, self.no_atomic),
        };
        if let Some(file) = &self.config {
            config.merge(PomPropsConfig::load(file)?);
        }
        Ok(config)
    }
}

/// A `--flag`/`--no-flag` pair, where neither being given leaves the setting to the config file
fn switch(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_materialize() {
        let args = PomPropsArgs::try_command_line(
            "materialize -c com.example:widget:1.0 -o target/classes -p pom.xml --build-kind incremental --debug",
        )
        .unwrap();
        let materialize = match args.command {
            Command::Materialize(materialize) => materialize,
            other => panic!("expected materialize command, got {:?}", other),
        };
        assert_eq!(
            materialize.coordinates,
            Some(Coordinates::new("com.example", "widget", "1.0").unwrap())
        );
        assert_eq!(materialize.build_kind, BuildKind::Incremental);
        assert_eq!(args.logging.log_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn bad_coordinates_rejected() {
        assert!(PomPropsArgs::try_command_line("materialize -c com.example:widget").is_err());
    }

    #[test]
    fn command_line_becomes_config() {
        let args = PomPropsArgs::try_command_line("materialize -c g:a:1 --atomic").unwrap();
        let materialize = match args.command {
            Command::Materialize(materialize) => materialize,
            other => panic!("expected materialize command, got {:?}", other),
        };
        let config = materialize.config().unwrap();
        assert_eq!(config.group_id.as_deref(), Some("g"));
        assert_eq!(config.version.as_deref(), Some("1"));
        assert_eq!(config.atomic, Some(true));
        assert_eq!(config.timestamp, None);
    }

    #[test]
    fn last_switch_wins() {
        let args =
            PomPropsArgs::try_command_line("materialize --atomic --no-atomic --no-timestamp")
                .unwrap();
        let materialize = match args.command {
            Command::Materialize(materialize) => materialize,
            other => panic!("expected materialize command, got {:?}", other),
        };
        let config = materialize.config().unwrap();
        assert_eq!(config.atomic, Some(false));
        assert_eq!(config.timestamp, Some(false));
    }
}
