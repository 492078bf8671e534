#[macro_use]
extern crate log;

use std::fs::File;

use anyhow::{Context, Result};

use pomprops_core::properties::Properties;
use pomprops_core::writer::{MaterializedArtifacts, PomArtifactWriter};
use pomprops_core::{on_build, LocalFileSystem};

use crate::cli::{Command, InspectArgs, MaterializeArgs};

pub mod cli;
pub mod status;

pub use cli::PomPropsArgs;

pub fn execute() -> std::result::Result<(), ()> {
    let args = PomPropsArgs::from_env();
    if let Err(e) = args.logging.init_root_logger() {
        eprintln!("couldn't initialize logging: {}", e);
        return Err(());
    }

    match with_args(args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{:#}", e);
            Err(())
        }
    }
}

pub fn with_args(args: PomPropsArgs) -> Result<()> {
    match &args.command {
        Command::Materialize(materialize_args) => materialize(materialize_args).map(|_| ()),
        Command::Inspect(inspect_args) => {
            let properties = inspect(inspect_args)?;
            for (key, value) in properties.iter() {
                println!("{} = {}", key, value);
            }
            Ok(())
        }
    }
}

/// Materializes the generated files for the configuration given by the args.
///
/// Returns `None` if the build kind doesn't materialize anything.
pub fn materialize(args: &MaterializeArgs) -> Result<Option<MaterializedArtifacts>> {
    let resolved = args.config()?.resolve()?;
    let resources = if resolved.atomic {
        LocalFileSystem::atomic()
    } else {
        LocalFileSystem::new()
    };
    let writer = PomArtifactWriter::with_options(resources, resolved.writer);

    let materialized = on_build(&writer, args.build_kind, &resolved.request)?;
    if let Some(materialized) = &materialized {
        info!(
            "materialized {} into {}",
            resolved.request.coordinates,
            materialized.folder.display()
        );
    }
    Ok(materialized)
}

/// Reads the entries of a `pom.properties` file
pub fn inspect(args: &InspectArgs) -> Result<Properties> {
    let file = File::open(&args.file).with_context(|| format!("couldn't open {:?}", args.file))?;
    let properties =
        Properties::load(file).with_context(|| format!("couldn't read {:?}", args.file))?;
    Ok(properties)
}
