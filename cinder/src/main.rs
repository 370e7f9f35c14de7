use std::path::PathBuf;

use anyhow::Context;
use cinder_common::BuildMode;
use cinder_lang::{CompileConfig, PersistMode};
use clap::Parser;
use log::info;

/// Compiles a bound program into a minecraft datapack
#[derive(Debug, Parser)]
#[command(name = "cinder", version)]
struct Args {
    /// The bound program, encoded as json
    program: PathBuf,
    /// The directory the datapack is written into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
    /// A project file with a `[project]` table
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the project name, which is also the name of the pack
    #[arg(long)]
    name: Option<String>,
    /// Annotates the generated functions with comments
    #[arg(long)]
    debug: bool,
    /// Replaces an existing datapack
    #[arg(long)]
    force: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut compile_config = match &args.config {
        Some(path) => CompileConfig::from_project_file(path)
            .with_context(|| format!("Could not load project file {}", path.display()))?,
        None => CompileConfig::default(),
    };
    if let Some(name) = args.name {
        compile_config.config_mut().project_name = name;
    }
    if args.debug {
        compile_config.config_mut().build_mode = BuildMode::Debug;
    }

    let program = CompileConfig::load_program(&args.program)?;
    let pack = compile_config
        .compile(&program)
        .with_context(|| format!("Could not compile {}", args.program.display()))?;

    let mode = if args.force {
        PersistMode::Overwrite
    } else {
        PersistMode::Fail
    };
    let target = compile_config.persist(&pack, &args.output, mode)?;
    info!("Done");
    println!("{}", target.display());
    Ok(())
}
