use cinder_bound::BoundProgram;
use cinder_common::CompileContext;
use cinder_error::EmitResult;
use cinder_vfs::Directory;
use log::info;

use crate::Backend;

use super::{generator::DatapackGenerator, Datapack};

/// The Datapack Backend implementation
#[derive(Debug, Default)]
pub struct DatapackBackend;

impl Backend for DatapackBackend {
    fn generate(&self, program: &BoundProgram, ctx: &CompileContext) -> EmitResult<Directory> {
        info!(
            "Generating datapack '{}' (pack format {})",
            ctx.config.project_name, ctx.config.pack_format
        );
        let emission = DatapackGenerator::new(ctx, program)?.generate()?;
        Ok(Datapack::from_emission(&ctx.config, &emission).into_directory())
    }
}
