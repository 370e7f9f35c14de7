//! A Backend that compiles bound programs to minecraft datapacks
use cinder_common::Config;
use cinder_vfs::{directories, Directory};
use log::{info, trace};

use self::{
    emission::{FunctionEmission, ProgramEmission},
    templates::{template_load_json, template_pack_mcmeta, template_tick_json},
};

mod backend;
pub use backend::DatapackBackend;

mod builtins;
mod emission;
mod emitter;
mod function_builder;
mod function_context;
mod generator;
mod json_formatter;
mod markers;
mod scope;
mod scoreboard_constants;
mod snbt;
mod storage_context;
mod templates;

/// Represents an in-memory datapack
#[derive(Debug)]
struct Datapack {
    /// The virtual file structure
    dir: Directory,
    /// `function` or `functions`, depending on the pack format
    function_directory: &'static str,
}

impl Datapack {
    /// Creates an empty pack with a `pack.mcmeta` and the function tag directory
    fn new(config: &Config) -> Self {
        let function_directory = config.function_directory();
        let dir = directories! {
            "pack.mcmeta" => File(template_pack_mcmeta(config.into())),
            data => directories! {
                minecraft => directories! {
                    tags => directories! {
                        (function_directory) => directories!()
                    }
                }
            }
        };
        Datapack {
            dir,
            function_directory,
        }
    }

    /// Lays out an emitted program as files
    fn from_emission(config: &Config, emission: &ProgramEmission) -> Self {
        let mut datapack = Datapack::new(config);

        for namespace in emission.namespaces.values() {
            let mut count = 0;
            for function in &namespace.functions {
                function.walk(&mut |function| {
                    datapack.add_function(function);
                    count += 1;
                });
            }
            trace!("Wrote {count} functions into namespace {}", namespace.name);
        }

        datapack.add_tag("load.json", template_load_json(&emission.load));
        if !emission.tick.is_empty() {
            datapack.add_tag("tick.json", template_tick_json(&emission.tick));
        }
        info!(
            "Assembled datapack with {} files",
            datapack.dir.walk_files().len()
        );
        datapack
    }

    /// Writes a function file, `/` in its path creates subdirectories
    fn add_function(&mut self, function: &FunctionEmission) {
        let file_name = function.file_name();
        let mut path = vec!["data", &*function.ident.namespace, self.function_directory];
        path.extend(file_name.split('/'));
        if let Some(file) = self.dir.file_at(&path) {
            file.contents = function.content.render();
        }
    }

    fn add_tag(&mut self, name: &str, contents: String) {
        self.dir
            .dir_at(&["data", "minecraft", "tags", self.function_directory])
            .file(name)
            .contents = contents;
    }

    fn into_directory(self) -> Directory {
        self.dir
    }
}
