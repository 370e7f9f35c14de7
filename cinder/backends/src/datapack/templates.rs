//! Static files that only change in a few parameters, like `pack.mcmeta` and the function tags
use std::rc::Rc;

use cinder_common::Config;
use itertools::Itertools;

use crate::common::{string_escape::escape_minecraft, FunctionIdent};

#[derive(Debug, Clone, Copy)]
pub(crate) struct TemplateData<'a> {
    project_description: &'a str,
    author: Option<&'a str>,
    pack_format: u32,
}

impl<'a> From<&'a Config> for TemplateData<'a> {
    fn from(config: &'a Config) -> Self {
        TemplateData {
            project_description: &config.project_description,
            author: config.author.as_deref(),
            pack_format: config.pack_format,
        }
    }
}

fn function_values(functions: &[Rc<FunctionIdent>]) -> String {
    functions
        .iter()
        .map(|function| format!("        \"{function}\""))
        .join(",\n")
}

pub(crate) fn template_load_json(functions: &[Rc<FunctionIdent>]) -> String {
    format!(
        include_str!("res/load.json.tp"),
        values = function_values(functions)
    )
}

pub(crate) fn template_tick_json(functions: &[Rc<FunctionIdent>]) -> String {
    format!(
        include_str!("res/tick.json.tp"),
        values = function_values(functions)
    )
}

pub(crate) fn template_pack_mcmeta(data: TemplateData) -> String {
    let author_line = data.author.map_or_else(String::new, |author| {
        format!(
            ",\n    \"author\": \"{}\"",
            escape_minecraft(author).collect::<String>()
        )
    });
    format!(
        include_str!("res/pack.mcmeta.tp"),
        pack_format = data.pack_format,
        description = escape_minecraft(data.project_description).collect::<String>(),
        author = author_line,
    )
}
