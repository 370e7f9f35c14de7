use std::path::PathBuf;

use cinder_lang::{
    bound::{
        BinaryOperator, BoundBlock, BoundExpression, BoundFunction, BoundProgram, BoundStatement,
        FunctionAttributes, NamespaceId, Type,
    },
    common::{BuildMode, Config},
    vfs::Directory,
    CompileConfig,
};

pub fn config(build_mode: BuildMode) -> CompileConfig {
    CompileConfig::new(Config {
        project_name: "demo".to_string(),
        build_mode,
        ..Default::default()
    })
}

pub fn compile(program: &BoundProgram) -> Directory {
    config(BuildMode::Release)
        .compile(program)
        .expect("Program failed to compile")
}

pub fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

/// The text of `data/demo/function/<path>.mcfunction`
pub fn function_file<'a>(pack: &'a Directory, path: &str) -> &'a str {
    let file_name = format!("{path}.mcfunction");
    let mut segments = vec!["data", "demo", "function"];
    segments.extend(file_name.split('/'));
    &pack
        .get_file(&segments)
        .unwrap_or_else(|| panic!("Missing function file {path}"))
        .contents
}

pub fn int(name: &str) -> BoundExpression {
    BoundExpression::local(name, Type::Int)
}

pub fn program(statements: Vec<BoundStatement>, return_type: Type) -> (BoundProgram, NamespaceId) {
    let mut program = BoundProgram::new();
    let namespace = program.add_namespace("demo");
    program.add_function(
        BoundFunction::new(
            namespace,
            "main",
            vec![],
            return_type,
            BoundBlock::new(statements),
        )
        .with_attributes(FunctionAttributes {
            load: true,
            tick: false,
        }),
    );
    (program, namespace)
}

/// `while (i < limit) { i = i + 1; }`
pub fn counting_loop(limit: BoundExpression) -> Vec<BoundStatement> {
    vec![
        BoundStatement::declare("i", Type::Int, Some(BoundExpression::int(0))),
        BoundStatement::while_loop(
            BoundExpression::binary(int("i"), BinaryOperator::Less, limit),
            vec![BoundStatement::assign(
                int("i"),
                BoundExpression::binary(int("i"), BinaryOperator::Add, BoundExpression::int(1)),
            )],
            "break0",
            "continue0",
        ),
    ]
}
