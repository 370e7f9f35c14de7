use criterion::{criterion_group, criterion_main, Criterion};
use cinder_lang::{
    bound::{
        BinaryOperator, BoundBlock, BoundExpression, BoundFunction, BoundProgram, BoundStatement,
        Type,
    },
    common::{BuildMode, Config},
    CompileConfig,
};

fn int(name: &str) -> BoundExpression {
    BoundExpression::local(name, Type::Int)
}

/// A namespace with `count` functions that each sum up to their index
fn program(count: usize) -> BoundProgram {
    let mut program = BoundProgram::new();
    let namespace = program.add_namespace("bench");
    for index in 0..count {
        let limit = i32::try_from(index).unwrap_or(i32::MAX);
        program.add_function(BoundFunction::new(
            namespace,
            format!("sum_{index}"),
            vec![],
            Type::Int,
            BoundBlock::new(vec![
                BoundStatement::declare("i", Type::Int, Some(BoundExpression::int(0))),
                BoundStatement::declare("sum", Type::Int, Some(BoundExpression::int(0))),
                BoundStatement::while_loop(
                    BoundExpression::binary(int("i"), BinaryOperator::Less, BoundExpression::int(limit)),
                    vec![
                        BoundStatement::if_else(
                            BoundExpression::binary(
                                BoundExpression::binary(int("i"), BinaryOperator::Mod, BoundExpression::int(2)),
                                BinaryOperator::Equal,
                                BoundExpression::int(0),
                            ),
                            vec![BoundStatement::assign(
                                int("sum"),
                                BoundExpression::binary(int("sum"), BinaryOperator::Add, int("i")),
                            )],
                            None,
                        ),
                        BoundStatement::assign(
                            int("i"),
                            BoundExpression::binary(int("i"), BinaryOperator::Add, BoundExpression::int(1)),
                        ),
                    ],
                    "break0",
                    "continue0",
                ),
                BoundStatement::ret(Some(int("sum"))),
            ]),
        ));
    }
    program
}

fn run_emit_benchmarks(c: &mut Criterion) {
    for count in [10, 100] {
        let program = program(count);
        for build_mode in [BuildMode::Debug, BuildMode::Release] {
            let config = CompileConfig::new(Config {
                project_name: "bench".to_string(),
                build_mode,
                ..Default::default()
            });
            let mode = match build_mode {
                BuildMode::Debug => "debug",
                BuildMode::Release => "release",
            };
            c.bench_function(&format!("emit_{count}({mode})"), |b| {
                b.iter(|| config.compile(&program).unwrap());
            });
        }
    }
}

criterion_group!(emit_benchmarks, run_emit_benchmarks);
criterion_main!(emit_benchmarks);
