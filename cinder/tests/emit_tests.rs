use cinder_lang::{
    bound::{
        BinaryOperator, BoundBlock, BoundExpression, BoundFunction, BoundStatement,
        BuiltinFunction, ParameterSymbol, Type,
    },
    common::BuildMode,
};

mod common;
use common::{compile, config, counting_loop, function_file, program};

#[test_log::test]
fn test_identical_programs_give_identical_packs() {
    let (program, _) = program(counting_loop(BoundExpression::int(5)), Type::Void);
    assert_eq!(compile(&program), compile(&program));
}

#[test]
fn test_loop_function_file() {
    let (program, _) = program(counting_loop(BoundExpression::int(5)), Type::Void);
    let pack = compile(&program);

    assert_eq!(
        function_file(&pack, "main_sl0"),
        "execute store success score demo/main.#tmp0 cinder if score demo/main.i cinder matches ..4\n\
         execute unless score demo/main.#tmp0 cinder matches 1 run return 0\n\
         scoreboard players add demo/main.i cinder 1\n\
         function demo:main_sl0\n"
    );
    let main = function_file(&pack, "main");
    assert!(main.starts_with("scoreboard players set demo/main.i cinder 0\nfunction demo:main_sl0\n"));
}

#[test]
fn test_load_function_calls_load_functions() {
    let (program, _) = program(vec![], Type::Void);
    let pack = compile(&program);

    let load = function_file(&pack, "__load");
    assert!(load.starts_with("scoreboard objectives remove cinder\nscoreboard objectives add cinder dummy\n"));
    assert!(load.ends_with("function demo:main\n"));
    let tags = pack
        .get_file(&["data", "minecraft", "tags", "function", "load.json"])
        .unwrap();
    assert!(tags.contents.contains("\"demo:__load\""));
}

#[test]
fn test_support_functions_are_generated_on_demand() {
    let (without, _) = program(vec![], Type::Void);
    let pack = compile(&without);
    assert!(pack
        .get_dir(&["data", "demo", "function", "__generated"])
        .is_none());

    let (with, _) = program(
        vec![BoundStatement::ret(Some(BoundExpression::binary(
            BoundExpression::string("a"),
            BinaryOperator::Add,
            BoundExpression::string("b"),
        )))],
        Type::String,
    );
    let pack = compile(&with);
    let concat = function_file(&pack, "__generated/string_concat");
    assert!(concat.starts_with('$'));
}

#[test]
fn test_calls_pass_parameters() {
    let (mut program, ns) = program(vec![], Type::Void);
    let double = program.add_function(BoundFunction::new(
        ns,
        "double",
        vec![ParameterSymbol::new("x", Type::Int)],
        Type::Int,
        BoundBlock::new(vec![BoundStatement::ret(Some(BoundExpression::binary(
            BoundExpression::parameter("x", Type::Int),
            BinaryOperator::Mul,
            BoundExpression::int(2),
        )))]),
    ));
    program.add_function(BoundFunction::new(
        ns,
        "caller",
        vec![],
        Type::Int,
        BoundBlock::new(vec![BoundStatement::ret(Some(BoundExpression::call(
            double,
            vec![BoundExpression::int(21)],
            Type::Int,
        )))]),
    ));
    let pack = compile(&program);

    let caller = function_file(&pack, "caller");
    assert!(caller.contains("function demo:double\n"));
    let load = function_file(&pack, "__load");
    assert!(load.contains("scoreboard players set #const_2 cinder 2\n"));
}

#[test]
fn test_builtins_emit_commands() {
    let (program, _) = program(
        vec![
            BoundStatement::expression(BoundExpression::builtin(
                BuiltinFunction::SetWeather,
                vec![BoundExpression::string("rain"), BoundExpression::int(600)],
            )),
            BoundStatement::expression(BoundExpression::builtin(
                BuiltinFunction::Say,
                vec![BoundExpression::string("hello")],
            )),
        ],
        Type::Void,
    );
    let pack = compile(&program);
    assert_eq!(
        function_file(&pack, "main"),
        "weather rain 600\nsay hello\n"
    );
}

#[test]
fn test_debug_build_adds_comments() {
    let (program, _) = program(counting_loop(BoundExpression::int(5)), Type::Void);
    let debug = config(BuildMode::Debug).compile(&program).unwrap();
    let release = compile(&program);

    assert!(function_file(&debug, "__load").contains("# Constants\n"));
    assert!(!function_file(&release, "__load")
        .lines()
        .any(|line| line.starts_with("# ")));
    assert!(function_file(&debug, "main").contains("\n\n"));
    assert!(!function_file(&release, "main").contains("\n\n"));
}

#[test]
fn test_emit_errors_name_the_function() {
    let (program, _) = program(vec![BoundStatement::goto("nowhere")], Type::Void);
    let error = config(BuildMode::Release).compile(&program).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("'nowhere'"));
    assert!(message.contains("while emitting function demo:main"));
}

#[test]
fn test_global_counter() {
    let (mut program, ns) = program(vec![], Type::Void);
    program.add_field(ns, "count", Type::Int, Some(BoundExpression::int(3)));
    let pack = compile(&program);
    assert!(function_file(&pack, "__load").contains("scoreboard players set demo.count cinder 3\n"));
}
