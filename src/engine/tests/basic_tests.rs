//! Tests for basic execution
//!
//! Programs that run to completion without suspending

use super::helpers::*;
use crate::engine::exec_loop::{Next, Outcome};
use crate::engine::types::{BinOp, Block, Continuation, Val};
use crate::engine::{Driver, Heap};
use crate::error::Error;

#[test]
fn test_program_without_suspend_completes() {
    // return 1 + 2 * 3
    let program = ret(bin(
        BinOp::Add,
        num(1.0),
        bin(BinOp::Mul, num(2.0), num(3.0)),
    ));

    let mut driver = Driver::new(program);
    assert!(driver.is_resumable());

    let result = driver.run(Val::Null).unwrap();

    assert_eq!(result, Val::Num(7.0));
    assert!(!driver.is_resumable());
}

#[test]
fn test_final_value_without_return() {
    // The value of the last statement is the program's result
    let program = Block::sequence(vec![
        Block::let_("a", num(4.0)),
        bin(BinOp::Sub, local("a"), num(1.0)),
    ]);

    let mut driver = Driver::new(program);
    assert_eq!(driver.run(Val::from("ignored")).unwrap(), Val::Num(3.0));
    assert!(!driver.is_resumable());
}

#[test]
fn test_empty_sequence_is_null() {
    let mut driver = Driver::new(Block::sequence(vec![]));
    assert_eq!(driver.run(Val::Null).unwrap(), Val::Null);
}

#[test]
fn test_construction_has_no_side_effects() {
    // The first thing this program does is fault, but only once it runs
    let program = Block::sequence(vec![
        call("fail", vec![string("too early")]),
        num(1.0),
    ]);

    let mut driver = Driver::new(program);

    assert!(driver.is_resumable());
    assert_eq!(live_frames(&driver), 1); // only the top-level frame

    let err = driver.run(Val::Null).unwrap_err();
    assert!(matches!(err, Error::Uncaught(_)));
}

#[test]
fn test_run_after_completion_faults() {
    let mut driver = Driver::new(num(1.0));
    assert_eq!(driver.run(Val::Null).unwrap(), Val::Num(1.0));

    // Never a stale value, every time
    assert!(matches!(driver.run(Val::Null), Err(Error::NotResumable)));
    assert!(matches!(driver.run(Val::Num(2.0)), Err(Error::NotResumable)));
}

#[test]
fn test_program_from_json() {
    let program_json = r#"{
        "t": "Sequence",
        "body": [
            {
                "t": "Let",
                "name": "greeting",
                "value": { "t": "Const", "v": { "t": "Str", "v": "hello" } }
            },
            {
                "t": "Return",
                "value": {
                    "t": "Binary",
                    "op": "Add",
                    "lhs": { "t": "Local", "name": "greeting" },
                    "rhs": { "t": "Const", "v": { "t": "Str", "v": " world" } }
                }
            }
        ]
    }"#;

    let program: Block = serde_json::from_str(program_json).unwrap();
    let mut driver = Driver::new(program);

    assert_eq!(driver.run(Val::Null).unwrap(), Val::from("hello world"));
}

#[test]
fn test_if_else_branches() {
    let program = |flag: bool| {
        Block::if_(
            Block::constant(flag),
            string("then"),
            Some(string("else")),
        )
    };

    assert_eq!(
        Driver::new(program(true)).run(Val::Null).unwrap(),
        Val::from("then")
    );
    assert_eq!(
        Driver::new(program(false)).run(Val::Null).unwrap(),
        Val::from("else")
    );

    // Missing else evaluates to null
    let no_else = Block::if_(Block::constant(false), num(1.0), None);
    assert_eq!(Driver::new(no_else).run(Val::Null).unwrap(), Val::Null);
}

#[test]
fn test_short_circuit_skips_right_operand() {
    // false && fail("x") never calls fail
    let program = bin(
        BinOp::And,
        Block::constant(false),
        call("fail", vec![string("x")]),
    );
    assert_eq!(Driver::new(program).run(Val::Null).unwrap(), Val::Bool(false));

    let program = bin(
        BinOp::Or,
        num(5.0),
        call("fail", vec![string("x")]),
    );
    assert_eq!(Driver::new(program).run(Val::Null).unwrap(), Val::Num(5.0));

    let program = Block::not(bin(BinOp::Or, Block::null(), Block::constant(false)));
    assert_eq!(Driver::new(program).run(Val::Null).unwrap(), Val::Bool(true));
}

#[test]
fn test_assign_updates_outer_scope_from_try_body() {
    // let x = 1; try { x = x + 1 } catch e { }; return x
    let program = Block::sequence(vec![
        Block::let_("x", num(1.0)),
        Block::try_catch(
            Block::assign("x", bin(BinOp::Add, local("x"), num(1.0))),
            "e",
            Block::null(),
        ),
        ret(local("x")),
    ]);

    assert_eq!(Driver::new(program).run(Val::Null).unwrap(), Val::Num(2.0));
}

#[test]
fn test_function_call_and_builtins() {
    // let sq = fn(n) { n * n }; return abs(floor(sq(-1.5))) + len("abc")
    let program = Block::sequence(vec![
        define("sq", &["n"], bin(BinOp::Mul, local("n"), local("n"))),
        ret(bin(
            BinOp::Add,
            call("abs", vec![call("floor", vec![call("sq", vec![num(-1.5)])])]),
            call("len", vec![string("abc")]),
        )),
    ]);

    // sq(-1.5) = 2.25, floor = 2, abs = 2, + 3
    assert_eq!(Driver::new(program).run(Val::Null).unwrap(), Val::Num(5.0));
}

#[test]
fn test_pump_on_halt_yields_terminal_value() {
    let mut heap = Heap::new();

    let outcome = Next::resume(Continuation::halt(), Val::Num(9.0)).run(&mut heap);

    let Outcome::Yielded { k, value } = outcome else {
        unreachable!("Expected Yielded, got {:?}", outcome);
    };
    assert!(k.is_halt());
    assert_eq!(value, Val::Num(9.0));
}
