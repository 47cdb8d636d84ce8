//! Test helpers for engine tests
//!
//! Shorthand constructors for block trees and drivers

use crate::engine::types::{BinOp, Block, Callable, Val};
use crate::engine::Driver;

pub fn num(n: f64) -> Block {
    Block::constant(n)
}

pub fn string(s: &str) -> Block {
    Block::constant(s)
}

pub fn local(name: &str) -> Block {
    Block::local(name)
}

pub fn bin(op: BinOp, lhs: Block, rhs: Block) -> Block {
    Block::binary(op, lhs, rhs)
}

pub fn call(name: &str, args: Vec<Block>) -> Block {
    Block::call_named(name, args)
}

pub fn ret(value: Block) -> Block {
    Block::return_(Some(value))
}

/// Function literal
pub fn func(params: &[&str], body: Block) -> Block {
    Block::constant(Val::Function(std::sync::Arc::new(Callable::new(
        params.iter().map(|p| p.to_string()).collect(),
        body,
    ))))
}

/// `let name = fn(params) { body }`
pub fn define(name: &str, params: &[&str], body: Block) -> Block {
    Block::let_(name, func(params, body))
}

/// Program from the engine's reference scenario:
///
/// ```text
/// let x = 1 + 1;
/// let y = suspend(x);
/// let z = suspend(y * 2);
/// return z + 100;
/// ```
pub fn scenario_program() -> Block {
    Block::sequence(vec![
        Block::let_("x", bin(BinOp::Add, num(1.0), num(1.0))),
        Block::let_("y", call("suspend", vec![local("x")])),
        Block::let_(
            "z",
            call("suspend", vec![bin(BinOp::Mul, local("y"), num(2.0))]),
        ),
        ret(bin(BinOp::Add, local("z"), num(100.0))),
    ])
}

/// Recursive sum from `n` down to zero:
///
/// ```text
/// let sum = fn(n) {
///     if (n == 0) { return 0 } else { return n + sum(n - 1) }
/// };
/// return sum(n)
/// ```
///
/// With `suspend_at_bottom` the deepest call returns `suspend(0)` instead,
/// so the whole chain of pending additions is suspended.
pub fn sum_program(n: f64, suspend_at_bottom: bool) -> Block {
    let bottom = if suspend_at_bottom {
        call("suspend", vec![num(0.0)])
    } else {
        num(0.0)
    };

    Block::sequence(vec![
        define(
            "sum",
            &["n"],
            Block::if_(
                bin(BinOp::Eq, local("n"), num(0.0)),
                ret(bottom),
                Some(ret(bin(
                    BinOp::Add,
                    local("n"),
                    call("sum", vec![bin(BinOp::Sub, local("n"), num(1.0))]),
                ))),
            ),
        ),
        ret(call("sum", vec![num(n)])),
    ])
}

/// Serialize and restore a driver
pub fn roundtrip(driver: &Driver) -> Driver {
    let bytes = driver.to_bytes().expect("Snapshot failed");
    Driver::from_bytes(&bytes).expect("Restore failed")
}

/// Number of frames allocated in the driver's heap
pub fn live_frames(driver: &Driver) -> usize {
    driver.heap.lock().unwrap().live()
}
