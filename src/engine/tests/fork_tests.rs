//! Tests for forking drivers
//!
//! Forks share frames; snapshots do not

use super::helpers::*;
use crate::engine::types::{BinOp, Block, Continuation, Val};
use crate::engine::Driver;
use crate::error::Error;

/// let x = 1; loop { x = suspend(x) + x }
///
/// `x` is read after the resumed value arrives.
fn accumulator_program() -> Block {
    Block::sequence(vec![
        Block::let_("x", num(1.0)),
        Block::while_(
            Block::constant(true),
            Block::assign(
                "x",
                bin(BinOp::Add, call("suspend", vec![local("x")]), local("x")),
            ),
        ),
    ])
}

#[test]
fn test_fork_points_at_same_continuation() {
    let mut driver = Driver::new(scenario_program());
    driver.run(Val::Null).unwrap();

    let fork = driver.fork();

    assert!(Continuation::ptr_eq(
        driver.continuation(),
        fork.continuation()
    ));
    assert_ne!(driver.id(), fork.id());
    assert_eq!(fork.settings(), driver.settings());
}

#[test]
fn test_forks_continue_independently() {
    let mut driver = Driver::new(scenario_program());
    assert_eq!(driver.run(Val::Null).unwrap(), Val::Num(2.0));

    let mut fork = driver.fork();

    // Both resume the same suspend call with different values
    assert_eq!(driver.run(Val::Num(5.0)).unwrap(), Val::Num(10.0));
    assert_eq!(fork.run(Val::Num(10.0)).unwrap(), Val::Num(20.0));

    assert_eq!(driver.run(Val::Num(0.0)).unwrap(), Val::Num(100.0));
    assert_eq!(fork.run(Val::Num(1.0)).unwrap(), Val::Num(101.0));

    assert!(!driver.is_resumable());
    assert!(!fork.is_resumable());
}

#[test]
fn test_forks_share_local_variables() {
    let mut driver = Driver::new(accumulator_program());
    assert_eq!(driver.run(Val::Null).unwrap(), Val::Num(1.0));

    let mut fork = driver.fork();

    // x = 10 + 1, written to the shared top-level frame
    assert_eq!(driver.run(Val::Num(10.0)).unwrap(), Val::Num(11.0));

    // The fork resumes the same suspend call, but reads the updated x
    assert_eq!(fork.run(Val::Num(10.0)).unwrap(), Val::Num(21.0));
}

#[test]
fn test_snapshot_gives_isolated_copy() {
    let mut driver = Driver::new(accumulator_program());
    assert_eq!(driver.run(Val::Null).unwrap(), Val::Num(1.0));

    let mut copy = roundtrip(&driver);

    assert_eq!(driver.run(Val::Num(10.0)).unwrap(), Val::Num(11.0));

    // The copy still sees x = 1
    assert_eq!(copy.run(Val::Num(10.0)).unwrap(), Val::Num(11.0));
    assert_eq!(copy.run(Val::Num(1.0)).unwrap(), Val::Num(12.0));
    assert_eq!(driver.run(Val::Num(1.0)).unwrap(), Val::Num(12.0));
}

#[test]
fn test_fork_of_completed_driver_is_not_resumable() {
    let mut driver = Driver::new(num(1.0));
    driver.run(Val::Null).unwrap();

    let mut fork = driver.fork();

    assert!(!fork.is_resumable());
    assert!(matches!(fork.run(Val::Null), Err(Error::NotResumable)));
}

#[test]
fn test_fork_before_first_run() {
    let driver = Driver::new(scenario_program());
    let mut fork = driver.fork();

    // The original never runs; the fork executes the program from the start
    assert_eq!(fork.run(Val::Null).unwrap(), Val::Num(2.0));
    assert!(driver.is_resumable());
}

#[test]
fn test_fork_outlives_original() {
    let mut driver = Driver::new(scenario_program());
    driver.run(Val::Null).unwrap();

    let mut fork = driver.fork();
    drop(driver);

    assert_eq!(fork.run(Val::Num(3.0)).unwrap(), Val::Num(6.0));
    assert_eq!(fork.run(Val::Num(4.0)).unwrap(), Val::Num(104.0));
}

#[test]
fn test_forks_run_on_separate_threads() {
    let mut driver = Driver::new(scenario_program());
    driver.run(Val::Null).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mut fork = driver.fork();
            std::thread::spawn(move || {
                let second = fork.run(Val::Num(i as f64)).unwrap();
                let last = fork.run(Val::Num(0.0)).unwrap();
                (second, last)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let (second, last) = handle.join().unwrap();
        assert_eq!(second, Val::Num(i as f64 * 2.0));
        assert_eq!(last, Val::Num(100.0));
    }
}
