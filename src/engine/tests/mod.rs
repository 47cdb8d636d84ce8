//! Tests for the engine
//!
//! Organized by feature area

mod basic_tests;
mod fork_tests;
mod helpers;
