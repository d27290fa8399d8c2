//! Tests for the engine
//!
//! Organized by directive / feature area

mod affect_tests;
mod each_tests;
mod error_tests;
mod helpers;
mod on_tests;
