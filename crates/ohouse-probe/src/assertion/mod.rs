//! Assertions for scenario checks.

mod soft;

pub use soft::{ensure, AssertionMode, CheckFailure, SoftChecks};
