//! Common test utilities for homework-bot integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod servers;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use servers::*;
