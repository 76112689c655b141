//! Shared helpers for the integration harnesses.
//!
//! `mod common;` at the top of a harness pulls in the fake engine and the
//! fixture builders.

#![allow(dead_code)]

pub mod fake_engine;
pub mod fixtures;

pub use fake_engine::{FakeEngine, SearchReply};
pub use fixtures::*;
