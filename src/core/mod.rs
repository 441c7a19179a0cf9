//! Deterministic, pure logic for the recruitment flow.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod cipher;
pub mod countdown;
pub mod invariants;
pub mod session;
pub mod types;
