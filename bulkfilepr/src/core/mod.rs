//! Deterministic, pure logic shared by the apply engine.
//!
//! Core modules must be free of I/O side effects (file hashing aside). They
//! operate on in-memory data and return deterministic outputs suitable for
//! tests.

pub mod hash;
pub mod mode;
pub mod types;
