//! Filesystem utilities for hermod.
//!
//! Submission files are only ever written through [`atomic_write`], so a
//! half-written file is never visible under its final name.

pub mod atomic;

pub use atomic::atomic_write;
