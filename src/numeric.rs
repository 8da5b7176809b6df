//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

// Floating-point precision is configured here
pub type Float = f64;
pub use std::f64 as reals;
