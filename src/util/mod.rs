//! Provide various utility functions and structs.
//!
//! The utility objects in this submodule are lightly documented.
//! Use at your own risk.
#![allow(missing_docs)]

mod basic;
pub mod bigint;
pub(crate) mod dwthandler;
mod number_theory;
pub mod rlwe;
mod random_generator;
mod uintsmallmod;

// gather utilities in this module
pub use basic::*;
pub use number_theory::*;
pub use uintsmallmod::*;
pub use random_generator::{BlakeRNGFactory, BlakeRNG, PRNGSeed};
