//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod connectivity;
pub mod sync;
pub mod validate;
