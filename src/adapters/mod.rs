//! External system integrations for marketsync.
//!
//! - [`source`] - Where raw rows come from ([`RowSource`](source::RowSource))
//! - [`company`] - Company name → identifier lookup
//! - [`http`] - HTTP transport used by the delivery client
//!
//! # Design Pattern
//!
//! Each adapter sits behind a trait so the core can be tested with in-memory
//! implementations.

pub mod company;
pub mod http;
pub mod source;
