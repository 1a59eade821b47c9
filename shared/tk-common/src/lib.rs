//! Tickets Common Library
//!
//! Identifier newtypes and the data model shared by the worker and its
//! storage and membership backends.

pub mod types;

pub use types::*;
