//! Shared Types

pub mod ids;
pub mod member;
pub mod ticket;

pub use ids::*;
pub use member::*;
pub use ticket::*;
