//! Tickets Worker
//!
//! Ticket access resolution for the support-ticket bot: who may act on a
//! ticket, which users count as staff for it, and which support teams a
//! member belongs to.

pub mod config;
pub mod permissions;
