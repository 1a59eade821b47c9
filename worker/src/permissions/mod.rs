//! Ticket permission resolution.
//!
//! Three questions are answered here:
//! - May a user act on a ticket (`AccessResolver::can_access`)
//! - Which of a set of users are staff for a ticket (`AccessResolver::filter_staff`)
//! - Which support teams a member belongs to (`AccessResolver::member_teams`)
//!
//! Staff configuration comes from a [`PermissionStore`], live membership from
//! a [`MembershipProvider`].

pub mod access;
pub mod error;
pub mod memory;
pub mod overwrite;
pub mod queries;
pub mod resolver;
pub mod sets;
pub mod staff;
pub mod store;
pub mod teams;

pub use access::{AccessDecision, AccessTier, DenyReason};
pub use error::{AccessError, AccessResult, MembershipError, StoreError};
pub use memory::{InMemoryMembership, InMemoryPermissionStore};
pub use overwrite::{
    build_user_overwrite, AdditionalPermissions, OverwriteKind, PermissionOverwrite,
    TicketPermissions,
};
pub use queries::PgPermissionStore;
pub use resolver::AccessResolver;
pub use store::{MembershipProvider, PermissionStore};
pub use teams::MemberTeams;
