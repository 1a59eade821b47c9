//! Ticket channel permission overwrites.
//!
//! Bit positions match Discord's permission bitfield so the values can be
//! sent to the API unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tk_common::UserId;

bitflags! {
    /// Channel permissions granted inside ticket channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TicketPermissions: u64 {
        /// Permission to add reactions to messages
        const ADD_REACTIONS            = 1 << 6;
        /// Permission to view the channel
        const VIEW_CHANNEL             = 1 << 10;
        /// Permission to send messages
        const SEND_MESSAGES            = 1 << 11;
        /// Permission to embed links in messages
        const EMBED_LINKS              = 1 << 14;
        /// Permission to attach files to messages
        const ATTACH_FILES             = 1 << 15;
        /// Permission to read earlier messages
        const READ_MESSAGE_HISTORY     = 1 << 16;
        /// Permission to run slash commands
        const USE_APPLICATION_COMMANDS = 1 << 31;
    }
}

impl TicketPermissions {
    /// Everything a ticket participant is normally given.
    pub const STANDARD: Self = Self::VIEW_CHANNEL
        .union(Self::SEND_MESSAGES)
        .union(Self::ADD_REACTIONS)
        .union(Self::ATTACH_FILES)
        .union(Self::READ_MESSAGE_HISTORY)
        .union(Self::EMBED_LINKS)
        .union(Self::USE_APPLICATION_COMMANDS);

    /// Baseline for ticket openers. Extras come from [`AdditionalPermissions`].
    pub const MINIMAL: Self = Self::VIEW_CHANNEL
        .union(Self::SEND_MESSAGES)
        .union(Self::READ_MESSAGE_HISTORY)
        .union(Self::USE_APPLICATION_COMMANDS);
}

/// Guild-configured extras for ticket openers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalPermissions {
    pub attach_files: bool,
    pub embed_links: bool,
    pub add_reactions: bool,
}

/// Target type of an overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteKind {
    Role,
    Member,
}

/// Per-user channel permission overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: UserId,
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    pub allow: TicketPermissions,
    pub deny: TicketPermissions,
}

/// Build the overwrite for a ticket opener: the minimal set plus enabled
/// extras, with disabled extras explicitly denied.
pub fn build_user_overwrite(
    user_id: UserId,
    additional: AdditionalPermissions,
) -> PermissionOverwrite {
    let mut allow = TicketPermissions::MINIMAL;
    let mut deny = TicketPermissions::empty();

    for (enabled, permission) in [
        (additional.attach_files, TicketPermissions::ATTACH_FILES),
        (additional.embed_links, TicketPermissions::EMBED_LINKS),
        (additional.add_reactions, TicketPermissions::ADD_REACTIONS),
    ] {
        if enabled {
            allow |= permission;
        } else {
            deny |= permission;
        }
    }

    PermissionOverwrite {
        id: user_id,
        kind: OverwriteKind::Member,
        allow,
        deny,
    }
}
