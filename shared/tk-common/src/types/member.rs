//! Member Types

use serde::{Deserialize, Serialize};

use super::ids::{ChannelId, RoleId, UserId};

/// Guild member snapshot.
///
/// Fetched on demand and valid for the duration of a single resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    /// Role ids held by the member (excluding @everyone).
    #[serde(default)]
    pub roles: Vec<RoleId>,
    /// Whether the account is a bot.
    #[serde(default)]
    pub bot: bool,
}

impl Member {
    /// Create a non-bot member with the given roles.
    #[must_use]
    pub const fn new(user_id: UserId, roles: Vec<RoleId>) -> Self {
        Self {
            user_id,
            roles,
            bot: false,
        }
    }

    /// Create a bot member.
    #[must_use]
    pub const fn bot(user_id: UserId, roles: Vec<RoleId>) -> Self {
        Self {
            user_id,
            roles,
            bot: true,
        }
    }

    #[must_use]
    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.roles.contains(&role_id)
    }
}

/// Membership of a user in a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMember {
    pub thread_id: ChannelId,
    pub user_id: UserId,
}
