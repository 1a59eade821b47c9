//! Access resolver wiring.
//!
//! Holds the permission store, membership provider and configuration shared
//! by ticket access checks, team lookups and staff filtering.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tk_common::{GuildId, Member, UserId};

use super::error::{AccessError, AccessResult};
use super::store::{MembershipProvider, PermissionStore};
use crate::config::AccessConfig;

/// Resolves ticket permissions against stored staff configuration and live
/// guild membership.
///
/// Cheap to clone; clones share the same store and provider.
#[derive(Clone)]
pub struct AccessResolver {
    pub(crate) store: Arc<dyn PermissionStore>,
    pub(crate) members: Arc<dyn MembershipProvider>,
    pub(crate) config: AccessConfig,
}

impl AccessResolver {
    pub fn new(
        store: Arc<dyn PermissionStore>,
        members: Arc<dyn MembershipProvider>,
        config: AccessConfig,
    ) -> Self {
        Self {
            store,
            members,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Run a provider call under the configured timeout.
    pub(crate) async fn bounded<T, E>(
        &self,
        call: impl Future<Output = Result<T, E>>,
    ) -> AccessResult<T>
    where
        E: Into<AccessError>,
    {
        with_timeout(self.config.provider_timeout, call).await
    }

    /// Fetch a guild member. Not-found is returned as an error.
    pub(crate) async fn fetch_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> AccessResult<Member> {
        self.bounded(self.members.get_guild_member(guild_id, user_id))
            .await
    }
}

impl std::fmt::Debug for AccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Await `call`, failing with [`AccessError::Timeout`] once `timeout` elapses.
pub(crate) async fn with_timeout<T, E>(
    timeout: Option<Duration>,
    call: impl Future<Output = Result<T, E>>,
) -> AccessResult<T>
where
    E: Into<AccessError>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| AccessError::Timeout(limit))?
            .map_err(Into::into),
        None => call.await.map_err(Into::into),
    }
}
