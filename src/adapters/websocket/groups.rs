//! Broadcast group registry for chat fan-out.
//!
//! A group is a named set of live connections. Three kinds exist:
//!
//! ```text
//! user_<id>            personal inbox, every connection of that user
//! admin_support        every admin connection
//! conversation_<id>    connections that have used the conversation
//! ```
//!
//! The registry is a single process-wide component injected into every
//! session. Memberships are connection-scoped and released on disconnect.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::domain::foundation::{ConversationId, UserId};

use super::messages::ServerEvent;

/// Unique identifier for a WebSocket connection, generated on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a broadcast group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Inbox(UserId),
    AdminSupport,
    Conversation(ConversationId),
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Inbox(user) => write!(f, "user_{}", user),
            Group::AdminSupport => f.write_str("admin_support"),
            Group::Conversation(id) => write!(f, "conversation_{}", id),
        }
    }
}

#[derive(Default)]
struct Registry {
    /// Outbound queue of every registered connection.
    outbound: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
    /// Group → members. Empty groups are removed.
    members: HashMap<Group, HashSet<ConnectionId>>,
    /// Connection → groups, for O(groups) cleanup on disconnect.
    memberships: HashMap<ConnectionId, HashSet<Group>>,
}

impl Registry {
    fn add(&mut self, group: Group, connection: ConnectionId) -> bool {
        if !self.outbound.contains_key(&connection) {
            return false;
        }
        self.memberships.entry(connection).or_default().insert(group);
        self.members.entry(group).or_default().insert(connection)
    }

    fn remove(&mut self, group: Group, connection: ConnectionId) {
        if let Some(set) = self.members.get_mut(&group) {
            set.remove(&connection);
            if set.is_empty() {
                self.members.remove(&group);
            }
        }
        if let Some(groups) = self.memberships.get_mut(&connection) {
            groups.remove(&group);
        }
    }
}

/// Thread-safe group registry.
///
/// Joins and leaves take the write lock; broadcasts take the read lock only
/// long enough to snapshot the member queues, then deliver without it.
#[derive(Default)]
pub struct GroupRegistry {
    inner: RwLock<Registry>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection's outbound queue. Required before any join.
    pub async fn register(&self, connection: ConnectionId, outbound: mpsc::Sender<ServerEvent>) {
        self.inner.write().await.outbound.insert(connection, outbound);
    }

    /// Adds a registered connection to a group. Returns `true` when newly added.
    pub async fn join(&self, group: Group, connection: ConnectionId) -> bool {
        self.inner.write().await.add(group, connection)
    }

    pub async fn leave(&self, group: Group, connection: ConnectionId) {
        self.inner.write().await.remove(group, connection);
    }

    /// Enrolls `connection` and every member of `sources` into `target`
    /// under one lock acquisition, so either all joins happen or none do.
    pub async fn enroll(&self, target: Group, connection: ConnectionId, sources: &[Group]) {
        let mut registry = self.inner.write().await;

        let mut joiners: HashSet<ConnectionId> = sources
            .iter()
            .filter_map(|source| registry.members.get(source))
            .flatten()
            .copied()
            .collect();
        joiners.insert(connection);

        for joiner in joiners {
            registry.add(target, joiner);
        }
    }

    /// Removes a connection from every group and drops its queue.
    ///
    /// Returns the number of memberships released.
    pub async fn unregister(&self, connection: ConnectionId) -> usize {
        let mut registry = self.inner.write().await;
        registry.outbound.remove(&connection);

        let groups = registry.memberships.remove(&connection).unwrap_or_default();
        for group in &groups {
            if let Some(set) = registry.members.get_mut(group) {
                set.remove(&connection);
                if set.is_empty() {
                    registry.members.remove(group);
                }
            }
        }
        groups.len()
    }

    /// Delivers `event` to every current member of `group`.
    ///
    /// Membership is snapshotted at call time. Delivery is best-effort: a
    /// member whose queue is full or closed misses this event. Returns the
    /// number of members the event was queued for.
    pub async fn broadcast(&self, group: Group, event: ServerEvent) -> usize {
        let targets: Vec<(ConnectionId, mpsc::Sender<ServerEvent>)> = {
            let registry = self.inner.read().await;
            match registry.members.get(&group) {
                Some(set) => set
                    .iter()
                    .filter_map(|id| registry.outbound.get(id).map(|tx| (*id, tx.clone())))
                    .collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for (connection, outbound) in targets {
            match outbound.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %connection,
                        group = %group,
                        "Outbound queue full, dropping event"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = %connection, "Outbound queue closed");
                }
            }
        }
        delivered
    }

    pub async fn is_member(&self, group: Group, connection: ConnectionId) -> bool {
        self.inner
            .read()
            .await
            .members
            .get(&group)
            .is_some_and(|set| set.contains(&connection))
    }

    pub async fn member_count(&self, group: Group) -> usize {
        self.inner
            .read()
            .await
            .members
            .get(&group)
            .map_or(0, HashSet::len)
    }

    /// Groups a connection currently belongs to.
    pub async fn groups_of(&self, connection: ConnectionId) -> Vec<Group> {
        self.inner
            .read()
            .await
            .memberships
            .get(&connection)
            .map(|groups| groups.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn group_count(&self) -> usize {
        self.inner.read().await.members.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.outbound.len()
    }
}
