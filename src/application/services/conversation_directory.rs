//! ConversationDirectory - Find-or-create and authorization of conversations.
//!
//! Concurrent find-or-create calls for the same pair are serialized inside
//! the process by a lock keyed on the normalized pair. Across processes the
//! repository's uniqueness rule reports `Conflict`, and the loser re-reads
//! the row the winner inserted.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::chat::{ChatError, Conversation, MissingEntity, NewConversation, UserPair};
use crate::domain::foundation::{ConversationId, Principal, UserId};
use crate::ports::{ConversationRepository, UserDirectory};

/// Async locks created on demand per key and dropped once unused.
struct KeyedLocks<K> {
    slots: StdMutex<HashMap<K, Slot>>,
}

struct Slot {
    lock: Arc<Mutex<()>>,
    /// Callers waiting on or holding `lock`.
    users: usize,
}

/// Exclusive hold on one key. The slot is released on drop, including when
/// the owning future is cancelled.
struct KeyedGuard<'a, K: Eq + Hash + Copy> {
    // Declared first so the mutex unlocks before the slot is released.
    _held: OwnedMutexGuard<()>,
    _slot: SlotRef<'a, K>,
}

/// Registration in a slot, undone on drop.
struct SlotRef<'a, K: Eq + Hash + Copy> {
    locks: &'a KeyedLocks<K>,
    key: K,
}

impl<K: Eq + Hash + Copy> Drop for SlotRef<'_, K> {
    fn drop(&mut self) {
        let mut slots = self
            .locks
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get_mut(&self.key) {
            slot.users -= 1;
            if slot.users == 0 {
                slots.remove(&self.key);
            }
        }
    }
}

impl<K: Eq + Hash + Copy> KeyedLocks<K> {
    fn new() -> Self {
        Self {
            slots: StdMutex::new(HashMap::new()),
        }
    }

    async fn lock(&self, key: K) -> KeyedGuard<'_, K> {
        let (slot, lock) = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let slot = slots.entry(key).or_insert_with(|| Slot {
                lock: Arc::new(Mutex::new(())),
                users: 0,
            });
            slot.users += 1;
            (SlotRef { locks: self, key }, Arc::clone(&slot.lock))
        };

        KeyedGuard {
            _held: lock.lock_owned().await,
            _slot: slot,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Directory of conversations: lookup, find-or-create, access checks.
pub struct ConversationDirectory {
    conversations: Arc<dyn ConversationRepository>,
    users: Arc<dyn UserDirectory>,
    pair_locks: KeyedLocks<UserPair>,
    support_locks: KeyedLocks<UserId>,
}

impl ConversationDirectory {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            conversations,
            users,
            pair_locks: KeyedLocks::new(),
            support_locks: KeyedLocks::new(),
        }
    }

    /// Returns the single user-to-user conversation for the pair, creating it
    /// with `initiator` as primary user when none exists.
    ///
    /// # Errors
    ///
    /// - `Validation` when `initiator == receiver`
    /// - `NotFound(Receiver)` when the receiver doesn't exist or is inactive
    pub async fn find_or_create_user_to_user(
        &self,
        initiator: UserId,
        receiver: UserId,
    ) -> Result<Conversation, ChatError> {
        let pair = UserPair::new(initiator, receiver)?;

        let receiver_record = self.users.find_by_id(receiver).await?;
        if !receiver_record.is_some_and(|r| r.is_active) {
            return Err(ChatError::NotFound(MissingEntity::Receiver));
        }

        let _slot = self.pair_locks.lock(pair).await;
        self.find_or_insert_pair(pair, initiator, receiver).await
    }

    async fn find_or_insert_pair(
        &self,
        pair: UserPair,
        initiator: UserId,
        receiver: UserId,
    ) -> Result<Conversation, ChatError> {
        if let Some(existing) = self.conversations.find_by_pair(pair).await? {
            return Ok(existing);
        }

        match self
            .conversations
            .insert(NewConversation::user_to_user(initiator, receiver)?)
            .await
        {
            Ok(created) => {
                tracing::info!(
                    conversation_id = %created.id(),
                    user_id = %initiator,
                    receiver_id = %receiver,
                    "Conversation created"
                );
                Ok(created)
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!(user_id = %initiator, receiver_id = %receiver, "Lost pair race, re-reading");
                self.conversations
                    .find_by_pair(pair)
                    .await?
                    .ok_or_else(|| ChatError::Persistence(e.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `user`'s open support conversation, creating an unassigned
    /// one when none is active.
    pub async fn find_or_create_support(&self, user: UserId) -> Result<Conversation, ChatError> {
        let _slot = self.support_locks.lock(user).await;
        if let Some(existing) = self.conversations.find_open_support(user).await? {
            return Ok(existing);
        }

        let created = self
            .conversations
            .insert(NewConversation::user_to_admin(user, None))
            .await?;
        tracing::info!(
            conversation_id = %created.id(),
            user_id = %user,
            "Support conversation opened"
        );
        Ok(created)
    }

    /// Access predicate used before any read or write on a conversation.
    pub fn can_access(&self, conversation: &Conversation, principal: &Principal) -> bool {
        conversation.can_access(principal)
    }

    /// Loads a conversation the principal may use.
    ///
    /// An unknown id is reported as `NotFound(Conversation)`, which renders
    /// to clients exactly like `AccessDenied`.
    pub async fn authorize(
        &self,
        id: ConversationId,
        principal: &Principal,
    ) -> Result<Conversation, ChatError> {
        let conversation = self
            .conversations
            .find_by_id(id)
            .await?
            .ok_or(ChatError::NotFound(MissingEntity::Conversation))?;

        if !self.can_access(&conversation, principal) {
            tracing::warn!(
                conversation_id = %id,
                user_id = %principal.user_id,
                "Conversation access denied"
            );
            return Err(ChatError::AccessDenied);
        }

        Ok(conversation)
    }

    /// The existing user-to-user conversation between the principal and
    /// `counterpart`, without creating one. Nobody has a conversation with
    /// themselves.
    pub async fn conversation_with(
        &self,
        principal: &Principal,
        counterpart: UserId,
    ) -> Result<Option<Conversation>, ChatError> {
        match UserPair::new(principal.user_id, counterpart) {
            Ok(pair) => Ok(self.conversations.find_by_pair(pair).await?),
            Err(_) => Ok(None),
        }
    }

    /// Conversations visible to the principal, most recent activity first.
    pub async fn list_for(&self, principal: &Principal) -> Result<Vec<Conversation>, ChatError> {
        Ok(self.conversations.list_for(principal).await?)
    }

    /// Archives a conversation. Only participants may archive.
    pub async fn archive(
        &self,
        id: ConversationId,
        principal: &Principal,
    ) -> Result<Conversation, ChatError> {
        let mut conversation = self.authorize(id, principal).await?;
        if !conversation.participants().contains(&principal.user_id) {
            return Err(ChatError::AccessDenied);
        }

        if !conversation.is_archived() {
            conversation.archive();
            self.conversations.update(&conversation).await?;
        }
        Ok(conversation)
    }

    #[cfg(test)]
    fn open_lock_slots(&self) -> usize {
        self.pair_locks.len() + self.support_locks.len()
    }
}
