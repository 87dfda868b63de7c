//! Conversation entity and participant rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, Principal, Timestamp, UserId, ValidationError};

/// Kind of conversation, persisted as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    UserToUser,
    UserToAdmin,
}

impl ConversationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationKind::UserToUser => "user_to_user",
            ConversationKind::UserToAdmin => "user_to_admin",
        }
    }
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_to_user" => Ok(ConversationKind::UserToUser),
            "user_to_admin" => Ok(ConversationKind::UserToAdmin),
            other => Err(ValidationError::invalid_format(
                "conversation_type",
                format!("unknown kind '{}'", other),
            )),
        }
    }
}

/// The party opposite the primary user.
///
/// Encodes which reference is meaningful for each kind: a user-to-user
/// conversation always names the second user, a user-to-admin conversation
/// may leave the admin unassigned (any admin can answer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counterpart {
    User(UserId),
    Admin(Option<UserId>),
}

impl Counterpart {
    pub fn kind(&self) -> ConversationKind {
        match self {
            Counterpart::User(_) => ConversationKind::UserToUser,
            Counterpart::Admin(_) => ConversationKind::UserToAdmin,
        }
    }
}

/// Unordered pair of distinct users, stored as (low, high).
///
/// Two calls with the arguments swapped produce equal pairs, which is what
/// makes the pair usable as a uniqueness key and a lock key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserPair {
    low: UserId,
    high: UserId,
}

impl UserPair {
    /// Normalizes two user ids into a pair, rejecting a user paired with itself.
    pub fn new(a: UserId, b: UserId) -> Result<Self, ValidationError> {
        if a == b {
            return Err(ValidationError::self_reference("receiver_id"));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> UserId {
        self.low
    }

    pub fn high(&self) -> UserId {
        self.high
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }
}

/// Data required to insert a conversation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversation {
    pub user: UserId,
    pub counterpart: Counterpart,
    pub title: Option<String>,
    pub created_at: Timestamp,
}

impl NewConversation {
    /// A direct conversation started by `initiator` towards `receiver`.
    pub fn user_to_user(initiator: UserId, receiver: UserId) -> Result<Self, ValidationError> {
        UserPair::new(initiator, receiver)?;
        Ok(Self {
            user: initiator,
            counterpart: Counterpart::User(receiver),
            title: None,
            created_at: Timestamp::now(),
        })
    }

    /// A support conversation; `admin` is `None` until someone is assigned.
    pub fn user_to_admin(user: UserId, admin: Option<UserId>) -> Self {
        Self {
            user,
            counterpart: Counterpart::Admin(admin),
            title: None,
            created_at: Timestamp::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Normalized pair for user-to-user conversations.
    pub fn user_pair(&self) -> Option<UserPair> {
        match self.counterpart {
            Counterpart::User(other) => UserPair::new(self.user, other).ok(),
            Counterpart::Admin(_) => None,
        }
    }
}

/// A durable thread between two users, or between a user and the admin pool.
///
/// Conversations are never removed; they are archived or deactivated through
/// their flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    id: ConversationId,
    user: UserId,
    counterpart: Counterpart,
    title: Option<String>,
    created_at: Timestamp,
    updated_at: Timestamp,
    is_active: bool,
    is_archived: bool,
}

impl Conversation {
    /// Materializes a freshly inserted conversation.
    pub fn from_new(id: ConversationId, new: NewConversation) -> Self {
        Self {
            id,
            user: new.user,
            counterpart: new.counterpart,
            title: new.title,
            created_at: new.created_at,
            updated_at: new.created_at,
            is_active: true,
            is_archived: false,
        }
    }

    /// Reconstitutes a conversation from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ConversationId,
        user: UserId,
        counterpart: Counterpart,
        title: Option<String>,
        created_at: Timestamp,
        updated_at: Timestamp,
        is_active: bool,
        is_archived: bool,
    ) -> Self {
        Self {
            id,
            user,
            counterpart,
            title,
            created_at,
            updated_at,
            is_active,
            is_archived,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn kind(&self) -> ConversationKind {
        self.counterpart.kind()
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn counterpart(&self) -> Counterpart {
        self.counterpart
    }

    /// Second user of a user-to-user conversation.
    pub fn other_user(&self) -> Option<UserId> {
        match self.counterpart {
            Counterpart::User(other) => Some(other),
            Counterpart::Admin(_) => None,
        }
    }

    /// Assigned admin of a user-to-admin conversation, if any.
    pub fn admin_user(&self) -> Option<UserId> {
        match self.counterpart {
            Counterpart::Admin(admin) => admin,
            Counterpart::User(_) => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    pub fn user_pair(&self) -> Option<UserPair> {
        self.other_user()
            .and_then(|other| UserPair::new(self.user, other).ok())
    }

    /// Every named participant: the primary user, then the second user or
    /// the assigned admin.
    pub fn participants(&self) -> Vec<UserId> {
        let mut participants = vec![self.user];
        match self.counterpart {
            Counterpart::User(other) => participants.push(other),
            Counterpart::Admin(Some(admin)) => participants.push(admin),
            Counterpart::Admin(None) => {}
        }
        participants
    }

    /// The participant opposite `viewer`, if the conversation names one.
    pub fn counterpart_of(&self, viewer: UserId) -> Option<UserId> {
        match self.counterpart {
            Counterpart::User(other) if other == viewer => Some(self.user),
            Counterpart::User(other) => Some(other),
            Counterpart::Admin(_) if viewer != self.user => Some(self.user),
            Counterpart::Admin(admin) => admin,
        }
    }

    /// Sole authorization gate for reading or writing this conversation.
    ///
    /// Participants always pass. On user-to-admin conversations every admin
    /// passes, not only the assigned one: any free admin may pick up a
    /// support thread.
    pub fn can_access(&self, principal: &Principal) -> bool {
        if self.participants().contains(&principal.user_id) {
            return true;
        }
        self.kind() == ConversationKind::UserToAdmin && principal.is_admin
    }

    // === Mutations ===

    /// Records activity; called whenever a message is appended.
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = self.updated_at.max(at);
    }

    pub fn archive(&mut self) {
        self.is_archived = true;
        self.updated_at = Timestamp::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uid(id: i64) -> UserId {
        UserId::from_raw(id)
    }

    fn user(id: i64) -> Principal {
        Principal::new(uid(id), format!("User {}", id), false)
    }

    fn admin(id: i64) -> Principal {
        Principal::new(uid(id), format!("Admin {}", id), true)
    }

    fn direct(a: i64, b: i64) -> Conversation {
        Conversation::from_new(
            ConversationId::from_raw(1),
            NewConversation::user_to_user(uid(a), uid(b)).unwrap(),
        )
    }

    fn support(u: i64, assigned: Option<i64>) -> Conversation {
        Conversation::from_new(
            ConversationId::from_raw(2),
            NewConversation::user_to_admin(uid(u), assigned.map(uid)),
        )
    }

    #[test]
    fn user_pair_rejects_same_user() {
        assert!(UserPair::new(uid(3), uid(3)).is_err());
    }

    #[test]
    fn user_to_user_requires_distinct_users() {
        assert!(NewConversation::user_to_user(uid(5), uid(5)).is_err());
    }

    #[test]
    fn kind_follows_counterpart() {
        assert_eq!(direct(1, 2).kind(), ConversationKind::UserToUser);
        assert_eq!(support(1, None).kind(), ConversationKind::UserToAdmin);
    }

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [ConversationKind::UserToUser, ConversationKind::UserToAdmin] {
            assert_eq!(kind.as_str().parse::<ConversationKind>().unwrap(), kind);
        }
        assert!("group".parse::<ConversationKind>().is_err());
    }

    #[test]
    fn participants_of_direct_conversation_are_both_users() {
        assert_eq!(direct(1, 2).participants(), vec![uid(1), uid(2)]);
    }

    #[test]
    fn participants_of_unassigned_support_is_only_user() {
        assert_eq!(support(7, None).participants(), vec![uid(7)]);
        assert_eq!(support(7, Some(9)).participants(), vec![uid(7), uid(9)]);
    }

    #[test]
    fn direct_conversation_access_is_limited_to_participants() {
        let conversation = direct(1, 2);

        assert!(conversation.can_access(&user(1)));
        assert!(conversation.can_access(&user(2)));
        assert!(!conversation.can_access(&user(3)));
        assert!(!conversation.can_access(&admin(4)));
    }

    #[test]
    fn any_admin_can_access_support_conversation() {
        let conversation = support(1, Some(10));

        assert!(conversation.can_access(&user(1)));
        assert!(conversation.can_access(&admin(10)));
        assert!(conversation.can_access(&admin(11)));
        assert!(!conversation.can_access(&user(2)));
    }

    #[test]
    fn counterpart_of_resolves_both_directions() {
        let conversation = direct(1, 2);
        assert_eq!(conversation.counterpart_of(uid(1)), Some(uid(2)));
        assert_eq!(conversation.counterpart_of(uid(2)), Some(uid(1)));

        let conversation = support(1, Some(9));
        assert_eq!(conversation.counterpart_of(uid(1)), Some(uid(9)));
        assert_eq!(conversation.counterpart_of(uid(9)), Some(uid(1)));
        assert_eq!(support(1, None).counterpart_of(uid(1)), None);
    }

    #[test]
    fn touch_never_moves_updated_at_backwards() {
        let mut conversation = direct(1, 2);
        let before = conversation.updated_at();

        conversation.touch(before.plus_secs(-30));
        assert_eq!(conversation.updated_at(), before);

        conversation.touch(before.plus_secs(30));
        assert_eq!(conversation.updated_at(), before.plus_secs(30));
    }

    #[test]
    fn archive_and_deactivate_set_flags() {
        let mut conversation = direct(1, 2);
        assert!(conversation.is_active());
        assert!(!conversation.is_archived());

        conversation.archive();
        conversation.deactivate();

        assert!(conversation.is_archived());
        assert!(!conversation.is_active());
    }

    proptest! {
        #[test]
        fn user_pair_is_symmetric(a in 1i64..10_000, b in 1i64..10_000) {
            prop_assume!(a != b);
            let forward = UserPair::new(uid(a), uid(b)).unwrap();
            let backward = UserPair::new(uid(b), uid(a)).unwrap();

            prop_assert_eq!(forward, backward);
            prop_assert!(forward.low() < forward.high());
            prop_assert!(forward.contains(uid(a)) && forward.contains(uid(b)));
        }
    }
}
