use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Chat the conversation belongs to. Private chats share their id with the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform-assigned id of a message, kept only so it can be deleted later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogTurn {
    User(String),
    Assistant(String),
}

impl DialogTurn {
    #[cfg(test)]
    pub fn role(&self) -> &'static str {
        match self {
            DialogTurn::User(_) => "user",
            DialogTurn::Assistant(_) => "assistant",
        }
    }

    #[cfg(test)]
    pub fn content(&self) -> &str {
        match self {
            DialogTurn::User(content) | DialogTurn::Assistant(content) => content,
        }
    }
}

#[derive(Default)]
struct Buffers {
    dialogs: HashMap<UserId, Vec<DialogTurn>>,
    message_ids: HashMap<UserId, Vec<MessageId>>,
}

/// Per-user dialog log and sent-message log, shared by every handler invocation.
///
/// Both maps live behind one lock so a reset clears them together. The lock is
/// never held across an await point; a whole handler turn is therefore not atomic
/// and two concurrent turns for the same user may interleave their appends.
/// Nothing is persisted and nothing expires except through [`take_for_clear`].
///
/// [`take_for_clear`]: ConversationState::take_for_clear
#[derive(Default)]
pub struct ConversationState {
    buffers: Mutex<Buffers>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_user_message(&self, user: UserId, message_id: MessageId, text: &str) {
        let mut buffers = self.lock();
        buffers
            .dialogs
            .entry(user)
            .or_default()
            .push(DialogTurn::User(text.to_string()));
        buffers.message_ids.entry(user).or_default().push(message_id);
    }

    /// Appends an assistant turn. The reply's message id is tracked separately
    /// with [`track_message`] once the platform has accepted it.
    ///
    /// [`track_message`]: ConversationState::track_message
    pub fn record_assistant_reply(&self, user: UserId, text: &str) {
        self.lock()
            .dialogs
            .entry(user)
            .or_default()
            .push(DialogTurn::Assistant(text.to_string()));
    }

    /// Tracks a sent message for later deletion without recording a turn.
    pub fn track_message(&self, user: UserId, message_id: MessageId) {
        self.lock().message_ids.entry(user).or_default().push(message_id);
    }

    pub fn dialog(&self, user: UserId) -> Vec<DialogTurn> {
        self.lock().dialogs.get(&user).cloned().unwrap_or_default()
    }

    pub fn message_ids(&self, user: UserId) -> Vec<MessageId> {
        self.lock().message_ids.get(&user).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_tracked(&self, user: UserId) -> bool {
        let buffers = self.lock();
        buffers.dialogs.contains_key(&user) || buffers.message_ids.contains_key(&user)
    }

    /// Resets both logs of `user` to empty sequences and hands back the message
    /// ids that were tracked before the reset, in the order they were recorded.
    pub fn take_for_clear(&self, user: UserId) -> Vec<MessageId> {
        let mut buffers = self.lock();
        buffers.dialogs.insert(user, Vec::new());
        buffers.message_ids.insert(user, Vec::new()).unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Buffers> {
        // A panic mid-append leaves the vectors structurally valid.
        self.buffers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: UserId = UserId(42);
    const BOB: UserId = UserId(7);

    #[test]
    fn entries_are_created_lazily() {
        let state = ConversationState::new();
        assert!(!state.is_tracked(ALICE));
        assert!(state.dialog(ALICE).is_empty());
        assert!(state.message_ids(ALICE).is_empty());

        state.record_user_message(ALICE, MessageId(1), "Hello");

        assert!(state.is_tracked(ALICE));
        assert!(!state.is_tracked(BOB));
    }

    #[test]
    fn turns_keep_call_order() {
        let state = ConversationState::new();
        state.record_user_message(ALICE, MessageId(1), "Hello");
        state.record_assistant_reply(ALICE, "Hi");
        state.track_message(ALICE, MessageId(2));
        state.record_user_message(ALICE, MessageId(3), "How are you?");

        assert_eq!(
            state.dialog(ALICE),
            vec![
                DialogTurn::User("Hello".into()),
                DialogTurn::Assistant("Hi".into()),
                DialogTurn::User("How are you?".into()),
            ]
        );
        assert_eq!(
            state.message_ids(ALICE),
            vec![MessageId(1), MessageId(2), MessageId(3)]
        );
    }

    #[test]
    fn tracked_message_has_no_turn() {
        let state = ConversationState::new();
        state.track_message(ALICE, MessageId(10));

        assert!(state.dialog(ALICE).is_empty());
        assert_eq!(state.message_ids(ALICE), vec![MessageId(10)]);
    }

    #[test]
    fn take_for_clear_resets_both_logs() {
        let state = ConversationState::new();
        state.track_message(ALICE, MessageId(1));
        state.record_user_message(ALICE, MessageId(2), "Hello");
        state.record_assistant_reply(ALICE, "Hi");
        state.track_message(ALICE, MessageId(3));

        let taken = state.take_for_clear(ALICE);

        assert_eq!(taken, vec![MessageId(1), MessageId(2), MessageId(3)]);
        assert!(state.dialog(ALICE).is_empty());
        assert!(state.message_ids(ALICE).is_empty());
        // Cleared users keep empty entries rather than disappearing.
        assert!(state.is_tracked(ALICE));
    }

    #[test]
    fn take_for_clear_on_unknown_user_is_empty() {
        let state = ConversationState::new();
        assert!(state.take_for_clear(BOB).is_empty());
        assert!(state.dialog(BOB).is_empty());
    }

    #[test]
    fn users_are_isolated() {
        let state = ConversationState::new();
        state.record_user_message(ALICE, MessageId(1), "from alice");
        state.record_user_message(BOB, MessageId(1), "from bob");

        state.take_for_clear(ALICE);

        assert!(state.dialog(ALICE).is_empty());
        assert_eq!(state.dialog(BOB), vec![DialogTurn::User("from bob".into())]);
    }

    #[test]
    fn turn_accessors() {
        let turn = DialogTurn::Assistant("Hi".into());
        assert_eq!(turn.role(), "assistant");
        assert_eq!(turn.content(), "Hi");
        assert_eq!(DialogTurn::User("x".into()).role(), "user");
    }
}
