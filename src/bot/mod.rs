pub mod conversation_state;
pub mod messages;
pub mod transport;


use std::sync::Arc;

use conversation_state::{ConversationState, MessageId, UserId};
use eyre::Result;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};
use transport::Messenger;

use crate::error::DeleteError;
use crate::mistral_client::CompletionGateway;

/// Outcome of a clear: how many deletions were tried and how many failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub attempted: usize,
    pub failed: usize,
}

/// Handles inbound updates: relays text to the completion gateway, records the
/// exchange, and performs the clear command.
pub struct ChatRelay {
    gateway: Arc<dyn CompletionGateway>,
    messenger: Arc<dyn Messenger>,
    state: Arc<ConversationState>,
}

impl ChatRelay {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        messenger: Arc<dyn Messenger>,
        state: Arc<ConversationState>,
    ) -> Self {
        Self {
            gateway,
            messenger,
            state,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Greets the user and shows the menu. Only the greeting is tracked for deletion.
    pub async fn start(&self, user: UserId) -> Result<()> {
        info!(%user, "Start command");

        let greeting_id = self.messenger.send_text(user, messages::GREETING).await?;
        self.state.track_message(user, greeting_id);

        self.messenger.send_menu(user, messages::MENU_PROMPT).await?;
        Ok(())
    }

    pub async fn handle_text(&self, user: UserId, message_id: MessageId, text: &str) -> Result<()> {
        if messages::is_clear_request(text) {
            self.clear(user).await;
            self.messenger.send_text(user, messages::DIALOG_CLEARED).await?;
            return Ok(());
        }

        debug!(%user, %message_id, chars = text.chars().count(), "Inbound message");
        self.state.record_user_message(user, message_id, text);

        self.messenger.send_typing(user).await?;

        let reply = self.query_completion(text).await;

        // The turn is kept even when the platform refuses the reply.
        self.state.record_assistant_reply(user, &reply);
        let reply_id = self.messenger.send_text(user, &reply).await?;
        self.state.track_message(user, reply_id);

        Ok(())
    }

    /// Deletes every tracked message of `user` and empties both of its logs.
    ///
    /// Deletion is best effort: each failure is logged and the remaining ids are
    /// still attempted. The logs end up empty no matter how many deletions failed.
    pub async fn clear(&self, user: UserId) -> ClearReport {
        let message_ids = self.state.take_for_clear(user);

        let outcomes: Vec<Result<(), DeleteError>> = stream::iter(message_ids)
            .then(|message_id| async move {
                self.messenger
                    .delete_message(user, message_id)
                    .await
                    .map_err(|source| DeleteError { message_id, source })
            })
            .collect()
            .await;

        let report = outcomes
            .iter()
            .fold(ClearReport::default(), |mut report, outcome| {
                report.attempted += 1;
                if let Err(e) = outcome {
                    warn!(%user, "{}", e);
                    report.failed += 1;
                }
                report
            });

        info!(
            %user,
            attempted = report.attempted,
            failed = report.failed,
            "Dialog cleared"
        );
        report
    }

    async fn query_completion(&self, text: &str) -> String {
        match self.gateway.complete(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Completion request failed: {}", e);
                messages::completion_error(&e.to_string())
            }
        }
    }
}
