//! Telegram side of the relay: the outbound primitives the handler needs and
//! the long-polling dispatcher that feeds it.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, KeyboardButton, KeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use super::conversation_state::{ConversationState, MessageId, UserId};
use super::{ChatRelay, messages};
use crate::config::BotConfig;
use crate::error::TransportError;
use crate::mistral_client::MistralClient;

/// Outbound operations against the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, user: UserId, text: &str) -> Result<MessageId, TransportError>;

    /// Sends `prompt` together with the resized, reusable "Clear dialog" keyboard.
    async fn send_menu(&self, user: UserId, prompt: &str) -> Result<MessageId, TransportError>;

    async fn send_typing(&self, user: UserId) -> Result<(), TransportError>;

    async fn delete_message(
        &self,
        user: UserId,
        message_id: MessageId,
    ) -> Result<(), TransportError>;
}

pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn chat_id(user: UserId) -> ChatId {
    ChatId(user.0)
}

// Not one-time: the button stays available after it is pressed.
fn menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(messages::CLEAR_DIALOG)]])
        .resize_keyboard()
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, user: UserId, text: &str) -> Result<MessageId, TransportError> {
        let sent = self.bot.send_message(chat_id(user), text).await?;
        Ok(MessageId(sent.id.0))
    }

    async fn send_menu(&self, user: UserId, prompt: &str) -> Result<MessageId, TransportError> {
        let sent = self
            .bot
            .send_message(chat_id(user), prompt)
            .reply_markup(menu_keyboard())
            .await?;
        Ok(MessageId(sent.id.0))
    }

    async fn send_typing(&self, user: UserId) -> Result<(), TransportError> {
        self.bot.send_chat_action(chat_id(user), ChatAction::Typing).await?;
        Ok(())
    }

    async fn delete_message(
        &self,
        user: UserId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        self.bot
            .delete_message(chat_id(user), teloxide::types::MessageId(message_id.0))
            .await?;
        Ok(())
    }
}

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "show the greeting and the menu")]
    Start,
}

/// Runs the bot with long polling until the process receives Ctrl-C.
pub async fn run(config: BotConfig) -> eyre::Result<()> {
    let bot = Bot::new(&config.telegram_token);
    let gateway = Arc::new(MistralClient::new(&config)?);
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let relay = Arc::new(ChatRelay::new(
        gateway,
        messenger,
        Arc::new(ConversationState::new()),
    ));

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(is_plain_text))
                .endpoint(text_handler),
        );

    info!("Starting dispatcher with long polling");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![relay])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "Error in update handler",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    warn!("Dispatcher stopped");
    Ok(())
}

fn is_plain_text(text: &str) -> bool {
    !text.starts_with('/')
}

fn sender(msg: &Message) -> UserId {
    UserId(msg.chat.id.0)
}

async fn command_handler(
    msg: Message,
    cmd: Command,
    relay: Arc<ChatRelay>,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            if let Err(e) = relay.start(sender(&msg)).await {
                error!("Error handling /start: {:#}", e);
            }
        }
    }
    Ok(())
}

async fn text_handler(msg: Message, relay: Arc<ChatRelay>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Err(e) = relay
        .handle_text(sender(&msg), MessageId(msg.id.0), text)
        .await
    {
        error!("Error handling message: {:#}", e);
    }
    Ok(())
}
