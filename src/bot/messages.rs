//! User-visible texts.

/// Label of the single menu button; receiving it as text triggers a clear.
pub const CLEAR_DIALOG: &str = "Clear dialog";

pub const GREETING: &str = "Hi! I'm a bot, ask me anything. Use the button to clear the dialog.";

pub const MENU_PROMPT: &str = "Choose an action:";

pub const DIALOG_CLEARED: &str = "Dialog cleared.";

pub fn completion_error(description: &str) -> String {
    format!("Error while querying Mistral API: {}", description)
}

pub fn is_clear_request(text: &str) -> bool {
    text == CLEAR_DIALOG
}
