//! Telegram update handlers.
//!
//! Each handler validates its input, sequences the core pipeline, and reports
//! progress and outcome back to the chat. Any pipeline failure is logged and
//! mapped to the error kind's user-facing message.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod commands;
mod document;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
    }

    // Passive listener: documents with a trigger-phrase caption.
    if msg.document().is_some() {
        return document::handle_document(bot, msg, state).await;
    }

    Ok(())
}
